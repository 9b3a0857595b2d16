//! Shared desktop-layout schema between the state engine and the
//! persistence collaborator.
//!
//! The types here describe the persisted `state` payload of one virtual
//! desktop (icon records, grid positions, folder contents) plus the
//! record envelope it travels in, and the validation rules the server
//! enforces on that payload. The engine validates with the same rules so
//! it can never produce a state the server would reject.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length (in characters) of a folder or memo name.
pub const NAME_MAX_LEN: usize = 30;
/// Maximum length (in characters) of a website display name.
pub const WEBSITE_NAME_MAX_LEN: usize = 32;
/// Maximum length (in characters) of a stamp caption.
pub const STAMP_TEXT_MAX_LEN: usize = 20;

/// Opaque stable identifier for one desktop icon.
///
/// Ids are issued by the persistence collaborator at creation time; the
/// engine treats them as uninterpreted strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconId(String);

impl IconId {
    /// Wraps a raw id string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the string form of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IconId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IconId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Icon accent color: `#RGB`/`#RRGGBB` hex, or a `bg-`-prefixed theme
/// token resolved by the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IconColor(String);

impl IconColor {
    /// Validates and wraps a raw color value.
    pub fn new(raw: impl Into<String>) -> Result<Self, IconValidationError> {
        let raw = raw.into();
        if is_valid_icon_color(&raw) {
            Ok(Self(raw))
        } else {
            Err(IconValidationError::InvalidColor(raw))
        }
    }

    /// Returns the raw color value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IconColor {
    type Error = IconValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<IconColor> for String {
    fn from(color: IconColor) -> Self {
        color.0
    }
}

fn is_valid_icon_color(raw: &str) -> bool {
    if let Some(hex) = raw.strip_prefix('#') {
        return matches!(hex.len(), 3 | 6) && hex.bytes().all(|b| b.is_ascii_hexdigit());
    }
    if let Some(token) = raw.strip_prefix("bg-") {
        return !token.is_empty()
            && token
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'/');
    }
    false
}

/// Glyph selector used when an icon has no richer rendering (favicon,
/// stamp art) to fall back on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IconKey {
    /// Sticky-note glyph (memos).
    StickyNote,
    /// Globe glyph (websites).
    Globe,
    /// Folder glyph.
    FolderIcon,
}

/// Decorative stamp asset catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StampKind {
    /// `astro` asset.
    #[serde(rename = "astro")]
    Astro,
    /// `astro-2` asset.
    #[serde(rename = "astro-2")]
    Astro2,
    /// `astro-3` asset.
    #[serde(rename = "astro-3")]
    Astro3,
    /// `astro-5` asset.
    #[serde(rename = "astro-5")]
    Astro5,
    /// `astro-6` asset.
    #[serde(rename = "astro-6")]
    Astro6,
    /// `astro-7` asset.
    #[serde(rename = "astro-7")]
    Astro7,
    /// `astro-8` asset.
    #[serde(rename = "astro-8")]
    Astro8,
    /// `astro-9` asset.
    #[serde(rename = "astro-9")]
    Astro9,
    /// `astro-10` asset.
    #[serde(rename = "astro-10")]
    Astro10,
    /// `astro-11` asset.
    #[serde(rename = "astro-11")]
    Astro11,
    /// `astro-12` asset.
    #[serde(rename = "astro-12")]
    Astro12,
    /// `browser` asset.
    #[serde(rename = "browser")]
    Browser,
    /// `rocket` asset.
    #[serde(rename = "rocket")]
    Rocket,
    /// `lock` asset.
    #[serde(rename = "lock")]
    Lock,
    /// `star` asset.
    #[serde(rename = "star")]
    Star,
    /// `stamp-1` asset.
    #[serde(rename = "stamp-1")]
    Stamp1,
    /// `stamp-2` asset.
    #[serde(rename = "stamp-2")]
    Stamp2,
    /// `stamp-3` asset.
    #[serde(rename = "stamp-3")]
    Stamp3,
    /// `wakusei` asset.
    #[serde(rename = "wakusei")]
    Wakusei,
    /// `wakusei-2` asset.
    #[serde(rename = "wakusei-2")]
    Wakusei2,
    /// `wakusei-3` asset.
    #[serde(rename = "wakusei-3")]
    Wakusei3,
    /// `wakusei-4` asset.
    #[serde(rename = "wakusei-4")]
    Wakusei4,
}

/// Variant-specific payload of one icon, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IconKind {
    /// A website shortcut that opens in a browser window.
    Website {
        /// Display name (0-32 characters).
        name: String,
        /// Target URL.
        url: String,
        /// Favicon URL; `None` after a failed existence probe.
        #[serde(default)]
        favicon: Option<String>,
    },
    /// A rich-text note that opens in a memo window.
    Memo {
        /// Display name (1-30 characters).
        name: String,
        /// Rich-text/HTML body.
        content: String,
    },
    /// A folder; children live in [`LayoutState::folder_contents`].
    Folder {
        /// Display name (1-30 characters).
        name: String,
    },
    /// A decorative stamp; desktop-only, never inside a folder.
    #[serde(rename_all = "camelCase")]
    Stamp {
        /// Stamp asset to render.
        stamp_type: StampKind,
        /// Optional short caption (max 20 characters).
        stamp_text: String,
    },
}

/// One desktop icon: common fields plus the `type`-tagged variant payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IconRecord {
    /// Stable icon id, unique across the desktop.
    pub id: IconId,
    /// Fallback glyph selector.
    #[serde(rename = "iconKey")]
    pub icon_key: IconKey,
    /// Accent color.
    pub color: IconColor,
    /// Variant payload.
    #[serde(flatten)]
    pub kind: IconKind,
}

impl IconRecord {
    /// Returns whether this icon is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, IconKind::Folder { .. })
    }

    /// Returns whether this icon is a stamp.
    pub fn is_stamp(&self) -> bool {
        matches!(self.kind, IconKind::Stamp { .. })
    }

    /// Returns the display name; stamps have none.
    pub fn display_name(&self) -> Option<&str> {
        match &self.kind {
            IconKind::Website { name, .. }
            | IconKind::Memo { name, .. }
            | IconKind::Folder { name } => Some(name),
            IconKind::Stamp { .. } => None,
        }
    }

    /// Returns the stable `type` tag used on the wire.
    pub const fn kind_token(&self) -> &'static str {
        match self.kind {
            IconKind::Website { .. } => "website",
            IconKind::Memo { .. } => "memo",
            IconKind::Folder { .. } => "folder",
            IconKind::Stamp { .. } => "stamp",
        }
    }
}

/// Field-level icon validation failures surfaced to creation/edit forms.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IconValidationError {
    /// Color is neither a hex value nor a theme token.
    #[error("`{0}` is not a hex color or theme token")]
    InvalidColor(String),
    /// Name length is outside the allowed range for the variant.
    #[error("name must be {min}-{max} characters")]
    NameLength {
        /// Minimum allowed length.
        min: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// URL is not syntactically valid http(s).
    #[error("`{0}` is not a valid URL")]
    InvalidUrl(String),
    /// Stamp caption exceeds the length bound.
    #[error("stamp caption must be at most {STAMP_TEXT_MAX_LEN} characters")]
    StampTextTooLong,
}

/// Validates variant-specific field constraints for one icon.
pub fn validate_icon(icon: &IconRecord) -> Result<(), IconValidationError> {
    match &icon.kind {
        IconKind::Website { name, url, favicon } => {
            check_name_len(name, 0, WEBSITE_NAME_MAX_LEN)?;
            if !is_valid_http_url(url) {
                return Err(IconValidationError::InvalidUrl(url.clone()));
            }
            if let Some(favicon) = favicon {
                if !favicon.is_empty() && !is_valid_http_url(favicon) {
                    return Err(IconValidationError::InvalidUrl(favicon.clone()));
                }
            }
            Ok(())
        }
        IconKind::Memo { name, .. } | IconKind::Folder { name } => {
            check_name_len(name, 1, NAME_MAX_LEN)
        }
        IconKind::Stamp { stamp_text, .. } => {
            if stamp_text.chars().count() > STAMP_TEXT_MAX_LEN {
                Err(IconValidationError::StampTextTooLong)
            } else {
                Ok(())
            }
        }
    }
}

fn check_name_len(name: &str, min: usize, max: usize) -> Result<(), IconValidationError> {
    let len = name.chars().count();
    if len < min || len > max {
        Err(IconValidationError::NameLength { min, max })
    } else {
        Ok(())
    }
}

/// Returns whether `raw` is a syntactically plausible http(s) URL: an
/// explicit scheme, a non-empty host, and no whitespace or control bytes.
pub fn is_valid_http_url(raw: &str) -> bool {
    if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    url_host(raw).is_some()
}

/// Extracts the hostname of an http(s) URL, without port or userinfo.
pub fn url_host(raw: &str) -> Option<&str> {
    let rest = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"))?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host = authority.rsplit('@').next().unwrap_or(authority);
    let host = host.split(':').next().unwrap_or(host);
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// One cell of the bounded desktop grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct GridPosition {
    /// Zero-based row.
    pub row: u16,
    /// Zero-based column.
    pub col: u16,
}

/// Dimensions of the desktop grid.
///
/// The reference UI uses 8 rows by 6 columns, but the bound is
/// configuration, not a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridBounds {
    /// Number of rows.
    pub rows: u16,
    /// Number of columns.
    pub cols: u16,
}

impl GridBounds {
    /// The reference desktop grid: 8 rows by 6 columns.
    pub const DEFAULT: Self = Self { rows: 8, cols: 6 };

    /// Returns whether `position` falls inside the grid.
    pub fn contains(&self, position: GridPosition) -> bool {
        position.row < self.rows && position.col < self.cols
    }

    /// Iterates every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = GridPosition> + '_ {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| GridPosition { row, col }))
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        usize::from(self.rows) * usize::from(self.cols)
    }
}

impl Default for GridBounds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The persisted layout payload of one desktop: every icon, the grid
/// position of every root icon, and the ordered children of every folder.
///
/// Maps are ordered so serialization and fingerprinting are key-order
/// stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LayoutState {
    /// Every icon on the desktop, in creation order.
    pub app_items: Vec<IconRecord>,
    /// Grid position per root icon id.
    pub app_positions: BTreeMap<IconId, GridPosition>,
    /// Ordered child ids per folder id. Order is display/tab order.
    pub folder_contents: BTreeMap<IconId, Vec<IconId>>,
}

impl LayoutState {
    /// Looks up an icon record by id.
    pub fn icon(&self, id: &IconId) -> Option<&IconRecord> {
        self.app_items.iter().find(|icon| &icon.id == id)
    }

    /// Looks up an icon record mutably by id.
    pub fn icon_mut(&mut self, id: &IconId) -> Option<&mut IconRecord> {
        self.app_items.iter_mut().find(|icon| &icon.id == id)
    }

    /// Returns whether `id` is a root icon (not inside any folder).
    pub fn is_root(&self, id: &IconId) -> bool {
        !self
            .folder_contents
            .values()
            .any(|children| children.contains(id))
    }

    /// Returns the folder currently containing `id`, if any.
    pub fn parent_folder(&self, id: &IconId) -> Option<&IconId> {
        self.folder_contents
            .iter()
            .find(|(_, children)| children.contains(id))
            .map(|(folder_id, _)| folder_id)
    }
}

/// Structural validation failures for a [`LayoutState`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// An icon failed its field-level constraints.
    #[error("icon `{0}`: {1}")]
    Icon(IconId, IconValidationError),
    /// Two icons share an id.
    #[error("duplicate icon id `{0}`")]
    DuplicateIconId(IconId),
    /// A root icon has no grid position.
    #[error("root icon `{0}` has no grid position")]
    MissingRootPosition(IconId),
    /// A grid position references a non-root (or unknown) icon.
    #[error("grid position assigned to non-root icon `{0}`")]
    PositionForNonRoot(IconId),
    /// Two icons occupy the same cell.
    #[error("grid cell ({},{}) assigned twice", .0.row, .0.col)]
    DuplicateCoordinate(GridPosition),
    /// A position lies outside the grid bounds.
    #[error("position ({},{}) for `{id}` is outside the grid", .position.row, .position.col)]
    PositionOutOfBounds {
        /// Icon holding the position.
        id: IconId,
        /// The offending position.
        position: GridPosition,
    },
    /// A folder-contents key references a non-folder icon.
    #[error("folder contents key `{0}` is not a folder icon")]
    NotAFolder(IconId),
    /// A folder child list references an unknown icon.
    #[error("folder `{folder}` references unknown child `{child}`")]
    UnknownChild {
        /// Folder owning the child list.
        folder: IconId,
        /// The unknown child id.
        child: IconId,
    },
    /// The folder graph contains a cycle.
    #[error("folder `{0}` transitively contains itself")]
    FolderCycle(IconId),
}

/// Validates a layout against the rules the persistence collaborator
/// enforces, in order: per-icon field constraints, id uniqueness,
/// root/position consistency, coordinate uniqueness and bounds, folder
/// key and child referential integrity, and folder-graph acyclicity.
pub fn validate_layout(layout: &LayoutState, bounds: GridBounds) -> Result<(), LayoutError> {
    for icon in &layout.app_items {
        validate_icon(icon).map_err(|err| LayoutError::Icon(icon.id.clone(), err))?;
    }

    let mut ids = BTreeSet::new();
    for icon in &layout.app_items {
        if !ids.insert(&icon.id) {
            return Err(LayoutError::DuplicateIconId(icon.id.clone()));
        }
    }

    let child_ids: BTreeSet<&IconId> = layout
        .folder_contents
        .values()
        .flat_map(|children| children.iter())
        .collect();
    for icon in &layout.app_items {
        let is_root = !child_ids.contains(&icon.id);
        if is_root && !layout.app_positions.contains_key(&icon.id) {
            return Err(LayoutError::MissingRootPosition(icon.id.clone()));
        }
    }
    for id in layout.app_positions.keys() {
        if child_ids.contains(id) || !ids.contains(id) {
            return Err(LayoutError::PositionForNonRoot(id.clone()));
        }
    }

    let mut occupied = BTreeSet::new();
    for (id, position) in &layout.app_positions {
        if !occupied.insert(*position) {
            return Err(LayoutError::DuplicateCoordinate(*position));
        }
        if !bounds.contains(*position) {
            return Err(LayoutError::PositionOutOfBounds {
                id: id.clone(),
                position: *position,
            });
        }
    }

    for folder_id in layout.folder_contents.keys() {
        match layout.icon(folder_id) {
            Some(icon) if icon.is_folder() => {}
            _ => return Err(LayoutError::NotAFolder(folder_id.clone())),
        }
    }
    for (folder_id, children) in &layout.folder_contents {
        for child in children {
            if !ids.contains(child) {
                return Err(LayoutError::UnknownChild {
                    folder: folder_id.clone(),
                    child: child.clone(),
                });
            }
        }
    }

    if let Some(folder_id) = find_folder_cycle(&layout.folder_contents) {
        return Err(LayoutError::FolderCycle(folder_id));
    }

    Ok(())
}

/// Returns a folder that transitively contains itself, if any exists.
fn find_folder_cycle(folder_contents: &BTreeMap<IconId, Vec<IconId>>) -> Option<IconId> {
    for folder_id in folder_contents.keys() {
        let mut visited = BTreeSet::new();
        let mut queue: Vec<&IconId> = folder_contents
            .get(folder_id)
            .map(|children| children.iter().collect())
            .unwrap_or_default();
        while let Some(current) = queue.pop() {
            if current == folder_id {
                return Some(folder_id.clone());
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(children) = folder_contents.get(current) {
                queue.extend(children.iter());
            }
        }
    }
    None
}

/// Desktop background presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackgroundKind {
    /// Default gradient.
    Default,
    /// Warm gradient.
    Warm,
    /// Green gradient.
    Green,
    /// Solid black.
    Black,
    /// Sunset photograph.
    Sunset,
    /// Station photograph.
    Station,
    /// Ocean photograph.
    Ocean,
    /// Sakura photograph.
    Sakura,
    /// Mountain photograph.
    Mountain,
}

/// Desktop font presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FontKind {
    /// Inter.
    Inter,
    /// Alegreya.
    Alegreya,
    /// Lobster.
    Lobster,
    /// Allan.
    Allan,
    /// Comfortaa.
    Comfortaa,
    /// Lora.
    Lora,
}

/// The persisted record envelope for one desktop, as served by the
/// storage collaborator. The engine reads `id`, `name`, and `state` to
/// hydrate and writes back only `state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopRecord {
    /// Desktop id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the desktop is publicly viewable.
    pub is_public: bool,
    /// Background preset.
    pub background: BackgroundKind,
    /// Font preset.
    pub font: FontKind,
    /// Position in the owner's desktop list.
    pub order_index: u32,
    /// Layout payload.
    pub state: LayoutState,
    /// Creation timestamp, when present.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last-update timestamp, when present.
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn color(raw: &str) -> IconColor {
        IconColor::new(raw).expect("color")
    }

    fn website(id: &str, url: &str) -> IconRecord {
        IconRecord {
            id: id.into(),
            icon_key: IconKey::Globe,
            color: color("#FFEB3B"),
            kind: IconKind::Website {
                name: "example".to_string(),
                url: url.to_string(),
                favicon: None,
            },
        }
    }

    fn folder(id: &str, name: &str) -> IconRecord {
        IconRecord {
            id: id.into(),
            icon_key: IconKey::FolderIcon,
            color: color("#FEE2E2"),
            kind: IconKind::Folder {
                name: name.to_string(),
            },
        }
    }

    fn at(row: u16, col: u16) -> GridPosition {
        GridPosition { row, col }
    }

    #[test]
    fn icon_color_accepts_hex_and_theme_tokens() {
        assert!(IconColor::new("#FEE2E2").is_ok());
        assert!(IconColor::new("#abc").is_ok());
        assert!(IconColor::new("bg-red-200").is_ok());
        assert!(IconColor::new("#FEE2E").is_err());
        assert!(IconColor::new("#GGGGGG").is_err());
        assert!(IconColor::new("red").is_err());
        assert!(IconColor::new("bg-").is_err());
    }

    #[test]
    fn url_validation_requires_scheme_and_host() {
        assert!(is_valid_http_url("https://example.com"));
        assert!(is_valid_http_url("http://example.com/path?q=1"));
        assert!(!is_valid_http_url("example.com"));
        assert!(!is_valid_http_url("https://"));
        assert!(!is_valid_http_url("https://exa mple.com"));
        assert_eq!(url_host("https://www.example.com:8080/a"), Some("www.example.com"));
        assert_eq!(url_host("https://user@example.com/a"), Some("example.com"));
    }

    #[test]
    fn name_length_bounds_follow_variant() {
        let mut memo = IconRecord {
            id: "m1".into(),
            icon_key: IconKey::StickyNote,
            color: color("#FEE2E2"),
            kind: IconKind::Memo {
                name: String::new(),
                content: String::new(),
            },
        };
        assert!(validate_icon(&memo).is_err());
        if let IconKind::Memo { name, .. } = &mut memo.kind {
            *name = "a".repeat(31);
        }
        assert!(validate_icon(&memo).is_err());
        if let IconKind::Memo { name, .. } = &mut memo.kind {
            *name = "Notes".to_string();
        }
        assert!(validate_icon(&memo).is_ok());

        // Website names may be empty, but the URL must parse.
        let site = website("w1", "https://example.com");
        assert!(validate_icon(&site).is_ok());
        let bad = website("w2", "not-a-url");
        assert_eq!(
            validate_icon(&bad),
            Err(IconValidationError::InvalidUrl("not-a-url".to_string()))
        );
    }

    #[test]
    fn icon_record_wire_shape_is_type_tagged_camel_case() {
        let payload = json!({
            "id": "stamp-1700000000000",
            "iconKey": "StickyNote",
            "color": "#FFEB3B",
            "type": "stamp",
            "stampType": "wakusei-2",
            "stampText": "hello"
        });
        let icon: IconRecord = serde_json::from_value(payload.clone()).expect("deserialize");
        assert_eq!(icon.kind_token(), "stamp");
        assert_eq!(
            icon.kind,
            IconKind::Stamp {
                stamp_type: StampKind::Wakusei2,
                stamp_text: "hello".to_string(),
            }
        );
        assert_eq!(serde_json::to_value(&icon).expect("serialize"), payload);
    }

    #[test]
    fn layout_state_round_trips_the_server_payload() {
        let payload = json!({
            "appItems": [
                {
                    "id": "folder-1",
                    "iconKey": "FolderIcon",
                    "color": "#FEE2E2",
                    "type": "folder",
                    "name": "Work"
                },
                {
                    "id": "site-1",
                    "iconKey": "Globe",
                    "color": "#FFEB3B",
                    "type": "website",
                    "name": "docs",
                    "url": "https://docs.example.com",
                    "favicon": null
                }
            ],
            "appPositions": { "folder-1": { "row": 0, "col": 0 } },
            "folderContents": { "folder-1": ["site-1"] }
        });
        let layout: LayoutState = serde_json::from_value(payload).expect("deserialize");
        assert_eq!(layout.app_items.len(), 2);
        assert!(layout.is_root(&"folder-1".into()));
        assert!(!layout.is_root(&"site-1".into()));
        assert_eq!(layout.parent_folder(&"site-1".into()), Some(&"folder-1".into()));
        assert_eq!(validate_layout(&layout, GridBounds::DEFAULT), Ok(()));
    }

    #[test]
    fn validator_rejects_duplicate_ids() {
        let mut layout = LayoutState::default();
        layout.app_items.push(website("dup", "https://a.example"));
        layout.app_items.push(website("dup", "https://b.example"));
        layout.app_positions.insert("dup".into(), at(0, 0));
        assert_eq!(
            validate_layout(&layout, GridBounds::DEFAULT),
            Err(LayoutError::DuplicateIconId("dup".into()))
        );
    }

    #[test]
    fn validator_rejects_root_without_position_and_position_for_child() {
        let mut layout = LayoutState::default();
        layout.app_items.push(website("w1", "https://a.example"));
        assert_eq!(
            validate_layout(&layout, GridBounds::DEFAULT),
            Err(LayoutError::MissingRootPosition("w1".into()))
        );

        let mut layout = LayoutState::default();
        layout.app_items.push(folder("f1", "Work"));
        layout.app_items.push(website("w1", "https://a.example"));
        layout.app_positions.insert("f1".into(), at(0, 0));
        layout.app_positions.insert("w1".into(), at(0, 1));
        layout
            .folder_contents
            .insert("f1".into(), vec!["w1".into()]);
        assert_eq!(
            validate_layout(&layout, GridBounds::DEFAULT),
            Err(LayoutError::PositionForNonRoot("w1".into()))
        );
    }

    #[test]
    fn validator_rejects_shared_and_out_of_bounds_cells() {
        let mut layout = LayoutState::default();
        layout.app_items.push(website("w1", "https://a.example"));
        layout.app_items.push(website("w2", "https://b.example"));
        layout.app_positions.insert("w1".into(), at(2, 3));
        layout.app_positions.insert("w2".into(), at(2, 3));
        assert_eq!(
            validate_layout(&layout, GridBounds::DEFAULT),
            Err(LayoutError::DuplicateCoordinate(at(2, 3)))
        );

        let mut layout = LayoutState::default();
        layout.app_items.push(website("w1", "https://a.example"));
        layout.app_positions.insert("w1".into(), at(8, 0));
        assert_eq!(
            validate_layout(&layout, GridBounds::DEFAULT),
            Err(LayoutError::PositionOutOfBounds {
                id: "w1".into(),
                position: at(8, 0),
            })
        );
    }

    #[test]
    fn validator_rejects_non_folder_keys_and_unknown_children() {
        let mut layout = LayoutState::default();
        layout.app_items.push(website("w1", "https://a.example"));
        layout.app_positions.insert("w1".into(), at(0, 0));
        layout.folder_contents.insert("w1".into(), Vec::new());
        assert_eq!(
            validate_layout(&layout, GridBounds::DEFAULT),
            Err(LayoutError::NotAFolder("w1".into()))
        );

        let mut layout = LayoutState::default();
        layout.app_items.push(folder("f1", "Work"));
        layout.app_positions.insert("f1".into(), at(0, 0));
        layout
            .folder_contents
            .insert("f1".into(), vec!["ghost".into()]);
        assert_eq!(
            validate_layout(&layout, GridBounds::DEFAULT),
            Err(LayoutError::UnknownChild {
                folder: "f1".into(),
                child: "ghost".into(),
            })
        );
    }

    #[test]
    fn validator_rejects_folder_cycles() {
        // Mutual containment leaves both folders non-root, so no position
        // checks fire before the cycle detector does.
        let mut layout = LayoutState::default();
        layout.app_items.push(folder("a", "A"));
        layout.app_items.push(folder("b", "B"));
        layout.folder_contents.insert("a".into(), vec!["b".into()]);
        layout.folder_contents.insert("b".into(), vec!["a".into()]);
        assert_eq!(
            validate_layout(&layout, GridBounds::DEFAULT),
            Err(LayoutError::FolderCycle("a".into()))
        );
    }

    #[test]
    fn grid_bounds_iterate_row_major() {
        let bounds = GridBounds { rows: 2, cols: 3 };
        let cells: Vec<GridPosition> = bounds.cells().collect();
        assert_eq!(cells.len(), bounds.cell_count());
        assert_eq!(cells[0], at(0, 0));
        assert_eq!(cells[1], at(0, 1));
        assert_eq!(cells[3], at(1, 0));
        assert!(!bounds.contains(at(2, 0)));
    }

    #[test]
    fn desktop_record_accepts_a_freshly_created_desktop() {
        let payload = json!({
            "id": "desk-1",
            "name": "main",
            "isPublic": false,
            "background": "DEFAULT",
            "font": "INTER",
            "orderIndex": 0,
            "state": {
                "appItems": [{
                    "id": "memo-1",
                    "iconKey": "StickyNote",
                    "color": "#FEE2E2",
                    "type": "memo",
                    "name": "Notes",
                    "content": ""
                }],
                "appPositions": { "memo-1": { "row": 0, "col": 0 } },
                "folderContents": {}
            },
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z"
        });
        let record: DesktopRecord = serde_json::from_value(payload).expect("deserialize");
        assert_eq!(record.background, BackgroundKind::Default);
        assert_eq!(record.font, FontKind::Inter);
        assert_eq!(validate_layout(&record.state, GridBounds::DEFAULT), Ok(()));
    }
}
