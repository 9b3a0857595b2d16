//! In-memory state for one open desktop session.
//!
//! One [`DesktopState`] owns everything a session mutates: the live
//! layout, the last-persisted baseline it is diffed against, and the set
//! of open windows. All mutation flows through
//! [`reduce_desktop`](crate::reducer::reduce_desktop); the rendering
//! layer subscribes to this state but owns none of the invariants.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vdesk_contract::{
    validate_layout, DesktopRecord, GridBounds, GridPosition, IconColor, IconId, LayoutError,
    LayoutState,
};

/// First z-index handed out by a fresh session.
pub const INITIAL_Z_INDEX: u64 = 1000;
/// Seed offset keeping the help window frontmost until something else is
/// focused.
pub const HELP_WINDOW_Z_OFFSET: u64 = 1000;

/// Screen-space rectangle of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRect {
    /// Left edge in pixels.
    pub x: i32,
    /// Top edge in pixels.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl WindowRect {
    /// Returns the rect moved to `(x, y)`.
    pub fn at(self, x: i32, y: i32) -> Self {
        Self { x, y, ..self }
    }

    /// Returns the rect resized to at least the given minimums.
    pub fn clamped_min(self, min_width: i32, min_height: i32) -> Self {
        Self {
            width: self.width.max(min_width),
            height: self.height.max(min_height),
            ..self
        }
    }
}

/// Stacking and visibility bookkeeping shared by every window kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowFrame {
    /// Current rectangle.
    pub rect: WindowRect,
    /// Stacking order; strictly increasing across focus/open events.
    pub z_index: u64,
    /// Whether the window is minimized out of the visible set.
    pub minimized: bool,
}

/// An open memo window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoWindow {
    /// Backing memo icon id.
    pub id: IconId,
    /// Window title (the memo name).
    pub title: String,
    /// Editable memo body.
    pub content: String,
    /// Accent color mirrored from the icon.
    pub color: IconColor,
    /// Frame bookkeeping.
    pub frame: WindowFrame,
}

/// An open browser window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserWindow {
    /// Backing website icon id.
    pub id: IconId,
    /// Window title (the website name).
    pub title: String,
    /// Target URL.
    pub url: String,
    /// Favicon URL when the probe succeeded.
    pub favicon: Option<String>,
    /// Accent color mirrored from the icon.
    pub color: IconColor,
    /// Frame bookkeeping.
    pub frame: WindowFrame,
}

/// An open folder window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderWindow {
    /// Backing folder icon id.
    pub id: IconId,
    /// Window title (the folder name).
    pub title: String,
    /// Accent color mirrored from the icon.
    pub color: IconColor,
    /// Frame bookkeeping.
    pub frame: WindowFrame,
}

/// The process-wide help window singleton. Toggled visible/invisible
/// rather than created and destroyed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelpWindow {
    /// Whether the window is currently shown.
    pub visible: bool,
    /// Help topic key, `"welcome"` by default.
    pub topic: String,
    /// Frame bookkeeping.
    pub frame: WindowFrame,
}

/// Addresses one window for focus/close/geometry actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowRef {
    /// Memo window by icon id.
    Memo(IconId),
    /// Browser window by icon id.
    Browser(IconId),
    /// Folder window by icon id.
    Folder(IconId),
    /// The help singleton.
    Help,
}

/// All open windows of a session, one pool per kind, sharing a single
/// monotonic z-index counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSet {
    /// Next z-index to hand out.
    pub next_z_index: u64,
    /// Open memo windows.
    pub memo: Vec<MemoWindow>,
    /// Open browser windows.
    pub browser: Vec<BrowserWindow>,
    /// Open folder windows.
    pub folder: Vec<FolderWindow>,
    /// The help singleton.
    pub help: HelpWindow,
}

impl Default for WindowSet {
    fn default() -> Self {
        Self {
            next_z_index: INITIAL_Z_INDEX,
            memo: Vec::new(),
            browser: Vec::new(),
            folder: Vec::new(),
            help: HelpWindow {
                visible: false,
                topic: "welcome".to_string(),
                frame: WindowFrame {
                    rect: WindowRect {
                        x: 150,
                        y: 150,
                        width: 650,
                        height: 450,
                    },
                    z_index: INITIAL_Z_INDEX + HELP_WINDOW_Z_OFFSET,
                    minimized: false,
                },
            },
        }
    }
}

/// Where a drag started; determines which drop policies apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOrigin {
    /// Dragged off a desktop cell.
    Cell(GridPosition),
    /// Dragged out of an open folder window.
    Folder(IconId),
}

/// The short-lived state captured at drag-start and consumed at drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    /// Icon being dragged.
    pub icon_id: IconId,
    /// Where it came from.
    pub origin: DragOrigin,
}

/// Transient pointer-interaction state. At most one drag is in flight;
/// starting a new one replaces any stale session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractionState {
    /// The in-flight drag, if any.
    pub drag: Option<DragSession>,
}

/// Rejected hydration of a server snapshot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HydrateError {
    /// The snapshot violates the layout schema; the load is refused
    /// rather than rendered with icons silently dropped.
    #[error("desktop snapshot rejected: {0}")]
    Invalid(#[from] LayoutError),
}

/// The full mutable state of one open desktop session.
///
/// Single-writer: exactly one session owns an instance, and every
/// mutation happens synchronously on the UI thread that owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct DesktopState {
    /// Id of the backing desktop record.
    pub desktop_id: String,
    /// Desktop display name.
    pub name: String,
    /// Grid dimensions for this session.
    pub bounds: GridBounds,
    /// Live layout, mutated optimistically.
    pub layout: LayoutState,
    /// Last successfully persisted layout.
    pub baseline: LayoutState,
    /// Open windows.
    pub windows: WindowSet,
}

impl DesktopState {
    /// Hydrates a session from a persisted desktop record.
    ///
    /// The snapshot is validated against the full layout schema first; a
    /// malformed snapshot fails the load instead of rendering a desktop
    /// with missing icons.
    pub fn from_record(record: DesktopRecord, bounds: GridBounds) -> Result<Self, HydrateError> {
        if let Err(err) = validate_layout(&record.state, bounds) {
            log::warn!("refusing snapshot for desktop `{}`: {err}", record.id);
            return Err(HydrateError::Invalid(err));
        }
        Ok(Self {
            desktop_id: record.id,
            name: record.name,
            bounds,
            baseline: record.state.clone(),
            layout: record.state,
            windows: WindowSet::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use super::*;

    fn server_record(positions: Value) -> DesktopRecord {
        serde_json::from_value(json!({
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
                "appPositions": positions,
                "folderContents": {}
            }
        }))
        .expect("record payload")
    }

    #[test]
    fn hydration_accepts_a_seeded_desktop() {
        let record = server_record(json!({ "memo-1": { "row": 0, "col": 0 } }));
        let expected = record.state.clone();

        let desktop = DesktopState::from_record(record, GridBounds::DEFAULT).expect("hydrate");
        assert_eq!(desktop.layout, expected);
        assert_eq!(desktop.baseline, expected);
        assert_eq!(desktop.windows.next_z_index, INITIAL_Z_INDEX);
        assert!(!desktop.windows.help.visible);
        assert_eq!(
            desktop.windows.help.frame.z_index,
            INITIAL_Z_INDEX + HELP_WINDOW_Z_OFFSET
        );
    }

    #[test]
    fn hydration_refuses_a_malformed_snapshot() {
        // Root icon with no grid position.
        let record = server_record(json!({}));
        let err = DesktopState::from_record(record, GridBounds::DEFAULT).expect_err("must refuse");
        assert_eq!(
            err,
            HydrateError::Invalid(LayoutError::MissingRootPosition("memo-1".into()))
        );
    }
}
