//! Reducer actions, side-effect intents, and transition logic for the
//! desktop engine.
//!
//! [`reduce_desktop`] is the authoritative state transition engine: UI
//! gestures arrive as [`DesktopAction`]s, mutate the [`DesktopState`]
//! synchronously, and come back with the side-effect intents the host
//! must execute (currently just favicon probes). Illegal drops are
//! converted into no-ops here and never escape as errors; only form-level
//! validation and programmer errors (acting on missing windows/icons)
//! surface as [`EngineError`].

use thiserror::Error;

use vdesk_contract::{
    url_host, validate_icon, GridPosition, IconColor, IconId, IconKey, IconKind, IconRecord,
    IconValidationError, StampKind,
};

use crate::folders;
use crate::grid;
use crate::model::{DesktopState, DragOrigin, DragSession, InteractionState, WindowRef, WindowSet};
use crate::window_manager;

/// Where a newly created icon lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconPlacement {
    /// A desktop grid cell (must be free).
    Cell(GridPosition),
    /// Appended to a folder's child list.
    Folder(IconId),
}

/// Actions accepted by [`reduce_desktop`] to mutate a [`DesktopState`].
#[derive(Debug, Clone, PartialEq)]
pub enum DesktopAction {
    /// Create a memo icon with a server-issued id.
    CreateMemo {
        /// Server-issued icon id.
        id: IconId,
        /// Memo name (1-30 characters).
        name: String,
        /// Accent color.
        color: IconColor,
        /// Target cell or folder.
        placement: IconPlacement,
    },
    /// Create a website icon. The engine normalizes the URL, derives the
    /// display name and favicon from the hostname, and emits a
    /// [`RuntimeEffect::ProbeFavicon`] for the host to resolve.
    CreateWebsite {
        /// Server-issued icon id.
        id: IconId,
        /// User-entered URL; `https://` is assumed when no scheme given.
        url: String,
        /// Accent color.
        color: IconColor,
        /// Target cell or folder.
        placement: IconPlacement,
    },
    /// Create a folder icon with an empty child list.
    CreateFolder {
        /// Server-issued icon id.
        id: IconId,
        /// Folder name (1-30 characters).
        name: String,
        /// Accent color.
        color: IconColor,
        /// Target cell or folder.
        placement: IconPlacement,
    },
    /// Create a decorative stamp. Stamps live on desktop cells only.
    CreateStamp {
        /// Server-issued icon id.
        id: IconId,
        /// Stamp asset.
        stamp_type: StampKind,
        /// Target cell.
        position: GridPosition,
    },
    /// Apply the result of an earlier favicon existence probe. Unknown
    /// icons are ignored (the icon may have been deleted while the probe
    /// was in flight).
    ApplyFaviconProbe {
        /// Probed website icon.
        icon_id: IconId,
        /// Whether the URL answered the probe.
        reachable: bool,
    },
    /// Replace the variant-relevant editable fields of an icon. The
    /// variant itself never changes; open windows are retitled.
    EditIcon {
        /// Icon to edit.
        icon_id: IconId,
        /// New display name, when changed.
        name: Option<String>,
        /// New accent color, when changed.
        color: Option<IconColor>,
        /// New URL (website icons only), when changed.
        url: Option<String>,
        /// New caption (stamp icons only), when changed.
        stamp_text: Option<String>,
    },
    /// Write a memo window's edited body through to its icon.
    UpdateMemoContent {
        /// Backing memo icon.
        icon_id: IconId,
        /// New body.
        content: String,
    },
    /// Delete an icon. Folders cascade to their whole subtree; every
    /// affected window is force-closed.
    DeleteIcon {
        /// Icon to delete.
        icon_id: IconId,
    },
    /// Extract an icon from a folder onto the first empty desktop cell.
    RemoveFromFolder {
        /// Folder currently holding the icon.
        folder_id: IconId,
        /// Icon to extract.
        icon_id: IconId,
    },
    /// Begin dragging a desktop icon from its grid cell.
    BeginDrag {
        /// Icon being dragged.
        icon_id: IconId,
    },
    /// Begin dragging an item out of an open folder window.
    BeginFolderItemDrag {
        /// Icon being dragged.
        icon_id: IconId,
        /// Folder window it is dragged out of.
        folder_id: IconId,
    },
    /// Abandon the in-flight drag without dropping.
    CancelDrag,
    /// Drop the dragged icon on a desktop cell.
    DropOnCell {
        /// Target cell.
        position: GridPosition,
    },
    /// Drop the dragged icon into a folder (window background or a
    /// folder icon nested in another folder window); appends.
    DropIntoFolder {
        /// Target folder.
        folder_id: IconId,
    },
    /// Drop the dragged icon on a specific slot inside a folder window,
    /// reordering or inserting at the pointer-derived index.
    DropAtFolderSlot {
        /// Target folder.
        folder_id: IconId,
        /// Hovered slot index.
        slot: usize,
        /// Pointer's vertical ratio within the hovered row (0.0 top,
        /// 1.0 bottom).
        pointer_ratio: f32,
    },
    /// Open (or refocus) the window for an icon. Stamps do nothing.
    ActivateIcon {
        /// Icon to activate.
        icon_id: IconId,
    },
    /// Bring a window to the front.
    FocusWindow {
        /// Window to focus.
        target: WindowRef,
    },
    /// Close a window. Closing never touches persisted state.
    CloseWindow {
        /// Window to close.
        target: WindowRef,
    },
    /// Minimize a browser or folder window; other targets are ignored.
    MinimizeWindow {
        /// Window to minimize.
        target: WindowRef,
    },
    /// Move a window to an absolute position.
    MoveWindow {
        /// Window to move.
        target: WindowRef,
        /// New left edge.
        x: i32,
        /// New top edge.
        y: i32,
    },
    /// Resize a window (clamped to the minimum window size).
    ResizeWindow {
        /// Window to resize.
        target: WindowRef,
        /// New width.
        width: i32,
        /// New height.
        height: i32,
    },
    /// Show the help window with a topic.
    OpenHelp {
        /// Help topic key.
        topic: String,
    },
    /// Hide the help window.
    CloseHelp,
}

/// Side-effect intents emitted by [`reduce_desktop`] for the host to
/// execute outside the synchronous transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEffect {
    /// The layout changed; hosts typically recompute the dirty banner.
    LayoutChanged,
    /// Probe a URL for reachability and report back with
    /// [`DesktopAction::ApplyFaviconProbe`]. Best-effort and advisory.
    ProbeFavicon {
        /// Icon whose favicon is pending.
        icon_id: IconId,
        /// URL to probe.
        url: String,
    },
}

/// Errors surfaced by [`reduce_desktop`] for invalid actions.
///
/// Drop rejections are deliberately *not* here: an illegal drop is a
/// silent no-op, not an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The referenced icon is not part of this desktop.
    #[error("icon not found")]
    IconNotFound,
    /// The referenced window is not open.
    #[error("window not found")]
    WindowNotFound,
    /// The placement target folder does not exist (or is not a folder).
    #[error("folder not found")]
    FolderNotFound,
    /// An icon with this id already exists.
    #[error("icon id already exists")]
    DuplicateIconId,
    /// The target cell already holds an icon.
    #[error("cell is already occupied")]
    CellOccupied,
    /// The target cell lies outside the desktop grid.
    #[error("cell is outside the desktop grid")]
    OutOfBounds,
    /// No free cell is left on the desktop.
    #[error("the desktop grid is full")]
    GridFull,
    /// A creation/edit form value failed validation.
    #[error(transparent)]
    Icon(#[from] IconValidationError),
}

/// Applies a [`DesktopAction`] to the desktop state and collects the
/// resulting side effects.
///
/// # Errors
///
/// Returns an [`EngineError`] for form-level validation failures and for
/// actions referencing icons or windows that do not exist. Rejected
/// drag-and-drop gestures return `Ok` with the state untouched.
pub fn reduce_desktop(
    state: &mut DesktopState,
    interaction: &mut InteractionState,
    action: DesktopAction,
) -> Result<Vec<RuntimeEffect>, EngineError> {
    match action {
        DesktopAction::CreateMemo {
            id,
            name,
            color,
            placement,
        } => {
            let icon = IconRecord {
                id,
                icon_key: IconKey::StickyNote,
                color,
                kind: IconKind::Memo {
                    name: name.trim().to_string(),
                    content: String::new(),
                },
            };
            create_icon(state, icon, placement)
        }
        DesktopAction::CreateWebsite {
            id,
            url,
            color,
            placement,
        } => {
            let url = normalize_url(&url);
            let name = derive_site_name(&url)
                .ok_or_else(|| IconValidationError::InvalidUrl(url.clone()))?;
            let favicon = favicon_url_for(&url);
            let icon = IconRecord {
                id: id.clone(),
                icon_key: IconKey::Globe,
                color,
                kind: IconKind::Website {
                    name,
                    url: url.clone(),
                    favicon,
                },
            };
            let mut effects = create_icon(state, icon, placement)?;
            effects.push(RuntimeEffect::ProbeFavicon { icon_id: id, url });
            Ok(effects)
        }
        DesktopAction::CreateFolder {
            id,
            name,
            color,
            placement,
        } => {
            let icon = IconRecord {
                id: id.clone(),
                icon_key: IconKey::FolderIcon,
                color,
                kind: IconKind::Folder {
                    name: name.trim().to_string(),
                },
            };
            let effects = create_icon(state, icon, placement)?;
            state.layout.folder_contents.entry(id).or_default();
            Ok(effects)
        }
        DesktopAction::CreateStamp {
            id,
            stamp_type,
            position,
        } => {
            let icon = IconRecord {
                id,
                icon_key: IconKey::StickyNote,
                color: IconColor::new("#FFEB3B")?,
                kind: IconKind::Stamp {
                    stamp_type,
                    stamp_text: String::new(),
                },
            };
            create_icon(state, icon, IconPlacement::Cell(position))
        }
        DesktopAction::ApplyFaviconProbe { icon_id, reachable } => {
            if reachable {
                return Ok(Vec::new());
            }
            let Some(icon) = state.layout.icon_mut(&icon_id) else {
                // Deleted while the probe was in flight.
                return Ok(Vec::new());
            };
            let IconKind::Website { favicon, .. } = &mut icon.kind else {
                return Ok(Vec::new());
            };
            if favicon.take().is_none() {
                return Ok(Vec::new());
            }
            let icon = icon.clone();
            sync_windows_with_icon(&mut state.windows, &icon);
            Ok(vec![RuntimeEffect::LayoutChanged])
        }
        DesktopAction::EditIcon {
            icon_id,
            name,
            color,
            url,
            stamp_text,
        } => {
            let record = state.layout.icon(&icon_id).ok_or(EngineError::IconNotFound)?;
            let mut updated = record.clone();
            if let Some(color) = color {
                updated.color = color;
            }
            match &mut updated.kind {
                IconKind::Website {
                    name: current_name,
                    url: current_url,
                    ..
                } => {
                    if let Some(name) = name {
                        *current_name = name.trim().to_string();
                    }
                    if let Some(url) = url {
                        *current_url = normalize_url(&url);
                    }
                }
                IconKind::Memo {
                    name: current_name, ..
                }
                | IconKind::Folder { name: current_name } => {
                    if let Some(name) = name {
                        *current_name = name.trim().to_string();
                    }
                }
                IconKind::Stamp {
                    stamp_text: current_text,
                    ..
                } => {
                    if let Some(stamp_text) = stamp_text {
                        *current_text = stamp_text;
                    }
                }
            }
            validate_icon(&updated)?;
            *state
                .layout
                .icon_mut(&icon_id)
                .ok_or(EngineError::IconNotFound)? = updated.clone();
            sync_windows_with_icon(&mut state.windows, &updated);
            Ok(vec![RuntimeEffect::LayoutChanged])
        }
        DesktopAction::UpdateMemoContent { icon_id, content } => {
            let Some(icon) = state.layout.icon_mut(&icon_id) else {
                return Err(EngineError::IconNotFound);
            };
            let IconKind::Memo {
                content: current, ..
            } = &mut icon.kind
            else {
                return Ok(Vec::new());
            };
            *current = content.clone();
            if let Some(window) = state
                .windows
                .memo
                .iter_mut()
                .find(|window| window.id == icon_id)
            {
                window.content = content;
            }
            Ok(vec![RuntimeEffect::LayoutChanged])
        }
        DesktopAction::DeleteIcon { icon_id } => {
            if state.layout.icon(&icon_id).is_none() {
                return Err(EngineError::IconNotFound);
            }
            // Non-folders have no contents entry, so the closure is empty.
            let mut doomed = folders::collect_descendants(&state.layout, &icon_id);
            doomed.insert(icon_id.clone());
            state.layout.app_items.retain(|icon| !doomed.contains(&icon.id));
            for id in &doomed {
                state.layout.app_positions.remove(id);
                state.layout.folder_contents.remove(id);
            }
            for children in state.layout.folder_contents.values_mut() {
                children.retain(|id| !doomed.contains(id));
            }
            for id in &doomed {
                window_manager::close_for_icon(&mut state.windows, id);
            }
            Ok(vec![RuntimeEffect::LayoutChanged])
        }
        DesktopAction::RemoveFromFolder { folder_id, icon_id } => {
            let held = state
                .layout
                .folder_contents
                .get(&folder_id)
                .is_some_and(|children| children.contains(&icon_id));
            if !held {
                return Err(EngineError::IconNotFound);
            }
            let cell =
                grid::next_empty_cell(&state.layout, state.bounds).ok_or(EngineError::GridFull)?;
            folders::remove_child(&mut state.layout, &folder_id, &icon_id);
            state.layout.app_positions.insert(icon_id, cell);
            Ok(vec![RuntimeEffect::LayoutChanged])
        }
        DesktopAction::BeginDrag { icon_id } => {
            if state.layout.icon(&icon_id).is_none() {
                return Err(EngineError::IconNotFound);
            }
            // Starting a drag implicitly cancels any stale one.
            interaction.drag = state
                .layout
                .app_positions
                .get(&icon_id)
                .map(|position| DragSession {
                    icon_id,
                    origin: DragOrigin::Cell(*position),
                });
            Ok(Vec::new())
        }
        DesktopAction::BeginFolderItemDrag { icon_id, folder_id } => {
            if state.layout.icon(&icon_id).is_none() {
                return Err(EngineError::IconNotFound);
            }
            interaction.drag = Some(DragSession {
                icon_id,
                origin: DragOrigin::Folder(folder_id),
            });
            Ok(Vec::new())
        }
        DesktopAction::CancelDrag => {
            interaction.drag = None;
            Ok(Vec::new())
        }
        DesktopAction::DropOnCell { position } => drop_on_cell(state, interaction, position),
        DesktopAction::DropIntoFolder { folder_id } => {
            drop_into_folder(state, interaction, folder_id, None)
        }
        DesktopAction::DropAtFolderSlot {
            folder_id,
            slot,
            pointer_ratio,
        } => {
            let insert_at = folders::resolve_slot_insertion(slot, pointer_ratio);
            drop_into_folder(state, interaction, folder_id, Some(insert_at))
        }
        DesktopAction::ActivateIcon { icon_id } => {
            let icon = state.layout.icon(&icon_id).ok_or(EngineError::IconNotFound)?;
            match &icon.kind {
                IconKind::Memo { name, content } => window_manager::open_memo(
                    &mut state.windows,
                    &icon.id,
                    name,
                    content,
                    &icon.color,
                ),
                IconKind::Website { name, url, favicon } => window_manager::open_browser(
                    &mut state.windows,
                    &icon.id,
                    name,
                    url,
                    favicon.as_deref(),
                    &icon.color,
                ),
                IconKind::Folder { name } => {
                    window_manager::open_folder(&mut state.windows, &icon.id, name, &icon.color)
                }
                IconKind::Stamp { .. } => {}
            }
            Ok(Vec::new())
        }
        DesktopAction::FocusWindow { target } => {
            if !window_manager::focus(&mut state.windows, &target) {
                return Err(EngineError::WindowNotFound);
            }
            Ok(Vec::new())
        }
        DesktopAction::CloseWindow { target } => {
            if !window_manager::close(&mut state.windows, &target) {
                return Err(EngineError::WindowNotFound);
            }
            Ok(Vec::new())
        }
        DesktopAction::MinimizeWindow { target } => {
            if !window_manager::minimize(&mut state.windows, &target) {
                log::debug!("minimize ignored for {target:?}");
            }
            Ok(Vec::new())
        }
        DesktopAction::MoveWindow { target, x, y } => {
            if !window_manager::move_to(&mut state.windows, &target, x, y) {
                return Err(EngineError::WindowNotFound);
            }
            Ok(Vec::new())
        }
        DesktopAction::ResizeWindow {
            target,
            width,
            height,
        } => {
            if !window_manager::resize_to(&mut state.windows, &target, width, height) {
                return Err(EngineError::WindowNotFound);
            }
            Ok(Vec::new())
        }
        DesktopAction::OpenHelp { topic } => {
            window_manager::open_help(&mut state.windows, &topic);
            Ok(Vec::new())
        }
        DesktopAction::CloseHelp => {
            window_manager::close_help(&mut state.windows);
            Ok(Vec::new())
        }
    }
}

/// Validates and commits a freshly created icon at its placement.
fn create_icon(
    state: &mut DesktopState,
    icon: IconRecord,
    placement: IconPlacement,
) -> Result<Vec<RuntimeEffect>, EngineError> {
    if state.layout.icon(&icon.id).is_some() {
        return Err(EngineError::DuplicateIconId);
    }
    validate_icon(&icon)?;
    match &placement {
        IconPlacement::Cell(position) => {
            if !state.bounds.contains(*position) {
                return Err(EngineError::OutOfBounds);
            }
            if grid::icon_id_at(&state.layout, *position).is_some() {
                return Err(EngineError::CellOccupied);
            }
        }
        IconPlacement::Folder(folder_id) => match state.layout.icon(folder_id) {
            Some(target) if target.is_folder() => {}
            _ => return Err(EngineError::FolderNotFound),
        },
    }

    let id = icon.id.clone();
    state.layout.app_items.push(icon);
    match placement {
        IconPlacement::Cell(position) => {
            state.layout.app_positions.insert(id, position);
        }
        IconPlacement::Folder(folder_id) => {
            folders::insert_child(&mut state.layout, &folder_id, id, None);
        }
    }
    Ok(vec![RuntimeEffect::LayoutChanged])
}

fn drop_on_cell(
    state: &mut DesktopState,
    interaction: &mut InteractionState,
    position: GridPosition,
) -> Result<Vec<RuntimeEffect>, EngineError> {
    let Some(drag) = interaction.drag.take() else {
        return rejected("no drag in flight");
    };
    if !state.bounds.contains(position) {
        return rejected("target cell is outside the grid");
    }
    let Some(dragged) = state.layout.icon(&drag.icon_id) else {
        return rejected("dragged icon no longer exists");
    };
    let dragged_is_stamp = dragged.is_stamp();
    let dragged_is_folder = dragged.is_folder();
    let dragged_id = drag.icon_id.clone();
    let target = grid::icon_at(&state.layout, position)
        .map(|icon| (icon.id.clone(), icon.is_folder()));

    match target {
        // Dropping a containable icon onto a folder re-parents it.
        Some((target_id, true)) if !dragged_is_stamp => {
            if dragged_is_folder
                && folders::would_create_cycle(&state.layout, &dragged_id, &target_id)
            {
                return rejected("move would nest a folder inside itself");
            }
            if let DragOrigin::Folder(source_folder) = &drag.origin {
                folders::remove_child(&mut state.layout, source_folder, &dragged_id);
            }
            folders::insert_child(&mut state.layout, &target_id, dragged_id.clone(), None);
            grid::remove(&mut state.layout, &dragged_id);
            if dragged_is_folder {
                window_manager::close_folder_window(&mut state.windows, &dragged_id);
            }
            Ok(vec![RuntimeEffect::LayoutChanged])
        }
        // Occupied cell: swap, or relocate the occupant when the mover
        // has no cell of its own to give back.
        Some((target_id, _)) => match &drag.origin {
            DragOrigin::Folder(source_folder) => {
                if dragged_is_stamp {
                    return rejected("stamps cannot come out of folders");
                }
                let Some(spare) = grid::next_empty_cell(&state.layout, state.bounds) else {
                    return rejected("no free cell for the displaced icon");
                };
                let source_folder = source_folder.clone();
                state.layout.app_positions.insert(dragged_id.clone(), position);
                state.layout.app_positions.insert(target_id, spare);
                folders::remove_child(&mut state.layout, &source_folder, &dragged_id);
                Ok(vec![RuntimeEffect::LayoutChanged])
            }
            DragOrigin::Cell(origin) => {
                let origin = *origin;
                state.layout.app_positions.insert(dragged_id, position);
                state.layout.app_positions.insert(target_id, origin);
                Ok(vec![RuntimeEffect::LayoutChanged])
            }
        },
        // Empty cell: plain move.
        None => {
            state.layout.app_positions.insert(dragged_id.clone(), position);
            if let DragOrigin::Folder(source_folder) = &drag.origin {
                let source_folder = source_folder.clone();
                folders::remove_child(&mut state.layout, &source_folder, &dragged_id);
            }
            Ok(vec![RuntimeEffect::LayoutChanged])
        }
    }
}

/// Shared policy for folder-targeted drops: the folder-window drop zone
/// and nested folder icons append (`insert_at = None`); slot drops insert
/// at the derived index.
fn drop_into_folder(
    state: &mut DesktopState,
    interaction: &mut InteractionState,
    folder_id: IconId,
    insert_at: Option<usize>,
) -> Result<Vec<RuntimeEffect>, EngineError> {
    let Some(drag) = interaction.drag.take() else {
        return rejected("no drag in flight");
    };
    let Some(dragged) = state.layout.icon(&drag.icon_id) else {
        return rejected("dragged icon no longer exists");
    };
    if dragged.is_stamp() {
        return rejected("stamps are desktop-only decorations");
    }
    let dragged_is_folder = dragged.is_folder();
    let dragged_id = drag.icon_id.clone();
    if dragged_id == folder_id {
        return rejected("cannot drop a folder into itself");
    }
    match state.layout.icon(&folder_id) {
        Some(target) if target.is_folder() => {}
        _ => return rejected("drop target is not a folder"),
    }
    if dragged_is_folder && folders::would_create_cycle(&state.layout, &dragged_id, &folder_id) {
        return rejected("move would nest a folder inside itself");
    }

    let source_folder = match &drag.origin {
        DragOrigin::Folder(source_folder) => Some(source_folder.clone()),
        DragOrigin::Cell(_) => None,
    };
    folders::move_child(
        &mut state.layout,
        source_folder.as_ref(),
        &folder_id,
        &dragged_id,
        insert_at,
    );
    if dragged_is_folder {
        window_manager::close_folder_window(&mut state.windows, &dragged_id);
    }
    Ok(vec![RuntimeEffect::LayoutChanged])
}

fn rejected(reason: &str) -> Result<Vec<RuntimeEffect>, EngineError> {
    log::debug!("drop ignored: {reason}");
    Ok(Vec::new())
}

/// Mirrors an edited icon into any window it backs.
fn sync_windows_with_icon(windows: &mut WindowSet, icon: &IconRecord) {
    match &icon.kind {
        IconKind::Memo { name, .. } => {
            if let Some(window) = windows.memo.iter_mut().find(|window| window.id == icon.id) {
                window.title = name.clone();
                window.color = icon.color.clone();
            }
        }
        IconKind::Website { name, url, favicon } => {
            if let Some(window) = windows
                .browser
                .iter_mut()
                .find(|window| window.id == icon.id)
            {
                window.title = name.clone();
                window.url = url.clone();
                window.favicon = favicon.clone();
                window.color = icon.color.clone();
            }
        }
        IconKind::Folder { name } => {
            if let Some(window) = windows
                .folder
                .iter_mut()
                .find(|window| window.id == icon.id)
            {
                window.title = name.clone();
                window.color = icon.color.clone();
            }
        }
        IconKind::Stamp { .. } => {}
    }
}

fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

fn derive_site_name(url: &str) -> Option<String> {
    url_host(url).map(|host| host.strip_prefix("www.").unwrap_or(host).to_string())
}

fn favicon_url_for(url: &str) -> Option<String> {
    url_host(url).map(|host| format!("https://www.google.com/s2/favicons?domain={host}&sz=64"))
}
