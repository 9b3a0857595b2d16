//! Window pool transitions shared by the desktop reducer.
//!
//! Four independent pools (memo, browser, folder, help singleton) share
//! one strictly increasing z-index counter, so "most recently
//! focused/opened" is a total order across kinds. Windows are created on
//! first open at a cascading offset, reused with their geometry intact on
//! later opens, and destroyed on close or when their backing icon goes
//! away.

use vdesk_contract::{IconColor, IconId, LayoutState};

use crate::model::{
    BrowserWindow, FolderWindow, MemoWindow, WindowFrame, WindowRect, WindowRef, WindowSet,
};

/// Minimum window width enforced on resize.
pub const MIN_WINDOW_WIDTH: i32 = 300;
/// Minimum window height enforced on resize.
pub const MIN_WINDOW_HEIGHT: i32 = 200;
/// Pixel offset between successive windows of one kind, so repeated
/// opens do not perfectly overlap.
pub const WINDOW_CASCADE_STEP: i32 = 30;

/// Hands out the next z-index. Monotonic for the session lifetime.
pub fn allocate_z(windows: &mut WindowSet) -> u64 {
    let z = windows.next_z_index;
    windows.next_z_index += 1;
    z
}

/// Opens (or refocuses) the memo window for a memo icon.
pub fn open_memo(
    windows: &mut WindowSet,
    id: &IconId,
    title: &str,
    content: &str,
    color: &IconColor,
) {
    if let Some(index) = windows.memo.iter().position(|window| &window.id == id) {
        let z = allocate_z(windows);
        let window = &mut windows.memo[index];
        window.frame.z_index = z;
        window.frame.minimized = false;
        window.color = color.clone();
        return;
    }

    let z = allocate_z(windows);
    let cascade = windows.memo.len() as i32 * WINDOW_CASCADE_STEP;
    windows.memo.push(MemoWindow {
        id: id.clone(),
        title: title.to_string(),
        content: content.to_string(),
        color: color.clone(),
        frame: WindowFrame {
            rect: WindowRect {
                x: 100 + cascade,
                y: 100 + cascade,
                width: 600,
                height: 400,
            },
            z_index: z,
            minimized: false,
        },
    });
}

/// Opens (or refocuses) the browser window for a website icon.
pub fn open_browser(
    windows: &mut WindowSet,
    id: &IconId,
    title: &str,
    url: &str,
    favicon: Option<&str>,
    color: &IconColor,
) {
    if let Some(index) = windows.browser.iter().position(|window| &window.id == id) {
        let z = allocate_z(windows);
        let window = &mut windows.browser[index];
        window.frame.z_index = z;
        window.frame.minimized = false;
        window.color = color.clone();
        return;
    }

    let z = allocate_z(windows);
    let cascade = windows.browser.len() as i32 * WINDOW_CASCADE_STEP;
    windows.browser.push(BrowserWindow {
        id: id.clone(),
        title: title.to_string(),
        url: url.to_string(),
        favicon: favicon.map(str::to_string),
        color: color.clone(),
        frame: WindowFrame {
            rect: WindowRect {
                x: 150 + cascade,
                y: 80 + cascade,
                width: 1000,
                height: 700,
            },
            z_index: z,
            minimized: false,
        },
    });
}

/// Opens (or refocuses) the folder window for a folder icon.
pub fn open_folder(windows: &mut WindowSet, id: &IconId, title: &str, color: &IconColor) {
    if let Some(index) = windows.folder.iter().position(|window| &window.id == id) {
        let z = allocate_z(windows);
        let window = &mut windows.folder[index];
        window.frame.z_index = z;
        window.frame.minimized = false;
        window.color = color.clone();
        return;
    }

    let z = allocate_z(windows);
    let cascade = windows.folder.len() as i32 * WINDOW_CASCADE_STEP;
    windows.folder.push(FolderWindow {
        id: id.clone(),
        title: title.to_string(),
        color: color.clone(),
        frame: WindowFrame {
            rect: WindowRect {
                x: 200 + cascade,
                y: 120 + cascade,
                width: 800,
                height: 600,
            },
            z_index: z,
            minimized: false,
        },
    });
}

/// Shows the help window (opening it on top) with the given topic.
pub fn open_help(windows: &mut WindowSet, topic: &str) {
    let z = allocate_z(windows);
    windows.help.visible = true;
    windows.help.topic = topic.to_string();
    windows.help.frame.z_index = z;
}

/// Hides the help window, keeping its geometry for the next open.
pub fn close_help(windows: &mut WindowSet) {
    windows.help.visible = false;
}

/// Brings a window to the front by allocating it a fresh z-index.
/// No other state changes. Returns `false` when the window is not open.
pub fn focus(windows: &mut WindowSet, target: &WindowRef) -> bool {
    let z = windows.next_z_index;
    let Some(frame) = frame_mut(windows, target) else {
        return false;
    };
    frame.z_index = z;
    windows.next_z_index += 1;
    true
}

/// Closes a window. For the help singleton this just hides it.
/// Returns `false` when the window is not open.
pub fn close(windows: &mut WindowSet, target: &WindowRef) -> bool {
    match target {
        WindowRef::Memo(id) => retain_pool(&mut windows.memo, |window| &window.id != id),
        WindowRef::Browser(id) => retain_pool(&mut windows.browser, |window| &window.id != id),
        WindowRef::Folder(id) => retain_pool(&mut windows.folder, |window| &window.id != id),
        WindowRef::Help => {
            let was_visible = windows.help.visible;
            windows.help.visible = false;
            was_visible
        }
    }
}

/// Minimizes a browser or folder window. Minimized windows leave the
/// visible render set but keep their geometry for restore. Memo and help
/// windows do not minimize.
pub fn minimize(windows: &mut WindowSet, target: &WindowRef) -> bool {
    let window_frame = match target {
        WindowRef::Browser(id) => windows
            .browser
            .iter_mut()
            .find(|window| &window.id == id)
            .map(|window| &mut window.frame),
        WindowRef::Folder(id) => windows
            .folder
            .iter_mut()
            .find(|window| &window.id == id)
            .map(|window| &mut window.frame),
        WindowRef::Memo(_) | WindowRef::Help => None,
    };
    match window_frame {
        Some(frame) => {
            frame.minimized = true;
            true
        }
        None => false,
    }
}

/// Moves a window to an absolute position.
pub fn move_to(windows: &mut WindowSet, target: &WindowRef, x: i32, y: i32) -> bool {
    let Some(frame) = frame_mut(windows, target) else {
        return false;
    };
    frame.rect = frame.rect.at(x, y);
    true
}

/// Resizes a window, clamped to the minimum window size.
pub fn resize_to(windows: &mut WindowSet, target: &WindowRef, width: i32, height: i32) -> bool {
    let Some(frame) = frame_mut(windows, target) else {
        return false;
    };
    frame.rect = WindowRect {
        width,
        height,
        ..frame.rect
    }
    .clamped_min(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT);
    true
}

/// Force-closes every window backed by `icon_id`, across all pools.
/// Used when the backing icon is deleted or moves into a folder.
pub fn close_for_icon(windows: &mut WindowSet, icon_id: &IconId) {
    windows.memo.retain(|window| &window.id != icon_id);
    windows.browser.retain(|window| &window.id != icon_id);
    windows.folder.retain(|window| &window.id != icon_id);
}

/// Force-closes the folder window for `folder_id`, if open.
pub fn close_folder_window(windows: &mut WindowSet, folder_id: &IconId) {
    windows.folder.retain(|window| &window.id != folder_id);
}

/// Drops windows whose backing icon no longer supports them: icon gone
/// (any kind), or folder no longer root. Used after a revert discards
/// pending edits.
pub fn retain_backed_windows(windows: &mut WindowSet, layout: &LayoutState) {
    windows.memo.retain(|window| layout.icon(&window.id).is_some());
    windows
        .browser
        .retain(|window| layout.icon(&window.id).is_some());
    windows
        .folder
        .retain(|window| layout.icon(&window.id).is_some() && layout.is_root(&window.id));
}

fn frame_mut<'a>(windows: &'a mut WindowSet, target: &WindowRef) -> Option<&'a mut WindowFrame> {
    match target {
        WindowRef::Memo(id) => windows
            .memo
            .iter_mut()
            .find(|window| &window.id == id)
            .map(|window| &mut window.frame),
        WindowRef::Browser(id) => windows
            .browser
            .iter_mut()
            .find(|window| &window.id == id)
            .map(|window| &mut window.frame),
        WindowRef::Folder(id) => windows
            .folder
            .iter_mut()
            .find(|window| &window.id == id)
            .map(|window| &mut window.frame),
        WindowRef::Help => Some(&mut windows.help.frame),
    }
}

fn retain_pool<T>(pool: &mut Vec<T>, keep: impl FnMut(&T) -> bool) -> bool {
    let before = pool.len();
    pool.retain(keep);
    pool.len() != before
}
