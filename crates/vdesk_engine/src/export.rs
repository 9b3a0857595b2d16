//! Read-only export of the desktop as a human-readable listing.
//!
//! A pure function of the current snapshot: website and memo entries are
//! flattened depth-first (roots in icon order, folder children in child
//! list order) and grouped by their folder path. No mutation, no clock;
//! the caller supplies the timestamp string.

use vdesk_contract::{IconId, IconKind, LayoutState};

use crate::model::DesktopState;

struct WebsiteEntry {
    name: String,
    url: String,
    path: Vec<String>,
}

struct MemoEntry {
    name: String,
    content: String,
    path: Vec<String>,
}

/// Renders the current icon/folder graph as a plain-text listing.
pub fn render_listing(state: &DesktopState, generated_at: &str) -> String {
    let layout = &state.layout;
    let mut websites = Vec::new();
    let mut memos = Vec::new();

    for icon in &layout.app_items {
        if layout.is_root(&icon.id) {
            visit(layout, &icon.id, &[], &mut websites, &mut memos);
        }
    }

    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("Desktop: {}", state.name));
    lines.push(format!("Generated: {generated_at}"));
    lines.push(String::new());

    lines.push("Websites:".to_string());
    if websites.is_empty() {
        lines.push("- (none)".to_string());
    } else {
        for (index, entry) in websites.iter().enumerate() {
            lines.push(format!(
                "{}. {}{}",
                index + 1,
                path_prefix(&entry.path),
                entry.name
            ));
            lines.push(format!("   URL: {}", entry.url));
        }
    }

    lines.push(String::new());
    lines.push("Memos:".to_string());
    if memos.is_empty() {
        lines.push("- (none)".to_string());
    } else {
        for (index, entry) in memos.iter().enumerate() {
            lines.push(format!(
                "{}. {}{}",
                index + 1,
                path_prefix(&entry.path),
                entry.name
            ));
            if entry.content.is_empty() {
                lines.push("   (empty)".to_string());
            } else {
                for line in entry.content.split('\n') {
                    lines.push(format!("   {}", line.trim_end_matches('\r')));
                }
            }
        }
    }

    lines.push(String::new());
    lines.push("-----".to_string());

    lines.join("\n")
}

fn visit(
    layout: &LayoutState,
    id: &IconId,
    path: &[String],
    websites: &mut Vec<WebsiteEntry>,
    memos: &mut Vec<MemoEntry>,
) {
    let Some(icon) = layout.icon(id) else {
        return;
    };

    match &icon.kind {
        IconKind::Folder { name } => {
            let mut next_path = path.to_vec();
            next_path.push(name.clone());
            if let Some(children) = layout.folder_contents.get(id) {
                for child in children {
                    visit(layout, child, &next_path, websites, memos);
                }
            }
        }
        IconKind::Website { name, url, .. } => websites.push(WebsiteEntry {
            name: name.clone(),
            url: url.clone(),
            path: path.to_vec(),
        }),
        IconKind::Memo { name, content } => memos.push(MemoEntry {
            name: name.clone(),
            content: content.clone(),
            path: path.to_vec(),
        }),
        IconKind::Stamp { .. } => {}
    }
}

fn path_prefix(path: &[String]) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("{} / ", path.join(" / "))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use vdesk_contract::{
        GridBounds, GridPosition, IconColor, IconKey, IconRecord, StampKind,
    };

    use super::*;

    fn color() -> IconColor {
        IconColor::new("#FEE2E2").expect("color")
    }

    fn desktop() -> DesktopState {
        DesktopState {
            desktop_id: "desk-1".to_string(),
            name: "main".to_string(),
            bounds: GridBounds::DEFAULT,
            layout: LayoutState::default(),
            baseline: LayoutState::default(),
            windows: Default::default(),
        }
    }

    #[test]
    fn empty_desktops_render_placeholder_sections() {
        let state = desktop();
        let listing = render_listing(&state, "2025-08-01 10:00");
        assert_eq!(
            listing,
            "Desktop: main\nGenerated: 2025-08-01 10:00\n\nWebsites:\n- (none)\n\nMemos:\n- (none)\n\n-----"
        );
    }

    #[test]
    fn entries_are_grouped_by_folder_path() {
        let mut state = desktop();
        let layout = &mut state.layout;
        layout.app_items.push(IconRecord {
            id: "work".into(),
            icon_key: IconKey::FolderIcon,
            color: color(),
            kind: IconKind::Folder {
                name: "Work".to_string(),
            },
        });
        layout.app_items.push(IconRecord {
            id: "docs".into(),
            icon_key: IconKey::Globe,
            color: color(),
            kind: IconKind::Website {
                name: "docs".to_string(),
                url: "https://docs.example.com".to_string(),
                favicon: None,
            },
        });
        layout.app_items.push(IconRecord {
            id: "todo".into(),
            icon_key: IconKey::StickyNote,
            color: color(),
            kind: IconKind::Memo {
                name: "Todo".to_string(),
                content: "one\ntwo".to_string(),
            },
        });
        layout.app_items.push(IconRecord {
            id: "deco".into(),
            icon_key: IconKey::StickyNote,
            color: color(),
            kind: IconKind::Stamp {
                stamp_type: StampKind::Star,
                stamp_text: String::new(),
            },
        });
        layout
            .app_positions
            .insert("work".into(), GridPosition { row: 0, col: 0 });
        layout
            .app_positions
            .insert("deco".into(), GridPosition { row: 0, col: 1 });
        layout
            .folder_contents
            .insert("work".into(), vec!["docs".into(), "todo".into()]);

        let listing = render_listing(&state, "now");
        let expected = concat!(
            "Desktop: main\n",
            "Generated: now\n",
            "\n",
            "Websites:\n",
            "1. Work / docs\n",
            "   URL: https://docs.example.com\n",
            "\n",
            "Memos:\n",
            "1. Work / Todo\n",
            "   one\n",
            "   two\n",
            "\n",
            "-----",
        );
        assert_eq!(listing, expected);
    }
}
