//! Folder graph operations.
//!
//! `folder_contents` is an adjacency map from folder id to ordered child
//! ids, interpreted as a directed graph that must stay acyclic. Edges are
//! ids only; records are resolved through the one canonical icon table.

use std::collections::BTreeSet;

use vdesk_contract::{IconId, LayoutState};

/// Breadth-first check whether `candidate_id` is reachable from
/// `ancestor_id` through folder child lists. This is the cycle guard for
/// every folder-into-folder move.
pub fn is_descendant(layout: &LayoutState, ancestor_id: &IconId, candidate_id: &IconId) -> bool {
    let mut visited: BTreeSet<&IconId> = BTreeSet::new();
    let mut queue: Vec<&IconId> = layout
        .folder_contents
        .get(ancestor_id)
        .map(|children| children.iter().collect())
        .unwrap_or_default();

    while let Some(current) = queue.pop() {
        if current == candidate_id {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(children) = layout.folder_contents.get(current) {
            queue.extend(children.iter());
        }
    }

    false
}

/// Returns whether parenting `source_id` under `target_id` would create a
/// self-loop or a cycle. Must be checked before any folder re-parent; a
/// `true` result makes the whole operation a silent no-op.
pub fn would_create_cycle(layout: &LayoutState, source_id: &IconId, target_id: &IconId) -> bool {
    source_id == target_id || is_descendant(layout, source_id, target_id)
}

/// Collects the full transitive closure of `folder_id`'s contents, used
/// for cascading delete.
pub fn collect_descendants(layout: &LayoutState, folder_id: &IconId) -> BTreeSet<IconId> {
    let mut descendants = BTreeSet::new();
    let mut queue: Vec<&IconId> = layout
        .folder_contents
        .get(folder_id)
        .map(|children| children.iter().collect())
        .unwrap_or_default();

    while let Some(current) = queue.pop() {
        if !descendants.insert(current.clone()) {
            continue;
        }
        if let Some(children) = layout.folder_contents.get(current) {
            queue.extend(children.iter());
        }
    }

    descendants
}

/// Removes `child_id` from `folder_id`'s child list. Returns whether the
/// list changed.
pub fn remove_child(layout: &mut LayoutState, folder_id: &IconId, child_id: &IconId) -> bool {
    let Some(children) = layout.folder_contents.get_mut(folder_id) else {
        return false;
    };
    let before = children.len();
    children.retain(|id| id != child_id);
    children.len() != before
}

/// Removes `child_id` from every folder list except `skip`.
pub fn strip_child(layout: &mut LayoutState, child_id: &IconId, skip: Option<&IconId>) {
    for (folder_id, children) in layout.folder_contents.iter_mut() {
        if Some(folder_id) == skip {
            continue;
        }
        children.retain(|id| id != child_id);
    }
}

/// Inserts `child_id` into `folder_id`'s child list.
///
/// Any existing occurrence is removed first so the child never appears
/// twice. With `at = None` the child is appended; otherwise the index is
/// clamped into the list, so inserting a child at its own current index
/// leaves the list unchanged.
pub fn insert_child(
    layout: &mut LayoutState,
    folder_id: &IconId,
    child_id: IconId,
    at: Option<usize>,
) {
    let children = layout.folder_contents.entry(folder_id.clone()).or_default();
    children.retain(|id| id != &child_id);
    match at {
        Some(index) => children.insert(index.min(children.len()), child_id),
        None => children.push(child_id),
    }
}

/// Moves `child_id` into `to_folder`'s child list, stripping it from
/// wherever it currently resides first (a root grid cell, a different
/// folder, or the same folder) so it can never end up duplicated.
///
/// `from_folder` is the known source when the move started inside a
/// folder window; `None` sweeps every other list defensively.
pub fn move_child(
    layout: &mut LayoutState,
    from_folder: Option<&IconId>,
    to_folder: &IconId,
    child_id: &IconId,
    insert_at: Option<usize>,
) {
    match from_folder {
        Some(source) => {
            remove_child(layout, source, child_id);
        }
        None => strip_child(layout, child_id, Some(to_folder)),
    }
    insert_child(layout, to_folder, child_id.clone(), insert_at);
    layout.app_positions.remove(child_id);
}

/// Derives the insertion index for an in-folder reorder drop from the
/// hovered slot and the pointer's vertical ratio within that slot's row:
/// the bottom quarter nudges insertion one slot later, the top quarter
/// one slot earlier, anything else inserts exactly at the hovered slot.
pub fn resolve_slot_insertion(slot: usize, pointer_ratio: f32) -> usize {
    if pointer_ratio > 0.75 {
        slot + 1
    } else if pointer_ratio < 0.25 {
        slot.saturating_sub(1)
    } else {
        slot
    }
}
