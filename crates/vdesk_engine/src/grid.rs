//! Grid position index operations.
//!
//! The position map inside [`LayoutState`] is the bidirectional index:
//! root icon id -> cell one way, linear scan the other. After any
//! successful operation here the coordinate-uniqueness invariant holds.

use vdesk_contract::{GridBounds, GridPosition, IconId, IconRecord, LayoutState};

/// Returns the id of the icon occupying `position`, if any.
pub fn icon_id_at(layout: &LayoutState, position: GridPosition) -> Option<&IconId> {
    layout
        .app_positions
        .iter()
        .find(|(_, occupied)| **occupied == position)
        .map(|(id, _)| id)
}

/// Returns the icon record occupying `position`, if any.
pub fn icon_at(layout: &LayoutState, position: GridPosition) -> Option<&IconRecord> {
    icon_id_at(layout, position).and_then(|id| layout.icon(id))
}

/// Scans the grid row-major and returns the first free cell, or `None`
/// when the desktop is full. Used when an icon leaves a folder and needs
/// a cell to land on.
pub fn next_empty_cell(layout: &LayoutState, bounds: GridBounds) -> Option<GridPosition> {
    bounds
        .cells()
        .find(|cell| icon_id_at(layout, *cell).is_none())
}

/// Places `icon_id` at `position`. Fails (returning `false`, with no
/// mutation) when the cell is outside the grid or held by another icon;
/// callers resolve occupancy by swapping or re-parenting instead.
pub fn place(
    layout: &mut LayoutState,
    icon_id: &IconId,
    position: GridPosition,
    bounds: GridBounds,
) -> bool {
    if !bounds.contains(position) {
        return false;
    }
    if matches!(icon_id_at(layout, position), Some(occupant) if occupant != icon_id) {
        return false;
    }
    layout.app_positions.insert(icon_id.clone(), position);
    true
}

/// Removes the position held by `icon_id`, returning the freed cell.
pub fn remove(layout: &mut LayoutState, icon_id: &IconId) -> Option<GridPosition> {
    layout.app_positions.remove(icon_id)
}
