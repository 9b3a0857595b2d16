//! Change tracking and reconciliation against the persistence
//! collaborator.
//!
//! The session keeps two layout snapshots: the live one mutated by the
//! reducer, and the baseline captured at the last successful save.
//! Dirtiness is a structural comparison of the two via a canonical
//! fingerprint rather than serialized-string equality, so map key order
//! can never produce a false positive. Saves are optimistic: the live
//! state is never rolled back on failure, the baseline simply does not
//! advance, and the dirty banner stays up for a retry/revert decision.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use thiserror::Error;

use vdesk_contract::{validate_layout, LayoutError, LayoutState};

use crate::model::DesktopState;
use crate::window_manager;

/// Failure reported by the persistence collaborator for a save call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The request never completed.
    #[error("network error: {0}")]
    Network(String),
    /// The server refused the submitted state.
    #[error("server rejected the desktop state: {0}")]
    Rejected(String),
}

/// Failure of a [`save_desktop`] attempt. Local state is preserved in
/// both cases.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SaveError {
    /// The live state would violate the persistence schema; nothing was
    /// sent.
    #[error("desktop state failed validation: {0}")]
    Invalid(#[from] LayoutError),
    /// The persistence collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The persistence collaborator boundary: one idempotent "replace state"
/// call per desktop.
///
/// The engine stays synchronous; async hosts adapt this trait at their
/// I/O boundary and keep interacting with the optimistically mutated
/// state while a save is in flight.
pub trait DesktopStore {
    /// Replaces the persisted layout for `desktop_id` with `state`.
    fn replace_state(&mut self, desktop_id: &str, state: &LayoutState) -> Result<(), StoreError>;
}

/// Canonical structural fingerprint of a layout snapshot.
pub fn layout_fingerprint(layout: &LayoutState) -> u64 {
    let mut hasher = DefaultHasher::new();
    layout.hash(&mut hasher);
    hasher.finish()
}

/// Returns whether the live layout has diverged from the last persisted
/// baseline.
pub fn desktop_is_dirty(state: &DesktopState) -> bool {
    layout_fingerprint(&state.layout) != layout_fingerprint(&state.baseline)
}

/// Sends the full live snapshot to the persistence collaborator.
///
/// The snapshot is validated first; an ill-formed state is refused
/// without a network round trip. On success the baseline advances to a
/// deep copy of the live state. On any failure both snapshots are left
/// exactly as they were.
///
/// # Errors
///
/// [`SaveError::Invalid`] when the live state violates the layout
/// schema, [`SaveError::Store`] when the collaborator fails.
pub fn save_desktop(
    state: &mut DesktopState,
    store: &mut dyn DesktopStore,
) -> Result<(), SaveError> {
    if let Err(err) = validate_layout(&state.layout, state.bounds) {
        log::warn!("refusing to persist desktop `{}`: {err}", state.desktop_id);
        return Err(SaveError::Invalid(err));
    }
    store.replace_state(&state.desktop_id, &state.layout)?;
    state.baseline = state.layout.clone();
    Ok(())
}

/// Discards every pending edit: the live layout becomes a deep copy of
/// the baseline, and windows whose backing icon was reverted away (or
/// whose folder is no longer root) are closed.
pub fn revert_desktop(state: &mut DesktopState) {
    state.layout = state.baseline.clone();
    window_manager::retain_backed_windows(&mut state.windows, &state.layout);
}
