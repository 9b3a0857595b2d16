//! Desktop state & interaction engine.
//!
//! A framework-agnostic core for a browser-rendered virtual desktop: a
//! grid of draggable icons (websites, memos, folders, stamps) opening
//! into movable, stackable windows. The rendering layer dispatches
//! [`reducer::DesktopAction`]s and subscribes to [`model::DesktopState`];
//! every invariant (unique ids, unique grid cells, acyclic folder graph,
//! root/position consistency) is owned here and by the shared
//! [`vdesk_contract`] schema.

pub mod export;
pub mod folders;
pub mod grid;
pub mod model;
pub mod reducer;
pub mod session;
pub mod window_manager;

pub use export::render_listing;
pub use model::*;
pub use reducer::{reduce_desktop, DesktopAction, EngineError, IconPlacement, RuntimeEffect};
pub use session::{
    desktop_is_dirty, layout_fingerprint, revert_desktop, save_desktop, DesktopStore, SaveError,
    StoreError,
};
