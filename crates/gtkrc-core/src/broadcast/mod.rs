//! Recipient selection for "send to all windows" broadcasts.
//!
//! # Why not just message the root's children? (for beginners)
//!
//! Under a reparenting window manager every application window is wrapped in
//! a frame window owned by the window manager.  The root's direct children
//! are therefore mostly frames, and a client message sent to a frame never
//! reaches the application inside it.
//!
//! The window manager marks each real application window with the
//! `WM_STATE` property, so the traversal descends from the root until it
//! finds windows carrying `WM_STATE` and sends to those.  A direct child of
//! the root that has no `WM_STATE` anywhere beneath it (an unmanaged or
//! override-redirect window) is messaged itself so that it is not left out.

pub mod traversal;
pub mod tree;

pub use traversal::{plan_broadcast, BroadcastPlan};
pub use tree::{TreeError, WindowId, WindowTree};
