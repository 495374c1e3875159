//! # gtkrc-core
//!
//! Shared library for gtkrc-broadcast containing the synthetic client message
//! record, the well-known GTK reload signals, and the traversal that decides
//! which windows of a display receive a broadcast.
//!
//! It has zero dependencies on Xlib or any other OS API.  The binary crate
//! supplies a live window tree; tests supply an in-memory one.
//!
//! # Architecture overview (for beginners)
//!
//! GTK 2 applications listen on their top-level windows for an X11
//! `ClientMessage` whose type is the atom `_GTK_READ_RCFILES`.  When one
//! arrives they re-read their `gtkrc` files and restyle themselves, which is
//! how a theme switcher makes running GTK 2 programs pick up a new theme.
//!
//! This crate defines:
//!
//! - **`event`** – The message itself: a fixed record with a "broadcast"
//!   target, an 8-bit data format and a zeroed payload, tagged with one of
//!   the [`ReloadSignal`]s.
//!
//! - **`broadcast`** – How "send to all windows" is resolved.  Window managers
//!   reparent application windows into frames, so the traversal walks the
//!   window tree looking for the windows that carry `WM_STATE` (the real
//!   client windows) instead of just messaging the root's children.

pub mod broadcast;
pub mod event;

// Re-export the most-used types at the crate root so callers can write
// `gtkrc_core::ClientMessage` instead of `gtkrc_core::event::message::ClientMessage`.
pub use broadcast::traversal::{plan_broadcast, BroadcastPlan};
pub use broadcast::tree::{TreeError, WindowId, WindowTree};
pub use event::message::{ClientMessage, DataFormat, EventKind, Target, CLIENT_MESSAGE_DATA_LEN};
pub use event::signal::{ParseSignalError, ReloadSignal};
