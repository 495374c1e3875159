//! Application layer use cases for gtkrc-broadcast.
//!
//! # What use cases are there?
//!
//! - **`broadcast_reload`** – Interns a reload signal's atom, walks the window
//!   tree of each screen in scope to find the top-level client windows, and
//!   sends them the synthetic client message.  All server interaction goes
//!   through a `DisplayConnection` that is injected at construction time.

pub mod broadcast_reload;
