//! gtkrc-broadcast library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does gtkrc-broadcast do? (for beginners)
//!
//! Theme switchers rewrite `~/.gtkrc-2.0` and then need every running GTK 2
//! application to notice.  GTK 2 listens for an X11 client message named
//! `_GTK_READ_RCFILES` on its top-level windows, so this program:
//!
//! 1. Opens the X display (`$DISPLAY` or `--display`).
//! 2. Interns the `_GTK_READ_RCFILES` atom.
//! 3. Walks the window tree to find every top-level client window.
//! 4. Sends each of them the client message, then flushes and exits.
//!
//! It is meant to be spawned as a subprocess by a theme switcher written in
//! a language whose GTK binding cannot send this message itself.

/// Application layer: the broadcast use case and the display port.
pub mod application;

/// Infrastructure layer: display adapters and configuration.
pub mod infrastructure;
