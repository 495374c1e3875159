//! Infrastructure layer for gtkrc-broadcast.
//!
//! Contains OS-facing adapters: the X11 display connection and the TOML
//! configuration file.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `gtkrc_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`display`** – Implementations of `DisplayConnection`.  On Linux the
//!   Xlib adapter is selected at compile time with `#[cfg(target_os)]`.  A
//!   `RecordingDisplay` holding an in-memory window tree is always compiled
//!   for tests.
//!
//! - **`storage`** – Loading of the optional `config.toml`.

pub mod display;
pub mod storage;
