//! Display connection adapters.
//!
//! | Module      | OS    | API used                                        |
//! |-------------|-------|-------------------------------------------------|
//! | `xlib`      | Linux | `XOpenDisplay`, `XQueryTree`, `XSendEvent`, ... |
//! | `recording` | any   | in-memory window tree, records every send       |
//!
//! Use [`open_display`] to get the native connection for the current
//! platform.

use crate::application::broadcast_reload::{DisplayConnection, DisplayError};

pub mod recording;

#[cfg(target_os = "linux")]
pub mod xlib;

pub use recording::{RecordingDisplay, SentMessage};

/// Settings for opening a display connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Display name such as `":0"`.  `None` uses `$DISPLAY`.
    pub name: Option<String>,
    /// Make every request synchronous, so errors are reported at the call
    /// that caused them.
    pub synchronous: bool,
}

/// Opens a connection to the display described by `options`.
///
/// # Errors
///
/// Returns [`DisplayError::Open`] if no display session is reachable and
/// [`DisplayError::Unsupported`] on platforms without X11.
#[cfg(target_os = "linux")]
pub fn open_display(options: &DisplayOptions) -> Result<Box<dyn DisplayConnection>, DisplayError> {
    Ok(Box::new(xlib::XlibDisplay::open(options)?))
}

/// Opens a connection to the display described by `options`.
///
/// # Errors
///
/// Always returns [`DisplayError::Unsupported`]: there is no X11 backend on
/// this platform.
#[cfg(not(target_os = "linux"))]
pub fn open_display(_options: &DisplayOptions) -> Result<Box<dyn DisplayConnection>, DisplayError> {
    Err(DisplayError::Unsupported)
}
