//! The window tree port consumed by the broadcast traversal.

use std::fmt;

use thiserror::Error;

/// Server-side identifier of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Error raised while inspecting a window.
///
/// Windows can be destroyed by their owners at any moment, so these errors
/// are expected during a traversal and are never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The window no longer exists.
    #[error("window {0} no longer exists")]
    WindowGone(WindowId),

    /// The server rejected a request about the window.
    #[error("query on window {window} failed with X error code {code}")]
    Query { window: WindowId, code: u8 },
}

/// Read-only view of a display's window hierarchy.
///
/// Methods take `&mut self` because live implementations talk to the server
/// over a connection that is not `Sync`.
pub trait WindowTree {
    /// Returns `true` if `window` carries the `WM_STATE` property.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] if the window cannot be queried.
    fn is_managed(&mut self, window: WindowId) -> Result<bool, TreeError>;

    /// Returns the children of `window` in stacking order, bottom-most first.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] if the window cannot be queried.
    fn children(&mut self, window: WindowId) -> Result<Vec<WindowId>, TreeError>;
}
