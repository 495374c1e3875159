//! The synthetic client message and the signals it can carry.

pub mod message;
pub mod signal;

pub use message::{ClientMessage, DataFormat, EventKind, Target};
pub use signal::ReloadSignal;
