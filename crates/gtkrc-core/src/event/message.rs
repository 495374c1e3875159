//! The synthetic client message record.
//!
//! A [`ClientMessage`] is built once per broadcast, handed to the display
//! adapter, and discarded.  Every field except the signal is fixed:
//!
//! | Field        | Value                                  |
//! |--------------|----------------------------------------|
//! | `kind`       | [`EventKind::ClientMessage`] (code 33) |
//! | `send_event` | `true`                                 |
//! | `target`     | [`Target::Broadcast`]                  |
//! | `format`     | [`DataFormat::Bytes`] (8 bits)         |
//! | `data`       | 20 zero bytes                          |
//!
//! The per-recipient window id written into each wire copy of the event is a
//! transport detail chosen by the display adapter at send time.  The record
//! itself always targets "broadcast".

use crate::event::signal::ReloadSignal;

/// Size in bytes of the data area of an X11 client message.
pub const CLIENT_MESSAGE_DATA_LEN: usize = 20;

/// X11 core event code for `ClientMessage`.
const CLIENT_MESSAGE_EVENT_CODE: u8 = 33;

/// Kind tag of a synthetic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Inter-client message.
    ClientMessage,
}

impl EventKind {
    /// Returns the X11 core event code for this kind.
    pub const fn code(self) -> u8 {
        match self {
            EventKind::ClientMessage => CLIENT_MESSAGE_EVENT_CODE,
        }
    }
}

/// Width of each data item in a client message payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataFormat {
    /// Twenty 8-bit items.
    Bytes = 8,
}

impl DataFormat {
    /// Returns the width in bits as sent on the wire.
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Destination of a client message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// No specific window: deliver to every top-level window.
    Broadcast,
}

/// A synthetic X11 client message asking applications to reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMessage {
    kind: EventKind,
    send_event: bool,
    target: Target,
    signal: ReloadSignal,
    format: DataFormat,
    data: [u8; CLIENT_MESSAGE_DATA_LEN],
}

impl ClientMessage {
    /// Builds the fixed broadcast record for `signal`.
    pub fn reload(signal: ReloadSignal) -> Self {
        Self {
            kind: EventKind::ClientMessage,
            send_event: true,
            target: Target::Broadcast,
            signal,
            format: DataFormat::Bytes,
            data: [0; CLIENT_MESSAGE_DATA_LEN],
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// `true`: the event was explicitly sent, not generated by the server.
    pub fn send_event(&self) -> bool {
        self.send_event
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn signal(&self) -> ReloadSignal {
        self.signal
    }

    /// Name of the atom that identifies the message type.
    pub fn atom_name(&self) -> &'static str {
        self.signal.atom_name()
    }

    pub fn format(&self) -> DataFormat {
        self.format
    }

    /// The unused payload, always zeroed.
    pub fn data(&self) -> &[u8; CLIENT_MESSAGE_DATA_LEN] {
        &self.data
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
