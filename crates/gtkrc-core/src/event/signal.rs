//! Well-known GTK reload signals.
//!
//! Each signal is identified on the display by an interned atom whose name is
//! a fixed string literal.  The literal never varies between invocations; the
//! numeric atom value is assigned by the X server at intern time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Atom name that makes GTK 2 applications re-read their `gtkrc` files.
pub const READ_RCFILES_ATOM: &str = "_GTK_READ_RCFILES";

/// Atom name that makes GTK 2 applications reload their icon themes.
pub const LOAD_ICONTHEMES_ATOM: &str = "_GTK_LOAD_ICONTHEMES";

/// A reload request understood by running GTK 2 applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReloadSignal {
    /// Re-read resource (`gtkrc`) files.
    #[default]
    RcFiles,
    /// Reload icon themes.
    IconThemes,
}

/// Error returned when a signal name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown reload signal {0:?} (expected \"rc-files\" or \"icon-themes\")")]
pub struct ParseSignalError(pub String);

impl ReloadSignal {
    /// Every supported signal, in declaration order.
    pub const ALL: [ReloadSignal; 2] = [ReloadSignal::RcFiles, ReloadSignal::IconThemes];

    /// Returns the atom name to intern for this signal.
    pub const fn atom_name(self) -> &'static str {
        match self {
            ReloadSignal::RcFiles => READ_RCFILES_ATOM,
            ReloadSignal::IconThemes => LOAD_ICONTHEMES_ATOM,
        }
    }

    /// Returns the kebab-case name used on the command line and in TOML.
    pub const fn name(self) -> &'static str {
        match self {
            ReloadSignal::RcFiles => "rc-files",
            ReloadSignal::IconThemes => "icon-themes",
        }
    }
}

impl fmt::Display for ReloadSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReloadSignal {
    type Err = ParseSignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReloadSignal::ALL
            .into_iter()
            .find(|signal| signal.name() == s)
            .ok_or_else(|| ParseSignalError(s.to_string()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
