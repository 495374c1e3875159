//! BroadcastReloadUseCase: interns a reload signal and sends it to every
//! top-level window of the display.
//!
//! This use case sits at the application layer and delegates to a
//! [`DisplayConnection`] for all server interaction.  The Xlib implementation
//! and the in-memory recording display live in the infrastructure layer.

use gtkrc_core::{
    plan_broadcast, ClientMessage, ReloadSignal, TreeError, WindowId, WindowTree,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Server-assigned atom value.
pub type Atom = u64;

/// Error type for display operations.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("cannot open X display {display:?}")]
    Open { display: String },
    #[error("X11 display connections are only supported on Linux")]
    Unsupported,
    #[error("display name contains an interior NUL byte: {0:?}")]
    InvalidName(String),
    #[error("{request} failed with X error code {code}")]
    Protocol { request: &'static str, code: u8 },
}

/// Which screens of the display a broadcast covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenScope {
    /// Only the display's default screen.
    #[default]
    Default,
    /// Every screen of the display.
    All,
}

/// Connection to a display server, as seen by the application layer.
///
/// Each supported backend provides an implementation in the infrastructure
/// layer.
#[cfg_attr(test, mockall::automock)]
pub trait DisplayConnection {
    /// Interns `name` and returns its atom, creating it if necessary.
    fn intern_atom(&mut self, name: &str) -> Result<Atom, DisplayError>;

    /// Returns the root window of each screen in `scope`.
    fn root_windows(&mut self, scope: ScreenScope) -> Vec<WindowId>;

    /// Returns `true` if `window` carries the `WM_STATE` property.
    fn is_managed(&mut self, window: WindowId) -> Result<bool, TreeError>;

    /// Returns the children of `window`, bottom-most first.
    fn children(&mut self, window: WindowId) -> Result<Vec<WindowId>, TreeError>;

    /// Sends `message` to `window` with no propagation and an empty event mask.
    fn send_client_message(
        &mut self,
        window: WindowId,
        atom: Atom,
        message: &ClientMessage,
    ) -> Result<(), DisplayError>;

    /// Flushes queued requests to the server.
    fn flush(&mut self) -> Result<(), DisplayError>;
}

impl<D: DisplayConnection + ?Sized> DisplayConnection for Box<D> {
    fn intern_atom(&mut self, name: &str) -> Result<Atom, DisplayError> {
        (**self).intern_atom(name)
    }

    fn root_windows(&mut self, scope: ScreenScope) -> Vec<WindowId> {
        (**self).root_windows(scope)
    }

    fn is_managed(&mut self, window: WindowId) -> Result<bool, TreeError> {
        DisplayConnection::is_managed(&mut **self, window)
    }

    fn children(&mut self, window: WindowId) -> Result<Vec<WindowId>, TreeError> {
        DisplayConnection::children(&mut **self, window)
    }

    fn send_client_message(
        &mut self,
        window: WindowId,
        atom: Atom,
        message: &ClientMessage,
    ) -> Result<(), DisplayError> {
        (**self).send_client_message(window, atom, message)
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        (**self).flush()
    }
}

/// Exposes a display's hierarchy to the traversal in `gtkrc_core`.
struct TreeView<'a, D: ?Sized>(&'a mut D);

impl<D: DisplayConnection + ?Sized> WindowTree for TreeView<'_, D> {
    fn is_managed(&mut self, window: WindowId) -> Result<bool, TreeError> {
        DisplayConnection::is_managed(&mut *self.0, window)
    }

    fn children(&mut self, window: WindowId) -> Result<Vec<WindowId>, TreeError> {
        DisplayConnection::children(&mut *self.0, window)
    }
}

/// Error type for the broadcast use case.
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("failed to intern {atom_name} for signal {signal}")]
    Intern {
        signal: ReloadSignal,
        atom_name: &'static str,
        #[source]
        source: DisplayError,
    },
    #[error("failed to flush the display connection")]
    Flush(#[source] DisplayError),
}

/// Options controlling a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BroadcastOptions {
    pub scope: ScreenScope,
    /// Plan recipients without sending anything.
    pub dry_run: bool,
}

/// Summary of one signal's broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub signal: ReloadSignal,
    pub atom: Atom,
    /// Number of root windows visited.
    pub screens: usize,
    /// Windows the message was delivered to (or would be, on a dry run).
    pub recipients: Vec<WindowId>,
    /// Sends rejected by the server, usually because the window vanished.
    pub failed: usize,
    /// Windows skipped during traversal because they could not be queried.
    pub skipped: usize,
}

/// The Broadcast Reload use case.
pub struct BroadcastReloadUseCase<D> {
    display: D,
    options: BroadcastOptions,
}

impl<D: DisplayConnection> BroadcastReloadUseCase<D> {
    /// Creates a new use case over an open display connection.
    pub fn new(display: D, options: BroadcastOptions) -> Self {
        Self { display, options }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Broadcasts one reload signal to every top-level window in scope and
    /// flushes the connection.
    ///
    /// # Errors
    ///
    /// Returns [`BroadcastError::Intern`] if the atom cannot be interned and
    /// [`BroadcastError::Flush`] if queued sends cannot be flushed.  Failed
    /// sends to individual windows are counted in the report instead.
    pub fn broadcast(&mut self, signal: ReloadSignal) -> Result<BroadcastReport, BroadcastError> {
        let message = ClientMessage::reload(signal);
        let atom = self
            .display
            .intern_atom(message.atom_name())
            .map_err(|source| BroadcastError::Intern {
                signal,
                atom_name: message.atom_name(),
                source,
            })?;
        debug!(atom_name = message.atom_name(), atom, "atom interned");

        let roots = self.display.root_windows(self.options.scope);
        let mut report = BroadcastReport {
            signal,
            atom,
            screens: roots.len(),
            recipients: Vec::new(),
            failed: 0,
            skipped: 0,
        };

        for root in roots {
            let plan = plan_broadcast(&mut TreeView(&mut self.display), root);
            report.skipped += plan.skipped;

            if self.options.dry_run {
                report.recipients.extend(plan.recipients);
                continue;
            }

            for window in plan.recipients {
                match self.display.send_client_message(window, atom, &message) {
                    Ok(()) => report.recipients.push(window),
                    Err(e) => {
                        debug!(window = %window, "send failed: {e}");
                        report.failed += 1;
                    }
                }
            }
        }

        if !self.options.dry_run {
            self.display.flush().map_err(BroadcastError::Flush)?;
        }

        if report.recipients.is_empty() {
            warn!(signal = %signal, "no windows received the broadcast");
        }
        info!(
            signal = %signal,
            recipients = report.recipients.len(),
            failed = report.failed,
            skipped = report.skipped,
            dry_run = self.options.dry_run,
            "broadcast complete"
        );
        Ok(report)
    }

    /// Broadcasts each distinct signal in `signals`, in order.  An empty
    /// slice broadcasts the default signal.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first [`BroadcastError`].
    pub fn broadcast_all(
        &mut self,
        signals: &[ReloadSignal],
    ) -> Result<Vec<BroadcastReport>, BroadcastError> {
        if signals.is_empty() {
            return self.broadcast(ReloadSignal::default()).map(|report| vec![report]);
        }
        let mut seen = Vec::with_capacity(signals.len());
        for &signal in signals {
            if !seen.contains(&signal) {
                seen.push(signal);
            }
        }
        seen.into_iter().map(|signal| self.broadcast(signal)).collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use gtkrc_core::Target;
    use mockall::predicate::{always, eq};
    use mockall::Sequence;

    const ROOT: WindowId = WindowId(0x100);
    const ATOM: Atom = 301;

    /// A display whose root has one managed top-level (0x200).
    fn single_window_display() -> MockDisplayConnection {
        let mut display = MockDisplayConnection::new();
        display
            .expect_intern_atom()
            .with(eq("_GTK_READ_RCFILES"))
            .returning(|_| Ok(ATOM));
        display
            .expect_root_windows()
            .with(eq(ScreenScope::Default))
            .returning(|_| vec![ROOT]);
        display
            .expect_is_managed()
            .returning(|w| Ok(w == WindowId(0x200)));
        display
            .expect_children()
            .with(eq(ROOT))
            .returning(|_| Ok(vec![WindowId(0x200)]));
        display
    }

    #[test]
    fn test_broadcast_sends_read_rcfiles_to_managed_window() {
        // Arrange
        let mut display = single_window_display();
        display
            .expect_send_client_message()
            .withf(|window, atom, msg| {
                *window == WindowId(0x200)
                    && *atom == ATOM
                    && msg.atom_name() == "_GTK_READ_RCFILES"
                    && msg.target() == Target::Broadcast
                    && msg.format().bits() == 8
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        display.expect_flush().times(1).returning(|| Ok(()));
        let mut uc = BroadcastReloadUseCase::new(display, BroadcastOptions::default());

        // Act
        let report = uc.broadcast(ReloadSignal::RcFiles).expect("broadcast");

        // Assert
        assert_eq!(report.atom, ATOM);
        assert_eq!(report.screens, 1);
        assert_eq!(report.recipients, vec![WindowId(0x200)]);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn test_broadcast_flushes_after_last_send() {
        let mut seq = Sequence::new();
        let mut display = single_window_display();
        display
            .expect_send_client_message()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        display
            .expect_flush()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        let mut uc = BroadcastReloadUseCase::new(display, BroadcastOptions::default());

        uc.broadcast(ReloadSignal::RcFiles).expect("broadcast");
    }

    #[test]
    fn test_broadcast_counts_failed_sends_without_aborting() {
        // Arrange
        let mut display = single_window_display();
        display
            .expect_send_client_message()
            .returning(|_, _, _| {
                Err(DisplayError::Protocol {
                    request: "XSendEvent",
                    code: 3,
                })
            });
        display.expect_flush().returning(|| Ok(()));
        let mut uc = BroadcastReloadUseCase::new(display, BroadcastOptions::default());

        // Act
        let report = uc.broadcast(ReloadSignal::RcFiles).expect("broadcast");

        // Assert
        assert!(report.recipients.is_empty());
        assert_eq!(report.failed, 1);
    }

    #[test]
    fn test_broadcast_dry_run_never_sends_or_flushes() {
        let mut display = single_window_display();
        display.expect_send_client_message().never();
        display.expect_flush().never();
        let options = BroadcastOptions {
            dry_run: true,
            ..Default::default()
        };
        let mut uc = BroadcastReloadUseCase::new(display, options);

        let report = uc.broadcast(ReloadSignal::RcFiles).expect("broadcast");

        assert_eq!(report.recipients, vec![WindowId(0x200)]);
    }

    #[test]
    fn test_broadcast_intern_failure_is_reported() {
        // Arrange
        let mut display = MockDisplayConnection::new();
        display.expect_intern_atom().returning(|_| {
            Err(DisplayError::Protocol {
                request: "XInternAtom",
                code: 11,
            })
        });
        display.expect_root_windows().never();
        let mut uc = BroadcastReloadUseCase::new(display, BroadcastOptions::default());

        // Act
        let err = uc.broadcast(ReloadSignal::RcFiles).unwrap_err();

        // Assert
        assert!(matches!(
            err,
            BroadcastError::Intern {
                signal: ReloadSignal::RcFiles,
                atom_name: "_GTK_READ_RCFILES",
                ..
            }
        ));
    }

    #[test]
    fn test_broadcast_flush_failure_is_reported() {
        let mut display = single_window_display();
        display
            .expect_send_client_message()
            .returning(|_, _, _| Ok(()));
        display.expect_flush().returning(|| {
            Err(DisplayError::Protocol {
                request: "XFlush",
                code: 0,
            })
        });
        let mut uc = BroadcastReloadUseCase::new(display, BroadcastOptions::default());

        let err = uc.broadcast(ReloadSignal::RcFiles).unwrap_err();

        assert!(matches!(err, BroadcastError::Flush(_)));
    }

    #[test]
    fn test_broadcast_all_screens_visits_every_root() {
        // Arrange: two screens, each with one managed window.
        let mut display = MockDisplayConnection::new();
        display.expect_intern_atom().returning(|_| Ok(ATOM));
        display
            .expect_root_windows()
            .with(eq(ScreenScope::All))
            .returning(|_| vec![WindowId(0x100), WindowId(0x900)]);
        display
            .expect_is_managed()
            .returning(|w| Ok(w == WindowId(0x200) || w == WindowId(0xa00)));
        display.expect_children().returning(|w| {
            Ok(match w.0 {
                0x100 => vec![WindowId(0x200)],
                0x900 => vec![WindowId(0xa00)],
                _ => vec![],
            })
        });
        display
            .expect_send_client_message()
            .with(always(), eq(ATOM), always())
            .times(2)
            .returning(|_, _, _| Ok(()));
        display.expect_flush().returning(|| Ok(()));
        let options = BroadcastOptions {
            scope: ScreenScope::All,
            ..Default::default()
        };
        let mut uc = BroadcastReloadUseCase::new(display, options);

        // Act
        let report = uc.broadcast(ReloadSignal::RcFiles).expect("broadcast");

        // Assert
        assert_eq!(report.screens, 2);
        assert_eq!(report.recipients, vec![WindowId(0x200), WindowId(0xa00)]);
    }

    #[test]
    fn test_broadcast_all_skips_duplicate_signals() {
        let mut display = single_window_display();
        display
            .expect_send_client_message()
            .times(1)
            .returning(|_, _, _| Ok(()));
        display.expect_flush().times(1).returning(|| Ok(()));
        let mut uc = BroadcastReloadUseCase::new(display, BroadcastOptions::default());

        let reports = uc
            .broadcast_all(&[ReloadSignal::RcFiles, ReloadSignal::RcFiles])
            .expect("broadcast");

        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn test_broadcast_all_without_signals_sends_read_rcfiles() {
        // Arrange
        let mut display = single_window_display();
        display
            .expect_send_client_message()
            .withf(|_, _, msg| msg.atom_name() == "_GTK_READ_RCFILES")
            .times(1)
            .returning(|_, _, _| Ok(()));
        display.expect_flush().times(1).returning(|| Ok(()));
        let mut uc = BroadcastReloadUseCase::new(display, BroadcastOptions::default());

        // Act
        let reports = uc.broadcast_all(&[]).expect("broadcast");

        // Assert
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].signal, ReloadSignal::RcFiles);
    }
}
