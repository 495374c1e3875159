//! In-memory display for tests.
//!
//! # Why a recording display?
//!
//! The Xlib adapter needs a running X server and really delivers messages to
//! the windows on it.  `RecordingDisplay` replaces the server with a window
//! tree built in memory and pushes every sent message into a `Vec` so that
//! test assertions can inspect exactly what was sent, to whom, and in what
//! order.
//!
//! # Usage in tests
//!
//! ```ignore
//! let mut display = RecordingDisplay::new();
//! let frame = display.add_window(display.root(), false);
//! let client = display.add_window(frame, true);
//!
//! let mut uc = BroadcastReloadUseCase::new(display, BroadcastOptions::default());
//! uc.broadcast(ReloadSignal::RcFiles).unwrap();
//!
//! let sent = &uc.display().sent;
//! assert_eq!(sent.len(), 1);
//! assert_eq!(sent[0].window, client);
//! ```
//!
//! Windows can be marked as gone (every query fails with `BadWindow`) or as
//! refusing sends, to exercise the error paths without a broken server.

use std::collections::{HashMap, HashSet};

use gtkrc_core::{ClientMessage, TreeError, WindowId};

use crate::application::broadcast_reload::{Atom, DisplayConnection, DisplayError, ScreenScope};

/// First atom value handed out; values below are predefined by X11.
const FIRST_ATOM: Atom = 0x100;

/// Root window id of screen `n` is `ROOT_BASE * (n + 1)`.
const ROOT_BASE: u64 = 0x100;

/// X11 `BadWindow` error code.
const BAD_WINDOW: u8 = 3;

/// One recorded call to `send_client_message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub window: WindowId,
    pub atom: Atom,
    pub message: ClientMessage,
}

#[derive(Debug, Default)]
struct Node {
    managed: bool,
    children: Vec<WindowId>,
}

/// A display server simulated in memory.
#[derive(Debug)]
pub struct RecordingDisplay {
    roots: Vec<WindowId>,
    nodes: HashMap<WindowId, Node>,
    atoms: HashMap<String, Atom>,
    next_window: u64,
    gone: HashSet<WindowId>,
    refuse_sends: HashSet<WindowId>,
    /// Every successful send, in order.
    pub sent: Vec<SentMessage>,
    /// Number of `flush` calls.
    pub flushes: usize,
}

impl Default for RecordingDisplay {
    fn default() -> Self {
        Self::with_screens(1)
    }
}

impl RecordingDisplay {
    /// Creates a display with one empty screen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a display with `screens` empty screens.  Screen 0 is the
    /// default screen.
    ///
    /// # Panics
    ///
    /// Panics if `screens` is zero; a display always has a default screen.
    pub fn with_screens(screens: usize) -> Self {
        assert!(screens >= 1, "a display needs at least one screen");
        let roots: Vec<WindowId> = (0..screens as u64)
            .map(|n| WindowId(ROOT_BASE * (n + 1)))
            .collect();
        let nodes = roots.iter().map(|&root| (root, Node::default())).collect();
        Self {
            roots,
            nodes,
            atoms: HashMap::new(),
            next_window: 0x1000,
            gone: HashSet::new(),
            refuse_sends: HashSet::new(),
            sent: Vec::new(),
            flushes: 0,
        }
    }

    /// Root window of the default screen.
    pub fn root(&self) -> WindowId {
        self.roots[0]
    }

    /// Root window of `screen`.
    pub fn screen_root(&self, screen: usize) -> WindowId {
        self.roots[screen]
    }

    /// Creates a window on top of `parent`'s existing children.
    /// `managed` sets `WM_STATE` on it.
    pub fn add_window(&mut self, parent: WindowId, managed: bool) -> WindowId {
        let id = WindowId(self.next_window);
        self.next_window += 1;
        self.nodes.entry(parent).or_default().children.push(id);
        self.nodes.insert(
            id,
            Node {
                managed,
                children: Vec::new(),
            },
        );
        id
    }

    /// Makes every later request about `window` fail with `BadWindow`, as if
    /// it had been destroyed after its parent listed it.
    pub fn destroy(&mut self, window: WindowId) {
        self.gone.insert(window);
    }

    /// Makes sends to `window` fail while queries still succeed.
    pub fn refuse_sends_to(&mut self, window: WindowId) {
        self.refuse_sends.insert(window);
    }

    /// Returns the interned value of `name`, if it was interned.
    pub fn atom(&self, name: &str) -> Option<Atom> {
        self.atoms.get(name).copied()
    }


    fn node(&self, window: WindowId) -> Result<&Node, TreeError> {
        if self.gone.contains(&window) {
            return Err(TreeError::WindowGone(window));
        }
        self.nodes.get(&window).ok_or(TreeError::WindowGone(window))
    }
}

impl DisplayConnection for RecordingDisplay {
    fn intern_atom(&mut self, name: &str) -> Result<Atom, DisplayError> {
        let next = FIRST_ATOM + self.atoms.len() as Atom;
        Ok(*self.atoms.entry(name.to_string()).or_insert(next))
    }

    fn root_windows(&mut self, scope: ScreenScope) -> Vec<WindowId> {
        match scope {
            ScreenScope::Default => vec![self.root()],
            ScreenScope::All => self.roots.clone(),
        }
    }

    fn is_managed(&mut self, window: WindowId) -> Result<bool, TreeError> {
        Ok(self.node(window)?.managed)
    }

    fn children(&mut self, window: WindowId) -> Result<Vec<WindowId>, TreeError> {
        Ok(self.node(window)?.children.clone())
    }

    fn send_client_message(
        &mut self,
        window: WindowId,
        atom: Atom,
        message: &ClientMessage,
    ) -> Result<(), DisplayError> {
        if self.gone.contains(&window) || self.refuse_sends.contains(&window) {
            return Err(DisplayError::Protocol {
                request: "XSendEvent",
                code: BAD_WINDOW,
            });
        }
        self.sent.push(SentMessage {
            window,
            atom,
            message: message.clone(),
        });
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.flushes += 1;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
