//! Linux X11 display connection via Xlib.
//!
//! Implements [`DisplayConnection`] on top of the `x11` crate's raw Xlib
//! bindings:
//!
//! | Operation             | Xlib call                                   |
//! |-----------------------|---------------------------------------------|
//! | `intern_atom`         | `XInternAtom(display, name, False)`         |
//! | `root_windows`        | `XDefaultScreen` / `XScreenCount` + `XRootWindow` |
//! | `is_managed`          | `XGetWindowProperty(w, WM_STATE, 0, 0)`     |
//! | `children`            | `XQueryTree`                                |
//! | `send_client_message` | `XSendEvent(w, False, NoEventMask, ev)`     |
//! | `flush`               | `XFlush`                                    |
//!
//! # X errors (for beginners)
//!
//! Xlib reports protocol errors (for example `BadWindow` when a window was
//! destroyed between `XQueryTree` listing it and us querying it) through a
//! process-wide error handler.  The default handler prints the error and
//! exits the process.  While an [`XlibDisplay`] is open it installs a handler
//! that only records the error code; each tree query and send is followed by
//! `XSync` so the code can be attributed to the request that caused it.  The
//! previous handler is restored when the display is dropped.

use std::ffi::CString;
use std::os::raw::{c_char, c_int, c_uchar, c_uint, c_ulong};
use std::ptr;
use std::sync::atomic::{AtomicU8, Ordering};

use gtkrc_core::{ClientMessage, TreeError, WindowId};
use tracing::debug;
use x11::xlib;

use super::DisplayOptions;
use crate::application::broadcast_reload::{Atom, DisplayConnection, DisplayError, ScreenScope};

/// Name of the property window managers set on managed client windows.
const WM_STATE: &str = "WM_STATE";

/// Error handler slot as taken and returned by `XSetErrorHandler`.
type ErrorHandler =
    Option<unsafe extern "C" fn(*mut xlib::Display, *mut xlib::XErrorEvent) -> c_int>;

/// Last X error code seen by [`record_error`]; 0 means none.
static LAST_ERROR_CODE: AtomicU8 = AtomicU8::new(0);

/// Non-fatal X error handler: remembers the error code and carries on.
unsafe extern "C" fn record_error(
    _display: *mut xlib::Display,
    event: *mut xlib::XErrorEvent,
) -> c_int {
    // SAFETY: Xlib passes a valid event pointer for the duration of the call.
    if let Some(event) = unsafe { event.as_ref() } {
        LAST_ERROR_CODE.store(event.error_code, Ordering::SeqCst);
    }
    0
}

/// An open Xlib connection.
pub struct XlibDisplay {
    display: *mut xlib::Display,
    wm_state: xlib::Atom,
    previous_handler: ErrorHandler,
}

impl XlibDisplay {
    /// Connects to the X display.
    ///
    /// Calls `XOpenDisplay` with the configured name, or with null so Xlib
    /// reads the `DISPLAY` environment variable.  If the server is
    /// unreachable, `XOpenDisplay` returns a null pointer and we return an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::InvalidName`] if the name contains a NUL byte,
    /// [`DisplayError::Open`] if the display cannot be opened, and
    /// [`DisplayError::Protocol`] if `WM_STATE` cannot be interned.
    pub fn open(options: &DisplayOptions) -> Result<Self, DisplayError> {
        let name = options
            .name
            .as_deref()
            .map(|n| CString::new(n).map_err(|_| DisplayError::InvalidName(n.to_string())))
            .transpose()?;
        let name_ptr = name.as_ref().map_or(ptr::null(), |n| n.as_ptr());

        // SAFETY: `name_ptr` is null or points to a NUL-terminated string that
        // outlives the call.  The returned pointer is freed by XCloseDisplay.
        let display = unsafe { xlib::XOpenDisplay(name_ptr) };
        if display.is_null() {
            let shown = options
                .name
                .clone()
                .or_else(|| std::env::var("DISPLAY").ok())
                .unwrap_or_else(|| "<unset>".to_string());
            return Err(DisplayError::Open { display: shown });
        }

        // SAFETY: `record_error` has the signature Xlib expects and touches
        // nothing but an atomic.
        let previous_handler = unsafe { xlib::XSetErrorHandler(Some(record_error)) };

        if options.synchronous {
            // SAFETY: `display` is a valid open connection.
            unsafe { xlib::XSynchronize(display, xlib::True) };
        }

        let mut this = Self {
            display,
            wm_state: 0,
            previous_handler,
        };
        this.wm_state = this.intern_atom(WM_STATE)?;
        debug!(wm_state = this.wm_state, "X display opened");
        Ok(this)
    }

    /// Runs `request`, waits for the server to process it, and returns the
    /// X error code it raised, if any.
    fn trapped<T>(&mut self, request: impl FnOnce(*mut xlib::Display) -> T) -> Result<T, u8> {
        LAST_ERROR_CODE.store(0, Ordering::SeqCst);
        let value = request(self.display);
        // SAFETY: `self.display` is a valid open connection.
        unsafe { xlib::XSync(self.display, xlib::False) };
        match LAST_ERROR_CODE.swap(0, Ordering::SeqCst) {
            0 => Ok(value),
            code => Err(code),
        }
    }

    fn tree_error(window: WindowId, code: u8) -> TreeError {
        if code == xlib::BadWindow as u8 {
            TreeError::WindowGone(window)
        } else {
            TreeError::Query { window, code }
        }
    }
}

impl DisplayConnection for XlibDisplay {
    fn intern_atom(&mut self, name: &str) -> Result<Atom, DisplayError> {
        let cname = CString::new(name).map_err(|_| DisplayError::Protocol {
            request: "XInternAtom",
            code: xlib::BadValue as u8,
        })?;
        // SAFETY: `cname` is NUL-terminated and outlives the call.
        let atom = unsafe { xlib::XInternAtom(self.display, cname.as_ptr(), xlib::False) };
        if atom == 0 {
            return Err(DisplayError::Protocol {
                request: "XInternAtom",
                code: xlib::BadAlloc as u8,
            });
        }
        Ok(Atom::from(atom))
    }

    fn root_windows(&mut self, scope: ScreenScope) -> Vec<WindowId> {
        let display = self.display;
        // SAFETY: `display` is a valid open connection and every screen number
        // passed to XRootWindow is in [0, XScreenCount).
        unsafe {
            match scope {
                ScreenScope::Default => {
                    let screen = xlib::XDefaultScreen(display);
                    vec![WindowId(u64::from(xlib::XRootWindow(display, screen)))]
                }
                ScreenScope::All => (0..xlib::XScreenCount(display))
                    .map(|screen| WindowId(u64::from(xlib::XRootWindow(display, screen))))
                    .collect(),
            }
        }
    }

    fn is_managed(&mut self, window: WindowId) -> Result<bool, TreeError> {
        let wm_state = self.wm_state;
        let mut actual_type: xlib::Atom = 0;
        let mut actual_format: c_int = 0;
        let mut nitems: c_ulong = 0;
        let mut bytes_after: c_ulong = 0;
        let mut data: *mut c_uchar = ptr::null_mut();

        // SAFETY: all out-pointers reference live locals.  A zero-length read
        // only reports whether the property exists.
        let result = self.trapped(|display| unsafe {
            xlib::XGetWindowProperty(
                display,
                window.0 as xlib::Window,
                wm_state,
                0,
                0,
                xlib::False,
                xlib::AnyPropertyType as xlib::Atom,
                &mut actual_type,
                &mut actual_format,
                &mut nitems,
                &mut bytes_after,
                &mut data,
            )
        });

        if !data.is_null() {
            // SAFETY: `data` was allocated by Xlib.
            unsafe { xlib::XFree(data.cast()) };
        }

        match result {
            Ok(status) if status == xlib::Success as c_int => Ok(actual_type != 0),
            Ok(status) => Err(TreeError::Query {
                window,
                code: status as u8,
            }),
            Err(code) => Err(Self::tree_error(window, code)),
        }
    }

    fn children(&mut self, window: WindowId) -> Result<Vec<WindowId>, TreeError> {
        let mut root_return: xlib::Window = 0;
        let mut parent_return: xlib::Window = 0;
        let mut children_ptr: *mut xlib::Window = ptr::null_mut();
        let mut count: c_uint = 0;

        // SAFETY: all out-pointers reference live locals.
        let result = self.trapped(|display| unsafe {
            xlib::XQueryTree(
                display,
                window.0 as xlib::Window,
                &mut root_return,
                &mut parent_return,
                &mut children_ptr,
                &mut count,
            )
        });

        let children = if children_ptr.is_null() {
            Vec::new()
        } else {
            // SAFETY: XQueryTree returned `count` windows at `children_ptr`,
            // which we copy out before freeing.
            let children = unsafe { std::slice::from_raw_parts(children_ptr, count as usize) }
                .iter()
                .map(|&w| WindowId(u64::from(w)))
                .collect();
            unsafe { xlib::XFree(children_ptr.cast()) };
            children
        };

        match result {
            Ok(0) => Err(TreeError::WindowGone(window)),
            Ok(_) => Ok(children),
            Err(code) => Err(Self::tree_error(window, code)),
        }
    }

    fn send_client_message(
        &mut self,
        window: WindowId,
        atom: Atom,
        message: &ClientMessage,
    ) -> Result<(), DisplayError> {
        let mut data = xlib::ClientMessageData::new();
        for (index, &byte) in message.data().iter().enumerate() {
            data.set_byte(index, byte as c_char);
        }

        // The wire copy is addressed to the recipient, as XSendEvent requires;
        // the record itself stays a broadcast.
        let mut event = xlib::XEvent {
            client_message: xlib::XClientMessageEvent {
                type_: c_int::from(message.kind().code()),
                serial: 0,
                send_event: if message.send_event() {
                    xlib::True
                } else {
                    xlib::False
                },
                display: self.display,
                window: window.0 as xlib::Window,
                message_type: atom as xlib::Atom,
                format: c_int::from(message.format().bits()),
                data,
            },
        };

        // SAFETY: `event` is a fully initialised client message event.
        let result = self.trapped(|display| unsafe {
            xlib::XSendEvent(
                display,
                window.0 as xlib::Window,
                xlib::False,
                xlib::NoEventMask,
                &mut event,
            )
        });

        match result {
            Ok(0) => Err(DisplayError::Protocol {
                request: "XSendEvent",
                code: 0,
            }),
            Ok(_) => Ok(()),
            Err(code) => Err(DisplayError::Protocol {
                request: "XSendEvent",
                code,
            }),
        }
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        // SAFETY: `self.display` is a valid open connection.
        unsafe { xlib::XFlush(self.display) };
        Ok(())
    }
}

impl Drop for XlibDisplay {
    fn drop(&mut self) {
        // SAFETY: `self.display` was opened in `open` and is not used after
        // this point.
        unsafe {
            xlib::XSetErrorHandler(self.previous_handler);
            xlib::XCloseDisplay(self.display);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
