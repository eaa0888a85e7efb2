//! Notification collaborator contract.
//!
//! The core never renders chrome. It asks a host-supplied [`Notifier`] for
//! three things: a persistent loading indicator, a confirmation notice, and
//! an error notice. Each call returns a handle that can be hidden; confirm
//! and error notices additionally accept an `on_hide` callback invoked when
//! the user dismisses the notice or a configured delay elapses. The save
//! plugin's uniform post-success transition rides that callback.

use std::cell::Cell;
use std::rc::Rc;

/// A visible notice. `hide` must be safe to call more than once.
pub trait Notice {
    fn hide(&self);
}

pub type NoticeHandle = Rc<dyn Notice>;

/// Presentation options for confirm/error notices.
#[derive(Default)]
pub struct NoticeOptions {
    /// Auto-dismiss delay. Interpretation is the host's; headless hosts may
    /// treat any delay as already elapsed.
    pub delay_ms: Option<u64>,
    /// Invoked once when the notice is dismissed.
    pub on_hide: Option<Box<dyn FnOnce()>>,
}

impl NoticeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }

    pub fn on_hide(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_hide = Some(Box::new(f));
        self
    }
}

pub trait Notifier {
    fn show_loading(&self, message: &str) -> NoticeHandle;
    fn show_confirm(&self, message: &str, options: NoticeOptions) -> NoticeHandle;
    fn show_error(&self, message: &str, options: NoticeOptions) -> NoticeHandle;
}

struct LoggedNotice {
    hidden: Cell<bool>,
}

impl Notice for LoggedNotice {
    fn hide(&self) {
        if !self.hidden.replace(true) {
            tracing::debug!(target: "editor.notify", "notice_hidden");
        }
    }
}

/// Headless notifier backed by tracing. Confirm/error `on_hide` callbacks
/// run immediately (there is no user to wait for), which keeps the
/// post-action state transition observable in logs and in the demo binary.
#[derive(Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show_loading(&self, message: &str) -> NoticeHandle {
        tracing::info!(target: "editor.notify", message, "loading");
        Rc::new(LoggedNotice {
            hidden: Cell::new(false),
        })
    }

    fn show_confirm(&self, message: &str, options: NoticeOptions) -> NoticeHandle {
        tracing::info!(target: "editor.notify", message, delay_ms = options.delay_ms, "confirm");
        if let Some(on_hide) = options.on_hide {
            on_hide();
        }
        Rc::new(LoggedNotice {
            hidden: Cell::new(false),
        })
    }

    fn show_error(&self, message: &str, options: NoticeOptions) -> NoticeHandle {
        tracing::warn!(target: "editor.notify", message, "error");
        if let Some(on_hide) = options.on_hide {
            on_hide();
        }
        Rc::new(LoggedNotice {
            hidden: Cell::new(false),
        })
    }
}
