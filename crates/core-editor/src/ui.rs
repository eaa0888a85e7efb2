//! Rendered UI control handles.
//!
//! A [`UiComponent`](crate::UiComponent) `init` returns one of these; the
//! toolbar owns placement and the instance owns lifetime. [`UiButton`] is
//! the stock control the bundled components build through
//! [`EditorInstance::ui_button`](crate::EditorInstance::ui_button) —
//! hosts with real chrome substitute their own `UiControl` implementations.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

pub trait UiControl {
    fn title(&self) -> &str;
    /// Simulated user click. Hidden controls swallow activation.
    fn activate(&self);
    fn hide(&self);
    fn show(&self);
    fn is_hidden(&self) -> bool;
}

pub struct UiButton {
    title: String,
    icon: Option<String>,
    hidden: Cell<bool>,
    on_click: Box<dyn Fn()>,
}

impl UiButton {
    pub fn new(
        title: impl Into<String>,
        icon: Option<String>,
        on_click: impl Fn() + 'static,
    ) -> Rc<Self> {
        Rc::new(Self {
            title: title.into(),
            icon,
            hidden: Cell::new(false),
            on_click: Box::new(on_click),
        })
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }
}

impl UiControl for UiButton {
    fn title(&self) -> &str {
        &self.title
    }

    fn activate(&self) {
        if self.hidden.get() {
            tracing::trace!(target: "editor.ui", title = self.title.as_str(), "activate_ignored_hidden");
            return;
        }
        tracing::debug!(target: "editor.ui", title = self.title.as_str(), "activate");
        (self.on_click)();
    }

    fn hide(&self) {
        self.hidden.set(true);
    }

    fn show(&self) {
        self.hidden.set(false);
    }

    fn is_hidden(&self) -> bool {
        self.hidden.get()
    }
}

impl fmt::Debug for UiButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiButton")
            .field("title", &self.title)
            .field("hidden", &self.hidden.get())
            .finish()
    }
}
