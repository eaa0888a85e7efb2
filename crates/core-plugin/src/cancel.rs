//! Cancel plugin: discard unsaved edits across the unified set.
//!
//! A clean instance discards immediately. A dirty instance routes through
//! the notification collaborator's confirm notice first — the discard runs
//! from the notice's hide callback, i.e. only once the user has
//! acknowledged it. Discarding never touches requests a save already
//! dispatched; it only resets local content and closes the editing session.

use std::rc::{Rc, Weak};

use serde::Deserialize;
use serde_json::{json, Value};

use core_editor::{
    parse_options, EditorError, EditorInstance, EditorPlugin, NoticeOptions, UiComponent,
    UiControl,
};

use crate::PluginError;

pub const CANCEL_PLUGIN: &str = "cancel";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CancelOptions {
    pub confirm_message: String,
}

impl Default for CancelOptions {
    fn default() -> Self {
        Self {
            confirm_message: "There are unsaved changes. Discard them?".to_string(),
        }
    }
}

pub fn default_options() -> Value {
    json!({ "confirm_message": CancelOptions::default().confirm_message })
}

pub struct CancelPlugin {
    editor: Weak<EditorInstance>,
    options: CancelOptions,
}

impl CancelPlugin {
    pub fn new() -> Self {
        Self {
            editor: Weak::new(),
            options: CancelOptions::default(),
        }
    }

    /// The owning instance, while it is alive.
    pub fn editor(&self) -> Option<Rc<EditorInstance>> {
        self.editor.upgrade()
    }

    /// Cancel editing originating at `editor`: confirmation-gated when the
    /// instance has unsaved changes, immediate otherwise.
    pub fn trigger(editor: &Rc<EditorInstance>) -> Result<(), PluginError> {
        let options =
            editor.with_plugin_ref::<CancelPlugin, _>(CANCEL_PLUGIN, |plugin| plugin.options.clone())?;

        if editor.is_dirty() {
            let origin = Rc::downgrade(editor);
            editor.show_confirm(
                &options.confirm_message,
                NoticeOptions::new().on_hide(move || {
                    if let Some(editor) = origin.upgrade() {
                        Self::discard(&editor);
                    }
                }),
            );
        } else {
            Self::discard(editor);
        }
        Ok(())
    }

    /// The discard itself, applied uniformly: fire `Cancel`, reset content
    /// to the enable-time snapshot, hide the toolbar, disable editing.
    fn discard(editor: &Rc<EditorInstance>) {
        tracing::info!(target: "cancel", editor = editor.id(), "discard");
        editor.unify(|member| {
            member.discard_edits();
            member.hide_toolbar();
            member.disable_editing();
        });
    }
}

impl Default for CancelPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorPlugin for CancelPlugin {
    fn init(&mut self, editor: &Rc<EditorInstance>, options: &Value) -> Result<(), EditorError> {
        self.editor = Rc::downgrade(editor);
        self.options = parse_options(CANCEL_PLUGIN, options)?;
        Ok(())
    }
}

/// Toolbar button: triggers cancel.
pub struct CancelButton;

impl UiComponent for CancelButton {
    fn init(&mut self, editor: &Rc<EditorInstance>) -> Result<Rc<dyn UiControl>, EditorError> {
        let editor_weak = Rc::downgrade(editor);
        Ok(editor.ui_button("Cancel", Some("cancel".to_string()), move || {
            if let Some(editor) = editor_weak.upgrade()
                && let Err(e) = CancelPlugin::trigger(&editor)
            {
                tracing::warn!(target: "cancel", error = %e, "cancel_trigger_failed");
            }
        }))
    }
}
