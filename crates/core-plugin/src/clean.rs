//! Clean plugin: strip unwanted markup from region content.
//!
//! Binds `Change` at init so every content mutation is re-cleaned, and
//! exposes the same operation behind a toolbar button. The rules work on
//! the opaque content string: configured attributes are removed wherever
//! they appear and configured empty tags are dropped. Cleaning writes
//! through the region directly — routing through the change notification
//! would loop.

use std::rc::{Rc, Weak};

use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};

use core_editor::{
    parse_options, EditorError, EditorEvent, EditorInstance, EditorPlugin, UiComponent, UiControl,
};

use crate::PluginError;

pub const CLEAN_PLUGIN: &str = "clean";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CleanOptions {
    pub strip_attrs: Vec<String>,
    pub strip_empty_tags: Vec<String>,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            strip_attrs: vec!["_moz_dirty".to_string()],
            strip_empty_tags: ["h1", "h2", "h3", "h4", "h5", "h6", "p"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

pub fn default_options() -> Value {
    let defaults = CleanOptions::default();
    json!({
        "strip_attrs": defaults.strip_attrs,
        "strip_empty_tags": defaults.strip_empty_tags,
    })
}

/// Compiled strip rules, shared between the plugin and its change handler.
struct CleanRules {
    attrs: Vec<Regex>,
    empty_tags: Vec<Regex>,
}

impl CleanRules {
    fn compile(options: &CleanOptions) -> Result<Self, regex::Error> {
        let attrs = options
            .strip_attrs
            .iter()
            .map(|attr| Regex::new(&format!(r#"\s+{}(?:="[^"]*")?"#, regex::escape(attr))))
            .collect::<Result<Vec<_>, _>>()?;
        let empty_tags = options
            .strip_empty_tags
            .iter()
            .map(|tag| {
                let tag = regex::escape(tag);
                Regex::new(&format!(r"<{tag}[^>]*>\s*</{tag}>"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { attrs, empty_tags })
    }

    fn apply(&self, content: &str) -> String {
        let mut out = content.to_string();
        for rule in &self.attrs {
            out = rule.replace_all(&out, "").into_owned();
        }
        for rule in &self.empty_tags {
            // A stripped tag can leave its parent empty; repeat until the
            // content stops shrinking.
            loop {
                let next = rule.replace_all(&out, "").into_owned();
                if next == out {
                    break;
                }
                out = next;
            }
        }
        out
    }
}

pub struct CleanPlugin {
    editor: Weak<EditorInstance>,
    options: CleanOptions,
    rules: Rc<CleanRules>,
}

impl CleanPlugin {
    pub fn new() -> Self {
        let options = CleanOptions::default();
        // Defaults always compile; init replaces these with the merged set.
        let rules = CleanRules::compile(&options).map(Rc::new).unwrap_or_else(|_| {
            Rc::new(CleanRules {
                attrs: Vec::new(),
                empty_tags: Vec::new(),
            })
        });
        Self {
            editor: Weak::new(),
            options,
            rules,
        }
    }

    /// The owning instance, while it is alive.
    pub fn editor(&self) -> Option<Rc<EditorInstance>> {
        self.editor.upgrade()
    }

    pub fn options(&self) -> &CleanOptions {
        &self.options
    }

    /// Clean `editor`'s content now (the button path).
    pub fn trigger(editor: &Rc<EditorInstance>) -> Result<(), PluginError> {
        let rules =
            editor.with_plugin_ref::<CleanPlugin, _>(CLEAN_PLUGIN, |plugin| Rc::clone(&plugin.rules))?;
        Self::apply(editor, &rules);
        Ok(())
    }

    fn apply(editor: &EditorInstance, rules: &CleanRules) {
        let before = editor.region().content();
        let after = rules.apply(&before);
        if after != before {
            tracing::debug!(
                target: "clean",
                editor = editor.id(),
                removed_bytes = before.len() - after.len(),
                "content_cleaned"
            );
            editor.region().set_content(after);
        }
    }
}

impl Default for CleanPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorPlugin for CleanPlugin {
    fn init(&mut self, editor: &Rc<EditorInstance>, options: &Value) -> Result<(), EditorError> {
        self.editor = Rc::downgrade(editor);
        self.options = parse_options(CLEAN_PLUGIN, options)?;
        self.rules = Rc::new(CleanRules::compile(&self.options).map_err(|e| {
            EditorError::Init {
                name: CLEAN_PLUGIN.to_string(),
                message: e.to_string(),
            }
        })?);

        let rules = Rc::clone(&self.rules);
        let editor_weak = Rc::downgrade(editor);
        editor.bind(
            EditorEvent::Change,
            CLEAN_PLUGIN,
            Rc::new(move || {
                if let Some(editor) = editor_weak.upgrade() {
                    Self::apply(&editor, &rules);
                }
            }),
        );
        Ok(())
    }

    fn destroy(&mut self, editor: &Rc<EditorInstance>) {
        editor.unbind_owner(EditorEvent::Change, CLEAN_PLUGIN);
    }
}

/// Toolbar button: cleans on demand.
pub struct CleanButton;

impl UiComponent for CleanButton {
    fn init(&mut self, editor: &Rc<EditorInstance>) -> Result<Rc<dyn UiControl>, EditorError> {
        let editor_weak = Rc::downgrade(editor);
        Ok(editor.ui_button(
            "Remove unnecessary markup from editor content",
            None,
            move || {
                if let Some(editor) = editor_weak.upgrade()
                    && let Err(e) = CleanPlugin::trigger(&editor)
                {
                    tracing::warn!(target: "clean", error = %e, "clean_trigger_failed");
                }
            },
        ))
    }
}
