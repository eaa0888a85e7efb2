//! Configuration loading and option layering.
//!
//! Plugin options resolve through three layers, lowest precedence first:
//! the defaults a plugin definition registers with, the options carried by
//! the active preset, and per-instance overrides (typically parsed from
//! `scribe.toml`). Layers are plain JSON objects folded by [`deep_merge`]:
//! nested objects merge recursively, every other value is replaced
//! wholesale. The core never interprets individual option keys — those are
//! plugin-specific — it only supplies the generic merge.
//!
//! File parsing is deliberately tolerant: unknown TOML fields are ignored so
//! the surface can grow without breaking older configuration files.

use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Recursively merge `overlay` into `base`. Objects merge key-by-key;
/// arrays, scalars, and mismatched shapes are replaced by the overlay value.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// Fold the option layers for one plugin: definition defaults ← preset
/// options ← per-instance overrides. Missing layers are skipped.
pub fn merge_layers(defaults: &Value, preset: Option<&Value>, overrides: Option<&Value>) -> Value {
    let mut merged = defaults.clone();
    if let Some(layer) = preset {
        deep_merge(&mut merged, layer);
    }
    if let Some(layer) = overrides {
        deep_merge(&mut merged, layer);
    }
    merged
}

/// A named configuration bundle: which plugins an instance enables, the
/// toolbar component layout, per-plugin option objects, and an optional
/// group tag used by group-scoped unification.
#[derive(Debug, Clone)]
pub struct Preset {
    pub name: String,
    pub plugins: Vec<String>,
    /// Toolbar components, grouped the way the toolbar renders them. The
    /// core instantiates these in order; layout itself is the toolbar's
    /// concern.
    pub ui_order: Vec<Vec<String>>,
    /// Per-plugin option objects layered over definition defaults.
    pub options: Map<String, Value>,
    pub group: Option<String>,
}

impl Preset {
    /// The stock preset: the bundled save/cancel/clean plugins with their
    /// buttons, no option overrides.
    pub fn base() -> Self {
        Self {
            name: "base".to_string(),
            plugins: vec![
                "save".to_string(),
                "cancel".to_string(),
                "clean".to_string(),
            ],
            ui_order: vec![
                vec!["save".to_string(), "cancel".to_string()],
                vec!["clean".to_string()],
            ],
            options: Map::new(),
            group: None,
        }
    }

    pub fn option_layer(&self, plugin: &str) -> Option<&Value> {
        self.options.get(plugin)
    }

    pub fn enables(&self, plugin: &str) -> bool {
        self.plugins.iter().any(|p| p == plugin)
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EditorSection {
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

/// Parsed shape of `scribe.toml`. `[plugins.<name>]` tables become the
/// per-instance override layer for that plugin.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub editor: EditorSection,
    #[serde(default)]
    pub plugins: toml::Table,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

impl Config {
    /// Per-plugin override objects, transcoded from TOML to the JSON value
    /// model the merge operates on.
    pub fn plugin_overrides(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for (name, table) in &self.file.plugins {
            match serde_json::to_value(table) {
                Ok(value) => {
                    out.insert(name.clone(), value);
                }
                Err(e) => {
                    tracing::warn!(target: "config", plugin = name.as_str(), ?e, "override_transcode_failed");
                }
            }
        }
        out
    }
}

/// Best-effort config path following platform conventions (XDG / AppData
/// Roaming). A local `scribe.toml` wins over the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("scribe.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("scribe").join("scribe.toml");
    }
    // Final fallback relative filename.
    PathBuf::from("scribe.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = std::fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => Ok(Config {
                raw: Some(content),
                file,
            }),
            Err(e) => {
                tracing::warn!(target: "config", file = %path.display(), ?e, "config_parse_failed");
                Err(e.into())
            }
        }
    } else {
        tracing::info!(target: "config", file = %path.display(), "config_absent_using_defaults");
        Ok(Config::default())
    }
}
