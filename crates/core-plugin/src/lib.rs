//! Bundled plugins: save, cancel, and clean, plus their toolbar buttons.
//!
//! Each plugin is registered as a definition (name, default options,
//! factory) and instantiated per editor instance with merged options. The
//! save plugin is the aggregate action coordinator: it fans one Save click
//! out across the unified instance set and folds the per-request outcomes
//! into a single user-facing result. Cancel and clean ride the same
//! lifecycle events without knowing save exists — the only coupling between
//! the three is the bus and the instance's dirty flag.

pub mod cancel;
pub mod clean;
pub mod save;

use std::rc::Rc;

use thiserror::Error;

use core_action::{ActionError, Transport};
use core_editor::{EditorError, EditorRegistry, PluginDefinition, UiDefinition};
use core_registry::RegistryError;

pub use cancel::{CancelButton, CancelPlugin, CANCEL_PLUGIN};
pub use clean::{CleanButton, CleanPlugin, CLEAN_PLUGIN};
pub use save::{SaveButton, SaveOptions, SavePlugin, SAVE_PLUGIN};

#[derive(Debug, Error)]
pub enum PluginError {
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Register the bundled plugin and UI definitions. The save factory
/// captures the injected transport; everything else is self-contained.
pub fn register_builtins(
    registry: &mut EditorRegistry,
    transport: Rc<dyn Transport>,
) -> Result<(), RegistryError> {
    registry.plugins.register(
        SAVE_PLUGIN,
        PluginDefinition::new(SAVE_PLUGIN, save::default_options(), {
            let transport = Rc::clone(&transport);
            move || Box::new(SavePlugin::new(Rc::clone(&transport)))
        }),
    )?;
    registry.plugins.register(
        CANCEL_PLUGIN,
        PluginDefinition::new(CANCEL_PLUGIN, cancel::default_options(), || {
            Box::new(CancelPlugin::new())
        }),
    )?;
    registry.plugins.register(
        CLEAN_PLUGIN,
        PluginDefinition::new(CLEAN_PLUGIN, clean::default_options(), || {
            Box::new(CleanPlugin::new())
        }),
    )?;

    registry.ui.register(
        SAVE_PLUGIN,
        UiDefinition::new(SAVE_PLUGIN, || Box::new(SaveButton)),
    )?;
    registry.ui.register(
        CANCEL_PLUGIN,
        UiDefinition::new(CANCEL_PLUGIN, || Box::new(CancelButton)),
    )?;
    registry.ui.register(
        CLEAN_PLUGIN,
        UiDefinition::new(CLEAN_PLUGIN, || Box::new(CleanButton)),
    )?;
    Ok(())
}
