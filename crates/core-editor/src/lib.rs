//! Editor instance lifecycle: plugin/UI definitions, capability traits, and
//! the per-instance state every plugin rides on.
//!
//! An [`EditorInstance`] is one bound editable region. It owns its merged
//! configuration, its singleton plugin instances, its rendered UI control
//! handles, its dirty/enabled flags, and its event bus. Definitions come
//! from an [`EditorRegistry`] populated before any instance is constructed
//! and injected at construction time — there is no ambient global catalogue.
//!
//! Capability surface: plugins implement [`EditorPlugin`] (`init` required,
//! `destroy` defaulted to a no-op), UI components implement [`UiComponent`]
//! whose `init` additionally returns the rendered control handle the
//! toolbar places. Domain operations beyond the lifecycle hooks are reached
//! by downcast through [`EditorInstance::with_plugin`].

pub mod instance;
pub mod notify;
pub mod ui;

use std::any::Any;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use core_registry::{Registry, RegistryError, RegistryKind};

pub use core_config::Preset;
pub use core_events::{EditorEvent, EventBus, Handler, HandlerId};
pub use instance::{EditableRegion, EditorInstance, InstanceConfig, PluginSlot};
pub use notify::{LogNotifier, Notice, NoticeHandle, NoticeOptions, Notifier};
pub use ui::{UiButton, UiControl};

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("plugin `{0}` is not enabled on this instance")]
    PluginNotEnabled(String),
    #[error("plugin `{0}` does not have the requested concrete type")]
    PluginType(String),
    #[error("plugin `{name}` rejected its options: {source}")]
    InvalidOptions {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("plugin `{name}` failed to initialize: {message}")]
    Init { name: String, message: String },
    #[error("editor instance is destroyed")]
    Destroyed,
}

/// Object-safe downcast support for capability trait objects. Blanket
/// implemented so concrete plugins only write their lifecycle hooks.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A stateful plugin attached to one editor instance.
///
/// `init` runs exactly once per (instance, plugin) pair, receiving the
/// owning instance and the option object merged from definition defaults,
/// preset options, and per-instance overrides. Plugins that attach bus
/// handlers typically do so here (or on the `Enabled` event) and detach in
/// `destroy`.
pub trait EditorPlugin: AsAny + 'static {
    fn init(&mut self, editor: &Rc<EditorInstance>, options: &Value) -> Result<(), EditorError>;

    /// Teardown hook. Runs at most once; the instance guards against
    /// repeated destroy requests.
    fn destroy(&mut self, _editor: &Rc<EditorInstance>) {}
}

/// A UI component attached to one editor instance. `init` returns the
/// rendered control handle; placement is the toolbar's concern.
pub trait UiComponent: 'static {
    fn init(&mut self, editor: &Rc<EditorInstance>) -> Result<Rc<dyn UiControl>, EditorError>;
}

/// Immutable plugin definition: name, default options, factory.
pub struct PluginDefinition {
    name: String,
    defaults: Value,
    factory: Box<dyn Fn() -> Box<dyn EditorPlugin>>,
}

impl PluginDefinition {
    pub fn new(
        name: impl Into<String>,
        defaults: Value,
        factory: impl Fn() -> Box<dyn EditorPlugin> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            defaults,
            factory: Box::new(factory),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn defaults(&self) -> &Value {
        &self.defaults
    }

    pub fn instantiate(&self) -> Box<dyn EditorPlugin> {
        (self.factory)()
    }
}

/// Immutable UI-component definition, analogous to [`PluginDefinition`].
pub struct UiDefinition {
    name: String,
    factory: Box<dyn Fn() -> Box<dyn UiComponent>>,
}

impl UiDefinition {
    pub fn new(name: impl Into<String>, factory: impl Fn() -> Box<dyn UiComponent> + 'static) -> Self {
        Self {
            name: name.into(),
            factory: Box::new(factory),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instantiate(&self) -> Box<dyn UiComponent> {
        (self.factory)()
    }
}

/// The application root's definition catalogues, one per kind. Populated
/// during startup, read-only once instances exist.
pub struct EditorRegistry {
    pub plugins: Registry<PluginDefinition>,
    pub ui: Registry<UiDefinition>,
}

impl EditorRegistry {
    pub fn new() -> Self {
        Self {
            plugins: Registry::new(RegistryKind::Plugin),
            ui: Registry::new(RegistryKind::Ui),
        }
    }
}

impl Default for EditorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Seam between an instance and the coordinator that fans a caller-supplied
/// action out across the unified instance set. Implemented by the instance
/// set in `core-unify`; an instance without an attached unifier applies
/// actions to itself only.
pub trait Unifier {
    fn unify(&self, origin: &Rc<EditorInstance>, action: &mut dyn FnMut(&Rc<EditorInstance>));
}

/// Deserialize a merged option object into a plugin's typed options.
pub fn parse_options<T: DeserializeOwned>(name: &str, options: &Value) -> Result<T, EditorError> {
    serde_json::from_value(options.clone()).map_err(|source| EditorError::InvalidOptions {
        name: name.to_string(),
        source,
    })
}
