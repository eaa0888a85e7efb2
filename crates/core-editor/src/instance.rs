//! One bound editable region: state flags, singleton plugins, UI handles,
//! event bus, and the lifecycle transitions between them.
//!
//! Ownership model: instances are handed out as `Rc<EditorInstance>`;
//! plugins keep `Weak` back-references and never outlive their editor.
//! All mutation happens on one execution context, so interior state lives
//! in `Cell`/`RefCell` without locks. The dirty flag only goes false→true
//! through [`EditorInstance::notify_change`] and true→false through
//! [`EditorInstance::set_saved`], which the save finalizer calls for
//! successfully saved members only.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Map, Value};

use core_config::{Config, Preset, merge_layers};
use core_events::{EditorEvent, EventBus, Handler, HandlerId};

use crate::notify::{Notifier, NoticeHandle, NoticeOptions};
use crate::ui::{UiButton, UiControl};
use crate::{EditorError, EditorPlugin, EditorRegistry, Unifier};

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to the externally owned editable target. The coordination core
/// treats content as an opaque string and never walks markup; plugins that
/// do interpret it (e.g. clean) go through this surface.
pub struct EditableRegion {
    name: String,
    attrs: HashMap<String, String>,
    content: RefCell<String>,
}

impl EditableRegion {
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            attrs: HashMap::new(),
            content: RefCell::new(String::new()),
        })
    }

    pub fn with_attrs(name: impl Into<String>, attrs: HashMap<String, String>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            attrs,
            content: RefCell::new(String::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, key: &str) -> Option<String> {
        self.attrs.get(key).cloned()
    }

    pub fn content(&self) -> String {
        self.content.borrow().clone()
    }

    pub fn set_content(&self, content: impl Into<String>) {
        *self.content.borrow_mut() = content.into();
    }
}

/// Resolved per-instance configuration: the active preset plus instance
/// overrides. Option objects for a plugin merge definition defaults ←
/// preset layer ← override layer on first plugin access.
#[derive(Debug, Clone)]
pub struct InstanceConfig {
    pub preset: Preset,
    pub overrides: Map<String, Value>,
    pub group: Option<String>,
}

impl InstanceConfig {
    pub fn new(preset: Preset) -> Self {
        let group = preset.group.clone();
        Self {
            preset,
            overrides: Map::new(),
            group,
        }
    }

    /// Combine a resolved preset with a parsed configuration file: the
    /// file's `[plugins.*]` tables become the override layer and
    /// `[editor].group` wins over the preset's group tag.
    pub fn from_config(preset: Preset, config: &Config) -> Self {
        let group = config
            .file
            .editor
            .group
            .clone()
            .or_else(|| preset.group.clone());
        Self {
            overrides: config.plugin_overrides(),
            preset,
            group,
        }
    }

    pub fn with_override(mut self, plugin: &str, value: Value) -> Self {
        self.overrides.insert(plugin.to_string(), value);
        self
    }

    fn merged_options(&self, name: &str, defaults: &Value) -> Value {
        merge_layers(
            defaults,
            self.preset.option_layer(name),
            self.overrides.get(name),
        )
    }
}

pub type PluginSlot = Rc<RefCell<Box<dyn EditorPlugin>>>;

pub struct EditorInstance {
    id: u64,
    region: Rc<EditableRegion>,
    config: InstanceConfig,
    registry: Rc<EditorRegistry>,
    notifier: Rc<dyn Notifier>,
    bus: EventBus,
    dirty: Cell<bool>,
    enabled: Cell<bool>,
    destroyed: Cell<bool>,
    toolbar_hidden: Cell<bool>,
    original_content: RefCell<String>,
    plugins: RefCell<HashMap<String, PluginSlot>>,
    ui: RefCell<Vec<(String, Rc<dyn UiControl>)>>,
    unifier: RefCell<Option<Weak<dyn Unifier>>>,
}

impl EditorInstance {
    pub fn new(
        region: Rc<EditableRegion>,
        config: InstanceConfig,
        registry: Rc<EditorRegistry>,
        notifier: Rc<dyn Notifier>,
    ) -> Rc<Self> {
        let id = NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(target: "editor", id, region = region.name(), preset = config.preset.name.as_str(), "instance_created");
        Rc::new(Self {
            id,
            region,
            config,
            registry,
            notifier,
            bus: EventBus::new(),
            dirty: Cell::new(false),
            enabled: Cell::new(false),
            destroyed: Cell::new(false),
            toolbar_hidden: Cell::new(false),
            original_content: RefCell::new(String::new()),
            plugins: RefCell::new(HashMap::new()),
            ui: RefCell::new(Vec::new()),
            unifier: RefCell::new(None),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        self.region.name()
    }

    pub fn region(&self) -> &Rc<EditableRegion> {
        &self.region
    }

    pub fn attr(&self, key: &str) -> Option<String> {
        self.region.attr(key)
    }

    pub fn group(&self) -> Option<&str> {
        self.config.group.as_deref()
    }

    pub fn config(&self) -> &InstanceConfig {
        &self.config
    }

    pub fn notifier(&self) -> Rc<dyn Notifier> {
        Rc::clone(&self.notifier)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    pub fn is_toolbar_hidden(&self) -> bool {
        self.toolbar_hidden.get()
    }

    // ---------------------------------------------------------------------
    // Event bus facade
    // ---------------------------------------------------------------------

    pub fn bind(&self, event: EditorEvent, owner: impl Into<String>, handler: Handler) -> HandlerId {
        self.bus.on(event, owner, handler)
    }

    pub fn unbind(&self, id: HandlerId) -> bool {
        self.bus.off(id)
    }

    pub fn unbind_owner(&self, event: EditorEvent, owner: &str) -> usize {
        self.bus.off_owner(event, owner)
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Make the region editable: snapshot its content for later reset,
    /// eagerly instantiate every enabled plugin and every configured UI
    /// component, then fire `Enabled` exactly once.
    pub fn enable(self: &Rc<Self>) -> Result<(), EditorError> {
        if self.destroyed.get() {
            return Err(EditorError::Destroyed);
        }
        if self.enabled.get() {
            tracing::trace!(target: "editor", id = self.id, "enable_repeated");
            return Ok(());
        }

        *self.original_content.borrow_mut() = self.region.content();

        let plugin_names = self.config.preset.plugins.clone();
        for name in &plugin_names {
            self.plugin(name)?;
        }

        let ui_order = self.config.preset.ui_order.clone();
        for group in &ui_order {
            for name in group {
                if self.ui.borrow().iter().any(|(n, _)| n == name) {
                    continue;
                }
                let def = self.registry.ui.lookup(name)?;
                let control = def.instantiate().init(self)?;
                self.ui.borrow_mut().push((name.clone(), control));
            }
        }

        self.enabled.set(true);
        self.toolbar_hidden.set(false);
        tracing::info!(target: "editor", id = self.id, region = self.region.name(), plugins = plugin_names.len(), "enabled");
        self.bus.fire(EditorEvent::Enabled);
        Ok(())
    }

    /// The singleton plugin instance for `name`, constructed on first
    /// access. Fails with [`EditorError::PluginNotEnabled`] when the name is
    /// not in this instance's enabled set, and with the registry's
    /// `NotFound` when enabled but never registered.
    pub fn plugin(self: &Rc<Self>, name: &str) -> Result<PluginSlot, EditorError> {
        if !self.config.preset.enables(name) {
            return Err(EditorError::PluginNotEnabled(name.to_string()));
        }
        if let Some(slot) = self.plugins.borrow().get(name) {
            return Ok(Rc::clone(slot));
        }

        let def = self.registry.plugins.lookup(name)?;
        let options = self.config.merged_options(name, def.defaults());
        let slot: PluginSlot = Rc::new(RefCell::new(def.instantiate()));
        // Insert before init so a plugin looking itself up during its own
        // init observes the same singleton.
        self.plugins
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&slot));
        if let Err(e) = slot.borrow_mut().init(self, &options) {
            self.plugins.borrow_mut().remove(name);
            return Err(e);
        }
        tracing::debug!(target: "editor.plugin", id = self.id, plugin = name, "plugin_initialized");
        Ok(slot)
    }

    /// Run `f` against the concrete type of an enabled plugin (mutable).
    pub fn with_plugin<P: EditorPlugin, R>(
        self: &Rc<Self>,
        name: &str,
        f: impl FnOnce(&mut P) -> R,
    ) -> Result<R, EditorError> {
        let slot = self.plugin(name)?;
        let mut guard = slot.borrow_mut();
        // Deref through the box so the downcast sees the concrete plugin,
        // not the box (the blanket AsAny impl covers both).
        let plugin = (**guard)
            .as_any_mut()
            .downcast_mut::<P>()
            .ok_or_else(|| EditorError::PluginType(name.to_string()))?;
        Ok(f(plugin))
    }

    /// Run `f` against the concrete type of an enabled plugin (shared).
    /// Usable while another shared borrow of the same slot is live, which
    /// matters when a plugin operation re-enters through `unify`.
    pub fn with_plugin_ref<P: EditorPlugin, R>(
        self: &Rc<Self>,
        name: &str,
        f: impl FnOnce(&P) -> R,
    ) -> Result<R, EditorError> {
        let slot = self.plugin(name)?;
        let guard = slot.borrow();
        let plugin = (**guard)
            .as_any()
            .downcast_ref::<P>()
            .ok_or_else(|| EditorError::PluginType(name.to_string()))?;
        Ok(f(plugin))
    }

    /// Stock button constructor used by the bundled UI components.
    pub fn ui_button(
        &self,
        title: impl Into<String>,
        icon: Option<String>,
        on_click: impl Fn() + 'static,
    ) -> Rc<UiButton> {
        let button = UiButton::new(title, icon, on_click);
        tracing::trace!(target: "editor.ui", id = self.id, title = button.title(), "button_created");
        button
    }

    /// Rendered control handles in toolbar order.
    pub fn ui_controls(&self) -> Vec<(String, Rc<dyn UiControl>)> {
        self.ui.borrow().clone()
    }

    pub fn ui_control(&self, name: &str) -> Option<Rc<dyn UiControl>> {
        self.ui
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| Rc::clone(c))
    }

    // ---------------------------------------------------------------------
    // Content and dirty tracking
    // ---------------------------------------------------------------------

    /// Replace the region content and report the mutation.
    pub fn update_content(&self, content: impl Into<String>) {
        self.region.set_content(content);
        self.notify_change();
    }

    /// Record a content mutation. The dirty flag is set at the instance
    /// level before any `Change` handler runs.
    pub fn notify_change(&self) {
        self.dirty.set(true);
        tracing::trace!(target: "editor", id = self.id, "change");
        self.bus.fire(EditorEvent::Change);
    }

    /// Content as contributed to a save cycle: fires `Save` first so
    /// plugins can normalize state, then reads the region.
    pub fn collect_content(&self) -> String {
        self.bus.fire(EditorEvent::Save);
        self.region.content()
    }

    /// Discard unsaved edits: fire `Cancel` so plugins can drop derived
    /// state, then restore the enable-time snapshot.
    pub fn discard_edits(&self) {
        self.bus.fire(EditorEvent::Cancel);
        self.reset_content();
    }

    /// Restore the enable-time snapshot. Deliberately leaves the dirty flag
    /// alone: discarding edits is not saving them.
    pub fn reset_content(&self) {
        self.region.set_content(self.original_content.borrow().clone());
        tracing::debug!(target: "editor", id = self.id, "content_reset");
    }

    /// The only dirty→false transition; called by the save finalizer for
    /// members whose payload reached the server.
    pub fn set_saved(&self) {
        self.dirty.set(false);
        tracing::debug!(target: "editor", id = self.id, "content_saved");
    }

    pub fn disable_editing(&self) {
        self.enabled.set(false);
        tracing::debug!(target: "editor", id = self.id, "editing_disabled");
    }

    pub fn hide_toolbar(&self) {
        self.toolbar_hidden.set(true);
        for (_, control) in self.ui.borrow().iter() {
            control.hide();
        }
    }

    pub fn show_toolbar(&self) {
        self.toolbar_hidden.set(false);
        for (_, control) in self.ui.borrow().iter() {
            control.show();
        }
    }

    // ---------------------------------------------------------------------
    // Notifications (delegated to the host collaborator)
    // ---------------------------------------------------------------------

    pub fn show_loading(&self, message: &str) -> NoticeHandle {
        self.notifier.show_loading(message)
    }

    pub fn show_confirm(&self, message: &str, options: NoticeOptions) -> NoticeHandle {
        self.notifier.show_confirm(message, options)
    }

    pub fn show_error(&self, message: &str, options: NoticeOptions) -> NoticeHandle {
        self.notifier.show_error(message, options)
    }

    // ---------------------------------------------------------------------
    // Unification
    // ---------------------------------------------------------------------

    pub fn set_unifier(&self, unifier: Weak<dyn Unifier>) {
        *self.unifier.borrow_mut() = Some(unifier);
    }

    /// Apply `action` across the unified instance set this editor belongs
    /// to. Without an attached coordinator the action applies to this
    /// instance alone.
    pub fn unify(self: &Rc<Self>, mut action: impl FnMut(&Rc<EditorInstance>)) {
        let coordinator = self
            .unifier
            .borrow()
            .as_ref()
            .and_then(Weak::upgrade);
        match coordinator {
            Some(c) => c.unify(self, &mut action),
            None => action(self),
        }
    }

    // ---------------------------------------------------------------------
    // Teardown
    // ---------------------------------------------------------------------

    /// Tear the instance down: fire `Destroy`, run each plugin's destroy
    /// hook, drop subscribers and UI handles. Safe to call repeatedly; only
    /// the first call does any work.
    pub fn destroy(self: &Rc<Self>) {
        if self.destroyed.replace(true) {
            tracing::trace!(target: "editor", id = self.id, "destroy_repeated");
            return;
        }
        tracing::info!(target: "editor", id = self.id, region = self.region.name(), "destroy");
        self.bus.fire(EditorEvent::Destroy);

        let slots: Vec<PluginSlot> = self.plugins.borrow().values().cloned().collect();
        for slot in slots {
            slot.borrow_mut().destroy(self);
        }

        self.bus.clear();
        self.ui.borrow_mut().clear();
        self.enabled.set(false);
    }
}

impl fmt::Debug for EditorInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorInstance")
            .field("id", &self.id)
            .field("region", &self.region.name())
            .field("dirty", &self.dirty.get())
            .field("enabled", &self.enabled.get())
            .field("destroyed", &self.destroyed.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::LogNotifier;
    use crate::{PluginDefinition, UiComponent, UiDefinition};
    use serde_json::json;
    use std::cell::Cell;

    struct CountingPlugin {
        inits: Rc<Cell<usize>>,
        destroys: Rc<Cell<usize>>,
        seen_options: Rc<RefCell<Value>>,
    }

    impl EditorPlugin for CountingPlugin {
        fn init(&mut self, _editor: &Rc<EditorInstance>, options: &Value) -> Result<(), EditorError> {
            self.inits.set(self.inits.get() + 1);
            *self.seen_options.borrow_mut() = options.clone();
            Ok(())
        }

        fn destroy(&mut self, _editor: &Rc<EditorInstance>) {
            self.destroys.set(self.destroys.get() + 1);
        }
    }

    struct Probe {
        inits: Rc<Cell<usize>>,
        destroys: Rc<Cell<usize>>,
        options: Rc<RefCell<Value>>,
    }

    fn counting_definition(name: &str, defaults: Value) -> (PluginDefinition, Probe) {
        let probe = Probe {
            inits: Rc::new(Cell::new(0)),
            destroys: Rc::new(Cell::new(0)),
            options: Rc::new(RefCell::new(Value::Null)),
        };
        let inits = Rc::clone(&probe.inits);
        let destroys = Rc::clone(&probe.destroys);
        let options = Rc::clone(&probe.options);
        let def = PluginDefinition::new(name, defaults, move || {
            Box::new(CountingPlugin {
                inits: Rc::clone(&inits),
                destroys: Rc::clone(&destroys),
                seen_options: Rc::clone(&options),
            })
        });
        (def, probe)
    }

    fn preset(plugins: &[&str]) -> Preset {
        Preset {
            name: "test".to_string(),
            plugins: plugins.iter().map(|s| s.to_string()).collect(),
            ui_order: Vec::new(),
            options: Map::new(),
            group: None,
        }
    }

    fn instance_with(
        registry: EditorRegistry,
        config: InstanceConfig,
        content: &str,
    ) -> Rc<EditorInstance> {
        let region = EditableRegion::new("area");
        region.set_content(content);
        EditorInstance::new(region, config, Rc::new(registry), Rc::new(LogNotifier))
    }

    #[test]
    fn plugin_is_a_singleton_and_inits_once() {
        let mut registry = EditorRegistry::new();
        let (def, probe) = counting_definition("counter", json!({}));
        registry.plugins.register("counter", def).unwrap();

        let editor = instance_with(registry, InstanceConfig::new(preset(&["counter"])), "");
        let first = editor.plugin("counter").unwrap();
        let second = editor.plugin("counter").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(probe.inits.get(), 1);
    }

    #[test]
    fn plugin_options_merge_defaults_preset_and_overrides() {
        let mut registry = EditorRegistry::new();
        let (def, probe) = counting_definition(
            "counter",
            json!({ "a": 1, "nested": { "x": "default", "y": "default" } }),
        );
        registry.plugins.register("counter", def).unwrap();

        let mut p = preset(&["counter"]);
        p.options.insert(
            "counter".to_string(),
            json!({ "nested": { "x": "preset" } }),
        );
        let config = InstanceConfig::new(p).with_override("counter", json!({ "a": 3 }));
        let editor = instance_with(registry, config, "");
        editor.plugin("counter").unwrap();

        let seen = probe.options.borrow();
        assert_eq!(seen["a"], 3);
        assert_eq!(seen["nested"]["x"], "preset");
        assert_eq!(seen["nested"]["y"], "default");
    }

    #[test]
    fn plugin_outside_enabled_set_is_rejected() {
        let mut registry = EditorRegistry::new();
        let (def, _) = counting_definition("counter", json!({}));
        registry.plugins.register("counter", def).unwrap();

        let editor = instance_with(registry, InstanceConfig::new(preset(&[])), "");
        let err = editor.plugin("counter").err().unwrap();
        assert!(matches!(err, EditorError::PluginNotEnabled(name) if name == "counter"));
    }

    #[test]
    fn enabled_but_unregistered_plugin_is_not_found() {
        let registry = EditorRegistry::new();
        let editor = instance_with(registry, InstanceConfig::new(preset(&["ghost"])), "");
        let err = editor.plugin("ghost").err().unwrap();
        assert!(matches!(err, EditorError::Registry(_)));
    }

    #[test]
    fn wrong_concrete_type_downcast_fails() {
        let mut registry = EditorRegistry::new();
        let (def, _) = counting_definition("counter", json!({}));
        registry.plugins.register("counter", def).unwrap();

        struct Other;
        impl EditorPlugin for Other {
            fn init(&mut self, _: &Rc<EditorInstance>, _: &Value) -> Result<(), EditorError> {
                Ok(())
            }
        }

        let editor = instance_with(registry, InstanceConfig::new(preset(&["counter"])), "");
        let err = editor.with_plugin::<Other, _>("counter", |_| ()).unwrap_err();
        assert!(matches!(err, EditorError::PluginType(_)));
    }

    #[test]
    fn change_records_dirty_before_handlers_run() {
        let registry = EditorRegistry::new();
        let editor = instance_with(registry, InstanceConfig::new(preset(&[])), "initial");
        editor.enable().unwrap();

        let observed = Rc::new(Cell::new(None));
        {
            let editor_weak = Rc::downgrade(&editor);
            let observed = Rc::clone(&observed);
            editor.bind(
                EditorEvent::Change,
                "probe",
                Rc::new(move || {
                    let editor = editor_weak.upgrade().unwrap();
                    observed.set(Some(editor.is_dirty()));
                }),
            );
        }

        assert!(!editor.is_dirty());
        editor.update_content("edited");
        assert_eq!(observed.get(), Some(true));
        assert!(editor.is_dirty());
    }

    #[test]
    fn enable_fires_enabled_once_and_is_idempotent() {
        let registry = EditorRegistry::new();
        let editor = instance_with(registry, InstanceConfig::new(preset(&[])), "");

        let fired = Rc::new(Cell::new(0));
        {
            let fired = Rc::clone(&fired);
            editor.bind(
                EditorEvent::Enabled,
                "probe",
                Rc::new(move || fired.set(fired.get() + 1)),
            );
        }

        editor.enable().unwrap();
        editor.enable().unwrap();
        assert_eq!(fired.get(), 1);
        assert!(editor.is_enabled());
    }

    #[test]
    fn reset_restores_snapshot_but_keeps_dirty() {
        let registry = EditorRegistry::new();
        let editor = instance_with(registry, InstanceConfig::new(preset(&[])), "original");
        editor.enable().unwrap();

        editor.update_content("edited");
        assert!(editor.is_dirty());
        editor.reset_content();
        assert_eq!(editor.region().content(), "original");
        assert!(editor.is_dirty(), "cancel discards content, not history");

        editor.set_saved();
        assert!(!editor.is_dirty());
    }

    #[test]
    fn destroy_is_idempotent_and_runs_hooks_once() {
        let mut registry = EditorRegistry::new();
        let (def, probe) = counting_definition("counter", json!({}));
        registry.plugins.register("counter", def).unwrap();

        let editor = instance_with(registry, InstanceConfig::new(preset(&["counter"])), "");
        editor.enable().unwrap();

        let destroy_events = Rc::new(Cell::new(0));
        {
            let destroy_events = Rc::clone(&destroy_events);
            editor.bind(
                EditorEvent::Destroy,
                "probe",
                Rc::new(move || destroy_events.set(destroy_events.get() + 1)),
            );
        }

        editor.destroy();
        editor.destroy();
        assert_eq!(destroy_events.get(), 1);
        assert_eq!(probe.destroys.get(), 1);
        assert!(editor.is_destroyed());
        assert!(!editor.is_enabled());
    }

    #[test]
    fn enable_after_destroy_is_an_error() {
        let registry = EditorRegistry::new();
        let editor = instance_with(registry, InstanceConfig::new(preset(&[])), "");
        editor.destroy();
        assert!(matches!(editor.enable(), Err(EditorError::Destroyed)));
    }

    #[test]
    fn unify_without_coordinator_targets_self() {
        let registry = EditorRegistry::new();
        let editor = instance_with(registry, InstanceConfig::new(preset(&[])), "");
        let mut visited = Vec::new();
        editor.unify(|member| visited.push(member.id()));
        assert_eq!(visited, [editor.id()]);
    }

    #[test]
    fn ui_components_initialize_in_configured_order() {
        struct Button(&'static str);
        impl UiComponent for Button {
            fn init(
                &mut self,
                editor: &Rc<EditorInstance>,
            ) -> Result<Rc<dyn UiControl>, EditorError> {
                Ok(editor.ui_button(self.0, None, || {}))
            }
        }

        let mut registry = EditorRegistry::new();
        registry
            .ui
            .register("one", UiDefinition::new("one", || Box::new(Button("one"))))
            .unwrap();
        registry
            .ui
            .register("two", UiDefinition::new("two", || Box::new(Button("two"))))
            .unwrap();

        let mut p = preset(&[]);
        p.ui_order = vec![vec!["two".to_string()], vec!["one".to_string()]];
        let editor = instance_with(registry, InstanceConfig::new(p), "");
        editor.enable().unwrap();

        let names: Vec<String> = editor.ui_controls().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["two", "one"]);

        editor.hide_toolbar();
        assert!(editor.ui_control("one").unwrap().is_hidden());
        editor.show_toolbar();
        assert!(!editor.ui_control("one").unwrap().is_hidden());
    }
}
