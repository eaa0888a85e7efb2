//! Lifecycle event kinds and the per-instance synchronous event bus.
//!
//! Every editor instance owns one [`EventBus`]. Plugins subscribe handlers
//! to the closed set of [`EditorEvent`] kinds and the instance fires them at
//! well-defined lifecycle points. Dispatch is synchronous and runs on the
//! calling thread — there is no deferred delivery and no cross-instance
//! routing; coordination across instances goes through the unification
//! layer, not through this bus.
//!
//! Dispatch semantics:
//! - Handlers run in registration order.
//! - `fire` snapshots the handler list before iterating, so a handler that
//!   unregisters itself (or any other handler) mid-dispatch does not affect
//!   the in-flight pass, and a handler registered mid-dispatch is not
//!   invoked until the next pass.
//! - Firing an event with no handlers is a no-op.
//!
//! Handlers carry an `owner` tag (the subscribing plugin's name). The same
//! handler body can therefore be attached by several plugin instances and
//! still be removed individually, which is what the removal contract
//! (`off` by exact entry, `off_owner` by tag) keys on.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Closed set of lifecycle events an editor instance can fire.
///
/// - `Enabled`: once, after the instance becomes editable; plugins attach
///   their listeners here.
/// - `Change`: after every content mutation; the instance records
///   dirty=true before handlers run.
/// - `Save`: during save-content collection, before any network dispatch,
///   so plugins can normalize state.
/// - `Cancel`: when unsaved edits are being discarded.
/// - `Destroy`: once per instance even if teardown is requested twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorEvent {
    Enabled,
    Change,
    Save,
    Cancel,
    Destroy,
}

impl fmt::Display for EditorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditorEvent::Enabled => "enabled",
            EditorEvent::Change => "change",
            EditorEvent::Save => "save",
            EditorEvent::Cancel => "cancel",
            EditorEvent::Destroy => "destroy",
        };
        f.write_str(name)
    }
}

/// Opaque token identifying one `on` registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

pub type Handler = Rc<dyn Fn()>;

struct Entry {
    id: HandlerId,
    event: EditorEvent,
    owner: String,
    handler: Handler,
}

/// Synchronous publish/subscribe bus scoped to one editor instance.
#[derive(Default)]
pub struct EventBus {
    entries: RefCell<Vec<Entry>>,
    next_id: Cell<u64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event`, tagged with the subscribing plugin's
    /// name. Returns the token used for exact removal.
    pub fn on(&self, event: EditorEvent, owner: impl Into<String>, handler: Handler) -> HandlerId {
        let id = HandlerId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        let owner = owner.into();
        tracing::trace!(target: "editor.events", event = %event, owner = owner.as_str(), "subscribe");
        self.entries.borrow_mut().push(Entry {
            id,
            event,
            owner,
            handler,
        });
        id
    }

    /// Remove the registration identified by `id`. Returns whether an entry
    /// was removed. Removal during a dispatch pass takes effect on the next
    /// pass only.
    pub fn off(&self, id: HandlerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        entries.len() != before
    }

    /// Remove every handler `owner` registered for `event`. Returns the
    /// number of entries removed.
    pub fn off_owner(&self, event: EditorEvent, owner: &str) -> usize {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|e| !(e.event == event && e.owner == owner));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::trace!(target: "editor.events", event = %event, owner, removed, "unsubscribe");
        }
        removed
    }

    /// Invoke every handler currently registered for `event`, in
    /// registration order, synchronously. Returns the number of handlers
    /// invoked.
    pub fn fire(&self, event: EditorEvent) -> usize {
        // Snapshot before iterating: handlers may call on/off on this bus
        // while the pass is running.
        let snapshot: Vec<Handler> = self
            .entries
            .borrow()
            .iter()
            .filter(|e| e.event == event)
            .map(|e| Rc::clone(&e.handler))
            .collect();
        tracing::trace!(target: "editor.events", event = %event, handlers = snapshot.len(), "fire");
        for handler in &snapshot {
            handler();
        }
        snapshot.len()
    }

    /// Drop every subscriber. Used at instance teardown.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn handler_count(&self, event: EditorEvent) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.event == event)
            .count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.entries.borrow().len())
            .finish()
    }
}
