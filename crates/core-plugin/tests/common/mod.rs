//! Shared harness for the bundled-plugin integration tests: a transport
//! that parks requests for the test to resolve in any order, a notifier
//! that records every notice, and a workspace builder wiring registry,
//! instance set, and instances together.

// Each test binary uses a different slice of the harness.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;

use core_action::{CompletionFn, RequestFailure, RequestOutcome, SendRequest, Transport};
use core_editor::{
    EditableRegion, EditorInstance, EditorRegistry, InstanceConfig, Notice, NoticeHandle,
    NoticeOptions, Notifier, Preset,
};
use core_plugin::register_builtins;
use core_unify::{Editors, UnifyScope};

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Parks every request; tests resolve them explicitly, in any order, which
/// is how completion-order independence gets exercised.
pub struct MockTransport {
    pending: RefCell<Vec<(SendRequest, CompletionFn)>>,
    sent: RefCell<Vec<SendRequest>>,
}

impl MockTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            pending: RefCell::new(Vec::new()),
            sent: RefCell::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<SendRequest> {
        self.sent.borrow().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.borrow().len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Resolve the pending request at `index` with `outcome`. The callback
    /// runs synchronously, exactly like a completion arriving on the shared
    /// execution context.
    pub fn resolve(&self, index: usize, outcome: RequestOutcome) {
        let (_, on_complete) = self.pending.borrow_mut().remove(index);
        on_complete(outcome);
    }

    pub fn succeed(&self, index: usize) {
        self.resolve(
            index,
            RequestOutcome::Success {
                body: "ok".to_string(),
            },
        );
    }

    pub fn succeed_with(&self, index: usize, body: &str) {
        self.resolve(
            index,
            RequestOutcome::Success {
                body: body.to_string(),
            },
        );
    }

    pub fn fail(&self, index: usize) {
        self.resolve(
            index,
            RequestOutcome::Failure(RequestFailure {
                status: Some(500),
                body: "server error".to_string(),
            }),
        );
    }
}

impl Transport for MockTransport {
    fn send(&self, request: SendRequest, on_complete: CompletionFn) {
        self.sent.borrow_mut().push(request.clone());
        self.pending.borrow_mut().push((request, on_complete));
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeEvent {
    Loading(String),
    Confirm(String),
    Error(String),
}

pub struct RecordedNotice {
    hidden: Cell<bool>,
}

impl Notice for RecordedNotice {
    fn hide(&self) {
        self.hidden.set(true);
    }
}

impl RecordedNotice {
    pub fn is_hidden(&self) -> bool {
        self.hidden.get()
    }
}

/// Records every notice. With `auto_hide` (the default) confirm/error hide
/// callbacks run immediately, simulating a user who acknowledges every
/// notice; with it off the callbacks park until [`RecordingNotifier::run_parked_hides`].
pub struct RecordingNotifier {
    pub events: RefCell<Vec<NoticeEvent>>,
    auto_hide: Cell<bool>,
    parked: RefCell<Vec<Box<dyn FnOnce()>>>,
    loading_handles: RefCell<Vec<Rc<RecordedNotice>>>,
}

impl RecordingNotifier {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            events: RefCell::new(Vec::new()),
            auto_hide: Cell::new(true),
            parked: RefCell::new(Vec::new()),
            loading_handles: RefCell::new(Vec::new()),
        })
    }

    pub fn set_auto_hide(&self, auto_hide: bool) {
        self.auto_hide.set(auto_hide);
    }

    /// Run every parked hide callback (the user acknowledging notices).
    pub fn run_parked_hides(&self) {
        let parked: Vec<_> = self.parked.borrow_mut().drain(..).collect();
        for on_hide in parked {
            on_hide();
        }
    }

    pub fn confirms(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                NoticeEvent::Confirm(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                NoticeEvent::Error(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn loading_handles(&self) -> Vec<Rc<RecordedNotice>> {
        self.loading_handles.borrow().clone()
    }

    fn dispatch_hide(&self, options: NoticeOptions) {
        if let Some(on_hide) = options.on_hide {
            if self.auto_hide.get() {
                on_hide();
            } else {
                self.parked.borrow_mut().push(on_hide);
            }
        }
    }
}

impl Notifier for RecordingNotifier {
    fn show_loading(&self, message: &str) -> NoticeHandle {
        self.events
            .borrow_mut()
            .push(NoticeEvent::Loading(message.to_string()));
        let notice = Rc::new(RecordedNotice {
            hidden: Cell::new(false),
        });
        self.loading_handles.borrow_mut().push(Rc::clone(&notice));
        notice
    }

    fn show_confirm(&self, message: &str, options: NoticeOptions) -> NoticeHandle {
        self.events
            .borrow_mut()
            .push(NoticeEvent::Confirm(message.to_string()));
        self.dispatch_hide(options);
        Rc::new(RecordedNotice {
            hidden: Cell::new(false),
        })
    }

    fn show_error(&self, message: &str, options: NoticeOptions) -> NoticeHandle {
        self.events
            .borrow_mut()
            .push(NoticeEvent::Error(message.to_string()));
        self.dispatch_hide(options);
        Rc::new(RecordedNotice {
            hidden: Cell::new(false),
        })
    }
}

// ---------------------------------------------------------------------------
// Workspace
// ---------------------------------------------------------------------------

pub struct Harness {
    pub registry: Rc<EditorRegistry>,
    pub editors: Rc<Editors>,
    pub transport: Rc<MockTransport>,
    pub notifier: Rc<RecordingNotifier>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_scope(UnifyScope::AllEnabled)
    }

    pub fn with_scope(scope: UnifyScope) -> Self {
        let transport = MockTransport::new();
        let mut registry = EditorRegistry::new();
        register_builtins(&mut registry, transport.clone()).expect("builtins register once");
        Self {
            registry: Rc::new(registry),
            editors: Editors::new(scope),
            transport,
            notifier: RecordingNotifier::new(),
        }
    }

    /// Build, adopt, and enable an instance over a fresh region. `overrides`
    /// is the save plugin's per-instance option layer.
    pub fn instance(&self, name: &str, overrides: Option<Value>) -> Rc<EditorInstance> {
        let region = EditableRegion::new(name);
        region.set_content(format!("<p>{name}</p>"));
        let mut config = InstanceConfig::new(Preset::base());
        if let Some(overrides) = overrides {
            config = config.with_override("save", overrides);
        }
        let editor = EditorInstance::new(
            region,
            config,
            Rc::clone(&self.registry),
            self.notifier.clone(),
        );
        self.editors.adopt(&editor);
        editor.enable().expect("instance enables");
        editor
    }
}

/// Save options override enabling one-request-per-member dispatch.
pub fn multiple_mode() -> Value {
    serde_json::json!({ "multiple": true })
}
