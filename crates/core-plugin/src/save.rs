//! Save plugin: the aggregate action coordinator.
//!
//! One Save click fans out as follows: collect a payload from every dirty
//! member of the unified set (each through its own save plugin, so
//! per-member options apply), dispatch one request per payload ("multiple"
//! mode) or one request for the whole mapping ("batch" mode), fold the
//! asynchronously arriving outcomes into an [`AggregateCycle`], and
//! finalize exactly once when every payload has a terminal result: hide the
//! loading indicator, mark the succeeded members saved, and emit one
//! aggregate notification. On full success the confirmation's hide callback
//! disables editing and hides the toolbar uniformly across the set.
//!
//! A second trigger while a cycle is in flight is rejected with
//! [`ActionError::CycleInFlight`]; a mid-flight request failure never
//! aborts its siblings — it is only counted.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::Deserialize;
use serde_json::{json, Map, Value};

use core_action::{
    ActionError, AggregateCycle, CompletionFn, CycleOutcome, DispatchMode, Endpoint,
    RequestOutcome, SendRequest, Transport,
};
use core_editor::{
    parse_options, EditorError, EditorInstance, EditorPlugin, NoticeHandle, NoticeOptions,
    UiComponent, UiControl,
};

use crate::PluginError;

pub const SAVE_PLUGIN: &str = "save";

/// Where a member's content identifier comes from: a fixed string or one of
/// the region's attributes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdSource {
    Fixed(String),
    Attr { attr: String },
}

impl Default for IdSource {
    fn default() -> Self {
        IdSource::Attr {
            attr: "name".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SaveOptions {
    pub id: IdSource,
    /// Form field the serialized payload mapping travels under.
    pub post_name: String,
    /// Surface each request's server response instead of the aggregate
    /// notification.
    pub show_response: bool,
    /// Append the content identifier to the endpoint URL (multiple mode).
    pub append_id: bool,
    /// Multiple mode: one request per dirty member.
    pub multiple: bool,
    pub endpoint: Endpoint,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            id: IdSource::default(),
            post_name: "content".to_string(),
            show_response: false,
            append_id: false,
            multiple: false,
            endpoint: Endpoint::default(),
        }
    }
}

pub fn default_options() -> Value {
    json!({
        "id": { "attr": "name" },
        "post_name": "content",
        "show_response": false,
        "append_id": false,
        "multiple": false,
        "endpoint": { "url": "/", "method": "post" }
    })
}

type ActiveCycle = Rc<RefCell<AggregateCycle>>;

struct Contribution {
    id: String,
    content: String,
    member: Weak<EditorInstance>,
}

/// Everything the per-request completion callbacks share for one cycle.
struct CycleContext {
    editor: Weak<EditorInstance>,
    members: Vec<(String, Weak<EditorInstance>)>,
    loading: NoticeHandle,
    active: Rc<RefCell<Option<ActiveCycle>>>,
    show_response: bool,
}

pub struct SavePlugin {
    editor: Weak<EditorInstance>,
    options: SaveOptions,
    transport: Rc<dyn Transport>,
    active: Rc<RefCell<Option<ActiveCycle>>>,
}

impl SavePlugin {
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        Self {
            editor: Weak::new(),
            options: SaveOptions::default(),
            transport,
            active: Rc::new(RefCell::new(None)),
        }
    }

    pub fn options(&self) -> &SaveOptions {
        &self.options
    }

    /// The owning instance, while it is alive.
    pub fn editor(&self) -> Option<Rc<EditorInstance>> {
        self.editor.upgrade()
    }

    /// Whether this plugin instance currently has a cycle in flight.
    pub fn is_saving(&self) -> bool {
        self.active
            .borrow()
            .as_ref()
            .is_some_and(|cycle| !cycle.borrow().is_finalized())
    }

    /// This member's content identifier under its own options.
    fn content_id(&self, editor: &EditorInstance) -> String {
        match &self.options.id {
            IdSource::Fixed(id) => id.clone(),
            IdSource::Attr { attr } => editor
                .attr(attr)
                .unwrap_or_else(|| editor.name().to_string()),
        }
    }

    /// One member's contribution to the cycle: identifier plus save-ready
    /// content (fires the member's `Save` event).
    fn contribution(&self, editor: &Rc<EditorInstance>) -> (String, String) {
        (self.content_id(editor), editor.collect_content())
    }

    /// Run the aggregate save originating at `editor`.
    pub fn trigger(editor: &Rc<EditorInstance>) -> Result<(), PluginError> {
        let (options, active, transport) =
            editor.with_plugin_ref::<SavePlugin, _>(SAVE_PLUGIN, |plugin| {
                (
                    plugin.options.clone(),
                    Rc::clone(&plugin.active),
                    Rc::clone(&plugin.transport),
                )
            })?;

        {
            let guard = active.borrow();
            if let Some(cycle) = guard.as_ref()
                && !cycle.borrow().is_finalized()
            {
                tracing::warn!(target: "save", editor = editor.id(), "save_rejected_cycle_in_flight");
                return Err(ActionError::CycleInFlight.into());
            }
        }

        let loading = editor.show_loading("Saving changes...");

        // Collecting: every dirty member of the unified set contributes
        // through its own save plugin; non-dirty members are excluded from
        // the denominator.
        let mut contributions: Vec<Contribution> = Vec::new();
        editor.unify(|member| {
            if !member.is_dirty() {
                return;
            }
            match member
                .with_plugin_ref::<SavePlugin, _>(SAVE_PLUGIN, |plugin| plugin.contribution(member))
            {
                Ok((id, content)) => contributions.push(Contribution {
                    id,
                    content,
                    member: Rc::downgrade(member),
                }),
                Err(e) => {
                    tracing::warn!(target: "save", member = member.id(), error = %e, "member_contribution_failed");
                }
            }
        });

        let mode = if options.multiple {
            DispatchMode::Multiple
        } else {
            DispatchMode::Batch
        };
        let cycle: ActiveCycle = Rc::new(RefCell::new(AggregateCycle::begin(
            mode,
            contributions.len(),
        )));
        *active.borrow_mut() = Some(Rc::clone(&cycle));

        let ctx = Rc::new(CycleContext {
            editor: Rc::downgrade(editor),
            members: contributions
                .iter()
                .map(|c| (c.id.clone(), c.member.clone()))
                .collect(),
            loading,
            active: Rc::clone(&active),
            show_response: options.show_response,
        });

        if contributions.is_empty() {
            // Nothing to send in either mode: settle immediately through
            // the normal success path.
            let outcome = cycle.borrow_mut().take_finalize();
            if let Some(outcome) = outcome {
                finalize(&ctx, outcome, Vec::new());
            }
            return Ok(());
        }

        match mode {
            DispatchMode::Multiple => {
                for c in &contributions {
                    let mut payload = Map::new();
                    payload.insert(c.id.clone(), Value::String(c.content.clone()));
                    let request = build_request(&options, payload, Some(c.id.clone()));
                    dispatch(&transport, &cycle, &ctx, request, vec![c.id.clone()]);
                }
            }
            DispatchMode::Batch => {
                let payload: Map<String, Value> = contributions
                    .iter()
                    .map(|c| (c.id.clone(), Value::String(c.content.clone())))
                    .collect();
                let ids: Vec<String> = contributions.iter().map(|c| c.id.clone()).collect();
                let request = build_request(&options, payload, None);
                dispatch(&transport, &cycle, &ctx, request, ids);
            }
        }
        Ok(())
    }
}

impl EditorPlugin for SavePlugin {
    fn init(&mut self, editor: &Rc<EditorInstance>, options: &Value) -> Result<(), EditorError> {
        self.editor = Rc::downgrade(editor);
        self.options = parse_options(SAVE_PLUGIN, options)?;
        Ok(())
    }
}

/// Assemble one request: the payload mapping serialized under `post_name`,
/// with the content id appended to the URL when configured.
fn build_request(
    options: &SaveOptions,
    payload: Map<String, Value>,
    content_id: Option<String>,
) -> SendRequest {
    let mut endpoint = options.endpoint.clone();
    if options.append_id
        && let Some(id) = content_id.as_deref()
    {
        endpoint.url = format!("{}{}", endpoint.url, id);
    }
    // The whole mapping travels JSON-serialized under one form field, the
    // way the server-side contract expects it.
    let mut body = Map::new();
    body.insert(
        options.post_name.clone(),
        Value::String(Value::Object(payload).to_string()),
    );
    SendRequest {
        endpoint,
        content_id,
        payload: Value::Object(body),
    }
}

fn dispatch(
    transport: &Rc<dyn Transport>,
    cycle: &ActiveCycle,
    ctx: &Rc<CycleContext>,
    request: SendRequest,
    ids: Vec<String>,
) {
    cycle.borrow_mut().record_request();
    tracing::debug!(
        target: "save",
        url = request.endpoint.url.as_str(),
        content_id = request.content_id.as_deref(),
        blocks = ids.len(),
        "request_dispatched"
    );

    let cycle = Rc::clone(cycle);
    let ctx = Rc::clone(ctx);
    let on_complete: CompletionFn = Box::new(move |outcome| {
        match outcome {
            RequestOutcome::Success { body } => {
                cycle.borrow_mut().complete_success(&ids);
                if ctx.show_response
                    && let Some(editor) = ctx.editor.upgrade()
                {
                    let set = ctx.editor.clone();
                    editor.show_confirm(
                        &body,
                        NoticeOptions::new()
                            .delay_ms(1000)
                            .on_hide(move || conclude_editing(&set)),
                    );
                }
            }
            RequestOutcome::Failure(failure) => {
                cycle.borrow_mut().complete_failure(&ids);
                tracing::warn!(target: "save", status = failure.status, "request_failed");
                if ctx.show_response
                    && let Some(editor) = ctx.editor.upgrade()
                {
                    editor.show_error(&failure.body, NoticeOptions::new());
                }
            }
        }

        let finalized = cycle.borrow_mut().take_finalize();
        if let Some(outcome) = finalized {
            let succeeded = cycle.borrow().succeeded_ids().to_vec();
            finalize(&ctx, outcome, succeeded);
        }
    });
    transport.send(request, on_complete);
}

/// One-time cycle teardown. Reached through `take_finalize`, so reentrant
/// completion callbacks cannot run it twice.
fn finalize(ctx: &Rc<CycleContext>, outcome: CycleOutcome, succeeded: Vec<String>) {
    // Succeeded members transition together, at finalize, not one by one as
    // their requests land.
    for (id, member) in &ctx.members {
        if succeeded.contains(id)
            && let Some(member) = member.upgrade()
        {
            member.set_saved();
        }
    }

    *ctx.active.borrow_mut() = None;
    ctx.loading.hide();

    let Some(editor) = ctx.editor.upgrade() else {
        return;
    };

    if ctx.show_response {
        // Responses were surfaced per request; the aggregate notice is
        // suppressed but loading teardown and saved-state transitions above
        // still ride this gate.
        return;
    }

    if outcome.is_success() {
        let set = ctx.editor.clone();
        editor.show_confirm(
            &outcome.message(),
            NoticeOptions::new()
                .delay_ms(1000)
                .on_hide(move || conclude_editing(&set)),
        );
    } else {
        editor.show_error(&outcome.message(), NoticeOptions::new());
    }
}

/// Post-success transition, applied uniformly across the unified set.
fn conclude_editing(origin: &Weak<EditorInstance>) {
    if let Some(editor) = origin.upgrade() {
        editor.unify(|member| {
            member.disable_editing();
            member.hide_toolbar();
        });
    }
}

/// Toolbar button: triggers the aggregate save.
pub struct SaveButton;

impl UiComponent for SaveButton {
    fn init(&mut self, editor: &Rc<EditorInstance>) -> Result<Rc<dyn UiControl>, EditorError> {
        let editor_weak = Rc::downgrade(editor);
        Ok(editor.ui_button("Save", Some("disk".to_string()), move || {
            if let Some(editor) = editor_weak.upgrade()
                && let Err(e) = SavePlugin::trigger(&editor)
            {
                tracing::warn!(target: "save", error = %e, "save_trigger_rejected");
            }
        }))
    }
}
