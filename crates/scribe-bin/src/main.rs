//! Demo wiring for the coordination core: build the registry, adopt a few
//! editable regions into one unified set, edit some of them, click Save
//! once, and pump a simulated transport so the aggregate cycle plays out
//! end to end. Everything observable lands in `scribe.log`.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Once;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use serde_json::json;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use core_action::{CompletionFn, RequestFailure, RequestOutcome, SendRequest, Transport};
use core_config::Preset;
use core_editor::{
    EditableRegion, EditorInstance, EditorRegistry, InstanceConfig, LogNotifier, Notifier,
};
use core_plugin::register_builtins;
use core_unify::{Editors, UnifyScope};

#[derive(Parser, Debug)]
#[command(name = "scribe", about = "Coordination-core demo: unified save across editable regions")]
struct Args {
    /// Configuration file (defaults to scribe.toml discovery).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of editable regions to create.
    #[arg(long, default_value_t = 3)]
    instances: usize,
    /// Simulate failures for the first N requests.
    #[arg(long, default_value_t = 0)]
    fail: usize,
    /// Batch mode: one request for the whole payload mapping.
    #[arg(long)]
    batch: bool,
    /// Unify by configured group tag instead of the whole page.
    #[arg(long)]
    group_scope: bool,
}

/// Transport simulation: parks requests at dispatch time, then `pump`
/// replays them with staggered latency on the same single-threaded runtime,
/// failing the first `fail` completions when requested.
struct SimTransport {
    queue: RefCell<VecDeque<(SendRequest, CompletionFn)>>,
    fail_remaining: Cell<usize>,
}

impl SimTransport {
    fn new(fail: usize) -> Rc<Self> {
        Rc::new(Self {
            queue: RefCell::new(VecDeque::new()),
            fail_remaining: Cell::new(fail),
        })
    }

    async fn pump(&self) {
        let mut served: u64 = 0;
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some((request, on_complete)) = next else {
                break;
            };
            tokio::time::sleep(Duration::from_millis(15 + served * 5)).await;

            let fail_remaining = self.fail_remaining.get();
            let outcome = if fail_remaining > 0 {
                self.fail_remaining.set(fail_remaining - 1);
                RequestOutcome::Failure(RequestFailure {
                    status: Some(500),
                    body: "simulated server error".to_string(),
                })
            } else {
                RequestOutcome::Success {
                    body: format!("stored {}", request.content_id.as_deref().unwrap_or("batch")),
                }
            };
            info!(
                target: "transport",
                url = request.endpoint.url.as_str(),
                content_id = request.content_id.as_deref(),
                ok = matches!(outcome, RequestOutcome::Success { .. }),
                "request_completed"
            );
            on_complete(outcome);
            served += 1;
        }
    }
}

impl Transport for SimTransport {
    fn send(&self, request: SendRequest, on_complete: CompletionFn) {
        info!(
            target: "transport",
            url = request.endpoint.url.as_str(),
            content_id = request.content_id.as_deref(),
            "request_queued"
        );
        self.queue.borrow_mut().push_back((request, on_complete));
    }
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("scribe.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "scribe.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        Err(_err) => {
            // Global tracing subscriber already installed; drop guard so writer shuts down.
            None
        }
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn resolve_preset(config: &core_config::Config) -> Preset {
    match config.file.editor.preset.as_deref() {
        None | Some("base") => Preset::base(),
        Some(other) => {
            tracing::warn!(target: "runtime", preset = other, "unknown_preset_using_base");
            Preset::base()
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = core_config::load_from(args.config.clone())?;
    let preset = resolve_preset(&config);

    let transport = SimTransport::new(args.fail);
    let mut registry = EditorRegistry::new();
    register_builtins(&mut registry, transport.clone())?;
    let registry = Rc::new(registry);

    let scope = if args.group_scope {
        UnifyScope::Group
    } else {
        UnifyScope::AllEnabled
    };
    let editors = Editors::new(scope);
    let notifier: Rc<dyn Notifier> = Rc::new(LogNotifier);

    let count = args.instances.max(1);
    let mut instances = Vec::with_capacity(count);
    for i in 0..count {
        let region = EditableRegion::new(format!("region-{i}"));
        region.set_content(format!("<p>Region {i} original copy</p>"));
        let mut instance_config = InstanceConfig::from_config(preset.clone(), &config);
        if !args.batch {
            instance_config = instance_config.with_override("save", json!({ "multiple": true }));
        }
        let editor = EditorInstance::new(
            region,
            instance_config,
            Rc::clone(&registry),
            Rc::clone(&notifier),
        );
        editors.adopt(&editor);
        editor.enable()?;
        instances.push(editor);
    }
    info!(target: "runtime", instances = count, batch = args.batch, "workspace_ready");

    // Edit every region but the last so one member stays clean and drops
    // out of the save denominator.
    let edit_count = if count > 1 { count - 1 } else { 1 };
    for editor in instances.iter().take(edit_count) {
        editor.update_content(format!("<h1>Edited {}</h1><p></p>", editor.name()));
    }

    // One Save click on the first region's toolbar coordinates the whole set.
    let origin = &instances[0];
    if let Some(save_button) = origin.ui_control("save") {
        save_button.activate();
    }

    transport.pump().await;

    for editor in &instances {
        info!(
            target: "runtime",
            region = editor.name(),
            dirty = editor.is_dirty(),
            enabled = editor.is_enabled(),
            toolbar_hidden = editor.is_toolbar_hidden(),
            "final_state"
        );
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", ?args, "startup");
    run(args).await
}
