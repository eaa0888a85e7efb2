//! Aggregate action machinery: the per-cycle accounting value object and
//! the transport seam a fan-out plugin dispatches through.
//!
//! One user action (a Save click) fans out into N asynchronous network
//! operations whose completions arrive later, in arbitrary order, on the
//! same execution context. [`AggregateCycle`] owns the accounting for one
//! such cycle: counters start zeroed, every contributed payload must reach
//! a terminal outcome, and the finalize step is handed out exactly once —
//! [`AggregateCycle::take_finalize`] is called from every completion
//! callback and only the call that observes the cycle settled (and not yet
//! finalized) receives the outcome.
//!
//! The cycle is an explicit value object passed by reference into
//! completion callbacks rather than ambient plugin fields. Combined with
//! the in-flight rejection (`ActionError::CycleInFlight`, enforced by the
//! triggering plugin) this removes the cross-cycle counter corruption a
//! second trigger could otherwise cause mid-flight.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("an aggregate cycle is already in flight")]
    CycleInFlight,
    #[error("the editor behind this action is gone")]
    EditorGone,
}

/// How contributed payloads map onto requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// One request carrying the whole payload mapping; its outcome counts
    /// every contributor at once (all-or-nothing).
    #[default]
    Batch,
    /// One request per contributed payload; outcomes count individually,
    /// allowing partial success.
    Multiple,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Endpoint {
    pub url: String,
    #[serde(default = "Endpoint::default_method")]
    pub method: String,
}

impl Endpoint {
    fn default_method() -> String {
        "post".to_string()
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            url: "/".to_string(),
            method: Self::default_method(),
        }
    }
}

/// One outgoing request. `content_id` is set in multiple mode (the single
/// contributor the request carries); batch requests cover every contributor
/// and leave it empty.
#[derive(Debug, Clone)]
pub struct SendRequest {
    pub endpoint: Endpoint,
    pub content_id: Option<String>,
    pub payload: Value,
}

/// Transport-level failure. Expected runtime data, never an `Err` — it is
/// delivered through the failure branch of the per-request outcome, counted
/// into the aggregate, and surfaced via the notification collaborator.
#[derive(Debug, Clone)]
pub struct RequestFailure {
    pub status: Option<u16>,
    pub body: String,
}

#[derive(Debug, Clone)]
pub enum RequestOutcome {
    Success { body: String },
    Failure(RequestFailure),
}

pub type CompletionFn = Box<dyn FnOnce(RequestOutcome)>;

/// Opaque payload carrier: serialize, send, call back exactly once on the
/// same execution context. Implementations decide scheduling; the
/// coordinator never waits on them.
pub trait Transport {
    fn send(&self, request: SendRequest, on_complete: CompletionFn);
}

/// Terminal classification of one aggregate cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No member contributed anything; success with an empty set.
    Nothing,
    /// Every contributed payload reached the server.
    Saved { saved: usize },
    /// Some did, some did not.
    Partial { saved: usize, contributed: usize },
    /// None did.
    Failed { failed: usize },
}

impl CycleOutcome {
    /// User-facing aggregate message with counts.
    pub fn message(&self) -> String {
        match self {
            CycleOutcome::Nothing => "No content blocks required saving.".to_string(),
            CycleOutcome::Saved { saved } => {
                format!("Successfully saved {saved} content block(s).")
            }
            CycleOutcome::Partial { saved, contributed } => {
                format!("Saved {saved} out of {contributed} content blocks.")
            }
            CycleOutcome::Failed { failed } => {
                format!("Failed to save {failed} content block(s).")
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CycleOutcome::Nothing | CycleOutcome::Saved { .. })
    }
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Accounting for one aggregate cycle.
///
/// `contributed` is the denominator: the number of payloads collected from
/// dirty members. Completions add to `saved`/`failed` (batch outcomes add
/// the full denominator at once) and the cycle settles when
/// `contributed == saved + failed`.
#[derive(Debug)]
pub struct AggregateCycle {
    mode: DispatchMode,
    contributed: usize,
    requests: usize,
    saved: usize,
    failed: usize,
    succeeded_ids: Vec<String>,
    failed_ids: Vec<String>,
    finalized: bool,
}

impl AggregateCycle {
    /// Start a cycle with zeroed counters. Must not be created while a
    /// previous cycle for the same plugin instance is still in flight; the
    /// triggering plugin enforces that with [`ActionError::CycleInFlight`].
    pub fn begin(mode: DispatchMode, contributed: usize) -> Self {
        tracing::debug!(target: "action", ?mode, contributed, "cycle_begin");
        Self {
            mode,
            contributed,
            requests: 0,
            saved: 0,
            failed: 0,
            succeeded_ids: Vec::new(),
            failed_ids: Vec::new(),
            finalized: false,
        }
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub fn contributed(&self) -> usize {
        self.contributed
    }

    pub fn requests(&self) -> usize {
        self.requests
    }

    pub fn saved(&self) -> usize {
        self.saved
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn succeeded_ids(&self) -> &[String] {
        &self.succeeded_ids
    }

    pub fn failed_ids(&self) -> &[String] {
        &self.failed_ids
    }

    pub fn record_request(&mut self) {
        self.requests += 1;
    }

    /// Count a successful request. `ids` are the contributors the request
    /// carried: one in multiple mode, all of them in batch mode.
    pub fn complete_success(&mut self, ids: &[String]) {
        debug_assert!(
            self.saved + self.failed + ids.len() <= self.contributed,
            "completion exceeds contributed payload count"
        );
        self.saved += ids.len();
        self.succeeded_ids.extend(ids.iter().cloned());
        tracing::debug!(target: "action", saved = self.saved, failed = self.failed, contributed = self.contributed, "request_succeeded");
    }

    /// Count a failed request. Sibling requests keep flying; failure only
    /// adds to the tally.
    pub fn complete_failure(&mut self, ids: &[String]) {
        debug_assert!(
            self.saved + self.failed + ids.len() <= self.contributed,
            "completion exceeds contributed payload count"
        );
        self.failed += ids.len();
        self.failed_ids.extend(ids.iter().cloned());
        tracing::debug!(target: "action", saved = self.saved, failed = self.failed, contributed = self.contributed, "request_failed");
    }

    /// Every contributed payload has reached a terminal outcome.
    pub fn is_settled(&self) -> bool {
        self.contributed == self.saved + self.failed
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Hand out the finalize step. Invoked from every completion callback;
    /// returns `Some` exactly once — at the first call that observes the
    /// cycle settled — so one-time finalize work (hiding the loading
    /// indicator, the single aggregate notification) cannot run twice.
    pub fn take_finalize(&mut self) -> Option<CycleOutcome> {
        if self.finalized || !self.is_settled() {
            return None;
        }
        self.finalized = true;
        let outcome = if self.contributed == 0 {
            CycleOutcome::Nothing
        } else if self.failed == 0 {
            CycleOutcome::Saved { saved: self.saved }
        } else if self.saved == 0 {
            CycleOutcome::Failed {
                failed: self.failed,
            }
        } else {
            CycleOutcome::Partial {
                saved: self.saved,
                contributed: self.contributed,
            }
        };
        tracing::info!(target: "action", requests = self.requests, outcome = %outcome, "cycle_finalized");
        Some(outcome)
    }
}
