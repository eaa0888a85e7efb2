//! Process-wide definition catalogue.
//!
//! One `Registry<D>` holds the definitions of a single kind (plugin or UI
//! component) keyed by name. The application root populates its registries
//! during an initialization phase strictly ordered before any editor
//! instantiation; after that the catalogue is only read. Because the write
//! phase precedes all reads there is no interior locking here — the registry
//! is shared as an `Rc` injected into instance construction rather than
//! exposed as an ambient global.
//!
//! Registration and lookup failures are programmer errors: they surface
//! immediately as `RegistryError` values and are never retried.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

/// Which catalogue a name belongs to. Only used for error text and log
/// fields; the two kinds never share a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryKind {
    Plugin,
    Ui,
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryKind::Plugin => f.write_str("plugin"),
            RegistryKind::Ui => f.write_str("ui"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{kind} `{name}` is already registered")]
    Duplicate { kind: RegistryKind, name: String },
    #[error("no {kind} registered under `{name}`")]
    NotFound { kind: RegistryKind, name: String },
}

/// Name → definition catalogue for one `RegistryKind`.
///
/// Definitions are stored behind `Rc` so lookups hand out cheap shared
/// references; a definition is immutable once registered. `names()` reports
/// registration order, which downstream iteration relies on for
/// deterministic behavior.
pub struct Registry<D> {
    kind: RegistryKind,
    entries: HashMap<String, Rc<D>>,
    order: Vec<String>,
}

impl<D> Registry<D> {
    pub fn new(kind: RegistryKind) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn kind(&self) -> RegistryKind {
        self.kind
    }

    /// Register `definition` under `name`. Fails with
    /// [`RegistryError::Duplicate`] if the name is taken; use
    /// [`Registry::register_override`] when replacement is intended.
    pub fn register(&mut self, name: impl Into<String>, definition: D) -> Result<(), RegistryError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(RegistryError::Duplicate {
                kind: self.kind,
                name,
            });
        }
        tracing::debug!(target: "registry", kind = %self.kind, name = name.as_str(), "registered");
        self.order.push(name.clone());
        self.entries.insert(name, Rc::new(definition));
        Ok(())
    }

    /// Register `definition` under `name`, replacing any existing entry.
    /// Replacement keeps the original registration position.
    pub fn register_override(&mut self, name: impl Into<String>, definition: D) {
        let name = name.into();
        if self.entries.insert(name.clone(), Rc::new(definition)).is_none() {
            self.order.push(name.clone());
        } else {
            tracing::debug!(target: "registry", kind = %self.kind, name = name.as_str(), "overridden");
        }
    }

    pub fn lookup(&self, name: &str) -> Result<Rc<D>, RegistryError> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                kind: self.kind,
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<D> fmt::Debug for Registry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("kind", &self.kind)
            .field("names", &self.order)
            .finish()
    }
}
