//! Unification: one user action applied consistently across the set of
//! related editor instances.
//!
//! [`Editors`] is the explicit, injected instance set — the application
//! root creates one and adopts each instance into it; there is no ambient
//! global list. A plugin that needs set-wide behavior calls
//! `editor.unify(action)`, which lands here through the `Unifier` seam and
//! fans the action out synchronously over the resolved target set.
//!
//! The coordinator's job ends at dispatch: any asynchronous I/O an action
//! starts is per-member and is not serialized or awaited here. Member order
//! is adoption order, which keeps fan-out deterministic for a fixed set.
//! The member snapshot is taken before the first action call, so the walk
//! itself never observes instances added or removed mid-pass; callers must
//! still not mutate the set from inside an action.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use core_editor::{EditorInstance, Unifier};

/// Target-set discovery policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnifyScope {
    /// Every currently-enabled adopted instance (the default).
    #[default]
    AllEnabled,
    /// Enabled instances sharing the origin's configured group tag. An
    /// origin without a group unifies with itself alone.
    Group,
}

/// The adopted instance set. Holds weak references only — instances are
/// owned by the host and dead entries are pruned during each walk.
pub struct Editors {
    scope: UnifyScope,
    members: RefCell<Vec<Weak<EditorInstance>>>,
}

impl Editors {
    pub fn new(scope: UnifyScope) -> Rc<Self> {
        Rc::new(Self {
            scope,
            members: RefCell::new(Vec::new()),
        })
    }

    pub fn scope(&self) -> UnifyScope {
        self.scope
    }

    /// Register `instance` and attach this set as its unification
    /// coordinator.
    pub fn adopt(self: &Rc<Self>, instance: &Rc<EditorInstance>) {
        self.members.borrow_mut().push(Rc::downgrade(instance));
        instance.set_unifier(Rc::downgrade(self) as Weak<dyn Unifier>);
        tracing::debug!(target: "unify", id = instance.id(), members = self.members.borrow().len(), "adopted");
    }

    /// Live members in adoption order, with dead weak entries pruned.
    pub fn live_members(&self) -> Vec<Rc<EditorInstance>> {
        let mut members = self.members.borrow_mut();
        let mut live = Vec::with_capacity(members.len());
        members.retain(|weak| match weak.upgrade() {
            Some(instance) => {
                live.push(instance);
                true
            }
            None => false,
        });
        live
    }

    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    fn in_scope(&self, origin: &Rc<EditorInstance>, candidate: &Rc<EditorInstance>) -> bool {
        if !candidate.is_enabled() {
            return false;
        }
        match self.scope {
            UnifyScope::AllEnabled => true,
            UnifyScope::Group => match (origin.group(), candidate.group()) {
                (Some(origin_group), Some(candidate_group)) => origin_group == candidate_group,
                // Ungrouped origins unify with themselves alone.
                _ => Rc::ptr_eq(origin, candidate),
            },
        }
    }
}

impl Unifier for Editors {
    fn unify(&self, origin: &Rc<EditorInstance>, action: &mut dyn FnMut(&Rc<EditorInstance>)) {
        let targets: Vec<Rc<EditorInstance>> = self
            .live_members()
            .into_iter()
            .filter(|candidate| self.in_scope(origin, candidate))
            .collect();
        tracing::debug!(target: "unify", origin = origin.id(), targets = targets.len(), "fan_out");
        for member in &targets {
            action(member);
        }
    }
}
