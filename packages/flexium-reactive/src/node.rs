//! The arena types backing `Root`: reactive nodes (signals, computeds,
//! effects) and disposer scopes, each keyed through a `slotmap` so handles
//! stay valid (and detect use-after-dispose) without reference counting.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::panic::Location;

use smallvec::SmallVec;

slotmap::new_key_type! {
    /// Arena key for a signal, computed, or effect node.
    pub(crate) struct NodeId;
}

slotmap::new_key_type! {
    /// Arena key for a disposer scope.
    pub(crate) struct ScopeId;
}

/// Inline capacity for dependency/subscriber lists. Most nodes track a
/// handful of edges; this avoids a heap allocation for the common case.
pub(crate) type EdgeList = SmallVec<[NodeId; 4]>;

pub(crate) struct ReactiveNode {
    pub kind: NodeKind,
    pub value: Option<Box<dyn Any>>,
    /// Nodes that read this node during their last run and should be
    /// notified when it changes.
    pub subscribers: EdgeList,
    /// Nodes this node read during its last run. Rebuilt from scratch on
    /// every re-run so stale edges never linger.
    pub dependencies: EdgeList,
    /// Queued in `Root::pending` and not yet drained.
    pub scheduled: Cell<bool>,
    /// Currently executing; guards against an effect re-scheduling itself.
    pub running: Cell<bool>,
    pub created_at: &'static Location<'static>,
}

pub(crate) enum NodeKind {
    Signal,
    Computed(ComputedState),
    Effect(EffectState),
}

pub(crate) struct ComputedState {
    pub compute: RefCell<Box<dyn FnMut() -> Box<dyn Any>>>,
    pub eq: RefCell<Box<dyn FnMut(&dyn Any, &dyn Any) -> bool>>,
    /// Set whenever a dependency changes; cleared by `Root::ensure_fresh`.
    /// A computed never recomputes until something actually reads it.
    pub dirty: Cell<bool>,
}

pub(crate) struct EffectState {
    pub body: RefCell<Box<dyn FnMut() -> Option<Box<dyn FnOnce()>>>>,
    pub cleanup: RefCell<Option<Box<dyn FnOnce()>>>,
}

pub(crate) struct ScopeData {
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Registered via `on_cleanup`, plus one implicit disposer per effect
    /// and computed created while this scope was active. Run in reverse
    /// registration order when the scope is disposed.
    pub disposers: Vec<Box<dyn FnOnce()>>,
    pub alive: Cell<bool>,
}

impl ScopeData {
    pub fn new(parent: Option<ScopeId>) -> Self {
        ScopeData {
            parent,
            children: Vec::new(),
            disposers: Vec::new(),
            alive: Cell::new(true),
        }
    }
}
