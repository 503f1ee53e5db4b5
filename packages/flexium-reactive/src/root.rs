//! The process-wide (thread-local) reactive graph: node arena, scope arena,
//! tracking context, and the FIFO update scheduler.
//!
//! Everything here is reachable only through a single `thread_local! static
//! ROOT: Root`. That is the Rust translation of "the reactive graph is a
//! single process-wide structure": there is exactly one `Root` per thread,
//! created lazily on first use, and handles (`NodeId`, `ScopeId`) are plain
//! `Copy` keys into it rather than `Rc`-counted pointers. Nothing here is
//! `Send`; a `Signal` created on one thread cannot be read from another.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};

use slotmap::SlotMap;

use crate::node::{NodeId, NodeKind, ReactiveNode, ScopeData, ScopeId};

thread_local! {
    static ROOT: Root = Root::new();
}

pub(crate) struct Root {
    pub(crate) nodes: RefCell<SlotMap<NodeId, ReactiveNode>>,
    pub(crate) scopes: RefCell<SlotMap<ScopeId, ScopeData>>,
    pub(crate) root_scope: ScopeId,
    pub(crate) current_scope: Cell<ScopeId>,
    /// The node currently being (re)computed, if any: what a signal read
    /// inside a computed/effect body subscribes to.
    pub(crate) current_tracking: Cell<Option<NodeId>>,
    /// Toggled off by `untrack`. Reads made while this is `false` do not
    /// create a dependency edge even if a node is currently tracking.
    pub(crate) tracking_enabled: Cell<bool>,
    /// > 0 while inside `batch()` (or the implicit one-write batch opened by
    /// a bare signal write): scheduled nodes accumulate in `pending` instead
    /// of draining immediately.
    pub(crate) batch_depth: Cell<u32>,
    pub(crate) pending: RefCell<VecDeque<NodeId>>,
    /// Re-entrancy guard for `drain_pending` itself (see its doc comment).
    draining: Cell<bool>,
    drain_errors: RefCell<Vec<String>>,
}

impl Root {
    fn new() -> Self {
        let mut scopes = SlotMap::with_key();
        let root_scope = scopes.insert(ScopeData::new(None));
        Root {
            nodes: RefCell::new(SlotMap::with_key()),
            scopes: RefCell::new(scopes),
            root_scope,
            current_scope: Cell::new(root_scope),
            current_tracking: Cell::new(None),
            tracking_enabled: Cell::new(true),
            batch_depth: Cell::new(0),
            pending: RefCell::new(VecDeque::new()),
            draining: Cell::new(false),
            drain_errors: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn with<R>(f: impl FnOnce(&Root) -> R) -> R {
        ROOT.with(f)
    }

    // --- scope plumbing ---------------------------------------------------

    pub(crate) fn current_scope(&self) -> ScopeId {
        self.current_scope.get()
    }

    pub(crate) fn scope_alive(&self, scope: ScopeId) -> bool {
        self.scopes
            .borrow()
            .get(scope)
            .map(|s| s.alive.get())
            .unwrap_or(false)
    }

    /// Creates a child of `parent` (or the current scope), runs `f` with it
    /// active, and returns `f`'s result alongside the new scope's id. The
    /// child is disposed automatically when `parent` is, unless disposed
    /// explicitly first.
    pub(crate) fn create_child_scope<R>(&self, f: impl FnOnce() -> R) -> (ScopeId, R) {
        let parent = self.current_scope.get();
        let child = self.scopes.borrow_mut().insert(ScopeData::new(Some(parent)));
        if let Some(parent_data) = self.scopes.borrow_mut().get_mut(parent) {
            parent_data.children.push(child);
        }
        let prev = self.current_scope.replace(child);
        let result = f();
        self.current_scope.set(prev);
        (child, result)
    }

    /// Registers a cleanup closure on `scope`, run (in reverse order versus
    /// sibling registrations) when that scope is disposed. Panics if the
    /// scope has already been disposed.
    pub(crate) fn on_cleanup(&self, scope: ScopeId, f: impl FnOnce() + 'static) {
        let mut scopes = self.scopes.borrow_mut();
        let data = scopes
            .get_mut(scope)
            .filter(|s| s.alive.get())
            .unwrap_or_else(|| panic!("{}", crate::error::ReactiveError::DisposedScope));
        data.disposers.push(Box::new(f));
    }

    /// Detaches `scope` from its parent, disposes its children depth-first
    /// (post-order), then runs its own disposers in reverse registration
    /// order. A no-op if the scope is already disposed.
    pub(crate) fn dispose_scope(&self, scope: ScopeId) {
        let alive = self
            .scopes
            .borrow()
            .get(scope)
            .map(|s| s.alive.get())
            .unwrap_or(false);
        if !alive {
            return;
        }
        // Detach from the parent so a later parent-dispose doesn't revisit us.
        let parent = self.scopes.borrow().get(scope).and_then(|s| s.parent);
        if let Some(parent) = parent {
            if let Some(parent_data) = self.scopes.borrow_mut().get_mut(parent) {
                parent_data.children.retain(|&c| c != scope);
            }
        }
        self.dispose_scope_inner(scope);
    }

    fn dispose_scope_inner(&self, scope: ScopeId) {
        self.scopes
            .borrow()
            .get(scope)
            .map(|s| s.alive.set(false));
        let children = self
            .scopes
            .borrow_mut()
            .get_mut(scope)
            .map(|s| std::mem::take(&mut s.children))
            .unwrap_or_default();
        for child in children {
            self.dispose_scope_inner(child);
        }
        let disposers = self
            .scopes
            .borrow_mut()
            .get_mut(scope)
            .map(|s| std::mem::take(&mut s.disposers))
            .unwrap_or_default();
        for disposer in disposers.into_iter().rev() {
            self.untrack_run(disposer);
        }
        self.scopes.borrow_mut().remove(scope);
    }

    fn untrack_run(&self, f: impl FnOnce()) {
        let prev = self.tracking_enabled.replace(false);
        f();
        self.tracking_enabled.set(prev);
    }

    // --- node plumbing -----------------------------------------------------

    #[track_caller]
    pub(crate) fn insert_node(&self, kind: NodeKind, value: Option<Box<dyn std::any::Any>>) -> NodeId {
        self.nodes.borrow_mut().insert(ReactiveNode {
            kind,
            value,
            subscribers: Default::default(),
            dependencies: Default::default(),
            scheduled: Cell::new(false),
            running: Cell::new(false),
            created_at: std::panic::Location::caller(),
        })
    }

    pub(crate) fn node_exists(&self, id: NodeId) -> bool {
        self.nodes.borrow().contains_key(id)
    }

    /// Called from within a signal/computed read: if tracking is active,
    /// links `id` as a dependency of the current reader (deduplicated).
    pub(crate) fn track_read(&self, id: NodeId) {
        if !self.tracking_enabled.get() {
            return;
        }
        let Some(reader) = self.current_tracking.get() else {
            return;
        };
        if reader == id {
            return;
        }
        let mut nodes = self.nodes.borrow_mut();
        if let Some(reader_node) = nodes.get_mut(reader) {
            if !reader_node.dependencies.contains(&id) {
                reader_node.dependencies.push(id);
            }
        }
        if let Some(dep_node) = nodes.get_mut(id) {
            if !dep_node.subscribers.contains(&reader) {
                dep_node.subscribers.push(reader);
            }
        }
    }

    /// Disposes a single effect/computed node: unsubscribes it from every
    /// dependency, drops its stored closures, and removes it from the arena.
    /// Signals are never disposed this way; they have no implicit lifetime.
    pub(crate) fn dispose_node(&self, id: NodeId) {
        let Some(node) = self.nodes.borrow_mut().remove(id) else {
            return;
        };
        for dep in node.dependencies {
            if let Some(dep_node) = self.nodes.borrow_mut().get_mut(dep) {
                dep_node.subscribers.retain(|&s| s != id);
            }
        }
        if let NodeKind::Effect(effect) = node.kind {
            if let Some(cleanup) = effect.cleanup.into_inner() {
                self.untrack_run(cleanup);
            }
        }
    }

    // --- signal write / propagation ----------------------------------------

    /// Schedules every current subscriber of `id` to re-run. Opens an
    /// implicit one-write batch if no batch is already open, so all direct
    /// subscribers are enqueued together before any of them run.
    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn propagate(&self, id: NodeId) {
        let was_outermost = self.batch_depth.get() == 0;
        if was_outermost {
            self.batch_depth.set(1);
        }
        self.schedule_subscribers_of(id);
        if was_outermost {
            self.batch_depth.set(0);
            self.drain_pending();
        }
    }

    fn schedule_subscribers_of(&self, id: NodeId) {
        let subs: EdgeListVec = self
            .nodes
            .borrow()
            .get(id)
            .map(|n| n.subscribers.iter().copied().collect())
            .unwrap_or_default();
        for s in subs {
            self.schedule(s);
        }
    }

    fn schedule(&self, id: NodeId) {
        let nodes = self.nodes.borrow();
        let Some(node) = nodes.get(id) else { return };
        if node.running.get() || node.scheduled.get() {
            return;
        }
        node.scheduled.set(true);
        if let NodeKind::Computed(c) = &node.kind {
            c.dirty.set(true);
        }
        drop(nodes);
        self.pending.borrow_mut().push_back(id);
    }

    /// Runs `batch_depth` > 0 for the duration of `f`, then drains once it
    /// drops back to 0.
    pub(crate) fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        self.batch_depth.set(self.batch_depth.get() + 1);
        let result = f();
        let depth = self.batch_depth.get() - 1;
        self.batch_depth.set(depth);
        if depth == 0 {
            self.drain_pending();
        }
        result
    }

    pub(crate) fn untrack<R>(&self, f: impl FnOnce() -> R) -> R {
        let prev = self.tracking_enabled.replace(false);
        let result = f();
        self.tracking_enabled.set(prev);
        result
    }

    /// Drains `pending` in FIFO order until empty. Re-entrant calls (an
    /// effect body opening its own `batch()`) are no-ops: the active,
    /// outermost call already owns the loop and will keep popping whatever
    /// the nested batch pushed.
    fn drain_pending(&self) {
        if self.draining.get() {
            return;
        }
        self.draining.set(true);
        while let Some(id) = self.pending.borrow_mut().pop_front() {
            if let Some(node) = self.nodes.borrow().get(id) {
                node.scheduled.set(false);
            } else {
                continue;
            }
            self.run_scheduled(id);
        }
        self.draining.set(false);
        let errors = self.drain_errors.take();
        if !errors.is_empty() {
            panic!("{}", crate::error::ReactiveError::EffectsPanicked(errors));
        }
    }

    /// Runs one node popped from the queue, catching panics so the rest of
    /// the drain still completes. Propagates to that node's own subscribers
    /// if it changed.
    fn run_scheduled(&self, id: NodeId) {
        if !self.node_exists(id) {
            return;
        }
        if let Some(node) = self.nodes.borrow().get(id) {
            node.running.set(true);
        }
        let changed = match catch_unwind(AssertUnwindSafe(|| self.run_node_body(id))) {
            Ok(changed) => changed,
            Err(payload) => {
                self.drain_errors.borrow_mut().push(panic_message(payload));
                false
            }
        };
        if let Some(node) = self.nodes.borrow().get(id) {
            node.running.set(false);
        }
        if changed {
            self.schedule_subscribers_of(id);
        }
    }

    /// Runs a freshly-created effect's body for the very first time. Sets
    /// `running` for the duration (so a write inside the body that would
    /// reschedule this same effect is suppressed, same as any other
    /// re-entrant run) but does not catch panics: this happens synchronously
    /// at the `effect()` call site, outside any batch drain, so a panic
    /// should propagate straight to the caller instead of being deferred.
    pub(crate) fn run_node_initial(&self, id: NodeId) {
        if let Some(node) = self.nodes.borrow().get(id) {
            node.running.set(true);
        }
        self.run_node_body(id);
        if let Some(node) = self.nodes.borrow().get(id) {
            node.running.set(false);
        }
    }

    fn run_node_body(&self, id: NodeId) -> bool {
        let is_effect = matches!(
            self.nodes.borrow().get(id).map(|n| &n.kind),
            Some(NodeKind::Effect(_))
        );
        if is_effect {
            self.run_effect_body(id);
            true
        } else {
            self.recompute_now(id)
        }
    }

    fn run_effect_body(&self, id: NodeId) {
        let prior_cleanup = {
            let nodes = self.nodes.borrow();
            match &nodes.get(id).expect("effect node disposed mid-run").kind {
                NodeKind::Effect(e) => e.cleanup.borrow_mut().take(),
                _ => unreachable!(),
            }
        };
        if let Some(cleanup) = prior_cleanup {
            self.untrack_run(cleanup);
        }
        self.unsubscribe_dependencies(id);

        // Swap the closure out of the arena for the duration of the call so
        // the body is free to read/write other nodes (including scheduling
        // itself through `track_read`) without a re-entrant `RefCell`
        // borrow on this node's own storage.
        let mut body_fn = {
            let nodes = self.nodes.borrow();
            let NodeKind::Effect(e) = &nodes[id].kind else { unreachable!() };
            std::mem::replace(&mut *e.body.borrow_mut(), Box::new(|| None))
        };
        let prev_tracking = self.current_tracking.replace(Some(id));
        let body_result = body_fn();
        self.current_tracking.set(prev_tracking);

        let nodes = self.nodes.borrow();
        let NodeKind::Effect(e) = &nodes[id].kind else { unreachable!() };
        *e.body.borrow_mut() = body_fn;
        *e.cleanup.borrow_mut() = body_result;
    }

    fn unsubscribe_dependencies(&self, id: NodeId) {
        let old_deps: EdgeListVec = self
            .nodes
            .borrow_mut()
            .get_mut(id)
            .map(|n| std::mem::take(&mut n.dependencies).into_iter().collect())
            .unwrap_or_default();
        for dep in old_deps {
            if let Some(dep_node) = self.nodes.borrow_mut().get_mut(dep) {
                dep_node.subscribers.retain(|&s| s != id);
            }
        }
    }

    /// Recomputes a computed node's cached value now. Returns whether the
    /// new value differs from the old one (per its `eq`), i.e. whether
    /// subscribers should be notified.
    fn recompute_now(&self, id: NodeId) -> bool {
        self.unsubscribe_dependencies(id);
        if let NodeKind::Computed(c) = &self.nodes.borrow()[id].kind {
            c.dirty.set(false);
        }

        let mut compute_fn = {
            let nodes = self.nodes.borrow();
            let NodeKind::Computed(c) = &nodes[id].kind else { unreachable!() };
            std::mem::replace(&mut *c.compute.borrow_mut(), Box::new(|| unreachable!("swapped-out compute slot called")))
        };
        let prev_tracking = self.current_tracking.replace(Some(id));
        let new_value = compute_fn();
        self.current_tracking.set(prev_tracking);
        {
            let nodes = self.nodes.borrow();
            let NodeKind::Computed(c) = &nodes[id].kind else { unreachable!() };
            *c.compute.borrow_mut() = compute_fn;
        }

        let mut nodes = self.nodes.borrow_mut();
        let node = nodes.get_mut(id).expect("computed node disposed mid-run");
        let changed = match &node.value {
            Some(old) => {
                let NodeKind::Computed(c) = &node.kind else { unreachable!() };
                let mut eq = c.eq.borrow_mut();
                !(eq)(old.as_ref(), new_value.as_ref())
            }
            None => true,
        };
        node.value = Some(new_value);
        changed
    }

    /// Ensures a computed's cached value reflects its current dependencies
    /// before it is read. Called from the read path, so it must not hang a
    /// panic: if we're already inside a drain, defer to that drain's error
    /// collection; otherwise this is a synchronous user read and a panic
    /// should propagate directly to the caller.
    pub(crate) fn ensure_fresh(&self, id: NodeId) {
        let dirty = matches!(
            self.nodes.borrow().get(id).map(|n| &n.kind),
            Some(NodeKind::Computed(c)) if c.dirty.get()
        );
        if !dirty {
            return;
        }
        if self.nodes.borrow()[id].running.get() {
            panic!("{}", crate::error::ReactiveError::CyclicDependency);
        }
        if self.draining.get() {
            if let Some(node) = self.nodes.borrow().get(id) {
                node.running.set(true);
            }
            match catch_unwind(AssertUnwindSafe(|| self.recompute_now(id))) {
                Ok(changed) => {
                    if let Some(node) = self.nodes.borrow().get(id) {
                        node.running.set(false);
                    }
                    if changed {
                        self.schedule_subscribers_of(id);
                    }
                }
                Err(payload) => {
                    if let Some(node) = self.nodes.borrow().get(id) {
                        node.running.set(false);
                    }
                    self.drain_errors.borrow_mut().push(panic_message(payload));
                }
            }
        } else {
            if let Some(node) = self.nodes.borrow().get(id) {
                node.running.set(true);
            }
            let changed = self.recompute_now(id);
            if let Some(node) = self.nodes.borrow().get(id) {
                node.running.set(false);
            }
            if changed {
                // Not inside a drain: route through `propagate` so the
                // freshly-dirtied subscribers actually get drained rather
                // than sitting in the queue with nothing left to pop them.
                self.propagate(id);
            }
        }
    }
}

type EdgeListVec = Vec<NodeId>;

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "effect panicked with a non-string payload".to_string()
    }
}

/// Creates a new root-level scope, runs `f` with it passed in, and returns a
/// handle that disposes the whole subtree.
pub fn create_root(f: impl FnOnce(crate::scope::Scope)) -> crate::scope::RootHandle {
    let (id, ()) = Root::with(|root| {
        root.create_child_scope(|| {
            let child = crate::scope::Scope { id: root.current_scope() };
            f(child);
        })
    });
    crate::scope::RootHandle { scope: crate::scope::Scope { id } }
}

/// Registers `f` to run when the current scope is disposed, in reverse
/// order versus sibling registrations (LIFO).
pub fn on_cleanup(f: impl FnOnce() + 'static) {
    Root::with(|root| {
        let scope = root.current_scope();
        root.on_cleanup(scope, f);
    });
}

/// Batches every signal write made inside `f` so dependents update once,
/// after `f` returns, instead of after each individual write.
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    Root::with(|root| root.batch(f))
}

/// Runs `f` with dependency tracking suspended: reads made inside `f` do not
/// subscribe the enclosing effect or computed.
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
    Root::with(|root| root.untrack(f))
}
