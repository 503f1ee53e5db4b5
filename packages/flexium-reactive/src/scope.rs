//! Public handle onto a disposer scope, and the root-level handle returned
//! by [`crate::root::create_root`].

use crate::node::ScopeId;
use crate::root::Root;

/// A disposable handle for a subtree of the reactive graph.
///
/// Disposing a `Scope` recursively disposes its children (depth-first,
/// post-order) and then runs its own cleanups, in reverse registration
/// order (LIFO). Disposing is idempotent: disposing an already-disposed
/// scope is a no-op.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Scope {
    pub(crate) id: ScopeId,
}

impl Scope {
    pub(crate) fn current() -> Scope {
        Root::with(|root| Scope { id: root.current_scope() })
    }

    /// Whether this scope is still alive (has not been disposed, and no
    /// ancestor has been disposed).
    pub fn is_alive(&self) -> bool {
        Root::with(|root| root.scope_alive(self.id))
    }

    /// Creates a child of this scope, runs `f` with the child active and
    /// passed in, and returns the child's id. This is what the renderer
    /// calls to open a fresh scope per reactive child-list record.
    pub fn child(&self, f: impl FnOnce(Scope)) -> Scope {
        let prev = Root::with(|root| root.current_scope.replace(self.id));
        let (id, ()) = Root::with(|root| {
            root.create_child_scope(|| {
                let child = Scope { id: root.current_scope() };
                f(child);
            })
        });
        Root::with(|root| root.current_scope.set(prev));
        Scope { id }
    }

    /// Registers `f` to run when this scope is disposed (LIFO versus
    /// sibling registrations). Panics if the scope is already disposed.
    pub fn on_dispose(&self, f: impl FnOnce() + 'static) {
        Root::with(|root| root.on_cleanup(self.id, f));
    }

    /// Disposes this scope now.
    pub fn dispose(self) {
        Root::with(|root| root.dispose_scope(self.id));
    }
}

/// Returned by [`crate::root::create_root`]; tears down the whole subtree
/// created inside it.
pub struct RootHandle {
    pub(crate) scope: Scope,
}

impl RootHandle {
    /// Disposes the root scope, running every cleanup registered anywhere
    /// in the subtree (children depth-first, then this scope's own, LIFO).
    pub fn dispose(self) {
        self.scope.dispose();
    }

    /// The scope this handle owns, for passing to APIs that want a `Scope`
    /// directly (e.g. mounting a renderer root under it).
    pub fn scope(&self) -> Scope {
        self.scope
    }
}
