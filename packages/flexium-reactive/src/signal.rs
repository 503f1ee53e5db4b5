//! Signals: the leaf state cells of the reactive graph.

use std::marker::PhantomData;
use std::panic::Location;

use crate::error::ReactiveError;
use crate::node::{NodeId, NodeKind};
use crate::root::Root;

/// A read-only view of a signal or computed value.
///
/// `ReadSignal<T>` is a plain `Copy` handle: cheap to pass into closures,
/// store in a struct, or clone into a list of children. It carries no
/// lifetime: the value it points to lives in the thread-local graph for as
/// long as the signal itself is not disposed (signals are never implicitly
/// disposed; see [`Signal`]).
pub struct ReadSignal<T> {
    pub(crate) id: NodeId,
    created_at: &'static Location<'static>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for ReadSignal<T> {}

impl<T: 'static> ReadSignal<T> {
    #[track_caller]
    pub(crate) fn from_id(id: NodeId) -> Self {
        ReadSignal { id, created_at: Location::caller(), _marker: PhantomData }
    }

    /// Reads the current value, cloning it out, and subscribes the
    /// currently-running effect or computed (if any) to future changes.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(Clone::clone)
    }

    /// Reads the current value without cloning, via a closure. Still tracks.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        Root::with(|root| {
            root.ensure_fresh(self.id);
            let nodes = root.nodes.borrow();
            let node = nodes.get(self.id).unwrap_or_else(|| self.panic_disposed());
            let value = node
                .value
                .as_ref()
                .expect("reactive node read before first write")
                .downcast_ref::<T>()
                .expect("signal type mismatch");
            f(value)
        })
    }

    /// Reads the current value without creating a dependency edge, even if
    /// called from inside a running effect or computed.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        Root::with(|root| root.untrack(|| self.get()))
    }

    /// Subscribes the currently-running effect or computed to this signal,
    /// without reading its value.
    pub fn track(&self) {
        Root::with(|root| {
            if !root.node_exists(self.id) {
                self.panic_disposed();
            }
            root.track_read(self.id);
        });
    }

    fn panic_disposed(&self) -> ! {
        panic!("{}", ReactiveError::DisposedSignal { created_at: self.created_at });
    }
}

/// A writable signal: a mutable cell in the reactive graph.
///
/// Writing a value that compares equal (`PartialEq`) to the current one is a
/// no-op: no dependents are scheduled, and no downstream recomputation
/// happens.
pub struct Signal<T> {
    read: ReadSignal<T>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Signal<T> {}

impl<T: 'static> Signal<T> {
    /// Downgrades to a read-only handle, safe to hand to consumers that
    /// should only observe, not mutate, this signal.
    pub fn read_only(&self) -> ReadSignal<T> {
        self.read
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.read.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.read.with(f)
    }

    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.read.get_untracked()
    }

    pub fn track(&self) {
        self.read.track()
    }

    /// Replaces the value. No-op (no scheduling, no recomputation) if
    /// `value` compares equal to the current one.
    pub fn set(&self, value: T)
    where
        T: PartialEq,
    {
        self.update_inner(value, true);
    }

    /// Replaces the value unconditionally, even if it compares equal to the
    /// current one, and always schedules dependents.
    pub fn set_force(&self, value: T) {
        self.update_inner(value, false);
    }

    /// Updates the value in place via `f`, then schedules dependents exactly
    /// like [`Signal::set`] (including the equality short-circuit, when `T:
    /// PartialEq`).
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R
    where
        T: PartialEq + Clone,
    {
        let mut current = self.get_untracked();
        let result = f(&mut current);
        self.set(current);
        result
    }

    fn update_inner(&self, value: T, check_eq: bool)
    where
        T: PartialEq,
    {
        Root::with(|root| {
            let changed = {
                let mut nodes = root.nodes.borrow_mut();
                let node = nodes
                    .get_mut(self.read.id)
                    .unwrap_or_else(|| self.read.panic_disposed());
                let changed = if check_eq {
                    match &node.value {
                        Some(old) => old.downcast_ref::<T>().expect("signal type mismatch") != &value,
                        None => true,
                    }
                } else {
                    true
                };
                node.value = Some(Box::new(value));
                changed
            };
            if changed {
                root.propagate(self.read.id);
            }
        });
    }
}

/// Creates a new signal holding `init`.
#[track_caller]
pub fn signal<T: 'static>(init: T) -> Signal<T> {
    let id = Root::with(|root| root.insert_node(NodeKind::Signal, Some(Box::new(init))));
    Signal { read: ReadSignal::from_id(id) }
}
