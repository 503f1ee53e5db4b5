//! Computeds (memoized derived values) and the selector helpers built on top
//! of the equality-gated update path.

use crate::node::{ComputedState, NodeKind};
use crate::root::Root;
use crate::signal::ReadSignal;

/// Creates a lazily-evaluated, cached derived value.
///
/// Nothing runs at creation time: the first call is deferred to whichever
/// read (direct, or through a dependent effect) happens first. From then
/// on, a change to any of `f`'s dependencies marks the computed dirty; it
/// recomputes on the next read, and only notifies its own subscribers if
/// the new value differs from the old one by `eq`.
///
/// This is the general form; [`create_memo`] and [`create_selector`] are
/// the two `eq` choices used almost everywhere in practice.
#[track_caller]
pub fn create_selector_with<T: 'static>(
    mut f: impl FnMut() -> T + 'static,
    mut eq: impl FnMut(&T, &T) -> bool + 'static,
) -> ReadSignal<T> {
    let id = Root::with(|root| {
        root.insert_node(
            NodeKind::Computed(ComputedState {
                compute: std::cell::RefCell::new(Box::new(move || Box::new(f()))),
                eq: std::cell::RefCell::new(Box::new(move |a, b| {
                    let a = a.downcast_ref::<T>().expect("computed type mismatch");
                    let b = b.downcast_ref::<T>().expect("computed type mismatch");
                    eq(a, b)
                })),
                dirty: std::cell::Cell::new(true),
            }),
            None,
        )
    });
    ReadSignal::from_id(id)
}

/// A computed that always notifies its subscribers on recompute, whatever
/// the new value is. Use this when `T` has no meaningful equality, or when
/// downstream consumers must re-run on every upstream change regardless of
/// value (e.g. driving a side effect keyed only on "something happened").
#[track_caller]
pub fn create_memo<T: 'static>(f: impl FnMut() -> T + 'static) -> ReadSignal<T> {
    create_selector_with(f, |_, _| false)
}

/// A computed that notifies its subscribers only when the new value differs
/// from the old one by `PartialEq`. This is the right default for most
/// derived state: it prevents a long dependent chain from redoing work
/// when an upstream computed's value happens not to change.
#[track_caller]
pub fn create_selector<T: PartialEq + 'static>(f: impl FnMut() -> T + 'static) -> ReadSignal<T> {
    create_selector_with(f, |a, b| a == b)
}

/// Creates a derived, cached value from `f`. The named entry point at the
/// public API boundary: memoizes the last value and propagates to
/// dependents only when a recompute's result differs from the cached one
/// by `PartialEq`, the same suppression [`create_selector`] gives.
#[track_caller]
pub fn computed<T: PartialEq + 'static>(mut f: impl FnMut() -> T + 'static) -> ReadSignal<T> {
    create_selector_with(move || f(), |a, b| a == b)
}

/// A computed driven by repeated application of a reducer, in the spirit of
/// a fold over a stream of actions: `value = reduce(value, action)`,
/// starting from `init`. Returns the current value alongside a dispatcher
/// that applies one action and schedules dependents if the value changed.
pub fn create_reducer<T, A>(
    init: T,
    mut reduce: impl FnMut(&T, A) -> T + 'static,
) -> (ReadSignal<T>, impl Fn(A))
where
    T: PartialEq + Clone + 'static,
    A: 'static,
{
    let state = crate::signal::signal(init);
    let dispatch = move |action: A| {
        let current = state.get_untracked();
        let next = reduce(&current, action);
        state.set(next);
    };
    (state.read_only(), dispatch)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::effect::effect_simple;
    use crate::root::create_root;
    use crate::signal::signal;

    use super::*;

    #[test]
    fn computed_is_lazy_until_first_read() {
        let handle = create_root(|_| {
            let runs = Rc::new(RefCell::new(0));
            let a = signal(1);
            let runs_clone = runs.clone();
            let doubled = create_memo(move || {
                *runs_clone.borrow_mut() += 1;
                a.get() * 2
            });
            assert_eq!(*runs.borrow(), 0);
            assert_eq!(doubled.get(), 2);
            assert_eq!(*runs.borrow(), 1);
        });
        handle.dispose();
    }

    #[test]
    fn selector_suppresses_propagation_on_equal_output() {
        let handle = create_root(|_| {
            let downstream_runs = Rc::new(RefCell::new(0));
            let a = signal(1);
            let parity = create_selector(move || a.get() % 2);
            {
                let downstream_runs = downstream_runs.clone();
                effect_simple(move || {
                    let _ = parity.get();
                    *downstream_runs.borrow_mut() += 1;
                });
            }
            assert_eq!(*downstream_runs.borrow(), 1);
            a.set(3); // still odd: parity unchanged
            assert_eq!(*downstream_runs.borrow(), 1);
            a.set(4); // now even: parity changes
            assert_eq!(*downstream_runs.borrow(), 2);
        });
        handle.dispose();
    }

    #[test]
    fn computed_suppresses_propagation_on_equal_output() {
        let handle = create_root(|_| {
            let downstream_runs = Rc::new(RefCell::new(0));
            let a = signal(1);
            let parity = computed(move || a.get() % 2);
            {
                let downstream_runs = downstream_runs.clone();
                effect_simple(move || {
                    let _ = parity.get();
                    *downstream_runs.borrow_mut() += 1;
                });
            }
            assert_eq!(*downstream_runs.borrow(), 1);
            a.set(3); // still odd: parity unchanged
            assert_eq!(*downstream_runs.borrow(), 1);
            a.set(4); // now even: parity changes
            assert_eq!(*downstream_runs.borrow(), 2);
        });
        handle.dispose();
    }

    #[test]
    fn diamond_dependency_recomputes_once() {
        let handle = create_root(|_| {
            let runs = Rc::new(RefCell::new(0));
            let a = signal(1);
            let left = create_memo(move || a.get() + 1);
            let right = create_memo(move || a.get() + 2);
            let runs_clone = runs.clone();
            effect_simple(move || {
                *runs_clone.borrow_mut() += 1;
                let _ = (left.get(), right.get());
            });
            assert_eq!(*runs.borrow(), 1);
            a.set(2);
            assert_eq!(*runs.borrow(), 2);
        });
        handle.dispose();
    }

    #[test]
    fn reducer_dispatch_updates_value() {
        let handle = create_root(|_| {
            let (count, dispatch) = create_reducer(0, |current, delta: i32| current + delta);
            dispatch(1);
            dispatch(5);
            assert_eq!(count.get(), 6);
        });
        handle.dispose();
    }
}
