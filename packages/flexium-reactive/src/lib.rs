//! Fine-grained reactive primitives: signals, computed values, effects, and
//! the disposer-scope tree that owns them.
//!
//! Everything here lives behind a single thread-local graph (see [`root`]).
//! A [`Signal`] is a cheap `Copy` handle into that graph rather than a
//! reference-counted pointer, so it can be freely copied into closures and
//! stored on structs without lifetime bookkeeping.

mod effect;
mod error;
mod memo;
mod node;
mod root;
mod scope;
mod signal;

pub use effect::{effect, effect_simple};
pub use error::ReactiveError;
pub use memo::{computed, create_memo, create_reducer, create_selector, create_selector_with};
pub use root::{batch, create_root, on_cleanup, untrack};
pub use scope::{RootHandle, Scope};
pub use signal::{signal, ReadSignal, Signal};

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn counter_scenario() {
        let handle = create_root(|_| {
            let n = signal(0);
            let last = Rc::new(RefCell::new(-1));
            let runs = Rc::new(RefCell::new(0));
            {
                let last = last.clone();
                let runs = runs.clone();
                effect_simple(move || {
                    *runs.borrow_mut() += 1;
                    *last.borrow_mut() = n.get();
                });
            }
            batch(|| {
                n.set(1);
                n.set(2);
                n.set(3);
            });
            assert_eq!(*runs.borrow(), 2, "initial run plus exactly one rerun for the batch");
            assert_eq!(*last.borrow(), 3);
        });
        handle.dispose();
    }

    #[test]
    fn diamond_scenario() {
        let handle = create_root(|_| {
            let seen = Rc::new(RefCell::new(Vec::new()));
            let a = signal(1);
            let b = computed(move || a.get() + 1);
            let c = computed(move || a.get() * 10);
            let d = computed(move || b.get() + c.get());
            {
                let seen = seen.clone();
                effect_simple(move || seen.borrow_mut().push(d.get()));
            }
            a.set(2);
            assert_eq!(*seen.borrow(), vec![12, 22]);
        });
        handle.dispose();
    }

    #[test]
    fn untracked_write_in_effect_scenario() {
        let handle = create_root(|_| {
            let a = signal(0);
            let b = signal(0);
            let runs = Rc::new(RefCell::new(0));
            {
                let runs = runs.clone();
                effect_simple(move || {
                    *runs.borrow_mut() += 1;
                    let x = a.get();
                    untrack(|| b.set(x + 1));
                });
            }
            a.set(5);
            assert_eq!(*runs.borrow(), 2);
            assert_eq!(b.get_untracked(), 6);
        });
        handle.dispose();
    }

    #[test]
    fn disposed_scope_isolation_scenario() {
        let sink_calls = Rc::new(RefCell::new(0));
        let s = signal(1);
        {
            let sink_calls = sink_calls.clone();
            let handle = create_root(move |_| {
                effect_simple(move || {
                    s.track();
                    *sink_calls.borrow_mut() += 1;
                });
            });
            handle.dispose();
        }
        assert_eq!(*sink_calls.borrow(), 1);
        s.set(2);
        assert_eq!(*sink_calls.borrow(), 1);
    }

    #[test]
    fn untrack_isolation_p9() {
        let handle = create_root(|_| {
            let a = signal(1);
            let runs = Rc::new(RefCell::new(0));
            {
                let runs = runs.clone();
                effect_simple(move || {
                    *runs.borrow_mut() += 1;
                    untrack(|| {
                        a.track();
                    });
                });
            }
            a.set(2);
            assert_eq!(*runs.borrow(), 1, "untracked read must not subscribe");
        });
        handle.dispose();
    }

    #[test]
    fn no_stale_dependency_p3() {
        let handle = create_root(|_| {
            let cond = signal(true);
            let a = signal(1);
            let b = signal(2);
            let runs = Rc::new(RefCell::new(0));
            {
                let runs = runs.clone();
                effect_simple(move || {
                    *runs.borrow_mut() += 1;
                    if cond.get() {
                        a.track();
                    } else {
                        b.track();
                    }
                });
            }
            assert_eq!(*runs.borrow(), 1);
            cond.set(false); // now depends on `b`, not `a`
            assert_eq!(*runs.borrow(), 2);
            a.set(100); // no longer a dependency
            assert_eq!(*runs.borrow(), 2);
            b.set(200);
            assert_eq!(*runs.borrow(), 3);
        });
        handle.dispose();
    }
}
