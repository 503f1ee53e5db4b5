//! Effects: reactive nodes that run for their side effects rather than for a
//! cached return value.

use crate::node::{EffectState, NodeKind};
use crate::root::Root;

/// Runs `f` immediately, tracking every signal and computed it reads. Each
/// time one of those changes, `f` re-runs (on the next batch drain, or
/// synchronously at the end of the triggering write if no batch is open).
///
/// `f` may return a cleanup closure, which runs right before the next
/// re-run and when the owning scope is disposed, whichever comes first.
/// Dependencies are re-derived from scratch on every run, so an effect
/// naturally tracks the union of whatever branch it took last.
#[track_caller]
pub fn effect(f: impl FnMut() -> Option<Box<dyn FnOnce()>> + 'static) {
    let id = Root::with(|root| {
        let id = root.insert_node(
            NodeKind::Effect(EffectState {
                body: std::cell::RefCell::new(Box::new(f)),
                cleanup: std::cell::RefCell::new(None),
            }),
            None,
        );
        let scope = root.current_scope();
        root.on_cleanup(scope, move || {
            Root::with(|root| root.dispose_node(id));
        });
        id
    });
    // Initial run happens synchronously and outside any batch/drain, so a
    // panic here propagates straight to the caller rather than being
    // deferred and aggregated.
    Root::with(|root| {
        root.run_node_initial(id);
    });
}

/// Convenience wrapper for an effect with no cleanup.
#[track_caller]
pub fn effect_simple(mut f: impl FnMut() + 'static) {
    effect(move || {
        f();
        None
    });
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::root::{batch, create_root};
    use crate::signal::signal;

    use super::*;

    #[test]
    fn effect_runs_immediately() {
        let handle = create_root(|_| {
            let log = Rc::new(RefCell::new(Vec::new()));
            let a = signal(1);
            {
                let log = log.clone();
                effect_simple(move || log.borrow_mut().push(a.get()));
            }
            assert_eq!(*log.borrow(), vec![1]);
        });
        handle.dispose();
    }

    #[test]
    fn effect_reruns_on_dependency_change() {
        let handle = create_root(|_| {
            let log = Rc::new(RefCell::new(Vec::new()));
            let a = signal(1);
            {
                let log = log.clone();
                effect_simple(move || log.borrow_mut().push(a.get()));
            }
            a.set(2);
            a.set(3);
            assert_eq!(*log.borrow(), vec![1, 2, 3]);
        });
        handle.dispose();
    }

    #[test]
    fn effect_no_rerun_on_equal_write() {
        let handle = create_root(|_| {
            let runs = Rc::new(RefCell::new(0));
            let a = signal(1);
            {
                let runs = runs.clone();
                effect_simple(move || {
                    a.track();
                    *runs.borrow_mut() += 1;
                });
            }
            a.set(1);
            assert_eq!(*runs.borrow(), 1);
        });
        handle.dispose();
    }

    #[test]
    fn effect_runs_cleanup_before_rerun_and_on_dispose() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let handle = create_root(|_| {
            let a = signal(1);
            let log = log.clone();
            effect(move || {
                let value = a.get();
                let log = log.clone();
                log.borrow_mut().push(format!("run {value}"));
                Some(Box::new(move || log.borrow_mut().push(format!("cleanup {value}"))))
            });
            a.set(2);
        });
        handle.dispose();
        assert_eq!(
            *log.borrow(),
            vec!["run 1", "cleanup 1", "run 2", "cleanup 2"]
        );
    }

    #[test]
    fn effect_cannot_create_infinite_loop() {
        let handle = create_root(|_| {
            let runs = Rc::new(RefCell::new(0));
            let a = signal(0);
            {
                let runs = runs.clone();
                effect_simple(move || {
                    let v = a.get();
                    *runs.borrow_mut() += 1;
                    a.set_force(v);
                });
            }
            assert_eq!(*runs.borrow(), 1);
        });
        handle.dispose();
    }

    #[test]
    fn nested_effects_outer_runs_first() {
        let handle = create_root(|_| {
            let log = Rc::new(RefCell::new(Vec::new()));
            let a = signal(0);
            let b = signal(0);
            {
                let log = log.clone();
                effect_simple(move || {
                    a.track();
                    log.borrow_mut().push("outer");
                });
            }
            {
                let log = log.clone();
                effect_simple(move || {
                    b.track();
                    log.borrow_mut().push("inner");
                });
            }
            log.borrow_mut().clear();
            batch(|| {
                a.set(1);
                b.set(1);
            });
            assert_eq!(*log.borrow(), vec!["outer", "inner"]);
        });
        handle.dispose();
    }

    #[test]
    fn disposed_scope_stops_effect() {
        let runs = Rc::new(RefCell::new(0));
        let a = signal(0);
        let handle = {
            let runs = runs.clone();
            create_root(move |_| {
                effect_simple(move || {
                    a.track();
                    *runs.borrow_mut() += 1;
                })
            })
        };
        assert_eq!(*runs.borrow(), 1);
        handle.dispose();
        a.set(1);
        assert_eq!(*runs.borrow(), 1);
    }
}
