//! Error taxonomy for the reactive graph.
//!
//! `ProgrammerError`-class mistakes (write to a disposed signal, register on a
//! disposed scope, ...) panic synchronously at the call site rather than
//! returning a `Result`. Rust has no exceptions, and every call site in this
//! crate that can hit one of these is already `#[track_caller]` so the panic
//! message points at user code, not at our internals. `ReactiveError` exists
//! for the one case that genuinely needs to be an inspectable value: the
//! aggregated report of panics caught from a batch drain (`UserCodeError`).

use std::panic::Location;

/// Errors surfaced by the reactive graph.
#[derive(Debug, thiserror::Error)]
pub enum ReactiveError {
    /// A signal, computed, or effect was accessed after its owning scope (or
    /// itself) was disposed.
    #[error("signal accessed after it was disposed (created at {created_at})")]
    DisposedSignal {
        /// Source location where the signal was created, for diagnostics.
        created_at: &'static Location<'static>,
    },

    /// `on_cleanup`, `signal`, `computed`, or `effect` was called with no
    /// active scope, or with a scope that has already been disposed.
    #[error("attempted to register on a disposed scope")]
    DisposedScope,

    /// A computed's dependency graph recursed back into itself while it was
    /// still being evaluated.
    #[error("cyclic reactive dependency detected")]
    CyclicDependency,

    /// One or more effects (or computed recomputations) panicked during a
    /// single batch drain. Each entry is that panic's message. The drain
    /// still ran every other scheduled effect before this error is raised.
    #[error("{} effect(s) panicked during update propagation: {}", .0.len(), .0.join("; "))]
    EffectsPanicked(Vec<String>),
}
