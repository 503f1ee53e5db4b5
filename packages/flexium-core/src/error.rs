//! Error taxonomy for the renderer.

/// Errors surfaced while mounting or reconciling a descriptor tree.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A reactive children slot saw the same explicit key twice in one
    /// update. The first occurrence wins; the rest fall back to a
    /// synthesized positional key, logged here rather than panicking since
    /// this is recoverable and deterministic.
    #[error("duplicate key {key:?} in reactive children slot; keeping the first occurrence")]
    DuplicateKey { key: String },
}
