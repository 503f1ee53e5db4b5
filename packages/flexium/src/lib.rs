//! Fine-grained reactive UI, direct to the DOM.
//!
//! This crate is a thin facade: it re-exports `flexium-reactive` (signals,
//! computed values, effects, scopes), `flexium-core` (element descriptors and
//! the generic mount/reconciliation algorithm) and, behind the default `dom`
//! feature, `flexium-dom`'s browser `Host`, so an application depends on one
//! crate instead of three.
//!
//! ```
//! use flexium::prelude::*;
//!
//! let count = signal(0);
//! let doubled = computed(move || count.get() * 2);
//! count.set(21);
//! assert_eq!(doubled.get(), 42);
//! ```

#![warn(missing_debug_implementations)]

/// Reactive primitives: signals, computed values, effects, scopes.
///
/// Re-export of [`flexium_reactive`].
pub mod reactive {
    pub use flexium_reactive::*;
}

/// Element descriptors and the generic mount/reconciliation algorithm.
///
/// Re-export of [`flexium_core`].
pub mod core {
    pub use flexium_core::*;
}

/// The browser rendering backend.
///
/// Re-export of [`flexium_dom`]. Enabled by the default `dom` feature.
#[cfg(feature = "dom")]
pub mod dom {
    pub use flexium_dom::*;
}

#[cfg(feature = "dom")]
pub use flexium_dom::DomNode as Host;
#[cfg(not(feature = "dom"))]
pub use flexium_core::test_host::TestNode as Host;

pub use flexium_core::{
    create_node_ref, dyn_child, dyn_child_into, f, indexed, jsx, jsxs, keyed, render, AttrSource, AttrValue,
    ChildSpec, FNode, Fragment, IntoChildSpec, NodeRef, NodeType, PropValue, StyleSource,
};
pub use flexium_reactive::{
    batch, computed, create_root, effect, on_cleanup, signal, untrack, ReadSignal, RootHandle, Scope, Signal,
};

#[cfg(feature = "dom")]
pub use flexium_dom::{document, mount_to_body, window};

/// Glob-importable surface for application code, mirroring `sycamore`'s own
/// `prelude` module.
pub mod prelude {
    pub use crate::{
        batch, computed, create_node_ref, create_root, dyn_child, dyn_child_into, effect, f, indexed, jsx, jsxs,
        keyed, on_cleanup, render, signal, untrack, AttrSource, AttrValue, ChildSpec, FNode, Fragment, IntoChildSpec,
        NodeRef, NodeType, PropValue, ReadSignal, RootHandle, Scope, Signal, StyleSource,
    };
    #[cfg(feature = "dom")]
    pub use crate::{document, mount_to_body, window};
}
