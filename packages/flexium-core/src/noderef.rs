//! References to mounted nodes.

use std::fmt;

use flexium_reactive::{signal, Signal};

use crate::host::Host;

/// A handle set by the renderer to the host node it mounts at a `ref` prop.
/// Reading it before that mount has happened panics; read it from an effect,
/// an event handler, or an `on_dispose` callback instead.
pub struct NodeRef<H: Host>(Signal<Option<H>>);

impl<H: Host> NodeRef<H> {
    pub fn new() -> Self {
        NodeRef(signal(None))
    }

    /// Returns the mounted node.
    ///
    /// # Panics
    /// Panics if the node has not been mounted yet.
    #[track_caller]
    pub fn get(&self) -> H {
        self.try_get().expect("NodeRef accessed before its node was mounted")
    }

    pub fn try_get(&self) -> Option<H> {
        self.0.get()
    }

    pub fn set(&self, node: H) {
        self.0.set(Some(node));
    }
}

impl<H: Host> Default for NodeRef<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> Clone for NodeRef<H> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<H: Host> Copy for NodeRef<H> {}

impl<H: Host> fmt::Debug for NodeRef<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.try_get()).finish()
    }
}

/// Creates a new, unset [`NodeRef`].
pub fn create_node_ref<H: Host>() -> NodeRef<H> {
    NodeRef::new()
}
