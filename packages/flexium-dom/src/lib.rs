//! Browser `Host` implementation: the one concrete rendering backend this
//! workspace ships, mounting a `flexium-core` descriptor tree onto a real
//! `web_sys::Node`.
//!
//! `flexium-core::render` is already generic over `Host` and works directly
//! with [`DomNode`]; this crate adds the `window()`/`document()` lookups and
//! a `mount_to_body` convenience for the common case of owning the whole
//! page, the same role `sycamore-web`'s top-level `render`/`document`
//! functions play for its own `DomNode`.

mod dom_node;

pub use dom_node::DomNode;

use flexium_core::{render, FNode};
use flexium_reactive::RootHandle;
use wasm_bindgen::UnwrapThrowExt;

/// The global `Window` object.
pub fn window() -> web_sys::Window {
    web_sys::window().expect_throw("no global `window` exists")
}

/// The global `Document` object, cached per-thread to avoid repeated
/// `window().document()` round-trips.
pub fn document() -> web_sys::Document {
    thread_local! {
        static DOCUMENT: web_sys::Document = window().document().expect_throw("no `document` exists");
    }
    DOCUMENT.with(Clone::clone)
}

/// Mounts `descriptor` as a child of `<body>`. A thin convenience over
/// `flexium_core::render` for the common top-level case; returns the
/// [`RootHandle`] like `render` itself does, rather than leaking it, since
/// whether an app ever needs to unmount is the caller's call to make.
pub fn mount_to_body(descriptor: FNode<DomNode>) -> RootHandle {
    let body = document().body().expect_throw("document has no <body>");
    render(descriptor, &DomNode::from_web_sys(body.into()))
}
