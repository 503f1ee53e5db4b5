//! [`Host`] implementation backed by `web_sys::Node`.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use flexium_core::Host;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Comment, CssStyleDeclaration, Element, HtmlElement, Node, Text};

use crate::document;

#[wasm_bindgen]
extern "C" {
    /// Extends [`Node`] with a hidden id field, so two independently
    /// obtained `web_sys` handles to the same DOM node (e.g. one returned
    /// from `next_sibling`, one already held by the reconciler) hash and
    /// compare equal.
    #[wasm_bindgen(extends = Node)]
    type NodeWithId;
    #[wasm_bindgen(method, getter, js_name = "$$$nodeId")]
    fn node_id(this: &NodeWithId) -> Option<u32>;
    #[wasm_bindgen(method, setter, js_name = "$$$nodeId")]
    fn set_node_id(this: &NodeWithId, id: u32);

    /// `className` throws on an `SVGElement`, which instead needs the
    /// `class` attribute set directly.
    #[wasm_bindgen(extends = Element)]
    type ElementTrySetClassName;
    #[wasm_bindgen(method, catch, setter, js_name = "className")]
    fn try_set_class_name(this: &ElementTrySetClassName, value: &str) -> Result<(), JsValue>;
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
struct NodeId(u32);

impl NodeId {
    fn for_node(node: &Node) -> Self {
        thread_local!(static COUNTER: Cell<u32> = const { Cell::new(1) }); // 0 is the "unset" sentinel.

        if let Some(id) = node.unchecked_ref::<NodeWithId>().node_id() {
            return NodeId(id);
        }
        let id = COUNTER.with(|c| {
            let next = c.get();
            c.set(next + 1);
            next
        });
        node.unchecked_ref::<NodeWithId>().set_node_id(id);
        NodeId(id)
    }
}

type EventClosure = Closure<dyn FnMut(web_sys::Event)>;

thread_local! {
    /// Listeners are keyed off [`NodeId`] rather than stored inline on
    /// [`DomNode`], since a node's `add_event_listener`/`remove_event_listener`
    /// calls may arrive through different `DomNode` values that all refer to
    /// the same underlying `web_sys::Node`.
    static LISTENERS: RefCell<HashMap<NodeId, HashMap<Cow<'static, str>, EventClosure>>> =
        RefCell::new(HashMap::new());
}

/// A live DOM node. Cheap to clone (a `web_sys`/`wasm-bindgen` handle to the
/// same underlying JS object); compared and hashed by the id stashed on the
/// JS object itself, not by Rust-side pointer identity.
#[derive(Clone)]
pub struct DomNode {
    id: Cell<NodeId>,
    node: Node,
}

impl DomNode {
    /// Wraps an existing `web_sys::Node`, e.g. to mount over server-rendered
    /// markup or a node obtained from outside this crate.
    pub fn from_web_sys(node: Node) -> Self {
        DomNode { id: Default::default(), node }
    }

    /// Returns the underlying `web_sys::Node`.
    pub fn as_web_sys(&self) -> &Node {
        &self.node
    }

    fn node_id(&self) -> NodeId {
        if self.id.get() == NodeId::default() {
            self.id.set(NodeId::for_node(&self.node));
        }
        self.id.get()
    }
}

impl PartialEq for DomNode {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}
impl Eq for DomNode {}

impl Hash for DomNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node_id().hash(state);
    }
}

impl fmt::Debug for DomNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(el) = self.node.dyn_ref::<Element>() {
            write!(f, "DomNode({})", el.outer_html())
        } else if let Some(text) = self.node.dyn_ref::<Text>() {
            write!(f, "DomNode(text {:?})", text.text_content().unwrap_or_default())
        } else if let Some(comment) = self.node.dyn_ref::<Comment>() {
            write!(f, "DomNode(<!--{}-->)", comment.text_content().unwrap_or_default())
        } else {
            write!(f, "DomNode(?)")
        }
    }
}

impl Host for DomNode {
    type EventData = web_sys::Event;

    fn text_node(text: Cow<'static, str>) -> Self {
        DomNode::from_web_sys(document().create_text_node(&text).into())
    }

    fn marker() -> Self {
        DomNode::from_web_sys(document().create_comment("").into())
    }

    fn element(tag: Cow<'static, str>) -> Self {
        tracing::trace!(%tag, "creating element");
        let el = document().create_element(wasm_bindgen::intern(&tag)).expect_throw("create_element");
        DomNode::from_web_sys(el.into())
    }

    fn set_text(&self, text: Cow<'static, str>) {
        self.node.set_text_content(Some(&text));
    }

    fn set_attribute(&self, name: Cow<'static, str>, value: Cow<'static, str>) {
        self.node
            .unchecked_ref::<Element>()
            .set_attribute(wasm_bindgen::intern(&name), &value)
            .expect_throw("set_attribute");
    }

    fn remove_attribute(&self, name: Cow<'static, str>) {
        self.node.unchecked_ref::<Element>().remove_attribute(wasm_bindgen::intern(&name)).expect_throw("remove_attribute");
    }

    fn set_class_name(&self, value: Cow<'static, str>) {
        if self.node.unchecked_ref::<ElementTrySetClassName>().try_set_class_name(&value).is_err() {
            // `SVGElement.className` is read-only; fall back to the attribute.
            self.node.unchecked_ref::<Element>().set_attribute("class", &value).expect_throw("set class attribute");
        }
    }

    fn set_style_property(&self, name: Cow<'static, str>, value: Cow<'static, str>) {
        self.style().set_property(&name, &value).expect_throw("set_style_property");
    }

    fn remove_style_property(&self, name: Cow<'static, str>) {
        self.style().remove_property(&name).expect_throw("remove_style_property");
    }

    fn append_child(&self, child: &Self) {
        self.node.append_child(&child.node).expect_throw("append_child");
    }

    fn insert_child_before(&self, new_node: &Self, reference: Option<&Self>) {
        self.node
            .insert_before(&new_node.node, reference.map(|n| &n.node))
            .expect_throw("insert_child_before");
    }

    fn remove_child(&self, child: &Self) {
        self.node.remove_child(&child.node).expect_throw("remove_child");
    }

    fn replace_child(&self, old: &Self, new: &Self) {
        self.node.replace_child(&new.node, &old.node).expect_throw("replace_child");
    }

    fn parent_node(&self) -> Option<Self> {
        self.node.parent_node().map(DomNode::from_web_sys)
    }

    fn next_sibling(&self) -> Option<Self> {
        self.node.next_sibling().map(DomNode::from_web_sys)
    }

    fn add_event_listener(&self, name: Cow<'static, str>, mut handler: Box<dyn FnMut(Self::EventData)>) {
        tracing::trace!(%name, "adding event listener");
        let closure: EventClosure = Closure::wrap(Box::new(move |event: web_sys::Event| handler(event)));
        let node = self.node.clone();
        let node_id = self.node_id();
        LISTENERS.with(|listeners| {
            let mut listeners = listeners.borrow_mut();
            let per_node = listeners.entry(node_id).or_default();
            if let Some(old) = per_node.insert(name.clone(), closure) {
                let _ = node.remove_event_listener_with_callback(&name, old.as_ref().unchecked_ref());
            }
            let new = &per_node[&name];
            node.add_event_listener_with_callback(&name, new.as_ref().unchecked_ref()).expect_throw("add_event_listener");
        });
    }

    fn remove_event_listener(&self, name: Cow<'static, str>) {
        let node = self.node.clone();
        let node_id = self.node_id();
        LISTENERS.with(|listeners| {
            let mut listeners = listeners.borrow_mut();
            if let Some(per_node) = listeners.get_mut(&node_id) {
                if let Some(closure) = per_node.remove(name.as_ref()) {
                    let _ = node.remove_event_listener_with_callback(&name, closure.as_ref().unchecked_ref());
                }
                if per_node.is_empty() {
                    listeners.remove(&node_id);
                }
            }
        });
    }
}

impl DomNode {
    fn style(&self) -> CssStyleDeclaration {
        self.node.unchecked_ref::<HtmlElement>().style()
    }
}
