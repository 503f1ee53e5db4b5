//! A headless, in-memory [`Host`] implementation, so this crate (and any
//! downstream crate) can drive the renderer and assert on its output
//! without a browser.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use crate::host::Host;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Text,
    Marker,
    Element,
}

struct Inner {
    kind: Kind,
    tag: String,
    text: String,
    attrs: BTreeMap<String, String>,
    class_name: String,
    style: BTreeMap<String, String>,
    children: Vec<TestNode>,
    parent: Option<Weak<RefCell<Inner>>>,
    listeners: BTreeMap<String, Box<dyn FnMut(())>>,
}

/// A node in an in-memory tree, cloned cheaply (an `Rc`) and compared by
/// reference identity, exactly as [`Host`] requires.
#[derive(Clone)]
pub struct TestNode(Rc<RefCell<Inner>>);

impl TestNode {
    fn new(kind: Kind, tag: String, text: String) -> Self {
        TestNode(Rc::new(RefCell::new(Inner {
            kind,
            tag,
            text,
            attrs: BTreeMap::new(),
            class_name: String::new(),
            style: BTreeMap::new(),
            children: Vec::new(),
            parent: None,
            listeners: BTreeMap::new(),
        })))
    }

    /// The tag name, for an element node.
    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    /// The text content, for a text node.
    pub fn text_content(&self) -> String {
        self.0.borrow().text.clone()
    }

    /// Current attribute value, if set.
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attrs.get(name).cloned()
    }

    /// Current `class` attribute text.
    pub fn class_name(&self) -> String {
        self.0.borrow().class_name.clone()
    }

    /// Current value of one inline style property, if set.
    pub fn style_property(&self, name: &str) -> Option<String> {
        self.0.borrow().style.get(name).cloned()
    }

    /// Live children, in document order.
    pub fn children(&self) -> Vec<TestNode> {
        self.0.borrow().children.clone()
    }

    /// Child count, recursing one level.
    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    /// Renders this subtree's text content, concatenated in document
    /// order, ignoring markers and attributes. Handy for asserting on
    /// rendered output without walking the tree by hand.
    pub fn rendered_text(&self) -> String {
        let inner = self.0.borrow();
        match inner.kind {
            Kind::Text => inner.text.clone(),
            Kind::Marker => String::new(),
            Kind::Element => inner.children.iter().map(|c| c.rendered_text()).collect(),
        }
    }

    /// Invokes the listener registered for `name`, if any, simulating an
    /// event dispatch.
    pub fn fire_event(&self, name: &str) {
        if let Some(listener) = self.0.borrow_mut().listeners.get_mut(name) {
            listener(());
        }
    }

    fn index_in_parent(&self) -> Option<(TestNode, usize)> {
        let parent = self.parent_node()?;
        let index = parent.0.borrow().children.iter().position(|c| Rc::ptr_eq(&c.0, &self.0))?;
        Some((parent, index))
    }
}

impl Host for TestNode {
    type EventData = ();

    fn text_node(text: std::borrow::Cow<'static, str>) -> Self {
        TestNode::new(Kind::Text, String::new(), text.into_owned())
    }

    fn marker() -> Self {
        TestNode::new(Kind::Marker, String::new(), String::new())
    }

    fn element(tag: std::borrow::Cow<'static, str>) -> Self {
        TestNode::new(Kind::Element, tag.into_owned(), String::new())
    }

    fn set_text(&self, text: std::borrow::Cow<'static, str>) {
        self.0.borrow_mut().text = text.into_owned();
    }

    fn set_attribute(&self, name: std::borrow::Cow<'static, str>, value: std::borrow::Cow<'static, str>) {
        self.0.borrow_mut().attrs.insert(name.into_owned(), value.into_owned());
    }

    fn remove_attribute(&self, name: std::borrow::Cow<'static, str>) {
        self.0.borrow_mut().attrs.remove(name.as_ref());
    }

    fn set_class_name(&self, value: std::borrow::Cow<'static, str>) {
        self.0.borrow_mut().class_name = value.into_owned();
    }

    fn set_style_property(&self, name: std::borrow::Cow<'static, str>, value: std::borrow::Cow<'static, str>) {
        self.0.borrow_mut().style.insert(name.into_owned(), value.into_owned());
    }

    fn remove_style_property(&self, name: std::borrow::Cow<'static, str>) {
        self.0.borrow_mut().style.remove(name.as_ref());
    }

    fn append_child(&self, child: &Self) {
        self.insert_child_before(child, None);
    }

    fn insert_child_before(&self, new_node: &Self, reference: Option<&Self>) {
        // Mirror real `insertBefore`: moving an already-attached node
        // detaches it from wherever it currently lives first.
        if let Some(old_parent) = new_node.parent_node() {
            old_parent.0.borrow_mut().children.retain(|c| !Rc::ptr_eq(&c.0, &new_node.0));
        }
        new_node.0.borrow_mut().parent = Some(Rc::downgrade(&self.0));
        let mut inner = self.0.borrow_mut();
        let index = match reference {
            Some(r) => inner.children.iter().position(|c| Rc::ptr_eq(&c.0, &r.0)).unwrap_or(inner.children.len()),
            None => inner.children.len(),
        };
        inner.children.insert(index, new_node.clone());
    }

    fn remove_child(&self, child: &Self) {
        let mut inner = self.0.borrow_mut();
        inner.children.retain(|c| !Rc::ptr_eq(&c.0, &child.0));
        child.0.borrow_mut().parent = None;
    }

    fn replace_child(&self, old: &Self, new: &Self) {
        let mut inner = self.0.borrow_mut();
        if let Some(index) = inner.children.iter().position(|c| Rc::ptr_eq(&c.0, &old.0)) {
            inner.children[index] = new.clone();
            new.0.borrow_mut().parent = Some(Rc::downgrade(&self.0));
            old.0.borrow_mut().parent = None;
        }
    }

    fn parent_node(&self) -> Option<Self> {
        let weak = self.0.borrow().parent.clone()?;
        weak.upgrade().map(TestNode)
    }

    fn next_sibling(&self) -> Option<Self> {
        let (parent, index) = self.index_in_parent()?;
        parent.0.borrow().children.get(index + 1).cloned()
    }

    fn add_event_listener(&self, name: std::borrow::Cow<'static, str>, handler: Box<dyn FnMut(Self::EventData)>) {
        self.0.borrow_mut().listeners.insert(name.into_owned(), handler);
    }

    fn remove_event_listener(&self, name: std::borrow::Cow<'static, str>) {
        self.0.borrow_mut().listeners.remove(name.as_ref());
    }
}

impl PartialEq for TestNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for TestNode {}

impl Hash for TestNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for TestNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        match inner.kind {
            Kind::Text => write!(f, "Text({:?})", inner.text),
            Kind::Marker => write!(f, "Marker"),
            Kind::Element => write!(f, "<{}>", inner.tag),
        }
    }
}
