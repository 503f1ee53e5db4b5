//! Abstraction over a rendering backend.

use std::borrow::Cow;
use std::fmt::Debug;
use std::hash::Hash;

/// A narrow interface over a DOM-like tree. `flexium-dom`'s `DomHost` is the
/// one concrete implementation this workspace ships; `test_host::TestNode`
/// is a second, headless one used by this crate's own test suite and
/// available to any downstream crate that wants to drive the renderer
/// without a browser.
///
/// Nodes should be cheaply `Clone`-able (typically a reference-counted
/// handle into the backend's real tree) and compare by reference identity.
pub trait Host: Debug + Clone + PartialEq + Eq + Hash + 'static {
    /// The type handed to an event listener registered via
    /// [`Host::add_event_listener`].
    type EventData;

    /// Creates a text node holding `text`.
    fn text_node(text: Cow<'static, str>) -> Self;

    /// Creates a zero-width marker (anchor) node: a comment node on the DOM
    /// backend. Used as the insertion point for a reactive position and as
    /// the tail anchor of a reactive children slot.
    fn marker() -> Self;

    /// Creates an element node for the given tag name.
    fn element(tag: Cow<'static, str>) -> Self;

    /// Overwrites a text node's content. Only meaningful for nodes created
    /// via [`Host::text_node`].
    fn set_text(&self, text: Cow<'static, str>);

    /// Sets an attribute, overwriting any previous value.
    fn set_attribute(&self, name: Cow<'static, str>, value: Cow<'static, str>);

    /// Removes an attribute if present.
    fn remove_attribute(&self, name: Cow<'static, str>);

    /// Sets a boolean attribute: present with no value if `true`, absent if
    /// `false`.
    fn set_bool_attribute(&self, name: Cow<'static, str>, value: bool) {
        if value {
            self.set_attribute(name, Cow::Borrowed(""));
        } else {
            self.remove_attribute(name);
        }
    }

    /// Overwrites the element's `class` attribute wholesale.
    fn set_class_name(&self, value: Cow<'static, str>);

    /// Sets one inline style property (already kebab-cased and unit-suffixed
    /// by the caller, see `render::style`).
    fn set_style_property(&self, name: Cow<'static, str>, value: Cow<'static, str>);

    /// Removes one inline style property.
    fn remove_style_property(&self, name: Cow<'static, str>);

    /// Appends `child` as the last child of `self`.
    fn append_child(&self, child: &Self);

    /// Inserts `new_node` before `reference`, or appends it if `reference`
    /// is `None`.
    fn insert_child_before(&self, new_node: &Self, reference: Option<&Self>);

    /// Removes `child` from `self`'s children.
    fn remove_child(&self, child: &Self);

    /// Replaces `old` with `new` in `self`'s children.
    fn replace_child(&self, old: &Self, new: &Self);

    /// Returns the parent node, if attached.
    fn parent_node(&self) -> Option<Self>;

    /// Returns the next sibling, if any.
    fn next_sibling(&self) -> Option<Self>;

    /// Registers an event listener. A later call with the same `name`
    /// replaces the previous one (used when a reactive handler prop
    /// changes).
    fn add_event_listener(&self, name: Cow<'static, str>, handler: Box<dyn FnMut(Self::EventData)>);

    /// Removes the listener registered for `name`, if any.
    fn remove_event_listener(&self, name: Cow<'static, str>);
}
