//! Element descriptors: immutable value objects describing an intended
//! element, and the `f`/`jsx`/`jsxs` factories that build them.
//!
//! Components are not part of this model. As with `sycamore-core`'s own
//! `View`/`ViewType`, a component is just a plain Rust function returning an
//! [`FNode`]; it "disappears" before ever reaching the descriptor tree, and
//! is invoked directly by user code (once per mount, satisfying P6) rather
//! than through `f`.

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;

use flexium_reactive::{ReadSignal, Signal};

use crate::host::Host;
use crate::noderef::NodeRef;

/// What kind of node a descriptor produces.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// A host element, e.g. `"div"`.
    Tag(Cow<'static, str>),
    /// Render children in place with no wrapping element.
    Fragment,
}

/// A leaf attribute/style/property value.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Str(Cow<'static, str>),
    Bool(bool),
    Number(f64),
    Null,
}

impl From<&'static str> for AttrValue {
    fn from(v: &'static str) -> Self {
        AttrValue::Str(Cow::Borrowed(v))
    }
}
impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(Cow::Owned(v))
    }
}
impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

macro_rules! impl_attr_value_number {
    ($($t:ty),*) => {
        $(impl From<$t> for AttrValue {
            fn from(v: $t) -> Self {
                AttrValue::Number(v as f64)
            }
        })*
    };
}
impl_attr_value_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// An attribute's source: set once, or re-applied every time a dependency
/// changes.
pub enum AttrSource {
    Static(AttrValue),
    Reactive(RefCell<Box<dyn FnMut() -> AttrValue>>),
}

/// Inline style declarations.
pub enum StyleSource {
    /// A plain CSS string, assigned directly to the `style` attribute.
    Text(Cow<'static, str>),
    /// camelCase property/value pairs, set individually. Property-name
    /// casing and unit suffixing (numeric values get `px` except for the
    /// fixed unitless set) is resolved by the renderer, not here.
    Static(Vec<(Cow<'static, str>, AttrValue)>),
    Reactive(RefCell<Box<dyn FnMut() -> Vec<(Cow<'static, str>, AttrValue)>>>),
}

/// One named prop on a descriptor.
pub enum PropValue<H: Host> {
    Attr(AttrSource),
    Class(Cow<'static, str>),
    Style(StyleSource),
    Event(RefCell<Box<dyn FnMut(H::EventData)>>),
    Ref(NodeRef<H>),
}

/// A child position. Arrays are not flattened eagerly into their own variant; a
/// `List` literal is flattened at mount, and a `List` produced by a
/// [`ChildSpec::Dynamic`] closure is the trigger for keyed reconciliation
/// (see `reconcile`).
pub enum ChildSpec<H: Host> {
    /// Renders as nothing (`null`/`undefined`/`false`/`true` children).
    Empty,
    Text(Cow<'static, str>),
    Node(FNode<H>),
    List(Vec<ChildSpec<H>>),
    Dynamic(RefCell<Box<dyn FnMut() -> ChildSpec<H>>>),
}

/// An immutable descriptor of an intended element. Never mutated once built;
/// the renderer only ever reads it.
pub struct FNode<H: Host> {
    pub(crate) ty: NodeType,
    pub(crate) props: Vec<(Cow<'static, str>, PropValue<H>)>,
    pub(crate) children: Vec<ChildSpec<H>>,
    pub(crate) key: Option<Cow<'static, str>>,
}

/// Builds a descriptor. If `props` contains an entry named `"key"` holding
/// a static `AttrValue`, it is extracted into `FNode::key` (coerced to a
/// string, since a key is a string or number per the descriptor's data
/// model) and removed from `props`.
pub fn f<H: Host>(
    ty: NodeType,
    mut props: Vec<(Cow<'static, str>, PropValue<H>)>,
    children: Vec<ChildSpec<H>>,
) -> FNode<H> {
    let mut key = None;
    if let Some(pos) = props.iter().position(|(name, _)| name == "key") {
        if let (_, PropValue::Attr(AttrSource::Static(value))) = &props[pos] {
            key = match value {
                AttrValue::Str(s) => Some(s.clone()),
                AttrValue::Number(n) => Some(Cow::Owned(crate::render::format_number(*n))),
                AttrValue::Bool(b) => Some(Cow::Owned(b.to_string())),
                AttrValue::Null => None,
            };
        }
        props.remove(pos);
    }
    FNode { ty, props, children, key }
}

/// Transpiler-facing alias: a single child.
pub fn jsx<H: Host>(
    ty: NodeType,
    props: Vec<(Cow<'static, str>, PropValue<H>)>,
    child: ChildSpec<H>,
) -> FNode<H> {
    f(ty, props, vec![child])
}

/// Transpiler-facing alias: a `Vec` of children.
pub fn jsxs<H: Host>(
    ty: NodeType,
    props: Vec<(Cow<'static, str>, PropValue<H>)>,
    children: Vec<ChildSpec<H>>,
) -> FNode<H> {
    f(ty, props, children)
}

impl<H: Host> FNode<H> {
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Overrides the descriptor's key, as `keyed` does to attach a
    /// caller-supplied key function's result without going through `f`'s
    /// `props.key` extraction.
    pub fn set_key(&mut self, key: Cow<'static, str>) {
        self.key = Some(key);
    }
}

/// Converts a value into a [`ChildSpec`]. Implemented directly (not via a
/// blanket `Display` impl) for a handful of primitive shapes, so that
/// booleans render as nothing rather than as `"true"`/`"false"` text.
/// `null`/`undefined`/`false`/`true` children are preserved as a
/// [`ChildSpec`] here and filtered out at render time.
pub trait IntoChildSpec<H: Host> {
    fn into_child_spec(self) -> ChildSpec<H>;
}

impl<H: Host> IntoChildSpec<H> for ChildSpec<H> {
    fn into_child_spec(self) -> ChildSpec<H> {
        self
    }
}

impl<H: Host> IntoChildSpec<H> for FNode<H> {
    fn into_child_spec(self) -> ChildSpec<H> {
        ChildSpec::Node(self)
    }
}

impl<H: Host> IntoChildSpec<H> for bool {
    fn into_child_spec(self) -> ChildSpec<H> {
        ChildSpec::Empty
    }
}

impl<H: Host> IntoChildSpec<H> for &'static str {
    fn into_child_spec(self) -> ChildSpec<H> {
        ChildSpec::Text(Cow::Borrowed(self))
    }
}

impl<H: Host> IntoChildSpec<H> for String {
    fn into_child_spec(self) -> ChildSpec<H> {
        ChildSpec::Text(Cow::Owned(self))
    }
}

macro_rules! impl_child_spec_number {
    ($($t:ty),*) => {
        $(impl<H: Host> IntoChildSpec<H> for $t {
            fn into_child_spec(self) -> ChildSpec<H> {
                ChildSpec::Text(Cow::Owned(self.to_string()))
            }
        })*
    };
}
impl_child_spec_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<H: Host, T: IntoChildSpec<H>> IntoChildSpec<H> for Option<T> {
    fn into_child_spec(self) -> ChildSpec<H> {
        match self {
            Some(t) => t.into_child_spec(),
            None => ChildSpec::Empty,
        }
    }
}

impl<H: Host, T: IntoChildSpec<H>> IntoChildSpec<H> for Vec<T> {
    fn into_child_spec(self) -> ChildSpec<H> {
        ChildSpec::List(self.into_iter().map(IntoChildSpec::into_child_spec).collect())
    }
}

/// Wraps `f` as a reactive child position: re-evaluated inside an effect,
/// re-mounting in place on every dependency change. If `f`'s result is a
/// [`ChildSpec::List`], the renderer delegates to the keyed reconciliation
/// algorithm instead of a blunt remount.
pub fn dyn_child<H: Host>(f: impl FnMut() -> ChildSpec<H> + 'static) -> ChildSpec<H> {
    ChildSpec::Dynamic(RefCell::new(Box::new(f)))
}

/// As [`dyn_child`], but accepts any `T: IntoChildSpec`.
pub fn dyn_child_into<H: Host, T: IntoChildSpec<H>>(mut f: impl FnMut() -> T + 'static) -> ChildSpec<H> {
    dyn_child(move || f().into_child_spec())
}

impl<H: Host, T: Clone + IntoChildSpec<H> + 'static> IntoChildSpec<H> for ReadSignal<T> {
    fn into_child_spec(self) -> ChildSpec<H> {
        dyn_child(move || self.get().into_child_spec())
    }
}

impl<H: Host, T: Clone + IntoChildSpec<H> + 'static> IntoChildSpec<H> for Signal<T> {
    fn into_child_spec(self) -> ChildSpec<H> {
        self.read_only().into_child_spec()
    }
}

impl<H: Host> fmt::Debug for FNode<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FNode")
            .field("ty", &self.ty)
            .field("key", &self.key)
            .field("children", &self.children.len())
            .finish()
    }
}

impl<H: Host> fmt::Debug for ChildSpec<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildSpec::Empty => write!(f, "Empty"),
            ChildSpec::Text(t) => write!(f, "Text({t:?})"),
            ChildSpec::Node(n) => write!(f, "Node({n:?})"),
            ChildSpec::List(items) => write!(f, "List(len = {})", items.len()),
            ChildSpec::Dynamic(_) => write!(f, "Dynamic(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_host::TestNode;

    #[test]
    fn string_key_is_extracted_and_removed_from_props() {
        let node: FNode<TestNode> = f(
            NodeType::Tag("li".into()),
            vec![("key".into(), PropValue::Attr(AttrSource::Static(AttrValue::Str("a".into()))))],
            Vec::new(),
        );
        assert_eq!(node.key(), Some("a"));
        assert!(node.props.is_empty());
    }

    #[test]
    fn numeric_key_is_coerced_to_its_string_form() {
        let node: FNode<TestNode> = f(
            NodeType::Tag("li".into()),
            vec![("key".into(), PropValue::Attr(AttrSource::Static(AttrValue::Number(3.0))))],
            Vec::new(),
        );
        assert_eq!(node.key(), Some("3"));
        assert!(node.props.is_empty());
    }

    #[test]
    fn bool_key_is_coerced_to_its_string_form() {
        let node: FNode<TestNode> = f(
            NodeType::Tag("li".into()),
            vec![("key".into(), PropValue::Attr(AttrSource::Static(AttrValue::Bool(true))))],
            Vec::new(),
        );
        assert_eq!(node.key(), Some("true"));
        assert!(node.props.is_empty());
    }
}
