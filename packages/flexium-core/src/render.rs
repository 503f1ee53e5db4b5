//! The generic mount algorithm (C4): walks a descriptor tree and turns it
//! into live host nodes, wiring one effect per reactive position so that
//! later changes flow straight to the DOM with no whole-tree diff.

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use flexium_reactive::{create_root, effect_simple, RootHandle, Scope};

use crate::descriptor::{AttrSource, AttrValue, ChildSpec, FNode, NodeType, PropValue, StyleSource};
use crate::host::Host;
use crate::reconcile::{update_children, ListState};

/// CSS properties whose numeric value is unitless (no implicit `px`
/// suffix). Kept as a fixed, enumerated set.
const UNITLESS_STYLE_PROPS: &[&str] = &[
    "animation-iteration-count",
    "column-count",
    "flex",
    "flex-grow",
    "flex-shrink",
    "font-weight",
    "line-height",
    "opacity",
    "order",
    "orphans",
    "widows",
    "z-index",
    "zoom",
];

fn is_unitless(kebab_name: &str) -> bool {
    UNITLESS_STYLE_PROPS.contains(&kebab_name)
}

/// camelCase -> kebab-case, e.g. `backgroundColor` -> `background-color`.
fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Resolves one style property/value pair into its CSS text form, or `None`
/// if the property should be removed instead of set (`null`/`undefined`
/// have the same "do not set" meaning here as for attributes).
fn resolve_style_value(kebab_name: &str, value: AttrValue) -> Option<Cow<'static, str>> {
    match value {
        AttrValue::Null => None,
        AttrValue::Str(s) => Some(s),
        AttrValue::Bool(b) => Some(Cow::Owned(b.to_string())),
        AttrValue::Number(n) => {
            if is_unitless(kebab_name) {
                Some(Cow::Owned(format_number(n)))
            } else {
                Some(Cow::Owned(format!("{}px", format_number(n))))
            }
        }
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Sets or removes a plain attribute from an [`AttrValue`]: `false`/`null`
/// means "do not set", `true` sets a valueless boolean attribute, everything
/// else is stringified and set.
fn apply_attr_value<H: Host>(el: &H, name: Cow<'static, str>, value: AttrValue) {
    match value {
        AttrValue::Null => el.remove_attribute(name),
        AttrValue::Bool(b) => el.set_bool_attribute(name, b),
        AttrValue::Str(s) => el.set_attribute(name, s),
        AttrValue::Number(n) => el.set_attribute(name, Cow::Owned(format_number(n))),
    }
}

/// Opens and returns a root scope, then mounts `descriptor` as a child of
/// `container`. The returned [`RootHandle`] tears down the whole subtree
/// (reactive state and host nodes alike) when disposed.
///
/// Whether `container` is emptied first is left to the caller, so that
/// hot-module-reload can mount over a live tree without first throwing it
/// away.
pub fn render<H: Host>(descriptor: FNode<H>, container: &H) -> RootHandle {
    create_root(|scope| {
        mount_fnode(container, None, descriptor, scope);
    })
}

/// Mounts `descriptor` as a child of `parent`, inserted before `anchor` (or
/// appended if `anchor` is `None`). Returns the top-level host node(s) it
/// produced (a fragment's flatten into however many its children produced;
/// a tag always produces exactly one).
fn mount_fnode<H: Host>(parent: &H, anchor: Option<&H>, descriptor: FNode<H>, scope: Scope) -> Vec<H> {
    match descriptor.ty {
        NodeType::Fragment => {
            let mut nodes = Vec::new();
            for child in descriptor.children {
                nodes.extend(mount_spec(parent, anchor, child, scope));
            }
            nodes
        }
        NodeType::Tag(tag) => {
            let el = H::element(tag);
            apply_props(&el, descriptor.props, scope);
            for child in descriptor.children {
                mount_spec(&el, None, child, scope);
            }
            parent.insert_child_before(&el, anchor);
            let parent_for_dispose = parent.clone();
            let el_for_dispose = el.clone();
            scope.on_dispose(move || parent_for_dispose.remove_child(&el_for_dispose));
            vec![el]
        }
    }
}

/// Mounts one child position. This is the dispatch for mount cases 1, 5's
/// recursive step, 6, and the static-list flattening that backs case 5's
/// "recursively mount each child"; cases 2/3 (reactive positions) are
/// delegated to [`mount_reactive`]. Returns the top-level host node(s)
/// mounted, used by the keyed reconciler to track and relocate a record.
pub(crate) fn mount_spec<H: Host>(parent: &H, anchor: Option<&H>, spec: ChildSpec<H>, scope: Scope) -> Vec<H> {
    match spec {
        ChildSpec::Empty => Vec::new(),
        ChildSpec::Text(text) => {
            let node = H::text_node(text);
            parent.insert_child_before(&node, anchor);
            let parent_for_dispose = parent.clone();
            let node_for_dispose = node.clone();
            scope.on_dispose(move || parent_for_dispose.remove_child(&node_for_dispose));
            vec![node]
        }
        ChildSpec::Node(fnode) => mount_fnode(parent, anchor, fnode, scope),
        ChildSpec::List(items) => {
            let mut nodes = Vec::new();
            for item in items {
                nodes.extend(mount_spec(parent, anchor, item, scope));
            }
            nodes
        }
        ChildSpec::Dynamic(f) => vec![mount_reactive(parent, anchor, f, scope)],
    }
}

/// What a reactive position currently holds, so a later re-run knows
/// whether to tear down a single mounted subtree or to delegate to the
/// keyed-list reconciler.
enum PositionState<H: Host> {
    Empty,
    Single(Scope),
    List(ListState<H>),
}

impl<H: Host> PositionState<H> {
    fn dispose(self) {
        match self {
            PositionState::Empty => {}
            PositionState::Single(scope) => scope.dispose(),
            PositionState::List(list) => list.dispose_all(),
        }
    }
}

/// Mount case 2/3: a position whose content is recomputed whenever its
/// dependencies change. A zero-width marker node is inserted once, up
/// front, as the stable insertion anchor every later re-run and the list
/// reconciler's own moves insert before.
fn mount_reactive<H: Host>(
    parent: &H,
    anchor: Option<&H>,
    f: RefCell<Box<dyn FnMut() -> ChildSpec<H>>>,
    outer_scope: Scope,
) -> H {
    let marker = H::marker();
    parent.insert_child_before(&marker, anchor);
    {
        let parent = parent.clone();
        let marker = marker.clone();
        outer_scope.on_dispose(move || parent.remove_child(&marker));
    }

    outer_scope.child(|position_scope| {
        let state: Rc<RefCell<PositionState<H>>> = Rc::new(RefCell::new(PositionState::Empty));
        let parent = parent.clone();
        effect_simple(move || {
            let spec = (f.borrow_mut())();
            let mut slot = state.borrow_mut();
            match spec {
                ChildSpec::List(items) => {
                    if !matches!(&*slot, PositionState::List(_)) {
                        std::mem::replace(&mut *slot, PositionState::List(ListState::new())).dispose();
                    }
                    if let PositionState::List(list_state) = &mut *slot {
                        update_children(&parent, Some(&marker), list_state, items, position_scope);
                    }
                }
                other => {
                    let previous = std::mem::replace(&mut *slot, PositionState::Empty);
                    previous.dispose();
                    let sub_scope = position_scope.child(|sub| {
                        mount_spec(&parent, Some(&marker), other, sub);
                    });
                    *slot = PositionState::Single(sub_scope);
                }
            }
        });
    });
    marker
}

/// Splits `props` by kind and applies each: event handlers, `ref`,
/// `style`, `class`, and plain attributes.
fn apply_props<H: Host>(el: &H, props: Vec<(Cow<'static, str>, PropValue<H>)>, scope: Scope) {
    for (name, value) in props {
        match value {
            PropValue::Attr(AttrSource::Static(v)) => apply_attr_value(el, name, v),
            PropValue::Attr(AttrSource::Reactive(f)) => {
                let el = el.clone();
                scope.child(|_| {
                    effect_simple(move || {
                        let v = (f.borrow_mut())();
                        apply_attr_value(&el, name.clone(), v);
                    });
                });
            }
            PropValue::Class(value) => el.set_class_name(value),
            PropValue::Style(StyleSource::Text(css)) => {
                el.set_attribute(Cow::Borrowed("style"), css)
            }
            PropValue::Style(StyleSource::Static(entries)) => {
                for (name, value) in entries {
                    let kebab = kebab_case(&name);
                    match resolve_style_value(&kebab, value) {
                        Some(css) => el.set_style_property(Cow::Owned(kebab), css),
                        None => el.remove_style_property(Cow::Owned(kebab)),
                    }
                }
            }
            PropValue::Style(StyleSource::Reactive(f)) => {
                let el = el.clone();
                scope.child(|_| {
                    let applied: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
                    effect_simple(move || {
                        let entries = (f.borrow_mut())();
                        let mut previously_applied = applied.borrow_mut();
                        let mut next_applied = Vec::with_capacity(entries.len());
                        for (name, value) in entries {
                            let kebab = kebab_case(&name);
                            match resolve_style_value(&kebab, value) {
                                Some(css) => el.set_style_property(Cow::Owned(kebab.clone()), css),
                                None => el.remove_style_property(Cow::Owned(kebab.clone())),
                            }
                            next_applied.push(kebab);
                        }
                        for stale in previously_applied.iter() {
                            if !next_applied.contains(stale) {
                                el.remove_style_property(Cow::Owned(stale.clone()));
                            }
                        }
                        *previously_applied = next_applied;
                    });
                });
            }
            PropValue::Event(handler) => {
                let el_for_dispose = el.clone();
                let name_for_dispose = name.clone();
                el.add_event_listener(
                    name,
                    Box::new(move |data| (handler.borrow_mut())(data)),
                );
                scope.on_dispose(move || el_for_dispose.remove_event_listener(name_for_dispose));
            }
            PropValue::Ref(node_ref) => node_ref.set(el.clone()),
        }
    }
}
