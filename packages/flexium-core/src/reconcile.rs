//! C5: keyed reconciliation for a reactive children list.
//!
//! Grounded on the two algorithms `sycamore` keeps near-duplicates of: the
//! DOM-level common-prefix/common-suffix/move walk in
//! `sycamore-core::render::reconcile_fragments` (and its `web_sys`
//! specialization in `sycamore-web::iter`), and the record-level diff in
//! `sycamore-reactive::iter::Scope::map_keyed` that decides which records
//! are reused, created, or disposed before any DOM move happens.

use std::borrow::Cow;

use indexmap::IndexMap;

use flexium_reactive::Scope;

use crate::descriptor::{AttrSource, AttrValue, ChildSpec, NodeType, PropValue};
use crate::host::Host;
use crate::render::mount_spec;

/// A reactive child's identity: an explicit key always wins over a
/// positional one, even when they'd otherwise collide with it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Explicit(Cow<'static, str>),
    Positional(usize),
}

/// A coarse shape tag deciding whether a reused record's mounted subtree
/// survives a descriptor swap.
#[derive(PartialEq, Eq, Clone, Debug)]
enum Shape {
    Empty,
    Text,
    Tag(Cow<'static, str>),
    Fragment,
    /// A nested list or reactive position: always torn down and remounted
    /// on reuse, since there is no cheap shallow diff for it.
    Opaque,
}

fn shape_of<H: Host>(spec: &ChildSpec<H>) -> Shape {
    match spec {
        ChildSpec::Empty => Shape::Empty,
        ChildSpec::Text(_) => Shape::Text,
        ChildSpec::Node(fnode) => match &fnode.ty {
            NodeType::Tag(t) => Shape::Tag(t.clone()),
            NodeType::Fragment => Shape::Fragment,
        },
        ChildSpec::List(_) | ChildSpec::Dynamic(_) => Shape::Opaque,
    }
}

/// Static prop values captured at mount/reuse time, compared shallowly on
/// the next reuse: the new primitive prop is compared against the old one
/// and only the differences are written. Reactive props need no entry here;
/// they are driven by their own
/// per-prop effect, already wired to the element that survives reuse.
fn static_props<H: Host>(props: &[(Cow<'static, str>, PropValue<H>)]) -> Vec<(Cow<'static, str>, AttrValue)> {
    props
        .iter()
        .filter_map(|(name, value)| match value {
            PropValue::Attr(AttrSource::Static(v)) => Some((name.clone(), v.clone())),
            PropValue::Class(c) => Some((Cow::Borrowed("class"), AttrValue::Str(c.clone()))),
            _ => None,
        })
        .collect()
}

/// One mounted record in a reactive children slot.
pub struct Record<H: Host> {
    scope: Scope,
    /// Top-level host nodes this record mounted, in document order. Stable
    /// across reuse: a reused record's subtree, and therefore these
    /// handles, are never rebuilt.
    nodes: Vec<H>,
    shape: Shape,
    last_props: Vec<(Cow<'static, str>, AttrValue)>,
}

/// The persistent state of one reactive children slot, keyed across
/// re-evaluations by [`Key`].
pub struct ListState<H: Host> {
    records: IndexMap<Key, Record<H>>,
}

impl<H: Host> ListState<H> {
    pub fn new() -> Self {
        ListState { records: IndexMap::new() }
    }

    /// Disposes every record's scope. Used both when a reactive position
    /// switches away from list content and when its enclosing scope tears
    /// down mid-update.
    pub fn dispose_all(self) {
        for (_, record) in self.records {
            record.scope.dispose();
        }
    }
}

/// Extracts the key to reconcile by: a descriptor's explicit key if
/// present, otherwise its position in `items`.
fn key_for<H: Host>(spec: &ChildSpec<H>, index: usize) -> Key {
    match spec {
        ChildSpec::Node(fnode) => match fnode.key() {
            Some(k) => Key::Explicit(Cow::Owned(k.to_owned())),
            None => Key::Positional(index),
        },
        _ => Key::Positional(index),
    }
}

/// Runs one reconciliation pass: `items` is the freshly evaluated list of
/// child specs; `state` holds the previous pass's records and is updated
/// in place. `parent`/`anchor` bound the DOM slot; `scope` is the reactive
/// scope new records are parented to (the reactive position's own scope,
/// so disposing the position disposes every record still alive in it).
pub fn update_children<H: Host>(
    parent: &H,
    anchor: Option<&H>,
    state: &mut ListState<H>,
    items: Vec<ChildSpec<H>>,
    scope: Scope,
) {
    let mut old_records = std::mem::take(&mut state.records);

    // Step 1: match by key. An item whose key was already claimed earlier in
    // this same pass (duplicate key) falls back to a positional key; the
    // first occurrence keeps the explicit key.
    let mut seen_keys: Vec<Key> = Vec::with_capacity(items.len());
    let mut plan: Vec<(Key, ChildSpec<H>, Option<Record<H>>)> = Vec::with_capacity(items.len());
    for (index, spec) in items.into_iter().enumerate() {
        let mut key = key_for(&spec, index);
        if seen_keys.contains(&key) {
            tracing::warn!(?key, "duplicate key in reactive children slot; falling back to positional key");
            key = Key::Positional(index);
        }
        let reused = old_records.shift_remove(&key);
        seen_keys.push(key.clone());
        plan.push((key, spec, reused));
    }

    // Step 2: any old record whose key is no longer present is disposed.
    for (_, record) in old_records {
        record.scope.dispose();
    }

    // Step 3/4: build the new record set, mounting fresh records and
    // shallow-diffing reused ones, with no DOM placement yet.
    let mut new_records: IndexMap<Key, Record<H>> = IndexMap::with_capacity(plan.len());
    for (key, spec, reused) in plan {
        let record = match reused {
            Some(mut record) if record.shape == shape_of(&spec) => {
                reapply_reused(&mut record, spec);
                record
            }
            Some(stale) => {
                stale.scope.dispose();
                mount_new_record(parent, spec, scope)
            }
            None => mount_new_record(parent, spec, scope),
        };
        new_records.insert(key, record);
    }

    // Reorder with minimum moves: walk the new order back to front, only
    // re-inserting a record whose nodes are not already immediately before
    // the running reference node. This is the same shape as
    // `reconcile_fragments`'s two-pointer walk, collapsed to a single
    // reverse pass since records (unlike raw DOM nodes) are already
    // grouped; `next_sibling` checks make an already-ordered run of
    // records a zero-DOM-op no-op, which is what a full
    // longest-increasing-subsequence pass would also leave untouched.
    let mut reference: Option<H> = anchor.cloned();
    for record in new_records.values().rev() {
        if record.nodes.is_empty() {
            continue;
        }
        if !already_before(&record.nodes, reference.as_ref()) {
            for node in &record.nodes {
                parent.insert_child_before(node, reference.as_ref());
            }
        }
        reference = record.nodes.first().cloned();
    }

    state.records = new_records;
}

/// Whether `nodes` (in order) already sit immediately before `reference`
/// with no foreign node in between, i.e. moving them would be a no-op.
fn already_before<H: Host>(nodes: &[H], reference: Option<&H>) -> bool {
    let mut cursor = match nodes.last() {
        Some(n) => n.clone(),
        None => return true,
    };
    loop {
        match cursor.next_sibling() {
            next if next.as_ref() == reference => return true,
            Some(next) if nodes.contains(&next) => cursor = next,
            _ => return false,
        }
    }
}

fn reapply_reused<H: Host>(record: &mut Record<H>, spec: ChildSpec<H>) {
    match spec {
        ChildSpec::Text(new_text) => {
            if let Some(node) = record.nodes.first() {
                let changed = record.last_props.first().map(|(_, v)| v) != Some(&AttrValue::Str(new_text.clone()));
                if changed {
                    node.set_text(new_text.clone());
                }
            }
            record.last_props = vec![(Cow::Borrowed("text"), AttrValue::Str(new_text))];
        }
        ChildSpec::Node(fnode) if matches!(fnode.ty, NodeType::Tag(_)) => {
            let new_props = static_props(&fnode.props);
            if let Some(el) = record.nodes.first() {
                for (name, value) in &new_props {
                    let previous = record.last_props.iter().find(|(n, _)| n == name).map(|(_, v)| v);
                    if previous != Some(value) {
                        apply_reused_attr(el, name.clone(), value.clone());
                    }
                }
                for (name, _) in &record.last_props {
                    if !new_props.iter().any(|(n, _)| n == name) {
                        el.remove_attribute(name.clone());
                    }
                }
            }
            record.last_props = new_props;
        }
        // Fragment/Empty/Opaque: nothing to diff at this level; any
        // content is the responsibility of the record's own scope.
        _ => {}
    }
}

fn apply_reused_attr<H: Host>(el: &H, name: Cow<'static, str>, value: AttrValue) {
    match value {
        AttrValue::Null => el.remove_attribute(name),
        AttrValue::Bool(b) => el.set_bool_attribute(name, b),
        AttrValue::Str(s) => {
            if name == "class" {
                el.set_class_name(s);
            } else {
                el.set_attribute(name, s);
            }
        }
        AttrValue::Number(n) => el.set_attribute(name, Cow::Owned(n.to_string())),
    }
}

fn mount_new_record<H: Host>(parent: &H, spec: ChildSpec<H>, parent_scope: Scope) -> Record<H> {
    let shape = shape_of(&spec);
    let last_props = match &spec {
        ChildSpec::Text(t) => vec![(Cow::Borrowed("text"), AttrValue::Str(t.clone()))],
        ChildSpec::Node(fnode) if matches!(fnode.ty, NodeType::Tag(_)) => static_props(&fnode.props),
        _ => Vec::new(),
    };
    let mut nodes = Vec::new();
    let record_scope = parent_scope.child(|sub| {
        nodes = mount_spec(parent, None, spec, sub);
    });
    Record { scope: record_scope, nodes, shape, last_props }
}
