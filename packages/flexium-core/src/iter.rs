//! Ergonomic wrappers around a reactive children list, in the spirit of
//! `sycamore-web::iter::{Keyed, Indexed}`. Since components disappear from
//! this descriptor model, these are plain functions returning a
//! [`ChildSpec::Dynamic`] rather than components with their own props.

use std::borrow::Cow;

use flexium_reactive::ReadSignal;

use crate::descriptor::{dyn_child, ChildSpec, FNode};
use crate::host::Host;

/// Renders `list` as a reactive children slot, keyed by `key_fn`. Identity
/// across reorders (focus, CSS transitions, animation) is preserved for
/// any item whose key survives an update.
pub fn keyed<H, T, K>(
    list: ReadSignal<Vec<T>>,
    key_fn: impl Fn(&T) -> K + 'static,
    render: impl Fn(T) -> FNode<H> + 'static,
) -> ChildSpec<H>
where
    H: Host,
    T: Clone + 'static,
    K: Into<Cow<'static, str>>,
{
    dyn_child(move || {
        let items = list.get();
        ChildSpec::List(
            items
                .into_iter()
                .map(|item| {
                    let key = key_fn(&item).into();
                    let mut node = render(item);
                    node.set_key(key);
                    ChildSpec::Node(node)
                })
                .collect(),
        )
    })
}

/// Renders `list` as a reactive children slot keyed by position. Cheaper
/// than [`keyed`] when items don't need stable identity across reorders,
/// at the cost of losing that identity: a reorder is seen as every item
/// at an affected position changing, not as items moving.
pub fn indexed<H, T>(list: ReadSignal<Vec<T>>, render: impl Fn(T) -> FNode<H> + 'static) -> ChildSpec<H>
where
    H: Host,
    T: Clone + 'static,
{
    dyn_child(move || ChildSpec::List(list.get().into_iter().map(|item| ChildSpec::Node(render(item))).collect()))
}
