//! Backend-agnostic element descriptors, mounting, and keyed reconciliation.
//!
//! This crate implements C3 (element descriptors), C4 (the generic mount
//! algorithm) and C5 (reactive children list reconciliation) over any
//! [`Host`] implementation. `flexium-dom` supplies the one this workspace
//! ships for real browser use; [`test_host::TestNode`] is a headless one
//! this crate's own tests (and any downstream crate) can drive without a
//! browser.

use std::borrow::Cow;

mod descriptor;
mod error;
mod host;
mod iter;
mod noderef;
mod reconcile;
mod render;
pub mod test_host;

pub use descriptor::{
    dyn_child, dyn_child_into, f, jsx, jsxs, AttrSource, AttrValue, ChildSpec, FNode, IntoChildSpec, NodeType,
    PropValue, StyleSource,
};
pub use descriptor::NodeType::Fragment;
pub use error::RenderError;
pub use host::Host;
pub use iter::{indexed, keyed};
pub use noderef::{create_node_ref, NodeRef};
pub use render::render;

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use flexium_reactive::signal;

    use super::*;
    use crate::test_host::TestNode;

    fn el(tag: &'static str, children: Vec<ChildSpec<TestNode>>) -> FNode<TestNode> {
        f(NodeType::Tag(tag.into()), Vec::new(), children)
    }

    #[test]
    fn mounts_static_text() {
        let container = TestNode::element("div".into());
        let handle = render(el("p", vec!["hello".into_child_spec()]), &container);
        assert_eq!(container.rendered_text(), "hello");
        handle.dispose();
        assert_eq!(container.child_count(), 0);
    }

    #[test]
    fn reactive_position_remounts_in_place() {
        let container = TestNode::element("div".into());
        let count = signal(0);
        let handle = {
            let count = count.read_only();
            render(
                el("div", vec![dyn_child(move || count.get().into_child_spec())]),
                &container,
            )
        };
        assert_eq!(container.rendered_text(), "0");
        count.set(1);
        assert_eq!(container.rendered_text(), "1");
        handle.dispose();
    }

    #[test]
    fn bool_children_render_as_nothing() {
        let container = TestNode::element("div".into());
        let handle = render(el("div", vec![true.into_child_spec(), false.into_child_spec()]), &container);
        assert_eq!(container.rendered_text(), "");
        handle.dispose();
    }

    #[test]
    fn keyed_list_preserves_identity_across_reorder() {
        let container = TestNode::element("div".into());
        let items = signal(vec!["a", "b", "c"]);
        let handle = {
            let items = items.read_only();
            render(
                el(
                    "ul",
                    vec![keyed(items, |s| Cow::Borrowed(*s), |s| el("li", vec![s.into_child_spec()]))],
                ),
                &container,
            )
        };
        let ul = container.children().remove(0);
        assert_eq!(ul.rendered_text(), "abc");
        let li_a_before = ul.children().into_iter().find(|n| n.rendered_text() == "a").unwrap();
        items.set(vec!["c", "a", "b"]);
        assert_eq!(ul.rendered_text(), "cab");
        let li_a_after = ul.children().into_iter().find(|n| n.rendered_text() == "a").unwrap();
        assert_eq!(li_a_after, li_a_before, "the <li> for \"a\" keeps its identity across the reorder");
        handle.dispose();
    }

    #[test]
    fn removed_keyed_records_are_disposed_in_creation_order() {
        let log: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
        let items = signal(vec!["a", "b"]);
        let root_handle = {
            let items_ro = items.read_only();
            let container = TestNode::element("div".into());
            let log_a = log.clone();
            let log_b = log.clone();
            let handle = render(
                el(
                    "ul",
                    vec![keyed(
                        items_ro,
                        |s| Cow::Borrowed(*s),
                        move |s| {
                            let log = if s == "a" { log_a.clone() } else { log_b.clone() };
                            flexium_reactive::on_cleanup(move || log.borrow_mut().push(s));
                            el("li", vec![s.into_child_spec()])
                        },
                    )],
                ),
                &container,
            );
            items.set(vec![]);
            handle
        };
        root_handle.dispose();
        assert_eq!(*log.borrow(), vec!["a", "b"], "disposed in the order the records were created");
    }

    #[test]
    fn attribute_and_class_are_applied() {
        let container = TestNode::element("div".into());
        let props = vec![
            (Cow::Borrowed("id"), PropValue::Attr(AttrSource::Static(AttrValue::Str(Cow::Borrowed("x"))))),
            (Cow::Borrowed("class"), PropValue::Class(Cow::Borrowed("btn"))),
        ];
        let handle = render(f(NodeType::Tag("button".into()), props, Vec::new()), &container);
        let button = container.children().remove(0);
        assert_eq!(button.attribute("id"), Some("x".to_string()));
        assert_eq!(button.class_name(), "btn");
        handle.dispose();
    }

    #[test]
    fn fragment_has_no_wrapping_element() {
        let container = TestNode::element("div".into());
        let handle = render(
            f(NodeType::Fragment, Vec::new(), vec!["a".into_child_spec(), "b".into_child_spec()]),
            &container,
        );
        assert_eq!(container.child_count(), 2);
        assert_eq!(container.rendered_text(), "ab");
        handle.dispose();
    }
}
