//! Exercises the facade's re-exported surface end to end, against the
//! headless host so these run on any target without a browser.

use std::cell::RefCell;
use std::rc::Rc;

use flexium::core::test_host::TestNode;
use flexium::prelude::*;

fn el(tag: &'static str, children: Vec<ChildSpec<TestNode>>) -> FNode<TestNode> {
    f(NodeType::Tag(tag.into()), Vec::new(), children)
}

#[test]
fn signal_and_computed_compose_through_the_facade() {
    let count = signal(0);
    let doubled = computed({
        let count = count.read_only();
        move || count.get() * 2
    });
    assert_eq!(doubled.get(), 0);
    count.set(21);
    assert_eq!(doubled.get(), 42);
}

#[test]
fn effect_reruns_on_dependency_change_through_create_root() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let count = signal(0);
    let handle = create_root(|_| {
        let seen = seen.clone();
        let count = count.read_only();
        effect(move || {
            seen.borrow_mut().push(count.get());
            None
        });
    });
    count.set(1);
    count.set(2);
    assert_eq!(*seen.borrow(), vec![0, 1, 2]);
    handle.dispose();
}

#[test]
fn renders_a_counter_button_and_updates_its_label() {
    let container = TestNode::element("div".into());
    let count = signal(0);
    let handle = {
        let count_ro = count.read_only();
        render(el("button", vec![count_ro.into_child_spec()]), &container)
    };
    assert_eq!(container.rendered_text(), "0");
    count.set(5);
    assert_eq!(container.rendered_text(), "5");
    handle.dispose();
    assert_eq!(container.child_count(), 0);
}

#[test]
fn keyed_helper_renders_and_updates_a_list() {
    let container = TestNode::element("div".into());
    let items = signal(vec![1, 2, 3]);
    let handle = {
        let items_ro = items.read_only();
        render(
            el("ul", vec![keyed(items_ro, |n| n.to_string(), |n| el("li", vec![n.into_child_spec()]))]),
            &container,
        )
    };
    let ul = container.children().remove(0);
    assert_eq!(ul.rendered_text(), "123");
    items.update(|v| v.push(4));
    assert_eq!(ul.rendered_text(), "1234");
    handle.dispose();
}

#[test]
fn node_ref_is_set_once_the_element_is_mounted() {
    let container = TestNode::element("div".into());
    let node_ref: NodeRef<TestNode> = create_node_ref();
    assert!(node_ref.try_get().is_none());
    let handle = render(f(NodeType::Tag("span".into()), vec![("ref".into(), PropValue::Ref(node_ref))], Vec::new()), &container);
    assert_eq!(node_ref.get().tag(), "span");
    handle.dispose();
}

#[test]
fn fragment_symbol_is_reexported() {
    let container = TestNode::element("div".into());
    let handle = render(f(Fragment, Vec::new(), vec!["a".into_child_spec(), "b".into_child_spec()]), &container);
    assert_eq!(container.rendered_text(), "ab");
    handle.dispose();
}
