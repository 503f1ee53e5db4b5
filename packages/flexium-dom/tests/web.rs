//! Browser-driven tests for `DomNode`. Run with `wasm-pack test --headless
//! --chrome` (or another browser runner wasm-bindgen-test supports).

use flexium_core::{f, render, NodeType};
use flexium_dom::{document, DomNode};
use flexium_reactive::signal;
use wasm_bindgen_test::*;
use web_sys::Element;

wasm_bindgen_test_configure!(run_in_browser);

fn el(tag: &'static str, children: Vec<flexium_core::ChildSpec<DomNode>>) -> flexium_core::FNode<DomNode> {
    f(NodeType::Tag(tag.into()), Vec::new(), children)
}

/// A fresh, empty element appended to `<body>` for one test's use.
fn test_container() -> Element {
    let container = document().create_element("test-container").unwrap();
    document().body().unwrap().append_child(&container).unwrap();
    container
}

#[wasm_bindgen_test]
fn mounts_static_text_into_the_dom() {
    use flexium_core::IntoChildSpec;

    let container = test_container();
    let handle = render(el("p", vec!["hello".into_child_spec()]), &DomNode::from_web_sys(container.clone().into()));
    assert_eq!(container.text_content().unwrap(), "hello");
    handle.dispose();
    assert_eq!(container.child_nodes().length(), 0);
}

#[wasm_bindgen_test]
fn reactive_text_updates_on_signal_change() {
    use flexium_core::{dyn_child_into, IntoChildSpec};

    let container = test_container();
    let count = signal(0);
    let handle = {
        let count_ro = count.read_only();
        render(
            el("span", vec![dyn_child_into(move || count_ro.get())]),
            &DomNode::from_web_sys(container.clone().into()),
        )
    };
    assert_eq!(container.text_content().unwrap(), "0");
    count.set(7);
    assert_eq!(container.text_content().unwrap(), "7");
    handle.dispose();
}

#[wasm_bindgen_test]
fn attribute_and_class_are_set_on_the_element() {
    use flexium_core::{AttrSource, AttrValue, PropValue};

    let container = test_container();
    let props = vec![
        ("data-id".into(), PropValue::Attr(AttrSource::Static(AttrValue::Str("42".into())))),
        ("class".into(), PropValue::Class("widget active".into())),
    ];
    let handle = render(f(NodeType::Tag("div".into()), props, Vec::new()), &DomNode::from_web_sys(container.clone().into()));
    let child = container.first_element_child().unwrap();
    assert_eq!(child.get_attribute("data-id").as_deref(), Some("42"));
    assert_eq!(child.class_name(), "widget active");
    handle.dispose();
}

#[wasm_bindgen_test]
fn style_properties_resolve_kebab_case_and_px_units() {
    use flexium_core::{AttrValue, PropValue, StyleSource};
    use wasm_bindgen::JsCast;

    let container = test_container();
    let props = vec![(
        "style".into(),
        PropValue::Style(StyleSource::Static(vec![
            ("backgroundColor".into(), AttrValue::Str("red".into())),
            ("marginTop".into(), AttrValue::Number(4.0)),
            ("opacity".into(), AttrValue::Number(0.5)),
        ])),
    )];
    let handle = render(f(NodeType::Tag("div".into()), props, Vec::new()), &DomNode::from_web_sys(container.clone().into()));
    let child: web_sys::HtmlElement = container.first_element_child().unwrap().dyn_into().unwrap();
    let style = child.style();
    assert_eq!(style.get_property_value("background-color").unwrap(), "red");
    assert_eq!(style.get_property_value("margin-top").unwrap(), "4px");
    assert_eq!(style.get_property_value("opacity").unwrap(), "0.5");
    handle.dispose();
}

#[wasm_bindgen_test]
fn click_listener_fires_through_add_event_listener() {
    use flexium_core::PropValue;
    use std::cell::Cell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;

    let container = test_container();
    let clicked = Rc::new(Cell::new(false));
    let clicked_in_handler = clicked.clone();
    let props = vec![(
        "click".into(),
        PropValue::Event(std::cell::RefCell::new(Box::new(move |_event: web_sys::Event| {
            clicked_in_handler.set(true);
        }))),
    )];
    let handle = render(f(NodeType::Tag("button".into()), props, Vec::new()), &DomNode::from_web_sys(container.clone().into()));
    let button: web_sys::HtmlElement = container.first_element_child().unwrap().dyn_into().unwrap();
    button.click();
    assert!(clicked.get());
    handle.dispose();
}
