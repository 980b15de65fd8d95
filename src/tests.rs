//! End-to-end scenarios over the in-process bridge.

use std::{cell::RefCell, rc::Rc};

use serde_json::json;
use waterbridge_core::{NodeDescriptor, Props, ProtocolViolation, event::names::CHANGE};
use waterbridge_native::ViewRole;

use crate::{Bridge, BridgeConfig, Commit, NodeRegistry, RenderSequencer, TreeSerializer};

const SCENARIO_TREE: &str = r#"{"id":"root","type":"Group","children":[{"id":"a","type":"Section","children":[{"id":"b","type":"TextField","children":[]}]}]}"#;

fn mount_scenario(bridge: &mut Bridge) {
    let session = bridge.session_mut();
    session.begin_pass();
    session
        .register(NodeDescriptor::new("a", "Section"), None)
        .unwrap();
    session
        .register(NodeDescriptor::new("b", "TextField"), Some("a"))
        .unwrap();
    assert!(matches!(session.commit().unwrap(), Commit::Sent { .. }));
}

#[test]
fn serializes_nested_registration() {
    let mut registry = NodeRegistry::new();
    let mut sequence = RenderSequencer::new();
    registry
        .register(NodeDescriptor::new("a", "Section"), None)
        .unwrap();
    sequence.record("a");
    registry
        .register(NodeDescriptor::new("b", "TextField"), Some("a"))
        .unwrap();
    sequence.record("b");

    let payload = TreeSerializer::serialize(&registry, &sequence).unwrap();
    assert_eq!(payload, SCENARIO_TREE);

    registry.unregister("b");
    let payload = TreeSerializer::serialize(&registry, &sequence).unwrap();
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&payload).unwrap(),
        json!({"id":"root","type":"Group","children":[{"id":"a","type":"Section","children":[]}]})
    );
}

#[test]
fn patch_updates_the_field_without_rebuilding() {
    let mut bridge = Bridge::new(BridgeConfig::default());
    mount_scenario(&mut bridge);
    assert_eq!(bridge.pump().messages, 1);
    assert_eq!(bridge.runtime().rebuild_count(), 1);

    let patch = Props::from([("text".to_owned(), "hello".into())]);
    assert!(bridge.session_mut().update_props("b", patch).unwrap());
    assert_eq!(bridge.pump().messages, 1);

    let view = bridge.runtime().view().find("b").unwrap();
    assert_eq!(view.role(), &ViewRole::TextInput);
    assert_eq!(view.props().get_str("text").as_deref(), Some("hello"));
    assert_eq!(bridge.runtime().rebuild_count(), 1);
}

#[test]
fn change_event_reaches_its_handler_once() {
    let mut bridge = Bridge::new(BridgeConfig::default());
    mount_scenario(&mut bridge);
    bridge.pump();

    let received = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&received);
    bridge.session_mut().on("b", CHANGE, move |value| {
        sink.borrow_mut().push(value.map(str::to_owned));
    });

    assert!(bridge.runtime().fire("b", CHANGE, Some("42".into())));
    assert_eq!(bridge.pump().events, 1);
    assert_eq!(*received.borrow(), [Some("42".to_owned())]);
}

#[test]
fn typed_handlers_see_decoded_values() {
    let mut bridge = Bridge::new(BridgeConfig::default());
    {
        let session = bridge.session_mut();
        session
            .register(NodeDescriptor::new("s", "Slider").with_prop("value", 0.5), None)
            .unwrap();
        let _ = session.commit().unwrap();
    }
    bridge.pump();

    let total = Rc::new(RefCell::new(0.0));
    let sink = Rc::clone(&total);
    bridge
        .session_mut()
        .on_value("s", CHANGE, move |value: f64| *sink.borrow_mut() += value);

    let slots = bridge.runtime().index().get("s").unwrap().slots().clone();
    assert!(slots.fire_value(CHANGE, &0.75));
    bridge.pump();
    assert!((*total.borrow() - 0.75).abs() < f64::EPSILON);
}

#[test]
fn events_from_a_superseded_tree_are_dropped() {
    let mut bridge = Bridge::new(BridgeConfig::default());
    mount_scenario(&mut bridge);
    bridge.pump();
    let stale = bridge.runtime().index().get("b").unwrap().slots().clone();

    let session = bridge.session_mut();
    session.begin_pass();
    session
        .register(NodeDescriptor::new("a", "Section"), None)
        .unwrap();
    session
        .register(NodeDescriptor::new("b", "TextField"), Some("a"))
        .unwrap();
    session
        .register(NodeDescriptor::new("c", "Toggle"), Some("a"))
        .unwrap();
    let _ = session.commit().unwrap();
    bridge.pump();

    assert_eq!(bridge.runtime().rebuild_count(), 2);
    assert!(!stale.fire(CHANGE, Some("late".into())));
    assert!(bridge.runtime().fire("b", CHANGE, Some("fresh".into())));
}

#[test]
fn sibling_order_survives_the_round_trip() {
    let mut bridge = Bridge::new(BridgeConfig::default());
    let session = bridge.session_mut();
    session.begin_pass();
    session
        .register(NodeDescriptor::new("list", "Section"), None)
        .unwrap();
    for id in ["B", "A", "C"] {
        session
            .register(NodeDescriptor::new(id, "Text").with_prop("text", id), Some("list"))
            .unwrap();
    }
    let _ = session.commit().unwrap();
    bridge.pump();

    let list = bridge.runtime().view().find("list").unwrap();
    let order: Vec<_> = list
        .children()
        .iter()
        .map(|child| child.identity().id())
        .collect();
    assert_eq!(order, ["B", "A", "C"]);
}

#[test]
fn retyping_a_live_id_is_rejected() {
    let mut bridge = Bridge::new(BridgeConfig::default());
    mount_scenario(&mut bridge);
    let session = bridge.session_mut();
    assert!(matches!(
        session.register(NodeDescriptor::new("a", "TextField"), None),
        Err(ProtocolViolation::TypeChanged { .. })
    ));
    assert_eq!(session.registry().get("a").unwrap().node_type(), "Section");
    assert_eq!(session.commit().unwrap(), Commit::Clean);
}

#[test]
fn undecodable_tree_shows_the_configured_placeholder() {
    let mut bridge = Bridge::new(BridgeConfig::default().with_placeholder_label("Try again"));
    {
        let session = bridge.session_mut();
        session
            .register(NodeDescriptor::new("t", "Text"), None)
            .unwrap();
        let _ = session.commit().unwrap();
    }
    bridge.pump();

    let view = bridge.runtime().view();
    assert!(view.is_placeholder());
    assert!(matches!(
        view.role(),
        ViewRole::Placeholder { label, .. } if label == "Try again"
    ));
}

#[test]
fn unmount_then_remount_rebuilds_once_per_commit() {
    let mut bridge = Bridge::new(BridgeConfig::default());
    mount_scenario(&mut bridge);
    bridge.pump();

    let session = bridge.session_mut();
    session.begin_pass();
    session
        .register(NodeDescriptor::new("a", "Section"), None)
        .unwrap();
    assert!(session.unmount("b"));
    let _ = session.commit().unwrap();
    bridge.pump();

    assert!(bridge.runtime().index().get("b").is_none());
    assert_eq!(bridge.runtime().rebuild_count(), 2);
    assert_eq!(bridge.pump(), crate::Pumped::default());
}

#[test]
fn root_id_cannot_be_registered() {
    let mut bridge = Bridge::new(BridgeConfig::default());
    let session = bridge.session_mut();
    session.begin_pass();
    assert_eq!(
        session.register(NodeDescriptor::new("root", "Section"), None),
        Err(ProtocolViolation::ReservedId { id: "root".into() })
    );
    session
        .register(NodeDescriptor::new("a", "Section"), Some("root"))
        .unwrap();
    let _ = session.commit().unwrap();
    bridge.pump();

    let view = bridge.runtime().view();
    assert!(!view.is_placeholder());
    assert_eq!(view.children().len(), 1);
    assert_eq!(view.children()[0].identity().id(), "a");
}

#[test]
fn deep_trees_survive_the_round_trip() {
    let mut bridge = Bridge::new(BridgeConfig::default());
    {
        let session = bridge.session_mut();
        session.begin_pass();
        let mut parent: Option<String> = None;
        for depth in 0..100 {
            let id = format!("s{depth}");
            session
                .register(NodeDescriptor::new(id.clone(), "Section"), parent.as_deref())
                .unwrap();
            parent = Some(id);
        }
        assert!(matches!(session.commit().unwrap(), Commit::Sent { .. }));
    }
    bridge.pump();

    assert!(!bridge.runtime().view().is_placeholder());
    assert_eq!(bridge.runtime().index().len(), 101);
    assert!(bridge.runtime().view().find("s99").is_some());
}
