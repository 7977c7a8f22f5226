use std::cell::RefCell;
use std::rc::Rc;

use treedom::{EventKind, ModelEvent, State, TreeError, TreeNode, Value};

type Events = Rc<RefCell<Vec<ModelEvent>>>;

fn record(node: &TreeNode, kind: EventKind) -> Events {
    let events: Events = Rc::default();
    let sink = Rc::clone(&events);
    node.on(kind, Rc::new(move |e| sink.borrow_mut().push(e.clone())));
    events
}

/// Children membership and parent back-references must agree.
fn assert_consistent(parent: &TreeNode) {
    for child in parent.children() {
        let back = child.parent().expect("child has no parent link");
        assert!(back.ptr_eq(parent), "parent link does not match membership");
    }
}

// ============================================================================
// Children sequence
// ============================================================================

#[test]
fn test_add_remove_clear_keep_links_consistent() {
    let root = TreeNode::with_text("root");
    let a = TreeNode::with_text("a");
    let b = TreeNode::with_text("b");
    let c = TreeNode::with_text("c");

    root.add(&a).unwrap();
    root.add(&b).unwrap();
    root.add(&c).unwrap();
    assert_consistent(&root);
    assert_eq!(root.child_count(), 3);

    root.remove(&b);
    assert_consistent(&root);
    assert_eq!(root.child_count(), 2);
    assert!(b.parent().is_none());

    root.clear();
    assert_eq!(root.child_count(), 0);
    assert!(a.parent().is_none());
    assert!(c.parent().is_none());
}

#[test]
fn test_add_preserves_insertion_order() {
    let root = TreeNode::new();
    let a = TreeNode::with_text("a");
    let b = TreeNode::with_text("b");
    root.add(&a).unwrap();
    root.add(&b).unwrap();

    assert!(root.at(0).unwrap().ptr_eq(&a));
    assert!(root.at(1).unwrap().ptr_eq(&b));
    assert!(root.at(2).is_none());
}

#[test]
fn test_add_fires_single_element_batch() {
    let root = TreeNode::new();
    let events = record(&root, EventKind::ChildrenAdded);

    let child = TreeNode::with_text("child");
    root.add(&child).unwrap();

    let events = events.borrow();
    assert_eq!(events.len(), 1);
    match &events[0] {
        ModelEvent::ChildrenAdded { children } => {
            assert_eq!(children.len(), 1);
            assert!(children[0].ptr_eq(&child));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn test_add_all_fires_one_aggregate_event() {
    let root = TreeNode::new();
    let events = record(&root, EventKind::ChildrenAdded);

    let batch = [
        TreeNode::with_text("a"),
        TreeNode::with_text("b"),
        TreeNode::with_text("c"),
    ];
    root.add_all(&batch).unwrap();

    assert_eq!(root.child_count(), 3);
    assert_consistent(&root);
    let events = events.borrow();
    assert_eq!(events.len(), 1, "expected exactly one aggregate event");
    match &events[0] {
        ModelEvent::ChildrenAdded { children } => assert_eq!(children.len(), 3),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn test_add_silent_fires_nothing() {
    let root = TreeNode::new();
    let events = record(&root, EventKind::ChildrenAdded);

    root.add_silent(&TreeNode::with_text("quiet")).unwrap();

    assert!(events.borrow().is_empty());
    assert_eq!(root.child_count(), 1);
}

#[test]
fn test_readding_moves_between_parents() {
    let first = TreeNode::with_text("first");
    let second = TreeNode::with_text("second");
    let child = TreeNode::with_text("child");

    first.add(&child).unwrap();
    let removals = record(&first, EventKind::ChildRemoved);

    second.add(&child).unwrap();

    assert_eq!(first.child_count(), 0, "child must leave the old parent");
    assert_eq!(second.child_count(), 1);
    assert!(child.parent().unwrap().ptr_eq(&second));
    assert_eq!(removals.borrow().len(), 1, "old parent fires childRemoved");
}

#[test]
fn test_add_self_is_rejected() {
    let node = TreeNode::new();
    assert_eq!(node.add(&node), Err(TreeError::WouldCycle));
    assert_eq!(node.child_count(), 0);
}

#[test]
fn test_add_ancestor_is_rejected() {
    let root = TreeNode::new();
    let mid = TreeNode::new();
    let leaf = TreeNode::new();
    root.add(&mid).unwrap();
    mid.add(&leaf).unwrap();

    assert_eq!(leaf.add(&root), Err(TreeError::WouldCycle));
    assert!(root.parent().is_none());
    assert_consistent(&root);
}

#[test]
fn test_add_all_rejects_before_attaching_anything() {
    let root = TreeNode::new();
    let ok = TreeNode::with_text("ok");

    let result = root.add_all(&[ok.clone(), root.clone()]);

    assert_eq!(result, Err(TreeError::WouldCycle));
    assert_eq!(root.child_count(), 0, "validation must run before attach");
    assert!(ok.parent().is_none());
}

#[test]
fn test_remove_non_child_is_noop() {
    let root = TreeNode::new();
    let stranger = TreeNode::new();
    let events = record(&root, EventKind::ChildRemoved);

    root.remove(&stranger);

    assert!(events.borrow().is_empty());
}

#[test]
fn test_clear_fires_children_cleared() {
    let root = TreeNode::new();
    root.add(&TreeNode::new()).unwrap();
    root.add(&TreeNode::new()).unwrap();
    let events = record(&root, EventKind::ChildrenCleared);

    root.clear();

    assert_eq!(events.borrow().len(), 1);
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn test_set_same_value_fires_nothing() {
    let node = TreeNode::new();
    node.set("label", "x");
    let events = record(&node, EventKind::SettingChanged);

    node.set("label", "x");

    assert!(events.borrow().is_empty());
}

#[test]
fn test_set_new_value_fires_old_and_new() {
    let node = TreeNode::new();
    node.set("label", "before");
    let events = record(&node, EventKind::SettingChanged);

    node.set("label", "after");

    let events = events.borrow();
    assert_eq!(events.len(), 1);
    match &events[0] {
        ModelEvent::SettingChanged { option, old, new } => {
            assert_eq!(option, "label");
            assert_eq!(old.as_ref().and_then(|v| v.as_str()), Some("before"));
            assert_eq!(new.as_ref().and_then(|v| v.as_str()), Some("after"));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn test_set_silent_updates_without_event() {
    let node = TreeNode::new();
    let events = record(&node, EventKind::SettingChanged);

    node.set_silent("label", "quiet");

    assert!(events.borrow().is_empty());
    assert_eq!(node.get("label").and_then(|v| v.as_str().map(String::from)), Some("quiet".into()));
}

#[test]
fn test_node_valued_option_carries_parent_link() {
    let node = TreeNode::new();
    let first = TreeNode::with_text("first");
    let second = TreeNode::with_text("second");

    node.set("config", first.clone());
    assert!(first.parent().unwrap().ptr_eq(&node));

    node.set("config", second.clone());
    assert!(first.parent().is_none(), "replaced node loses its parent");
    assert!(second.parent().unwrap().ptr_eq(&node));
}

#[test]
fn test_set_node_value_detaches_from_previous_parent() {
    let root = TreeNode::with_text("root");
    let a = TreeNode::with_text("a");
    root.add(&a).unwrap();

    let removals = record(&root, EventKind::ChildRemoved);
    let holder = TreeNode::with_text("holder");
    holder.set("config", a.clone());

    assert_eq!(root.child_count(), 0, "a left root's children");
    assert!(a.parent().unwrap().ptr_eq(&holder));
    assert_eq!(removals.borrow().len(), 1);
    assert_consistent(&root);
}

#[test]
fn test_missing_option_reads_as_none() {
    let node = TreeNode::new();
    assert!(node.get("absent").is_none());
    assert!(!node.is_leaf());
    assert!(node.display_text().is_none());
}

#[test]
fn test_display_text_prefers_displayed_text() {
    let node = TreeNode::new()
        .option(treedom::options::TEXT, "fallback")
        .option(treedom::options::DISPLAYED_TEXT, "shown");
    assert_eq!(node.display_text().as_deref(), Some("shown"));
}

#[test]
fn test_value_node_equality_is_identity() {
    let a = TreeNode::with_text("same");
    let b = TreeNode::with_text("same");
    assert_ne!(Value::from(a.clone()), Value::from(b));
    assert_eq!(Value::from(a.clone()), Value::from(a));
}

// ============================================================================
// States
// ============================================================================

#[test]
fn test_set_state_fires_state_changed_only() {
    let node = TreeNode::new();
    let state_events = record(&node, EventKind::StateChanged);
    let setting_events = record(&node, EventKind::SettingChanged);

    node.set_state(State::Opened, true);

    assert!(node.state(State::Opened));
    assert_eq!(state_events.borrow().len(), 1);
    match &state_events.borrow()[0] {
        ModelEvent::StateChanged { state, value } => {
            assert_eq!(*state, State::Opened);
            assert!(*value);
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(
        setting_events.borrow().is_empty(),
        "state writes are silent at the option level"
    );
}

#[test]
fn test_toggle_children_flips_opened() {
    let node = TreeNode::new();
    assert!(!node.state(State::Opened));
    node.toggle_children();
    assert!(node.state(State::Opened));
    node.toggle_children();
    assert!(!node.state(State::Opened));
}

#[test]
fn test_load_sets_and_clears_loading() {
    let node = TreeNode::new();
    let mut token = None;
    node.load(|t| token = Some(t));

    assert!(node.state(State::Loading));
    token.unwrap().complete();
    assert!(!node.state(State::Loading));
}

#[test]
fn test_load_completion_after_drop_is_noop() {
    let node = TreeNode::new();
    let mut token = None;
    node.load(|t| token = Some(t));
    drop(node);

    // Late completion on a dropped model must not panic.
    token.unwrap().complete();
}

// ============================================================================
// Subscriptions
// ============================================================================

#[test]
fn test_destroy_detaches_listeners() {
    let node = TreeNode::new();
    let events = record(&node, EventKind::StateChanged);

    node.destroy();
    node.set_state(State::Opened, true);

    assert!(events.borrow().is_empty());
}

#[test]
fn test_handler_may_reenter_the_node() {
    let node = TreeNode::new();
    let observed: Rc<RefCell<Vec<usize>>> = Rc::default();
    let sink = Rc::clone(&observed);
    let probe = node.clone();
    node.on(
        EventKind::ChildrenAdded,
        Rc::new(move |_| sink.borrow_mut().push(probe.child_count())),
    );

    node.add(&TreeNode::new()).unwrap();
    node.add(&TreeNode::new()).unwrap();

    // Handlers observe the post-mutation model.
    assert_eq!(*observed.borrow(), vec![1, 2]);
}
