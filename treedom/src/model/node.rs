use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::bus::{Handler, Subscribers};
use crate::error::TreeError;

use super::{EventKind, ModelEvent, Value};

/// Option keys the view layer knows about. The options map is otherwise
/// an open bag; anything not listed here is carried but never interpreted.
pub mod options {
    /// Label shown in the view. Preferred over [`TEXT`] when both are set.
    pub const DISPLAYED_TEXT: &str = "displayedText";
    /// Fallback label.
    pub const TEXT: &str = "text";
    /// Suppresses the expand affordance and children rendering.
    pub const IS_LEAF: &str = "isLeaf";
    /// Key into the view's `NodeType` registry.
    pub const TYPE: &str = "type";
}

/// The fixed per-node state sub-record. Written through
/// [`TreeNode::set_state`], which fires `StateChanged` on the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct States {
    pub loading: bool,
    pub opened: bool,
    pub selected: bool,
}

/// Key into [`States`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Loading,
    Opened,
    Selected,
}

impl States {
    pub fn get(&self, state: State) -> bool {
        match state {
            State::Loading => self.loading,
            State::Opened => self.opened,
            State::Selected => self.selected,
        }
    }

    fn set(&mut self, state: State, value: bool) {
        match state {
            State::Loading => self.loading = value,
            State::Opened => self.opened = value,
            State::Selected => self.selected = value,
        }
    }
}

#[derive(Default)]
struct NodeInner {
    options: HashMap<String, Value>,
    states: States,
    parent: Weak<RefCell<NodeInner>>,
    children: Vec<TreeNode>,
    subscribers: Subscribers<EventKind, ModelEvent>,
}

/// One node in the tree: an options bag, a [`States`] sub-record, a weak
/// parent back-reference and an ordered children sequence.
///
/// `TreeNode` is a cheap-clone handle; clones address the same node.
/// Children must only be mutated through [`add`](Self::add) /
/// [`remove`](Self::remove) / [`clear`](Self::clear) so parent links stay
/// consistent with membership. Everything is single-threaded and
/// synchronous: mutations apply first, then fire their event to
/// subscribers in registration order.
#[derive(Clone)]
pub struct TreeNode {
    inner: Rc<RefCell<NodeInner>>,
}

impl Default for TreeNode {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeNode {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(NodeInner::default())),
        }
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new().option(options::TEXT, text.into())
    }

    // ------------------------------------------------------------------
    // Builder-style construction. These mutate silently: nothing can be
    // subscribed yet while a node is still being assembled.
    // ------------------------------------------------------------------

    pub fn option(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_silent(&key.into(), value);
        self
    }

    pub fn leaf(self, is_leaf: bool) -> Self {
        self.option(options::IS_LEAF, is_leaf)
    }

    pub fn kind(self, type_name: impl Into<String>) -> Self {
        self.option(options::TYPE, type_name.into())
    }

    pub fn child(self, child: TreeNode) -> Self {
        if let Err(err) = self.add_silent(&child) {
            log::warn!("dropping child during construction: {err}");
        }
        self
    }

    pub fn children_from(self, children: impl IntoIterator<Item = TreeNode>) -> Self {
        children.into_iter().fold(self, Self::child)
    }

    // ------------------------------------------------------------------
    // Options
    // ------------------------------------------------------------------

    pub fn get(&self, option: &str) -> Option<Value> {
        self.inner.borrow().options.get(option).cloned()
    }

    /// Update an option and fire `SettingChanged` with the prior and new
    /// value. Setting a value equal to the current one is a no-op. A `Node`
    /// value is detached from its current parent first, so it is never both
    /// a child and an option value.
    pub fn set(&self, option: &str, value: impl Into<Value>) {
        self.set_with(option, value.into(), false);
    }

    /// [`set`](Self::set) without the event.
    pub fn set_silent(&self, option: &str, value: impl Into<Value>) {
        self.set_with(option, value.into(), true);
    }

    fn set_with(&self, option: &str, value: Value, silent: bool) {
        let (event, old_node, new_node) = {
            let mut inner = self.inner.borrow_mut();
            let old = inner.options.get(option).cloned();
            if old.as_ref() == Some(&value) {
                return;
            }
            let old_node = old.as_ref().and_then(|v| v.as_node().cloned());
            let new_node = value.as_node().cloned();
            inner.options.insert(option.to_string(), value.clone());
            let event = ModelEvent::SettingChanged {
                option: option.to_string(),
                old,
                new: Some(value),
            };
            (event, old_node, new_node)
        };
        // Node-valued options carry a parent link, like children do. A node
        // that still sits under another parent is detached from it first
        // (that parent fires `ChildRemoved`), same as `add`.
        if let Some(node) = old_node {
            node.inner.borrow_mut().parent = Weak::new();
        }
        if let Some(node) = new_node {
            if let Some(previous) = node.parent() {
                previous.remove(&node);
            }
            node.inner.borrow_mut().parent = Rc::downgrade(&self.inner);
        }
        if !silent {
            self.fire(event);
        }
    }

    // ------------------------------------------------------------------
    // Children
    // ------------------------------------------------------------------

    /// Append a child and fire `ChildrenAdded` with a one-element batch.
    ///
    /// A child that already sits under another parent is detached from it
    /// first (that parent fires `ChildRemoved`), so a node is only ever in
    /// one children sequence. Rejects children that would form a cycle.
    pub fn add(&self, child: &TreeNode) -> Result<(), TreeError> {
        self.add_with(child, false)
    }

    /// [`add`](Self::add) without the event.
    pub fn add_silent(&self, child: &TreeNode) -> Result<(), TreeError> {
        self.add_with(child, true)
    }

    fn add_with(&self, child: &TreeNode, silent: bool) -> Result<(), TreeError> {
        self.check_attachable(child)?;
        self.attach(child);
        if !silent {
            self.fire(ModelEvent::ChildrenAdded {
                children: vec![child.clone()],
            });
        }
        Ok(())
    }

    /// Append a batch of children, then fire exactly one aggregate
    /// `ChildrenAdded` carrying the whole batch. Validation runs for every
    /// child before any is attached.
    pub fn add_all(&self, children: &[TreeNode]) -> Result<(), TreeError> {
        for child in children {
            self.check_attachable(child)?;
        }
        for child in children {
            self.attach(child);
        }
        self.fire(ModelEvent::ChildrenAdded {
            children: children.to_vec(),
        });
        Ok(())
    }

    fn check_attachable(&self, child: &TreeNode) -> Result<(), TreeError> {
        let mut cursor = Some(self.clone());
        while let Some(node) = cursor {
            if node.ptr_eq(child) {
                return Err(TreeError::WouldCycle);
            }
            cursor = node.parent();
        }
        Ok(())
    }

    fn attach(&self, child: &TreeNode) {
        if let Some(previous) = child.parent() {
            previous.remove(child);
        }
        child.inner.borrow_mut().parent = Rc::downgrade(&self.inner);
        self.inner.borrow_mut().children.push(child.clone());
    }

    /// Detach `child` and fire `ChildRemoved`. Not-a-child is a no-op.
    pub fn remove(&self, child: &TreeNode) {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            match inner.children.iter().position(|c| c.ptr_eq(child)) {
                Some(index) => {
                    inner.children.remove(index);
                    true
                }
                None => false,
            }
        };
        if !removed {
            return;
        }
        child.inner.borrow_mut().parent = Weak::new();
        self.fire(ModelEvent::ChildRemoved {
            child: child.clone(),
        });
    }

    /// Detach every child at once and fire `ChildrenCleared`.
    pub fn clear(&self) {
        let children = std::mem::take(&mut self.inner.borrow_mut().children);
        for child in &children {
            child.inner.borrow_mut().parent = Weak::new();
        }
        self.fire(ModelEvent::ChildrenCleared);
    }

    pub fn at(&self, index: usize) -> Option<TreeNode> {
        self.inner.borrow().children.get(index).cloned()
    }

    pub fn child_count(&self) -> usize {
        self.inner.borrow().children.len()
    }

    /// Snapshot of the children sequence, in order.
    pub fn children(&self) -> Vec<TreeNode> {
        self.inner.borrow().children.clone()
    }

    pub fn parent(&self) -> Option<TreeNode> {
        let inner = self.inner.borrow().parent.upgrade()?;
        Some(Self { inner })
    }

    /// Handle identity: do both handles address the same node?
    pub fn ptr_eq(&self, other: &TreeNode) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ------------------------------------------------------------------
    // States
    // ------------------------------------------------------------------

    pub fn states(&self) -> States {
        self.inner.borrow().states
    }

    pub fn state(&self, state: State) -> bool {
        self.inner.borrow().states.get(state)
    }

    /// Write into the states sub-record (silently as far as option events
    /// go) and fire `StateChanged` on the node.
    pub fn set_state(&self, state: State, value: bool) {
        self.inner.borrow_mut().states.set(state, value);
        self.fire(ModelEvent::StateChanged { state, value });
    }

    /// Flip the `opened` state.
    pub fn toggle_children(&self) {
        let opened = self.state(State::Opened);
        self.set_state(State::Opened, !opened);
    }

    /// Run an arbitrary-latency external operation. Sets `loading`, hands
    /// the loader a [`LoadToken`], and clears `loading` again when the
    /// token completes. The token only holds a weak reference: completing
    /// after the node was dropped is a no-op.
    pub fn load<F>(&self, loader: F)
    where
        F: FnOnce(LoadToken),
    {
        self.set_state(State::Loading, true);
        loader(LoadToken {
            node: Rc::downgrade(&self.inner),
        });
    }

    // ------------------------------------------------------------------
    // Well-known option accessors
    // ------------------------------------------------------------------

    /// Label for rendering: `displayedText`, falling back to `text`.
    pub fn display_text(&self) -> Option<String> {
        let inner = self.inner.borrow();
        inner
            .options
            .get(options::DISPLAYED_TEXT)
            .or_else(|| inner.options.get(options::TEXT))
            .and_then(|v| v.as_str().map(str::to_string))
    }

    pub fn is_leaf(&self) -> bool {
        self.get(options::IS_LEAF)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn type_name(&self) -> Option<String> {
        self.get(options::TYPE)
            .and_then(|v| v.as_str().map(str::to_string))
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn on(&self, kind: EventKind, handler: Handler<ModelEvent>) {
        self.inner.borrow_mut().subscribers.on(kind, handler);
    }

    pub fn off(&self, kind: EventKind, handler: Option<&Handler<ModelEvent>>) {
        self.inner.borrow_mut().subscribers.off(&kind, handler);
    }

    /// Detach every subscriber. There is nothing else to release: the node
    /// holds no external resources.
    pub fn destroy(&self) {
        self.inner.borrow_mut().subscribers.clear();
    }

    fn fire(&self, event: ModelEvent) {
        // Snapshot before dispatch so handlers can re-enter the node.
        let handlers = self.inner.borrow().subscribers.handlers_for(&event.kind());
        for handler in handlers {
            handler(&event);
        }
    }
}

impl std::fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TreeNode")
            .field("text", &inner.options.get(options::TEXT))
            .field("states", &inner.states)
            .field("children", &inner.children.len())
            .finish()
    }
}

/// Completion callback for [`TreeNode::load`].
pub struct LoadToken {
    node: Weak<RefCell<NodeInner>>,
}

impl LoadToken {
    /// Clear the node's `loading` state. No-op when the node is gone.
    pub fn complete(self) {
        if let Some(inner) = self.node.upgrade() {
            TreeNode { inner }.set_state(State::Loading, false);
        }
    }
}
