use std::cell::RefCell;
use std::rc::Rc;

use crate::bus::{Handler, Subscribers};
use crate::dom::{dispatch_click, Dom, ElementId};
use crate::layout::{hit_test, Layout};
use crate::model::{State, TreeNode};
use crate::view::config::ViewConfig;
use crate::view::node_view::{NodeView, ViewShared};

/// Root-scoped notification that the tree's selection changed.
#[derive(Debug, Clone)]
pub struct NodeSelected {
    pub selected: TreeNode,
}

#[derive(Default)]
struct SelectionInner {
    selected: Option<TreeNode>,
    subscribers: Subscribers<(), NodeSelected>,
}

/// Records the tree's single selected node and broadcasts changes.
///
/// One controller handle is injected into every view at construction, so
/// a select action anywhere in the tree lands here directly instead of
/// walking parent pointers up to the root.
#[derive(Clone, Default)]
pub struct SelectionController {
    inner: Rc<RefCell<SelectionInner>>,
}

impl SelectionController {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make `node` the selection: clears the `selected` state on the
    /// previous node, sets it on the new one, and fires `nodeSelected`.
    /// Re-selecting the current node re-fires.
    pub fn select(&self, node: &TreeNode) {
        let previous = {
            let mut inner = self.inner.borrow_mut();
            let previous = inner.selected.take();
            inner.selected = Some(node.clone());
            previous
        };
        if let Some(previous) = previous {
            if !previous.ptr_eq(node) {
                previous.set_state(State::Selected, false);
            }
        }
        node.set_state(State::Selected, true);
        log::debug!("node selected: {:?}", node.display_text());

        let handlers = self.inner.borrow().subscribers.handlers_for(&());
        let event = NodeSelected {
            selected: node.clone(),
        };
        for handler in handlers {
            handler(&event);
        }
    }

    pub fn selected(&self) -> Option<TreeNode> {
        self.inner.borrow().selected.clone()
    }

    pub fn on_node_selected(&self, handler: Handler<NodeSelected>) {
        self.inner.borrow_mut().subscribers.on((), handler);
    }

    pub fn off_node_selected(&self, handler: Option<&Handler<NodeSelected>>) {
        self.inner.borrow_mut().subscribers.off(&(), handler);
    }
}

/// A [`NodeView`] specialized to sit at the root: owns the shared element
/// arena and the [`SelectionController`] that terminates selection
/// handling.
pub struct TreeView {
    dom: Rc<RefCell<Dom>>,
    config: Rc<ViewConfig>,
    selection: SelectionController,
    root: NodeView,
}

impl TreeView {
    pub fn new(model: TreeNode, config: ViewConfig) -> Self {
        let dom = Rc::new(RefCell::new(Dom::new()));
        let config = Rc::new(config);
        let selection = SelectionController::new();
        let root = NodeView::new(
            model,
            ViewShared {
                dom: Rc::clone(&dom),
                config: Rc::clone(&config),
                selection: selection.clone(),
            },
        );
        Self {
            dom,
            config,
            selection,
            root,
        }
    }

    /// A tree over a fresh, empty model.
    pub fn empty(config: ViewConfig) -> Self {
        Self::new(TreeNode::new(), config)
    }

    pub fn render(&self) {
        self.root.render();
    }

    pub fn model(&self) -> &TreeNode {
        self.root.model()
    }

    pub fn root(&self) -> &NodeView {
        &self.root
    }

    pub fn root_element(&self) -> ElementId {
        self.root.element()
    }

    /// The shared element arena, for rendering and inspection.
    pub fn dom(&self) -> Rc<RefCell<Dom>> {
        Rc::clone(&self.dom)
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn selected(&self) -> Option<TreeNode> {
        self.selection.selected()
    }

    pub fn on_node_selected(&self, handler: Handler<NodeSelected>) {
        self.selection.on_node_selected(handler);
    }

    /// Hit-test a click from the last rendered layout and dispatch it to
    /// whatever button it lands on. Returns whether anything was hit.
    pub fn click(&self, layout: &Layout, x: u16, y: u16) -> bool {
        let target = {
            let dom = self.dom.borrow();
            hit_test(&dom, layout, self.root.element(), x, y)
        };
        match target {
            Some(id) => {
                log::debug!("click at ({x},{y}) hit {id:?}");
                dispatch_click(&self.dom, id);
                true
            }
            None => false,
        }
    }

    pub fn destroy(&self) {
        self.root.destroy();
    }
}

impl std::fmt::Debug for TreeView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeView")
            .field("root", &self.root)
            .field("selected", &self.selection.selected())
            .finish()
    }
}
