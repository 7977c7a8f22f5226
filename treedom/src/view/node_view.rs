use std::cell::RefCell;
use std::rc::Rc;

use crate::bus::Handler;
use crate::dom::{ClickEvent, Dom, ElementId, ElementKind};
use crate::model::{EventKind, ModelEvent, State, TreeNode};
use crate::types::Style;
use crate::view::config::ViewConfig;
use crate::view::tree_view::SelectionController;

/// The terminal choice for a view's body, derived from the model on every
/// [`NodeView::update_state`]: `Loading` wins over `opened`, `isLeaf`
/// forces `Collapsed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    Loading,
    Collapsed,
    Expanded,
}

/// Everything a view needs besides its model: the shared element arena,
/// the view configuration and the selection controller. Cloned into every
/// child view.
#[derive(Clone)]
pub(crate) struct ViewShared {
    pub dom: Rc<RefCell<Dom>>,
    pub config: Rc<ViewConfig>,
    pub selection: SelectionController,
}

struct ViewInner {
    model: TreeNode,
    shared: ViewShared,
    // Element skeleton:
    //   el (col)
    //     header (row): collapse_btn, label_btn
    //     body (col): loading_el, children_el (indented)
    el: ElementId,
    collapse_btn: ElementId,
    label_btn: ElementId,
    loading_el: ElementId,
    children_el: ElementId,
    children: RefCell<Vec<NodeView>>,
    // Created once so re-binding on re-render dedupes to a no-op, and so
    // destroy can detach exactly these.
    collapse_handler: Handler<ClickEvent>,
    select_handler: Handler<ClickEvent>,
    model_handlers: RefCell<Vec<(EventKind, Handler<ModelEvent>)>>,
}

/// The rendered, interactive representation of one [`TreeNode`].
///
/// A view subscribes to its model at construction and keeps its element
/// subtree and child-view sequence mirroring the model from then on:
/// `stateChanged` refreshes the visuals, children events tear down and
/// rebuild the child views (full rebuild, no diffing — fine for the small
/// trees this widget is for), `childrenCleared` just tears down.
///
/// `NodeView` is a cheap-clone handle; model subscriptions hold only a
/// weak reference back to the view, so dropping the last handle (after
/// [`destroy`](Self::destroy)) actually releases it.
#[derive(Clone)]
pub struct NodeView {
    inner: Rc<ViewInner>,
}

impl NodeView {
    pub(crate) fn new(model: TreeNode, shared: ViewShared) -> Self {
        let (el, collapse_btn, label_btn, loading_el, children_el) = {
            let mut dom = shared.dom.borrow_mut();
            let el = dom.create(ElementKind::Col, "node-view");
            let header = dom.create(ElementKind::Row, "node-header");
            let collapse_btn = dom.create(ElementKind::Button, "node-collapse-icon");
            let label_btn = dom.create(ElementKind::Button, "node-display-text");
            let body = dom.create(ElementKind::Col, "node-body");
            let loading_el = dom.create(ElementKind::Text, "node-loading");
            let children_el = dom.create(ElementKind::Col, "node-children");

            dom.set_text(collapse_btn, shared.config.expand_icon.clone());
            dom.hide(loading_el);
            dom.hide(children_el);
            dom.set_indent(children_el, shared.config.indent);

            dom.append(el, header);
            dom.append(header, collapse_btn);
            dom.append(header, label_btn);
            dom.append(el, body);
            dom.append(body, loading_el);
            dom.append(body, children_el);
            (el, collapse_btn, label_btn, loading_el, children_el)
        };

        let collapse_handler: Handler<ClickEvent> = {
            let model = model.clone();
            Rc::new(move |_| model.toggle_children())
        };
        let select_handler: Handler<ClickEvent> = {
            let model = model.clone();
            let selection = shared.selection.clone();
            Rc::new(move |_| selection.select(&model))
        };

        let view = Self {
            inner: Rc::new(ViewInner {
                model,
                shared,
                el,
                collapse_btn,
                label_btn,
                loading_el,
                children_el,
                children: RefCell::new(Vec::new()),
                collapse_handler,
                select_handler,
                model_handlers: RefCell::new(Vec::new()),
            }),
        };
        view.subscribe_model();
        view
    }

    fn subscribe_model(&self) {
        let subscriptions: [(EventKind, fn(&NodeView)); 4] = [
            (EventKind::StateChanged, |v| v.update_state()),
            (EventKind::ChildrenAdded, |v| v.render_children()),
            (EventKind::ChildRemoved, |v| v.render_children()),
            (EventKind::ChildrenCleared, |v| v.destroy_children()),
        ];
        for (kind, react) in subscriptions {
            let weak = Rc::downgrade(&self.inner);
            let handler: Handler<ModelEvent> = Rc::new(move |_| {
                if let Some(inner) = weak.upgrade() {
                    react(&NodeView { inner });
                }
            });
            self.inner.model.on(kind, handler.clone());
            self.inner.model_handlers.borrow_mut().push((kind, handler));
        }
    }

    pub fn model(&self) -> &TreeNode {
        &self.inner.model
    }

    /// The shared element arena. No borrow is held while the `NodeType`
    /// hook runs, so hook implementations may borrow freely.
    pub fn dom(&self) -> Rc<RefCell<Dom>> {
        Rc::clone(&self.inner.shared.dom)
    }

    /// Root element of this view's subtree.
    pub fn element(&self) -> ElementId {
        self.inner.el
    }

    pub fn collapse_element(&self) -> ElementId {
        self.inner.collapse_btn
    }

    pub fn label_element(&self) -> ElementId {
        self.inner.label_btn
    }

    pub fn loading_element(&self) -> ElementId {
        self.inner.loading_el
    }

    pub fn children_element(&self) -> ElementId {
        self.inner.children_el
    }

    /// Child views, index-aligned with the model's children whenever the
    /// view is rendered.
    pub fn children(&self) -> Vec<NodeView> {
        self.inner.children.borrow().clone()
    }

    /// Full idempotent (re)render: label, children views, visual state,
    /// click bindings (a no-op when already bound), type hook.
    pub fn render(&self) {
        self.render_text();
        self.render_children();
        self.update_state();
        self.attach_events();
        self.update_type();
    }

    fn render_text(&self) {
        let text = self.inner.model.display_text().unwrap_or_default();
        self.inner
            .shared
            .dom
            .borrow_mut()
            .set_text(self.inner.label_btn, text);
    }

    fn attach_events(&self) {
        let mut dom = self.inner.shared.dom.borrow_mut();
        dom.on_click(self.inner.collapse_btn, self.inner.collapse_handler.clone());
        dom.on_click(self.inner.label_btn, self.inner.select_handler.clone());
    }

    fn update_type(&self) {
        let Some(name) = self.inner.model.type_name() else {
            return;
        };
        let Some(handler) = self.inner.shared.config.type_for(&name) else {
            return;
        };
        handler.apply(self);
    }

    /// Tear down and rebuild the child-view sequence from the model's
    /// current children. Leaves render nothing regardless of model
    /// children.
    pub fn render_children(&self) {
        self.destroy_children();
        if self.inner.model.is_leaf() {
            return;
        }
        for child_model in self.inner.model.children() {
            let child = self.create_child_view(child_model);
            child.render();
            self.inner
                .shared
                .dom
                .borrow_mut()
                .append(self.inner.children_el, child.element());
            self.inner.children.borrow_mut().push(child);
        }
    }

    fn create_child_view(&self, model: TreeNode) -> NodeView {
        NodeView::new(model, self.inner.shared.clone())
    }

    /// Derive the current body state from the model.
    pub fn body_state(&self) -> BodyState {
        let model = &self.inner.model;
        if model.state(State::Loading) {
            BodyState::Loading
        } else if model.is_leaf() || !model.state(State::Opened) {
            BodyState::Collapsed
        } else {
            BodyState::Expanded
        }
    }

    /// Refresh the visual facets that depend on model state, without
    /// touching the child views: loading indicator, collapse icon,
    /// children-container visibility, selection styling.
    pub fn update_state(&self) {
        let model = &self.inner.model;
        let config = &self.inner.shared.config;
        let body_state = self.body_state();
        let mut dom = self.inner.shared.dom.borrow_mut();

        // Loading indicator follows `loading` alone, even on leaves.
        if model.state(State::Loading) {
            dom.set_text(self.inner.loading_el, config.loading_text.clone());
            dom.show(self.inner.loading_el);
        } else {
            dom.hide(self.inner.loading_el);
        }

        // Collapse affordance: gone on leaves, icon tracks `opened`.
        if model.is_leaf() {
            dom.hide(self.inner.collapse_btn);
        } else {
            dom.show(self.inner.collapse_btn);
            let icon = if model.state(State::Opened) {
                &config.collapse_icon
            } else {
                &config.expand_icon
            };
            dom.set_text(self.inner.collapse_btn, icon.clone());
        }

        match body_state {
            BodyState::Expanded => dom.show(self.inner.children_el),
            BodyState::Loading | BodyState::Collapsed => dom.hide(self.inner.children_el),
        }

        let label_style = if model.state(State::Selected) {
            Style::new().bold().underline()
        } else {
            Style::new()
        };
        dom.set_style(self.inner.label_btn, label_style);
    }

    /// Recursively destroy every child view and empty the children
    /// container.
    pub fn destroy_children(&self) {
        let children = std::mem::take(&mut *self.inner.children.borrow_mut());
        for child in &children {
            child.destroy();
        }
        self.inner
            .shared
            .dom
            .borrow_mut()
            .empty(self.inner.children_el);
    }

    /// Detach click bindings and model subscriptions, then destroy the
    /// child views. The element subtree itself stays in the arena until
    /// the owning container is emptied or removed.
    pub fn destroy(&self) {
        {
            let mut dom = self.inner.shared.dom.borrow_mut();
            dom.off_click(self.inner.collapse_btn, Some(&self.inner.collapse_handler));
            dom.off_click(self.inner.label_btn, Some(&self.inner.select_handler));
        }
        for (kind, handler) in self.inner.model_handlers.borrow_mut().drain(..) {
            self.inner.model.off(kind, Some(&handler));
        }
        self.destroy_children();
    }
}

impl std::fmt::Debug for NodeView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeView")
            .field("model", &self.inner.model)
            .field("element", &self.inner.el)
            .field("children", &self.inner.children.borrow().len())
            .finish()
    }
}
