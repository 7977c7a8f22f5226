use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::bus::{Handler, Subscribers};
use crate::types::Style;

/// Arena handle for one element. Ids are monotonically increasing and
/// never reused, so a stale handle resolves to nothing rather than to a
/// new element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Stacks visible children top to bottom.
    Col,
    /// Lays visible children out left to right on one line.
    Row,
    /// A text run.
    Text,
    /// A text run that participates in hit testing.
    Button,
}

/// One retained element. Mutated exclusively through [`Dom`] so the
/// parent/children links stay consistent.
#[derive(Debug, Clone)]
pub struct ElementNode {
    pub kind: ElementKind,
    /// Diagnostic tag ("node-header", "node-children", ...). Not
    /// interpreted by the renderer.
    pub class: String,
    pub text: String,
    pub visible: bool,
    /// Left padding in cells, applied to this element's children. Used
    /// for tree nesting.
    pub indent: u16,
    pub style: Style,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

/// Payload delivered to click handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    pub target: ElementId,
}

/// A retained element tree plus its click-handler registry.
///
/// This is the widget's stand-in for a DOM collaborator: element creation,
/// attach/detach, text, visibility, styling and event binding. Removing an
/// element always removes its subtree and every click binding under it, so
/// handlers cannot outlive their element.
pub struct Dom {
    next_id: u64,
    nodes: HashMap<ElementId, ElementNode>,
    clicks: Subscribers<ElementId, ClickEvent>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            nodes: HashMap::new(),
            clicks: Subscribers::new(),
        }
    }

    pub fn create(&mut self, kind: ElementKind, class: impl Into<String>) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            ElementNode {
                kind,
                class: class.into(),
                text: String::new(),
                visible: true,
                indent: 0,
                style: Style::default(),
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&ElementNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ------------------------------------------------------------------
    // Tree structure
    // ------------------------------------------------------------------

    /// Append `child` under `parent`, detaching it from any previous
    /// parent first.
    pub fn append(&mut self, parent: ElementId, child: ElementId) {
        if !self.nodes.contains_key(&parent) || !self.nodes.contains_key(&child) {
            return;
        }
        self.detach(child);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
    }

    /// Unlink `id` from its parent without removing it from the arena.
    pub fn detach(&mut self, id: ElementId) {
        let Some(parent) = self.nodes.get(&id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.retain(|c| *c != id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
    }

    /// Remove `id` and its whole subtree, dropping every click binding
    /// under it.
    pub fn remove(&mut self, id: ElementId) {
        self.detach(id);
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                pending.extend(node.children);
            }
            self.clicks.off(&current, None);
        }
    }

    /// Remove every child of `id` (and their subtrees).
    pub fn empty(&mut self, id: ElementId) {
        for child in self.children_of(id) {
            self.remove(child);
        }
    }

    pub fn children_of(&self, id: ElementId) -> Vec<ElementId> {
        self.nodes
            .get(&id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn parent_of(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(&id)?.parent
    }

    // ------------------------------------------------------------------
    // Element attributes
    // ------------------------------------------------------------------

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.text = text.into();
        }
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.nodes.get(&id).map(|n| n.text.as_str())
    }

    pub fn show(&mut self, id: ElementId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visible = true;
        }
    }

    pub fn hide(&mut self, id: ElementId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visible = false;
        }
    }

    pub fn is_visible(&self, id: ElementId) -> bool {
        self.nodes.get(&id).is_some_and(|n| n.visible)
    }

    pub fn set_style(&mut self, id: ElementId, style: Style) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.style = style;
        }
    }

    pub fn set_indent(&mut self, id: ElementId, indent: u16) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.indent = indent;
        }
    }

    pub fn class_of(&self, id: ElementId) -> Option<&str> {
        self.nodes.get(&id).map(|n| n.class.as_str())
    }

    // ------------------------------------------------------------------
    // Click bindings
    // ------------------------------------------------------------------

    pub fn on_click(&mut self, id: ElementId, handler: Handler<ClickEvent>) {
        self.clicks.on(id, handler);
    }

    pub fn off_click(&mut self, id: ElementId, handler: Option<&Handler<ClickEvent>>) {
        self.clicks.off(&id, handler);
    }

    /// Snapshot of the click handlers bound to `id`, for dispatch after
    /// releasing any interior borrow of the arena.
    pub fn click_handlers(&self, id: ElementId) -> Vec<Handler<ClickEvent>> {
        self.clicks.handlers_for(&id)
    }
}

/// Fire the click handlers bound to `target`.
///
/// Takes the shared arena handle rather than a borrow: handlers mutate the
/// arena (toggling state re-renders synchronously), so the snapshot must be
/// taken and the borrow released before dispatch.
pub fn dispatch_click(dom: &Rc<RefCell<Dom>>, target: ElementId) {
    let handlers = dom.borrow().click_handlers(target);
    let event = ClickEvent { target };
    for handler in handlers {
        handler(&event);
    }
}
