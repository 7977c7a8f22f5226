use std::collections::HashMap;
use std::rc::Rc;

use super::NodeView;

/// Pluggable per-node render hook, looked up by the model's `type` option
/// and applied at the end of [`NodeView::render`]. An absent or unknown
/// type is a silent no-op.
pub trait NodeType {
    fn apply(&self, view: &NodeView);
}

/// View-layer configuration, passed once at [`TreeView`](super::TreeView)
/// construction and shared by every view in the tree. Replaces the
/// process-wide mutable defaults (icon classes, loading markup, type
/// registry) a widget like this traditionally carries.
#[derive(Clone)]
pub struct ViewConfig {
    /// Collapse-control icon while the node is closed.
    pub expand_icon: String,
    /// Collapse-control icon while the node is open.
    pub collapse_icon: String,
    /// Loading-indicator text.
    pub loading_text: String,
    /// Cells of left padding per nesting level.
    pub indent: u16,
    types: HashMap<String, Rc<dyn NodeType>>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            expand_icon: "▸".to_string(),
            collapse_icon: "▾".to_string(),
            loading_text: "⠿ loading…".to_string(),
            indent: 2,
            types: HashMap::new(),
        }
    }
}

impl ViewConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expand_icon(mut self, icon: impl Into<String>) -> Self {
        self.expand_icon = icon.into();
        self
    }

    pub fn collapse_icon(mut self, icon: impl Into<String>) -> Self {
        self.collapse_icon = icon.into();
        self
    }

    pub fn loading_text(mut self, text: impl Into<String>) -> Self {
        self.loading_text = text.into();
        self
    }

    pub fn indent(mut self, indent: u16) -> Self {
        self.indent = indent;
        self
    }

    /// Register a [`NodeType`] under `name`.
    pub fn with_type(mut self, name: impl Into<String>, handler: impl NodeType + 'static) -> Self {
        self.types.insert(name.into(), Rc::new(handler));
        self
    }

    pub fn type_for(&self, name: &str) -> Option<Rc<dyn NodeType>> {
        self.types.get(name).cloned()
    }
}

impl std::fmt::Debug for ViewConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewConfig")
            .field("expand_icon", &self.expand_icon)
            .field("collapse_icon", &self.collapse_icon)
            .field("loading_text", &self.loading_text)
            .field("indent", &self.indent)
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .finish()
    }
}
