mod config;
mod node_view;
mod tree_view;

pub use config::{NodeType, ViewConfig};
pub use node_view::{BodyState, NodeView};
pub use tree_view::{NodeSelected, SelectionController, TreeView};
