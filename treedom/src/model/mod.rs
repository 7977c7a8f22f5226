mod event;
mod node;
mod value;

pub use event::{EventKind, ModelEvent};
pub use node::{options, LoadToken, State, States, TreeNode};
pub use value::Value;
