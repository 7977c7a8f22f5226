pub mod buffer;
pub mod bus;
pub mod dom;
pub mod error;
pub mod event;
pub mod layout;
pub mod model;
pub mod render;
pub mod terminal;
pub mod text;
pub mod types;
pub mod view;

pub use buffer::Buffer;
pub use bus::{Handler, Subscribers};
pub use dom::{dispatch_click, ClickEvent, Dom, ElementId, ElementKind};
pub use error::TreeError;
pub use event::{Click, MouseButton};
pub use layout::{hit_test, Layout, Rect};
pub use model::{options, EventKind, LoadToken, ModelEvent, State, States, TreeNode, Value};
pub use render::render_to_buffer;
pub use terminal::Terminal;
pub use types::{Rgb, Style, TextStyle};
pub use view::{BodyState, NodeSelected, NodeType, NodeView, SelectionController, TreeView, ViewConfig};
