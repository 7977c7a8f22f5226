use super::{State, TreeNode, Value};

/// A change notification fired by a [`TreeNode`].
///
/// Dispatch is synchronous and happens after the mutation has been
/// applied, so handlers observe the post-change model.
#[derive(Debug, Clone)]
pub enum ModelEvent {
    /// An option changed via `set`. Carries the prior and new value.
    SettingChanged {
        option: String,
        old: Option<Value>,
        new: Option<Value>,
    },
    /// Children were appended. Always a batch: a scalar `add` fires this
    /// with a one-element vec, `add_all` with the whole batch at once.
    ChildrenAdded { children: Vec<TreeNode> },
    /// A single child was detached via `remove` (or reparented away).
    ChildRemoved { child: TreeNode },
    /// Every child was detached at once via `clear`.
    ChildrenCleared,
    /// A `states` entry changed via `set_state`.
    StateChanged { state: State, value: bool },
}

/// Subscription key for [`ModelEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SettingChanged,
    ChildrenAdded,
    ChildRemoved,
    ChildrenCleared,
    StateChanged,
}

impl ModelEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::SettingChanged { .. } => EventKind::SettingChanged,
            Self::ChildrenAdded { .. } => EventKind::ChildrenAdded,
            Self::ChildRemoved { .. } => EventKind::ChildRemoved,
            Self::ChildrenCleared => EventKind::ChildrenCleared,
            Self::StateChanged { .. } => EventKind::StateChanged,
        }
    }
}
