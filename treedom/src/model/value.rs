use super::TreeNode;

/// An option value stored on a [`TreeNode`].
///
/// Options are an open-ended key/value bag; the view layer reads a few
/// well-known keys (`displayedText`/`text`, `isLeaf`, `type`) and ignores
/// the rest. A value may itself be a node (nested configuration), in which
/// case the owning node holds a parent link to it.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Text(String),
    Node(TreeNode),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&TreeNode> {
        match self {
            Self::Node(n) => Some(n),
            _ => None,
        }
    }
}

// Node values compare by handle identity: two handles are equal when they
// point at the same node, never by structure.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Node(a), Self::Node(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<TreeNode> for Value {
    fn from(node: TreeNode) -> Self {
        Self::Node(node)
    }
}
