use std::{fmt, rc::Rc};

use crate::{error::DomError, node::Node};

/// Per-instance replacement for one of a node's mutation methods.
///
/// Receives the node it was invoked on and the reified call. Use
/// [`Node::invoke_base`] to reach the base implementation.
pub type MethodOverride = Rc<dyn Fn(&Node, Call) -> Result<Node, DomError>>;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Method {
    AppendChild,
    InsertBefore,
    RemoveChild,
}

impl Method {
    pub const ALL: [Self; 3] = [Self::AppendChild, Self::InsertBefore, Self::RemoveChild];

    /// DOM name of the method, also the property key used to override it.
    pub fn name(self) -> &'static str {
        match self {
            Self::AppendChild => "appendChild",
            Self::InsertBefore => "insertBefore",
            Self::RemoveChild => "removeChild",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.name() == name)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Arguments of a single mutation method invocation.
#[derive(Clone, Debug)]
pub struct Call {
    method: Method,
    node: Node,
    reference: Option<Node>,
}

impl Call {
    pub fn append_child(node: Node) -> Self {
        Self {
            method: Method::AppendChild,
            node,
            reference: None,
        }
    }

    pub fn insert_before(node: Node, reference: Option<Node>) -> Self {
        Self {
            method: Method::InsertBefore,
            node,
            reference,
        }
    }

    pub fn remove_child(node: Node) -> Self {
        Self {
            method: Method::RemoveChild,
            node,
            reference: None,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The node being inserted or removed.
    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn reference(&self) -> Option<&Node> {
        self.reference.as_ref()
    }
}
