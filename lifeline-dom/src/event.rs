use std::{borrow::Cow, fmt, rc::Rc};

use crate::node::Node;

/// Prefix that marks a property as an event handler, as in `onclick`.
pub const HANDLER_PREFIX: &str = "on";

pub type EventHandler = Rc<dyn Fn(&Event)>;

#[derive(Clone)]
pub struct Event {
    kind: String,
    target: Option<Node>,
    detail: Option<Node>,
}

impl Event {
    pub fn new<K: EventKey>(kind: K) -> Self {
        Self {
            kind: kind.name().to_string(),
            target: None,
            detail: None,
        }
    }

    pub fn with_detail(mut self, node: Node) -> Self {
        self.detail = Some(node);
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The node the event was dispatched on. `None` until dispatched.
    pub fn target(&self) -> Option<&Node> {
        self.target.as_ref()
    }

    pub fn detail(&self) -> Option<&Node> {
        self.detail.as_ref()
    }

    pub(crate) fn set_target(&mut self, node: Node) {
        self.target = Some(node);
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.kind)
            .field("target", &self.target.as_ref().map(Node::node_name))
            .field("detail", &self.detail.as_ref().map(Node::node_name))
            .finish()
    }
}

pub trait EventKey {
    fn name(&self) -> &str;
}

impl EventKey for &str {
    fn name(&self) -> &str {
        self
    }
}

impl EventKey for String {
    fn name(&self) -> &str {
        self
    }
}

impl<'a> EventKey for Cow<'a, str> {
    fn name(&self) -> &str {
        self
    }
}

/// Property key under which a handler for `event` is declared.
pub fn handler_key<K: EventKey>(event: &K) -> String {
    format!("{HANDLER_PREFIX}{}", event.name())
}

/// Inverse of [`handler_key`].
pub fn handler_event(key: &str) -> Option<&str> {
    key.strip_prefix(HANDLER_PREFIX).filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_keys() {
        assert_eq!(handler_key(&"connected"), "onconnected");
        assert_eq!(handler_event("ondisconnected"), Some("disconnected"));
        assert_eq!(handler_event("on"), None);
        assert_eq!(handler_event("class"), None);
    }
}
