use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    mem,
    rc::{Rc, Weak},
    thread_local,
};

use indexmap::IndexMap;
use tracing::trace;

use crate::{
    error::DomError,
    event::{Event, EventHandler, EventKey},
    method::{Call, Method, MethodOverride},
};

/// A DOM-like node.
///
/// The three mutation methods ([`append_child`](Self::append_child),
/// [`insert_before`](Self::insert_before), [`remove_child`](Self::remove_child))
/// first consult the node's own override slot for that method and only fall
/// back to the base implementation when the slot is empty. Overrides reach the
/// base implementation through [`invoke_base`](Self::invoke_base).
#[derive(Clone)]
pub struct Node(Rc<RefCell<Inner>>);

type WeakNode = Weak<RefCell<Inner>>;

struct Inner {
    parent: Option<WeakNode>,
    kind: NodeKind,
    overrides: HashMap<Method, MethodOverride>,
    handlers: IndexMap<String, EventHandler>,
    listeners: Vec<Listener>,
}

enum NodeKind {
    Element {
        name: String,
        attrs: IndexMap<String, String>,
        children: Vec<Node>,
    },
    Text(String),
}

struct Listener {
    id: ListenerId,
    kind: String,
    handler: EventHandler,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ListenerId(u64);

impl Node {
    fn new(kind: NodeKind) -> Self {
        let inner = Inner {
            parent: None,
            kind,
            overrides: HashMap::new(),
            handlers: IndexMap::new(),
            listeners: vec![],
        };
        Self(Rc::new(RefCell::new(inner)))
    }

    pub fn element<S: Into<String>>(name: S) -> Self {
        Self::new(NodeKind::Element {
            name: name.into(),
            attrs: IndexMap::new(),
            children: vec![],
        })
    }

    pub fn text<S: Into<String>>(content: S) -> Self {
        Self::new(NodeKind::Text(content.into()))
    }

    // Tree //

    /// Uppercase tag name for elements, `#text` for text nodes.
    pub fn node_name(&self) -> String {
        match &self.0.borrow().kind {
            NodeKind::Element { name, .. } => name.to_uppercase(),
            NodeKind::Text(_) => "#text".to_string(),
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.0.borrow().kind, NodeKind::Element { .. })
    }

    pub fn parent(&self) -> Option<Self> {
        self.0
            .borrow()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Node)
    }

    /// Children of an element; always empty for text nodes.
    pub fn children(&self) -> Vec<Self> {
        self.with_children(|children| children.clone())
            .unwrap_or_default()
    }

    pub fn first_child(&self) -> Option<Self> {
        self.with_children(|children| children.first().cloned())
            .flatten()
    }

    pub fn next_sibling(&self) -> Option<Self> {
        self.parent()?
            .with_children(|siblings| {
                let idx = siblings.iter().position(|node| node == self)?;
                siblings.get(idx + 1).cloned()
            })
            .flatten()
    }

    /// Whether `other` is `self` or one of its descendants.
    pub fn contains(&self, other: &Self) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if &node == self {
                return true;
            }
            current = node.parent();
        }
        false
    }

    // Text //

    pub fn text_content(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Text(content) => Some(content.clone()),
            NodeKind::Element { .. } => None,
        }
    }

    /// Replaces the content of a text node, returning the previous content.
    ///
    /// Elements have no text of their own; for them this does nothing and
    /// returns `None`.
    pub fn set_text<S: Into<String>>(&self, value: S) -> Option<String> {
        match &mut self.0.borrow_mut().kind {
            NodeKind::Text(content) => Some(mem::replace(content, value.into())),
            NodeKind::Element { .. } => None,
        }
    }

    // Attributes //

    pub fn attr(&self, key: &str) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { attrs, .. } => attrs.get(key).cloned(),
            NodeKind::Text(_) => None,
        }
    }

    /// Sets an attribute, returning its previous value. Ignored on text nodes.
    pub fn set_attr<K: Into<String>, V: Into<String>>(&self, key: K, value: V) -> Option<String> {
        match &mut self.0.borrow_mut().kind {
            NodeKind::Element { attrs, .. } => attrs.insert(key.into(), value.into()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn remove_attr(&self, key: &str) -> Option<String> {
        match &mut self.0.borrow_mut().kind {
            NodeKind::Element { attrs, .. } => attrs.shift_remove(key),
            NodeKind::Text(_) => None,
        }
    }

    pub fn attr_names(&self) -> Vec<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { attrs, .. } => attrs.keys().cloned().collect(),
            NodeKind::Text(_) => vec![],
        }
    }

    // Mutation Methods //

    pub fn append_child(&self, child: &Self) -> Result<Self, DomError> {
        self.invoke(Call::append_child(child.clone()))
    }

    /// Inserts `child` before `reference`, or last when `reference` is `None`.
    pub fn insert_before(&self, child: &Self, reference: Option<&Self>) -> Result<Self, DomError> {
        self.invoke(Call::insert_before(child.clone(), reference.cloned()))
    }

    pub fn remove_child(&self, child: &Self) -> Result<Self, DomError> {
        self.invoke(Call::remove_child(child.clone()))
    }

    /// Runs `call` through this node's override for the method, if any.
    pub fn invoke(&self, call: Call) -> Result<Self, DomError> {
        let slot = self.0.borrow().overrides.get(&call.method()).cloned();
        match slot {
            Some(f) => f(self, call),
            None => self.invoke_base(call),
        }
    }

    /// Runs `call` with the base implementation, ignoring any override.
    ///
    /// The base implementation is looked up when this is called, so overrides
    /// installed later on other nodes never change what it does.
    pub fn invoke_base(&self, call: Call) -> Result<Self, DomError> {
        trace!(
            method = %call.method(),
            parent = %self.node_name(),
            node = %call.node().node_name(),
            "base mutation"
        );
        match call.method() {
            Method::AppendChild => self.base_insert(call.node(), None),
            Method::InsertBefore => self.base_insert(call.node(), call.reference()),
            Method::RemoveChild => self.base_remove(call.node()),
        }
    }

    /// Replaces the override for `method`, returning the previous one.
    pub fn set_override(&self, method: Method, f: MethodOverride) -> Option<MethodOverride> {
        self.0.borrow_mut().overrides.insert(method, f)
    }

    pub fn clear_override(&self, method: Method) -> Option<MethodOverride> {
        self.0.borrow_mut().overrides.remove(&method)
    }

    pub fn has_override(&self, method: Method) -> bool {
        self.0.borrow().overrides.contains_key(&method)
    }

    // Events //

    /// Sets the single property handler for `event`, as `node.onclick = f`
    /// would. Passing `None` clears it.
    pub fn set_handler<K: EventKey>(
        &self,
        event: &K,
        handler: Option<EventHandler>,
    ) -> Option<EventHandler> {
        let mut inner = self.0.borrow_mut();
        match handler {
            Some(handler) => inner.handlers.insert(event.name().to_string(), handler),
            None => inner.handlers.shift_remove(event.name()),
        }
    }

    pub fn handler<K: EventKey>(&self, event: &K) -> Option<EventHandler> {
        self.0.borrow().handlers.get(event.name()).cloned()
    }

    pub fn handler_names(&self) -> Vec<String> {
        self.0.borrow().handlers.keys().cloned().collect()
    }

    pub fn add_event_listener<K, F>(&self, event: &K, f: F) -> ListenerId
    where
        K: EventKey,
        F: Fn(&Event) + 'static,
    {
        thread_local!(static ID: Cell<u64> = const { Cell::new(0) });
        let id = ListenerId(ID.replace(ID.get() + 1));

        self.0.borrow_mut().listeners.push(Listener {
            id,
            kind: event.name().to_string(),
            handler: Rc::new(f),
        });
        id
    }

    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut inner = self.0.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|listener| listener.id != id);
        inner.listeners.len() != before
    }

    /// Dispatches `event` with `self` as its target. Events do not bubble.
    ///
    /// Returns the number of handlers invoked.
    pub fn dispatch_event(&self, mut event: Event) -> usize {
        event.set_target(self.clone());

        let handlers = {
            let inner = self.0.borrow();
            inner
                .handlers
                .get(event.kind())
                .cloned()
                .into_iter()
                .chain(
                    inner
                        .listeners
                        .iter()
                        .filter(|listener| listener.kind == event.kind())
                        .map(|listener| listener.handler.clone()),
                )
                .collect::<Vec<_>>()
        };

        trace!(event = event.kind(), target = %self.node_name(), handlers = handlers.len(), "dispatch");
        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    // Internal //

    /// Runs `f` on the child list; `None` for text nodes.
    fn with_children<R>(&self, f: impl FnOnce(&mut Vec<Self>) -> R) -> Option<R> {
        match &mut self.0.borrow_mut().kind {
            NodeKind::Element { children, .. } => Some(f(children)),
            NodeKind::Text(_) => None,
        }
    }

    fn base_insert(&self, child: &Self, reference: Option<&Self>) -> Result<Self, DomError> {
        if !self.is_element() {
            return Err(self.hierarchy_error("node cannot have children"));
        }
        if child.contains(self) {
            return Err(self.hierarchy_error("node is an inclusive ancestor of the parent"));
        }
        if let Some(reference) = reference {
            if reference.parent().as_ref() != Some(self) {
                return Err(self.not_found(reference));
            }
        }

        // inserting a node before itself keeps it in place
        let reference = match reference {
            Some(reference) if reference == child => child.next_sibling(),
            other => other.cloned(),
        };

        child.detach();

        let inserted = self.with_children(|children| {
            let index = match &reference {
                Some(reference) => children.iter().position(|node| node == reference)?,
                None => children.len(),
            };
            children.insert(index, child.clone());
            Some(())
        });
        if inserted.flatten().is_none() {
            return Err(self.hierarchy_error("node cannot have children"));
        }
        child.0.borrow_mut().parent = Some(Rc::downgrade(&self.0));

        Ok(child.clone())
    }

    fn base_remove(&self, child: &Self) -> Result<Self, DomError> {
        if child.parent().as_ref() != Some(self) {
            return Err(self.not_found(child));
        }
        child.detach();
        Ok(child.clone())
    }

    fn detach(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        parent.with_children(|children| children.retain(|node| node != self));
        self.0.borrow_mut().parent = None;
    }

    fn hierarchy_error(&self, reason: &'static str) -> DomError {
        DomError::HierarchyRequest {
            parent: self.node_name(),
            reason,
        }
    }

    fn not_found(&self, node: &Self) -> DomError {
        DomError::NotFound {
            parent: self.node_name(),
            node: node.node_name(),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Node").field(&self.node_name()).finish()
    }
}
