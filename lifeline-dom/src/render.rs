//! Minimal host renderer.
//!
//! Builds [`Node`] trees from [`VNode`] descriptors the way a small
//! hyperscript library does: properties are applied to a node before its
//! children are appended, so `Prop::Method` entries already intercept the
//! node's own child insertions. Children are reconciled by index only.

use std::{any::Any, rc::Rc};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::{
    error::DomError,
    event::{handler_event, handler_key},
    method::Method,
    node::Node,
    vnode::{Element, Prop, Props, VNode},
};

pub type View<S> = Rc<dyn Fn(&S) -> VNode>;

/// Arguments of [`app`].
pub struct AppProps<S> {
    /// Existing node the application takes over.
    pub node: Node,
    pub view: View<S>,
    pub init: S,
    /// Host-specific entries, passed along untouched.
    pub extensions: IndexMap<String, Rc<dyn Any>>,
}

impl<S> AppProps<S> {
    pub fn new<F>(node: Node, view: F, init: S) -> Self
    where
        F: Fn(&S) -> VNode + 'static,
    {
        Self {
            node,
            view: Rc::new(view),
            init,
            extensions: IndexMap::new(),
        }
    }
}

pub fn h<S: Into<String>>(name: S, props: Props, children: Vec<VNode>) -> VNode {
    VNode::Element(Element {
        name: name.into(),
        props,
        children,
    })
}

pub fn text<S: Into<String>>(content: S) -> VNode {
    VNode::Text(content.into())
}

/// Renders `init` through `view` into `node`.
pub fn app<S>(props: AppProps<S>) -> Result<Node, DomError> {
    let vdom = (props.view)(&props.init);
    patch(&props.node, vdom)
}

/// Patches `node` to match `vdom`, returning the node now in its place.
///
/// A node whose lowercased name matches the descriptor's tag is recycled.
/// Otherwise a new node is created and swapped in through the parent's
/// `insert_before` and `remove_child`.
pub fn patch(node: &Node, vdom: VNode) -> Result<Node, DomError> {
    if recyclable(node, &vdom) {
        debug!(node = %node.node_name(), "recycling root");
        update(node, &vdom)?;
        return Ok(node.clone());
    }

    let parent = node.parent().ok_or_else(|| DomError::NoParent {
        node: node.node_name(),
    })?;
    replace(&parent, node, &vdom)
}

/// Creates a detached node tree for `vdom`.
pub fn create(vdom: &VNode) -> Result<Node, DomError> {
    match vdom {
        VNode::Text(content) => Ok(Node::text(content.clone())),
        VNode::Element(element) => {
            let node = Node::element(element.name.clone());
            apply_props(&node, &element.props);
            for child in &element.children {
                node.append_child(&create(child)?)?;
            }
            Ok(node)
        }
    }
}

fn recyclable(node: &Node, vdom: &VNode) -> bool {
    match vdom {
        VNode::Element(element) => {
            node.is_element() && node.node_name().to_lowercase() == element.name
        }
        VNode::Text(_) => !node.is_element(),
    }
}

fn replace(parent: &Node, old: &Node, vdom: &VNode) -> Result<Node, DomError> {
    let new = create(vdom)?;
    parent.insert_before(&new, Some(old))?;
    parent.remove_child(old)?;
    Ok(new)
}

fn update(node: &Node, vdom: &VNode) -> Result<(), DomError> {
    let element = match vdom {
        VNode::Text(content) => {
            if node.text_content().as_deref() != Some(content.as_str()) {
                node.set_text(content.clone());
            }
            return Ok(());
        }
        VNode::Element(element) => element,
    };

    apply_props(node, &element.props);

    let old = node.children();
    for (i, child) in element.children.iter().enumerate() {
        match old.get(i) {
            Some(existing) if recyclable(existing, child) => update(existing, child)?,
            Some(existing) => {
                replace(node, existing, child)?;
            }
            None => {
                node.append_child(&create(child)?)?;
            }
        }
    }
    for surplus in old.iter().skip(element.children.len()) {
        node.remove_child(surplus)?;
    }
    Ok(())
}

fn apply_props(node: &Node, props: &Props) {
    for name in node.attr_names() {
        if !matches!(props.get(&name), Some(Prop::Value(_))) {
            node.remove_attr(&name);
        }
    }
    for event in node.handler_names() {
        if !matches!(props.get(&handler_key(&event)), Some(Prop::Handler(_))) {
            node.set_handler(&event, None);
        }
    }
    for method in Method::ALL {
        if !matches!(props.get(method.name()), Some(Prop::Method(_))) {
            node.clear_override(method);
        }
    }

    for (key, prop) in props {
        match prop {
            Prop::Value(value) => {
                node.set_attr(key.clone(), value.clone());
            }
            Prop::Handler(handler) => match handler_event(key) {
                Some(event) => {
                    node.set_handler(&event, Some(handler.clone()));
                }
                None => warn!(%key, "handler property without `on` prefix ignored"),
            },
            Prop::Method(f) => match Method::from_name(key) {
                Some(method) => {
                    node.set_override(method, f.clone());
                }
                None => warn!(%key, "unknown mutation method property ignored"),
            },
        }
    }
}
