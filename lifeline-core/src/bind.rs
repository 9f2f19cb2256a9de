use bitflags::bitflags;
use lifeline_dom::{DomError, Method, Node, Prop, Props, VNode};
use tracing::{debug, trace};

use crate::{
    config::{Binding, EventKind},
    lifecycle::Lifecycle,
};

bitflags! {
    /// Mutation methods a descriptor gets interceptors for.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct Hooks: u8 {
        const APPEND_CHILD = 0b001;
        const INSERT_BEFORE = 0b010;
        const REMOVE_CHILD = 0b100;

        const CONNECTED = Self::APPEND_CHILD.bits() | Self::INSERT_BEFORE.bits();
        const DISCONNECTED = Self::REMOVE_CHILD.bits();
    }
}

impl Hooks {
    pub fn method(method: Method) -> Self {
        match method {
            Method::AppendChild => Self::APPEND_CHILD,
            Method::InsertBefore => Self::INSERT_BEFORE,
            Method::RemoveChild => Self::REMOVE_CHILD,
        }
    }

    pub fn methods(self) -> impl Iterator<Item = Method> {
        Method::ALL
            .into_iter()
            .filter(move |method| self.contains(Self::method(*method)))
    }
}

impl Lifecycle {
    /// Intercepts all three mutation methods of the root's parent.
    ///
    /// Binding the same parent again replaces the previous interceptors.
    pub fn bind_root(&self, parent: &Node) {
        debug!(parent = %parent.node_name(), "binding root parent");
        for method in Method::ALL {
            parent.set_override(method, self.intercept(method, EventKind::for_method(method)));
        }
    }

    /// Interceptors `vnode` needs, given the handlers it declares.
    pub fn hooks(&self, vnode: &VNode) -> Hooks {
        if !matches!(vnode, VNode::Element(_)) {
            return Hooks::empty();
        }
        if self.config().binding == Binding::Unconditional {
            return Hooks::all();
        }

        let mut hooks = Hooks::empty();
        if vnode.declares(&self.event_name(EventKind::Connected)) {
            hooks |= Hooks::CONNECTED;
        }
        if vnode.declares(&self.event_name(EventKind::Disconnected)) {
            hooks |= Hooks::DISCONNECTED;
        }
        hooks
    }

    /// Adds interceptor entries to the descriptor's props.
    ///
    /// Entries the descriptor already has under a method's key are kept.
    pub fn bind_node(&self, vnode: VNode) -> VNode {
        let hooks = self.hooks(&vnode);
        let mut element = match vnode {
            VNode::Element(element) if !hooks.is_empty() => element,
            other => return other,
        };

        let mut props = Props::with_capacity(element.props.len() + 3);
        for method in hooks.methods() {
            let f = self.intercept(method, EventKind::for_method(method));
            props.insert(method.name().to_string(), Prop::Method(f));
        }
        props.extend(element.props);
        element.props = props;

        trace!(name = %element.name, ?hooks, "node bound");
        VNode::Element(element)
    }

    /// [`bind_node`](Self::bind_node) applied to `vnode` and all of its
    /// descendants.
    pub fn bind_tree(&self, vnode: VNode) -> VNode {
        match vnode {
            VNode::Element(mut element) => {
                element.children = element
                    .children
                    .into_iter()
                    .map(|child| self.bind_tree(child))
                    .collect();
                self.bind_node(VNode::Element(element))
            }
            text => text,
        }
    }

    /// Binds the parent of `node`, runs `mount`, then announces `node` when
    /// the host recycled it instead of inserting a new root.
    pub(crate) fn mount_root<F>(
        &self,
        node: &Node,
        name: Option<&str>,
        mount: F,
    ) -> Result<Node, DomError>
    where
        F: FnOnce() -> Result<Node, DomError>,
    {
        let parent = node.parent().ok_or_else(|| DomError::NoParent {
            node: node.node_name(),
        })?;
        self.bind_root(&parent);

        let mounted = mount()?;

        // a recycled root triggers no insertion on the parent
        if name.is_some_and(|name| name == node.node_name().to_lowercase()) {
            debug!(node = %node.node_name(), "root recycled");
            self.notify(node, EventKind::Connected);
        }
        Ok(mounted)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use lifeline_dom::{props, render::h, Call, Event};

    use super::*;
    use crate::{config::Config, schedule::LocalLoop};

    fn setup(config: Config) -> (Lifecycle, Rc<LocalLoop>) {
        let event_loop = Rc::new(LocalLoop::new());
        let lifecycle = Lifecycle::new(config, event_loop.clone()).unwrap();
        (lifecycle, event_loop)
    }

    fn method_keys(vnode: &VNode) -> Vec<&str> {
        vnode
            .props()
            .into_iter()
            .flatten()
            .filter(|(_, prop)| matches!(prop, Prop::Method(_)))
            .map(|(key, _)| key.as_str())
            .collect()
    }

    fn noop() -> Prop {
        Prop::handler(|_: &Event| {})
    }

    #[test]
    fn bind_root_once() {
        let (lifecycle, event_loop) = setup(Config::default());
        let body = Node::element("body");
        lifecycle.bind_root(&body);
        lifecycle.bind_root(&body);

        let child = Node::element("div");
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        child.add_event_listener(&"connected", move |_| c.set(c.get() + 1));

        body.append_child(&child).unwrap();
        event_loop.run_until_idle();
        assert_eq!(count.get(), 1);

        for method in Method::ALL {
            assert!(body.has_override(method));
        }
    }

    #[test]
    fn selective_binding() {
        let (lifecycle, _event_loop) = setup(Config::default());

        let plain = lifecycle.bind_node(h("p", props! { "class" => "x" }, vec![]));
        assert!(method_keys(&plain).is_empty());

        let mut props = props!();
        props.insert("onconnected".to_string(), noop());
        let connected = lifecycle.bind_node(h("p", props, vec![]));
        assert_eq!(method_keys(&connected), ["appendChild", "insertBefore"]);

        let mut props = props!();
        props.insert("ondisconnected".to_string(), noop());
        let disconnected = lifecycle.bind_node(h("p", props, vec![]));
        assert_eq!(method_keys(&disconnected), ["removeChild"]);

        let text = lifecycle.bind_node(VNode::from("hi"));
        assert!(text.props().is_none());
    }

    #[test]
    fn unconditional_binding() {
        let (lifecycle, _event_loop) =
            setup(Config::new().binding(Binding::Unconditional));
        let vnode = lifecycle.bind_node(h("p", props!(), vec![]));
        assert_eq!(method_keys(&vnode), ["appendChild", "insertBefore", "removeChild"]);
    }

    #[test]
    fn declared_entries_win() {
        let (lifecycle, _event_loop) = setup(Config::default());
        let calls = Rc::new(Cell::new(0));

        let c = calls.clone();
        let mut props = props! { "id" => "list" };
        props.insert("onconnected".to_string(), noop());
        props.insert(
            "appendChild".to_string(),
            Prop::Method(Rc::new(move |this: &Node, call: Call| {
                c.set(c.get() + 1);
                this.invoke_base(call)
            })),
        );

        let vnode = lifecycle.bind_node(h("ul", props, vec![]));
        let node = lifeline_dom::render::create(&vnode).unwrap();
        node.append_child(&Node::element("li")).unwrap();
        assert_eq!(calls.get(), 1);

        // rebinding keeps the entries from the first pass
        let rebound = lifecycle.bind_node(vnode.clone());
        assert_eq!(method_keys(&rebound), method_keys(&vnode));
    }

    #[test]
    fn custom_event_names() {
        let (lifecycle, _event_loop) = setup(Config::new().events("mounted", "unmounted"));

        let mut props = props!();
        props.insert("onconnected".to_string(), noop());
        assert!(lifecycle.hooks(&h("p", props, vec![])).is_empty());

        let mut props = props!();
        props.insert("onunmounted".to_string(), noop());
        assert_eq!(lifecycle.hooks(&h("p", props, vec![])), Hooks::DISCONNECTED);
    }

    #[test]
    fn bind_whole_tree() {
        let (lifecycle, _event_loop) = setup(Config::default());
        let mut props = props!();
        props.insert("onconnected".to_string(), noop());

        let tree = h(
            "ul",
            props!(),
            vec![h("li", props, vec![]), VNode::from("text")],
        );
        let bound = lifecycle.bind_tree(tree);
        assert!(method_keys(&bound).is_empty());
        assert_eq!(
            method_keys(&bound.children()[0]),
            ["appendChild", "insertBefore"]
        );
    }
}
