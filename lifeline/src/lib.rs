//! Lifecycle events for virtual-DOM hosts.
//!
//! See [`Lifecycle`] for the mechanism and [`lifeline_dom::render`] for the
//! bundled host renderer.

#![warn(clippy::use_self)]

pub use lifeline_core::*;
pub use lifeline_dom::{
    props, render, Call, DomError, Event, EventHandler, Method, MethodOverride, Node, Prop, Props,
    VNode,
};

pub mod prelude {
    pub use lifeline_core::{
        Binding, BrowserLoop, Config, EventKind, Exports, HostModule, Lifecycle, LocalLoop,
        Payload,
    };
    pub use lifeline_dom::{
        props,
        render::{text, AppProps},
        Event, Node, Prop, VNode,
    };
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use crate::prelude::*;

    type Log = Rc<RefCell<Vec<Node>>>;

    fn logger(log: &Log) -> Prop {
        let log = log.clone();
        Prop::handler(move |ev: &Event| log.borrow_mut().extend(ev.target().cloned()))
    }

    struct Todo {
        items: Vec<&'static str>,
    }

    #[test]
    fn removed_item_disconnects() {
        let event_loop = Rc::new(LocalLoop::new());
        let lifecycle = Lifecycle::new(Config::default(), event_loop.clone()).unwrap();
        let exports = lifecycle.wrap(HostModule::<Todo>::reference(), false);

        let connected = Log::default();
        let disconnected = Log::default();
        let view = {
            let h = exports.h.clone();
            let (c, d) = (connected.clone(), disconnected.clone());
            move |todo: &Todo| {
                let items = todo
                    .items
                    .iter()
                    .map(|item| {
                        let mut props = props! { "class" => "item" };
                        props.insert("onconnected".to_string(), logger(&c));
                        props.insert("ondisconnected".to_string(), logger(&d));
                        h("li", props, vec![text(*item)])
                    })
                    .collect();

                // the list announces what enters and leaves it
                let mut props = props!();
                props.insert("onconnected".to_string(), logger(&c));
                props.insert("ondisconnected".to_string(), logger(&d));
                h("ul", props, items)
            }
        };

        let body = Node::element("body");
        let root = Node::element("div");
        body.append_child(&root).unwrap();

        let app = exports.app.clone().unwrap();
        let list = app(AppProps::new(root, view.clone(), Todo { items: vec!["a", "b"] })).unwrap();
        let items = list.children();
        event_loop.run_until_idle();

        let mut expected = items.clone();
        expected.push(list.clone());
        assert_eq!(*connected.borrow(), expected);
        assert!(disconnected.borrow().is_empty());
        connected.borrow_mut().clear();

        let patch = exports.patch.clone().unwrap();
        let same = patch(&list, view(&Todo { items: vec!["a"] })).unwrap();
        assert_eq!(same, list);
        assert_eq!(list.children(), vec![items[0].clone()]);

        // nothing fires before the next tick
        assert!(disconnected.borrow().is_empty());
        event_loop.run_until_idle();

        // recycling the list announces it again, the removal announces the item
        assert_eq!(*disconnected.borrow(), [items[1].clone()]);
        assert_eq!(*connected.borrow(), [list]);
    }
}
