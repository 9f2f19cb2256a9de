use std::rc::Rc;

use lifeline_dom::{Call, Method, MethodOverride, Node};
use tracing::trace;

use crate::{config::EventKind, lifecycle::Lifecycle};

impl Lifecycle {
    /// Creates an override for `method` that schedules a `kind` event on the
    /// inserted or removed node, then performs the mutation with the base
    /// implementation and returns its result untouched.
    ///
    /// The notification is scheduled even when the mutation fails.
    pub fn intercept(&self, method: Method, kind: EventKind) -> MethodOverride {
        let lifecycle = self.clone();
        Rc::new(move |this: &Node, call: Call| {
            trace!(%method, parent = %this.node_name(), "intercepted");
            lifecycle.notify(call.node(), kind);
            this.invoke_base(call)
        })
    }
}
