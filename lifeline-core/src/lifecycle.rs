use std::rc::Rc;

use lifeline_dom::{Event, Node};
use tracing::trace;

use crate::{
    browser::BrowserLoop,
    config::{Config, EventKind, Payload},
    error::Error,
    schedule::{Deferrer, EventLoop, Tick},
};

/// Shared state behind every interceptor and binder: the configuration and
/// the deferred tick, both fixed at construction.
#[derive(Clone, Debug)]
pub struct Lifecycle(Rc<Inner>);

#[derive(Debug)]
struct Inner {
    config: Config,
    deferrer: Deferrer,
}

impl Lifecycle {
    pub fn new(config: Config, event_loop: Rc<dyn EventLoop>) -> Result<Self, Error> {
        config.validate()?;
        let deferrer = Deferrer::new(event_loop)?;
        Ok(Self(Rc::new(Inner { config, deferrer })))
    }

    /// Uses the host's animation frames, or its global timers as a fallback.
    pub fn browser(config: Config) -> Result<Self, Error> {
        Self::new(config, Rc::new(BrowserLoop::new()))
    }

    pub fn config(&self) -> &Config {
        &self.0.config
    }

    pub fn tick(&self) -> Tick {
        self.0.deferrer.tick()
    }

    pub fn event_name(&self, kind: EventKind) -> &str {
        self.0.config.event_name(kind)
    }

    /// Schedules a `kind` event on `node` for the next tick.
    pub fn notify(&self, node: &Node, kind: EventKind) {
        let mut event = Event::new(self.event_name(kind));
        if self.0.config.payload == Payload::Detail {
            event = event.with_detail(node.clone());
        }

        trace!(event = event.kind(), node = %node.node_name(), "lifecycle event scheduled");
        let node = node.clone();
        self.0.deferrer.defer(move || {
            node.dispatch_event(event);
        });
    }
}
