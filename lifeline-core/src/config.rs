use std::collections::BTreeSet;

use lifeline_dom::Method;
use serde::Deserialize;
use tracing::warn;

use crate::error::Error;

/// Default name of the event fired once a node enters the tree.
pub const CONNECTED: &str = "connected";
/// Default name of the event fired once a node leaves the tree.
pub const DISCONNECTED: &str = "disconnected";

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EventKind {
    Connected,
    Disconnected,
}

impl EventKind {
    /// Kind emitted when `method` is intercepted.
    pub fn for_method(method: Method) -> Self {
        match method {
            Method::AppendChild | Method::InsertBefore => Self::Connected,
            Method::RemoveChild => Self::Disconnected,
        }
    }
}

/// Lifecycle configuration, fixed once a [`Lifecycle`](crate::Lifecycle) is
/// created.
///
/// ```toml
/// payload = "detail"
/// binding = "selective"
///
/// [events]
/// connected = "mounted"
/// disconnected = "unmounted"
/// ```
#[derive(Clone, Default, Deserialize, PartialEq, Eq, Debug)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub events: EventNames,
    pub payload: Payload,
    pub binding: Binding,
}

#[derive(Clone, Deserialize, PartialEq, Eq, Debug)]
#[serde(default, rename_all = "kebab-case")]
pub struct EventNames {
    pub connected: String,
    pub disconnected: String,
}

impl Default for EventNames {
    fn default() -> Self {
        Self {
            connected: CONNECTED.to_string(),
            disconnected: DISCONNECTED.to_string(),
        }
    }
}

/// How a dispatched lifecycle event refers to the affected node.
///
/// Events are always dispatched on the affected node, so
/// [`Event::target`](lifeline_dom::Event::target) is that node either way.
#[derive(Clone, Copy, Default, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "kebab-case")]
pub enum Payload {
    #[default]
    Target,
    /// Also store the node in [`Event::detail`](lifeline_dom::Event::detail).
    Detail,
}

/// Which interceptors [`Lifecycle::bind_node`](crate::Lifecycle::bind_node)
/// adds to a descriptor.
#[derive(Clone, Copy, Default, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "kebab-case")]
pub enum Binding {
    /// Only the methods matching the handlers the descriptor declares.
    #[default]
    Selective,
    /// All three methods on every element.
    Unconditional,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events<C, D>(mut self, connected: C, disconnected: D) -> Self
    where
        C: Into<String>,
        D: Into<String>,
    {
        self.events = EventNames {
            connected: connected.into(),
            disconnected: disconnected.into(),
        };
        self
    }

    pub fn payload(mut self, value: Payload) -> Self {
        self.payload = value;
        self
    }

    pub fn binding(mut self, value: Binding) -> Self {
        self.binding = value;
        self
    }

    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        let mut unused = BTreeSet::new();
        let config: Self =
            serde_ignored::deserialize(toml::Deserializer::new(contents), |path| {
                unused.insert(path.to_string());
            })?;

        for key in unused {
            warn!(%key, "unused config key");
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let EventNames {
            connected,
            disconnected,
        } = &self.events;

        if connected.is_empty() || disconnected.is_empty() {
            return Err(Error::InvalidConfig("event names must not be empty".into()));
        }
        if connected == disconnected {
            return Err(Error::InvalidConfig(format!(
                "connected and disconnected events share the name `{connected}`"
            )));
        }
        Ok(())
    }

    pub fn event_name(&self, kind: EventKind) -> &str {
        match kind {
            EventKind::Connected => &self.events.connected,
            EventKind::Disconnected => &self.events.disconnected,
        }
    }
}
