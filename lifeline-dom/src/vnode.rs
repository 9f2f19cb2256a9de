use std::{fmt, rc::Rc};

use indexmap::IndexMap;

use crate::{
    event::{handler_key, Event, EventHandler, EventKey},
    method::{Method, MethodOverride},
};

pub type Props = IndexMap<String, Prop>;

/// A single entry of a descriptor's property mapping.
#[derive(Clone)]
pub enum Prop {
    /// Plain attribute value.
    Value(String),
    /// Event handler, keyed `on<event>`.
    Handler(EventHandler),
    /// Per-instance mutation method, keyed by the method's DOM name.
    Method(MethodOverride),
}

impl fmt::Debug for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Handler(_) => f.write_str("Handler(..)"),
            Self::Method(_) => f.write_str("Method(..)"),
        }
    }
}

impl Prop {
    pub fn handler<F: Fn(&Event) + 'static>(f: F) -> Self {
        Self::Handler(Rc::new(f))
    }
}

impl From<EventHandler> for Prop {
    fn from(value: EventHandler) -> Self {
        Self::Handler(value)
    }
}

impl From<&str> for Prop {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<String> for Prop {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

/// Rendered node descriptor produced by a hyperscript function.
#[derive(Clone, Debug)]
pub enum VNode {
    Element(Element),
    Text(String),
}

#[derive(Clone, Debug)]
pub struct Element {
    pub name: String,
    pub props: Props,
    pub children: Vec<VNode>,
}

impl VNode {
    /// Tag name of element descriptors.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Element(element) => Some(&element.name),
            Self::Text(_) => None,
        }
    }

    pub fn props(&self) -> Option<&Props> {
        match self {
            Self::Element(element) => Some(&element.props),
            Self::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[Self] {
        match self {
            Self::Element(element) => &element.children,
            Self::Text(_) => &[],
        }
    }

    /// Whether the descriptor declares a handler for `event`.
    pub fn declares<K: EventKey>(&self, event: &K) -> bool {
        self.props().is_some_and(|props| {
            matches!(props.get(&handler_key(event)), Some(Prop::Handler(_)))
        })
    }

    pub fn method(&self, method: Method) -> Option<&MethodOverride> {
        match self.props()?.get(method.name())? {
            Prop::Method(f) => Some(f),
            _ => None,
        }
    }
}

impl From<&str> for VNode {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for VNode {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Element> for VNode {
    fn from(value: Element) -> Self {
        Self::Element(value)
    }
}

/// Builds a [`Props`] map.
///
/// ```
/// use lifeline_dom::{props, Prop};
///
/// let props = props! { "id" => "app", "class" => "main" };
/// assert!(matches!(props.get("id"), Some(Prop::Value(v)) if v == "app"));
/// ```
#[macro_export]
macro_rules! props {
    () => {
        $crate::Props::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut props = $crate::Props::new();
        $(props.insert(::std::string::ToString::to_string(&$key), $crate::Prop::from($value));)+
        props
    }};
}
