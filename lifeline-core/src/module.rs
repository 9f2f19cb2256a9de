use std::{fmt, rc::Rc};

use lifeline_dom::{
    render::{self, AppProps},
    DomError, Node, Props, VNode,
};
use tracing::debug;

use crate::{config::Config, error::Error, lifecycle::Lifecycle};

pub type Hyperscript = Rc<dyn Fn(&str, Props, Vec<VNode>) -> VNode>;
pub type AppFn<S> = Rc<dyn Fn(AppProps<S>) -> Result<Node, DomError>>;
pub type PatchFn = Rc<dyn Fn(&Node, VNode) -> Result<Node, DomError>>;

/// Entry points of a host rendering library.
///
/// A host offers `h` together with `app`, `patch`, both, or neither.
pub struct HostModule<S> {
    pub h: Hyperscript,
    pub app: Option<AppFn<S>>,
    pub patch: Option<PatchFn>,
}

impl<S: 'static> HostModule<S> {
    pub fn new<H>(h: H) -> Self
    where
        H: Fn(&str, Props, Vec<VNode>) -> VNode + 'static,
    {
        Self {
            h: Rc::new(h),
            app: None,
            patch: None,
        }
    }

    pub fn with_app<F>(mut self, f: F) -> Self
    where
        F: Fn(AppProps<S>) -> Result<Node, DomError> + 'static,
    {
        self.app = Some(Rc::new(f));
        self
    }

    pub fn with_patch<F>(mut self, f: F) -> Self
    where
        F: Fn(&Node, VNode) -> Result<Node, DomError> + 'static,
    {
        self.patch = Some(Rc::new(f));
        self
    }

    /// The renderer from [`lifeline_dom::render`], exposing both `app` and
    /// `patch`.
    pub fn reference() -> Self {
        Self::new(|name: &str, props, children| render::h(name, props, children))
            .with_app(render::app)
            .with_patch(render::patch)
    }
}

impl<S> Clone for HostModule<S> {
    fn clone(&self) -> Self {
        Self {
            h: self.h.clone(),
            app: self.app.clone(),
            patch: self.patch.clone(),
        }
    }
}

impl<S> fmt::Debug for HostModule<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostModule")
            .field("app", &self.app.is_some())
            .field("patch", &self.patch.is_some())
            .finish_non_exhaustive()
    }
}

/// Lifecycle-aware replacements for a [`HostModule`]'s entry points.
pub struct Exports<S> {
    /// Present when the host has `app`.
    pub app: Option<AppFn<S>>,
    /// Present when the host has `patch`.
    pub patch: Option<PatchFn>,
    /// [`l`](Self::l), or the host's own `h` in lite mode.
    pub h: Hyperscript,
    /// Hyperscript that always binds the node it creates.
    pub l: Hyperscript,
}

impl<S> Clone for Exports<S> {
    fn clone(&self) -> Self {
        Self {
            app: self.app.clone(),
            patch: self.patch.clone(),
            h: self.h.clone(),
            l: self.l.clone(),
        }
    }
}

impl<S> fmt::Debug for Exports<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exports")
            .field("app", &self.app.is_some())
            .field("patch", &self.patch.is_some())
            .finish_non_exhaustive()
    }
}

impl Lifecycle {
    /// Wraps the host's entry points.
    ///
    /// With `lite`, `h` stays the host's factory and only `l` binds nodes.
    pub fn wrap<S: 'static>(&self, module: HostModule<S>, lite: bool) -> Exports<S> {
        debug!(
            app = module.app.is_some(),
            patch = module.patch.is_some(),
            lite,
            "wrapping host module"
        );

        let lifecycle = self.clone();
        let host_h = module.h.clone();
        let l: Hyperscript = Rc::new(move |name: &str, props: Props, children: Vec<VNode>| {
            lifecycle.bind_node(host_h(name, props, children))
        });
        let h = if lite { module.h } else { l.clone() };

        let app = module.app.map(|host_app| {
            let lifecycle = self.clone();
            Rc::new(move |props: AppProps<S>| {
                let vdom = (props.view)(&props.init);
                let node = props.node.clone();
                lifecycle.mount_root(&node, vdom.name(), || host_app(props))
            }) as AppFn<S>
        });

        let patch = module.patch.map(|host_patch| {
            let lifecycle = self.clone();
            Rc::new(move |node: &Node, vdom: VNode| {
                let name = vdom.name().map(str::to_string);
                lifecycle.mount_root(node, name.as_deref(), || host_patch(node, vdom))
            }) as PatchFn
        });

        Exports { app, patch, h, l }
    }
}

/// Wraps `module` with the default configuration on the browser's event loop.
pub fn lifecycle<S: 'static>(module: HostModule<S>, lite: bool) -> Result<Exports<S>, Error> {
    Ok(Lifecycle::browser(Config::default())?.wrap(module, lite))
}
