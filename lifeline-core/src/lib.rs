//! `connected` and `disconnected` events for nodes rendered by a host
//! library that has no lifecycle hooks of its own.
//!
//! The host's mutation calls are observed, not replaced: a [`Lifecycle`]
//! installs overrides on the root's parent and, through the descriptors its
//! hyperscript produces, on every node that declares an `onconnected` or
//! `ondisconnected` handler. Each intercepted call performs the mutation
//! right away and dispatches the event on the next animation frame, or the
//! next timer tick where frames are unavailable.

#![warn(clippy::use_self)]

mod bind;
mod browser;
mod config;
mod error;
mod intercept;
mod lifecycle;
mod module;
mod schedule;

pub use bind::Hooks;
pub use browser::BrowserLoop;
pub use config::*;
pub use error::Error;
pub use lifecycle::Lifecycle;
pub use module::*;
pub use schedule::*;
