//! DOM-like node model with overridable mutation methods.
//!
//! Every [`Node`] carries an override slot per [`Method`]. Code that wants to
//! observe `appendChild`, `insertBefore` or `removeChild` on a particular node
//! installs a [`MethodOverride`] there and delegates to
//! [`Node::invoke_base`] for the actual mutation.

#![warn(clippy::use_self)]

mod error;
mod event;
mod method;
mod node;
mod vnode;

pub mod render;

pub use error::DomError;
pub use event::*;
pub use method::*;
pub use node::*;
pub use vnode::*;
