use thiserror::Error;

/// Failures reported by the base implementations of the mutation methods.
///
/// Interceptors never produce these themselves; they hand back whatever the
/// base implementation returned.
#[derive(Clone, PartialEq, Eq, Error, Debug)]
pub enum DomError {
    #[error("cannot insert into `{parent}`: {reason}")]
    HierarchyRequest { parent: String, reason: &'static str },
    #[error("`{node}` is not a child of `{parent}`")]
    NotFound { parent: String, node: String },
    #[error("`{node}` has no parent node")]
    NoParent { node: String },
}
