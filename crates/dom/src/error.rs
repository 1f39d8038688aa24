use crate::document::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
    #[error("node {0} cannot have children")]
    InvalidParent(NodeId),
    #[error("node {0} already has a parent")]
    AlreadyAttached(NodeId),
    #[error("appending {child} under {parent} would create a cycle")]
    CycleDetected { parent: NodeId, child: NodeId },
    #[error("the document node cannot be detached")]
    DetachDocument,
    #[error("invalid class token {0:?}")]
    InvalidToken(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unsupported selector {selector:?}: {reason}")]
    Unsupported { selector: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error("no element matches {0:?}")]
    NoMatch(String),
}

/// Whatever a listener fails with. Reported by dispatch, never propagated out of it.
pub type ListenerError = Box<dyn std::error::Error>;
