use dom::{DispatchError, DomError, NodeId};

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ToggleError {
    #[error("click target {0} has no parent to toggle")]
    DetachedTarget(NodeId),
    #[error("parent {container} of click target {target} is not an element")]
    ContainerNotElement { target: NodeId, container: NodeId },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
