use bt_core::BlackboardError;
use thiserror::Error;

/// Failure reported by a leaf's one-off setup hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SetupError(pub String);

#[derive(Debug, Error)]
pub enum BtError {
    #[error("setup of node `{node}` failed: {source}")]
    Setup {
        node: String,
        #[source]
        source: SetupError,
    },

    #[error("blackboard registration failed: {0}")]
    Blackboard(#[from] BlackboardError),
}

pub type Result<T> = std::result::Result<T, BtError>;
