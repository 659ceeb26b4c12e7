use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Node '{0}' not found")]
    NodeNotFound(super::NodeId),

    #[error("Node '{0}' is not a cluster")]
    NotACluster(super::NodeId),

    #[error("Factory error: {0}")]
    Factory(String),

    #[error("Lock error: {0}")]
    Lock(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, SimError>;

impl<T> From<std::sync::PoisonError<T>> for SimError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
