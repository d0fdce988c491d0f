//! 交换层错误定义

use drawkit_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Unknown entity type: {0}")]
    UnknownEntity(String),

    #[error("Worker disconnected")]
    WorkerDisconnected,

    #[error("Task failed: {0}")]
    Task(String),
}

impl From<drawkit_geometry::GeometryError> for ExchangeError {
    fn from(err: drawkit_geometry::GeometryError) -> Self {
        ExchangeError::Model(ModelError::Geometry(err))
    }
}
