//! 图元模型错误定义

use drawkit_geometry::GeometryError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Block already exists: {0}")]
    DuplicateBlock(String),

    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Layer already exists: {0}")]
    DuplicateLayer(String),

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Layer 0 cannot be deleted or renamed")]
    ProtectedLayer,
}
