//! 几何内核错误定义

use thiserror::Error;

/// 曲线构造等操作的错误
///
/// 只校验参数的形状（数量、长度），不校验几何语义；
/// 奇异矩阵、共线三点等退化输入不会报错。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Illegal parameters: {0}")]
    IllegalParameters(String),

    #[error("At least {required} points are required, got {actual}")]
    InsufficientPoints { required: usize, actual: usize },

    #[error("Knot vector length mismatch: expected {expected}, got {actual}")]
    KnotCountMismatch { expected: usize, actual: usize },

    #[error("Weight count mismatch: expected {expected}, got {actual}")]
    WeightCountMismatch { expected: usize, actual: usize },

    #[error("Interpolation system is singular")]
    SingularSystem,
}
