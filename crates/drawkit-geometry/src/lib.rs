//! DrawKit 几何内核
//!
//! 提供CAD图元所需的线性代数与曲线算法。
//!
//! # 模块划分
//!
//! - `math`: 点/向量别名、容差、角度工具、包围盒
//! - `quaternion` / `matrix`: 四元数与 4x4 齐次矩阵（组合/分解/求逆）
//! - `transform`: 2D 仿射变换
//! - `arc`: 二维圆弧（三点、凸度、显式参数三种构造方式）
//! - `nurbs` / `spline`: NURBS 求值、节点向量生成与三次样条曲线
//!
//! # 示例
//!
//! ```rust
//! use drawkit_geometry::prelude::*;
//!
//! // 凸度为 1 的半圆弧
//! let arc = CircularArc2d::from_bulge(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), 1.0);
//! assert!((arc.radius() - 0.5).abs() < 1e-9);
//! ```

pub mod arc;
pub mod config;
pub mod curve;
pub mod error;
pub mod math;
pub mod matrix;
pub mod nurbs;
pub mod quaternion;
pub mod spline;
pub mod transform;

pub use error::GeometryError;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::arc::CircularArc2d;
    pub use crate::config::SamplingConfig;
    pub use crate::curve::{Curve2d, Curve3d};
    pub use crate::error::GeometryError;
    pub use crate::math::{BoundingBox2, BoundingBox3, Point2, Point3, Vector2, Vector3};
    pub use crate::matrix::Matrix4;
    pub use crate::nurbs::KnotParameterization;
    pub use crate::quaternion::{Euler, Quaternion};
    pub use crate::spline::Spline3d;
    pub use crate::transform::Transform2D;
}
