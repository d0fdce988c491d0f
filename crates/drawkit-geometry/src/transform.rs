//! 2D仿射变换
//!
//! 二维曲线（圆弧）使用的 3x3 齐次变换。

use crate::math::{Matrix3, Point2};
use crate::matrix::Matrix4;
use serde::{Deserialize, Serialize};

/// 2D仿射变换
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    matrix: Matrix3,
}

impl Transform2D {
    /// 创建单位变换
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// 创建平移变换
    #[rustfmt::skip]
    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            matrix: Matrix3::new(
                1.0, 0.0, dx,
                0.0, 1.0, dy,
                0.0, 0.0, 1.0,
            ),
        }
    }

    /// 创建旋转变换（绕原点）
    #[rustfmt::skip]
    pub fn rotation(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            matrix: Matrix3::new(
                cos, -sin, 0.0,
                sin, cos, 0.0,
                0.0, 0.0, 1.0,
            ),
        }
    }

    /// 创建缩放变换（绕原点）
    #[rustfmt::skip]
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            matrix: Matrix3::new(
                sx, 0.0, 0.0,
                0.0, sy, 0.0,
                0.0, 0.0, 1.0,
            ),
        }
    }

    /// 组合两个变换（self 在后，other 在前）
    pub fn then(&self, other: &Transform2D) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// 取 4x4 矩阵在 XY 平面上的投影部分
    #[rustfmt::skip]
    pub fn from_matrix4(m: &Matrix4) -> Self {
        Self {
            matrix: Matrix3::new(
                m.get(0, 0), m.get(0, 1), m.get(0, 3),
                m.get(1, 0), m.get(1, 1), m.get(1, 3),
                0.0, 0.0, 1.0,
            ),
        }
    }

    /// 变换一个点
    pub fn transform_point(&self, point: &Point2) -> Point2 {
        let v = self.matrix * nalgebra::Vector3::new(point.x, point.y, 1.0);
        Point2::new(v.x, v.y)
    }

    /// 获取逆变换
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|m| Self { matrix: m })
    }

    /// 线性部分的行列式，负值表示含镜像
    pub fn determinant(&self) -> f64 {
        self.matrix[(0, 0)] * self.matrix[(1, 1)] - self.matrix[(0, 1)] * self.matrix[(1, 0)]
    }

    /// 是否包含镜像
    pub fn is_reflection(&self) -> bool {
        self.determinant() < 0.0
    }

    /// 等效的均匀缩放系数（面积缩放的平方根）
    pub fn uniform_scale(&self) -> f64 {
        self.determinant().abs().sqrt()
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Transform2D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.then(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;

    #[test]
    fn test_rotation() {
        let t = Transform2D::rotation(std::f64::consts::PI / 2.0);
        let result = t.transform_point(&Point2::new(1.0, 0.0));

        assert!(approx_eq(result.x, 0.0));
        assert!(approx_eq(result.y, 1.0));
    }

    #[test]
    fn test_inverse() {
        let t = Transform2D::translation(10.0, 20.0)
            .then(&Transform2D::rotation(0.5))
            .then(&Transform2D::scale(2.0, 3.0));

        let inv = t.inverse().unwrap();
        let p = Point2::new(100.0, 200.0);
        let restored = inv.transform_point(&t.transform_point(&p));

        assert!(approx_eq(restored.x, p.x));
        assert!(approx_eq(restored.y, p.y));
    }

    #[test]
    fn test_reflection_and_scale() {
        let mirror = Transform2D::scale(-2.0, 2.0);
        assert!(mirror.is_reflection());
        assert!(approx_eq(mirror.uniform_scale(), 2.0));
        assert!(!Transform2D::rotation(1.0).is_reflection());
    }

    #[test]
    fn test_from_matrix4() {
        let m = Matrix4::make_translation(3.0, 4.0, 5.0).multiply(&Matrix4::make_rotation_z(0.25));
        let t = Transform2D::from_matrix4(&m);
        let expected = Transform2D::translation(3.0, 4.0).then(&Transform2D::rotation(0.25));
        let p = Point2::new(1.0, 2.0);
        let (a, b) = (t.transform_point(&p), expected.transform_point(&p));
        assert!(approx_eq(a.x, b.x));
        assert!(approx_eq(a.y, b.y));
    }
}
