//! 数学基础类型
//!
//! 基于 nalgebra 的点/向量别名，以及容差比较、角度归一化和轴对齐包围盒。

use nalgebra as na;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::matrix::Matrix4;

/// 2D点类型
pub type Point2 = na::Point2<f64>;

/// 3D点类型
pub type Point3 = na::Point3<f64>;

/// 2D向量类型
pub type Vector2 = na::Vector2<f64>;

/// 3D向量类型
pub type Vector3 = na::Vector3<f64>;

/// 2D齐次变换矩阵
pub type Matrix3 = na::Matrix3<f64>;

/// 2π
pub const TAU: f64 = 2.0 * PI;

/// 数值容差，用于几何比较
pub const EPSILON: f64 = 1e-10;

/// 判断两个浮点数是否近似相等
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// 在指定容差下判断两个浮点数是否相等
#[inline]
pub fn approx_eq_tol(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

/// 判断两个3D点是否在容差内相等
#[inline]
pub fn points3_approx_eq(a: &Point3, b: &Point3, tol: f64) -> bool {
    approx_eq_tol(a.x, b.x, tol) && approx_eq_tol(a.y, b.y, tol) && approx_eq_tol(a.z, b.z, tol)
}

/// 将角度归一化到 [0, 2π)
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle % TAU;
    let a = if a < 0.0 { a + TAU } else { a };
    // -0.0 或舍入得到 2π 时回绕到 0
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// 判断 `angle` 是否位于从 `start` 扫到 `end` 的圆弧范围内（含端点）
///
/// `clockwise` 为 true 时按顺时针方向扫掠。
pub fn is_between_angle(angle: f64, start: f64, end: f64, clockwise: bool) -> bool {
    let (from, to) = if clockwise { (end, start) } else { (start, end) };
    let sweep = normalize_angle(to - from);
    // 整圆（起止角相差 2π 的整数倍且不相等）视为全部包含
    if sweep == 0.0 && !approx_eq(to, from) {
        return true;
    }
    let offset = normalize_angle(angle - from);
    offset <= sweep + EPSILON || approx_eq(offset, TAU)
}

/// 2D包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2 {
    pub min: Point2,
    pub max: Point2,
}

impl BoundingBox2 {
    /// 创建新的包围盒
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// 创建空的包围盒（无效状态）
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y
    }

    /// 从点集创建包围盒
    pub fn from_points(points: impl IntoIterator<Item = Point2>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_to_include(&p);
        }
        bbox
    }

    /// 扩展包围盒以包含指定点
    pub fn expand_to_include(&mut self, point: &Point2) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// 合并两个包围盒
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// 检查是否包含指定点
    pub fn contains(&self, point: &Point2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// 获取中心点
    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// 获取宽度
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// 获取高度
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// 提升为 z = `elevation` 的三维包围盒
    pub fn to_3d(&self, elevation: f64) -> BoundingBox3 {
        if self.is_empty() {
            return BoundingBox3::empty();
        }
        BoundingBox3::new(
            Point3::new(self.min.x, self.min.y, elevation),
            Point3::new(self.max.x, self.max.y, elevation),
        )
    }
}

impl Default for BoundingBox2 {
    fn default() -> Self {
        Self::empty()
    }
}

/// 3D包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox3 {
    pub min: Point3,
    pub max: Point3,
}

impl BoundingBox3 {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_to_include(p);
        }
        bbox
    }

    pub fn expand_to_include(&mut self, point: &Point3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// 合并两个包围盒
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    pub fn contains(&self, point: &Point3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    pub fn center(&self) -> Point3 {
        na::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3 {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }

    /// 用矩阵变换包围盒：变换 8 个角点后重新求包围盒
    pub fn apply_matrix4(&self, matrix: &Matrix4) -> Self {
        if self.is_empty() {
            return *self;
        }
        let (lo, hi) = (self.min, self.max);
        let corners = [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(lo.x, hi.y, hi.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(hi.x, hi.y, hi.z),
        ];
        let transformed: Vec<Point3> = corners.iter().map(|c| matrix.transform_point(c)).collect();
        Self::from_points(&transformed)
    }
}

impl Default for BoundingBox3 {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box() {
        let bbox = BoundingBox2::from_points([
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 5.0),
            Point2::new(-5.0, 8.0),
        ]);

        assert!(approx_eq(bbox.min.x, -5.0));
        assert!(approx_eq(bbox.min.y, 0.0));
        assert!(approx_eq(bbox.max.x, 10.0));
        assert!(approx_eq(bbox.max.y, 8.0));
        assert!(bbox.contains(&Point2::new(0.0, 4.0)));
        assert!(!bbox.contains(&Point2::new(20.0, 4.0)));
    }

    #[test]
    fn test_empty_box_union() {
        let empty = BoundingBox3::empty();
        assert!(empty.is_empty());

        let b = BoundingBox3::new(Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0));
        assert_eq!(empty.union(&b), b);
        assert!(empty.apply_matrix4(&Matrix4::identity()).is_empty());
    }

    #[test]
    fn test_box_apply_translation() {
        let b = BoundingBox3::new(Point3::origin(), Point3::new(1.0, 1.0, 0.0));
        let m = Matrix4::make_translation(10.0, 20.0, 0.0);
        let moved = b.apply_matrix4(&m);
        assert!(approx_eq(moved.min.x, 10.0));
        assert!(approx_eq(moved.max.y, 21.0));
    }

    #[test]
    fn test_normalize_angle() {
        assert!(approx_eq(normalize_angle(-PI / 2.0), 1.5 * PI));
        assert!(approx_eq(normalize_angle(TAU), 0.0));
        assert!(approx_eq(normalize_angle(5.0 * PI), PI));
    }

    #[test]
    fn test_is_between_angle() {
        // 逆时针 0 -> π/2
        assert!(is_between_angle(PI / 4.0, 0.0, PI / 2.0, false));
        assert!(!is_between_angle(PI, 0.0, PI / 2.0, false));
        // 顺时针 π/2 -> 0，扫过的是同一段
        assert!(is_between_angle(PI / 4.0, PI / 2.0, 0.0, true));
        assert!(!is_between_angle(PI, PI / 2.0, 0.0, true));
        // 跨越 0 的逆时针圆弧
        assert!(is_between_angle(0.0, 1.5 * PI, PI / 2.0, false));
        // 整圆
        assert!(is_between_angle(PI, 0.0, TAU, false));
    }
}
