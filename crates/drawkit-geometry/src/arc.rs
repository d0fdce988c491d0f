//! 二维圆弧
//!
//! 三种构造方式：
//! - 三点（起点、弧上一点、终点）
//! - 起点、终点与凸度（DXF bulge 约定）
//! - 圆心、半径、起止角与方向
//!
//! 角度统一归一化到 [0, 2π)，唯一例外是 `start = 0, end = 2π`，
//! 原样保留以表示整圆。

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

use crate::curve::{BoundsCache, Curve2d};
use crate::math::{is_between_angle, normalize_angle, BoundingBox2, Point2, Vector2, TAU};
use crate::transform::Transform2D;

/// 二维圆弧
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircularArc2d {
    center: Point2,
    radius: f64,
    start_angle: f64,
    end_angle: f64,
    clockwise: bool,
    #[serde(skip)]
    bbox: BoundsCache<BoundingBox2>,
}

impl CircularArc2d {
    /// 由圆心、半径、起止角与方向创建
    pub fn from_explicit_geometry(
        center: Point2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        clockwise: bool,
    ) -> Self {
        let mut arc = Self {
            center,
            radius,
            start_angle: 0.0,
            end_angle: 0.0,
            clockwise,
            bbox: BoundsCache::new(),
        };
        arc.set_start_angle(start_angle);
        arc.set_end_angle(end_angle);
        arc
    }

    /// 由三点创建：`p1` 起点，`p2` 弧上一点，`p3` 终点
    ///
    /// 圆心为 `p1p2`、`p2p3` 两条中垂线的交点。三点共线时结果为 NaN/无穷大，不做检查。
    pub fn from_three_points(p1: Point2, p2: Point2, p3: Point2) -> Self {
        let m1 = nalgebra::center(&p1, &p2);
        let m2 = nalgebra::center(&p2, &p3);
        let d1 = p2 - p1;
        let d2 = p3 - p2;

        // 中垂线：(x - m) · d = 0
        let c1 = d1.dot(&m1.coords);
        let c2 = d2.dot(&m2.coords);
        let det = d1.x * d2.y - d1.y * d2.x;
        let center = Point2::new(
            (c1 * d2.y - d1.y * c2) / det,
            (d1.x * c2 - c1 * d2.x) / det,
        );
        let radius = (p1 - center).norm();

        let angle_of = |p: &Point2| (p.y - center.y).atan2(p.x - center.x);
        let start_angle = angle_of(&p1);
        let mid_angle = angle_of(&p2);
        let end_angle = angle_of(&p3);

        // 中间点严格位于逆时针扫掠范围内则为逆时针
        let sweep = normalize_angle(end_angle - start_angle);
        let mid_offset = normalize_angle(mid_angle - start_angle);
        let counter_clockwise = mid_offset > 0.0 && mid_offset < sweep;

        Self::from_explicit_geometry(center, radius, start_angle, end_angle, !counter_clockwise)
    }

    /// 由起点、终点与凸度创建
    ///
    /// 凸度为圆弧包角四分之一的正切，顺时针时取负；凸度为 1 时是半圆。
    /// 凸度为 0（直线段）时结果退化，不做特殊处理。
    pub fn from_bulge(from: Point2, to: Point2, bulge: f64) -> Self {
        let theta = 4.0 * bulge.abs().atan();
        // 始终按逆时针方向从 b 扫到 a 计算圆心
        let (a, b) = if bulge < 0.0 { (from, to) } else { (to, from) };

        let ab = b - a;
        let chord = ab.norm();
        let mid = a + ab * 0.5;
        let offset = (chord / 2.0 / (theta / 2.0).tan()).abs();
        let dir = ab.normalize();
        let normal = Vector2::new(-dir.y, dir.x);

        let center = if theta < PI {
            mid - normal * offset
        } else {
            mid + normal * offset
        };

        let angle_of = |p: &Point2| (p.y - center.y).atan2(p.x - center.x);
        let (start_angle, end_angle) = if bulge < 0.0 {
            (angle_of(&a), angle_of(&b))
        } else {
            (angle_of(&b), angle_of(&a))
        };
        let radius = (b - center).norm();

        Self::from_explicit_geometry(center, radius, start_angle, end_angle, bulge < 0.0)
    }

    pub fn center(&self) -> Point2 {
        self.center
    }

    pub fn set_center(&mut self, center: Point2) {
        self.center = center;
        self.bbox.invalidate();
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
        self.bbox.invalidate();
    }

    /// 起始角，范围 [0, 2π)
    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    pub fn set_start_angle(&mut self, angle: f64) {
        self.start_angle = normalize_angle(angle);
        self.bbox.invalidate();
    }

    /// 终止角，范围 [0, 2π)，整圆时为 2π
    pub fn end_angle(&self) -> f64 {
        self.end_angle
    }

    pub fn set_end_angle(&mut self, angle: f64) {
        self.end_angle = if self.start_angle == 0.0 && angle == TAU {
            angle
        } else {
            normalize_angle(angle)
        };
        self.bbox.invalidate();
    }

    pub fn clockwise(&self) -> bool {
        self.clockwise
    }

    pub fn set_clockwise(&mut self, clockwise: bool) {
        self.clockwise = clockwise;
        self.bbox.invalidate();
    }

    /// 是否为原样保存的整圆（0 到 2π）
    pub fn is_full_circle(&self) -> bool {
        self.start_angle == 0.0 && self.end_angle == TAU
    }

    /// 扫掠角，非负且与方向一致
    pub fn delta_angle(&self) -> f64 {
        if self.is_full_circle() {
            return TAU;
        }
        if self.clockwise {
            normalize_angle(self.start_angle - self.end_angle)
        } else {
            normalize_angle(self.end_angle - self.start_angle)
        }
    }

    /// 弧上指定角度处的点
    pub fn point_at_angle(&self, angle: f64) -> Point2 {
        Point2::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }

    /// 扫掠中点
    pub fn mid_point(&self) -> Point2 {
        let half = self.delta_angle() / 2.0;
        let angle = if self.clockwise {
            self.start_angle - half
        } else {
            self.start_angle + half
        };
        self.point_at_angle(normalize_angle(angle))
    }

    fn calculate_bounding_box(&self) -> BoundingBox2 {
        let mut bbox = BoundingBox2::from_points([self.start_point(), self.end_point()]);

        for angle in [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2] {
            if is_between_angle(angle, self.start_angle, self.end_angle, self.clockwise) {
                bbox.expand_to_include(&self.point_at_angle(angle));
            }
        }

        bbox
    }
}

impl Curve2d for CircularArc2d {
    fn length(&self) -> f64 {
        (self.delta_angle() * self.radius).abs()
    }

    fn bounding_box(&self) -> BoundingBox2 {
        self.bbox.get_or_compute(|| self.calculate_bounding_box())
    }

    fn start_point(&self) -> Point2 {
        self.point_at_angle(self.start_angle)
    }

    fn end_point(&self) -> Point2 {
        self.point_at_angle(self.end_angle)
    }

    /// 扫掠角为 π 的偶数倍时视为闭合
    fn closed(&self) -> bool {
        ((self.end_angle - self.start_angle).abs() / PI) % 2.0 == 0.0
    }

    fn get_points(&self, num_points: usize) -> Vec<Point2> {
        let num_points = num_points.max(1);
        let (start, delta) = if self.closed() {
            (0.0, TAU)
        } else {
            (self.start_angle, self.delta_angle())
        };
        let direction = if self.clockwise { -1.0 } else { 1.0 };

        (0..=num_points)
            .map(|i| {
                let t = i as f64 / num_points as f64;
                self.point_at_angle(start + direction * delta * t)
            })
            .collect()
    }

    fn transform(&mut self, transform: &Transform2D) -> &mut Self {
        let full_circle = self.is_full_circle();
        let start = transform.transform_point(&self.start_point());
        let end = transform.transform_point(&self.end_point());
        let center = transform.transform_point(&self.center);

        self.center = center;
        self.radius *= transform.uniform_scale();
        if transform.is_reflection() {
            self.clockwise = !self.clockwise;
        }
        if !full_circle {
            self.set_start_angle((start.y - center.y).atan2(start.x - center.x));
            self.set_end_angle((end.y - center.y).atan2(end.x - center.x));
        }
        self.bbox.invalidate();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq_tol;

    const TOL: f64 = 1e-9;

    fn assert_point(p: Point2, x: f64, y: f64) {
        assert!(approx_eq_tol(p.x, x, TOL), "x: {} != {}", p.x, x);
        assert!(approx_eq_tol(p.y, y, TOL), "y: {} != {}", p.y, y);
    }

    #[test]
    fn test_bulge_semicircle() {
        let arc = CircularArc2d::from_bulge(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), 1.0);
        assert!(approx_eq_tol(arc.delta_angle(), PI, TOL));
        assert!(approx_eq_tol(arc.radius(), 0.5, TOL));
        assert_point(arc.center(), 0.5, 0.0);
        assert!(!arc.clockwise());
        assert_point(arc.start_point(), 0.0, 0.0);
        assert_point(arc.end_point(), 1.0, 0.0);
    }

    #[test]
    fn test_bulge_quarter_and_negative() {
        // tan(π/8) 对应 90° 包角
        let bulge = (PI / 8.0).tan();
        let ccw = CircularArc2d::from_bulge(Point2::new(1.0, 0.0), Point2::new(0.0, 1.0), bulge);
        assert!(approx_eq_tol(ccw.delta_angle(), FRAC_PI_2, TOL));
        assert_point(ccw.center(), 0.0, 0.0);
        assert!(!ccw.clockwise());

        let cw = CircularArc2d::from_bulge(Point2::new(0.0, 1.0), Point2::new(1.0, 0.0), -bulge);
        assert!(cw.clockwise());
        assert_point(cw.center(), 0.0, 0.0);
        assert_point(cw.start_point(), 0.0, 1.0);
        assert_point(cw.end_point(), 1.0, 0.0);
        assert!(approx_eq_tol(cw.delta_angle(), FRAC_PI_2, TOL));
    }

    #[test]
    fn test_bulge_major_arc() {
        // 包角 270°
        let bulge = (3.0 * PI / 8.0).tan();
        let arc = CircularArc2d::from_bulge(Point2::new(1.0, 0.0), Point2::new(0.0, -1.0), bulge);
        assert!(approx_eq_tol(arc.delta_angle(), 1.5 * PI, 1e-9));
        assert_point(arc.center(), 0.0, 0.0);
        assert!(approx_eq_tol(arc.radius(), 1.0, TOL));
    }

    #[test]
    fn test_three_points_equidistant() {
        let cases = [
            (Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), Point2::new(2.0, 0.0)),
            (Point2::new(0.0, 0.0), Point2::new(3.0, 0.0), Point2::new(1.0, 4.0)),
            (Point2::new(-2.5, 1.0), Point2::new(0.0, 7.0), Point2::new(4.0, -3.0)),
        ];
        for (p1, p2, p3) in cases {
            let arc = CircularArc2d::from_three_points(p1, p2, p3);
            let c = arc.center();
            let r1 = (c - p1).norm();
            assert!(approx_eq_tol(r1, (c - p2).norm(), 1e-9));
            assert!(approx_eq_tol(r1, (c - p3).norm(), 1e-9));
            assert!(approx_eq_tol(arc.radius(), r1, 1e-9));
        }
    }

    #[test]
    fn test_three_points_orientation() {
        // 经过上半圆：逆时针
        let ccw = CircularArc2d::from_three_points(
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(-1.0, 0.0),
        );
        assert!(!ccw.clockwise());
        assert!(approx_eq_tol(ccw.delta_angle(), PI, TOL));

        // 经过下半圆：顺时针
        let cw = CircularArc2d::from_three_points(
            Point2::new(1.0, 0.0),
            Point2::new(0.0, -1.0),
            Point2::new(-1.0, 0.0),
        );
        assert!(cw.clockwise());
        assert!(approx_eq_tol(cw.delta_angle(), PI, TOL));
    }

    #[test]
    fn test_three_points_collinear_is_degenerate() {
        let arc = CircularArc2d::from_three_points(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
        );
        assert!(!arc.radius().is_finite());
    }

    #[test]
    fn test_angle_normalization() {
        let arc = CircularArc2d::from_explicit_geometry(Point2::origin(), 1.0, -FRAC_PI_2, 2.0 * TAU, false);
        assert!(approx_eq_tol(arc.start_angle(), 1.5 * PI, TOL));
        assert!(approx_eq_tol(arc.end_angle(), 0.0, TOL));

        let circle = CircularArc2d::from_explicit_geometry(Point2::origin(), 2.0, 0.0, TAU, false);
        assert_eq!(circle.end_angle(), TAU);
        assert!(circle.closed());
        assert!(approx_eq_tol(circle.length(), 2.0 * TAU, TOL));
    }

    #[test]
    fn test_clockwise_delta_angle() {
        let arc = CircularArc2d::from_explicit_geometry(Point2::origin(), 1.0, FRAC_PI_2, 0.0, true);
        assert!(approx_eq_tol(arc.delta_angle(), FRAC_PI_2, TOL));
        assert!(approx_eq_tol(arc.length(), FRAC_PI_2, TOL));
        assert_point(arc.mid_point(), (PI / 4.0).cos(), (PI / 4.0).sin());
    }

    #[test]
    fn test_bounding_box_critical_angles() {
        // 逆时针 45° -> 135°，包含 90° 的象限点
        let arc = CircularArc2d::from_explicit_geometry(Point2::origin(), 1.0, PI / 4.0, 3.0 * PI / 4.0, false);
        let bbox = arc.bounding_box();
        assert!(approx_eq_tol(bbox.max.y, 1.0, TOL));
        assert!(approx_eq_tol(bbox.min.y, (PI / 4.0).sin(), TOL));

        // 同样的端点顺时针扫掠，经过 0、270°、180°
        let mut arc = arc.clone();
        arc.set_clockwise(true);
        let bbox = arc.bounding_box();
        assert!(approx_eq_tol(bbox.min.y, -1.0, TOL));
        assert!(approx_eq_tol(bbox.min.x, -1.0, TOL));
        assert!(approx_eq_tol(bbox.max.x, 1.0, TOL));
    }

    #[test]
    fn test_setters_invalidate_bounding_box() {
        let mut arc = CircularArc2d::from_explicit_geometry(Point2::origin(), 1.0, 0.0, PI, false);
        assert!(approx_eq_tol(arc.bounding_box().max.y, 1.0, TOL));

        arc.set_radius(3.0);
        assert!(approx_eq_tol(arc.bounding_box().max.y, 3.0, TOL));

        arc.set_center(Point2::new(10.0, 0.0));
        assert!(approx_eq_tol(arc.bounding_box().min.x, 7.0, TOL));
    }

    #[test]
    fn test_get_points() {
        let arc = CircularArc2d::from_explicit_geometry(Point2::origin(), 1.0, 0.0, FRAC_PI_2, false);
        let points = arc.get_points(4);
        assert_eq!(points.len(), 5);
        assert_point(points[0], 1.0, 0.0);
        assert_point(points[4], 0.0, 1.0);

        let cw = CircularArc2d::from_explicit_geometry(Point2::origin(), 1.0, FRAC_PI_2, 0.0, true);
        let points = cw.get_points(2);
        assert_point(points[0], 0.0, 1.0);
        assert_point(points[2], 1.0, 0.0);
    }

    #[test]
    fn test_transform() {
        let mut arc = CircularArc2d::from_explicit_geometry(Point2::origin(), 1.0, 0.0, FRAC_PI_2, false);
        let t = Transform2D::translation(5.0, 5.0).then(&Transform2D::scale(2.0, 2.0));
        arc.transform(&t);
        assert_point(arc.center(), 5.0, 5.0);
        assert!(approx_eq_tol(arc.radius(), 2.0, TOL));
        assert_point(arc.end_point(), 5.0, 7.0);

        // 镜像翻转方向
        arc.transform(&Transform2D::scale(-1.0, 1.0));
        assert!(arc.clockwise());
        assert!(approx_eq_tol(arc.delta_angle(), FRAC_PI_2, TOL));
    }
}
