//! 曲线图元：直线、圆弧、样条

use std::any::Any;

use drawkit_geometry::arc::CircularArc2d;
use drawkit_geometry::config::SamplingConfig;
use drawkit_geometry::curve::{Curve2d, Curve3d};
use drawkit_geometry::math::{BoundingBox3, Point3};
use drawkit_geometry::nurbs::KnotParameterization;
use drawkit_geometry::spline::Spline3d;

use crate::entity::{DrawContext, Entity, EntityBase};
use crate::error::ModelError;
use crate::render::RenderObject;

/// 直线段
#[derive(Debug, Clone)]
pub struct LineEntity {
    base: EntityBase,
    pub start: Point3,
    pub end: Point3,
}

impl LineEntity {
    pub fn new(start: Point3, end: Point3) -> Self {
        Self {
            base: EntityBase::new(),
            start,
            end,
        }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

impl Entity for LineEntity {
    fn type_name(&self) -> &'static str {
        "Line"
    }

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn geometric_extents(&self) -> BoundingBox3 {
        BoundingBox3::from_points([&self.start, &self.end])
    }

    fn draw(&self, ctx: &mut DrawContext<'_>) -> Option<Box<dyn RenderObject>> {
        Some(ctx.renderer.lines(&[self.start, self.end], &self.base.line_style()))
    }

    fn grip_points(&self) -> Vec<Point3> {
        vec![self.start, self.end]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// 圆弧图元，位于高度为 `elevation` 的水平面上
#[derive(Debug, Clone)]
pub struct ArcEntity {
    base: EntityBase,
    arc: CircularArc2d,
    pub elevation: f64,
    segments: usize,
}

impl ArcEntity {
    pub fn new(arc: CircularArc2d) -> Self {
        Self {
            base: EntityBase::new(),
            arc,
            elevation: 0.0,
            segments: SamplingConfig::default().arc_segments,
        }
    }

    pub fn arc(&self) -> &CircularArc2d {
        &self.arc
    }

    pub fn arc_mut(&mut self) -> &mut CircularArc2d {
        &mut self.arc
    }

    /// 绘制时的分段数
    pub fn with_sampling(mut self, config: &SamplingConfig) -> Self {
        self.segments = config.arc_segments;
        self
    }

    fn lift(&self, p: drawkit_geometry::math::Point2) -> Point3 {
        Point3::new(p.x, p.y, self.elevation)
    }
}

impl Entity for ArcEntity {
    fn type_name(&self) -> &'static str {
        "Arc"
    }

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn geometric_extents(&self) -> BoundingBox3 {
        self.arc.bounding_box().to_3d(self.elevation)
    }

    fn draw(&self, ctx: &mut DrawContext<'_>) -> Option<Box<dyn RenderObject>> {
        let points: Vec<Point3> = self
            .arc
            .get_points(self.segments)
            .into_iter()
            .map(|p| self.lift(p))
            .collect();
        Some(ctx.renderer.lines(&points, &self.base.line_style()))
    }

    fn grip_points(&self) -> Vec<Point3> {
        vec![
            self.lift(self.arc.center()),
            self.lift(self.arc.start_point()),
            self.lift(self.arc.mid_point()),
            self.lift(self.arc.end_point()),
        ]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// 样条图元
#[derive(Debug, Clone)]
pub struct SplineEntity {
    base: EntityBase,
    spline: Spline3d,
}

impl SplineEntity {
    /// 由控制点、节点向量和可选权重创建
    pub fn from_control_points(
        control_points: Vec<Point3>,
        knots: Vec<f64>,
        weights: Option<Vec<f64>>,
        closed: bool,
    ) -> Result<Self, ModelError> {
        let spline = Spline3d::from_control_points(control_points, knots, weights)?;
        Ok(Self::with_spline(spline, closed))
    }

    /// 由拟合点创建
    pub fn from_fit_points(
        fit_points: Vec<Point3>,
        parameterization: KnotParameterization,
        closed: bool,
    ) -> Result<Self, ModelError> {
        let spline = Spline3d::from_fit_points(fit_points, parameterization)?;
        Ok(Self::with_spline(spline, closed))
    }

    pub fn with_spline(mut spline: Spline3d, closed: bool) -> Self {
        spline.set_closed(closed);
        Self {
            base: EntityBase::new(),
            spline,
        }
    }

    /// 绘制、范围与弧长共用的采样数量
    pub fn with_sampling(mut self, config: &SamplingConfig) -> Self {
        self.spline.set_sampling(*config);
        self
    }

    pub fn spline(&self) -> &Spline3d {
        &self.spline
    }

    pub fn closed(&self) -> bool {
        self.spline.closed()
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.spline.set_closed(closed);
    }
}

impl Entity for SplineEntity {
    fn type_name(&self) -> &'static str {
        "Spline"
    }

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn geometric_extents(&self) -> BoundingBox3 {
        self.spline.bounding_box()
    }

    fn draw(&self, ctx: &mut DrawContext<'_>) -> Option<Box<dyn RenderObject>> {
        let points = self.spline.get_points(self.spline.sampling().spline_samples);
        Some(ctx.renderer.lines(&points, &self.base.line_style()))
    }

    fn grip_points(&self) -> Vec<Point3> {
        match self.spline.fit_points() {
            Some(points) => points.to_vec(),
            None => self.spline.control_points().to_vec(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
