//! 三维 NURBS 样条曲线
//!
//! 目前固定为三次。可由控制点 + 节点向量（+ 权重）或拟合点 + 参数化方式构造。
//! 构造时保存原始控制点/节点/权重，闭合后再打开可精确还原。

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::SamplingConfig;
use crate::curve::{BoundsCache, Curve3d};
use crate::error::GeometryError;
use crate::math::{BoundingBox3, Point3};
use crate::matrix::Matrix4;
use crate::nurbs::{self, KnotParameterization};

/// 样条次数
pub const SPLINE_DEGREE: usize = 3;

/// 动态形状的构造参数
///
/// 供参数个数/类型在运行时才确定的调用方（如数据导入）使用，
/// 由 [`Spline3d::from_arguments`] 分派到对应的构造函数。
#[derive(Debug, Clone, PartialEq)]
pub enum SplineArgument {
    Points(Vec<Point3>),
    Knots(Vec<f64>),
    Weights(Vec<f64>),
    Parameterization(KnotParameterization),
}

/// 三维 NURBS 样条
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spline3d {
    control_points: Vec<Point3>,
    knots: Vec<f64>,
    weights: Vec<f64>,
    fit_points: Option<Vec<Point3>>,
    knot_parameterization: Option<KnotParameterization>,
    closed: bool,
    original_control_points: Vec<Point3>,
    original_knots: Vec<f64>,
    original_weights: Vec<f64>,
    #[serde(skip)]
    sampling: SamplingConfig,
    #[serde(skip)]
    bbox: BoundsCache<BoundingBox3>,
}

impl Spline3d {
    /// 由控制点、节点向量和可选权重创建
    ///
    /// 节点数必须为 `控制点数 + 4`，省略权重时全部为 1。
    pub fn from_control_points(
        control_points: Vec<Point3>,
        knots: Vec<f64>,
        weights: Option<Vec<f64>>,
    ) -> Result<Self, GeometryError> {
        check_point_count(control_points.len())?;

        let expected = control_points.len() + SPLINE_DEGREE + 1;
        if knots.len() != expected {
            return Err(GeometryError::KnotCountMismatch {
                expected,
                actual: knots.len(),
            });
        }

        let weights = match weights {
            Some(weights) if weights.len() != control_points.len() => {
                return Err(GeometryError::WeightCountMismatch {
                    expected: control_points.len(),
                    actual: weights.len(),
                });
            }
            Some(weights) => weights,
            None => vec![1.0; control_points.len()],
        };

        Ok(Self::build(control_points, knots, weights, None, None))
    }

    /// 由拟合点与参数化方式创建，控制点由全局插值求得
    pub fn from_fit_points(
        fit_points: Vec<Point3>,
        parameterization: KnotParameterization,
    ) -> Result<Self, GeometryError> {
        check_point_count(fit_points.len())?;

        let params = nurbs::fit_parameters(&fit_points, parameterization);
        let knots = nurbs::averaged_knots(&params, SPLINE_DEGREE);
        let control_points =
            nurbs::interpolate_control_points(&fit_points, &params, &knots, SPLINE_DEGREE)?;
        let weights = vec![1.0; control_points.len()];

        debug!(
            "Interpolated {} fit points ({:?})",
            fit_points.len(),
            parameterization
        );

        Ok(Self::build(
            control_points,
            knots,
            weights,
            Some(fit_points),
            Some(parameterization),
        ))
    }

    /// 按参数形状分派：
    /// - `[Points, Knots]` / `[Points, Knots, Weights]`：控制点构造
    /// - `[Points, Parameterization]`：拟合点构造
    ///
    /// 其余形状（包括参数个数不是 2 或 3）返回 [`GeometryError::IllegalParameters`]。
    pub fn from_arguments(args: Vec<SplineArgument>) -> Result<Self, GeometryError> {
        use SplineArgument::*;

        let count = args.len();
        if count != 2 && count != 3 {
            return Err(GeometryError::IllegalParameters(format!(
                "spline expects 2 or 3 arguments, got {count}"
            )));
        }

        let mut args = args.into_iter();
        match (args.next(), args.next(), args.next()) {
            (Some(Points(points)), Some(Parameterization(p)), None) => {
                Self::from_fit_points(points, p)
            }
            (Some(Points(points)), Some(Knots(knots)), None) => {
                Self::from_control_points(points, knots, None)
            }
            (Some(Points(points)), Some(Knots(knots)), Some(Weights(weights))) => {
                Self::from_control_points(points, knots, Some(weights))
            }
            _ => Err(GeometryError::IllegalParameters(
                "unsupported spline argument shape".to_string(),
            )),
        }
    }

    fn build(
        control_points: Vec<Point3>,
        knots: Vec<f64>,
        weights: Vec<f64>,
        fit_points: Option<Vec<Point3>>,
        knot_parameterization: Option<KnotParameterization>,
    ) -> Self {
        Self {
            original_control_points: control_points.clone(),
            original_knots: knots.clone(),
            original_weights: weights.clone(),
            control_points,
            knots,
            weights,
            fit_points,
            knot_parameterization,
            closed: false,
            sampling: SamplingConfig::default(),
            bbox: BoundsCache::new(),
        }
    }

    /// 包围盒与弧长计算使用的采样数量
    pub fn sampling(&self) -> &SamplingConfig {
        &self.sampling
    }

    pub fn set_sampling(&mut self, sampling: SamplingConfig) {
        if self.sampling != sampling {
            self.sampling = sampling;
            self.bbox.invalidate();
        }
    }

    pub fn degree(&self) -> usize {
        SPLINE_DEGREE
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn control_points(&self) -> &[Point3] {
        &self.control_points
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn num_control_points(&self) -> usize {
        self.control_points.len()
    }

    pub fn fit_points(&self) -> Option<&[Point3]> {
        self.fit_points.as_deref()
    }

    pub fn num_fit_points(&self) -> usize {
        self.fit_points.as_ref().map_or(0, Vec::len)
    }

    pub fn knot_parameterization(&self) -> Option<KnotParameterization> {
        self.knot_parameterization
    }

    /// 第 `index` 个控制点，越界时返回最后一个
    pub fn control_point_at(&self, index: usize) -> Point3 {
        let last = self.control_points.len() - 1;
        self.control_points[index.min(last)]
    }

    /// 第 `index` 个拟合点，越界时返回最后一个；非拟合点构造的样条返回 `None`
    pub fn fit_point_at(&self, index: usize) -> Option<Point3> {
        self.fit_points
            .as_ref()
            .and_then(|points| points.get(index).or_else(|| points.last()))
            .copied()
    }

    /// 有效参数域
    pub fn parameter_domain(&self) -> (f64, f64) {
        nurbs::parameter_domain(SPLINE_DEGREE, &self.knots)
    }

    /// 参数 `u` 处的点
    pub fn point(&self, u: f64) -> Point3 {
        nurbs::evaluate_point(u, SPLINE_DEGREE, &self.knots, &self.control_points, &self.weights)
    }

    /// 设置闭合状态
    ///
    /// 闭合：在末尾追加前 3 个控制点与权重，节点改为 `0..n+6` 的整数序列。
    /// 打开：恢复构造时保存的原始数据。
    pub fn set_closed(&mut self, closed: bool) {
        if self.closed == closed {
            return;
        }
        self.closed = closed;
        self.bbox.invalidate();

        if closed {
            self.make_closed();
        } else {
            self.make_open();
        }
    }

    fn make_closed(&mut self) {
        let n = self.control_points.len();
        let head = n.min(SPLINE_DEGREE);

        let mut control_points = self.control_points.clone();
        control_points.extend_from_within(..head);
        let mut weights = self.weights.clone();
        weights.extend_from_within(..head);

        self.knots = (0..n + 2 * SPLINE_DEGREE + 1).map(|i| i as f64).collect();
        self.control_points = control_points;
        self.weights = weights;

        trace!("Spline closed: {} -> {} control points", n, self.control_points.len());
    }

    fn make_open(&mut self) {
        self.control_points = self.original_control_points.clone();
        self.knots = self.original_knots.clone();
        self.weights = self.original_weights.clone();

        trace!("Spline reopened with {} control points", self.control_points.len());
    }

    /// 指定采样数计算弧长
    pub fn length_with_samples(&self, samples: usize) -> f64 {
        nurbs::curve_length(
            SPLINE_DEGREE,
            &self.knots,
            &self.control_points,
            &self.weights,
            samples,
        )
    }
}

fn check_point_count(actual: usize) -> Result<(), GeometryError> {
    let required = SPLINE_DEGREE + 1;
    if actual < required {
        return Err(GeometryError::InsufficientPoints { required, actual });
    }
    Ok(())
}

impl Curve3d for Spline3d {
    fn length(&self) -> f64 {
        self.length_with_samples(self.sampling.length_samples)
    }

    fn bounding_box(&self) -> BoundingBox3 {
        self.bbox.get_or_compute(|| {
            let points = self.get_points(self.sampling.spline_samples);
            BoundingBox3::from_points(&points)
        })
    }

    fn start_point(&self) -> Point3 {
        let (start, _) = self.parameter_domain();
        self.point(start)
    }

    fn end_point(&self) -> Point3 {
        if self.closed {
            return self.start_point();
        }
        let (_, end) = self.parameter_domain();
        self.point(end)
    }

    fn closed(&self) -> bool {
        self.closed
    }

    /// 闭合时采样 `num_points - 1` 个点并在末尾重复首点；打开时最后一点精确取在域终点
    fn get_points(&self, num_points: usize) -> Vec<Point3> {
        let num_points = num_points.max(2);
        let (start, end) = self.parameter_domain();
        let step = (end - start) / (num_points - 1) as f64;
        // 包围盒缓存不是 Sync，并行求值只借用曲线数据
        let (knots, control_points, weights) = (&self.knots, &self.control_points, &self.weights);
        let eval = |u: f64| nurbs::evaluate_point(u, SPLINE_DEGREE, knots, control_points, weights);

        if self.closed {
            let mut points: Vec<Point3> = (0..num_points - 1)
                .into_par_iter()
                .map(|i| eval(start + i as f64 * step))
                .collect();
            points.push(points[0]);
            points
        } else {
            (0..num_points)
                .into_par_iter()
                .map(|i| {
                    if i == num_points - 1 {
                        eval(end)
                    } else {
                        eval(start + i as f64 * step)
                    }
                })
                .collect()
        }
    }

    /// 仿射变换作用于控制点、原始控制点与拟合点
    fn transform(&mut self, matrix: &Matrix4) -> &mut Self {
        let apply = |points: &mut Vec<Point3>| {
            for p in points.iter_mut() {
                *p = matrix.transform_point(p);
            }
        };
        apply(&mut self.control_points);
        apply(&mut self.original_control_points);
        if let Some(fit_points) = self.fit_points.as_mut() {
            apply(fit_points);
        }
        self.bbox.invalidate();
        self
    }
}
