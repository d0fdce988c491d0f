//! 渲染能力接口
//!
//! 图元只依赖 [`Renderer`] 生成 [`RenderObject`]，具体后端由调用方提供。
//! [`RecordingRenderer`] 是内存中的实现，把绘制结果记录为 [`Primitive`] 树。

use std::any::Any;
use std::fmt;

use drawkit_geometry::math::{BoundingBox3, Point3};
use drawkit_geometry::matrix::Matrix4;
use tracing::warn;

use crate::color::LineType;

/// 渲染后端生成的对象
pub trait RenderObject: fmt::Debug {
    /// 原地应用变换
    fn apply_matrix(&mut self, matrix: &Matrix4);

    /// 结构上独立的深拷贝
    fn fast_deep_clone(&self) -> Box<dyn RenderObject>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// 折线样式
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    /// 0xRRGGBB
    pub color: u32,
    pub line_type: LineType,
}

/// 图像样式
#[derive(Debug, Clone, PartialEq)]
pub struct ImageStyle {
    /// 世界坐标下的闭合边界
    pub boundary: Vec<Point3>,
    pub rotation: f64,
}

/// 渲染能力
pub trait Renderer {
    fn lines(&mut self, points: &[Point3], style: &LineStyle) -> Box<dyn RenderObject>;

    fn image(&mut self, image: &[u8], style: &ImageStyle) -> Box<dyn RenderObject>;

    fn group(&mut self, children: Vec<Box<dyn RenderObject>>) -> Box<dyn RenderObject>;
}

/// 记录下来的绘制结果
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Lines { points: Vec<Point3>, color: u32 },
    Image { boundary: Vec<Point3>, rotation: f64, byte_len: usize },
    Group(Vec<Primitive>),
}

impl Primitive {
    fn apply_matrix(&mut self, matrix: &Matrix4) {
        match self {
            Primitive::Lines { points, .. } | Primitive::Image { boundary: points, .. } => {
                for p in points.iter_mut() {
                    *p = matrix.transform_point(p);
                }
            }
            Primitive::Group(children) => {
                for child in children.iter_mut() {
                    child.apply_matrix(matrix);
                }
            }
        }
    }

    /// 子树中的所有点
    pub fn points(&self) -> Vec<Point3> {
        match self {
            Primitive::Lines { points, .. } | Primitive::Image { boundary: points, .. } => {
                points.clone()
            }
            Primitive::Group(children) => children.iter().flat_map(Primitive::points).collect(),
        }
    }

    /// 子树中所有折线的颜色（深度优先）
    pub fn line_colors(&self) -> Vec<u32> {
        match self {
            Primitive::Lines { color, .. } => vec![*color],
            Primitive::Image { .. } => vec![],
            Primitive::Group(children) => children.iter().flat_map(Primitive::line_colors).collect(),
        }
    }

    pub fn bounding_box(&self) -> BoundingBox3 {
        BoundingBox3::from_points(&self.points())
    }
}

/// [`RecordingRenderer`] 生成的渲染对象
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedObject(pub Primitive);

impl RecordedObject {
    /// 从任意渲染对象中取出记录的图元
    pub fn primitive_of(object: &dyn RenderObject) -> Option<&Primitive> {
        object
            .as_any()
            .downcast_ref::<RecordedObject>()
            .map(|o| &o.0)
    }
}

impl RenderObject for RecordedObject {
    fn apply_matrix(&mut self, matrix: &Matrix4) {
        self.0.apply_matrix(matrix);
    }

    fn fast_deep_clone(&self) -> Box<dyn RenderObject> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// 各类绘制调用的次数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub lines: usize,
    pub images: usize,
    pub groups: usize,
}

/// 记录绘制调用的渲染器
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    stats: RenderStats,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }
}

impl Renderer for RecordingRenderer {
    fn lines(&mut self, points: &[Point3], style: &LineStyle) -> Box<dyn RenderObject> {
        self.stats.lines += 1;
        Box::new(RecordedObject(Primitive::Lines {
            points: points.to_vec(),
            color: style.color,
        }))
    }

    fn image(&mut self, image: &[u8], style: &ImageStyle) -> Box<dyn RenderObject> {
        self.stats.images += 1;
        Box::new(RecordedObject(Primitive::Image {
            boundary: style.boundary.clone(),
            rotation: style.rotation,
            byte_len: image.len(),
        }))
    }

    fn group(&mut self, children: Vec<Box<dyn RenderObject>>) -> Box<dyn RenderObject> {
        self.stats.groups += 1;
        let children = children
            .into_iter()
            .filter_map(|child| match child.into_any().downcast::<RecordedObject>() {
                Ok(recorded) => Some(recorded.0),
                Err(_) => {
                    warn!("Skipping render object from a foreign backend");
                    None
                }
            })
            .collect();
        Box::new(RecordedObject(Primitive::Group(children)))
    }
}
