//! 光栅图像
//!
//! 图像本身由外部图像定义对象（[`RasterImageDef`]）描述文件来源，
//! 图元只保存插入位置、尺寸、裁剪边界和显示选项。

use std::any::Any;

use drawkit_geometry::math::{BoundingBox2, BoundingBox3, Point2, Point3, Vector2};
use serde::{Deserialize, Serialize};

use crate::entity::{DrawContext, Entity, EntityBase};
use crate::render::{ImageStyle, RenderObject};

/// 裁剪边界类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClipBoundaryType {
    Invalid = 0,
    #[default]
    Rect = 1,
    Poly = 2,
}

/// 显示选项位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageDisplayOpt {
    Show = 1,
    ShowUnAligned = 2,
    Clip = 4,
    Transparent = 8,
}

impl ImageDisplayOpt {
    pub fn bit(self) -> u8 {
        self as u8
    }
}

/// 图像定义
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RasterImageDef {
    pub object_id: String,
    pub owner_id: String,
    /// 图像文件路径
    pub source_file_name: String,
    /// 像素尺寸
    pub size: Vector2,
}

/// 光栅图像图元
#[derive(Debug, Clone)]
pub struct RasterImage {
    base: EntityBase,
    pub brightness: f64,
    pub contrast: f64,
    pub fade: f64,
    pub width: f64,
    pub height: f64,
    pub position: Point3,
    pub rotation: f64,
    pub scale: Vector2,
    pub clip_boundary_type: ClipBoundaryType,
    clip_boundary: Vec<Point2>,
    pub is_clipped: bool,
    pub is_image_shown: bool,
    pub is_image_transparent: bool,
    pub image: Option<Vec<u8>>,
    pub image_def_id: String,
}

impl RasterImage {
    pub fn new() -> Self {
        Self {
            base: EntityBase::new(),
            brightness: 50.0,
            contrast: 50.0,
            fade: 0.0,
            width: 0.0,
            height: 0.0,
            position: Point3::origin(),
            rotation: 0.0,
            scale: Vector2::new(1.0, 1.0),
            clip_boundary_type: ClipBoundaryType::Rect,
            clip_boundary: Vec::new(),
            is_clipped: false,
            is_image_shown: true,
            is_image_transparent: false,
            image: None,
            image_def_id: String::new(),
        }
    }

    /// 裁剪边界（像素坐标）
    pub fn clip_boundary(&self) -> &[Point2] {
        &self.clip_boundary
    }

    pub fn set_clip_boundary(&mut self, boundary: impl IntoIterator<Item = Point2>) {
        self.clip_boundary = boundary.into_iter().collect();
    }

    /// 显示选项位组合
    pub fn display_flags(&self) -> u8 {
        let mut flags = 0;
        if self.is_image_shown {
            flags |= ImageDisplayOpt::Show.bit();
        }
        if self.is_clipped {
            flags |= ImageDisplayOpt::Clip.bit();
        }
        if self.is_image_transparent {
            flags |= ImageDisplayOpt::Transparent.bit();
        }
        flags
    }

    /// 由图像定义解析的源文件名，定义缺失时为空串
    pub fn image_file_name(&self) -> String {
        if self.image_def_id.is_empty() {
            return String::new();
        }
        self.base
            .database()
            .and_then(|db| db.dictionaries.image_defs.get_id_at(&self.image_def_id))
            .map(|def| def.source_file_name)
            .unwrap_or_default()
    }

    /// 世界坐标下的闭合边界
    ///
    /// 裁剪且顶点多于 3 个时，把像素坐标按宽高缩放，并平移使多边形最小角落在插入点；
    /// 否则取未裁剪矩形的四个角，旋转角为正时其余三个角绕第一个角旋转。
    pub fn boundary_path(&self) -> Vec<Point3> {
        let z = self.position.z;
        let mut points: Vec<Point3> = if self.is_clipped && self.clip_boundary.len() > 3 {
            let pixel_box = BoundingBox2::from_points(self.clip_boundary.iter().copied());
            let tx = self.position.x - pixel_box.min.x * self.width;
            let ty = self.position.y - pixel_box.min.y * self.height;
            self.clip_boundary
                .iter()
                .map(|p| Point3::new(p.x * self.width + tx, p.y * self.height + ty, z))
                .collect()
        } else {
            let (x, y) = (self.position.x, self.position.y);
            let mut corners = vec![
                Point3::new(x, y, z),
                Point3::new(x + self.width, y, z),
                Point3::new(x + self.width, y + self.height, z),
                Point3::new(x, y + self.height, z),
            ];
            if self.rotation > 0.0 {
                let (sin, cos) = self.rotation.sin_cos();
                let anchor = corners[0];
                for corner in corners.iter_mut().skip(1) {
                    let (dx, dy) = (corner.x - anchor.x, corner.y - anchor.y);
                    corner.x = anchor.x + dx * cos - dy * sin;
                    corner.y = anchor.y + dx * sin + dy * cos;
                }
            }
            corners
        };

        if let (Some(first), Some(last)) = (points.first().copied(), points.last()) {
            if first != *last {
                points.push(first);
            }
        }
        points
    }
}

impl Default for RasterImage {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for RasterImage {
    fn type_name(&self) -> &'static str {
        "Image"
    }

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    /// 从插入点到 (宽, 高) 的轴对齐盒，不考虑旋转与裁剪
    fn geometric_extents(&self) -> BoundingBox3 {
        BoundingBox3::new(
            self.position,
            Point3::new(
                self.position.x + self.width,
                self.position.y + self.height,
                self.position.z,
            ),
        )
    }

    fn draw(&self, ctx: &mut DrawContext<'_>) -> Option<Box<dyn RenderObject>> {
        let points = self.boundary_path();
        let object = match &self.image {
            Some(image) => ctx.renderer.image(
                image,
                &ImageStyle {
                    boundary: points,
                    rotation: self.rotation,
                },
            ),
            None => ctx.renderer.lines(&points, &self.base.line_style()),
        };
        Some(object)
    }

    fn grip_points(&self) -> Vec<Point3> {
        self.boundary_path()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
