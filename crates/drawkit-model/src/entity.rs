//! 图元基础
//!
//! 所有图元共享 [`EntityBase`]（标识、图层、颜色、数据库反向引用），
//! 并实现 [`Entity`] 以提供范围计算与绘制。

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use drawkit_geometry::math::{BoundingBox3, Point3};

use crate::color::{Color, LineType};
use crate::database::Database;
use crate::layer::DEFAULT_LAYER;
use crate::render::{LineStyle, RenderObject, Renderer};
use crate::rendering_cache::RenderingCache;

/// 未解析到具体颜色时使用的 RGB 值
pub const DEFAULT_RGB: u32 = 0xFFFFFF;

/// 绘制上下文：渲染后端与块渲染缓存
pub struct DrawContext<'a> {
    pub renderer: &'a mut dyn Renderer,
    pub cache: &'a RenderingCache,
}

impl<'a> DrawContext<'a> {
    pub fn new(renderer: &'a mut dyn Renderer, cache: &'a RenderingCache) -> Self {
        Self { renderer, cache }
    }
}

/// 图元公共数据
#[derive(Debug, Clone)]
pub struct EntityBase {
    /// 对象句柄
    pub object_id: String,
    /// 所有者句柄
    pub owner_id: String,
    /// 图层名
    pub layer: String,
    color: Cell<Color>,
    pub line_type: LineType,
    pub visible: bool,
    database: Weak<Database>,
}

impl EntityBase {
    pub fn new() -> Self {
        Self {
            object_id: String::new(),
            owner_id: String::new(),
            layer: DEFAULT_LAYER.to_string(),
            color: Cell::new(Color::BY_LAYER),
            line_type: LineType::ByLayer,
            visible: true,
            database: Weak::new(),
        }
    }

    pub fn color(&self) -> Color {
        self.color.get()
    }

    pub fn set_color(&self, color: Color) {
        self.color.set(color);
    }

    /// 临时替换颜色，返回的守卫在释放时恢复原颜色
    pub fn override_color(&self, color: Color) -> ColorOverride<'_> {
        let original = self.color.replace(color);
        ColorOverride {
            base: self,
            original,
        }
    }

    /// 所属数据库（仅查询，不持有）
    pub fn database(&self) -> Option<Rc<Database>> {
        self.database.upgrade()
    }

    pub fn set_database(&mut self, database: Weak<Database>) {
        self.database = database;
    }

    /// 解析后的 RGB 颜色
    ///
    /// ByLayer 取图层颜色；ByBlock 在块外绘制时为白色。
    pub fn rgb_color(&self) -> u32 {
        let color = self.color.get();
        if color.is_by_block() {
            return DEFAULT_RGB;
        }
        if color.is_by_layer() {
            return self
                .database()
                .and_then(|db| db.tables.layer_table.get_at(&self.layer))
                .map_or(DEFAULT_RGB, |layer| layer.color.to_hex());
        }
        color.to_hex()
    }

    /// 按当前颜色与线型生成折线样式
    pub fn line_style(&self) -> LineStyle {
        LineStyle {
            color: self.rgb_color(),
            line_type: self.line_type.clone(),
        }
    }
}

impl Default for EntityBase {
    fn default() -> Self {
        Self::new()
    }
}

/// 颜色临时替换守卫
pub struct ColorOverride<'a> {
    base: &'a EntityBase,
    original: Color,
}

impl Drop for ColorOverride<'_> {
    fn drop(&mut self) {
        self.base.color.set(self.original);
    }
}

/// 可绘制图元
pub trait Entity: fmt::Debug {
    /// 类型名（如 "Line"、"Insert"）
    fn type_name(&self) -> &'static str;

    fn base(&self) -> &EntityBase;

    fn base_mut(&mut self) -> &mut EntityBase;

    /// 几何范围，每次调用重新计算
    fn geometric_extents(&self) -> BoundingBox3;

    /// 绘制到上下文中的渲染器
    fn draw(&self, ctx: &mut DrawContext<'_>) -> Option<Box<dyn RenderObject>>;

    /// 夹点
    fn grip_points(&self) -> Vec<Point3> {
        Vec::new()
    }

    fn as_any(&self) -> &dyn Any;
}
