//! DrawKit 图元模型
//!
//! 在几何内核之上提供可绘制图元、图形数据库和块渲染缓存。
//!
//! # 架构设计
//!
//! - `Database`：块表、图层表、图像定义与布局字典，以 `Rc` 共享
//! - `Entity`：图元接口，计算几何范围并绘制到 `Renderer`
//! - `RenderingCache`：按 (块名, 颜色) 缓存块内容的渲染结果
//!
//! # 示例
//!
//! ```rust
//! use drawkit_model::prelude::*;
//!
//! let db = Database::new();
//! let block = db.tables.block_table.create("Door").unwrap();
//! block.append_entity(LineEntity::new(Point3::origin(), Point3::new(1.0, 2.0, 0.0)));
//!
//! let mut reference = BlockReference::new("Door");
//! reference.set_position(Point3::new(10.0, 0.0, 0.0));
//! let reference = db.model_space().append_entity(reference);
//!
//! let extents = reference.geometric_extents();
//! assert_eq!(extents.max, Point3::new(11.0, 2.0, 0.0));
//! ```

pub mod block;
pub mod color;
pub mod curve;
pub mod database;
pub mod entity;
pub mod error;
pub mod layer;
pub mod layout;
pub mod raster_image;
pub mod render;
pub mod rendering_cache;

pub use error::ModelError;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::block::{BlockReference, BlockTable, BlockTableRecord, MODEL_SPACE};
    pub use crate::color::{Color, LineType};
    pub use crate::curve::{ArcEntity, LineEntity, SplineEntity};
    pub use crate::database::Database;
    pub use crate::entity::{DrawContext, Entity, EntityBase};
    pub use crate::error::ModelError;
    pub use crate::layer::Layer;
    pub use crate::layout::Layout;
    pub use crate::raster_image::{ClipBoundaryType, RasterImage, RasterImageDef};
    pub use crate::render::{
        ImageStyle, LineStyle, Primitive, RecordedObject, RecordingRenderer, RenderObject, Renderer,
    };
    pub use crate::rendering_cache::{CacheKey, RenderingCache};
    pub use drawkit_geometry::math::{BoundingBox3, Point2, Point3, Vector3};
}
