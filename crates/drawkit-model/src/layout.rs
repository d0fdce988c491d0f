//! 布局
//!
//! 每个布局对应一个块表记录（模型空间或某个图纸空间），并记录图限与范围。

use drawkit_geometry::math::{BoundingBox2, BoundingBox3};
use serde::{Deserialize, Serialize};

/// 布局对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub object_id: String,
    pub owner_id: String,
    /// 布局名称（"Model"、"Layout1"...）
    pub layout_name: String,
    /// 标签页顺序
    pub tab_order: i32,
    /// 关联的块表记录
    pub block_table_record_id: String,
    /// 图限
    pub limits: BoundingBox2,
    /// 范围
    pub extents: BoundingBox3,
}

impl Layout {
    pub fn new(layout_name: impl Into<String>) -> Self {
        Self {
            object_id: String::new(),
            owner_id: String::new(),
            layout_name: layout_name.into(),
            tab_order: 0,
            block_table_record_id: String::new(),
            limits: BoundingBox2::empty(),
            extents: BoundingBox3::empty(),
        }
    }

    /// 是否为模型空间布局
    pub fn is_model(&self) -> bool {
        self.layout_name.eq_ignore_ascii_case("model")
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new("")
    }
}
