//! 图层表
//!
//! 图层以名称区分，"0" 层始终存在且不能删除或重命名。

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::color::{Color, LineType};
use crate::error::ModelError;

/// 默认图层名
pub const DEFAULT_LAYER: &str = "0";

/// 图层定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// 图层名称
    pub name: String,

    /// 图层颜色
    pub color: Color,

    /// 图层线型
    pub line_type: LineType,

    /// 是否可见
    pub visible: bool,

    /// 是否冻结
    pub frozen: bool,

    /// 是否锁定
    pub locked: bool,
}

impl Layer {
    /// 创建新图层
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: Color::WHITE,
            line_type: LineType::Continuous,
            visible: true,
            frozen: false,
            locked: false,
        }
    }

    /// 设置颜色
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// 检查图层上的实体是否应该显示
    pub fn should_display(&self) -> bool {
        self.visible && !self.frozen
    }
}

/// 图层表
///
/// 由数据库共享持有，通过内部可变性在共享引用下增删图层。
#[derive(Debug)]
pub struct LayerTable {
    layers: RefCell<Vec<Layer>>,
}

impl LayerTable {
    /// 创建只含 "0" 层的图层表
    pub fn new() -> Self {
        Self {
            layers: RefCell::new(vec![Layer::new(DEFAULT_LAYER)]),
        }
    }

    /// 添加图层，名称重复时报错
    pub fn add(&self, layer: Layer) -> Result<(), ModelError> {
        if self.has(&layer.name) {
            return Err(ModelError::DuplicateLayer(layer.name));
        }
        self.layers.borrow_mut().push(layer);
        Ok(())
    }

    /// 按名称获取图层副本
    pub fn get_at(&self, name: &str) -> Option<Layer> {
        self.layers.borrow().iter().find(|l| l.name == name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.layers.borrow().iter().any(|l| l.name == name)
    }

    /// 修改图层颜色
    pub fn set_color(&self, name: &str, color: Color) -> Result<(), ModelError> {
        let mut layers = self.layers.borrow_mut();
        let layer = layers
            .iter_mut()
            .find(|l| l.name == name)
            .ok_or_else(|| ModelError::LayerNotFound(name.to_string()))?;
        layer.color = color;
        Ok(())
    }

    /// 删除图层
    pub fn remove(&self, name: &str) -> Result<Layer, ModelError> {
        if name == DEFAULT_LAYER {
            return Err(ModelError::ProtectedLayer);
        }
        let mut layers = self.layers.borrow_mut();
        let idx = layers
            .iter()
            .position(|l| l.name == name)
            .ok_or_else(|| ModelError::LayerNotFound(name.to_string()))?;
        Ok(layers.remove(idx))
    }

    /// 重命名图层
    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<(), ModelError> {
        if old_name == DEFAULT_LAYER {
            return Err(ModelError::ProtectedLayer);
        }
        if self.has(new_name) {
            return Err(ModelError::DuplicateLayer(new_name.to_string()));
        }
        let mut layers = self.layers.borrow_mut();
        let layer = layers
            .iter_mut()
            .find(|l| l.name == old_name)
            .ok_or_else(|| ModelError::LayerNotFound(old_name.to_string()))?;
        layer.name = new_name.to_string();
        Ok(())
    }

    /// 所有图层名
    pub fn names(&self) -> Vec<String> {
        self.layers.borrow().iter().map(|l| l.name.clone()).collect()
    }

    /// 图层数量
    pub fn len(&self) -> usize {
        self.layers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.borrow().is_empty()
    }
}

impl Default for LayerTable {
    fn default() -> Self {
        Self::new()
    }
}
