//! 块渲染缓存
//!
//! 以 (块名, 颜色) 为键缓存块内容的渲染结果，同一块被多次参照时只绘制一次子图元。
//! 进出缓存的对象一律深拷贝，调用方修改取回的对象不会影响缓存。

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use drawkit_geometry::math::Vector3;
use drawkit_geometry::matrix::Matrix4;
use tracing::debug;

use crate::block::BlockTableRecord;
use crate::color::Color;
use crate::entity::DrawContext;
use crate::render::{RenderObject, Renderer};

/// 缓存键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    name: String,
    color: u32,
}

impl CacheKey {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> u32 {
        self.color
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.name, self.color)
    }
}

thread_local! {
    static INSTANCE: RenderingCache = RenderingCache::new();
}

/// 块渲染缓存
///
/// 无淘汰策略，只能整体清空。不是 `Sync`，仅供单个线程使用。
#[derive(Debug, Default)]
pub struct RenderingCache {
    blocks: RefCell<HashMap<CacheKey, Box<dyn RenderObject>>>,
}

impl RenderingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 访问当前线程的共享实例
    pub fn with_instance<R>(f: impl FnOnce(&RenderingCache) -> R) -> R {
        INSTANCE.with(f)
    }

    /// 由块名和颜色（0xRRGGBB，0 表示不指定）生成键
    pub fn create_key(name: &str, color: u32) -> CacheKey {
        CacheKey {
            name: name.to_string(),
            color,
        }
    }

    /// 保存 `object` 的深拷贝，返回 `object` 本身
    pub fn set(&self, key: CacheKey, object: Box<dyn RenderObject>) -> Box<dyn RenderObject> {
        debug!("Caching block render: {}", key);
        self.blocks.borrow_mut().insert(key, object.fast_deep_clone());
        object
    }

    /// 取出缓存对象的深拷贝
    pub fn get(&self, key: &CacheKey) -> Option<Box<dyn RenderObject>> {
        self.blocks.borrow().get(key).map(|o| o.fast_deep_clone())
    }

    pub fn has(&self, key: &CacheKey) -> bool {
        self.blocks.borrow().contains_key(key)
    }

    pub fn clear(&self) {
        self.blocks.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.blocks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.borrow().is_empty()
    }

    /// 绘制块内容
    ///
    /// 未命中时逐个绘制子图元：颜色为 ByBlock 的子图元在 `color` 非 0 时临时使用该颜色，
    /// 绘制后恢复。`cache` 为 true 时把组合结果存入缓存。
    /// 之后对取得的（拷贝）对象依次应用实例变换与拉伸方向变换，不影响缓存内容。
    /// `record` 为 `None` 时返回空组。
    pub fn draw(
        &self,
        renderer: &mut dyn Renderer,
        record: Option<&BlockTableRecord>,
        color: u32,
        cache: bool,
        transform: Option<&Matrix4>,
        normal: Option<&Vector3>,
    ) -> Box<dyn RenderObject> {
        let Some(record) = record else {
            return renderer.group(Vec::new());
        };

        let key = Self::create_key(&record.name(), color);
        let mut block = match self.get(&key) {
            Some(block) => {
                debug!("Rendering cache hit: {}", key);
                block
            }
            None => {
                let group = self.render_children(renderer, record, color);
                if cache {
                    self.set(key, group)
                } else {
                    group
                }
            }
        };

        if let Some(transform) = transform {
            block.apply_matrix(transform);
            if let Some(normal) = normal {
                if normal.x != 0.0 || normal.y != 0.0 || normal.z != 1.0 {
                    block.apply_matrix(&Matrix4::from_extrusion_direction(normal));
                }
            }
        }

        block
    }

    fn render_children(
        &self,
        renderer: &mut dyn Renderer,
        record: &BlockTableRecord,
        color: u32,
    ) -> Box<dyn RenderObject> {
        let mut results = Vec::new();
        {
            let mut ctx = DrawContext::new(&mut *renderer, self);
            for entity in record.new_iterator() {
                let object = if entity.base().color().is_by_block() && color != 0 {
                    let _restore = entity.base().override_color(Color::from_hex(color));
                    entity.draw(&mut ctx)
                } else {
                    entity.draw(&mut ctx)
                };
                results.extend(object);
            }
        }
        renderer.group(results)
    }
}
