//! 图形数据库
//!
//! 数据库以 `Rc<Database>` 共享，图元通过 `Weak` 反向引用查询块表、图层表和字典，
//! 但不持有数据库。

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::block::{BlockTable, BlockTableRecord, MODEL_SPACE};
use crate::layer::LayerTable;
use crate::layout::Layout;
use crate::raster_image::RasterImageDef;

/// 符号表
#[derive(Debug)]
pub struct DatabaseTables {
    pub block_table: BlockTable,
    pub layer_table: LayerTable,
}

/// 以对象句柄为键的字典
#[derive(Debug)]
pub struct ObjectDictionary<T: Clone> {
    entries: RefCell<BTreeMap<String, T>>,
}

impl<T: Clone> ObjectDictionary<T> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(BTreeMap::new()),
        }
    }

    /// 添加或替换
    pub fn set_at(&self, id: impl Into<String>, value: T) {
        self.entries.borrow_mut().insert(id.into(), value);
    }

    /// 按句柄查找（返回副本）
    pub fn get_id_at(&self, id: &str) -> Option<T> {
        self.entries.borrow().get(id).cloned()
    }

    pub fn has(&self, id: &str) -> bool {
        self.entries.borrow().contains_key(id)
    }

    pub fn remove(&self, id: &str) -> Option<T> {
        self.entries.borrow_mut().remove(id)
    }

    pub fn values(&self) -> Vec<T> {
        self.entries.borrow().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<T: Clone> Default for ObjectDictionary<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// 命名对象字典
#[derive(Debug, Default)]
pub struct DatabaseDictionaries {
    pub image_defs: ObjectDictionary<RasterImageDef>,
    pub layouts: ObjectDictionary<Layout>,
}

/// 图形数据库
#[derive(Debug)]
pub struct Database {
    pub tables: DatabaseTables,
    pub dictionaries: DatabaseDictionaries,
    model_space: Rc<BlockTableRecord>,
}

impl Database {
    /// 创建含模型空间块与 "0" 层的空数据库
    pub fn new() -> Rc<Database> {
        Rc::new_cyclic(|weak| {
            let block_table = BlockTable::new(weak.clone());
            let model_space = block_table.insert_new(MODEL_SPACE);
            Database {
                tables: DatabaseTables {
                    block_table,
                    layer_table: LayerTable::new(),
                },
                dictionaries: DatabaseDictionaries::default(),
                model_space,
            }
        })
    }

    /// 模型空间块表记录
    pub fn model_space(&self) -> Rc<BlockTableRecord> {
        Rc::clone(&self.model_space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::LineEntity;
    use crate::entity::Entity;
    use drawkit_geometry::math::Point3;

    #[test]
    fn test_new_database() {
        let db = Database::new();
        assert!(db.tables.block_table.has(MODEL_SPACE));
        assert!(db.tables.layer_table.has("0"));
        assert!(db.dictionaries.image_defs.is_empty());
    }

    #[test]
    fn test_appended_entity_sees_database() {
        let db = Database::new();
        let line = db
            .model_space()
            .append_entity(LineEntity::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0)));
        let back = line.base().database().unwrap();
        assert!(Rc::ptr_eq(&back, &db));
        assert_eq!(line.base().owner_id, MODEL_SPACE);
    }

    #[test]
    fn test_back_reference_does_not_keep_database_alive() {
        let db = Database::new();
        let line = db
            .model_space()
            .append_entity(LineEntity::new(Point3::origin(), Point3::origin()));
        drop(db);
        assert!(line.base().database().is_none());
    }

    #[test]
    fn test_dictionary() {
        let db = Database::new();
        db.dictionaries.image_defs.set_at(
            "2A",
            RasterImageDef {
                source_file_name: "site.png".to_string(),
                ..Default::default()
            },
        );
        assert_eq!(db.dictionaries.image_defs.get_id_at("2A").unwrap().source_file_name, "site.png");
        assert!(db.dictionaries.image_defs.get_id_at("2B").is_none());
    }
}
