//! 块表与块参照
//!
//! 块表记录是一组图元的集合，定义在自己的坐标系中。
//! 块参照按名称在绘制/计算范围时从数据库解析块表记录，不缓存解析结果，
//! 因此重命名或重新定义块会立即生效。

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use drawkit_geometry::math::{BoundingBox3, Point3, Vector3};
use drawkit_geometry::matrix::Matrix4;
use drawkit_geometry::quaternion::Quaternion;
use tracing::{debug, warn};

use crate::database::Database;
use crate::entity::{DrawContext, Entity, EntityBase};
use crate::error::ModelError;
use crate::render::RenderObject;

/// 模型空间块名
pub const MODEL_SPACE: &str = "*Model_Space";

/// 块表记录
#[derive(Debug)]
pub struct BlockTableRecord {
    name: RefCell<String>,
    base_point: RefCell<Point3>,
    entities: RefCell<Vec<Rc<dyn Entity>>>,
    database: Weak<Database>,
}

impl BlockTableRecord {
    fn new(name: &str, database: Weak<Database>) -> Self {
        Self {
            name: RefCell::new(name.to_string()),
            base_point: RefCell::new(Point3::origin()),
            entities: RefCell::new(Vec::new()),
            database,
        }
    }

    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    pub fn base_point(&self) -> Point3 {
        *self.base_point.borrow()
    }

    pub fn set_base_point(&self, point: Point3) {
        *self.base_point.borrow_mut() = point;
    }

    /// 添加图元，设置其数据库反向引用与所有者
    pub fn append_entity<E: Entity + 'static>(&self, mut entity: E) -> Rc<dyn Entity> {
        entity.base_mut().set_database(self.database.clone());
        if entity.base().owner_id.is_empty() {
            entity.base_mut().owner_id = self.name();
        }
        let entity: Rc<dyn Entity> = Rc::new(entity);
        self.entities.borrow_mut().push(Rc::clone(&entity));
        entity
    }

    /// 添加已装箱的图元（类型在运行时确定时使用）
    pub fn append_boxed(&self, mut entity: Box<dyn Entity>) -> Rc<dyn Entity> {
        entity.base_mut().set_database(self.database.clone());
        if entity.base().owner_id.is_empty() {
            entity.base_mut().owner_id = self.name();
        }
        let entity: Rc<dyn Entity> = Rc::from(entity);
        self.entities.borrow_mut().push(Rc::clone(&entity));
        entity
    }

    /// 每次调用返回一个新的遍历（基于当前图元列表的快照）
    pub fn new_iterator(&self) -> std::vec::IntoIter<Rc<dyn Entity>> {
        self.entities.borrow().clone().into_iter()
    }

    pub fn len(&self) -> usize {
        self.entities.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.borrow().is_empty()
    }

    /// 所有子图元范围的并集（块坐标系）
    pub fn extents(&self) -> BoundingBox3 {
        self.new_iterator()
            .fold(BoundingBox3::empty(), |acc, e| acc.union(&e.geometric_extents()))
    }
}

/// 块表 - 管理所有块定义
#[derive(Debug)]
pub struct BlockTable {
    /// 块定义（按名称索引）
    records: RefCell<HashMap<String, Rc<BlockTableRecord>>>,
    database: Weak<Database>,
}

impl BlockTable {
    pub(crate) fn new(database: Weak<Database>) -> Self {
        Self {
            records: RefCell::new(HashMap::new()),
            database,
        }
    }

    /// 创建块表记录，名称重复时报错
    pub fn create(&self, name: &str) -> Result<Rc<BlockTableRecord>, ModelError> {
        if self.has(name) {
            return Err(ModelError::DuplicateBlock(name.to_string()));
        }
        Ok(self.insert_new(name))
    }

    pub(crate) fn insert_new(&self, name: &str) -> Rc<BlockTableRecord> {
        let record = Rc::new(BlockTableRecord::new(name, self.database.clone()));
        self.records
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&record));
        record
    }

    /// 按名称获取块表记录
    pub fn get_at(&self, name: &str) -> Option<Rc<BlockTableRecord>> {
        self.records.borrow().get(name).cloned()
    }

    /// 检查块是否存在
    pub fn has(&self, name: &str) -> bool {
        self.records.borrow().contains_key(name)
    }

    /// 移除块定义
    pub fn remove(&self, name: &str) -> Option<Rc<BlockTableRecord>> {
        self.records.borrow_mut().remove(name)
    }

    /// 重命名块
    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<(), ModelError> {
        if self.has(new_name) {
            return Err(ModelError::DuplicateBlock(new_name.to_string()));
        }
        let mut records = self.records.borrow_mut();
        let record = records
            .remove(old_name)
            .ok_or_else(|| ModelError::BlockNotFound(old_name.to_string()))?;
        *record.name.borrow_mut() = new_name.to_string();
        records.insert(new_name.to_string(), record);
        Ok(())
    }

    /// 获取所有块名称（已排序）
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.records.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// 获取块数量
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

/// 块参照
///
/// 块定义的一个实例，有自己的位置、绕局部 Z 轴的旋转、非均匀缩放和拉伸方向。
#[derive(Debug, Clone)]
pub struct BlockReference {
    base: EntityBase,
    /// 参照的块名称
    block_name: String,
    /// 插入点
    position: Point3,
    /// 旋转角度（弧度）
    rotation: f64,
    /// 各轴缩放
    scale_factors: Point3,
    /// 拉伸方向（单位向量）
    normal: Vector3,
}

impl BlockReference {
    pub fn new(block_name: impl Into<String>) -> Self {
        Self {
            base: EntityBase::new(),
            block_name: block_name.into(),
            position: Point3::origin(),
            rotation: 0.0,
            scale_factors: Point3::new(1.0, 1.0, 1.0),
            normal: Vector3::z(),
        }
    }

    pub fn block_name(&self) -> &str {
        &self.block_name
    }

    pub fn set_block_name(&mut self, name: impl Into<String>) {
        self.block_name = name.into();
    }

    pub fn position(&self) -> Point3 {
        self.position
    }

    pub fn set_position(&mut self, position: Point3) {
        self.position = position;
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
    }

    pub fn scale_factors(&self) -> Point3 {
        self.scale_factors
    }

    pub fn set_scale_factors(&mut self, scale_factors: Point3) {
        self.scale_factors = scale_factors;
    }

    pub fn normal(&self) -> Vector3 {
        self.normal
    }

    /// 设置拉伸方向，自动归一化
    pub fn set_normal(&mut self, normal: Vector3) {
        self.normal = normal.normalize();
    }

    /// 从数据库解析块表记录
    pub fn block_table_record(&self) -> Option<Rc<BlockTableRecord>> {
        let record = self
            .base
            .database()
            .and_then(|db| db.tables.block_table.get_at(&self.block_name));
        if record.is_none() {
            debug!("Block '{}' is not defined", self.block_name);
        }
        record
    }

    /// 块坐标到世界坐标的实例变换
    pub fn transform_matrix(&self) -> Matrix4 {
        Matrix4::compose(
            &self.position.coords,
            &Quaternion::from_z_rotation(self.rotation),
            &self.scale_factors.coords,
        )
    }
}

impl Entity for BlockReference {
    fn type_name(&self) -> &'static str {
        "Insert"
    }

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    /// 先合并子图元范围，再整体应用实例变换
    fn geometric_extents(&self) -> BoundingBox3 {
        let local = self
            .block_table_record()
            .map_or_else(BoundingBox3::empty, |record| record.extents());
        local.apply_matrix4(&self.transform_matrix())
    }

    fn draw(&self, ctx: &mut DrawContext<'_>) -> Option<Box<dyn RenderObject>> {
        let Some(record) = self.block_table_record() else {
            warn!("Drawing reference to missing block '{}'", self.block_name);
            return Some(ctx.renderer.group(Vec::new()));
        };

        let matrix = self.transform_matrix();
        Some(ctx.cache.draw(
            &mut *ctx.renderer,
            Some(record.as_ref()),
            self.base.rgb_color(),
            true,
            Some(&matrix),
            Some(&self.normal),
        ))
    }

    fn grip_points(&self) -> Vec<Point3> {
        vec![self.position]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawkit_geometry::math::points3_approx_eq;

    #[test]
    fn test_block_table_crud() {
        let table = BlockTable::new(Weak::new());
        let record = table.create("Door").unwrap();
        assert_eq!(record.name(), "Door");
        assert_eq!(
            table.create("Door").unwrap_err(),
            ModelError::DuplicateBlock("Door".to_string())
        );

        table.rename("Door", "Gate").unwrap();
        assert!(!table.has("Door"));
        assert_eq!(table.get_at("Gate").unwrap().name(), "Gate");
        assert_eq!(
            table.rename("Door", "X").unwrap_err(),
            ModelError::BlockNotFound("Door".to_string())
        );

        assert!(table.remove("Gate").is_some());
        assert!(table.is_empty());
    }

    #[test]
    fn test_transform_matrix() {
        let mut reference = BlockReference::new("Test");
        reference.set_position(Point3::new(100.0, 100.0, 0.0));
        reference.set_scale_factors(Point3::new(2.0, 2.0, 1.0));
        reference.set_rotation(std::f64::consts::FRAC_PI_2);

        // 缩放 2x：(20, 0)；旋转 90°：(0, 20)；平移到 (100, 100)：(100, 120)
        let p = reference
            .transform_matrix()
            .transform_point(&Point3::new(10.0, 0.0, 0.0));
        assert!(points3_approx_eq(&p, &Point3::new(100.0, 120.0, 0.0), 1e-9));
    }

    #[test]
    fn test_unresolved_block_has_empty_extents() {
        let reference = BlockReference::new("Nowhere");
        assert!(reference.block_table_record().is_none());
        assert!(reference.geometric_extents().is_empty());
    }

    #[test]
    fn test_normal_is_normalized() {
        let mut reference = BlockReference::new("N");
        reference.set_normal(Vector3::new(0.0, 0.0, 5.0));
        assert_eq!(reference.normal(), Vector3::z());
    }

    #[test]
    fn test_retarget_block_name() {
        let db = crate::database::Database::new();
        db.tables.block_table.create("A").unwrap();

        let mut reference = BlockReference::new("A");
        reference.base_mut().set_database(Rc::downgrade(&db));
        assert!(reference.block_table_record().is_some());

        reference.set_block_name("B");
        assert_eq!(reference.block_name(), "B");
        assert!(reference.block_table_record().is_none());
    }
}
