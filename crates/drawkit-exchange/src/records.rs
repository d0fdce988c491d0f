//! 交换记录
//!
//! 外部解析器输出的 JSON 文档结构。字段名沿用交换格式（`handle`、
//! `owner_object_id`、`file_name` 等），由 [`crate::converter::ObjectConverter`]
//! 逐字段拷贝到模型对象。

use drawkit_geometry::math::{BoundingBox2, BoundingBox3, Point2, Point3, Vector2, Vector3};
use drawkit_geometry::nurbs::KnotParameterization;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_layer() -> String {
    "0".to_string()
}

fn default_color_index() -> u16 {
    256
}

fn default_scale() -> Point3 {
    Point3::new(1.0, 1.0, 1.0)
}

fn default_normal() -> Vector3 {
    Vector3::z()
}

fn default_weight() -> f64 {
    50.0
}

fn default_true() -> bool {
    true
}

/// 所有图元共有的字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCommon {
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub owner_object_id: String,
    #[serde(default = "default_layer")]
    pub layer: String,
    /// ACI 颜色号，0 为随块，256 为随层
    #[serde(default = "default_color_index")]
    pub color_index: u16,
    /// 真彩色 `0xRRGGBB`，优先于颜色号
    #[serde(default)]
    pub true_color: Option<u32>,
    #[serde(default)]
    pub line_type: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl Default for EntityCommon {
    fn default() -> Self {
        Self {
            handle: String::new(),
            owner_object_id: String::new(),
            layer: default_layer(),
            color_index: default_color_index(),
            true_color: None,
            line_type: None,
            visible: true,
        }
    }
}

/// 图元记录
///
/// `type` 决定其余字段的解释方式，未识别的类型留给转换器报错。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub common: EntityCommon,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl EntityRecord {
    pub fn new(kind: impl Into<String>, data: Value) -> Self {
        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            kind: kind.into(),
            common: EntityCommon::default(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    pub start: Point3,
    pub end: Point3,
}

/// 圆弧的三种描述方式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArcGeometry {
    Explicit {
        center: Point2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        #[serde(default)]
        clockwise: bool,
    },
    Bulge {
        from: Point2,
        to: Point2,
        bulge: f64,
    },
    ThreePoint {
        start: Point2,
        mid: Point2,
        end: Point2,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcRecord {
    #[serde(flatten)]
    pub geometry: ArcGeometry,
    #[serde(default)]
    pub elevation: f64,
}

/// 样条记录：控制点形式或拟合点形式
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplineRecord {
    #[serde(default)]
    pub control_points: Option<Vec<Point3>>,
    #[serde(default)]
    pub knots: Option<Vec<f64>>,
    #[serde(default)]
    pub weights: Option<Vec<f64>>,
    #[serde(default)]
    pub fit_points: Option<Vec<Point3>>,
    #[serde(default)]
    pub knot_parameterization: Option<KnotParameterization>,
    #[serde(default)]
    pub closed: bool,
}

/// 块参照记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertRecord {
    pub name: String,
    #[serde(default = "Point3::origin")]
    pub position: Point3,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_scale")]
    pub scale: Point3,
    #[serde(default = "default_normal")]
    pub normal: Vector3,
}

/// 光栅图像记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(default = "Point3::origin")]
    pub position: Point3,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_weight")]
    pub brightness: f64,
    #[serde(default = "default_weight")]
    pub contrast: f64,
    #[serde(default)]
    pub fade: f64,
    #[serde(default)]
    pub is_clipped: bool,
    #[serde(default)]
    pub clipping_boundary_path: Vec<Point2>,
    #[serde(default)]
    pub image_def_object_id: String,
    #[serde(default = "default_true")]
    pub is_image_shown: bool,
    #[serde(default)]
    pub is_image_transparent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub name: String,
    #[serde(default)]
    pub color_index: Option<u16>,
    #[serde(default)]
    pub true_color: Option<u32>,
    #[serde(default)]
    pub line_type: Option<String>,
    #[serde(default)]
    pub is_off: bool,
    #[serde(default)]
    pub is_frozen: bool,
    #[serde(default)]
    pub is_locked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRecord {
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub owner_object_id: String,
    pub layout_name: String,
    #[serde(default)]
    pub tab_order: i32,
    #[serde(default)]
    pub block_record_handle: String,
    #[serde(default = "BoundingBox2::empty")]
    pub limits: BoundingBox2,
    #[serde(default = "BoundingBox3::empty")]
    pub extents: BoundingBox3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDefRecord {
    pub handle: String,
    #[serde(default)]
    pub owner_object_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default = "Vector2::zeros")]
    pub size: Vector2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub name: String,
    #[serde(default = "Point3::origin")]
    pub base_point: Point3,
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
}

/// 整张图纸
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingRecord {
    pub layers: Vec<LayerRecord>,
    pub blocks: Vec<BlockRecord>,
    pub image_defs: Vec<ImageDefRecord>,
    pub layouts: Vec<LayoutRecord>,
    pub entities: Vec<EntityRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_record_splits_common_fields() {
        let record: EntityRecord = serde_json::from_str(
            r#"{
                "type": "Line",
                "handle": "1F",
                "layer": "Walls",
                "start": [0, 0, 0],
                "end": [1, 2, 0]
            }"#,
        )
        .unwrap();

        assert_eq!(record.kind, "Line");
        assert_eq!(record.common.handle, "1F");
        assert_eq!(record.common.layer, "Walls");
        assert_eq!(record.common.color_index, 256);
        assert!(record.data.contains_key("start"));

        let line: LineRecord = serde_json::from_value(Value::Object(record.data)).unwrap();
        assert_eq!(line.end, Point3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_arc_geometry_forms() {
        let bulge: ArcRecord =
            serde_json::from_str(r#"{ "from": [0, 0], "to": [2, 0], "bulge": 1.0 }"#).unwrap();
        assert!(matches!(bulge.geometry, ArcGeometry::Bulge { .. }));

        let explicit: ArcRecord = serde_json::from_str(
            r#"{ "center": [0, 0], "radius": 1, "start_angle": 0, "end_angle": 1.5, "elevation": 3 }"#,
        )
        .unwrap();
        assert!(matches!(explicit.geometry, ArcGeometry::Explicit { clockwise: false, .. }));
        assert_eq!(explicit.elevation, 3.0);

        let three: ArcRecord =
            serde_json::from_str(r#"{ "start": [1, 0], "mid": [0, 1], "end": [-1, 0] }"#).unwrap();
        assert!(matches!(three.geometry, ArcGeometry::ThreePoint { .. }));
    }

    #[test]
    fn test_insert_defaults() {
        let insert: InsertRecord = serde_json::from_str(r#"{ "name": "Door" }"#).unwrap();
        assert_eq!(insert.position, Point3::origin());
        assert_eq!(insert.scale, Point3::new(1.0, 1.0, 1.0));
        assert_eq!(insert.normal, Vector3::z());
    }

    #[test]
    fn test_empty_drawing() {
        let drawing: DrawingRecord = serde_json::from_str("{}").unwrap();
        assert!(drawing.entities.is_empty());
        assert!(drawing.blocks.is_empty());
    }
}
