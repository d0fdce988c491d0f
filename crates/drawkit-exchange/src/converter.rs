//! 对象转换器
//!
//! 把交换记录逐字段拷贝为模型对象，不做几何校验以外的任何推断。

use std::rc::Rc;

use drawkit_geometry::arc::CircularArc2d;
use drawkit_geometry::config::SamplingConfig;
use drawkit_geometry::spline::{Spline3d, SplineArgument};
use drawkit_model::block::{BlockReference, BlockTableRecord, MODEL_SPACE};
use drawkit_model::color::{Color, LineType};
use drawkit_model::curve::{ArcEntity, LineEntity, SplineEntity};
use drawkit_model::database::Database;
use drawkit_model::entity::{Entity, EntityBase};
use drawkit_model::layer::Layer;
use drawkit_model::layout::Layout;
use drawkit_model::raster_image::{ClipBoundaryType, RasterImage, RasterImageDef};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ExchangeError;
use crate::records::{
    ArcGeometry, ArcRecord, BlockRecord, DrawingRecord, EntityCommon, EntityRecord,
    ImageDefRecord, ImageRecord, InsertRecord, LayerRecord, LayoutRecord, LineRecord,
    SplineRecord,
};

/// 交换记录到模型对象的转换器
#[derive(Debug, Clone, Default)]
pub struct ObjectConverter {
    sampling: SamplingConfig,
}

impl ObjectConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定圆弧/样条图元的采样数量
    pub fn with_sampling(sampling: SamplingConfig) -> Self {
        Self { sampling }
    }

    pub fn convert_layout(&self, record: LayoutRecord) -> Layout {
        Layout {
            object_id: record.handle,
            owner_id: record.owner_object_id,
            layout_name: record.layout_name,
            tab_order: record.tab_order,
            block_table_record_id: record.block_record_handle,
            limits: record.limits,
            extents: record.extents,
        }
    }

    pub fn convert_image_def(&self, record: ImageDefRecord) -> RasterImageDef {
        RasterImageDef {
            object_id: record.handle,
            owner_id: record.owner_object_id,
            source_file_name: record.file_name,
            size: record.size,
        }
    }

    pub fn convert_layer(&self, record: &LayerRecord) -> Layer {
        let mut layer = Layer::new(record.name.clone()).with_color(resolve_color(
            record.true_color,
            record.color_index.unwrap_or(7),
        ));
        if let Some(name) = &record.line_type {
            layer.line_type = LineType::from_name(name);
        }
        layer.visible = !record.is_off;
        layer.frozen = record.is_frozen;
        layer.locked = record.is_locked;
        layer
    }

    /// 按 `type` 转换单个图元
    pub fn convert_entity(&self, record: EntityRecord) -> Result<Box<dyn Entity>, ExchangeError> {
        let EntityRecord { kind, common, data } = record;
        let data = Value::Object(data);

        let mut entity: Box<dyn Entity> = match kind.as_str() {
            "Line" => {
                let line: LineRecord = payload(data)?;
                Box::new(LineEntity::new(line.start, line.end))
            }
            "Arc" => Box::new(self.convert_arc(payload(data)?)),
            "Spline" => Box::new(self.convert_spline(payload(data)?)?),
            "Insert" => Box::new(convert_insert(payload(data)?)),
            "Image" => Box::new(convert_image(payload(data)?)),
            _ => return Err(ExchangeError::UnknownEntity(kind)),
        };

        apply_common(entity.base_mut(), common);
        Ok(entity)
    }

    fn convert_arc(&self, record: ArcRecord) -> ArcEntity {
        let arc = match record.geometry {
            ArcGeometry::Explicit {
                center,
                radius,
                start_angle,
                end_angle,
                clockwise,
            } => CircularArc2d::from_explicit_geometry(center, radius, start_angle, end_angle, clockwise),
            ArcGeometry::Bulge { from, to, bulge } => CircularArc2d::from_bulge(from, to, bulge),
            ArcGeometry::ThreePoint { start, mid, end } => {
                CircularArc2d::from_three_points(start, mid, end)
            }
        };

        let mut entity = ArcEntity::new(arc).with_sampling(&self.sampling);
        entity.elevation = record.elevation;
        entity
    }

    fn convert_spline(&self, record: SplineRecord) -> Result<SplineEntity, ExchangeError> {
        let mut args = Vec::with_capacity(3);
        match (record.fit_points, record.control_points) {
            (Some(fit_points), None) => {
                args.push(SplineArgument::Points(fit_points));
                args.push(SplineArgument::Parameterization(
                    record.knot_parameterization.unwrap_or_default(),
                ));
            }
            (_, Some(control_points)) => {
                args.push(SplineArgument::Points(control_points));
                args.push(SplineArgument::Knots(record.knots.unwrap_or_default()));
                if let Some(weights) = record.weights {
                    args.push(SplineArgument::Weights(weights));
                }
            }
            (None, None) => {}
        }

        let spline = Spline3d::from_arguments(args)?;
        Ok(SplineEntity::with_spline(spline, record.closed).with_sampling(&self.sampling))
    }

    /// 把整张图纸写入数据库，返回模型空间中新增的图元
    pub fn populate(
        &self,
        db: &Rc<Database>,
        drawing: DrawingRecord,
    ) -> Result<Vec<Rc<dyn Entity>>, ExchangeError> {
        let layers = &db.tables.layer_table;
        for record in &drawing.layers {
            let layer = self.convert_layer(record);
            if layers.has(&layer.name) {
                layers.set_color(&layer.name, layer.color)?;
            } else {
                layers.add(layer)?;
            }
        }

        for record in drawing.image_defs {
            let def = self.convert_image_def(record);
            db.dictionaries.image_defs.set_at(def.object_id.clone(), def);
        }

        for record in drawing.layouts {
            let layout = self.convert_layout(record);
            db.dictionaries.layouts.set_at(layout.object_id.clone(), layout);
        }

        for block in drawing.blocks {
            self.populate_block(db, block)?;
        }

        let model_space = db.model_space();
        let mut appended = Vec::with_capacity(drawing.entities.len());
        for record in drawing.entities {
            appended.push(model_space.append_boxed(self.convert_entity(record)?));
        }

        debug!(
            "populated drawing: {} blocks, {} model space entities",
            db.tables.block_table.len(),
            appended.len()
        );
        Ok(appended)
    }

    fn populate_block(&self, db: &Rc<Database>, block: BlockRecord) -> Result<(), ExchangeError> {
        let record: Rc<BlockTableRecord> = if block.name.eq_ignore_ascii_case(MODEL_SPACE) {
            db.model_space()
        } else {
            db.tables.block_table.create(&block.name)?
        };
        record.set_base_point(block.base_point);

        for entity in block.entities {
            record.append_boxed(self.convert_entity(entity)?);
        }
        Ok(())
    }
}

fn payload<T: DeserializeOwned>(data: Value) -> Result<T, ExchangeError> {
    Ok(serde_json::from_value(data)?)
}

fn resolve_color(true_color: Option<u32>, color_index: u16) -> Color {
    if let Some(rgb) = true_color {
        return Color::from_hex(rgb);
    }
    Color::from_aci(color_index).unwrap_or_else(|| {
        debug!("ACI color {color_index} has no fixed RGB value, using white");
        Color::WHITE
    })
}

fn apply_common(base: &mut EntityBase, common: EntityCommon) {
    base.object_id = common.handle;
    base.owner_id = common.owner_object_id;
    base.layer = common.layer;
    base.set_color(resolve_color(common.true_color, common.color_index));
    if let Some(name) = common.line_type {
        base.line_type = LineType::from_name(&name);
    }
    base.visible = common.visible;
}

fn convert_insert(record: InsertRecord) -> BlockReference {
    let mut reference = BlockReference::new(record.name);
    reference.set_position(record.position);
    reference.set_rotation(record.rotation);
    reference.set_scale_factors(record.scale);
    reference.set_normal(record.normal);
    reference
}

fn convert_image(record: ImageRecord) -> RasterImage {
    let mut image = RasterImage::new();
    image.position = record.position;
    image.width = record.width;
    image.height = record.height;
    image.rotation = record.rotation;
    image.brightness = record.brightness;
    image.contrast = record.contrast;
    image.fade = record.fade;
    image.is_clipped = record.is_clipped;
    image.is_image_shown = record.is_image_shown;
    image.is_image_transparent = record.is_image_transparent;
    image.image_def_id = record.image_def_object_id;

    if record.clipping_boundary_path.len() > 2 {
        image.clip_boundary_type = ClipBoundaryType::Poly;
    } else if record.is_clipped {
        warn!("clipped image without a usable boundary path");
    }
    image.set_clip_boundary(record.clipping_boundary_path);
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawkit_geometry::math::{approx_eq, Point3};

    fn entity(json: &str) -> EntityRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_convert_image_def_renames_fields() {
        let def = ObjectConverter::new().convert_image_def(ImageDefRecord {
            handle: "2A".into(),
            owner_object_id: "1".into(),
            file_name: "site.png".into(),
            size: drawkit_geometry::math::Vector2::new(640.0, 480.0),
        });
        assert_eq!(def.object_id, "2A");
        assert_eq!(def.owner_id, "1");
        assert_eq!(def.source_file_name, "site.png");
    }

    #[test]
    fn test_convert_layout() {
        let layout = ObjectConverter::new().convert_layout(
            serde_json::from_str(
                r#"{ "handle": "22", "layout_name": "Layout1", "tab_order": 1, "block_record_handle": "1E" }"#,
            )
            .unwrap(),
        );
        assert_eq!(layout.object_id, "22");
        assert_eq!(layout.tab_order, 1);
        assert_eq!(layout.block_table_record_id, "1E");
        assert!(!layout.is_model());
    }

    #[test]
    fn test_common_fields_copied() {
        let converted = ObjectConverter::new()
            .convert_entity(entity(
                r#"{ "type": "Line", "handle": "A1", "owner_object_id": "1F", "layer": "Walls",
                     "color_index": 1, "line_type": "DASHED", "start": [0,0,0], "end": [3,4,0] }"#,
            ))
            .unwrap();

        let base = converted.base();
        assert_eq!(converted.type_name(), "Line");
        assert_eq!(base.object_id, "A1");
        assert_eq!(base.owner_id, "1F");
        assert_eq!(base.layer, "Walls");
        assert_eq!(base.color(), Color::RED);
        assert_eq!(base.line_type, LineType::Dashed);
    }

    #[test]
    fn test_true_color_wins() {
        let converted = ObjectConverter::new()
            .convert_entity(entity(
                r#"{ "type": "Line", "color_index": 1, "true_color": 1193046, "start": [0,0,0], "end": [1,0,0] }"#,
            ))
            .unwrap();
        assert_eq!(converted.base().color().to_hex(), 0x123456);
    }

    #[test]
    fn test_bulge_arc() {
        let converted = ObjectConverter::new()
            .convert_entity(entity(
                r#"{ "type": "Arc", "from": [0,0], "to": [2,0], "bulge": 1.0, "elevation": 5 }"#,
            ))
            .unwrap();
        let extents = converted.geometric_extents();
        assert!(approx_eq(extents.min.z, 5.0));
        assert!(approx_eq(extents.max.x - extents.min.x, 2.0));
    }

    #[test]
    fn test_spline_forms() {
        let converter = ObjectConverter::new();
        let control = converter
            .convert_entity(entity(
                r#"{ "type": "Spline",
                     "control_points": [[0,0,0],[1,1,0],[2,1,0],[3,0,0]],
                     "knots": [0,0,0,0,1,1,1,1] }"#,
            ))
            .unwrap();
        assert_eq!(control.type_name(), "Spline");

        let fit = converter
            .convert_entity(entity(
                r#"{ "type": "Spline", "fit_points": [[0,0,0],[1,2,0],[3,1,0],[4,0,0]],
                     "knot_parameterization": "Chord" }"#,
            ))
            .unwrap();
        assert_eq!(fit.grip_points().len(), 4);
        assert_eq!(fit.grip_points()[1], Point3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_spline_without_points_is_rejected() {
        let err = ObjectConverter::new()
            .convert_entity(entity(r#"{ "type": "Spline" }"#))
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Model(_)));
    }

    #[test]
    fn test_unknown_entity() {
        let err = ObjectConverter::new()
            .convert_entity(entity(r#"{ "type": "Hatch" }"#))
            .unwrap_err();
        assert!(matches!(err, ExchangeError::UnknownEntity(kind) if kind == "Hatch"));
    }

    #[test]
    fn test_populate_updates_default_layer() {
        let db = Database::new();
        let drawing: DrawingRecord = serde_json::from_str(
            r#"{ "layers": [ { "name": "0", "color_index": 3 }, { "name": "Doors", "is_frozen": true } ] }"#,
        )
        .unwrap();

        ObjectConverter::new().populate(&db, drawing).unwrap();

        let layers = &db.tables.layer_table;
        assert_eq!(layers.get_at("0").unwrap().color, Color::GREEN);
        assert!(layers.get_at("Doors").unwrap().frozen);
    }
}
