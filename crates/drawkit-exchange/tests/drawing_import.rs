//! JSON 图纸经后台解析、转换、写入数据库后的端到端测试

use drawkit_exchange::prelude::*;
use drawkit_model::prelude::*;

const DRAWING: &str = r#"{
    "layers": [ { "name": "Furniture", "color_index": 5 } ],
    "image_defs": [ { "handle": "D1", "file_name": "plan.png", "size": [800, 600] } ],
    "layouts": [ { "handle": "L1", "layout_name": "Model", "block_record_handle": "1F" } ],
    "blocks": [
        {
            "name": "Chair",
            "entities": [
                { "type": "Line", "color_index": 0, "start": [0, 0, 0], "end": [1, 0, 0] },
                { "type": "Line", "color_index": 0, "start": [1, 0, 0], "end": [1, 1, 0] }
            ]
        }
    ],
    "entities": [
        { "type": "Insert", "handle": "10", "layer": "Furniture", "color_index": 1,
          "name": "Chair", "position": [5, 5, 0] },
        { "type": "Insert", "handle": "11", "layer": "Furniture", "color_index": 1,
          "name": "Chair", "position": [8, 5, 0], "rotation": 1.5707963267948966 },
        { "type": "Image", "handle": "12", "position": [0, 0, 0], "width": 8, "height": 6,
          "image_def_object_id": "D1" },
        { "type": "Image", "handle": "13", "position": [20, 0, 0], "width": 2, "height": 2,
          "image_def_object_id": "missing" }
    ]
}"#;

fn load() -> (std::rc::Rc<Database>, Vec<std::rc::Rc<dyn Entity>>) {
    let worker = Worker::spawn(JsonParseTask).unwrap();
    let drawing = worker.run(DRAWING.to_string()).unwrap().into_result().unwrap();
    let db = Database::new();
    let entities = ObjectConverter::new().populate(&db, drawing).unwrap();
    (db, entities)
}

#[test]
fn test_populate_tables_and_dictionaries() {
    let (db, entities) = load();

    assert_eq!(entities.len(), 4);
    assert!(db.tables.block_table.has("Chair"));
    assert_eq!(db.tables.block_table.get_at("Chair").unwrap().len(), 2);
    assert_eq!(db.tables.layer_table.get_at("Furniture").unwrap().color, Color::BLUE);
    assert!(db.dictionaries.layouts.get_id_at("L1").unwrap().is_model());
    assert_eq!(db.model_space().len(), 4);
    assert_eq!(entities[0].base().object_id, "10");
}

#[test]
fn test_image_file_names_resolve_through_dictionary() {
    let (_db, entities) = load();

    let image = entities[2].as_any().downcast_ref::<RasterImage>().unwrap();
    assert_eq!(image.image_file_name(), "plan.png");

    let orphan = entities[3].as_any().downcast_ref::<RasterImage>().unwrap();
    assert_eq!(orphan.image_file_name(), "");
}

#[test]
fn test_insert_extents() {
    let (_db, entities) = load();

    let extents = entities[0].geometric_extents();
    assert_eq!(extents.min, Point3::new(5.0, 5.0, 0.0));
    assert_eq!(extents.max, Point3::new(6.0, 6.0, 0.0));
}

#[test]
fn test_shared_block_rendered_once_per_color() {
    let (_db, entities) = load();
    let cache = RenderingCache::new();
    let mut renderer = RecordingRenderer::new();

    for entity in &entities[..2] {
        let mut ctx = DrawContext::new(&mut renderer, &cache);
        assert!(entity.draw(&mut ctx).is_some());
    }

    // 两个参照同块同色，只在第一次绘制时生成子图元
    assert_eq!(renderer.stats().lines, 2);
    assert_eq!(cache.len(), 1);
    assert!(cache.has(&RenderingCache::create_key("Chair", 0xFF0000)));
}

#[test]
fn test_unknown_entity_aborts_populate() {
    let worker = Worker::spawn(JsonParseTask).unwrap();
    let drawing = worker
        .run(r#"{ "entities": [ { "type": "Solid" } ] }"#.to_string())
        .unwrap()
        .into_result()
        .unwrap();

    let db = Database::new();
    let err = ObjectConverter::new().populate(&db, drawing).unwrap_err();
    assert!(matches!(err, ExchangeError::UnknownEntity(kind) if kind == "Solid"));
}
