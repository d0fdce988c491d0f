//! DrawKit 交换边界
//!
//! - `records`：外部解析器输出的 JSON 图纸结构
//! - `converter`：记录到模型对象的逐字段转换，以及整张图纸写入数据库
//! - `worker`：单线程后台任务（如 JSON 解析）的请求/响应封装
//!
//! # 示例
//!
//! ```rust
//! use drawkit_exchange::prelude::*;
//! use drawkit_model::prelude::*;
//!
//! let worker = Worker::spawn(JsonParseTask).unwrap();
//! let json = r#"{ "entities": [ { "type": "Line", "start": [0, 0, 0], "end": [4, 3, 0] } ] }"#;
//! let drawing = worker.run(json.to_string()).unwrap().into_result().unwrap();
//!
//! let db = Database::new();
//! let entities = ObjectConverter::new().populate(&db, drawing).unwrap();
//! assert_eq!(entities[0].geometric_extents().max, Point3::new(4.0, 3.0, 0.0));
//! ```

pub mod converter;
pub mod error;
pub mod records;
pub mod worker;

pub use error::ExchangeError;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::converter::ObjectConverter;
    pub use crate::error::ExchangeError;
    pub use crate::records::{
        BlockRecord, DrawingRecord, EntityRecord, ImageDefRecord, LayerRecord, LayoutRecord,
    };
    pub use crate::worker::{JsonParseTask, Task, Worker, WorkerMessage, WorkerResponse};
}
