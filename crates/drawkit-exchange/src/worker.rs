//! 后台任务线程
//!
//! 每个 [`Worker`] 独占一个线程，通过请求/响应通道串行执行同一种 [`Task`]。
//! 请求按提交顺序处理，响应携带请求的 `id` 以便调用方配对；不支持取消。

use std::marker::PhantomData;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ExchangeError;
use crate::records::DrawingRecord;

/// 可在后台线程执行的任务
pub trait Task: Send + 'static {
    type Input: Send + 'static;
    type Output: Send + 'static;

    fn name(&self) -> &'static str;

    fn execute(&mut self, input: Self::Input) -> Result<Self::Output, ExchangeError>;
}

/// 请求
#[derive(Debug, Clone)]
pub struct WorkerMessage<I> {
    pub id: Uuid,
    pub input: I,
}

/// 响应：成功时 `data` 有值，失败时 `error` 为错误信息
#[derive(Debug, Clone)]
pub struct WorkerResponse<O> {
    pub id: Uuid,
    pub success: bool,
    pub data: Option<O>,
    pub error: Option<String>,
}

impl<O> WorkerResponse<O> {
    /// 转为 `Result`，失败信息包装为 [`ExchangeError::Task`]
    pub fn into_result(self) -> Result<O, ExchangeError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(ExchangeError::Task(self.error.unwrap_or_default())),
        }
    }
}

/// 后台工作线程
pub struct Worker<T: Task> {
    requests: Option<Sender<WorkerMessage<T::Input>>>,
    responses: Receiver<WorkerResponse<T::Output>>,
    handle: Option<JoinHandle<()>>,
    _task: PhantomData<fn() -> T>,
}

impl<T: Task> Worker<T> {
    /// 启动线程，`task` 移入线程独占
    pub fn spawn(mut task: T) -> Result<Self, ExchangeError> {
        let (request_tx, request_rx) = channel::unbounded::<WorkerMessage<T::Input>>();
        let (response_tx, response_rx) = channel::unbounded();
        let name = task.name();

        let handle = thread::Builder::new()
            .name(format!("worker-{name}"))
            .spawn(move || {
                for message in request_rx.iter() {
                    debug!("{name}: running task {}", message.id);
                    let response = match task.execute(message.input) {
                        Ok(data) => WorkerResponse {
                            id: message.id,
                            success: true,
                            data: Some(data),
                            error: None,
                        },
                        Err(err) => {
                            warn!("{name}: task {} failed: {err}", message.id);
                            WorkerResponse {
                                id: message.id,
                                success: false,
                                data: None,
                                error: Some(err.to_string()),
                            }
                        }
                    };
                    if response_tx.send(response).is_err() {
                        break;
                    }
                }
                debug!("{name}: request channel closed, exiting");
            })?;

        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            handle: Some(handle),
            _task: PhantomData,
        })
    }

    /// 提交请求，返回其 id
    pub fn submit(&self, input: T::Input) -> Result<Uuid, ExchangeError> {
        let id = Uuid::new_v4();
        self.requests
            .as_ref()
            .ok_or(ExchangeError::WorkerDisconnected)?
            .send(WorkerMessage { id, input })
            .map_err(|_| ExchangeError::WorkerDisconnected)?;
        Ok(id)
    }

    /// 阻塞等待下一个响应
    pub fn recv(&self) -> Result<WorkerResponse<T::Output>, ExchangeError> {
        self.responses
            .recv()
            .map_err(|_| ExchangeError::WorkerDisconnected)
    }

    /// 提交并等待对应 id 的响应
    ///
    /// 期间收到的其它响应被丢弃。
    pub fn run(&self, input: T::Input) -> Result<WorkerResponse<T::Output>, ExchangeError> {
        let id = self.submit(input)?;
        loop {
            let response = self.recv()?;
            if response.id == id {
                return Ok(response);
            }
            debug!("discarding response {} while waiting for {id}", response.id);
        }
    }
}

impl<T: Task> Drop for Worker<T> {
    fn drop(&mut self) {
        // 关闭请求通道后线程自行退出
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("worker thread panicked");
            }
        }
    }
}

/// 解析 JSON 图纸文档
#[derive(Debug, Default)]
pub struct JsonParseTask;

impl Task for JsonParseTask {
    type Input = String;
    type Output = DrawingRecord;

    fn name(&self) -> &'static str {
        "json-parse"
    }

    fn execute(&mut self, input: String) -> Result<DrawingRecord, ExchangeError> {
        Ok(serde_json::from_str(&input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doubler;

    impl Task for Doubler {
        type Input = i64;
        type Output = i64;

        fn name(&self) -> &'static str {
            "doubler"
        }

        fn execute(&mut self, input: i64) -> Result<i64, ExchangeError> {
            if input < 0 {
                return Err(ExchangeError::Task(format!("negative input {input}")));
            }
            Ok(input * 2)
        }
    }

    #[test]
    fn test_run_matches_id() {
        let worker = Worker::spawn(Doubler).unwrap();
        let response = worker.run(21).unwrap();
        assert!(response.success);
        assert_eq!(response.data, Some(42));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_failure_is_reported() {
        let worker = Worker::spawn(Doubler).unwrap();
        let id = worker.submit(-1).unwrap();
        let response = worker.recv().unwrap();
        assert_eq!(response.id, id);
        assert!(!response.success);
        assert!(response.data.is_none());
        assert!(response.error.unwrap().contains("negative input -1"));
    }

    #[test]
    fn test_responses_in_submission_order() {
        let worker = Worker::spawn(Doubler).unwrap();
        let ids: Vec<Uuid> = (0..5).map(|i| worker.submit(i).unwrap()).collect();
        for (i, id) in ids.into_iter().enumerate() {
            let response = worker.recv().unwrap();
            assert_eq!(response.id, id);
            assert_eq!(response.data, Some(i as i64 * 2));
        }
    }

    #[test]
    fn test_json_parse_task() {
        let worker = Worker::spawn(JsonParseTask).unwrap();
        let drawing = worker
            .run(r#"{ "layers": [ { "name": "A" } ] }"#.to_string())
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(drawing.layers[0].name, "A");

        let response = worker.run("{ not json".to_string()).unwrap();
        assert!(!response.success);
        assert!(matches!(response.into_result(), Err(ExchangeError::Task(_))));
    }
}
