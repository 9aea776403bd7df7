use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, warn};

use crate::config::AppConfig;
use crate::db::PgPool;

use super::{scan_document, scan_project};

#[derive(Debug, Clone)]
enum ScanTask {
    Project { project_id: i32, force: bool },
    Document { document_id: i32, force: bool },
}

/// A bounded pool of cooperative workers, one process-wide instance per
/// server. `submit_*` never blocks the caller: tasks go onto an unbounded
/// channel and a fixed number of worker loops drain it concurrently. This
/// is an in-process, non-durable substitute for a polled `jobs` table: a
/// process restart loses anything still queued, which is acceptable since
/// every scan trigger is safely re-issuable (idempotent by document id).
#[derive(Clone)]
pub struct ScanPool {
    sender: mpsc::UnboundedSender<ScanTask>,
}

impl ScanPool {
    pub fn spawn(pool: PgPool, config: Arc<AppConfig>, worker_count: usize) -> (Self, Vec<JoinHandle<()>>) {
        let (sender, receiver) = mpsc::unbounded_channel::<ScanTask>();
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let mut handles = Vec::with_capacity(worker_count.max(1));
        for worker_id in 0..worker_count.max(1) {
            let receiver = receiver.clone();
            let pool = pool.clone();
            let config = config.clone();
            handles.push(tokio::spawn(async move {
                loop {
                    let task = {
                        let mut guard = receiver.lock().await;
                        guard.recv().await
                    };
                    let Some(task) = task else {
                        break;
                    };
                    run_task(&pool, &config, task).await;
                }
                warn!(worker_id, "scan worker drained and shut down");
            }));
        }

        (Self { sender }, handles)
    }

    pub fn submit_project_scan(&self, project_id: i32, force: bool) {
        let _ = self.sender.send(ScanTask::Project { project_id, force });
    }

    pub fn submit_document_scan(&self, document_id: i32, force: bool) {
        let _ = self
            .sender
            .send(ScanTask::Document { document_id, force });
    }
}

async fn run_task(pool: &PgPool, config: &AppConfig, task: ScanTask) {
    match task {
        ScanTask::Project { project_id, force } => {
            if let Err(err) = scan_project(pool, config, project_id, force).await {
                error!(project_id, error = %err, "project scan failed");
            }
        }
        ScanTask::Document { document_id, force } => {
            if let Err(err) = scan_document(pool, config, document_id, force, None, None).await {
                error!(document_id, error = %err, "document scan failed");
            }
        }
    }
}
