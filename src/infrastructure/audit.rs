//! Audit sink with a bounded queue and background writer task
//!
//! Request tasks hand events to the writer through a bounded channel so
//! the request path never waits on file I/O. The writer appends one
//! JSON line per event, preserving submission order.

use std::path::PathBuf;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::{AuditConfig, AuditOverflowPolicy};
use crate::domain::AuditEvent;

/// Cloneable handle for emitting audit events
#[derive(Debug, Clone)]
pub struct AuditHandle {
    tx: mpsc::Sender<AuditEvent>,
    overflow: AuditOverflowPolicy,
}

impl AuditHandle {
    /// Emit an event. Under the `Drop` policy a full queue loses the
    /// event with a warning; under `Block` the caller waits for space.
    pub async fn emit(&self, event: AuditEvent) {
        match self.overflow {
            AuditOverflowPolicy::Drop => {
                if let Err(e) = self.tx.try_send(event) {
                    warn!("Audit queue full, dropping event: {}", e);
                }
            }
            AuditOverflowPolicy::Block => {
                if self.tx.send(event).await.is_err() {
                    warn!("Audit sink shut down, event lost");
                }
            }
        }
    }
}

/// Owns the background writer; created once at startup
#[derive(Debug)]
pub struct AuditSink {
    handle: AuditHandle,
    writer: JoinHandle<()>,
}

impl AuditSink {
    /// Spawn the writer task and return the sink
    pub fn spawn(config: &AuditConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let path = PathBuf::from(&config.log_path);
        let writer = tokio::spawn(write_loop(rx, path));

        Self {
            handle: AuditHandle {
                tx,
                overflow: config.overflow,
            },
            writer,
        }
    }

    pub fn handle(&self) -> AuditHandle {
        self.handle.clone()
    }

    /// Close the queue and wait for the writer to drain it
    pub async fn shutdown(self) {
        drop(self.handle);
        if let Err(e) = self.writer.await {
            error!("Audit writer task failed: {}", e);
        }
    }
}

async fn write_loop(mut rx: mpsc::Receiver<AuditEvent>, path: PathBuf) {
    let mut file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await
    {
        Ok(file) => file,
        Err(e) => {
            error!("Failed to open audit log {}: {}", path.display(), e);
            // Drain the channel so senders never block on a dead writer
            while rx.recv().await.is_some() {}
            return;
        }
    };

    info!("Audit writer started: {}", path.display());

    while let Some(event) = rx.recv().await {
        let line = match serde_json::to_string(&event) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize audit event: {}", e);
                continue;
            }
        };

        info!(target: "audit", event = %event.event, trace_id = %event.trace_id, "Audit event");

        if let Err(e) = file.write_all(format!("{}\n", line).as_bytes()).await {
            error!("Failed to append audit event: {}", e);
        }
    }

    if let Err(e) = file.flush().await {
        error!("Failed to flush audit log: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config(path: &std::path::Path, capacity: usize) -> AuditConfig {
        AuditConfig {
            log_path: path.to_string_lossy().into_owned(),
            queue_capacity: capacity,
            overflow: AuditOverflowPolicy::Drop,
        }
    }

    #[tokio::test]
    async fn test_events_written_in_order() {
        let dir = std::env::temp_dir().join(format!("audit-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("audit.log");

        let sink = AuditSink::spawn(&test_config(&path, 16));
        let handle = sink.handle();

        for i in 0..3 {
            handle
                .emit(AuditEvent::new(
                    "admission.allowed",
                    json!({"seq": i}),
                    format!("trace-{}", i),
                ))
                .await;
        }

        // All senders must drop before shutdown can drain the queue
        drop(handle);
        sink.shutdown().await;

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);

        for (i, line) in lines.iter().enumerate() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["data"]["seq"], i as i64);
            assert_eq!(value["traceId"], format!("trace-{}", i));
        }
    }

    #[tokio::test]
    async fn test_drop_policy_does_not_block() {
        let dir = std::env::temp_dir().join(format!("audit-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("audit.log");

        let sink = AuditSink::spawn(&test_config(&path, 1));
        let handle = sink.handle();

        // Far more events than the queue holds; emit must still return
        // promptly, dropping overflow
        for i in 0..100 {
            handle
                .emit(AuditEvent::new("admission.allowed", json!({"seq": i}), "t"))
                .await;
        }

        drop(handle);
        sink.shutdown().await;
    }
}
