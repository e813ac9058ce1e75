use crate::error::TypeServerError;
use crate::wire;
use dashmap::DashMap;
use serde_json::Value as JsonValue;
use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

enum OutgoingMessage {
    Request {
        id: u64,
        method: String,
        params: JsonValue,
    },
    Notification {
        method: String,
        params: JsonValue,
    },
}

/// A long-running JSON-RPC-over-stdio subprocess client. One instance per
/// underlying type-server process; cloning shares the same subprocess and
/// background tasks.
#[derive(Clone)]
pub struct LspClient {
    outgoing: mpsc::Sender<OutgoingMessage>,
    pending: Arc<DashMap<u64, oneshot::Sender<Result<JsonValue, TypeServerError>>>>,
    next_id: Arc<AtomicU64>,
}

impl LspClient {
    pub async fn spawn(command: &Path, args: &[String], root_uri: &str) -> Result<Self, TypeServerError> {
        let mut child: Child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TypeServerError::SpawnFailed(e.to_string()))?;

        let mut stdin = child.stdin.take().ok_or(TypeServerError::MissingPipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(TypeServerError::MissingPipe("stdout"))?;
        let stderr = child.stderr.take().ok_or(TypeServerError::MissingPipe("stderr"))?;

        let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<OutgoingMessage>(128);
        let pending: Arc<DashMap<u64, oneshot::Sender<Result<JsonValue, TypeServerError>>>> =
            Arc::new(DashMap::new());
        let pending_for_reader = pending.clone();

        tokio::spawn(async move {
            while let Some(msg) = outgoing_rx.recv().await {
                let json = match msg {
                    OutgoingMessage::Request { id, method, params } => {
                        serde_json::json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params})
                    }
                    OutgoingMessage::Notification { method, params } => {
                        serde_json::json!({"jsonrpc": "2.0", "method": method, "params": params})
                    }
                };
                let body = json.to_string();
                if let Err(e) = wire::write_message(&mut stdin, &body).await {
                    error!(error = %e, "type server stdin write failed");
                    break;
                }
            }
        });

        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout);
            loop {
                match wire::read_message(&mut reader).await {
                    Ok(Some(body)) => {
                        let Ok(json) = serde_json::from_str::<JsonValue>(&body) else {
                            warn!("type server emitted non-JSON message, dropping");
                            continue;
                        };
                        if let Some(id) = json.get("id").and_then(|v| v.as_u64()) {
                            if let Some((_, tx)) = pending_for_reader.remove(&id) {
                                let result = if let Some(err) = json.get("error") {
                                    Err(TypeServerError::Protocol(err.to_string()))
                                } else {
                                    Ok(json.get("result").cloned().unwrap_or(JsonValue::Null))
                                };
                                let _ = tx.send(result);
                            }
                        }
                    }
                    Ok(None) => {
                        debug!("type server stdout closed");
                        break;
                    }
                    Err(e) => {
                        error!(error = %e, "type server stdout read failed");
                        break;
                    }
                }
            }
        });

        tokio::spawn(async move {
            use tokio::io::AsyncBufReadExt;
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(target: "type_server_stderr", "{line}");
            }
        });

        let client = Self {
            outgoing: outgoing_tx,
            pending,
            next_id: Arc::new(AtomicU64::new(1)),
        };

        let init_params = serde_json::json!({
            "processId": std::process::id(),
            "rootUri": root_uri,
            "capabilities": {
                "textDocument": {"hover": {}, "definition": {}, "references": {}},
            },
        });
        client.request("initialize", init_params).await?;
        client.notify("initialized", serde_json::json!({})).await?;

        Ok(client)
    }

    pub async fn request(&self, method: &str, params: JsonValue) -> Result<JsonValue, TypeServerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);

        self.outgoing
            .send(OutgoingMessage::Request {
                id,
                method: method.to_string(),
                params,
            })
            .await
            .map_err(|_| TypeServerError::ChannelClosed)?;

        match tokio::time::timeout(REQUEST_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(TypeServerError::ChannelClosed),
            Err(_) => {
                self.pending.remove(&id);
                Err(TypeServerError::Timeout(method.to_string()))
            }
        }
    }

    pub async fn notify(&self, method: &str, params: JsonValue) -> Result<(), TypeServerError> {
        self.outgoing
            .send(OutgoingMessage::Notification {
                method: method.to_string(),
                params,
            })
            .await
            .map_err(|_| TypeServerError::ChannelClosed)
    }
}
