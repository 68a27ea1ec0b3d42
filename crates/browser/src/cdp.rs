//! Low-level Chrome DevTools Protocol (CDP) client over WebSocket.
//!
//! Communicates with a Chromium-family browser via its debugging WebSocket
//! endpoint. Commands are sent with auto-incrementing ids; responses are
//! correlated back to the caller. Events are not subscribed to — every wait
//! in this tool is condition-polling, so unsolicited messages are only
//! logged at debug level.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, error, warn};

use crate::error::BrowserError;

/// Per-command response deadline.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// A CDP WebSocket client that can send commands and receive responses.
pub struct CdpClient {
    /// Sender to write messages to the WebSocket.
    ws_tx: mpsc::Sender<String>,
    /// Pending command responses, keyed by request ID.
    pending: Arc<Mutex<HashMap<u64, oneshot::Sender<Value>>>>,
    /// Auto-incrementing command ID.
    next_id: AtomicU64,
    /// Handle to the reader task so we can abort on close.
    _reader_handle: tokio::task::JoinHandle<()>,
    /// Handle to the writer task.
    _writer_handle: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to a CDP WebSocket endpoint
    /// (`ws://127.0.0.1:{port}/devtools/page/{target_id}`).
    pub async fn connect(ws_url: &str) -> Result<Self, BrowserError> {
        use futures::{SinkExt, StreamExt};
        use tokio_tungstenite::connect_async;
        use tokio_tungstenite::tungstenite::Message;

        let (ws_stream, _) =
            connect_async(ws_url)
                .await
                .map_err(|e| BrowserError::ConnectionFailed {
                    url: ws_url.to_string(),
                    reason: e.to_string(),
                })?;

        let (mut ws_sink, mut ws_stream_read) = ws_stream.split();

        // Channel for outgoing messages
        let (ws_tx, mut ws_rx) = mpsc::channel::<String>(256);

        // Pending responses
        let pending: Arc<Mutex<HashMap<u64, oneshot::Sender<Value>>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let pending_clone = pending.clone();

        // Writer task: owns the sink, forwards messages from channel
        let writer_handle = tokio::spawn(async move {
            while let Some(msg) = ws_rx.recv().await {
                if let Err(e) = ws_sink.send(Message::Text(msg)).await {
                    error!("CDP WebSocket write error: {}", e);
                    break;
                }
            }
        });

        // Reader task: reads from WebSocket, dispatches responses
        let reader_handle = tokio::spawn(async move {
            while let Some(msg_result) = ws_stream_read.next().await {
                match msg_result {
                    Ok(Message::Text(text)) => {
                        if let Ok(val) = serde_json::from_str::<Value>(&text) {
                            if let Some(id) = val.get("id").and_then(|v| v.as_u64()) {
                                let mut pending = pending_clone.lock().await;
                                if let Some(tx) = pending.remove(&id) {
                                    let _ = tx.send(val);
                                }
                            } else if let Some(method) =
                                val.get("method").and_then(|v| v.as_str())
                            {
                                debug!(method, "ignoring unsolicited CDP event");
                            }
                        }
                    }
                    Ok(Message::Close(_)) => {
                        debug!("CDP WebSocket closed by server");
                        break;
                    }
                    Err(e) => {
                        warn!("CDP WebSocket read error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
        });

        Ok(Self {
            ws_tx,
            pending,
            next_id: AtomicU64::new(1),
            _reader_handle: reader_handle,
            _writer_handle: writer_handle,
        })
    }

    /// Send a CDP command and wait for its result object.
    pub async fn send_command(&self, method: &str, params: Value) -> Result<Value, BrowserError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let msg = json!({
            "id": id,
            "method": method,
            "params": params,
        });

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            pending.insert(id, tx);
        }

        self.ws_tx
            .send(msg.to_string())
            .await
            .map_err(|e| BrowserError::Protocol(format!("failed to send CDP command: {}", e)))?;

        match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
            Ok(Ok(response)) => {
                if let Some(error) = response.get("error") {
                    Err(BrowserError::Cdp(error.to_string()))
                } else {
                    Ok(response.get("result").cloned().unwrap_or(Value::Null))
                }
            }
            Ok(Err(_)) => Err(BrowserError::Protocol(
                "CDP response channel closed".to_string(),
            )),
            Err(_) => {
                let mut pending = self.pending.lock().await;
                pending.remove(&id);
                Err(BrowserError::CommandTimeout {
                    method: method.to_string(),
                    timeout: COMMAND_TIMEOUT,
                })
            }
        }
    }

    /// Enable a CDP domain (e.g., "Page", "Runtime").
    pub async fn enable_domain(&self, domain: &str) -> Result<(), BrowserError> {
        self.send_command(&format!("{}.enable", domain), json!({}))
            .await?;
        Ok(())
    }

    /// Navigate the page target to a URL. Returns once the navigation is
    /// accepted; render completion is the caller's concern.
    pub async fn navigate(&self, url: &str) -> Result<Value, BrowserError> {
        self.send_command("Page.navigate", json!({ "url": url }))
            .await
    }

    /// Evaluate a JavaScript expression in the page context.
    ///
    /// With `return_by_value` the JSON value is returned; otherwise the
    /// result carries a remote `objectId`. A thrown exception surfaces as
    /// [`BrowserError::JsException`].
    pub async fn evaluate(
        &self,
        expression: &str,
        return_by_value: bool,
    ) -> Result<Value, BrowserError> {
        let result = self
            .send_command(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": return_by_value,
                    "awaitPromise": true,
                }),
            )
            .await?;
        check_js_exception(&result)?;
        Ok(result)
    }

    /// Call a function with `this` bound to a remote object, passing plain
    /// JSON arguments.
    pub async fn call_function_on(
        &self,
        object_id: &str,
        function_declaration: &str,
        arguments: Vec<Value>,
        return_by_value: bool,
    ) -> Result<Value, BrowserError> {
        let args: Vec<Value> = arguments.into_iter().map(|v| json!({ "value": v })).collect();
        let result = self
            .send_command(
                "Runtime.callFunctionOn",
                json!({
                    "objectId": object_id,
                    "functionDeclaration": function_declaration,
                    "arguments": args,
                    "returnByValue": return_by_value,
                }),
            )
            .await?;
        check_js_exception(&result)?;
        Ok(result)
    }
}

/// Surface `exceptionDetails` from an evaluate/callFunctionOn result.
fn check_js_exception(result: &Value) -> Result<(), BrowserError> {
    if let Some(exception) = result.get("exceptionDetails") {
        let message = exception
            .get("exception")
            .and_then(|e| e.get("description"))
            .and_then(|d| d.as_str())
            .or_else(|| exception.get("text").and_then(|t| t.as_str()))
            .unwrap_or("unknown exception")
            .to_string();
        return Err(BrowserError::JsException(message));
    }
    Ok(())
}

/// Extract the remote `objectId` from an evaluate/callFunctionOn result,
/// or `None` when the returned value was null/undefined.
pub fn result_object_id(result: &Value) -> Option<String> {
    let obj = result.get("result")?;
    match obj.get("subtype").and_then(|s| s.as_str()) {
        Some("null") => None,
        _ => obj
            .get("objectId")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
    }
}

/// Extract the plain JSON value from an evaluate/callFunctionOn result.
pub fn result_value(result: &Value) -> Value {
    result
        .get("result")
        .and_then(|r| r.get("value"))
        .cloned()
        .unwrap_or(Value::Null)
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self._reader_handle.abort();
        self._writer_handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_value_extraction() {
        let response = json!({
            "result": { "type": "string", "value": "complete" }
        });
        assert_eq!(result_value(&response), json!("complete"));
    }

    #[test]
    fn test_result_value_missing_is_null() {
        assert_eq!(result_value(&json!({})), Value::Null);
    }

    #[test]
    fn test_result_object_id_present() {
        let response = json!({
            "result": { "type": "object", "objectId": "{\"id\":7}" }
        });
        assert_eq!(result_object_id(&response).as_deref(), Some("{\"id\":7}"));
    }

    #[test]
    fn test_result_object_id_null_subtype() {
        // querySelector miss: object of subtype "null".
        let response = json!({
            "result": { "type": "object", "subtype": "null", "objectId": "x" }
        });
        assert_eq!(result_object_id(&response), None);
    }

    #[test]
    fn test_check_js_exception_description() {
        let response = json!({
            "exceptionDetails": {
                "text": "Uncaught",
                "exception": { "description": "ReferenceError: foo is not defined" }
            }
        });
        let err = check_js_exception(&response).unwrap_err();
        assert!(matches!(err, BrowserError::JsException(m) if m.contains("ReferenceError")));
    }

    #[test]
    fn test_check_js_exception_clean() {
        assert!(check_js_exception(&json!({"result": {"value": 1}})).is_ok());
    }
}
