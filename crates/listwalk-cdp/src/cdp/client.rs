//! CDP WebSocket client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use super::error::CdpError;
use super::protocol::{BrowserVersion, CdpRequest, CdpResponse, PageInfo};
use super::session::{PageSession, CALL_TIMEOUT};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub(crate) type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Pending request waiting for response.
pub(crate) struct PendingRequest {
    pub tx: oneshot::Sender<Result<Value, CdpError>>,
}

pub(crate) type PendingMap = Arc<Mutex<HashMap<u64, PendingRequest>>>;

/// Connection state shared by the client and every page session.
#[derive(Clone)]
pub(crate) struct Channel {
    pub ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
    pub pending: PendingMap,
    pub request_id: Arc<AtomicU64>,
    /// Set once the WebSocket is gone. Every later call fails fast.
    pub closed: Arc<AtomicBool>,
}

impl Channel {
    /// Send one CDP command and wait for its response.
    pub async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(CdpError::SessionClosed);
        }

        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(|s| s.to_string()),
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, PendingRequest { tx });

        {
            let mut ws = self.ws_tx.lock().await;
            if let Err(e) = ws.send(Message::Text(json.into())).await {
                self.pending.lock().remove(&id);
                return Err(e.into());
            }
        }

        match tokio::time::timeout(CALL_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!("Request {} timed out", method)))
            }
        }
    }
}

/// CDP client for browser automation.
pub struct CdpClient {
    /// HTTP endpoint for page discovery.
    http_endpoint: String,
    channel: Channel,
    /// Background task handle.
    _recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Fetch `/json/version` to learn the browser's WebSocket URL.
    async fn discover(http_endpoint: &str) -> Result<BrowserVersion, CdpError> {
        let unavailable =
            |e: reqwest::Error| CdpError::ChromeNotAvailable(format!("{}: {}", http_endpoint, e));
        reqwest::get(format!("{}/json/version", http_endpoint))
            .await
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)
    }

    /// Connect to Chrome at the given endpoint (e.g. `http://localhost:9222`).
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();
        let version = Self::discover(&http_endpoint).await?;
        debug!("{} speaks CDP {}", version.browser, version.protocol_version);

        let browser_ws_url = version.web_socket_debugger_url;
        let (ws_stream, _) = tokio_tungstenite::connect_async(browser_ws_url.as_str())
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("{}: {}", browser_ws_url, e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let channel = Channel {
            ws_tx: Arc::new(tokio::sync::Mutex::new(ws_sink)),
            pending: Arc::new(Mutex::new(HashMap::new())),
            request_id: Arc::new(AtomicU64::new(1)),
            closed: Arc::new(AtomicBool::new(false)),
        };

        let recv_task = {
            let pending = channel.pending.clone();
            let closed = channel.closed.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending.clone()).await;
                closed.store(true, Ordering::SeqCst);
                // Wake every waiter so callers see SessionClosed immediately.
                let waiters: Vec<PendingRequest> =
                    pending.lock().drain().map(|(_, req)| req).collect();
                for req in waiters {
                    let _ = req.tx.send(Err(CdpError::SessionClosed));
                }
            })
        };

        debug!("CDP WebSocket open at {}", browser_ws_url);

        Ok(Self {
            http_endpoint,
            channel,
            _recv_task: recv_task,
        })
    }

    /// WebSocket receive loop. Returns when the socket closes.
    async fn receive_loop(mut ws_source: WsSource, pending: PendingMap) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    match serde_json::from_str::<CdpResponse>(&text) {
                        Ok(resp) => {
                            let Some(id) = resp.id else {
                                // Events are not consumed by list traversal.
                                continue;
                            };
                            let pending_req = pending.lock().remove(&id);
                            if let Some(req) = pending_req {
                                let _ = req.tx.send(resp.into_result());
                            }
                        }
                        Err(e) => {
                            warn!("Failed to parse CDP message: {}", e);
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    }

    /// Send a browser-level CDP command.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.channel.call(method, params, None).await
    }

    // ========================================================================
    // Target Management
    // ========================================================================

    /// List all pages.
    pub async fn list_pages(&self) -> Result<Vec<PageInfo>, CdpError> {
        let url = format!("{}/json/list", self.http_endpoint);
        let pages: Vec<PageInfo> = reqwest::get(&url).await?.json().await?;
        Ok(pages.into_iter().filter(|p| p.page_type == "page").collect())
    }

    /// Open a blank tab and attach to it.
    pub async fn new_page(&self) -> Result<PageSession, CdpError> {
        // /json/new only accepts PUT on current Chrome.
        let page_info: PageInfo = reqwest::Client::new()
            .put(format!("{}/json/new", self.http_endpoint))
            .send()
            .await?
            .json()
            .await?;
        debug!("Opened tab {}", page_info.id);

        self.attach_page(&page_info.id).await
    }

    /// Attach to an existing page.
    pub async fn attach_page(&self, target_id: &str) -> Result<PageSession, CdpError> {
        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": target_id,
                    "flatten": true
                })),
            )
            .await?;

        let session_id = result["sessionId"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                CdpError::InvalidResponse(format!("attachToTarget {}: no sessionId", target_id))
            })?;

        let session = PageSession::new(target_id.to_string(), session_id, self.channel.clone());
        session.enable_domains().await?;

        Ok(session)
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self._recv_task.abort();
    }
}
