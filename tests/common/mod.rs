//! Shared utilities for integration tests: an in-process JSON-RPC node.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use url::Url;

/// Base58 of 32 bytes of `byte`, as the node reports object digests.
pub fn digest(byte: u8) -> String {
    bs58::encode([byte; 32]).into_string()
}

type Responder = Arc<dyn Fn(&Value) -> Reply + Send + Sync>;

/// What the node answers for one method.
#[derive(Clone)]
pub enum Reply {
    Result(Value),
    Error { code: i64, message: String },
}

struct NodeState {
    responders: HashMap<String, Responder>,
    delay: Option<Duration>,
    requests: Mutex<Vec<Value>>,
}

/// Mock node configuration. Unconfigured methods answer "method not found".
#[derive(Default)]
pub struct MockNode {
    responders: HashMap<String, Responder>,
    delay: Option<Duration>,
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// A node that resolves every object as shared, holds one large gas coin
    /// and executes any transaction successfully.
    pub fn healthy() -> Self {
        Self::new()
            .respond("sui_multiGetObjects", |params| {
                let ids = params[0].as_array().cloned().unwrap_or_default();
                let objects: Vec<Value> = ids
                    .into_iter()
                    .map(|id| {
                        json!({
                            "data": {
                                "objectId": id,
                                "version": "11",
                                "digest": digest(4),
                                "owner": { "Shared": { "initial_shared_version": 3 } }
                            }
                        })
                    })
                    .collect();
                Reply::Result(Value::Array(objects))
            })
            .reply("suix_getReferenceGasPrice", json!("750"))
            .reply(
                "suix_getCoins",
                json!({
                    "data": [
                        { "coinObjectId": "0xc01", "version": "7", "digest": digest(1), "balance": "40000000" },
                        { "coinObjectId": "0xc02", "version": "9", "digest": digest(2), "balance": "900000000" }
                    ],
                    "nextCursor": null,
                    "hasNextPage": false
                }),
            )
            .reply(
                "sui_executeTransactionBlock",
                json!({
                    "digest": "5uDG1cnBHcWiVWsJt2DZVhmvXaMvTYFcNPZhz7ReByDq",
                    "effects": { "status": { "status": "success" }, "gasUsed": { "computationCost": "1000" } },
                    "events": [],
                    "objectChanges": [{ "type": "created", "objectId": "0xfeed" }],
                    "balanceChanges": []
                }),
            )
    }

    pub fn reply(self, method: &str, result: Value) -> Self {
        self.respond(method, move |_| Reply::Result(result.clone()))
    }

    pub fn reject(self, method: &str, code: i64, message: &str) -> Self {
        let message = message.to_string();
        self.respond(method, move |_| Reply::Error {
            code,
            message: message.clone(),
        })
    }

    pub fn respond<F>(mut self, method: &str, responder: F) -> Self
    where
        F: Fn(&Value) -> Reply + Send + Sync + 'static,
    {
        self.responders.insert(method.to_string(), Arc::new(responder));
        self
    }

    /// Hold every response for `delay`.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn start(self) -> RunningNode {
        let state = Arc::new(NodeState {
            responders: self.responders,
            delay: self.delay,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/", post(handle))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        RunningNode { addr, state }
    }
}

async fn handle(State(state): State<Arc<NodeState>>, Json(request): Json<Value>) -> Json<Value> {
    state.requests.lock().unwrap().push(request.clone());
    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }

    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or_default();
    let reply = match state.responders.get(method) {
        Some(responder) => responder(&request["params"]),
        None => Reply::Error {
            code: -32601,
            message: format!("Method not found: {}", method),
        },
    };

    Json(match reply {
        Reply::Result(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Reply::Error { code, message } => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message }
        }),
    })
}

/// Handle to a started node.
pub struct RunningNode {
    addr: SocketAddr,
    state: Arc<NodeState>,
}

impl RunningNode {
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).unwrap()
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Method names received so far, in arrival order.
    pub fn methods(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r["method"].as_str().map(str::to_string))
            .collect()
    }

    /// Params of the first call to `method`.
    pub fn params_of(&self, method: &str) -> Option<Value> {
        self.requests()
            .into_iter()
            .find(|r| r["method"] == method)
            .map(|r| r["params"].clone())
    }
}
