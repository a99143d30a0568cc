// ═══════════════════════════════════════════════════════════════════
// Shared test helpers — scripted transport, recording navigator,
// JSON fixtures
// ═══════════════════════════════════════════════════════════════════

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use trading_dashboard_core::api::{ApiClient, ApiRequest, ApiResponse, Method, Navigator, Transport};
use trading_dashboard_core::errors::CoreError;
use trading_dashboard_core::models::session::Session;
use trading_dashboard_core::session::{SessionPersistence, SessionStore};

// ── Scripted transport ──────────────────────────────────────────────

#[derive(Clone)]
enum Reply {
    Body(u16, String),
    NetworkError,
}

#[derive(Clone)]
struct Scripted {
    reply: Reply,
    gate: Option<Arc<Notify>>,
}

#[derive(Default)]
struct Route {
    queue: VecDeque<Scripted>,
    fallback: Option<Scripted>,
}

/// Holds back a scripted response until `open` is called.
#[derive(Clone)]
pub struct Gate(Arc<Notify>);

impl Gate {
    pub fn open(&self) {
        self.0.notify_one();
    }
}

/// Transport answering from per-route scripts.
///
/// `once*` responses are consumed in order; `on` sets the response used
/// when the queue is empty. Unscripted routes answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), Route>>,
    calls: Mutex<Vec<ApiRequest>>,
    sent: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn route<R>(&self, method: Method, path: &str, f: impl FnOnce(&mut Route) -> R) -> R {
        let mut routes = self.routes.lock().unwrap();
        f(routes.entry((method, path.to_string())).or_default())
    }

    pub fn on(&self, method: Method, path: &str, status: u16, body: Value) {
        self.route(method, path, |r| {
            r.fallback = Some(Scripted {
                reply: Reply::Body(status, body.to_string()),
                gate: None,
            })
        });
    }

    pub fn on_network_error(&self, method: Method, path: &str) {
        self.route(method, path, |r| {
            r.fallback = Some(Scripted {
                reply: Reply::NetworkError,
                gate: None,
            })
        });
    }

    pub fn once(&self, method: Method, path: &str, status: u16, body: Value) {
        self.route(method, path, |r| {
            r.queue.push_back(Scripted {
                reply: Reply::Body(status, body.to_string()),
                gate: None,
            })
        });
    }

    pub fn once_raw(&self, method: Method, path: &str, status: u16, body: &str) {
        self.route(method, path, |r| {
            r.queue.push_back(Scripted {
                reply: Reply::Body(status, body.to_string()),
                gate: None,
            })
        });
    }

    pub fn once_gated(&self, method: Method, path: &str, status: u16, body: Value) -> Gate {
        let notify = Arc::new(Notify::new());
        self.route(method, path, |r| {
            r.queue.push_back(Scripted {
                reply: Reply::Body(status, body.to_string()),
                gate: Some(Arc::clone(&notify)),
            })
        });
        Gate(notify)
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_request(&self, method: Method, path: &str) -> Option<ApiRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
            .cloned()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, CoreError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        let key = (request.method, request.path.clone());
        self.calls.lock().unwrap().push(request);

        let scripted = {
            let mut routes = self.routes.lock().unwrap();
            routes
                .get_mut(&key)
                .and_then(|r| r.queue.pop_front().or_else(|| r.fallback.clone()))
        };

        let Some(scripted) = scripted else {
            return Ok(ApiResponse::new(404, r#"{"detail":"Not Found"}"#));
        };
        if let Some(gate) = scripted.gate {
            gate.notified().await;
        }
        match scripted.reply {
            Reply::Body(status, body) => Ok(ApiResponse::new(status, body)),
            Reply::NetworkError => Err(CoreError::Network("connection refused".into())),
        }
    }
}

// ── Navigator / persistence doubles ─────────────────────────────────

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

/// In-memory persistence that counts clears (session teardowns).
#[derive(Default)]
pub struct CountingPersistence {
    slot: Mutex<Option<Session>>,
    pub saves: AtomicUsize,
    pub clears: AtomicUsize,
}

impl CountingPersistence {
    pub fn with_token(token: &str) -> Arc<Self> {
        Arc::new(Self {
            slot: Mutex::new(Some(Session::new(token, None))),
            ..Self::default()
        })
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Option<Session> {
        self.slot.lock().unwrap().clone()
    }
}

impl SessionPersistence for CountingPersistence {
    fn load(&self) -> Result<Option<Session>, CoreError> {
        Ok(self.slot.lock().unwrap().clone())
    }

    fn save(&self, session: &Session) -> Result<(), CoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.slot.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        *self.slot.lock().unwrap() = None;
        Ok(())
    }
}

pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub navigator: Arc<RecordingNavigator>,
    pub persistence: Arc<CountingPersistence>,
    pub api: ApiClient,
}

impl Harness {
    /// Client with a live token "tok-1".
    pub fn authed() -> Self {
        let transport = ScriptedTransport::new();
        let navigator = RecordingNavigator::new();
        let persistence = CountingPersistence::with_token("tok-1");
        let session = SessionStore::restore(persistence.clone());
        let api = ApiClient::new(transport.clone(), session, navigator.clone());
        Self {
            transport,
            navigator,
            persistence,
            api,
        }
    }

    pub fn anonymous() -> Self {
        let h = Self::authed();
        h.api.session().logout();
        h.persistence.clears.store(0, Ordering::SeqCst);
        h
    }

    pub fn session(&self) -> &SessionStore {
        self.api.session()
    }
}

/// Let spawned tasks on the current-thread runtime make progress.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

// ── JSON fixtures ───────────────────────────────────────────────────

pub fn connections_json(n: usize) -> Value {
    let connections: Vec<Value> = (0..n)
        .map(|i| {
            json!({
                "id": format!("conn-{i}"),
                "broker": "binance",
                "is_active": true,
                "created_at": "2024-01-01T00:00:00Z"
            })
        })
        .collect();
    json!({ "connections": connections })
}

pub fn snapshot_json(total_balance: f64, trade_id: &str) -> Value {
    json!({
        "broker_balances": [
            { "broker": "binance", "total_balance": total_balance, "available_balance": total_balance, "currency": "USDT" }
        ],
        "positions": [
            { "coin": "BTC", "side": "long", "quantity": 0.1, "entry_price": 42000.0, "unrealized_pnl": 12.5 }
        ],
        "trades": [
            { "id": trade_id, "trader_id": "t-1", "coin": "BTC", "side": "long", "quantity": 0.1, "price": 42000.0, "timestamp": "2024-01-01T10:00:00Z" }
        ],
        "api_logs": [
            { "id": "log-1", "endpoint": "/fapi/v2/balance", "status": "ok", "timestamp": "2024-01-01T10:00:00Z" }
        ],
        "traders": [
            { "id": "t-1", "name": "Momentum", "model": "gpt-4o", "is_active": true }
        ]
    })
}

pub fn cached_json(total_balance: f64, trade_id: &str) -> Value {
    json!({
        "cached": true,
        "data": snapshot_json(total_balance, trade_id),
        "updated_at": "2024-01-01T09:00:00Z"
    })
}

pub fn cache_miss_json() -> Value {
    json!({ "cached": false, "data": null, "updated_at": null })
}

pub fn refresh_json(total_balance: f64, trade_id: &str) -> Value {
    json!({ "success": true, "data": snapshot_json(total_balance, trade_id) })
}

pub fn history_json(balances: &[(&str, f64)], trades: Value) -> Value {
    let history: Vec<Value> = balances
        .iter()
        .map(|(date, balance)| {
            json!({ "date": date, "balance": balance, "timestamp": format!("{date}T23:59:59Z") })
        })
        .collect();
    json!({ "history": history, "trades": trades })
}

pub fn marker_json(id: &str, date: &str, side: &str, time: &str) -> Value {
    json!({
        "id": id,
        "trader_id": "t-1",
        "coin": "BTC",
        "side": side,
        "quantity": 0.01,
        "price": 42000.0,
        "timestamp": format!("{date}T{time}Z"),
        "date": date
    })
}

/// Routes for a dashboard whose refresh and history calls always succeed.
pub fn script_healthy_dashboard(t: &ScriptedTransport) {
    t.on(Method::Get, "/brokers/connections", 200, connections_json(1));
    t.on(Method::Get, "/dashboard/cached", 200, cached_json(1000.0, "cached-trade"));
    t.on(Method::Post, "/dashboard/refresh", 200, refresh_json(1010.0, "live-trade"));
    t.on(
        Method::Get,
        "/dashboard/balance-history",
        200,
        history_json(&[("2024-01-01", 1000.0), ("2024-01-02", 1010.0)], json!([])),
    );
}
