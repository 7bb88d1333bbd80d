//! Shared fixtures for the integration tests: a scripted `HttpBackend`, a
//! navigator that counts redirects, and token helpers.
#![allow(dead_code)]

use academic_search_core::domain::Session;
use academic_search_core::ports::{HttpBackend, HttpRequest, HttpResponse, Navigator, PortError, PortResult};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use bytes::Bytes;
use client_lib::adapters::MemoryStorage;
use client_lib::normalize::decode_identity;
use client_lib::{ApiClient, Config, SessionStore};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

//=========================================================================================
// ScriptedBackend
//=========================================================================================

struct Reply {
    result: PortResult<HttpResponse>,
    gate: Option<oneshot::Receiver<()>>,
}

/// Answers requests from a queue of canned replies and records what was sent.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedBackend {
    pub fn push_json(&self, status: u16, body: Value) {
        self.push(response(status, &[], body), None);
    }

    pub fn push_with_headers(&self, status: u16, headers: &[(&str, &str)], body: Value) {
        self.push(response(status, headers, body), None);
    }

    pub fn push_raw(&self, status: u16, body: &'static [u8]) {
        self.push(
            Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: Bytes::from_static(body),
            }),
            None,
        );
    }

    pub fn push_no_response(&self) {
        self.push(Err(PortError::NoResponse("connection refused".to_string())), None);
    }

    /// Queues a reply that is held back until the returned sender fires.
    pub fn push_gated_json(&self, status: u16, body: Value) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.push(response(status, &[], body), Some(gate));
        release
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }

    fn push(&self, result: PortResult<HttpResponse>, gate: Option<oneshot::Receiver<()>>) {
        self.replies.lock().unwrap().push_back(Reply { result, gate });
    }
}

fn response(status: u16, headers: &[(&str, &str)], body: Value) -> PortResult<HttpResponse> {
    Ok(HttpResponse {
        status,
        headers: headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        body: Bytes::from(body.to_string()),
    })
}

#[async_trait]
impl HttpBackend for ScriptedBackend {
    async fn execute(&self, request: HttpRequest) -> PortResult<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        let reply = self.replies.lock().unwrap().pop_front();
        let Some(reply) = reply else {
            return Err(PortError::Unexpected("no scripted reply left".to_string()));
        };
        if let Some(gate) = reply.gate {
            let _ = gate.await;
        }
        reply.result
    }
}

//=========================================================================================
// RecordingNavigator
//=========================================================================================

#[derive(Default)]
pub struct RecordingNavigator {
    redirects: AtomicUsize,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

//=========================================================================================
// Harness
//=========================================================================================

pub struct Harness {
    pub backend: Arc<ScriptedBackend>,
    pub storage: Arc<MemoryStorage>,
    pub navigator: Arc<RecordingNavigator>,
    pub api: Arc<ApiClient>,
    pub config: Config,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let backend = Arc::new(ScriptedBackend::default());
        let storage = Arc::new(MemoryStorage::new());
        let navigator = Arc::new(RecordingNavigator::default());
        let api = Arc::new(ApiClient::new(
            backend.clone(),
            SessionStore::new(storage.clone()),
            navigator.clone(),
            &config,
        ));
        Self {
            backend,
            storage,
            navigator,
            api,
            config,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        self.api.sessions()
    }

    /// Persists a session for `token` as if a login had happened.
    pub fn sign_in(&self, token: &str) -> Session {
        let session = Session::new(token.to_string(), decode_identity(token).unwrap());
        self.sessions().save(&session).unwrap();
        session
    }
}

//=========================================================================================
// Tokens & Payloads
//=========================================================================================

pub fn token_for(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.signature", header, payload)
}

/// A token for user `ada` that expires far in the future.
pub fn user_token() -> String {
    token_for(json!({
        "userId": "u-1",
        "username": "ada",
        "email": "ada@example.org",
        "tenant": "acme",
        "role": "RESEARCHER",
        "authorities": ["search:read"],
        "exp": 4102444800i64
    }))
}

pub fn record(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "documentId": id,
        "title": title,
        "authors": ["Ada Lovelace"],
        "abstract": "An abstract",
        "year": 2020
    })
}

pub fn records(prefix: &str, count: usize) -> Vec<Value> {
    (1..=count)
        .map(|n| record(&format!("{}{}", prefix, n), &format!("Paper {}{}", prefix, n)))
        .collect()
}
