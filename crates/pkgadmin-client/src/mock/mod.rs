//! In-memory executors for pipeline tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_LENGTH};
use reqwest::{Method, StatusCode};
use tokio::runtime::Handle;
use url::Url;

use crate::auth::NoAuth;
use crate::dispatch::Dispatcher;
use crate::paths::PACKAGES_BASE_PATH;
use crate::transport::{AdminRequest, HttpExecutor, PartContent, RawResponse, RequestBody, TransportError};

type Responder = dyn Fn(&AdminRequest) -> Result<RawResponse, TransportError> + Send + Sync;

/// Answers every request with a closure and records what it saw
pub struct ScriptedExecutor {
    responder: Box<Responder>,
    requests: Mutex<Vec<AdminRequest>>,
}

impl ScriptedExecutor {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&AdminRequest) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Always answer with `status` and `body`
    pub fn replying(status: u16, body: &'static str) -> Arc<Self> {
        Self::new(move |_| Ok(RawResponse::from_bytes(StatusCode::from_u16(status).unwrap(), body)))
    }

    pub fn requests(&self) -> Vec<AdminRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpExecutor for ScriptedExecutor {
    async fn execute(&self, request: AdminRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(&request)
    }
}

/// Response announcing `announced` bytes but delivering only `chunks`
pub fn short_response(announced: u64, chunks: Vec<&'static [u8]>) -> RawResponse {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_LENGTH, HeaderValue::from(announced));
    let body = stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from_static(c)))).boxed();
    RawResponse::new(StatusCode::OK, headers, body)
}

/// Response whose body fails after the first chunk
pub fn broken_response(status: StatusCode, first: &'static [u8]) -> RawResponse {
    let chunks = vec![
        Ok(Bytes::from_static(first)),
        Err(TransportError::Network {
            message: "connection reset".to_string(),
            source: None,
        }),
    ];
    RawResponse::new(status, HeaderMap::new(), stream::iter(chunks).boxed())
}

#[derive(Default)]
struct StoredPackage {
    content: Vec<u8>,
    metadata: String,
}

/// Minimal package store speaking the admin REST surface
#[derive(Default)]
pub struct MemoryStore {
    packages: Mutex<HashMap<String, StoredPackage>>,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn not_found() -> RawResponse {
        RawResponse::from_bytes(StatusCode::NOT_FOUND, r#"{"reason":"Package not found"}"#)
    }

    fn handle(&self, request: AdminRequest) -> Result<RawResponse, TransportError> {
        let prefix = format!("/{}/", PACKAGES_BASE_PATH);
        let path = request.url.path().trim_start_matches(&prefix).to_string();
        let mut packages = self.packages.lock().unwrap();

        let response = match (request.method, request.body) {
            (Method::POST, RequestBody::Multipart(parts)) => {
                let mut package = StoredPackage::default();
                for part in parts {
                    match part.content {
                        PartContent::File(file) => {
                            package.content = std::fs::read(&file)
                                .map_err(|source| TransportError::LocalFile { path: file, source })?;
                        },
                        PartContent::Text(text) => package.metadata = text,
                    }
                }
                packages.insert(path, package);
                RawResponse::from_bytes(StatusCode::NO_CONTENT, "")
            },
            (Method::GET, _) => match path.strip_suffix("/metadata") {
                Some(package) => match packages.get(package) {
                    Some(stored) => RawResponse::from_bytes(StatusCode::OK, stored.metadata.clone()),
                    None => Self::not_found(),
                },
                None => match packages.get(&path) {
                    Some(stored) => RawResponse::from_bytes(StatusCode::OK, stored.content.clone()),
                    None => Self::not_found(),
                },
            },
            (Method::DELETE, _) => match packages.remove(&path) {
                Some(_) => RawResponse::from_bytes(StatusCode::NO_CONTENT, ""),
                None => Self::not_found(),
            },
            _ => RawResponse::from_bytes(StatusCode::METHOD_NOT_ALLOWED, ""),
        };
        Ok(response)
    }
}

#[async_trait]
impl HttpExecutor for MemoryStore {
    async fn execute(&self, request: AdminRequest) -> Result<RawResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.handle(request)
    }
}

/// Dispatcher on the current runtime talking to `executor`
pub fn dispatcher(executor: Arc<dyn HttpExecutor>) -> Dispatcher {
    Dispatcher::new(
        Url::parse("http://localhost:8080").unwrap(),
        executor,
        Arc::new(NoAuth),
        Handle::current(),
    )
}
