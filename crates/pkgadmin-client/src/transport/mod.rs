//! HTTP executor capability.
//!
//! The client never talks to sockets itself: every request is described as an
//! [`AdminRequest`] and handed to an [`HttpExecutor`], which answers with a
//! [`RawResponse`] whose body is a stream of chunks. Multipart bodies are
//! described part by part and encoded by the executor.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH};
use reqwest::{Method, StatusCode};
use thiserror::Error;
use url::Url;

pub mod http;

pub use http::ReqwestExecutor;

/// Boxed error used as a transport failure cause
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Response body as a stream of chunks
pub type ByteStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// Failures raised by an executor before or while receiving a response
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("{message}")]
    Network {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("failed to read {}", .path.display())]
    LocalFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request cancelled")]
    Cancelled,
}

impl TransportError {
    /// Create a network error from any error type
    pub fn network<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Content of one multipart part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartContent {
    /// Streamed from a local file when the request is sent
    File(PathBuf),
    Text(String),
}

/// One named part of a multipart body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub content_type: String,
    pub content: PartContent,
}

impl FormPart {
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>, content_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            content: PartContent::File(path.into()),
        }
    }

    pub fn text(name: impl Into<String>, text: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            content: PartContent::Text(text.into()),
        }
    }
}

/// Request body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Serialized JSON document
    Json(Bytes),
    /// multipart/form-data, encoded by the executor
    Multipart(Vec<FormPart>),
}

/// A request ready to be decorated and submitted
#[derive(Debug, Clone)]
pub struct AdminRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl AdminRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }
}

/// Status, headers and streamed body of a response
pub struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: ByteStream,
}

impl RawResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: ByteStream) -> Self {
        Self { status, headers, body }
    }

    /// Response whose whole body is already in memory
    pub fn from_bytes(status: StatusCode, body: impl Into<Bytes>) -> Self {
        let body: Bytes = body.into();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        Self::new(status, headers, stream::once(async move { Ok(body) }).boxed())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Announced body length, if the server sent one
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
    }

    pub fn into_body(self) -> ByteStream {
        self.body
    }

    /// Collect the whole body in memory
    pub async fn bytes(self) -> Result<Bytes, TransportError> {
        let mut body = self.body;
        let mut buffer = BytesMut::new();
        while let Some(chunk) = body.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer.freeze())
    }

    /// Collect the body as text, replacing invalid UTF-8
    pub async fn text(self) -> Result<String, TransportError> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Performs HTTP requests on behalf of the client.
///
/// Implementations own connection handling, TLS and timeouts. They must not
/// interpret the status code: any response that arrives is returned as-is.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, request: AdminRequest) -> Result<RawResponse, TransportError>;
}
