//! `reqwest`-backed executor with connection pooling

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, ClientBuilder};
use tokio_util::io::ReaderStream;
use tracing::trace;

use pkgadmin_config::ClientConfig;
use pkgadmin_core::AdminResult;

use super::{AdminRequest, FormPart, HttpExecutor, PartContent, RawResponse, RequestBody, TransportError};
use crate::errors;

/// Executor that sends requests with a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    /// Underlying HTTP client with connection pooling
    client: Client,
}

impl ReqwestExecutor {
    /// Create an executor configured from the client settings
    pub fn new(config: &ClientConfig) -> AdminResult<Self> {
        let client = ClientBuilder::new()
            // Connection pooling configuration
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(90))
            // Request timeouts
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            // Enable gzip compression
            .gzip(true)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| errors::client_setup("Failed to create HTTP client", e))?;

        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Encode the described parts; file parts are streamed from disk
    async fn build_form(parts: Vec<FormPart>) -> Result<Form, TransportError> {
        let mut form = Form::new();

        for part in parts {
            let encoded = match part.content {
                PartContent::File(path) => file_part(&path).await?,
                PartContent::Text(text) => Part::text(text),
            };
            let encoded = encoded
                .mime_str(&part.content_type)
                .map_err(|e| TransportError::network(format!("Invalid content type '{}'", part.content_type), e))?;
            form = form.part(part.name, encoded);
        }

        Ok(form)
    }
}

async fn file_part(path: &Path) -> Result<Part, TransportError> {
    let local_error = |source| TransportError::LocalFile {
        path: path.to_path_buf(),
        source,
    };

    let file = tokio::fs::File::open(path).await.map_err(local_error)?;
    let length = file.metadata().await.map_err(local_error)?.len();

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());

    let body = Body::wrap_stream(ReaderStream::new(file));
    Ok(Part::stream_with_length(body, length).file_name(file_name))
}

/// Describe a reqwest failure without repeating the URL twice
fn describe(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timed out".to_string()
    } else if error.is_connect() {
        "Failed to connect to the admin service".to_string()
    } else if error.is_body() {
        "Failed to send request body".to_string()
    } else {
        format!("Request failed: {}", error)
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn execute(&self, request: AdminRequest) -> Result<RawResponse, TransportError> {
        trace!(method = %request.method, url = %request.url, "executing request");

        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) => builder.body(bytes),
            RequestBody::Multipart(parts) => builder.multipart(Self::build_form(parts).await?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::network(describe(&e), e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes_stream()
            .map_err(|e| TransportError::network("Failed to read response body", e))
            .boxed();

        Ok(RawResponse::new(status, headers, body))
    }
}
