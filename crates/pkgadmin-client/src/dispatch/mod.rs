//! Request dispatcher: typed REST primitives returning pending operations.
//!
//! Each primitive builds the request, hands the exchange to a task on the
//! client's runtime and returns a [`PendingOperation`] immediately.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::runtime::Handle;
use tracing::{debug, warn};
use url::Url;

use pkgadmin_core::AdminResult;

use crate::auth::AuthProvider;
use crate::errors;
use crate::paths;
use crate::pending::PendingOperation;
use crate::transport::{AdminRequest, HttpExecutor, RawResponse, RequestBody};

const APPLICATION_JSON: &str = "application/json";

/// Shared request pipeline: endpoint, credentials, executor and runtime
#[derive(Clone)]
pub struct Dispatcher {
    executor: Arc<dyn HttpExecutor>,
    auth: Arc<dyn AuthProvider>,
    base_url: Url,
    runtime: Handle,
}

impl Dispatcher {
    pub fn new(
        base_url: Url,
        executor: Arc<dyn HttpExecutor>,
        auth: Arc<dyn AuthProvider>,
        runtime: Handle,
    ) -> Self {
        Self {
            executor,
            auth,
            base_url,
            runtime,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    /// Undecorated request for `path` under the packages API
    pub fn request(&self, method: Method, path: &str) -> AdminResult<AdminRequest> {
        Ok(AdminRequest::new(method, paths::endpoint(&self.base_url, path)?))
    }

    /// Decorate and execute a request, returning the raw response whatever its status
    pub async fn submit(&self, request: AdminRequest) -> AdminResult<RawResponse> {
        let request = self.auth.decorate(request).map_err(errors::authentication)?;
        debug!(method = %request.method, url = %request.url, "sending request");

        let response = self.executor.execute(request).await.map_err(errors::transport)?;
        debug!(status = response.status().as_u16(), "received response");
        Ok(response)
    }

    /// Run `work` on the client runtime; failures are logged before being delivered
    pub fn spawn<T, F>(&self, operation: &'static str, work: F) -> PendingOperation<T>
    where
        T: Send + 'static,
        F: Future<Output = AdminResult<T>> + Send + 'static,
    {
        PendingOperation::spawn(&self.runtime, async move {
            let outcome = work.await;
            if let Err(e) = &outcome {
                warn!(operation, error = %e, "operation failed");
            }
            outcome
        })
    }

    /// GET `path` and decode the JSON body as `T`
    pub fn get_typed<T>(&self, path: &str) -> PendingOperation<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let request = match self.request(Method::GET, path) {
            Ok(request) => request.with_header(ACCEPT, HeaderValue::from_static(APPLICATION_JSON)),
            Err(e) => return PendingOperation::failed(e),
        };

        let dispatcher = self.clone();
        self.spawn("get", async move {
            let response = dispatcher.submit(request).await?;
            let status = response.status();
            if !status.is_success() {
                return Err(errors::from_response(response).await);
            }

            let body = response.bytes().await.map_err(errors::transport)?;
            serde_json::from_slice(&body).map_err(|e| errors::decode(status, e))
        })
    }

    /// PUT `body` as JSON to `path`
    pub fn put_entity<B>(&self, path: &str, body: &B) -> PendingOperation<()>
    where
        B: Serialize + ?Sized,
    {
        let payload = match serde_json::to_vec(body) {
            Ok(payload) => payload,
            Err(e) => {
                return PendingOperation::failed(errors::invalid_request(format!(
                    "Failed to encode request body: {}",
                    e
                )))
            },
        };

        let request = match self.request(Method::PUT, path) {
            Ok(request) => request
                .with_header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))
                .with_body(RequestBody::Json(Bytes::from(payload))),
            Err(e) => return PendingOperation::failed(e),
        };

        let dispatcher = self.clone();
        self.spawn("put", async move { dispatcher.expect_success(request).await })
    }

    /// DELETE `path`
    pub fn delete_resource(&self, path: &str) -> PendingOperation<()> {
        let request = match self.request(Method::DELETE, path) {
            Ok(request) => request,
            Err(e) => return PendingOperation::failed(e),
        };

        let dispatcher = self.clone();
        self.spawn("delete", async move { dispatcher.expect_success(request).await })
    }

    /// GET a JSON array of strings, keeping the server's order
    pub fn get_list(&self, path: &str) -> PendingOperation<Vec<String>> {
        self.get_typed(path)
    }

    async fn expect_success(&self, request: AdminRequest) -> AdminResult<()> {
        let response = self.submit(request).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(errors::from_response(response).await)
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
