//! Packages admin client with async and blocking call styles

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tokio::runtime::{Builder, Handle, Runtime};
use tracing::debug;
use url::Url;

use pkgadmin_config::ClientConfig;
use pkgadmin_core::{AdminResult, PackageMetadata};

use crate::auth::{self, AuthProvider, NoAuth};
use crate::bridge::blocking;
use crate::dispatch::Dispatcher;
use crate::errors;
use crate::paths::{self, METADATA_SUFFIX};
use crate::pending::PendingOperation;
use crate::transport::{HttpExecutor, ReqwestExecutor};
use crate::{download, upload};

const WORKER_THREADS: usize = 2;

/// Runtime created by the client when none was available
struct OwnedRuntime(Option<Runtime>);

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.0.take() {
            runtime.shutdown_background();
        }
    }
}

/// Client for the packages admin API.
///
/// Every operation comes in two forms: `xxx_async` returns a
/// [`PendingOperation`] immediately, `xxx` blocks the calling thread until
/// the outcome is known.
#[derive(Clone)]
pub struct PackagesClient {
    dispatcher: Dispatcher,
    /// Keeps a client-owned runtime alive for as long as any clone exists
    _runtime: Option<Arc<OwnedRuntime>>,
}

impl PackagesClient {
    /// Create a client from resolved configuration, using `reqwest`
    pub fn new(config: &ClientConfig) -> AdminResult<Self> {
        config
            .validate()
            .map_err(|e| errors::invalid_request(e.to_string()))?;

        Self::builder(config.web_service_url.clone())
            .executor(Arc::new(ReqwestExecutor::new(config)?))
            .auth(auth::from_config(&config.auth))
            .build()
    }

    /// Start building a client with custom collaborators
    pub fn builder(web_service_url: Url) -> PackagesClientBuilder {
        PackagesClientBuilder {
            web_service_url,
            executor: None,
            auth: None,
            runtime: None,
        }
    }

    pub fn web_service_url(&self) -> &Url {
        self.dispatcher.base_url()
    }

    /// Fetch the metadata document of a package version
    pub fn get_metadata_async(&self, package_name: &str) -> PendingOperation<PackageMetadata> {
        match paths::resolve(package_name) {
            Ok(name) => self
                .dispatcher
                .get_typed(&paths::to_path(&name, Some(METADATA_SUFFIX))),
            Err(e) => PendingOperation::failed(e),
        }
    }

    pub fn get_metadata(&self, package_name: &str) -> AdminResult<PackageMetadata> {
        blocking(self.dispatcher.runtime(), || self.get_metadata_async(package_name))
    }

    /// Replace the metadata document of a package version
    pub fn update_metadata_async(&self, package_name: &str, metadata: &PackageMetadata) -> PendingOperation<()> {
        match paths::resolve(package_name) {
            Ok(name) => self
                .dispatcher
                .put_entity(&paths::to_path(&name, Some(METADATA_SUFFIX)), metadata),
            Err(e) => PendingOperation::failed(e),
        }
    }

    pub fn update_metadata(&self, package_name: &str, metadata: &PackageMetadata) -> AdminResult<()> {
        blocking(self.dispatcher.runtime(), || self.update_metadata_async(package_name, metadata))
    }

    /// Upload a local file as a new package version
    pub fn upload_async(
        &self,
        metadata: &PackageMetadata,
        package_name: &str,
        local_file: impl AsRef<Path>,
    ) -> PendingOperation<()> {
        upload::upload(&self.dispatcher, metadata, package_name, local_file.as_ref())
    }

    pub fn upload(&self, metadata: &PackageMetadata, package_name: &str, local_file: impl AsRef<Path>) -> AdminResult<()> {
        blocking(self.dispatcher.runtime(), || self.upload_async(metadata, package_name, local_file))
    }

    /// Download a package version to `destination`, creating parent directories
    pub fn download_async(&self, package_name: &str, destination: impl AsRef<Path>) -> PendingOperation<()> {
        download::download(&self.dispatcher, package_name, destination.as_ref())
    }

    pub fn download(&self, package_name: &str, destination: impl AsRef<Path>) -> AdminResult<()> {
        blocking(self.dispatcher.runtime(), || self.download_async(package_name, destination))
    }

    /// Delete a package version
    pub fn delete_async(&self, package_name: &str) -> PendingOperation<()> {
        match paths::resolve(package_name) {
            Ok(name) => self.dispatcher.delete_resource(&paths::to_path(&name, None)),
            Err(e) => PendingOperation::failed(e),
        }
    }

    pub fn delete(&self, package_name: &str) -> AdminResult<()> {
        blocking(self.dispatcher.runtime(), || self.delete_async(package_name))
    }

    /// List the versions of a package, in server order
    pub fn list_package_versions_async(&self, package_name: &str) -> PendingOperation<Vec<String>> {
        match paths::resolve(package_name) {
            Ok(name) => self.dispatcher.get_list(&paths::versions_path(&name)),
            Err(e) => PendingOperation::failed(e),
        }
    }

    pub fn list_package_versions(&self, package_name: &str) -> AdminResult<Vec<String>> {
        blocking(self.dispatcher.runtime(), || self.list_package_versions_async(package_name))
    }

    /// List the packages of one type in a `tenant/namespace`
    pub fn list_packages_async(&self, package_type: &str, namespace: &str) -> PendingOperation<Vec<String>> {
        match paths::packages_path(package_type, namespace) {
            Ok(path) => self.dispatcher.get_list(&path),
            Err(e) => PendingOperation::failed(e),
        }
    }

    pub fn list_packages(&self, package_type: &str, namespace: &str) -> AdminResult<Vec<String>> {
        blocking(self.dispatcher.runtime(), || self.list_packages_async(package_type, namespace))
    }
}

impl fmt::Debug for PackagesClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackagesClient")
            .field("web_service_url", &self.dispatcher.base_url().as_str())
            .field("owns_runtime", &self._runtime.is_some())
            .finish()
    }
}

/// Builder for [`PackagesClient`]
pub struct PackagesClientBuilder {
    web_service_url: Url,
    executor: Option<Arc<dyn HttpExecutor>>,
    auth: Option<Arc<dyn AuthProvider>>,
    runtime: Option<Handle>,
}

impl PackagesClientBuilder {
    pub fn executor(mut self, executor: Arc<dyn HttpExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Run operations on this runtime instead of the current or a private one
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn build(self) -> AdminResult<PackagesClient> {
        let executor = match self.executor {
            Some(executor) => executor,
            None => Arc::new(ReqwestExecutor::new(&ClientConfig {
                web_service_url: self.web_service_url.clone(),
                ..ClientConfig::default()
            })?),
        };
        let auth = self.auth.unwrap_or_else(|| Arc::new(NoAuth));

        let (handle, owned) = match self.runtime.or_else(|| Handle::try_current().ok()) {
            Some(handle) => (handle, None),
            None => {
                let runtime = Builder::new_multi_thread()
                    .worker_threads(WORKER_THREADS)
                    .thread_name("pkgadmin-worker")
                    .enable_all()
                    .build()
                    .map_err(|e| errors::local_io("Failed to start the client runtime", e))?;
                debug!(workers = WORKER_THREADS, "started client runtime");
                (runtime.handle().clone(), Some(Arc::new(OwnedRuntime(Some(runtime)))))
            },
        };

        Ok(PackagesClient {
            dispatcher: Dispatcher::new(self.web_service_url, executor, auth, handle),
            _runtime: owned,
        })
    }
}

#[cfg(test)]
mod tests;
