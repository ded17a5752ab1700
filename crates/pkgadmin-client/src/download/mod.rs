//! Streaming package download.
//!
//! The body is written chunk by chunk to a temporary file next to the
//! destination and renamed over it once complete. A failed download leaves
//! the destination exactly as it was.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::{Method, StatusCode};
use tempfile::{NamedTempFile, TempPath};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use pkgadmin_core::AdminResult;

use crate::dispatch::Dispatcher;
use crate::errors;
use crate::paths;
use crate::pending::PendingOperation;
use crate::transport::{ByteStream, RawResponse};

const TEMP_PREFIX: &str = ".pkgadmin-download-";

/// Download `package_name` into `destination`, replacing any existing file
pub fn download(dispatcher: &Dispatcher, package_name: &str, destination: &Path) -> PendingOperation<()> {
    let name = match paths::resolve(package_name) {
        Ok(name) => name,
        Err(e) => return PendingOperation::failed(e),
    };

    let request = match dispatcher.request(Method::GET, &paths::to_path(&name, None)) {
        Ok(request) => request,
        Err(e) => return PendingOperation::failed(e),
    };

    let target = DownloadTarget::new(destination);
    let task = dispatcher.clone();
    dispatcher.spawn("download", async move {
        let response = task.submit(request).await?;
        if response.status() != StatusCode::OK {
            return Err(errors::from_response(response).await);
        }

        let written = target.store(response).await?;
        debug!(package = %name, bytes = written, path = %target.destination.display(), "download complete");
        Ok(())
    })
}

/// Destination file and the directory that will hold it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    destination: PathBuf,
    parent: PathBuf,
}

impl DownloadTarget {
    pub fn new(destination: &Path) -> Self {
        let parent = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self {
            destination: destination.to_path_buf(),
            parent,
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn parent(&self) -> &Path {
        &self.parent
    }

    /// Stream the response body into place, returning the number of bytes written
    pub async fn store(&self, response: RawResponse) -> AdminResult<u64> {
        tokio::fs::create_dir_all(&self.parent)
            .await
            .map_err(|e| errors::local_io(format!("Failed to create {}", self.parent.display()), e))?;

        // The temporary file is removed when `temp_path` is dropped before persisting
        let (file, temp_path) = create_temp(self.parent.clone()).await?.into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let expected = response.content_length();
        let written = copy_stream(response.into_body(), &mut file, &temp_path).await?;

        if let Some(expected) = expected {
            if expected != written {
                return Err(errors::truncated(expected, written));
            }
        }

        let write_error = |e: std::io::Error| errors::local_io(format!("Failed to write {}", temp_path.display()), e);
        file.flush().await.map_err(write_error)?;
        file.sync_all().await.map_err(write_error)?;
        drop(file);

        keep_existing_mode(&self.destination, &temp_path).await?;
        self.persist(temp_path)?;
        Ok(written)
    }

    fn persist(&self, temp_path: TempPath) -> AdminResult<()> {
        temp_path.persist(&self.destination).map_err(|e| {
            errors::local_io(format!("Failed to move download to {}", self.destination.display()), e.error)
        })
    }
}

/// Copy every chunk of `body` into `file`; the stream is consumed and dropped on all paths
async fn copy_stream(mut body: ByteStream, file: &mut tokio::fs::File, temp_path: &Path) -> AdminResult<u64> {
    let mut written = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(errors::transport)?;
        file.write_all(&chunk)
            .await
            .map_err(|e| errors::local_io(format!("Failed to write {}", temp_path.display()), e))?;
        written += chunk.len() as u64;
    }
    Ok(written)
}

/// Create the temporary file off the runtime workers.
///
/// New files get the mode a plain create would give them (`0o666` less the umask).
async fn create_temp(parent: PathBuf) -> AdminResult<NamedTempFile> {
    let dir = parent.clone();
    tokio::task::spawn_blocking(move || {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        builder.tempfile_in(&dir)
    })
    .await
    .map_err(|_| errors::interrupted("temporary file creation was cancelled"))?
    .map_err(|e| errors::local_io(format!("Failed to create a temporary file in {}", parent.display()), e))
}

/// A replaced file keeps its permissions
async fn keep_existing_mode(destination: &Path, temp_path: &Path) -> AdminResult<()> {
    let existing = match tokio::fs::metadata(destination).await {
        Ok(metadata) if metadata.is_file() => metadata.permissions(),
        _ => return Ok(()),
    };
    tokio::fs::set_permissions(temp_path, existing)
        .await
        .map_err(|e| errors::local_io(format!("Failed to set permissions on {}", temp_path.display()), e))
}
