//! Multipart package upload.
//!
//! Uploads bypass the dispatcher's typed decoding: the raw status of the
//! response decides the outcome.

use std::path::Path;

use reqwest::Method;
use tracing::debug;

use pkgadmin_core::{AdminResult, PackageMetadata};

use crate::dispatch::Dispatcher;
use crate::errors;
use crate::paths;
use crate::pending::PendingOperation;
use crate::transport::{FormPart, RequestBody};

/// Form field carrying the package binary
pub const FILE_PART: &str = "file";
/// Form field carrying the metadata document
pub const METADATA_PART: &str = "metadata";

const OCTET_STREAM: &str = "application/octet-stream";
const APPLICATION_JSON: &str = "application/json";

/// Upload `local_file` as `package_name` together with its metadata
pub fn upload(
    dispatcher: &Dispatcher,
    metadata: &PackageMetadata,
    package_name: &str,
    local_file: &Path,
) -> PendingOperation<()> {
    let name = match paths::resolve(package_name) {
        Ok(name) => name,
        Err(e) => return PendingOperation::failed(e),
    };

    let metadata = match serde_json::to_string(metadata) {
        Ok(json) => json,
        Err(e) => {
            return PendingOperation::failed(errors::invalid_request(format!(
                "Failed to encode package metadata: {}",
                e
            )))
        },
    };

    let request = match dispatcher.request(Method::POST, &paths::to_path(&name, None)) {
        Ok(request) => request,
        Err(e) => return PendingOperation::failed(e),
    };

    let local_file = local_file.to_path_buf();
    let task = dispatcher.clone();
    dispatcher.spawn("upload", async move {
        check_local_file(&local_file).await?;
        debug!(package = %name, file = %local_file.display(), "uploading package");

        let request = request.with_body(RequestBody::Multipart(vec![
            FormPart::file(FILE_PART, local_file, OCTET_STREAM),
            FormPart::text(METADATA_PART, metadata, APPLICATION_JSON),
        ]));

        let response = task.submit(request).await?;
        let status = response.status();
        if (200..300).contains(&status.as_u16()) {
            return Ok(());
        }

        Err(errors::from_response(response).await)
    })
}

/// The binary must be a readable regular file before anything is sent
async fn check_local_file(path: &Path) -> AdminResult<()> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| errors::local_io(format!("Cannot read {}", path.display()), e))?;

    if !metadata.is_file() {
        return Err(errors::local_io(
            format!("{} is not a regular file", path.display()),
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, ScriptedExecutor};
    use crate::transport::{PartContent, TransportError};
    use reqwest::StatusCode;
    use pkgadmin_core::AdminError;
    use std::path::PathBuf;

    fn package_file(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("echo.jar");
        std::fs::write(&path, b"jar-bytes").unwrap();
        path
    }

    #[tokio::test]
    async fn test_upload_sends_two_part_form() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = package_file(&temp_dir);
        let executor = ScriptedExecutor::replying(200, "");
        let dispatcher = mock::dispatcher(executor.clone());

        let metadata = PackageMetadata::with_description("echo");
        upload(&dispatcher, &metadata, "function://public/default/echo@1.0", &file)
            .await
            .unwrap();

        let requests = executor.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].url.path(), "/admin/v3/packages/function/public/default/echo/1.0");

        let parts = match &requests[0].body {
            RequestBody::Multipart(parts) => parts,
            other => panic!("Expected multipart body, got {:?}", other),
        };
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name, FILE_PART);
        assert_eq!(parts[0].content_type, OCTET_STREAM);
        assert_eq!(parts[0].content, PartContent::File(file.clone()));
        assert_eq!(parts[1].name, METADATA_PART);
        assert_eq!(parts[1].content_type, APPLICATION_JSON);
        assert_eq!(parts[1].content, PartContent::Text(r#"{"description":"echo","properties":{}}"#.to_string()));
    }

    #[tokio::test]
    async fn test_server_error_carries_status_and_body() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = package_file(&temp_dir);
        let dispatcher = mock::dispatcher(ScriptedExecutor::replying(500, "disk full"));

        let result = upload(&dispatcher, &PackageMetadata::default(), "function://public/default/echo@1.0", &file).await;
        match result {
            Err(AdminError::Server { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "disk full");
            },
            other => panic!("Expected Server error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreadable_error_body_falls_back_to_status_reason() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = package_file(&temp_dir);
        let executor = ScriptedExecutor::new(|_| {
            Ok(mock::broken_response(StatusCode::INTERNAL_SERVER_ERROR, b"disk"))
        });
        let dispatcher = mock::dispatcher(executor);

        let result = upload(&dispatcher, &PackageMetadata::default(), "function://public/default/echo@1.0", &file).await;
        match result {
            Err(AdminError::Server { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            },
            other => panic!("Expected Server error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_name_makes_no_request() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = package_file(&temp_dir);
        let executor = ScriptedExecutor::replying(200, "");
        let dispatcher = mock::dispatcher(executor.clone());

        let result = upload(&dispatcher, &PackageMetadata::default(), "public/default/echo", &file).await;
        assert!(matches!(result, Err(AdminError::MalformedIdentifier { .. })));
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_file_is_local_io() {
        let temp_dir = tempfile::tempdir().unwrap();
        let executor = ScriptedExecutor::replying(200, "");
        let dispatcher = mock::dispatcher(executor.clone());

        let missing = temp_dir.path().join("missing.jar");
        let result = upload(&dispatcher, &PackageMetadata::default(), "function://t/ns/echo", &missing).await;
        assert!(matches!(result, Err(AdminError::LocalIo { .. })));
        assert_eq!(executor.call_count(), 0);

        let result = upload(&dispatcher, &PackageMetadata::default(), "function://t/ns/echo", temp_dir.path()).await;
        assert!(matches!(result, Err(AdminError::LocalIo { .. })));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = package_file(&temp_dir);
        let executor = ScriptedExecutor::new(|_| {
            let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
            Err(TransportError::network("Failed to connect to the admin service", refused))
        });
        let dispatcher = mock::dispatcher(executor);

        let result = upload(&dispatcher, &PackageMetadata::default(), "function://t/ns/echo", &file).await;
        assert!(matches!(result, Err(AdminError::Transport { .. })));
    }
}
