//! File uploads.
//!
//! Images for products, banners and brands are uploaded first and the hosted
//! URL is then put into the draft.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::instrument;

use crate::error::ApiError;
use crate::http::ApiClient;

/// Largest file the client will try to send.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Where the backend stored an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub url: String,
    #[serde(default, alias = "public_id")]
    pub public_id: Option<String>,
}

/// `POST /upload` with the file in the multipart field `file`.
///
/// # Errors
///
/// Returns `ApiError::Upload` if the file cannot be read or is too large, or
/// any other `ApiError` if the request fails.
#[instrument(skip(client), fields(role = %client.role(), path = %path.display()))]
pub async fn upload(client: &ApiClient, path: &Path) -> Result<UploadedFile, ApiError> {
    let part = file_part(path).await.map_err(|e| {
        client
            .notifier()
            .notify(crate::notify::Notice::error(e.user_message()));
        e
    })?;
    let form = Form::new().part("file", part);

    let uploaded = client
        .post_multipart::<UploadedFile>(&["upload"], form)
        .await?
        .into_data()?;

    tracing::info!(url = %uploaded.url, "File uploaded");
    Ok(uploaded)
}

async fn file_part(path: &Path) -> Result<Part, ApiError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ApiError::Upload(format!("{} is not a file", path.display())))?
        .to_string();

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| ApiError::Upload(format!("Cannot read {}: {e}", path.display())))?;
    if metadata.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::Upload(format!(
            "{file_name} is larger than {} MB",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ApiError::Upload(format!("Cannot read {}: {e}", path.display())))?;

    Part::bytes(bytes)
        .file_name(file_name.clone())
        .mime_str(mime_for(&file_name))
        .map_err(|e| ApiError::Upload(e.to_string()))
}

fn mime_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for("banner.PNG"), "image/png");
        assert_eq!(mime_for("photo.jpeg"), "image/jpeg");
        assert_eq!(mime_for("README"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_missing_file_is_upload_error() {
        let path =
            std::env::temp_dir().join(format!("bazaar-missing-{}.png", uuid::Uuid::new_v4()));
        let err = file_part(&path).await.unwrap_err();
        assert!(matches!(err, ApiError::Upload(_)));
    }

    #[test]
    fn test_uploaded_file_shape() {
        let file: UploadedFile =
            serde_json::from_str(r#"{"url": "https://cdn.example/x.png", "public_id": "x"}"#)
                .unwrap();
        assert_eq!(file.public_id.as_deref(), Some("x"));
    }
}
