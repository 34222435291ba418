//! `upload`.

use std::path::Path;

use bazaar_client::Console;

use super::CliError;

/// Upload a file and print where it is hosted.
///
/// # Errors
///
/// Returns `CliError` if the file cannot be read or the upload fails.
pub async fn upload(console: &Console, path: &Path) -> Result<(), CliError> {
    let uploaded = console.upload(path).await?;
    tracing::info!(public_id = uploaded.public_id.as_deref(), "{}", uploaded.url);
    Ok(())
}
