//! `notifications read | read-all | count`.

use bazaar_client::Console;
use bazaar_core::NotificationId;

use super::CliError;

/// # Errors
///
/// Returns `CliError` if the request fails.
pub async fn mark_read(console: &Console, id: &str) -> Result<(), CliError> {
    let notification = console
        .notifications
        .mark_read(&NotificationId::new(id))
        .await?;
    tracing::info!(id = %notification.id, "Read: {}", notification.title);
    Ok(())
}

/// # Errors
///
/// Returns `CliError` if the request fails.
pub async fn mark_all_read(console: &Console) -> Result<(), CliError> {
    let modified = console.notifications.mark_all_read().await?;
    tracing::info!(modified, "Notifications marked as read");
    Ok(())
}

/// # Errors
///
/// Returns `CliError` if the request fails.
pub async fn unread_count(console: &Console) -> Result<(), CliError> {
    let count = console.notifications.unread_count().await?;
    tracing::info!(count, "{count} unread");
    Ok(())
}
