//! `login`, `logout` and `whoami`.

use std::io::BufRead;

use bazaar_client::Console;
use secrecy::SecretString;

use super::CliError;

/// Sign in, reading the password from stdin when not given.
///
/// # Errors
///
/// Returns `CliError` if the password cannot be read or the login fails.
pub async fn login(
    console: &Console,
    email: &str,
    password: Option<String>,
) -> Result<(), CliError> {
    let password = match password {
        Some(password) => password,
        None => read_password()?,
    };
    let profile = console
        .auth
        .login(email, &SecretString::from(password))
        .await?;
    tracing::info!(
        id = %profile.id,
        role = %console.role(),
        "Signed in as {}",
        profile.email.as_ref().map_or(email, |e| e.as_str())
    );
    Ok(())
}

/// Sign out and drop cached lists.
///
/// # Errors
///
/// Returns `CliError` if the token cannot be removed.
pub async fn logout(console: &Console) -> Result<(), CliError> {
    console.auth.logout().await?;
    console.clear().await;
    Ok(())
}

/// Print the signed-in account.
///
/// # Errors
///
/// Returns `CliError::InvalidArgument` if the role is not signed in, or the
/// request's error.
pub async fn whoami(console: &Console) -> Result<(), CliError> {
    if !console.auth.is_logged_in()? {
        return Err(CliError::InvalidArgument(format!(
            "not logged in as {}; run `bazaar --role {} login`",
            console.role(),
            console.role()
        )));
    }
    let profile = console.auth.profile().await?;
    tracing::info!(
        id = %profile.id,
        email = profile.email.as_ref().map(|e| e.as_str()),
        phone = profile.phone.as_deref(),
        "{} ({})",
        profile.name,
        profile.role.unwrap_or_else(|| console.role())
    );
    Ok(())
}

fn read_password() -> Result<String, CliError> {
    tracing::info!("Password:");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(CliError::InvalidArgument("password is empty".to_string()));
    }
    Ok(password)
}
