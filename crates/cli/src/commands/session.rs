//! `login`, `logout` and `status`.

use secrecy::SecretString;
use tracing::{info, warn};

use refund_desk::{DeskConfig, DeskError, FileTokenStore, TokenStore};

use super::session_manager;

/// Exchange credentials for a token and store it.
///
/// # Errors
///
/// Returns `DeskError::LoginFailed` if the login did not produce a session.
/// The reason has already been reported to the operator.
pub async fn login(
    config: &DeskConfig,
    username: &str,
    password: SecretString,
) -> Result<(), DeskError> {
    let mut manager = session_manager(config);
    if manager.login(username, password).await {
        info!(path = %config.token_path.display(), "Logged in");
        Ok(())
    } else {
        Err(DeskError::LoginFailed)
    }
}

/// Remove the stored token.
///
/// # Errors
///
/// Returns `DeskError::Store` if the token file could not be removed.
pub fn logout(config: &DeskConfig) -> Result<(), DeskError> {
    let mut manager = session_manager(config);
    manager.restore();
    manager.logout()?;
    info!("Logged out");
    Ok(())
}

/// Report whether a token is stored. The token is not checked against the server.
pub fn status(config: &DeskConfig) {
    let store = FileTokenStore::new(&config.token_path);
    match store.load() {
        Ok(Some(_)) => info!(path = %config.token_path.display(), "Logged in"),
        Ok(None) => info!("Not logged in"),
        Err(e) => warn!(error = %e, "Session file unreadable, treated as logged out"),
    }
}
