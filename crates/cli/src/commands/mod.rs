//! Command implementations.
//!
//! Every command loads its own session from the token file; nothing is kept
//! between invocations except that file.

pub mod customers;
pub mod session;

use std::sync::Arc;

use refund_desk::{
    DeskConfig, DeskError, FileTokenStore, HttpPanelApi, Notifier, Session, SessionManager,
    TracingNotifier,
};

/// API client, notifier and restored session shared by customer commands.
pub struct Context {
    pub api: HttpPanelApi,
    pub notifier: Arc<dyn Notifier>,
    pub session: Session,
}

impl Context {
    /// Restore the stored session.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::NotAuthenticated` if no token is stored.
    pub fn restore(config: &DeskConfig) -> Result<Self, DeskError> {
        let mut manager = session_manager(config);
        if !manager.restore() {
            return Err(DeskError::NotAuthenticated);
        }

        Ok(Self {
            api: api(config),
            notifier: notifier(),
            session: manager.session().clone(),
        })
    }
}

fn api(config: &DeskConfig) -> HttpPanelApi {
    HttpPanelApi::new(&config.api_base_url, config.api_key.clone())
}

fn notifier() -> Arc<dyn Notifier> {
    Arc::new(TracingNotifier)
}

fn session_manager(config: &DeskConfig) -> SessionManager<HttpPanelApi, FileTokenStore> {
    SessionManager::new(
        api(config),
        FileTokenStore::new(&config.token_path),
        notifier(),
    )
}
