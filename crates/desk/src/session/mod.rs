//! Operator session: login, logout and restore.
//!
//! # Lifecycle
//!
//! 1. [`SessionManager::restore`] runs once at startup. A stored token is
//!    trusted as-is; it is not revalidated against the server.
//! 2. [`SessionManager::login`] exchanges credentials for a token and persists it.
//! 3. [`SessionManager::logout`] forgets the token locally. There is no remote call.
//!
//! The resulting [`Session`] is passed by reference to every component that
//! talks to the customer API.

mod store;

use std::sync::Arc;

use secrecy::SecretString;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::api::{ApiError, Credentials, PanelApi};
use crate::notify::Notifier;

pub use store::{FileTokenStore, MemoryTokenStore, StoreError, TokenStore};

const MSG_INVALID_CREDENTIALS: &str = "Credenciais inválidas";
const MSG_AUTH_FAILED: &str = "Não foi possível autenticar";
const MSG_SERVER_ERROR: &str = "Erro no servidor. Tente novamente mais tarde.";
const MSG_STORAGE_ERROR: &str = "Não foi possível salvar a sessão.";

/// Errors that can occur while authenticating.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The API answered 401.
    #[error("invalid credentials")]
    Rejected,

    /// The API answered with another non-success status.
    #[error("authentication failed with status {0}")]
    Failed(u16),

    /// The call failed at the transport or the body was unreadable.
    #[error("authentication server error: {0}")]
    Server(ApiError),

    /// The API accepted the call but returned no token.
    #[error("authentication response carried no token")]
    MissingToken,

    /// The token could not be persisted.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status: 401, .. } => Self::Rejected,
            ApiError::Status { status, .. } => Self::Failed(status),
            other => Self::Server(other),
        }
    }
}

/// Authentication state handed to remote-call components.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<SecretString>,
}

impl Session {
    /// A session that has not logged in.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { token: None }
    }

    /// A session holding `token`.
    #[must_use]
    pub const fn with_token(token: SecretString) -> Self {
        Self { token: Some(token) }
    }

    /// Whether an operator is logged in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The opaque session token.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }
}

/// Owns the operator session and its persisted token.
pub struct SessionManager<A, S> {
    api: A,
    store: S,
    notifier: Arc<dyn Notifier>,
    session: Session,
}

impl<A, S> std::fmt::Debug for SessionManager<A, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("authenticated", &self.session.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl<A: PanelApi, S: TokenStore> SessionManager<A, S> {
    /// Create a manager with an unauthenticated session.
    pub fn new(api: A, store: S, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            store,
            notifier,
            session: Session::anonymous(),
        }
    }

    /// Current session.
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Whether an operator is logged in.
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Adopt a previously stored token without contacting the server.
    ///
    /// Returns `true` if a token was found. An unreadable store is logged and
    /// treated as empty.
    pub fn restore(&mut self) -> bool {
        match self.store.load() {
            Ok(Some(token)) => {
                self.session = Session::with_token(token);
                info!("Session restored from stored token");
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "Could not read stored session token");
                false
            }
        }
    }

    /// Log in with `username` and `password`.
    ///
    /// Returns `true` once the token is stored and the session is
    /// authenticated. Every failure is reported through the notifier and
    /// leaves both the session and the store untouched.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: SecretString) -> bool {
        match self.authenticate(username, password).await {
            Ok(token) => {
                self.session = Session::with_token(token);
                info!("Operator logged in");
                true
            }
            Err(e) => {
                match &e {
                    AuthError::Rejected => {
                        warn!("Login rejected");
                        self.notifier.error(MSG_INVALID_CREDENTIALS);
                    }
                    AuthError::Failed(status) => {
                        error!(status, "Login failed");
                        self.notifier.error(MSG_AUTH_FAILED);
                    }
                    AuthError::Server(source) => {
                        error!(error = %source, "Login server error");
                        self.notifier.error(MSG_SERVER_ERROR);
                    }
                    AuthError::MissingToken => {
                        warn!("Login response carried no token");
                    }
                    AuthError::Storage(source) => {
                        error!(error = %source, "Could not persist session token");
                        self.notifier.error(MSG_STORAGE_ERROR);
                    }
                }
                false
            }
        }
    }

    /// Exchange credentials for a token and persist it.
    async fn authenticate(
        &self,
        username: &str,
        password: SecretString,
    ) -> Result<SecretString, AuthError> {
        let credentials = Credentials::new(username, password);
        let token = self
            .api
            .authenticate(&credentials)
            .await?
            .map(SecretString::from)
            .ok_or(AuthError::MissingToken)?;

        self.store.save(&token)?;
        Ok(token)
    }

    /// Forget the session locally.
    ///
    /// The session is unauthenticated afterwards even if clearing the store
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the stored token could not be removed.
    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.session = Session::anonymous();
        self.store.clear().inspect_err(|e| {
            error!(error = %e, "Could not clear stored session token");
        })?;
        info!("Operator logged out");
        Ok(())
    }
}
