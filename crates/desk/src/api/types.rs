//! Request and response bodies of the remote API.

use refund_desk_core::{CustomerCode, CustomerId, CustomerRecord, CustomerStatus};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

/// Operator credentials sent to `POST /auth/token`.
#[derive(Serialize)]
pub struct Credentials {
    pub user: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

impl Credentials {
    /// Build credentials from a username and password.
    #[must_use]
    pub fn new(user: impl Into<String>, password: SecretString) -> Self {
        Self {
            user: user.into(),
            password,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Body of a successful authentication.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Body of `GET /process/customers`.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerListResponse {
    pub data: Vec<CustomerRecord>,
}

/// Body of `PUT /process/customers/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub id: CustomerId,
    pub code: CustomerCode,
    pub status: CustomerStatus,
}

impl StatusUpdate {
    /// Status update for `customer`.
    #[must_use]
    pub fn for_customer(customer: &CustomerRecord, status: CustomerStatus) -> Self {
        Self {
            id: customer.id.clone(),
            code: customer.code.clone(),
            status,
        }
    }
}

/// Body of `POST /evoRoutes/sendMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    /// Sender identifier of the messaging bot.
    pub bot_name: String,
    /// Country-code-prefixed destination number, digits only.
    pub number: String,
    pub text_message: String,
}
