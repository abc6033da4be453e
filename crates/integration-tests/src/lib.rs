//! Integration tests for Refund Desk.
//!
//! The tests in `tests/` drive the library through [`HttpPanelApi`] against an
//! `httpmock` server standing in for the customer-management API, so the wire
//! format (paths, bodies, bearer header) is checked end to end.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p refund-desk-integration-tests
//! ```

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use httpmock::MockServer;
use refund_desk::notify::MemoryNotifier;
use refund_desk::{HttpPanelApi, OutreachSettings, Session};
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;

/// Bearer key the client is configured with.
pub const API_KEY: &str = "integration-api-key";

/// Bot name sent with every dispatch.
pub const BOT_NAME: &str = "refund-bot";

/// Expected `Authorization` header value.
#[must_use]
pub fn bearer() -> String {
    format!("Bearer {API_KEY}")
}

/// Client pointed at the mock server.
#[must_use]
pub fn api(server: &MockServer) -> HttpPanelApi {
    HttpPanelApi::new(
        &Url::parse(&server.base_url()).unwrap(),
        SecretString::from(API_KEY),
    )
}

/// Outreach settings with no pause between messages.
#[must_use]
pub fn settings() -> OutreachSettings {
    OutreachSettings {
        bot_name: BOT_NAME.to_string(),
        test_phone: None,
        country_code: "55".to_string(),
        message_delay: Duration::ZERO,
        block_cancelled: false,
        web_messaging_url: Url::parse("https://wa.me").unwrap(),
    }
}

/// An authenticated session.
#[must_use]
pub fn logged_in() -> Session {
    Session::with_token(SecretString::from("session-token"))
}

/// Fresh notifier that records every notification.
#[must_use]
pub fn notifier() -> Arc<MemoryNotifier> {
    Arc::new(MemoryNotifier::new())
}

/// A customer as the API lists it, with string-typed numbers and no discount.
#[must_use]
pub fn customer_json(id: &str, fullname: &str, status: &str) -> Value {
    json!({
        "id": id,
        "code": format!("C-{id}"),
        "fullname": fullname,
        "phone": "(11) 98765-4321",
        "cpf": "",
        "quantity": "1",
        "total_amount": "100.00",
        "discount_amount": "0.00",
        "final_amount": "100.00",
        "status": status
    })
}

/// `{ "data": [...] }` list body.
#[must_use]
pub fn list_body(customers: Vec<Value>) -> Value {
    json!({ "data": customers })
}
