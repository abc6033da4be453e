//! In-memory [`PanelApi`] used by unit tests.

use std::sync::Arc;

use parking_lot::Mutex;
use refund_desk_core::{Brl, CustomerCode, CustomerId, CustomerRecord, CustomerStatus};

use super::{ApiError, Credentials, OutboundMessage, PanelApi, StatusUpdate};

/// Canned answer for one kind of call.
#[derive(Debug, Clone, Copy, Default)]
pub enum Reply {
    #[default]
    Ok,
    Token(&'static str),
    NoToken,
    Status(u16),
    Network,
}

impl Reply {
    fn into_result(self) -> Result<(), ApiError> {
        match self {
            Self::Ok | Self::Token(_) | Self::NoToken => Ok(()),
            Self::Status(status) => Err(ApiError::Status {
                status,
                message: "canned failure".to_string(),
            }),
            Self::Network => Err(ApiError::Network("connection refused".to_string())),
        }
    }
}

/// Number of calls made per endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calls {
    pub auth: usize,
    pub list: usize,
    pub update: usize,
    pub dispatch: usize,
}

impl Calls {
    pub const fn total(self) -> usize {
        self.auth + self.list + self.update + self.dispatch
    }
}

#[derive(Default)]
struct FakeState {
    auth: Reply,
    list: Reply,
    customers: Vec<CustomerRecord>,
    dispatch: Reply,
    /// 1-based index of the dispatch that fails with `dispatch`.
    fail_dispatch_at: Option<usize>,
    update: Reply,
    calls: Calls,
    sent: Vec<OutboundMessage>,
    updates: Vec<StatusUpdate>,
}

/// Scriptable API double that records every call.
#[derive(Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auth(self, reply: Reply) -> Self {
        self.state.lock().auth = reply;
        self
    }

    pub fn with_customers(self, customers: Vec<CustomerRecord>) -> Self {
        self.state.lock().customers = customers;
        self
    }

    pub fn with_list(self, reply: Reply) -> Self {
        self.state.lock().list = reply;
        self
    }

    /// Every dispatch answers with `reply`.
    pub fn with_dispatch(self, reply: Reply) -> Self {
        self.state.lock().dispatch = reply;
        self
    }

    /// Only the `nth` dispatch (1-based) answers with `reply`.
    pub fn fail_dispatch_at(self, nth: usize, reply: Reply) -> Self {
        {
            let mut state = self.state.lock();
            state.dispatch = reply;
            state.fail_dispatch_at = Some(nth);
        }
        self
    }

    pub fn with_update(self, reply: Reply) -> Self {
        self.state.lock().update = reply;
        self
    }

    pub fn calls(&self) -> Calls {
        self.state.lock().calls
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.state.lock().sent.clone()
    }

    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.state.lock().updates.clone()
    }
}

impl PanelApi for FakeApi {
    async fn authenticate(&self, _credentials: &Credentials) -> Result<Option<String>, ApiError> {
        let mut state = self.state.lock();
        state.calls.auth += 1;
        let reply = state.auth;
        reply.into_result()?;
        Ok(match reply {
            Reply::Token(token) => Some(token.to_string()),
            _ => None,
        })
    }

    async fn list_customers(&self) -> Result<Vec<CustomerRecord>, ApiError> {
        let mut state = self.state.lock();
        state.calls.list += 1;
        state.list.into_result()?;
        Ok(state.customers.clone())
    }

    async fn update_status(&self, update: &StatusUpdate) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        state.calls.update += 1;
        state.update.into_result()?;
        state.updates.push(update.clone());
        Ok(())
    }

    async fn send_message(&self, message: &OutboundMessage) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        state.calls.dispatch += 1;
        let applies = state
            .fail_dispatch_at
            .is_none_or(|nth| nth == state.calls.dispatch);
        if applies {
            state.dispatch.into_result()?;
        }
        state.sent.push(message.clone());
        Ok(())
    }
}

/// Customer fixture with no discount.
pub fn customer(id: &str, fullname: &str, status: CustomerStatus) -> CustomerRecord {
    CustomerRecord {
        id: CustomerId::new(id),
        code: CustomerCode::new(format!("C-{id}")),
        fullname: fullname.to_string(),
        phone: "(11) 98765-4321".to_string(),
        cpf: None,
        quantity: 1,
        total_amount: Brl::parse("100.00").unwrap_or_default(),
        discount_amount: Some(Brl::ZERO),
        final_amount: Brl::parse("100.00").unwrap_or_default(),
        status,
    }
}

/// Customer fixture with a discount, which yields two messages.
pub fn discounted_customer(id: &str, fullname: &str, status: CustomerStatus) -> CustomerRecord {
    CustomerRecord {
        quantity: 3,
        total_amount: Brl::parse("300.00").unwrap_or_default(),
        discount_amount: Brl::parse("30.00").ok(),
        final_amount: Brl::parse("270.00").unwrap_or_default(),
        ..customer(id, fullname, status)
    }
}
