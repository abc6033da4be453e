//! The customer roster: the list currently shown to the operator.
//!
//! Every fetch goes back to the server, including filter changes. Filtering
//! and ordering happen client-side on the freshly fetched list.

use std::sync::Arc;

use parking_lot::RwLock;
use refund_desk_core::{CustomerId, CustomerRecord, CustomerStatus, StatusFilter, compare_names};
use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::api::{ApiError, PanelApi};
use crate::notify::Notifier;
use crate::session::Session;

const MSG_FETCH_FAILED: &str = "Erro ao buscar os dados dos clientes.";

/// Errors that can occur while loading the roster.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("not logged in")]
    NotAuthenticated,

    #[error("failed to fetch customers: {0}")]
    FetchFailed(#[from] ApiError),
}

#[derive(Debug, Default)]
struct RosterState {
    filter: StatusFilter,
    records: Vec<CustomerRecord>,
}

/// Fetched, filtered and name-ordered customer records.
///
/// Methods take `&self`, so a roster can be shared with concurrently running
/// outreach actions.
pub struct Roster<A> {
    api: A,
    notifier: Arc<dyn Notifier>,
    state: RwLock<RosterState>,
}

impl<A> std::fmt::Debug for Roster<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Roster")
            .field("filter", &state.filter)
            .field("len", &state.records.len())
            .finish_non_exhaustive()
    }
}

impl<A> Roster<A> {
    /// Active filter.
    pub fn filter(&self) -> StatusFilter {
        self.state.read().filter
    }

    /// Snapshot of the displayed records, in display order.
    pub fn records(&self) -> Vec<CustomerRecord> {
        self.state.read().records.clone()
    }

    /// Number of displayed records.
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    /// Whether no record is displayed.
    pub fn is_empty(&self) -> bool {
        self.state.read().records.is_empty()
    }

    /// Find a displayed record by id or by code.
    pub fn find(&self, key: &str) -> Option<CustomerRecord> {
        self.state
            .read()
            .records
            .iter()
            .find(|c| c.id.as_str() == key || c.code.as_str() == key)
            .cloned()
    }

    /// Set a record's status in memory after a confirmed remote update.
    ///
    /// Returns `false` if the record is no longer displayed.
    pub fn set_status(&self, id: &CustomerId, status: CustomerStatus) -> bool {
        let mut state = self.state.write();
        match state.records.iter_mut().find(|c| &c.id == id) {
            Some(record) => {
                record.status = status;
                true
            }
            None => false,
        }
    }

    /// Mark a record refunded in memory.
    pub fn mark_refunded(&self, id: &CustomerId) -> bool {
        self.set_status(id, CustomerStatus::Refunded)
    }
}

impl<A: PanelApi> Roster<A> {
    /// Create an empty roster showing every status.
    pub fn new(api: A, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            state: RwLock::new(RosterState::default()),
        }
    }

    /// Fetch every customer, keep those matching `filter`, order them by name.
    ///
    /// Returns the number of displayed records. On failure the displayed
    /// records stay as they were and the operator is notified.
    ///
    /// # Errors
    ///
    /// Returns `RosterError` if the session is not authenticated or the fetch fails.
    #[instrument(skip(self, session), fields(filter = %filter))]
    pub async fn fetch_all(
        &self,
        session: &Session,
        filter: StatusFilter,
    ) -> Result<usize, RosterError> {
        if !session.is_authenticated() {
            return Err(RosterError::NotAuthenticated);
        }

        let fetched = self.api.list_customers().await.inspect_err(|e| {
            error!(error = %e, "Failed to fetch customers");
            self.notifier.error(MSG_FETCH_FAILED);
        })?;

        let records = select(fetched, filter);
        let count = records.len();
        {
            let mut state = self.state.write();
            state.filter = filter;
            state.records = records;
        }

        debug!(count, "Roster refreshed");
        Ok(count)
    }

    /// Switch to `filter` and fetch again.
    ///
    /// The filter changes even if the fetch fails.
    ///
    /// # Errors
    ///
    /// Returns `RosterError` if the session is not authenticated or the fetch fails.
    pub async fn apply_filter(
        &self,
        session: &Session,
        filter: StatusFilter,
    ) -> Result<usize, RosterError> {
        self.state.write().filter = filter;
        self.fetch_all(session, filter).await
    }

    /// Fetch again with the active filter.
    ///
    /// # Errors
    ///
    /// Returns `RosterError` if the session is not authenticated or the fetch fails.
    pub async fn refresh(&self, session: &Session) -> Result<usize, RosterError> {
        let filter = self.filter();
        self.fetch_all(session, filter).await
    }
}

/// Keep records passing `filter`, ordered by full name.
///
/// The sort is stable: records with equal names keep their server order.
#[must_use]
pub fn select(records: Vec<CustomerRecord>, filter: StatusFilter) -> Vec<CustomerRecord> {
    let mut kept: Vec<CustomerRecord> = records
        .into_iter()
        .filter(|c| filter.matches(c.status))
        .collect();
    kept.sort_by(|a, b| compare_names(&a.fullname, &b.fullname));
    kept
}
