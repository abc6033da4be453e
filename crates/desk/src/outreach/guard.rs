//! Per-customer in-flight guard.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use refund_desk_core::CustomerId;

/// Customers with a send currently running.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    ids: Arc<Mutex<HashSet<CustomerId>>>,
}

impl InFlight {
    /// Claim `id`. Returns `None` if a send for `id` is already running.
    pub fn try_acquire(&self, id: &CustomerId) -> Option<InFlightGuard> {
        if self.ids.lock().insert(id.clone()) {
            Some(InFlightGuard {
                ids: Arc::clone(&self.ids),
                id: id.clone(),
            })
        } else {
            None
        }
    }

    /// Whether a send for `id` is running.
    pub fn contains(&self, id: &CustomerId) -> bool {
        self.ids.lock().contains(id)
    }
}

/// Releases its customer id when dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    ids: Arc<Mutex<HashSet<CustomerId>>>,
    id: CustomerId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.ids.lock().remove(&self.id);
    }
}
