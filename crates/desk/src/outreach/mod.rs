//! Refund outreach: message a customer, then mark the purchase refunded.
//!
//! # Flow
//!
//! 1. Skip records whose row action is disabled (refunded, optionally cancelled)
//! 2. Claim the customer so a second send for the same id is rejected
//! 3. Dispatch each composed message in order, pausing between the two
//! 4. If every dispatch succeeded, set the remote status to `refunded`
//! 5. Mirror the new status in the roster without re-fetching
//!
//! A failed dispatch stops the flow before the status update. A failed status
//! update after successful dispatches leaves the remote record out of sync
//! with the messages already sent; the operator has to retry by hand.

mod guard;
mod link;
mod messages;
mod phone;

use std::sync::Arc;
use std::time::Duration;

use refund_desk_core::{CustomerId, CustomerRecord, CustomerStatus};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::api::{ApiError, OutboundMessage, PanelApi, StatusUpdate};
use crate::notify::Notifier;
use crate::roster::Roster;
use crate::session::Session;

pub use guard::{InFlight, InFlightGuard};
pub use link::{open_in_browser, web_link};
pub use messages::{build_message, quota_noun};
pub use phone::normalize as normalize_phone;

const MSG_SENDING: &str = "Enviando mensagem...";
const MSG_SENT: &str = "Mensagem enviada com sucesso!";
const MSG_SEND_FAILED: &str = "Erro ao enviar a mensagem.";
const MSG_ALREADY_SENDING: &str = "Já existe um envio em andamento para este cliente.";

/// Errors that can occur during an outreach action.
#[derive(Debug, Error)]
pub enum OutreachError {
    #[error("not logged in")]
    NotAuthenticated,

    /// Another send for the same customer is still running.
    #[error("a send for customer {0} is already in progress")]
    InFlight(CustomerId),

    /// A dispatch failed; `sent` messages went out before it.
    #[error("message dispatch failed after {sent} sent: {source}")]
    DispatchFailed {
        sent: usize,
        #[source]
        source: ApiError,
    },

    /// Every message went out but the status update failed.
    #[error("{sent} message(s) sent but the status update failed: {source}")]
    StatusUpdateFailed {
        sent: usize,
        #[source]
        source: ApiError,
    },

    /// The web messaging link could not be opened.
    #[error("could not open web messaging link: {0}")]
    Browser(#[from] std::io::Error),
}

/// Result of a send that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Messages were dispatched and the record is now refunded.
    Sent { messages: usize },
    /// The row action is disabled for this status; nothing was called.
    Skipped(CustomerStatus),
}

/// Outreach parameters.
#[derive(Debug, Clone)]
pub struct OutreachSettings {
    /// Sender identifier of the messaging bot.
    pub bot_name: String,
    /// Destination override for every message.
    pub test_phone: Option<String>,
    /// Country calling code prefixed to destination numbers.
    pub country_code: String,
    /// Pause between the first and second message.
    pub message_delay: Duration,
    /// Also disable the row action on cancelled records.
    pub block_cancelled: bool,
    /// Base of the web messaging link.
    pub web_messaging_url: Url,
}

/// Runs outreach actions against the remote API.
pub struct Outreach<A> {
    api: A,
    notifier: Arc<dyn Notifier>,
    settings: OutreachSettings,
    in_flight: InFlight,
}

impl<A> std::fmt::Debug for Outreach<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outreach")
            .field("settings", &self.settings)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl<A: PanelApi> Outreach<A> {
    /// Create an outreach runner.
    pub fn new(api: A, notifier: Arc<dyn Notifier>, settings: OutreachSettings) -> Self {
        Self {
            api,
            notifier,
            settings,
            in_flight: InFlight::default(),
        }
    }

    /// Whether the send action is available for a record in `status`.
    pub const fn is_action_enabled(&self, status: CustomerStatus) -> bool {
        if status.is_terminal() {
            return false;
        }
        !(self.settings.block_cancelled && matches!(status, CustomerStatus::Cancelled))
    }

    /// Number the messages for `customer` go to.
    pub fn destination(&self, customer: &CustomerRecord) -> String {
        let phone = self
            .settings
            .test_phone
            .as_deref()
            .unwrap_or(&customer.phone);
        phone::normalize(phone, &self.settings.country_code)
    }

    /// Dispatch bodies for `customer`, in sending order.
    pub fn outbound_messages(&self, customer: &CustomerRecord) -> Vec<OutboundMessage> {
        let number = self.destination(customer);
        build_message(customer)
            .into_iter()
            .map(|text| OutboundMessage {
                bot_name: self.settings.bot_name.clone(),
                number: number.clone(),
                text_message: text,
            })
            .collect()
    }

    /// Message `customer` and mark the purchase refunded.
    ///
    /// The row action is gated on the roster's current entry for `customer`,
    /// so a stale snapshot of a record already refunded sends nothing. The
    /// snapshot's status is used only when the record is no longer displayed.
    /// On success the roster entry is updated in place. Failures are reported
    /// through the notifier and returned.
    ///
    /// # Errors
    ///
    /// Returns `OutreachError` if the session is not authenticated, a send for
    /// the same customer is running, a dispatch fails or the status update fails.
    #[instrument(skip_all, fields(id = %customer.id, code = %customer.code))]
    pub async fn send<R>(
        &self,
        session: &Session,
        roster: &Roster<R>,
        customer: &CustomerRecord,
    ) -> Result<SendOutcome, OutreachError> {
        if let Some(status) = self.disabled_status(roster, customer) {
            debug!(%status, "Row action disabled, nothing to send");
            return Ok(SendOutcome::Skipped(status));
        }
        if !session.is_authenticated() {
            return Err(OutreachError::NotAuthenticated);
        }

        let Some(_guard) = self.in_flight.try_acquire(&customer.id) else {
            warn!("Send already in progress for this customer");
            self.notifier.error(MSG_ALREADY_SENDING);
            return Err(OutreachError::InFlight(customer.id.clone()));
        };
        // A send that finished just before the guard was taken
        if let Some(status) = self.disabled_status(roster, customer) {
            debug!(%status, "Customer refunded meanwhile, nothing to send");
            return Ok(SendOutcome::Skipped(status));
        }

        self.notifier.loading(MSG_SENDING);
        let result = self.dispatch_and_mark_refunded(customer).await;
        self.notifier.dismiss();

        match result {
            Ok(messages) => {
                if !roster.mark_refunded(&customer.id) {
                    debug!("Customer no longer displayed, roster left as is");
                }
                self.notifier.success(MSG_SENT);
                info!(messages, "Customer messaged and marked refunded");
                Ok(SendOutcome::Sent { messages })
            }
            Err(e) => {
                error!(error = %e, "Outreach failed");
                self.notifier.error(MSG_SEND_FAILED);
                Err(e)
            }
        }
    }

    /// Current status of `customer` when its row action is disabled.
    fn disabled_status<R>(
        &self,
        roster: &Roster<R>,
        customer: &CustomerRecord,
    ) -> Option<CustomerStatus> {
        let status = roster
            .find(customer.id.as_str())
            .filter(|current| current.id == customer.id)
            .map_or(customer.status, |current| current.status);
        (!self.is_action_enabled(status)).then_some(status)
    }

    /// Dispatch every message, then update the remote status.
    async fn dispatch_and_mark_refunded(
        &self,
        customer: &CustomerRecord,
    ) -> Result<usize, OutreachError> {
        let messages = self.outbound_messages(customer);

        for (sent, message) in messages.iter().enumerate() {
            if sent > 0 {
                tokio::time::sleep(self.settings.message_delay).await;
            }
            self.api
                .send_message(message)
                .await
                .map_err(|source| OutreachError::DispatchFailed { sent, source })?;
            debug!(part = sent + 1, total = messages.len(), "Message part dispatched");
        }

        let update = StatusUpdate::for_customer(customer, CustomerStatus::Refunded);
        self.api
            .update_status(&update)
            .await
            .map_err(|source| OutreachError::StatusUpdateFailed {
                sent: messages.len(),
                source,
            })?;

        Ok(messages.len())
    }

    /// Web messaging link pre-filled with the composed message.
    ///
    /// Message parts are joined by a blank line.
    pub fn external_link(&self, customer: &CustomerRecord) -> String {
        let text = build_message(customer).join("\n\n");
        web_link(
            &self.settings.web_messaging_url,
            &self.destination(customer),
            &text,
        )
    }

    /// Open the pre-filled web messaging link. No API call, no status change.
    ///
    /// Returns the opened link.
    ///
    /// # Errors
    ///
    /// Returns `OutreachError::Browser` if the link cannot be opened.
    pub fn send_via_external_link(
        &self,
        customer: &CustomerRecord,
    ) -> Result<String, OutreachError> {
        let link = self.external_link(customer);
        open_in_browser(&link).inspect_err(|e| {
            error!(error = %e, "Could not open web messaging link");
            self.notifier.error(MSG_SEND_FAILED);
        })?;
        info!(id = %customer.id, "Opened web messaging link");
        Ok(link)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use refund_desk_core::StatusFilter;
    use secrecy::SecretString;

    use super::*;
    use crate::api::testing::{FakeApi, Reply, customer, discounted_customer};
    use crate::notify::{MemoryNotifier, Notification};

    fn settings() -> OutreachSettings {
        OutreachSettings {
            bot_name: "refund-bot".to_string(),
            test_phone: None,
            country_code: "55".to_string(),
            message_delay: Duration::ZERO,
            block_cancelled: false,
            web_messaging_url: Url::parse("https://wa.me").unwrap(),
        }
    }

    fn logged_in() -> Session {
        Session::with_token(SecretString::from("tok"))
    }

    struct Desk {
        api: FakeApi,
        notifier: Arc<MemoryNotifier>,
        roster: Roster<FakeApi>,
        outreach: Outreach<FakeApi>,
    }

    async fn desk(api: FakeApi, settings: OutreachSettings) -> Desk {
        let notifier = Arc::new(MemoryNotifier::new());
        let roster = Roster::new(api.clone(), notifier.clone());
        roster.fetch_all(&logged_in(), StatusFilter::All).await.unwrap();
        let outreach = Outreach::new(api.clone(), notifier.clone(), settings);
        Desk {
            api,
            notifier,
            roster,
            outreach,
        }
    }

    #[tokio::test]
    async fn test_send_marks_refunded_without_refetch() {
        let maria = customer("1", "Maria Silva", CustomerStatus::Pending);
        let d = desk(FakeApi::new().with_customers(vec![maria.clone()]), settings()).await;

        let outcome = d.outreach.send(&logged_in(), &d.roster, &maria).await.unwrap();

        assert_eq!(outcome, SendOutcome::Sent { messages: 1 });
        let sent = d.api.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text_message.contains("R$ 100,00"));
        assert!(sent[0].text_message.contains("1 cota "));
        assert_eq!(sent[0].number, "5511987654321");
        assert_eq!(sent[0].bot_name, "refund-bot");
        assert_eq!(
            d.api.updates(),
            vec![StatusUpdate::for_customer(&maria, CustomerStatus::Refunded)]
        );
        assert_eq!(d.api.calls().list, 1);
        assert_eq!(d.roster.find("1").unwrap().status, CustomerStatus::Refunded);
        assert_eq!(
            d.notifier.entries(),
            vec![
                Notification::Loading(MSG_SENDING.to_string()),
                Notification::Dismiss,
                Notification::Success(MSG_SENT.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_dispatch_network_error_skips_status_update() {
        let ana = customer("2", "Ana", CustomerStatus::Paid);
        let api = FakeApi::new()
            .with_customers(vec![ana.clone()])
            .with_dispatch(Reply::Network);
        let d = desk(api, settings()).await;

        let result = d.outreach.send(&logged_in(), &d.roster, &ana).await;

        assert!(matches!(result, Err(OutreachError::DispatchFailed { sent: 0, .. })));
        assert_eq!(d.api.calls().update, 0);
        assert_eq!(d.roster.find("2").unwrap().status, CustomerStatus::Paid);
        assert_eq!(d.notifier.errors(), vec![MSG_SEND_FAILED.to_string()]);
    }

    #[tokio::test]
    async fn test_second_dispatch_failure_skips_status_update() {
        let joao = discounted_customer("3", "João", CustomerStatus::Pending);
        let api = FakeApi::new()
            .with_customers(vec![joao.clone()])
            .fail_dispatch_at(2, Reply::Status(502));
        let d = desk(api, settings()).await;

        let result = d.outreach.send(&logged_in(), &d.roster, &joao).await;

        assert!(matches!(result, Err(OutreachError::DispatchFailed { sent: 1, .. })));
        assert_eq!(d.api.calls().dispatch, 2);
        assert_eq!(d.api.calls().update, 0);
        assert_eq!(d.roster.find("3").unwrap().status, CustomerStatus::Pending);
    }

    #[tokio::test]
    async fn test_status_update_failure_after_messages_sent() {
        let ana = customer("4", "Ana", CustomerStatus::Pending);
        let api = FakeApi::new()
            .with_customers(vec![ana.clone()])
            .with_update(Reply::Status(500));
        let d = desk(api, settings()).await;

        let result = d.outreach.send(&logged_in(), &d.roster, &ana).await;

        assert!(matches!(
            result,
            Err(OutreachError::StatusUpdateFailed { sent: 1, .. })
        ));
        assert_eq!(d.api.sent().len(), 1);
        assert_eq!(d.api.calls().update, 1);
        assert_eq!(d.roster.find("4").unwrap().status, CustomerStatus::Pending);
        assert_eq!(d.notifier.errors(), vec![MSG_SEND_FAILED.to_string()]);
    }

    #[tokio::test]
    async fn test_refunded_row_is_a_no_op() {
        let done = customer("5", "Ana", CustomerStatus::Refunded);
        let d = desk(FakeApi::new().with_customers(vec![done.clone()]), settings()).await;

        let outcome = d.outreach.send(&logged_in(), &d.roster, &done).await.unwrap();

        assert_eq!(outcome, SendOutcome::Skipped(CustomerStatus::Refunded));
        assert_eq!(d.api.calls().dispatch + d.api.calls().update, 0);
        assert!(d.notifier.entries().is_empty());
    }

    #[tokio::test]
    async fn test_stale_snapshot_is_not_sent_twice() {
        let maria = customer("12", "Maria", CustomerStatus::Pending);
        let d = desk(FakeApi::new().with_customers(vec![maria.clone()]), settings()).await;

        let first = d.outreach.send(&logged_in(), &d.roster, &maria).await.unwrap();
        let second = d.outreach.send(&logged_in(), &d.roster, &maria).await.unwrap();

        assert_eq!(first, SendOutcome::Sent { messages: 1 });
        assert_eq!(second, SendOutcome::Skipped(CustomerStatus::Refunded));
        assert_eq!(d.api.calls().dispatch, 1);
        assert_eq!(d.api.calls().update, 1);
    }

    #[tokio::test]
    async fn test_snapshot_status_used_when_not_displayed() {
        let gone = customer("13", "Ana", CustomerStatus::Refunded);
        let d = desk(FakeApi::new(), settings()).await;

        let outcome = d.outreach.send(&logged_in(), &d.roster, &gone).await.unwrap();

        assert_eq!(outcome, SendOutcome::Skipped(CustomerStatus::Refunded));
        assert_eq!(d.api.calls().dispatch, 0);
    }

    #[tokio::test]
    async fn test_cancelled_rows_follow_policy() {
        let cancelled = customer("6", "Ana", CustomerStatus::Cancelled);

        let blocking = OutreachSettings {
            block_cancelled: true,
            ..settings()
        };
        let d = desk(FakeApi::new().with_customers(vec![cancelled.clone()]), blocking).await;
        let outcome = d.outreach.send(&logged_in(), &d.roster, &cancelled).await.unwrap();
        assert_eq!(outcome, SendOutcome::Skipped(CustomerStatus::Cancelled));
        assert_eq!(d.api.calls().dispatch, 0);

        let d = desk(FakeApi::new().with_customers(vec![cancelled.clone()]), settings()).await;
        let outcome = d.outreach.send(&logged_in(), &d.roster, &cancelled).await.unwrap();
        assert_eq!(outcome, SendOutcome::Sent { messages: 1 });
        assert_eq!(d.roster.find("6").unwrap().status, CustomerStatus::Refunded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_messages_wait_between_sends() {
        let joao = discounted_customer("7", "João", CustomerStatus::Pending);
        let slow = OutreachSettings {
            message_delay: Duration::from_millis(5000),
            ..settings()
        };
        let d = desk(FakeApi::new().with_customers(vec![joao.clone()]), slow).await;

        let started = tokio::time::Instant::now();
        let outcome = d.outreach.send(&logged_in(), &d.roster, &joao).await.unwrap();

        assert_eq!(outcome, SendOutcome::Sent { messages: 2 });
        assert!(started.elapsed() >= Duration::from_millis(5000));
        assert_eq!(d.api.sent().len(), 2);
        assert_eq!(d.api.calls().update, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_send_for_same_customer_is_rejected() {
        let joao = discounted_customer("8", "João", CustomerStatus::Pending);
        let slow = OutreachSettings {
            message_delay: Duration::from_millis(5000),
            ..settings()
        };
        let d = desk(FakeApi::new().with_customers(vec![joao.clone()]), slow).await;
        let session = logged_in();

        let (first, second) = tokio::join!(
            d.outreach.send(&session, &d.roster, &joao),
            d.outreach.send(&session, &d.roster, &joao),
        );

        assert_eq!(first.unwrap(), SendOutcome::Sent { messages: 2 });
        assert!(matches!(second, Err(OutreachError::InFlight(_))));
        assert_eq!(d.api.sent().len(), 2);
        assert_eq!(d.api.calls().update, 1);
    }

    #[tokio::test]
    async fn test_send_requires_session() {
        let ana = customer("9", "Ana", CustomerStatus::Pending);
        let d = desk(FakeApi::new().with_customers(vec![ana.clone()]), settings()).await;

        let result = d.outreach.send(&Session::anonymous(), &d.roster, &ana).await;
        assert!(matches!(result, Err(OutreachError::NotAuthenticated)));
        assert_eq!(d.api.calls().dispatch, 0);
    }

    #[tokio::test]
    async fn test_test_phone_overrides_destination() {
        let ana = customer("10", "Ana", CustomerStatus::Pending);
        let testing = OutreachSettings {
            test_phone: Some("11 90000-0000".to_string()),
            ..settings()
        };
        let d = desk(FakeApi::new().with_customers(vec![ana.clone()]), testing).await;

        d.outreach.send(&logged_in(), &d.roster, &ana).await.unwrap();
        assert_eq!(d.api.sent()[0].number, "5511900000000");
    }

    #[tokio::test]
    async fn test_external_link_makes_no_calls() {
        let ana = customer("11", "ana", CustomerStatus::Pending);
        let d = desk(FakeApi::new().with_customers(vec![ana.clone()]), settings()).await;

        let link = d.outreach.external_link(&ana);

        assert!(link.starts_with("https://wa.me/5511987654321?text=Ol%C3%A1%2C%20Ana%21"));
        assert_eq!(d.api.calls().list, 1);
        assert_eq!(d.api.calls().dispatch + d.api.calls().update, 0);
        assert_eq!(d.roster.find("11").unwrap().status, CustomerStatus::Pending);
    }
}
