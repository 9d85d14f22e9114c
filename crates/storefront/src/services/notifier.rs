//! Order notification dispatch.
//!
//! Two independent triggers can ask for order emails on the same payment:
//! the browser fires a send-order-email request right after confirming, and
//! the provider webhook arrives asynchronously for the same intent. The
//! notifier is the single funnel for both. Before sending anything it
//! claims the payment intent id against a durable ledger; the second
//! trigger finds the claim taken and sends nothing.
//!
//! The mailer seam below the notifier has no deduplication of its own:
//! calling it twice sends twice. Idempotency lives here only.

use std::future::Future;

use czarcar_core::order::OrderEmailData;

use crate::db::RepositoryError;
use crate::services::email::EmailError;

/// Transport seam for the two order emails.
pub trait OrderMailer: Send + Sync {
    /// Send the customer confirmation.
    fn send_order_confirmation(
        &self,
        order: &OrderEmailData,
    ) -> impl Future<Output = Result<(), EmailError>> + Send;

    /// Send the owner alert.
    fn send_owner_alert(
        &self,
        order: &OrderEmailData,
    ) -> impl Future<Output = Result<(), EmailError>> + Send;
}

/// Durable "already notified" record, keyed by payment intent id.
pub trait NotificationLedger: Send + Sync {
    /// Claim an intent for dispatch. `Ok(false)` means an earlier trigger
    /// already claimed it.
    fn try_claim(
        &self,
        payment_intent_id: &str,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

/// Result of a notification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// An earlier trigger already dispatched this order's emails.
    AlreadyNotified,
    /// Sends were attempted; per-send outcome recorded.
    Sent { customer_sent: bool, owner_sent: bool },
}

impl NotifyOutcome {
    /// Whether the customer can be considered notified.
    ///
    /// The operation's overall success gates on the customer confirmation;
    /// an owner-alert failure is logged but does not fail the order.
    #[must_use]
    pub const fn customer_notified(&self) -> bool {
        matches!(
            self,
            Self::AlreadyNotified
                | Self::Sent {
                    customer_sent: true,
                    ..
                }
        )
    }
}

/// Dispatches order notifications at most once per payment intent.
#[derive(Clone)]
pub struct OrderNotifier<M, L> {
    mailer: M,
    ledger: L,
}

impl<M: OrderMailer, L: NotificationLedger> OrderNotifier<M, L> {
    /// Create a new notifier.
    pub const fn new(mailer: M, ledger: L) -> Self {
        Self { mailer, ledger }
    }

    /// Send the customer confirmation and owner alert for an order.
    ///
    /// Each send failure is logged and reflected in the outcome; nothing is
    /// retried. If the ledger itself is unavailable the sends proceed
    /// anyway: there is no retry path, so a suppressed send would be lost
    /// for good, while a duplicate merely repeats an email.
    pub async fn notify(&self, order: &OrderEmailData) -> NotifyOutcome {
        if !order.payment_intent_id.is_empty() {
            match self.ledger.try_claim(&order.payment_intent_id).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::info!(
                        payment_intent_id = %order.payment_intent_id,
                        order_number = %order.order_number,
                        "Order notifications already dispatched, skipping"
                    );
                    return NotifyOutcome::AlreadyNotified;
                }
                Err(e) => {
                    tracing::warn!(
                        payment_intent_id = %order.payment_intent_id,
                        error = %e,
                        "Notification ledger unavailable, sending without dedup"
                    );
                }
            }
        }

        let customer_sent = match self.mailer.send_order_confirmation(order).await {
            Ok(()) => {
                tracing::info!(
                    order_number = %order.order_number,
                    customer_email = %order.customer_email,
                    "Order confirmation email sent"
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    order_number = %order.order_number,
                    error = %e,
                    "Failed to send order confirmation email"
                );
                false
            }
        };

        let owner_sent = match self.mailer.send_owner_alert(order).await {
            Ok(()) => {
                tracing::info!(
                    order_number = %order.order_number,
                    "Owner alert email sent"
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    order_number = %order.order_number,
                    error = %e,
                    "Failed to send owner alert email"
                );
                false
            }
        };

        NotifyOutcome::Sent {
            customer_sent,
            owner_sent,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct RecordingMailer {
        confirmations: AtomicUsize,
        alerts: AtomicUsize,
        fail_confirmation: bool,
        fail_alert: bool,
    }

    impl RecordingMailer {
        fn confirmations(&self) -> usize {
            self.confirmations.load(Ordering::SeqCst)
        }

        fn alerts(&self) -> usize {
            self.alerts.load(Ordering::SeqCst)
        }
    }

    impl OrderMailer for &RecordingMailer {
        async fn send_order_confirmation(&self, _order: &OrderEmailData) -> Result<(), EmailError> {
            self.confirmations.fetch_add(1, Ordering::SeqCst);
            if self.fail_confirmation {
                return Err(EmailError::InvalidAddress("rejected".to_string()));
            }
            Ok(())
        }

        async fn send_owner_alert(&self, _order: &OrderEmailData) -> Result<(), EmailError> {
            self.alerts.fetch_add(1, Ordering::SeqCst);
            if self.fail_alert {
                return Err(EmailError::InvalidAddress("rejected".to_string()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryLedger {
        claimed: Mutex<HashSet<String>>,
    }

    impl NotificationLedger for &MemoryLedger {
        async fn try_claim(&self, payment_intent_id: &str) -> Result<bool, RepositoryError> {
            Ok(self
                .claimed
                .lock()
                .unwrap()
                .insert(payment_intent_id.to_string()))
        }
    }

    struct FailingLedger;

    impl NotificationLedger for FailingLedger {
        async fn try_claim(&self, _payment_intent_id: &str) -> Result<bool, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    fn order(intent_id: &str) -> OrderEmailData {
        OrderEmailData {
            customer_email: "customer@example.com".to_string(),
            customer_name: "John Smith".to_string(),
            order_number: "CZ-123456".to_string(),
            payment_intent_id: intent_id.to_string(),
            ..OrderEmailData::default()
        }
    }

    #[tokio::test]
    async fn test_first_notify_sends_both_emails() {
        let mailer = RecordingMailer::default();
        let ledger = MemoryLedger::default();
        let notifier = OrderNotifier::new(&mailer, &ledger);

        let outcome = notifier.notify(&order("pi_1")).await;

        assert_eq!(
            outcome,
            NotifyOutcome::Sent {
                customer_sent: true,
                owner_sent: true
            }
        );
        assert_eq!(mailer.confirmations(), 1);
        assert_eq!(mailer.alerts(), 1);
    }

    #[tokio::test]
    async fn test_second_notify_for_same_intent_is_skipped() {
        let mailer = RecordingMailer::default();
        let ledger = MemoryLedger::default();
        let notifier = OrderNotifier::new(&mailer, &ledger);

        let first = notifier.notify(&order("pi_1")).await;
        let second = notifier.notify(&order("pi_1")).await;

        assert!(matches!(first, NotifyOutcome::Sent { .. }));
        assert_eq!(second, NotifyOutcome::AlreadyNotified);
        assert!(second.customer_notified());

        // One customer email and one owner email total, despite two triggers.
        assert_eq!(mailer.confirmations(), 1);
        assert_eq!(mailer.alerts(), 1);
    }

    #[tokio::test]
    async fn test_distinct_intents_notify_independently() {
        let mailer = RecordingMailer::default();
        let ledger = MemoryLedger::default();
        let notifier = OrderNotifier::new(&mailer, &ledger);

        notifier.notify(&order("pi_1")).await;
        notifier.notify(&order("pi_2")).await;

        assert_eq!(mailer.confirmations(), 2);
        assert_eq!(mailer.alerts(), 2);
    }

    #[tokio::test]
    async fn test_raw_mailer_has_no_dedup() {
        // The transport seam sends every time it is invoked; idempotency is
        // the notifier's job alone.
        let mailer = RecordingMailer::default();
        let data = order("pi_1");

        (&mailer).send_order_confirmation(&data).await.unwrap();
        (&mailer).send_owner_alert(&data).await.unwrap();
        (&mailer).send_order_confirmation(&data).await.unwrap();
        (&mailer).send_owner_alert(&data).await.unwrap();

        assert_eq!(mailer.confirmations(), 2);
        assert_eq!(mailer.alerts(), 2);
    }

    #[tokio::test]
    async fn test_owner_failure_still_counts_customer_notified() {
        let mailer = RecordingMailer {
            fail_alert: true,
            ..RecordingMailer::default()
        };
        let ledger = MemoryLedger::default();
        let notifier = OrderNotifier::new(&mailer, &ledger);

        let outcome = notifier.notify(&order("pi_1")).await;

        assert_eq!(
            outcome,
            NotifyOutcome::Sent {
                customer_sent: true,
                owner_sent: false
            }
        );
        assert!(outcome.customer_notified());
    }

    #[tokio::test]
    async fn test_customer_failure_fails_outcome() {
        let mailer = RecordingMailer {
            fail_confirmation: true,
            ..RecordingMailer::default()
        };
        let ledger = MemoryLedger::default();
        let notifier = OrderNotifier::new(&mailer, &ledger);

        let outcome = notifier.notify(&order("pi_1")).await;

        assert!(!outcome.customer_notified());
        // The owner alert is still attempted independently.
        assert_eq!(mailer.alerts(), 1);
    }

    #[tokio::test]
    async fn test_ledger_failure_proceeds_with_sends() {
        let mailer = RecordingMailer::default();
        let notifier = OrderNotifier::new(&mailer, FailingLedger);

        let outcome = notifier.notify(&order("pi_1")).await;

        assert!(matches!(outcome, NotifyOutcome::Sent { .. }));
        assert_eq!(mailer.confirmations(), 1);
        assert_eq!(mailer.alerts(), 1);
    }

    #[tokio::test]
    async fn test_missing_intent_id_skips_ledger() {
        let mailer = RecordingMailer::default();
        let notifier = OrderNotifier::new(&mailer, FailingLedger);

        // No intent id means no claim key; the failing ledger is never hit.
        let outcome = notifier.notify(&order("")).await;

        assert_eq!(
            outcome,
            NotifyOutcome::Sent {
                customer_sent: true,
                owner_sent: true
            }
        );
    }
}
