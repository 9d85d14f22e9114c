//! Order notification ledger.
//!
//! One row per payment intent that has had its order emails dispatched.
//! Claiming is a single `INSERT .. ON CONFLICT DO NOTHING`, so two
//! concurrent triggers for the same intent (the client's send-order-email
//! call and the provider webhook) race on the primary key and exactly one
//! wins.

use sqlx::PgPool;

use super::RepositoryError;
use crate::services::notifier::NotificationLedger;

/// Repository for the durable "already notified" record.
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Claim a payment intent for notification dispatch.
    ///
    /// Returns `true` if this caller made the claim, `false` if the intent
    /// was already claimed by an earlier trigger.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn try_claim(&self, payment_intent_id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO order_notifications (payment_intent_id) \
             VALUES ($1) \
             ON CONFLICT (payment_intent_id) DO NOTHING",
        )
        .bind(payment_intent_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl NotificationLedger for NotificationRepository {
    async fn try_claim(&self, payment_intent_id: &str) -> Result<bool, RepositoryError> {
        Self::try_claim(self, payment_intent_id).await
    }
}
