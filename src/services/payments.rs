use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    db::DbPool,
    entities::{invoice, payment},
    errors::ServiceError,
    lifecycle::{view_raw, PaymentStatus, StatusView},
};

use super::db_err;

fn validate_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        let mut err = ValidationError::new("non_positive_amount");
        err.message = Some("Payment amount must be greater than zero".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RecordPaymentRequest {
    pub invoice_id: Uuid,
    #[validate(custom = "validate_amount")]
    #[schema(value_type = String)]
    pub amount: Decimal,
    #[validate(length(min = 1, message = "Payment method is required"))]
    pub payment_method: String,
    /// Defaults to completed
    pub payment_status: Option<PaymentStatus>,
    pub transaction_id: Option<String>,
    /// Defaults to now
    pub payment_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentRow {
    #[schema(value_type = Object)]
    pub payment: payment::Model,
    pub status: StatusView,
    pub invoice_number: Option<String>,
}

/// Append-only payment records
#[derive(Clone)]
pub struct PaymentService {
    db_pool: Arc<DbPool>,
}

impl PaymentService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(invoice_id = %request.invoice_id))]
    pub async fn record_payment(
        &self,
        request: RecordPaymentRequest,
        recorded_by: Uuid,
    ) -> Result<payment::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        invoice::Entity::find_by_id(request.invoice_id)
            .one(db)
            .await
            .map_err(db_err("Failed to load invoice for payment"))?
            .ok_or_else(|| ServiceError::not_found("Invoice", request.invoice_id))?;

        let now = Utc::now();
        let status = request.payment_status.unwrap_or(PaymentStatus::Completed);
        let payment = payment::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(request.invoice_id),
            amount: Set(request.amount.round_dp(2)),
            payment_method: Set(request.payment_method.trim().to_string()),
            payment_status: Set(status.to_string()),
            transaction_id: Set(request.transaction_id.filter(|t| !t.trim().is_empty())),
            payment_date: Set(request.payment_date.unwrap_or(now)),
            notes: Set(request.notes.filter(|n| !n.trim().is_empty())),
            recorded_by: Set(Some(recorded_by)),
            created_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(db_err("Failed to insert payment"))?;

        counter!("oms.payments.recorded", 1, "status" => status.to_string());
        info!(payment_id = %payment.id, amount = %payment.amount, "payment recorded");
        Ok(payment)
    }

    /// Payments newest first, optionally capped.
    #[instrument(skip(self))]
    pub async fn list(&self, limit: Option<u64>) -> Result<Vec<PaymentRow>, ServiceError> {
        let rows = payment::Entity::find()
            .find_also_related(invoice::Entity)
            .order_by_desc(payment::Column::CreatedAt)
            .limit(limit)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to list payments"))?;

        Ok(rows
            .into_iter()
            .map(|(payment, invoice)| PaymentRow {
                status: view_raw::<PaymentStatus>(&payment.payment_status),
                invoice_number: invoice.map(|i| i.invoice_number),
                payment,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amount_must_be_positive() {
        assert!(validate_amount(&dec!(0.01)).is_ok());
        assert!(validate_amount(&dec!(0)).is_err());
        assert!(validate_amount(&dec!(-3)).is_err());
    }
}
