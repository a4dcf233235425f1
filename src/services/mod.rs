//! Business services.
//!
//! Each service owns a handle to the pool. Every write touching more than one
//! row runs inside a single transaction.

// Identity and catalogue
pub mod customers;
pub mod products;
pub mod profiles;

// Order flow
pub mod customizations;
pub mod fulfillment;
pub mod inventory;
pub mod orders;
pub mod shipments;

// Financial services
pub mod invoicing;
pub mod payments;

// Reporting
pub mod analytics;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ColumnTrait, DbErr, EntityTrait, QueryFilter, Select};
use tracing::error;
use uuid::Uuid;

use crate::{auth::DataScope, errors::ServiceError};

/// Four uppercase hex characters
pub(crate) fn short_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..4].to_uppercase()
}

/// `{prefix}-{epoch millis}-{XXXX}`, used for orders and shipments
pub fn timestamped_number(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}-{}-{}", at.timestamp_millis(), short_suffix())
}

/// `{prefix}-{yyyymmdd}-{XXXX}`, used for invoices
pub fn dated_number(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}-{}-{}", date.format("%Y%m%d"), short_suffix())
}

/// Logs a database failure with context before handing it to the caller.
pub(crate) fn db_err(context: &'static str) -> impl Fn(DbErr) -> ServiceError {
    move |e| {
        error!(error = %e, "{}", context);
        ServiceError::DatabaseError(e)
    }
}

/// Restricts `select` to the rows a caller may list.
///
/// Returns `None` when nothing is visible, i.e. a client without a linked
/// customer account.
pub(crate) fn scoped<E, C>(select: Select<E>, scope: DataScope, customer_column: C) -> Option<Select<E>>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    match scope {
        DataScope::Everything => Some(select),
        DataScope::Customer(Some(customer_id)) => {
            Some(select.filter(customer_column.eq(customer_id)))
        }
        DataScope::Customer(None) => None,
    }
}

/// Whether a row owned by `customer_id` is visible under `scope`.
pub(crate) fn visible_to(scope: DataScope, customer_id: Uuid) -> bool {
    match scope {
        DataScope::Everything => true,
        DataScope::Customer(linked) => linked == Some(customer_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamped_numbers_carry_millis_and_suffix() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let number = timestamped_number("ORD", at);
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1], at.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn dated_numbers_use_compact_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert!(dated_number("INV", date).starts_with("INV-20240105-"));
    }

    #[test]
    fn visibility_follows_scope() {
        let customer = Uuid::new_v4();
        assert!(visible_to(DataScope::Everything, customer));
        assert!(visible_to(DataScope::Customer(Some(customer)), customer));
        assert!(!visible_to(DataScope::Customer(Some(Uuid::new_v4())), customer));
        assert!(!visible_to(DataScope::Customer(None), customer));
    }
}
