use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{GatewayOrderId, NewPaymentOrder, PaymentOrder},
    traits::DepositGatewayError,
};

/// Inserts the order into the database, returning `false` in the second element if an order with
/// the same gateway order id already exists.
pub async fn idempotent_insert(
    order: NewPaymentOrder,
    conn: &mut SqliteConnection,
) -> Result<(PaymentOrder, bool), DepositGatewayError> {
    let inserted = match fetch_order_by_gateway_id(&order.gateway_order_id, conn).await? {
        Some(order) => (order, false),
        None => {
            let order = insert_order(order, conn).await?;
            debug!("📝️ Order [{}] inserted with id {}", order.gateway_order_id, order.id);
            (order, true)
        },
    };
    Ok(inserted)
}

async fn insert_order(
    order: NewPaymentOrder,
    conn: &mut SqliteConnection,
) -> Result<PaymentOrder, DepositGatewayError> {
    if !order.amount.is_positive() {
        return Err(DepositGatewayError::NonPositiveAmount(order.amount));
    }
    let order = sqlx::query_as(
        r#"
            INSERT INTO payment_orders (gateway_order_id, member_id, amount)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(order.gateway_order_id)
    .bind(order.member_id)
    .bind(order.amount)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub async fn fetch_order_by_gateway_id(
    id: &GatewayOrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentOrder>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM payment_orders WHERE gateway_order_id = $1")
        .bind(id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// The guarded `Created -> Paid` compare-and-set.
///
/// The `status = 'Created'` predicate is the entire concurrency story: two racing callers both
/// execute this statement, and the row is returned to exactly one of them. `None` means the order
/// had already left `Created` state.
pub(crate) async fn mark_paid(
    id: &GatewayOrderId,
    gateway_payment_id: &str,
    gateway_signature: &str,
    paid_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentOrder>, DepositGatewayError> {
    let result: Option<PaymentOrder> = sqlx::query_as(
        r#"
            UPDATE payment_orders
            SET status = 'Paid',
                gateway_payment_id = $2,
                gateway_signature = $3,
                paid_at = $4,
                updated_at = CURRENT_TIMESTAMP
            WHERE gateway_order_id = $1 AND status = 'Created'
            RETURNING *;
        "#,
    )
    .bind(id.as_str())
    .bind(gateway_payment_id)
    .bind(gateway_signature)
    .bind(paid_at)
    .fetch_optional(conn)
    .await?;
    Ok(result)
}

/// The guarded `Created -> Failed` compare-and-set. A settled order is never touched.
pub(crate) async fn mark_failed(
    id: &GatewayOrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentOrder>, DepositGatewayError> {
    let result: Option<PaymentOrder> = sqlx::query_as(
        r#"
            UPDATE payment_orders
            SET status = 'Failed', updated_at = CURRENT_TIMESTAMP
            WHERE gateway_order_id = $1 AND status = 'Created'
            RETURNING *;
        "#,
    )
    .bind(id.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(result)
}
