use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{GatewayOrderId, LedgerEntry, PaymentOrder},
    traits::DepositGatewayError,
};

/// Appends the deposit ledger entry for a paid order.
///
/// The unique index on `order_ref` refuses a second entry for the same order. Callers inspect the
/// raw error so a unique violation can be handled as "already recorded" rather than a failure.
pub(crate) async fn insert_deposit(
    order: &PaymentOrder,
    conn: &mut SqliteConnection,
) -> Result<LedgerEntry, sqlx::Error> {
    let description = format!("Deposit via payment gateway ({})", order.gateway_order_id);
    let entry: LedgerEntry = sqlx::query_as(
        r#"
            INSERT INTO ledger_entries (member_id, entry_type, amount, description, order_ref)
            VALUES ($1, 'Deposit', $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(order.member_id.as_str())
    .bind(order.amount)
    .bind(description)
    .bind(order.gateway_order_id.as_str())
    .fetch_one(conn)
    .await?;
    trace!("📒️ Ledger entry {} recorded for order {}", entry.id, order.gateway_order_id);
    Ok(entry)
}

/// Whether a deposit entry already exists for the given gateway order id.
pub async fn deposit_recorded(
    id: &GatewayOrderId,
    conn: &mut SqliteConnection,
) -> Result<bool, DepositGatewayError> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM ledger_entries WHERE order_ref = $1 AND entry_type = 'Deposit'",
    )
    .bind(id.as_str())
    .fetch_one(conn)
    .await?;
    Ok(count > 0)
}

/// Paid orders with no matching deposit entry: the reconciliation gaps.
pub async fn fetch_unreconciled_orders(
    conn: &mut SqliteConnection,
) -> Result<Vec<PaymentOrder>, DepositGatewayError> {
    let orders = sqlx::query_as(
        r#"
            SELECT * FROM payment_orders
            WHERE status = 'Paid'
              AND gateway_order_id NOT IN (
                SELECT order_ref FROM ledger_entries
                WHERE order_ref IS NOT NULL AND entry_type = 'Deposit'
              )
            ORDER BY paid_at ASC
        "#,
    )
    .fetch_all(conn)
    .await?;
    Ok(orders)
}
