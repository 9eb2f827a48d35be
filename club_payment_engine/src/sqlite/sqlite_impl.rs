//! `SqliteDatabase` is the concrete SQLite backend for the deposit reconciliation engine.
//!
//! It implements [`DepositGatewayDatabase`] on top of the statement modules in [`super::db`].
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use cpg_common::Paise;
use log::debug;
use sqlx::SqlitePool;

use super::db::{ledger, members, new_pool, orders};
use crate::{
    db_types::{GatewayOrderId, Member, NewPaymentOrder, PaymentOrder},
    traits::{DepositGatewayDatabase, DepositGatewayError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database instance, creating the database file and bringing the schema up to
    /// date if necessary.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, DepositGatewayError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }
}

impl DepositGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewPaymentOrder) -> Result<(PaymentOrder, bool), DepositGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::idempotent_insert(order, &mut conn).await
    }

    async fn fetch_order_by_gateway_id(
        &self,
        id: &GatewayOrderId,
    ) -> Result<Option<PaymentOrder>, DepositGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_gateway_id(id, &mut conn).await?;
        Ok(order)
    }

    async fn transition_to_paid(
        &self,
        id: &GatewayOrderId,
        gateway_payment_id: &str,
        gateway_signature: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<PaymentOrder>, DepositGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::mark_paid(id, gateway_payment_id, gateway_signature, paid_at, &mut conn).await
    }

    async fn mark_order_failed(&self, id: &GatewayOrderId) -> Result<Option<PaymentOrder>, DepositGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::mark_failed(id, &mut conn).await
    }

    /// The balance increment and the ledger append commit or roll back together. The order status
    /// transition is deliberately *not* part of this transaction; it happens strictly before, and
    /// the pair (`status = Paid`, no deposit entry) is what the reconciliation sweep keys on if
    /// this call never completes.
    ///
    /// The ledger insert goes first. The unique index on `order_ref` rejects a second entry for
    /// the same order, so when the reconciliation sweep and a live handler race to credit the
    /// same order, the loser's transaction rolls back and the call is a no-op.
    async fn credit_deposit(&self, order: &PaymentOrder) -> Result<(), DepositGatewayError> {
        let mut tx = self.pool.begin().await?;
        match ledger::insert_deposit(order, &mut *tx).await {
            Ok(_) => {},
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                debug!("📒️ Deposit for order {} was already recorded. Skipping.", order.gateway_order_id);
                tx.rollback().await?;
                return Ok(());
            },
            Err(e) => return Err(e.into()),
        }
        members::adjust_balance(&order.member_id, order.amount, &mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn deposit_recorded(&self, id: &GatewayOrderId) -> Result<bool, DepositGatewayError> {
        let mut conn = self.pool.acquire().await?;
        ledger::deposit_recorded(id, &mut conn).await
    }

    async fn fetch_unreconciled_orders(&self) -> Result<Vec<PaymentOrder>, DepositGatewayError> {
        let mut conn = self.pool.acquire().await?;
        ledger::fetch_unreconciled_orders(&mut conn).await
    }

    async fn fetch_member(&self, member_id: &str) -> Result<Option<Member>, DepositGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let member = members::fetch_member(member_id, &mut conn).await?;
        Ok(member)
    }

    async fn upsert_member(&self, member_id: &str, name: &str, balance: Paise) -> Result<(), DepositGatewayError> {
        let mut conn = self.pool.acquire().await?;
        members::upsert_member(member_id, name, balance, &mut conn).await
    }

    async fn close(&mut self) -> Result<(), DepositGatewayError> {
        self.pool.close().await;
        Ok(())
    }
}
