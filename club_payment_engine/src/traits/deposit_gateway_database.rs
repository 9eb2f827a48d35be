use chrono::{DateTime, Utc};
use cpg_common::Paise;
use thiserror::Error;

use crate::db_types::{GatewayOrderId, Member, NewPaymentOrder, PaymentOrder};

/// The storage contract for backends supporting the deposit reconciliation engine.
///
/// The shared mutable state in this subsystem is the payment order row and the member balance
/// row, and both are only ever mutated through the operations defined here. The linchpin is
/// [`DepositGatewayDatabase::transition_to_paid`]: a single atomic compare-and-set on the order
/// status. Everything else in the reconciliation flow keys off whether that one write applied.
#[allow(async_fn_in_trait)]
pub trait DepositGatewayDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a new payment order in `Created` state. This call is idempotent: if an order with
    /// the same gateway order id already exists, the existing record is returned and the second
    /// element is `false`.
    async fn insert_order(&self, order: NewPaymentOrder) -> Result<(PaymentOrder, bool), DepositGatewayError>;

    /// Fetches the order with the given gateway order id, if it exists.
    async fn fetch_order_by_gateway_id(
        &self,
        id: &GatewayOrderId,
    ) -> Result<Option<PaymentOrder>, DepositGatewayError>;

    /// The guarded `Created -> Paid` transition.
    ///
    /// This must be implemented as one conditional write (`UPDATE ... WHERE gateway_order_id = ?
    /// AND status = 'Created'`), never as a read-then-write pair, so that of any number of racing
    /// callers exactly one observes the transition applying.
    ///
    /// Returns the updated order if the transition applied, or `None` if the order was no longer
    /// in `Created` state. `None` is an ordinary outcome, not an error.
    async fn transition_to_paid(
        &self,
        id: &GatewayOrderId,
        gateway_payment_id: &str,
        gateway_signature: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<PaymentOrder>, DepositGatewayError>;

    /// The guarded `Created -> Failed` transition. Same conditional-write semantics as
    /// [`DepositGatewayDatabase::transition_to_paid`]; a `Paid` order never regresses.
    async fn mark_order_failed(&self, id: &GatewayOrderId) -> Result<Option<PaymentOrder>, DepositGatewayError>;

    /// Credits the order's member with the order amount and appends the matching deposit ledger
    /// entry, in one storage transaction.
    ///
    /// Called by a caller that has just observed `transition_to_paid` apply for this order, or by
    /// the reconciliation sweep. The two can race: implementations must enforce at most one
    /// deposit entry per order at the storage level and treat a duplicate credit as a successful
    /// no-op, never as a second balance increment.
    async fn credit_deposit(&self, order: &PaymentOrder) -> Result<(), DepositGatewayError>;

    /// Whether a deposit ledger entry already exists for the given order. This is the resumption
    /// test for a credit that may have been interrupted after the status transition.
    async fn deposit_recorded(&self, id: &GatewayOrderId) -> Result<bool, DepositGatewayError>;

    /// All orders that are `Paid` but have no matching deposit ledger entry. These are the
    /// reconciliation gaps the sweep repairs.
    async fn fetch_unreconciled_orders(&self) -> Result<Vec<PaymentOrder>, DepositGatewayError>;

    /// Fetches a member record.
    async fn fetch_member(&self, member_id: &str) -> Result<Option<Member>, DepositGatewayError>;

    /// Creates a member record if it does not exist yet. Member CRUD proper lives outside this
    /// subsystem; this exists so deposits can be exercised against a known member.
    async fn upsert_member(&self, member_id: &str, name: &str, balance: Paise) -> Result<(), DepositGatewayError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), DepositGatewayError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum DepositGatewayError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Member {0} does not exist")]
    MemberNotFound(String),
    #[error("Deposit amount must be positive, got {0}")]
    NonPositiveAmount(Paise),
}

impl From<sqlx::Error> for DepositGatewayError {
    fn from(e: sqlx::Error) -> Self {
        DepositGatewayError::DatabaseError(e.to_string())
    }
}
