use thiserror::Error;

use crate::{db_types::GatewayOrderId, traits::DepositGatewayError};

#[derive(Debug, Clone, Error)]
pub enum DepositFlowError {
    #[error("{0}")]
    DatabaseError(#[from] DepositGatewayError),
    /// The one true reconciliation gap: the order is marked `Paid` but the member credit failed.
    /// No request-scoped retry can repair this; the reconciliation sweep picks it up.
    #[error("Order {order_id} is marked paid but the member was not credited: {reason}")]
    LedgerGap { order_id: GatewayOrderId, reason: String },
}
