use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    cpe_api::errors::DepositFlowError,
    db_types::{GatewayOrderId, NewPaymentOrder, OrderStatus, PaymentOrder},
    traits::DepositGatewayDatabase,
};

/// The result of a reconciliation attempt. Every variant is an ordinary outcome; duplicated and
/// out-of-order confirmations are expected traffic, not failures.
#[derive(Debug, Clone)]
pub enum ReconciliationOutcome {
    /// This caller won the `Created -> Paid` transition and the member was credited.
    Applied(PaymentOrder),
    /// The order had already settled (paid by an earlier or concurrent confirmation, or failed).
    /// No writes were performed.
    AlreadyProcessed,
    /// No order with this gateway order id exists.
    OrderNotFound,
}

/// `DepositFlowApi` is the primary API for reconciling gateway payment confirmations against
/// deposit orders. Both confirmation channels (the client verification call and the gateway
/// webhook) converge on [`DepositFlowApi::reconcile_payment`].
pub struct DepositFlowApi<B> {
    db: B,
}

impl<B> Debug for DepositFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DepositFlowApi")
    }
}

impl<B> DepositFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> DepositFlowApi<B>
where B: DepositGatewayDatabase
{
    /// Records a new deposit order in `Created` state. Idempotent: resubmitting an existing
    /// gateway order id returns the stored record and `false`.
    pub async fn create_order(&self, order: NewPaymentOrder) -> Result<(PaymentOrder, bool), DepositFlowError> {
        let (order, inserted) = self.db.insert_order(order).await?;
        if inserted {
            debug!("🔄️📦️ Deposit order [{}] recorded for member {}", order.gateway_order_id, order.member_id);
        }
        Ok((order, inserted))
    }

    pub async fn fetch_order(&self, id: &GatewayOrderId) -> Result<Option<PaymentOrder>, DepositFlowError> {
        let order = self.db.fetch_order_by_gateway_id(id).await?;
        Ok(order)
    }

    /// Applies a verified payment confirmation to the order, exactly once.
    ///
    /// The caller must have verified the gateway signature already; this method trusts its
    /// inputs. Whichever of any number of concurrent callers wins the guarded status transition
    /// is the only one that credits the member; everyone else observes `AlreadyProcessed`.
    pub async fn reconcile_payment(
        &self,
        order_id: &GatewayOrderId,
        gateway_payment_id: &str,
        gateway_signature: &str,
    ) -> Result<ReconciliationOutcome, DepositFlowError> {
        let Some(order) = self.db.fetch_order_by_gateway_id(order_id).await? else {
            debug!("🔄️💰️ Confirmation for unknown order {order_id}");
            return Ok(ReconciliationOutcome::OrderNotFound);
        };
        if order.status == OrderStatus::Paid {
            debug!("🔄️💰️ Order {order_id} is already paid. Nothing to do.");
            return Ok(ReconciliationOutcome::AlreadyProcessed);
        }
        let paid =
            self.db.transition_to_paid(order_id, gateway_payment_id, gateway_signature, Utc::now()).await?;
        let Some(paid_order) = paid else {
            // Lost the race, or the order had settled between the fetch and the transition.
            debug!("🔄️💰️ Order {order_id} was settled by a concurrent confirmation.");
            return Ok(ReconciliationOutcome::AlreadyProcessed);
        };
        info!(
            "🔄️💰️ Order {order_id} marked paid with payment {gateway_payment_id}. Crediting member {} with {}",
            paid_order.member_id, paid_order.amount
        );
        if let Err(e) = self.db.credit_deposit(&paid_order).await {
            error!(
                target: "cpe::ledger_gap",
                "💸️ LEDGER GAP: order {order_id} is marked paid but member {} was not credited with {}. {e}",
                paid_order.member_id, paid_order.amount
            );
            return Err(DepositFlowError::LedgerGap { order_id: order_id.clone(), reason: e.to_string() });
        }
        Ok(ReconciliationOutcome::Applied(paid_order))
    }

    /// Marks an order's payment attempt as failed. Uses the same guarded transition primitive as
    /// the paid path, so a `Paid` order never regresses. Returns the updated order, or `None` if
    /// the order had already settled.
    pub async fn mark_payment_failed(
        &self,
        order_id: &GatewayOrderId,
    ) -> Result<Option<PaymentOrder>, DepositFlowError> {
        let result = self.db.mark_order_failed(order_id).await?;
        match &result {
            Some(order) => info!("🔄️❌️ Order {} marked as failed", order.gateway_order_id),
            None => debug!("🔄️❌️ Order {order_id} had already settled; failure ignored."),
        }
        Ok(result)
    }

    /// Repairs ledger gaps: credits every `Paid` order that has no matching deposit entry.
    ///
    /// The deposit check is re-run per order immediately before crediting to skip orders a live
    /// handler has settled in the meantime. That check alone does not close the race; the
    /// storage-level one-entry-per-order guarantee of
    /// [`DepositGatewayDatabase::credit_deposit`] is what makes a losing credit a no-op, so the
    /// sweep is safe to run concurrently with live traffic and to re-run after a partial failure.
    pub async fn reconcile_missed_credits(&self) -> Result<Vec<GatewayOrderId>, DepositFlowError> {
        let gaps = self.db.fetch_unreconciled_orders().await?;
        let mut repaired = Vec::with_capacity(gaps.len());
        for order in gaps {
            if self.db.deposit_recorded(&order.gateway_order_id).await? {
                continue;
            }
            match self.db.credit_deposit(&order).await {
                Ok(()) => {
                    warn!(
                        target: "cpe::ledger_gap",
                        "🧹️ Repaired ledger gap for order {}: credited member {} with {}",
                        order.gateway_order_id, order.member_id, order.amount
                    );
                    repaired.push(order.gateway_order_id);
                },
                Err(e) => {
                    error!(
                        target: "cpe::ledger_gap",
                        "🧹️ Could not repair ledger gap for order {}. {e}",
                        order.gateway_order_id
                    );
                },
            }
        }
        Ok(repaired)
    }
}
