use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The event type the webhook path acts on. Every other event is acknowledged and ignored.
pub const PAYMENT_CAPTURED_EVENT: &str = "payment.captured";

/// The header the gateway puts its webhook signature in.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "X-Razorpay-Signature";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

//-------------------------------------- Webhook acknowledgement -------------------------------------------------------
/// The always-2xx webhook acknowledgement. The status field tells the gateway (and our logs) what
/// happened; none of these are errors, so none of them trigger gateway retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookStatus {
    /// An event this handler does not act on.
    Ignored,
    /// The order id in the event does not exist here. Possibly another integration's order.
    OrderNotFound,
    /// The order had already been reconciled. The idempotence contract, not a failure.
    AlreadyProcessed,
    /// The order transitioned to paid and the member was credited.
    Processed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub status: WebhookStatus,
}

impl WebhookAck {
    pub fn new(status: WebhookStatus) -> Self {
        Self { status }
    }
}

//-------------------------------------- Webhook event envelope --------------------------------------------------------
/// The gateway's webhook event envelope, to the depth this subsystem reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub payload: WebhookPayload,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub payment: Option<WebhookPayment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayment {
    pub entity: PaymentEntity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEntity {
    /// The gateway order id the payment settled against.
    pub order_id: String,
    /// The gateway payment id.
    pub id: String,
}

//-------------------------------------- Client verification request ---------------------------------------------------
/// The checkout widget's success callback parameters, forwarded verbatim by the browser. The
/// field names are the gateway's own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub razorpay_order_id: String,
    #[serde(default)]
    pub razorpay_payment_id: String,
    #[serde(default)]
    pub razorpay_signature: String,
}

impl VerifyPaymentRequest {
    /// All three fields are required; an empty field is treated the same as a missing one.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.razorpay_order_id.is_empty() {
            Some("razorpay_order_id")
        } else if self.razorpay_payment_id.is_empty() {
            Some("razorpay_payment_id")
        } else if self.razorpay_signature.is_empty() {
            Some("razorpay_signature")
        } else {
            None
        }
    }
}
