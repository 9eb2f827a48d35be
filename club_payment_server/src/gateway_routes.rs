//--------------------------------------  Deposit reconciliation  -----------------------------------------------------
//
// The two confirmation channels for a gateway deposit land here: the gateway's own webhook and
// the browser's post-checkout verification call. Both verify a gateway HMAC signature, then
// converge on `DepositFlowApi::reconcile_payment`, which guarantees the credit applies once no
// matter how often, or in what order, the confirmations arrive.

use actix_web::{web, HttpRequest, HttpResponse};
use club_payment_engine::{
    db_types::GatewayOrderId,
    helpers::{verify_client_signature, verify_webhook_signature},
    traits::DepositGatewayDatabase,
    DepositFlowApi,
    DepositFlowError,
    ReconciliationOutcome,
};
use log::{debug, error, info, trace, warn};
use serde_json::json;

use crate::{
    config::GatewayConfig,
    data_objects::{
        JsonResponse,
        VerifyPaymentRequest,
        WebhookAck,
        WebhookEvent,
        WebhookStatus,
        PAYMENT_CAPTURED_EVENT,
        WEBHOOK_SIGNATURE_HEADER,
    },
    route,
};

route!(gateway_webhook => Post "/webhook/payment" impl DepositGatewayDatabase);
/// The webhook reconciliation path.
///
/// Invoked by the gateway's servers, independent of any browser session, and retried by the
/// gateway until it sees a 2xx. The signature is computed over the exact raw request body, so the
/// body is taken as `web::Bytes` and only parsed after verification.
pub async fn gateway_webhook<B>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<DepositFlowApi<B>>,
    config: web::Data<GatewayConfig>,
) -> HttpResponse
where
    B: DepositGatewayDatabase,
{
    trace!("💳️ Received gateway webhook request: {}", req.uri());
    let signature = match req.headers().get(WEBHOOK_SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) {
        Some(sig) => sig,
        None => {
            warn!("💳️ Webhook request without a {WEBHOOK_SIGNATURE_HEADER} header. Denying.");
            return HttpResponse::BadRequest().json(json!({"error": "Missing signature header."}));
        },
    };
    if !verify_webhook_signature(body.as_ref(), signature, config.webhook_secret.reveal()) {
        warn!("💳️ Invalid webhook signature. Denying without side effects.");
        return HttpResponse::BadRequest().json(json!({"error": "Invalid webhook signature."}));
    }
    let event = match serde_json::from_slice::<WebhookEvent>(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!("💳️ Could not parse webhook event envelope. {e}");
            return HttpResponse::BadRequest().json(json!({"error": "Malformed event payload."}));
        },
    };
    if event.event != PAYMENT_CAPTURED_EVENT {
        debug!("💳️ Ignoring gateway event '{}'", event.event);
        return HttpResponse::Ok().json(WebhookAck::new(WebhookStatus::Ignored));
    }
    let Some(payment) = event.payload.payment else {
        warn!("💳️ '{PAYMENT_CAPTURED_EVENT}' event without a payment entity.");
        return HttpResponse::BadRequest().json(json!({"error": "Event payload is missing the payment entity."}));
    };
    let order_id = GatewayOrderId::from(payment.entity.order_id);
    match api.reconcile_payment(&order_id, &payment.entity.id, signature).await {
        Ok(ReconciliationOutcome::Applied(order)) => {
            info!("💳️ Webhook reconciled order {} for member {}.", order.gateway_order_id, order.member_id);
            HttpResponse::Ok().json(WebhookAck::new(WebhookStatus::Processed))
        },
        Ok(ReconciliationOutcome::AlreadyProcessed) => {
            debug!("💳️ Webhook for order {order_id} was a duplicate.");
            HttpResponse::Ok().json(WebhookAck::new(WebhookStatus::AlreadyProcessed))
        },
        // The order may belong to a different integration. Answering 2xx stops pointless
        // gateway retries.
        Ok(ReconciliationOutcome::OrderNotFound) => {
            info!("💳️ Webhook referenced unknown order {order_id}.");
            HttpResponse::Ok().json(WebhookAck::new(WebhookStatus::OrderNotFound))
        },
        // Answering 5xx here is safe: the gateway's retry will land on already_processed, and
        // the sweep worker repairs the missing credit.
        Err(e @ DepositFlowError::LedgerGap { .. }) => {
            error!("💳️ {e}");
            HttpResponse::InternalServerError().json(json!({"error": e.to_string()}))
        },
        Err(e) => {
            warn!("💳️ Unexpected error while reconciling webhook for order {order_id}. {e}");
            HttpResponse::InternalServerError().json(json!({"error": "Unexpected error handling event."}))
        },
    }
}

route!(verify_payment => Post "/payments/verify" impl DepositGatewayDatabase);
/// The client reconciliation path.
///
/// Invoked by the browser immediately after the checkout widget reports success. Unlike the
/// webhook path, an unknown order here is a genuine error: the caller is verifying an order it
/// just created itself.
pub async fn verify_payment<B>(
    body: web::Bytes,
    api: web::Data<DepositFlowApi<B>>,
    config: web::Data<GatewayConfig>,
) -> HttpResponse
where
    B: DepositGatewayDatabase,
{
    // Parsed by hand rather than with the Json extractor so a malformed body gets the same
    // `{success, message}` response shape as every other failure on this path.
    let request = match serde_json::from_slice::<VerifyPaymentRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!("💳️ Could not parse payment verification request. {e}");
            return HttpResponse::BadRequest().json(JsonResponse::failure("Malformed request body"));
        },
    };
    if let Some(field) = request.missing_field() {
        debug!("💳️ Payment verification request without {field}.");
        return HttpResponse::BadRequest().json(JsonResponse::failure(format!("Missing required field: {field}")));
    }
    if !verify_client_signature(
        &request.razorpay_order_id,
        &request.razorpay_payment_id,
        &request.razorpay_signature,
        config.key_secret.reveal(),
    ) {
        warn!("💳️ Invalid client payment signature for order {}. Denying.", request.razorpay_order_id);
        return HttpResponse::BadRequest().json(JsonResponse::failure("Invalid payment signature"));
    }
    let order_id = GatewayOrderId::from(request.razorpay_order_id);
    match api.reconcile_payment(&order_id, &request.razorpay_payment_id, &request.razorpay_signature).await {
        Ok(ReconciliationOutcome::Applied(order)) => {
            info!("💳️ Client call reconciled order {} for member {}.", order.gateway_order_id, order.member_id);
            HttpResponse::Ok().json(JsonResponse::success("Payment verified and balance updated"))
        },
        Ok(ReconciliationOutcome::AlreadyProcessed) => {
            debug!("💳️ Client verification for order {order_id} was a duplicate.");
            HttpResponse::Ok().json(JsonResponse::success("Payment already processed"))
        },
        Ok(ReconciliationOutcome::OrderNotFound) => {
            warn!("💳️ Client verification for unknown order {order_id}.");
            HttpResponse::BadRequest().json(JsonResponse::failure("Payment order not found"))
        },
        Err(e) => {
            error!("💳️ Could not complete payment verification for order {order_id}. {e}");
            HttpResponse::BadRequest().json(JsonResponse::failure("Payment verification failed"))
        },
    }
}
