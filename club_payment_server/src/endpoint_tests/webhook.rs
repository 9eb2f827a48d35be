use actix_web::{http::StatusCode, web, web::ServiceConfig};
use club_payment_engine::{
    db_types::OrderStatus,
    helpers::sign_webhook_payload,
    traits::DepositGatewayError,
    DepositFlowApi,
};
use serde_json::{json, Value};

use super::{
    helpers::{order_fixture, post_request, request_with_method, test_gateway_config, TEST_WEBHOOK_SECRET},
    mocks::MockGatewayDb,
};
use crate::gateway_routes::GatewayWebhookRoute;

const WEBHOOK_PATH: &str = "/webhook/payment";

fn captured_event_body(order_id: &str, payment_id: &str) -> Vec<u8> {
    json!({
        "event": "payment.captured",
        "payload": { "payment": { "entity": { "order_id": order_id, "id": payment_id } } }
    })
    .to_string()
    .into_bytes()
}

fn app_with(cfg: &mut ServiceConfig, db: MockGatewayDb) {
    let api = DepositFlowApi::new(db);
    cfg.service(GatewayWebhookRoute::<MockGatewayDb>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(test_gateway_config()));
}

#[actix_web::test]
async fn missing_signature_header_is_rejected() {
    let _ = env_logger::try_init().ok();
    let body = captured_event_body("order_h1", "pay_h1");
    let (status, body) = post_request(WEBHOOK_PATH, body, &[], |cfg| app_with(cfg, MockGatewayDb::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["error"], "Missing signature header.");
}

#[actix_web::test]
async fn invalid_signature_is_rejected_without_side_effects() {
    let _ = env_logger::try_init().ok();
    let body = captured_event_body("order_h2", "pay_h2");
    // Signed with the wrong secret. The mock has no expectations, so any storage call panics.
    let bad_sig = sign_webhook_payload(&body, "not_the_webhook_secret");
    let (status, body) = post_request(
        WEBHOOK_PATH,
        body,
        &[("X-Razorpay-Signature", bad_sig.as_str())],
        |cfg| app_with(cfg, MockGatewayDb::new()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["error"], "Invalid webhook signature.");
}

#[actix_web::test]
async fn malformed_body_is_rejected() {
    let _ = env_logger::try_init().ok();
    let body = b"not json at all".to_vec();
    let sig = sign_webhook_payload(&body, TEST_WEBHOOK_SECRET);
    let (status, body) =
        post_request(WEBHOOK_PATH, body, &[("X-Razorpay-Signature", sig.as_str())], |cfg| {
            app_with(cfg, MockGatewayDb::new())
        })
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["error"], "Malformed event payload.");
}

#[actix_web::test]
async fn other_event_types_are_acknowledged_and_ignored() {
    let _ = env_logger::try_init().ok();
    let body = json!({"event": "payment.authorized"}).to_string().into_bytes();
    let sig = sign_webhook_payload(&body, TEST_WEBHOOK_SECRET);
    let (status, body) =
        post_request(WEBHOOK_PATH, body, &[("X-Razorpay-Signature", sig.as_str())], |cfg| {
            app_with(cfg, MockGatewayDb::new())
        })
        .await;
    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["status"], "ignored");
}

#[actix_web::test]
async fn captured_event_without_payment_entity_is_rejected() {
    let _ = env_logger::try_init().ok();
    let body = json!({"event": "payment.captured", "payload": {}}).to_string().into_bytes();
    let sig = sign_webhook_payload(&body, TEST_WEBHOOK_SECRET);
    let (status, body) =
        post_request(WEBHOOK_PATH, body, &[("X-Razorpay-Signature", sig.as_str())], |cfg| {
            app_with(cfg, MockGatewayDb::new())
        })
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["error"], "Event payload is missing the payment entity.");
}

#[actix_web::test]
async fn unknown_order_is_acknowledged_not_retried() {
    let _ = env_logger::try_init().ok();
    let body = captured_event_body("order_h3", "pay_h3");
    let sig = sign_webhook_payload(&body, TEST_WEBHOOK_SECRET);
    let (status, body) =
        post_request(WEBHOOK_PATH, body, &[("X-Razorpay-Signature", sig.as_str())], |cfg| {
            let mut db = MockGatewayDb::new();
            db.expect_fetch_order_by_gateway_id().returning(|_| Ok(None));
            app_with(cfg, db)
        })
        .await;
    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["status"], "order_not_found");
}

#[actix_web::test]
async fn duplicate_delivery_is_acknowledged_without_credit() {
    let _ = env_logger::try_init().ok();
    let body = captured_event_body("order_h4", "pay_h4");
    let sig = sign_webhook_payload(&body, TEST_WEBHOOK_SECRET);
    let (status, body) =
        post_request(WEBHOOK_PATH, body, &[("X-Razorpay-Signature", sig.as_str())], |cfg| {
            let mut db = MockGatewayDb::new();
            db.expect_fetch_order_by_gateway_id()
                .returning(|_| Ok(Some(order_fixture("order_h4", OrderStatus::Paid))));
            app_with(cfg, db)
        })
        .await;
    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["status"], "already_processed");
}

#[actix_web::test]
async fn captured_payment_is_processed_and_credited_once() {
    let _ = env_logger::try_init().ok();
    let body = captured_event_body("order_h5", "pay_h5");
    let sig = sign_webhook_payload(&body, TEST_WEBHOOK_SECRET);
    let (status, body) =
        post_request(WEBHOOK_PATH, body, &[("X-Razorpay-Signature", sig.as_str())], |cfg| {
            let mut db = MockGatewayDb::new();
            db.expect_fetch_order_by_gateway_id()
                .returning(|_| Ok(Some(order_fixture("order_h5", OrderStatus::Created))));
            db.expect_transition_to_paid()
                .times(1)
                .returning(|_, _, _, _| Ok(Some(order_fixture("order_h5", OrderStatus::Paid))));
            db.expect_credit_deposit().times(1).returning(|_| Ok(()));
            app_with(cfg, db)
        })
        .await;
    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["status"], "processed");
}

#[actix_web::test]
async fn ledger_gap_reports_server_error() {
    let _ = env_logger::try_init().ok();
    let body = captured_event_body("order_h6", "pay_h6");
    let sig = sign_webhook_payload(&body, TEST_WEBHOOK_SECRET);
    let (status, _) =
        post_request(WEBHOOK_PATH, body, &[("X-Razorpay-Signature", sig.as_str())], |cfg| {
            let mut db = MockGatewayDb::new();
            db.expect_fetch_order_by_gateway_id()
                .returning(|_| Ok(Some(order_fixture("order_h6", OrderStatus::Created))));
            db.expect_transition_to_paid()
                .returning(|_, _, _, _| Ok(Some(order_fixture("order_h6", OrderStatus::Paid))));
            db.expect_credit_deposit()
                .returning(|_| Err(DepositGatewayError::MemberNotFound("mem-100".to_string())));
            app_with(cfg, db)
        })
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn non_post_methods_are_rejected() {
    let _ = env_logger::try_init().ok();
    let status = request_with_method(actix_web::http::Method::GET, WEBHOOK_PATH, |cfg| {
        app_with(cfg, MockGatewayDb::new())
    })
    .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
