use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use chrono::Utc;
use club_payment_engine::db_types::{GatewayOrderId, OrderStatus, Paise, PaymentOrder};
use cpg_common::Secret;

use crate::config::GatewayConfig;

pub const TEST_WEBHOOK_SECRET: &str = "whsec_endpoint_tests";
pub const TEST_KEY_SECRET: &str = "keysec_endpoint_tests";

// Test credentials only. DO NOT re-use these anywhere.
pub fn test_gateway_config() -> GatewayConfig {
    GatewayConfig {
        key_id: "rzp_test_dummy".to_string(),
        key_secret: Secret::new(TEST_KEY_SECRET.to_string()),
        webhook_secret: Secret::new(TEST_WEBHOOK_SECRET.to_string()),
    }
}

pub fn order_fixture(gateway_order_id: &str, status: OrderStatus) -> PaymentOrder {
    let paid = status == OrderStatus::Paid;
    PaymentOrder {
        id: 1,
        gateway_order_id: GatewayOrderId::from(gateway_order_id),
        gateway_payment_id: paid.then(|| "pay_fixture".to_string()),
        gateway_signature: paid.then(|| "sig_fixture".to_string()),
        member_id: "mem-100".to_string(),
        amount: Paise::from(100_000),
        status,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        paid_at: paid.then(Utc::now),
    }
}

pub async fn post_request(
    path: &str,
    body: Vec<u8>,
    headers: &[(&str, &str)],
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    let mut req = TestRequest::post().uri(path).insert_header(("Content-Type", "application/json"));
    for (name, value) in headers {
        req = req.insert_header((*name, *value));
    }
    let req = req.set_payload(body).to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req).await;
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

pub async fn request_with_method(
    method: actix_web::http::Method,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> StatusCode {
    let req = TestRequest::default().method(method).uri(path).to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    test::call_service(&service, req).await.status()
}
