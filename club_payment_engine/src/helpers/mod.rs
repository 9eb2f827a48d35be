pub mod gateway_signature;

pub use gateway_signature::{
    client_signature_message,
    sign_client_payment,
    sign_webhook_payload,
    verify_client_signature,
    verify_webhook_signature,
};
