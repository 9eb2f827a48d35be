use chrono::{DateTime, Utc};
use club_payment_engine::{
    db_types::{GatewayOrderId, Member, NewPaymentOrder, Paise, PaymentOrder},
    traits::{DepositGatewayDatabase, DepositGatewayError},
};
use mockall::mock;

mock! {
    pub GatewayDb {}

    impl Clone for GatewayDb {
        fn clone(&self) -> Self;
    }

    impl DepositGatewayDatabase for GatewayDb {
        fn url(&self) -> &str;
        async fn insert_order(&self, order: NewPaymentOrder) -> Result<(PaymentOrder, bool), DepositGatewayError>;
        async fn fetch_order_by_gateway_id(&self, id: &GatewayOrderId) -> Result<Option<PaymentOrder>, DepositGatewayError>;
        async fn transition_to_paid(&self, id: &GatewayOrderId, gateway_payment_id: &str, gateway_signature: &str, paid_at: DateTime<Utc>) -> Result<Option<PaymentOrder>, DepositGatewayError>;
        async fn mark_order_failed(&self, id: &GatewayOrderId) -> Result<Option<PaymentOrder>, DepositGatewayError>;
        async fn credit_deposit(&self, order: &PaymentOrder) -> Result<(), DepositGatewayError>;
        async fn deposit_recorded(&self, id: &GatewayOrderId) -> Result<bool, DepositGatewayError>;
        async fn fetch_unreconciled_orders(&self) -> Result<Vec<PaymentOrder>, DepositGatewayError>;
        async fn fetch_member(&self, member_id: &str) -> Result<Option<Member>, DepositGatewayError>;
        async fn upsert_member(&self, member_id: &str, name: &str, balance: Paise) -> Result<(), DepositGatewayError>;
    }
}
