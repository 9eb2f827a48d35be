mod deposit_gateway_database;

pub use deposit_gateway_database::{DepositGatewayDatabase, DepositGatewayError};
