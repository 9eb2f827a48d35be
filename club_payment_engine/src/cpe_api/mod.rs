pub mod deposit_flow_api;
pub mod errors;

pub use deposit_flow_api::{DepositFlowApi, ReconciliationOutcome};
pub use errors::DepositFlowError;
