//! Club Payment Engine
//!
//! The club payment engine reconciles member deposits made through a third-party payment gateway
//! with the club's internal ledger. A gateway payment confirmation can arrive over two
//! independent, unordered, possibly-duplicated channels (the browser's verification call and the
//! gateway's webhook), and the resulting balance credit must be applied exactly once.
//!
//! The library is divided into three sections:
//! 1. Database management ([`mod@sqlite`]). SQLite is the supported backend. You should never
//!    need to access the database directly; use the public API instead. The exception is the data
//!    types, defined in [`mod@db_types`], which are public.
//! 2. The engine public API ([`DepositFlowApi`]). Backends implement the
//!    [`traits::DepositGatewayDatabase`] trait to drive it. Its one load-bearing primitive is the
//!    guarded `Created -> Paid` compare-and-set; whichever caller lands it first is the only one
//!    permitted to credit the member.
//! 3. Signature verification ([`mod@helpers`]): the two HMAC-SHA256 schemes the gateway signs its
//!    confirmations with.
pub mod db_types;
pub mod helpers;
pub mod traits;

mod cpe_api;
mod sqlite;

pub use cpe_api::{DepositFlowApi, DepositFlowError, ReconciliationOutcome};
pub use sqlite::{db, SqliteDatabase};
