//! # Club payment server
//!
//! This crate hosts the HTTP surface of the deposit reconciliation subsystem. It is responsible
//! for:
//! * Receiving payment confirmation webhooks from the gateway and verifying their signatures.
//! * Receiving the browser's post-checkout verification call and verifying its signature.
//! * Handing verified confirmations to the engine, which applies the balance credit exactly once.
//! * Running the periodic ledger reconciliation sweep.
//!
//! ## Configuration
//! The server is configured via `CPG_*` environment variables. See [config] for details.
//!
//! ## Routes
//! * `/health`: health check, returns 200 OK.
//! * `/payments/verify`: the client-path verification endpoint.
//! * `/gateway/webhook/payment`: the webhook endpoint.

pub mod config;
pub mod data_objects;
pub mod errors;
pub mod gateway_routes;
pub mod routes;
pub mod server;
pub mod sweep_worker;

#[cfg(test)]
mod endpoint_tests;
