use std::env;

use cpg_common::Secret;
use log::*;

const DEFAULT_CPG_HOST: &str = "127.0.0.1";
const DEFAULT_CPG_PORT: u16 = 8480;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// How often the reconciliation sweep looks for paid orders that were never credited.
    pub sweep_interval_secs: u64,
    /// Payment gateway credentials
    pub gateway: GatewayConfig,
}

/// Credentials for the payment gateway. The two secrets authenticate two different channels and
/// must never be conflated: `key_secret` signs the client-path confirmation, `webhook_secret`
/// signs webhook request bodies.
#[derive(Clone, Debug, Default)]
pub struct GatewayConfig {
    /// The public API key id, as issued by the gateway dashboard.
    pub key_id: String,
    /// Signs the client-path `"{order_id}|{payment_id}"` confirmation.
    pub key_secret: Secret<String>,
    /// Signs the raw body of webhook requests.
    pub webhook_secret: Secret<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CPG_HOST.to_string(),
            port: DEFAULT_CPG_PORT,
            database_url: String::default(),
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            gateway: GatewayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let host = env::var("CPG_HOST").ok().unwrap_or_else(|| DEFAULT_CPG_HOST.into());
        let port = env::var("CPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for CPG_PORT. {e} Using the default, {DEFAULT_CPG_PORT}, instead."
                    );
                    DEFAULT_CPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_CPG_PORT);
        let database_url = env::var("CPG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ CPG_DATABASE_URL is not set. Please set it to the URL for the payment database.");
            String::default()
        });
        let sweep_interval_secs = env::var("CPG_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for CPG_SWEEP_INTERVAL_SECS. {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);
        let gateway = GatewayConfig::from_env_or_default();
        Self { host, port, database_url, sweep_interval_secs, gateway }
    }
}

impl GatewayConfig {
    pub fn from_env_or_default() -> Self {
        let key_id = env::var("CPG_RAZORPAY_KEY_ID").ok().unwrap_or_else(|| {
            error!("🪛️ CPG_RAZORPAY_KEY_ID is not set. Please set it to your gateway API key id.");
            String::default()
        });
        let key_secret = env::var("CPG_RAZORPAY_KEY_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ CPG_RAZORPAY_KEY_SECRET is not set. Client-path payment verification will reject \
                 everything until it is configured."
            );
            String::default()
        });
        let webhook_secret = env::var("CPG_RAZORPAY_WEBHOOK_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ CPG_RAZORPAY_WEBHOOK_SECRET is not set. Webhook verification will reject everything \
                 until it is configured."
            );
            String::default()
        });
        Self { key_id, key_secret: Secret::new(key_secret), webhook_secret: Secret::new(webhook_secret) }
    }
}
