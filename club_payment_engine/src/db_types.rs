use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

pub use cpg_common::Paise;

//--------------------------------------    GatewayOrderId    ---------------------------------------------------------
/// The order id assigned by the payment gateway at order creation. Unique per deposit attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct GatewayOrderId(pub String);

impl FromStr for GatewayOrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for GatewayOrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GatewayOrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for GatewayOrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl GatewayOrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------     OrderStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatus {
    /// The order exists but no payment has settled against it yet.
    Created,
    /// A gateway payment settled and the member was credited. Terminal; never regresses.
    Paid,
    /// The payment attempt failed. Terminal.
    Failed,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Created => write!(f, "Created"),
            OrderStatus::Paid => write!(f, "Paid"),
            OrderStatus::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct StatusConversionError(String);

impl FromStr for OrderStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(Self::Created),
            "Paid" => Ok(Self::Paid),
            "Failed" => Ok(Self::Failed),
            s => Err(StatusConversionError(s.to_string())),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status in database: {value}. Defaulting to Created");
            OrderStatus::Created
        })
    }
}

//--------------------------------------     PaymentOrder     ---------------------------------------------------------
/// One deposit attempt, tracked locally against the gateway-issued order id.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub id: i64,
    pub gateway_order_id: GatewayOrderId,
    /// Assigned by the gateway once a payment attempt settles. Null until then.
    pub gateway_payment_id: Option<String>,
    /// The verified signature that authorised the transition to `Paid`. Null until then.
    pub gateway_signature: Option<String>,
    pub member_id: String,
    pub amount: Paise,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

//--------------------------------------    NewPaymentOrder   ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPaymentOrder {
    /// The order id as assigned by the payment gateway
    pub gateway_order_id: GatewayOrderId,
    /// The member making the deposit
    pub member_id: String,
    /// The deposit amount. Must be positive.
    pub amount: Paise,
}

impl NewPaymentOrder {
    pub fn new(gateway_order_id: GatewayOrderId, member_id: String, amount: Paise) -> Self {
        Self { gateway_order_id, member_id, amount }
    }
}

//--------------------------------------        Member        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    /// Running balance. This subsystem only ever increases it, through the deposit credit.
    pub balance: Paise,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      EntryType       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum EntryType {
    Deposit,
}

impl Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryType::Deposit => write!(f, "Deposit"),
        }
    }
}

impl From<String> for EntryType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Deposit" => Self::Deposit,
            _ => {
                error!("Invalid ledger entry type in database: {value}. Defaulting to Deposit");
                Self::Deposit
            },
        }
    }
}

//--------------------------------------     LedgerEntry      ---------------------------------------------------------
/// An immutable ledger record. Never updated or deleted by this subsystem.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub member_id: String,
    pub entry_type: EntryType,
    pub amount: Paise,
    pub description: String,
    /// The gateway order id that produced this entry, for deposit entries.
    pub order_ref: Option<GatewayOrderId>,
    pub entered_at: DateTime<Utc>,
}
