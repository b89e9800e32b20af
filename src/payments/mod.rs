//! Payment-gateway collaborator boundary.

mod mercadopago;

pub use mercadopago::MercadoPagoClient;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::PaymentRecord;

/// Order specification sent to the gateway at intake time.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDraft {
    /// Our order reference, carried through the gateway round trip.
    pub external_reference: String,
    pub title: String,
    pub quantity: u32,
    /// Unit price in CLP.
    pub unit_price: i64,
    /// Where the gateway delivers payment notifications.
    pub notification_url: String,
    /// Where the buyer lands after checkout.
    pub back_url: String,
}

/// Opaque payment entry point returned by the gateway.
#[derive(Debug, Clone)]
pub struct CheckoutEntry {
    pub id: String,
    pub init_point: String,
}

/// The gateway as this system sees it: create an order, fetch the
/// authoritative state of a payment. The approval decision itself is the
/// gateway's business; we only react to it.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, draft: &OrderDraft) -> Result<CheckoutEntry>;

    async fn get_payment(&self, payment_id: &str) -> Result<PaymentRecord>;
}

/// Stand-in used when no gateway credentials are configured. Every call is
/// an upstream failure, which keeps the retry contract intact: notification
/// senders keep redelivering until the deployment is configured.
pub struct UnconfiguredGateway;

#[async_trait]
impl PaymentGateway for UnconfiguredGateway {
    async fn create_order(&self, _draft: &OrderDraft) -> Result<CheckoutEntry> {
        Err(AppError::Upstream("Payment gateway not configured".into()))
    }

    async fn get_payment(&self, _payment_id: &str) -> Result<PaymentRecord> {
        Err(AppError::Upstream("Payment gateway not configured".into()))
    }
}
