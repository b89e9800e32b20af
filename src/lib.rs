//! Resguardo - payment-confirmation orchestrator
//!
//! Accepts checkout orders, correlates asynchronous payment notifications
//! back to their pending order, and drives idempotent fulfillment: encrypted
//! contact payloads, a deterministic management record, a one-time backup
//! view, and a best-effort confirmation email.

pub mod config;
pub mod crypto;
pub mod email;
pub mod error;
pub mod fulfillment;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod payments;
pub mod sheets;
pub mod state;
