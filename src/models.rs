//! Core entities of the confirmation pipeline.

use serde::{Deserialize, Serialize};

/// Pre-payment context stored in the pending-order ledger, keyed by the
/// order reference. Consumed exactly once when the approval notification
/// arrives; lost on restart (accepted limitation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOrder {
    /// Contact identifiers the plan protects. Intake rejects empty lists.
    pub contacts: Vec<String>,
    pub payer_first_name: String,
    pub payer_last_name: String,
    /// Total price in CLP.
    pub price: i64,
    /// Referral code the buyer presented at checkout, if any.
    pub referred_by: Option<String>,
}

/// Authoritative payment state fetched from the gateway after a
/// notification, keyed by the gateway's payment id.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    pub status: String,
    /// Our order reference, echoed back by the gateway.
    pub external_reference: Option<String>,
    /// Purchased item description (the plan name).
    pub description: Option<String>,
    pub payer: Payer,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Payer {
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub identification: Option<Identification>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Identification {
    #[serde(rename = "type")]
    pub id_type: String,
    pub number: String,
}

/// The durable artifact appended to the management spreadsheet, built
/// exactly once per order reference and never mutated by this system.
#[derive(Debug, Clone, Serialize)]
pub struct FulfillmentRecord {
    pub reference: String,
    /// Request date in the operating region's local time, `%d-%m-%Y`.
    pub request_date: String,
    /// Request time in the operating region's local time, `%H:%M:%S`.
    pub request_time: String,
    pub payer_first_name: String,
    pub payer_last_name: String,
    pub plan_name: String,
    /// Ciphertext of the contact list, opaque to the store.
    pub encrypted_contacts: String,
    /// Management status, initialized to a fixed pending value.
    pub management_status: String,
    /// Management deadline: request date plus seven days.
    pub deadline: String,
    /// Opaque spreadsheet formula derived from the deadline cell.
    /// Handed across the boundary as text, never evaluated locally.
    pub progress_formula: String,
    pub payment_id: String,
    /// Legal attestation text, byte-for-byte reproducible from its inputs.
    pub attestation: String,
    /// Referral code derived for the new customer.
    pub referral_code: String,
    /// Referral code presented at checkout, if any.
    pub referred_by: Option<String>,
}

impl FulfillmentRecord {
    /// The ordered cell sequence the row store expects. Column order is part
    /// of the contract with the management spreadsheet; do not reorder.
    pub fn into_row(self) -> Vec<String> {
        vec![
            self.reference,
            self.request_date,
            self.request_time,
            self.payer_first_name,
            self.payer_last_name,
            self.plan_name,
            self.encrypted_contacts,
            self.management_status,
            self.deadline,
            self.progress_formula,
            self.payment_id,
            self.attestation,
            self.referral_code,
            self.referred_by.unwrap_or_default(),
        ]
    }
}
