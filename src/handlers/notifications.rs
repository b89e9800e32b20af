//! Payment notification handler.
//!
//! The gateway delivers notifications at least once; the terminal outcome of
//! every delivery is either an accept acknowledgment (200, no retry) or a
//! retry-eligible failure (502). Idempotency comes from the ledger's
//! exactly-once `pop`: a redelivery or a notification whose pending order is
//! gone is acknowledged without re-triggering fulfillment.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;

use crate::crypto;
use crate::error::AppError;
use crate::fulfillment;
use crate::models::FulfillmentRecord;
use crate::state::AppState;

/// Result type for notification processing, HTTP status plus a short reason.
pub type NotificationResult = (StatusCode, &'static str);

#[derive(Debug, Deserialize)]
pub struct NotificationPayload {
    /// Event type; only "payment" events drive fulfillment.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub data: Option<NotificationData>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationData {
    /// The gateway sends the payment id as a string or a number.
    pub id: Option<serde_json::Value>,
}

impl NotificationPayload {
    fn payment_id(&self) -> Option<String> {
        match self.data.as_ref()?.id.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// State machine: parse -> type filter -> status fetch -> approved
/// processing. Only a failure after the type filter propagates as a retry
/// signal; every other outcome is an acknowledgment.
///
/// Takes the raw body rather than a JSON extractor: a permanently
/// unparseable delivery must be acknowledged, not bounced, or an
/// at-least-once sender redelivers it forever.
pub async fn receive_notification(
    State(state): State<AppState>,
    body: Bytes,
) -> NotificationResult {
    let payload: NotificationPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("Unparseable notification body, ignoring: {}", e);
            return (StatusCode::OK, "Event ignored");
        }
    };

    if payload.kind.as_deref() != Some("payment") {
        return (StatusCode::OK, "Event ignored");
    }

    let Some(payment_id) = payload.payment_id() else {
        tracing::warn!("Payment notification without payment id, ignoring");
        return (StatusCode::OK, "No payment id");
    };

    // Authoritative status. The notification itself carries no order data;
    // everything comes from this lookup.
    let payment = match state.gateway.get_payment(&payment_id).await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(payment_id = %payment_id, "Payment lookup failed: {}", e);
            return (StatusCode::BAD_GATEWAY, "Payment lookup failed");
        }
    };

    if payment.status != "approved" {
        tracing::debug!(
            payment_id = %payment_id,
            status = %payment.status,
            "Non-approved payment, no action"
        );
        return (StatusCode::OK, "Status ignored");
    }

    let Some(reference) = payment.external_reference.clone() else {
        tracing::warn!(payment_id = %payment_id, "Approved payment without external reference");
        return (StatusCode::OK, "No external reference");
    };

    // Exactly-once consumption. Absence means a redelivery already consumed
    // the entry, or it was lost to a restart; both are acknowledged.
    let Some(pending) = state.ledger.pop(&reference) else {
        tracing::info!(
            reference = %reference,
            payment_id = %payment_id,
            "No pending order for reference, already processed or unrecoverable"
        );
        return (StatusCode::OK, "Already processed");
    };

    let encrypted_contacts = match state.codec.encrypt(&pending.contacts) {
        Ok(ct) => ct,
        Err(AppError::EncryptionUnavailable) => {
            tracing::error!(
                reference = %reference,
                "No encryption key configured, persisting placeholder marker"
            );
            crypto::PLACEHOLDER.to_string()
        }
        Err(e) => {
            // The placeholder is reserved for the keyless case; anything
            // else stays retry-eligible.
            tracing::error!(reference = %reference, "Contact encryption failed: {}", e);
            return (StatusCode::BAD_GATEWAY, "Encryption failed");
        }
    };

    let record =
        fulfillment::build_record(&reference, &pending, &payment, encrypted_contacts, Utc::now());

    // Side channel for the one-time backup view, written before the store
    // append so the customer can retrieve the attestation even in degraded
    // mode.
    state.backups.insert(&reference, record.attestation.clone());

    let (subject, body) = confirmation_email(&record, pending.price);

    if let Err(e) = state.records.append_record(record.clone().into_row()).await {
        // Degraded mode: the approval is acknowledged, the row is lost.
        tracing::error!(
            reference = %reference,
            payment_id = %payment_id,
            "Failed to persist fulfillment record: {}",
            e
        );
    }

    if let Some(email) = payment.payer.email.clone() {
        let mailer = state.mailer.clone();
        let reference = reference.clone();
        // Best-effort, never blocks the acknowledgment
        tokio::spawn(async move {
            if let Err(e) = mailer.send(&email, &subject, &body).await {
                tracing::warn!(reference = %reference, "Confirmation email failed: {}", e);
            }
        });
    } else {
        tracing::debug!(reference = %reference, "No payer email resolved, skipping confirmation");
    }

    tracing::info!(
        reference = %reference,
        payment_id = %payment_id,
        "Fulfillment completed"
    );

    (StatusCode::OK, "OK")
}

/// Confirmation email content. Plain text, Spanish, mirrors the attestation.
fn confirmation_email(record: &FulfillmentRecord, price: i64) -> (String, String) {
    let subject = format!("Confirmación de tu {}", record.plan_name);
    let body = format!(
        "Hola {},\n\n\
         Tu pago de ${} CLP por {} fue aprobado el {} a las {}.\n\n\
         {}\n\n\
         Tu código para referir amigos es: {}\n\n\
         Guarda este correo como respaldo de tu contratación.",
        record.payer_first_name,
        price,
        record.plan_name,
        record.request_date,
        record.request_time,
        record.attestation,
        record.referral_code,
    );
    (subject, body)
}
