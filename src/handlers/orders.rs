use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::PendingOrder;
use crate::payments::OrderDraft;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub title: String,
    pub quantity: u32,
    /// Unit price in CLP.
    pub unit_price: i64,
    #[serde(default)]
    pub payer_first_name: String,
    #[serde(default)]
    pub payer_last_name: String,
    /// Contact identifiers the plan protects. Must be non-empty.
    #[serde(default)]
    pub contacts: Vec<String>,
    /// Referral code presented at checkout, if any.
    #[serde(default)]
    pub referral_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub reference: String,
    /// Gateway checkout entry point for the buyer.
    pub init_point: String,
}

/// Order intake. Validates the request, mints the order reference, records
/// the pending order, and submits the gateway order carrying the reference
/// and our notification callback.
///
/// A pending entry exists from this point even though no payment has
/// happened yet; that entry is what the notification handler later consumes.
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>> {
    let contacts: Vec<String> = request
        .contacts
        .iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    if contacts.is_empty() {
        return Err(AppError::Validation(
            "At least one contact to protect is required".into(),
        ));
    }

    if request.quantity == 0 {
        return Err(AppError::Validation("Quantity must be at least 1".into()));
    }

    if request.unit_price <= 0 {
        return Err(AppError::Validation("Unit price must be positive".into()));
    }

    let price = request
        .unit_price
        .checked_mul(request.quantity as i64)
        .ok_or_else(|| AppError::Validation("Order total out of range".into()))?;

    let reference = Uuid::new_v4().simple().to_string();

    let pending = PendingOrder {
        contacts,
        payer_first_name: request.payer_first_name.clone(),
        payer_last_name: request.payer_last_name.clone(),
        price,
        referred_by: request.referral_code.clone(),
    };

    state.ledger.put(&reference, pending)?;

    let draft = OrderDraft {
        external_reference: reference.clone(),
        title: request.title.clone(),
        quantity: request.quantity,
        unit_price: request.unit_price,
        notification_url: format!("{}/webhook", state.base_url),
        back_url: state.base_url.clone(),
    };

    let entry = match state.gateway.create_order(&draft).await {
        Ok(entry) => entry,
        Err(e) => {
            // No gateway order exists, so the pending entry can never be
            // consumed; take it back out instead of leaking it.
            state.ledger.pop(&reference);
            return Err(e);
        }
    };

    tracing::info!(
        reference = %reference,
        preference_id = %entry.id,
        "Order created, awaiting payment"
    );

    Ok(Json(CreateOrderResponse {
        reference,
        init_point: entry.init_point,
    }))
}
