use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::PaymentRecord;

use super::{CheckoutEntry, OrderDraft, PaymentGateway};

const API_BASE: &str = "https://api.mercadopago.com";

/// Per-call timeout. Gateway calls must never block a request indefinitely;
/// a timeout is treated as an upstream failure and the sender retries.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const CURRENCY: &str = "CLP";

#[derive(Debug, Deserialize)]
struct CreatePreferenceResponse {
    id: String,
    init_point: String,
}

/// Mercado Pago client for order creation and payment lookup.
#[derive(Clone)]
pub struct MercadoPagoClient {
    client: Client,
    access_token: String,
    api_base: String,
}

impl MercadoPagoClient {
    pub fn new(access_token: &str) -> Self {
        Self::with_api_base(access_token, API_BASE)
    }

    pub fn with_api_base(access_token: &str, api_base: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client construction cannot fail with static config");

        Self {
            client,
            access_token: access_token.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoClient {
    /// Create a checkout preference carrying our order reference in
    /// `external_reference` so the later notification can be correlated.
    async fn create_order(&self, draft: &OrderDraft) -> Result<CheckoutEntry> {
        let body = json!({
            "external_reference": draft.external_reference,
            "items": [{
                "title": draft.title,
                "quantity": draft.quantity,
                "unit_price": draft.unit_price,
                "currency_id": CURRENCY,
            }],
            "back_urls": {
                "success": draft.back_url,
                "failure": draft.back_url,
                "pending": draft.back_url,
            },
            "auto_return": "approved",
            "notification_url": draft.notification_url,
        });

        let response = self
            .client
            .post(format!("{}/checkout/preferences", self.api_base))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Mercado Pago API error: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Mercado Pago API error: {} - {}",
                status, error_text
            )));
        }

        let preference: CreatePreferenceResponse = response.json().await.map_err(|e| {
            AppError::Upstream(format!("Failed to parse Mercado Pago response: {}", e))
        })?;

        Ok(CheckoutEntry {
            id: preference.id,
            init_point: preference.init_point,
        })
    }

    /// Fetch the authoritative payment state. Notifications carry only the
    /// payment id; status, external reference, and payer identity all come
    /// from this lookup.
    async fn get_payment(&self, payment_id: &str) -> Result<PaymentRecord> {
        let response = self
            .client
            .get(format!("{}/v1/payments/{}", self.api_base, payment_id))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Mercado Pago API error: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Mercado Pago payment lookup failed: {} - {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            AppError::Upstream(format!("Failed to parse Mercado Pago payment: {}", e))
        })
    }
}
