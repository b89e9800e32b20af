//! Confirmation email collaborator.
//!
//! Best-effort by contract: delivery failures are logged by the caller and
//! never surface to the notification sender. Sent via the Resend API when a
//! key is configured, disabled otherwise.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Retry delays in seconds for transient failures (network, 5xx, 429).
const RETRY_DELAYS: &[u64] = &[1, 4];

const RESEND_API_URL: &str = "https://api.resend.com/emails";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Outbound email boundary.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct ResendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResendEmailResponse {
    #[allow(dead_code)]
    id: String,
}

/// Email delivery through the Resend API.
#[derive(Clone)]
pub struct ResendMailer {
    api_key: String,
    from_email: String,
    http_client: Client,
}

impl ResendMailer {
    pub fn new(api_key: &str, from_email: &str) -> Self {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client construction cannot fail with static config");

        Self {
            api_key: api_key.to_string(),
            from_email: from_email.to_string(),
            http_client,
        }
    }

    /// Send a single request. Returns Ok(()) on success, or
    /// Err((error, is_transient)) on failure.
    async fn send_once(
        &self,
        request: &ResendEmailRequest<'_>,
    ) -> std::result::Result<(), (AppError, bool)> {
        let response = self
            .http_client
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                // Network errors are transient
                (AppError::Upstream(format!("Email service error: {}", e)), true)
            })?;

        let status = response.status();

        if status.is_success() {
            let _result: ResendEmailResponse = response.json().await.map_err(|e| {
                (
                    AppError::Upstream(format!("Email service response error: {}", e)),
                    false,
                )
            })?;
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            let is_transient = status.as_u16() == 429 || status.is_server_error();

            Err((
                AppError::Upstream(format!("Email service error: {} - {}", status, body)),
                is_transient,
            ))
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let request = ResendEmailRequest {
            from: &self.from_email,
            to: vec![to],
            subject,
            text: body,
        };

        let mut last_error: Option<AppError> = None;

        for (attempt, delay_secs) in std::iter::once(&0u64).chain(RETRY_DELAYS).enumerate() {
            if *delay_secs > 0 {
                tracing::warn!(attempt, delay_secs, "Retrying email send after transient failure");
                tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
            }

            match self.send_once(&request).await {
                Ok(()) => {
                    tracing::info!(to = %to, "Confirmation email sent");
                    return Ok(());
                }
                Err((error, is_transient)) => {
                    if is_transient {
                        last_error = Some(error);
                    } else {
                        return Err(error);
                    }
                }
            }
        }

        tracing::error!(
            to = %to,
            attempts = RETRY_DELAYS.len() + 1,
            "Email send failed after all retries"
        );
        Err(last_error
            .unwrap_or_else(|| AppError::Upstream("Email service error: retries exhausted".into())))
    }
}

/// Used when no email credentials are configured.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, to: &str, _subject: &str, _body: &str) -> Result<()> {
        tracing::debug!(to = %to, "Email disabled, skipping confirmation");
        Ok(())
    }
}
