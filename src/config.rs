use std::env;

/// Process configuration. Every collaborator credential is optional:
/// a missing value degrades the corresponding feature at runtime instead
/// of preventing startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    /// Base64-encoded 256-bit key for the contact payload codec.
    pub encryption_key: Option<String>,
    /// Mercado Pago access token for order creation and payment lookup.
    pub mp_access_token: Option<String>,
    /// Full `values:append` URL of the management spreadsheet.
    pub sheet_append_url: Option<String>,
    /// Bearer token for the spreadsheet API.
    pub sheet_token: Option<String>,
    /// Resend API key for confirmation emails.
    pub resend_api_key: Option<String>,
    pub email_from: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));

        Self {
            host,
            port,
            base_url,
            encryption_key: env::var("ENCRYPTION_KEY").ok(),
            mp_access_token: env::var("MERCADOPAGO_TOKEN").ok(),
            sheet_append_url: env::var("SHEET_APPEND_URL").ok(),
            sheet_token: env::var("SHEET_TOKEN").ok(),
            resend_api_key: env::var("RESEND_API_KEY").ok(),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "confirmaciones@resguardo.app".to_string()),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
