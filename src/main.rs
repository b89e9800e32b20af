use std::sync::Arc;

use axum::Router;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resguardo::config::Config;
use resguardo::crypto::ContactCodec;
use resguardo::email::{DisabledMailer, Mailer, ResendMailer};
use resguardo::handlers;
use resguardo::ledger::{BackupStore, PendingLedger};
use resguardo::payments::{MercadoPagoClient, PaymentGateway, UnconfiguredGateway};
use resguardo::sheets::{DisabledStore, RecordStore, SheetsClient};
use resguardo::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "resguardo")]
#[command(about = "Payment-confirmation orchestrator for contact-protection subscriptions")]
struct Cli {
    /// Generate a fresh base64 encryption key and exit
    #[arg(long)]
    gen_key: bool,

    /// Decrypt a contact payload (reads ENCRYPTION_KEY from the environment)
    #[arg(long, value_name = "CIPHERTEXT")]
    decrypt: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.gen_key {
        println!("{}", ContactCodec::generate());
        return;
    }

    // Manual decrypt tooling: decode errors are reported, never a crash.
    if let Some(ciphertext) = cli.decrypt {
        dotenvy::dotenv().ok();
        let codec = match std::env::var("ENCRYPTION_KEY") {
            Ok(key) => match ContactCodec::from_base64(&key) {
                Ok(codec) => codec,
                Err(e) => {
                    eprintln!("Invalid ENCRYPTION_KEY: {}", e);
                    std::process::exit(1);
                }
            },
            Err(_) => ContactCodec::unconfigured(),
        };

        match codec.decrypt(&ciphertext) {
            Ok(contacts) => {
                for contact in contacts {
                    println!("{}", contact);
                }
            }
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resguardo=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    // Every collaborator degrades independently; none prevents startup.
    let codec = match &config.encryption_key {
        Some(key) => match ContactCodec::from_base64(key) {
            Ok(codec) => codec,
            Err(e) => {
                tracing::error!("Invalid ENCRYPTION_KEY, starting without encryption: {}", e);
                ContactCodec::unconfigured()
            }
        },
        None => {
            tracing::warn!("ENCRYPTION_KEY not set, contact payloads will not be persisted usable");
            ContactCodec::unconfigured()
        }
    };

    let gateway: Arc<dyn PaymentGateway> = match &config.mp_access_token {
        Some(token) => Arc::new(MercadoPagoClient::new(token)),
        None => {
            tracing::warn!("MERCADOPAGO_TOKEN not set, gateway calls will fail");
            Arc::new(UnconfiguredGateway)
        }
    };

    let records: Arc<dyn RecordStore> = match (&config.sheet_append_url, &config.sheet_token) {
        (Some(url), Some(token)) => Arc::new(SheetsClient::new(url, token)),
        _ => {
            tracing::warn!("Sheet credentials not set, fulfillment records will not be persisted");
            Arc::new(DisabledStore)
        }
    };

    let mailer: Arc<dyn Mailer> = match &config.resend_api_key {
        Some(key) => Arc::new(ResendMailer::new(key, &config.email_from)),
        None => {
            tracing::warn!("RESEND_API_KEY not set, confirmation emails disabled");
            Arc::new(DisabledMailer)
        }
    };

    let state = AppState {
        ledger: Arc::new(PendingLedger::new()),
        backups: Arc::new(BackupStore::new()),
        codec,
        gateway,
        records,
        mailer,
        base_url: config.base_url.clone(),
    };

    let app = Router::new()
        .merge(handlers::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Resguardo server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
