//! Test fixtures: mock collaborators and application state.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

pub use resguardo::crypto::ContactCodec;
pub use resguardo::error::{AppError, Result};
pub use resguardo::ledger::{BackupStore, PendingLedger};
pub use resguardo::models::{Identification, Payer, PaymentRecord, PendingOrder};
pub use resguardo::state::AppState;

use resguardo::email::Mailer;
use resguardo::payments::{CheckoutEntry, OrderDraft, PaymentGateway};
use resguardo::sheets::RecordStore;

/// Deterministic test codec (fixed key - ONLY for testing!)
pub fn test_codec() -> ContactCodec {
    ContactCodec::from_bytes([0u8; 32])
}

/// Gateway mock: payments are looked up from a map seeded by the test;
/// created orders are recorded for inspection.
#[derive(Default)]
pub struct MockGateway {
    pub payments: Mutex<HashMap<String, PaymentRecord>>,
    pub drafts: Mutex<Vec<OrderDraft>>,
    pub lookups: AtomicUsize,
    pub fail_create: AtomicBool,
    pub fail_lookup: AtomicBool,
}

impl MockGateway {
    pub fn seed_payment(&self, payment: PaymentRecord) {
        self.payments.lock().insert(payment.id.clone(), payment);
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(&self, draft: &OrderDraft) -> Result<CheckoutEntry> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("mock gateway down".into()));
        }
        self.drafts.lock().push(draft.clone());
        Ok(CheckoutEntry {
            id: "pref-test-1".to_string(),
            init_point: "https://pay.example/init/pref-test-1".to_string(),
        })
    }

    async fn get_payment(&self, payment_id: &str) -> Result<PaymentRecord> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("mock gateway down".into()));
        }
        self.payments
            .lock()
            .get(payment_id)
            .cloned()
            .ok_or_else(|| AppError::Upstream(format!("unknown payment {}", payment_id)))
    }
}

/// Row store mock recording appended rows.
#[derive(Default)]
pub struct RecordingStore {
    pub rows: Mutex<Vec<Vec<String>>>,
    pub fail: AtomicBool,
}

impl RecordingStore {
    pub fn row_count(&self) -> usize {
        self.rows.lock().len()
    }
}

#[async_trait]
impl RecordStore for RecordingStore {
    async fn append_record(&self, row: Vec<String>) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("mock store down".into()));
        }
        self.rows.lock().push(row);
        Ok(())
    }
}

/// Mailer mock recording sent messages.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        self.sent
            .lock()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub gateway: Arc<MockGateway>,
    pub store: Arc<RecordingStore>,
    pub mailer: Arc<RecordingMailer>,
}

pub fn test_app() -> TestApp {
    let gateway = Arc::new(MockGateway::default());
    let store = Arc::new(RecordingStore::default());
    let mailer = Arc::new(RecordingMailer::default());

    let state = AppState {
        ledger: Arc::new(PendingLedger::new()),
        backups: Arc::new(BackupStore::new()),
        codec: test_codec(),
        gateway: gateway.clone(),
        records: store.clone(),
        mailer: mailer.clone(),
        base_url: "http://localhost:3000".to_string(),
    };

    TestApp {
        state,
        gateway,
        store,
        mailer,
    }
}

/// An approved payment for the given reference, as the gateway would report it.
pub fn approved_payment(payment_id: &str, reference: &str) -> PaymentRecord {
    PaymentRecord {
        id: payment_id.to_string(),
        status: "approved".to_string(),
        external_reference: Some(reference.to_string()),
        description: Some("Plan A".to_string()),
        payer: Payer {
            email: Some("cliente@x.com".to_string()),
            first_name: Some("Carla".to_string()),
            last_name: Some("Muñoz".to_string()),
            identification: Some(Identification {
                id_type: "RUT".to_string(),
                number: "12.345.678-5".to_string(),
            }),
        },
    }
}
