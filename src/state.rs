use std::sync::Arc;

use crate::crypto::ContactCodec;
use crate::email::Mailer;
use crate::ledger::{BackupStore, PendingLedger};
use crate::payments::PaymentGateway;
use crate::sheets::RecordStore;

/// Shared application state. The ledger and backup store are the only
/// mutable pieces; everything else is configuration-shaped.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<PendingLedger>,
    pub backups: Arc<BackupStore>,
    pub codec: ContactCodec,
    pub gateway: Arc<dyn PaymentGateway>,
    pub records: Arc<dyn RecordStore>,
    pub mailer: Arc<dyn Mailer>,
    pub base_url: String,
}
