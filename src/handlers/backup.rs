use axum::extract::{Path, State};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// One-time backup view: the attestation text cached at fulfillment time.
/// Not found covers expired, already lost to a restart, or never created.
pub async fn backup_view(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<String> {
    state
        .backups
        .get(&reference)
        .ok_or_else(|| AppError::NotFound(format!("No backup entry for reference {}", reference)))
}
