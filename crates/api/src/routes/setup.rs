//! Idempotent bootstrap handler.

use axum::extract::State;
use axum::response::Response;

use crate::error::Result;
use crate::response;
use crate::services::bootstrap::BootstrapService;
use crate::state::AppState;

/// `POST /setup`
///
/// Safe to call repeatedly: reference data is upserted, the admin account
/// is created only when missing, and the catalog seed import runs only
/// while the items table is empty.
pub async fn run(State(state): State<AppState>) -> Result<Response> {
    let report = BootstrapService::new(state.pool(), state.tokens(), state.config())
        .run()
        .await?;

    Ok(response::success(report))
}
