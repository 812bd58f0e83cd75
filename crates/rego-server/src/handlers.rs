//! HTTP handlers

use axum::extract::{Query, State};
use axum::Json;
use rego_core::{Plate, VehicleRecord};
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::state::AppState;

/// Query string of the lookup endpoint
#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    /// Plate number to look up
    pub rego: Option<String>,
}

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// `GET /?rego=<plate>`
///
/// Validation runs before the engine is touched, so a rejected plate
/// never opens a browser.
pub async fn lookup(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<VehicleRecord>> {
    let plate = Plate::parse(query.rego.as_deref())?;
    debug!("Lookup request for {}", plate);

    let record = state.engine.lookup(&plate).await?;
    Ok(Json(record))
}
