//! Client profile routes
//!
//! Lookup and partial-update endpoints keyed by email.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::app::AppState;
use crate::domain::profiles::UpdateClientProfileRequest;
use crate::error::ApiError;

/// GET /api/v1/profiles/:email
///
/// Fetch a client profile by email.
pub async fn get_client_profile(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.profiles.get_profile(&email).await?;

    Ok(Json(profile))
}

/// PUT /api/v1/profiles/:email
///
/// Apply a partial update to a client profile. Fields omitted from the
/// body keep their stored values.
pub async fn update_client_profile(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
    Json(request): Json<UpdateClientProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.profiles.update_profile(&email, request).await?;

    Ok(Json(profile))
}
