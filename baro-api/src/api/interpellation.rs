//! Interpellation endpoint: pre-formatted citizen-outreach messages
//!
//! The front end renders this payload into a contact form or a PDF
//! letter; the wording itself is composed server-side from the
//! community's latest scorecard.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use baro_common::db::models::{BaremeEntry, Community, Elu};
use baro_common::letter::compose;
use baro_common::siren::validate_siren;

use crate::AppState;

/// Interpellation message response
#[derive(Debug, Serialize)]
pub struct InterpellationResponse {
    pub siren: String,
    pub nom: String,
    /// Latest global grade the message refers to, if any
    pub global_score: Option<String>,
    pub subject: String,
    pub body: String,
    /// Elected officials to address the message to
    pub recipients: Vec<Elu>,
}

/// GET /api/interpellation/:siren
pub async fn get_interpellation(
    State(state): State<AppState>,
    Path(siren): Path<String>,
) -> Result<Json<InterpellationResponse>, InterpellationError> {
    validate_siren(&siren).map_err(|_| InterpellationError::InvalidSiren(siren.clone()))?;

    let community = sqlx::query_as::<_, Community>("SELECT * FROM communities WHERE siren = ?")
        .bind(&siren)
        .fetch_optional(&state.db)
        .await
        .map_err(|e| InterpellationError::DatabaseError(e.to_string()))?
        .ok_or_else(|| InterpellationError::NotFound(siren.clone()))?;

    // Latest scorecard drives the wording
    let latest = sqlx::query_as::<_, BaremeEntry>(
        "SELECT * FROM bareme WHERE siren = ? ORDER BY annee DESC LIMIT 1",
    )
    .bind(&siren)
    .fetch_optional(&state.db)
    .await
    .map_err(|e| InterpellationError::DatabaseError(e.to_string()))?;

    let global = latest.as_ref().and_then(|e| e.effective_global_grade());
    let annee = latest.as_ref().map(|e| e.annee);

    let letter = compose(&community.nom, global, annee);

    let recipients = sqlx::query_as::<_, Elu>(
        "SELECT * FROM elus WHERE siren = ? ORDER BY fonction ASC, nom ASC",
    )
    .bind(&siren)
    .fetch_all(&state.db)
    .await
    .map_err(|e| InterpellationError::DatabaseError(e.to_string()))?;

    Ok(Json(InterpellationResponse {
        siren,
        nom: community.nom,
        global_score: global.map(|g| g.to_string()),
        subject: letter.subject,
        body: letter.body,
        recipients,
    }))
}

/// Interpellation errors
#[derive(Debug)]
pub enum InterpellationError {
    InvalidSiren(String),
    NotFound(String),
    DatabaseError(String),
}

impl IntoResponse for InterpellationError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            InterpellationError::InvalidSiren(siren) => {
                (StatusCode::BAD_REQUEST, format!("Invalid SIREN: {}", siren))
            }
            InterpellationError::NotFound(siren) => {
                (StatusCode::NOT_FOUND, format!("Unknown community: {}", siren))
            }
            InterpellationError::DatabaseError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
