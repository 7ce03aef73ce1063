//! Single-community detail with full scorecard history

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use baro_common::db::models::{BaremeEntry, Community};
use baro_common::siren::validate_siren;

use crate::AppState;

/// One scorecard year as served to the front end. Grades are letters or
/// null ("not communicated") - never fabricated.
#[derive(Debug, Serialize)]
pub struct BaremeYear {
    pub annee: i64,
    pub mp_score: Option<String>,
    pub subventions_score: Option<String>,
    pub global_score: Option<String>,
}

impl From<&BaremeEntry> for BaremeYear {
    fn from(entry: &BaremeEntry) -> Self {
        BaremeYear {
            annee: entry.annee,
            mp_score: entry.effective_mp_grade().map(|g| g.to_string()),
            subventions_score: entry.effective_subventions_grade().map(|g| g.to_string()),
            global_score: entry.effective_global_grade().map(|g| g.to_string()),
        }
    }
}

/// Community detail response
#[derive(Debug, Serialize)]
pub struct CommunityDetailResponse {
    #[serde(flatten)]
    pub community: Community,
    /// Scorecard history, newest year first
    pub bareme: Vec<BaremeYear>,
}

/// GET /api/communities/:siren
pub async fn get_community(
    State(state): State<AppState>,
    Path(siren): Path<String>,
) -> Result<Json<CommunityDetailResponse>, CommunityError> {
    validate_siren(&siren).map_err(|_| CommunityError::InvalidSiren(siren.clone()))?;

    let community = sqlx::query_as::<_, Community>("SELECT * FROM communities WHERE siren = ?")
        .bind(&siren)
        .fetch_optional(&state.db)
        .await
        .map_err(|e| CommunityError::DatabaseError(e.to_string()))?
        .ok_or_else(|| CommunityError::NotFound(siren.clone()))?;

    let entries =
        sqlx::query_as::<_, BaremeEntry>("SELECT * FROM bareme WHERE siren = ? ORDER BY annee DESC")
            .bind(&siren)
            .fetch_all(&state.db)
            .await
            .map_err(|e| CommunityError::DatabaseError(e.to_string()))?;

    let bareme = entries.iter().map(BaremeYear::from).collect();

    Ok(Json(CommunityDetailResponse { community, bareme }))
}

/// Community detail errors
#[derive(Debug)]
pub enum CommunityError {
    InvalidSiren(String),
    NotFound(String),
    DatabaseError(String),
}

impl IntoResponse for CommunityError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            CommunityError::InvalidSiren(siren) => {
                (StatusCode::BAD_REQUEST, format!("Invalid SIREN: {}", siren))
            }
            CommunityError::NotFound(siren) => {
                (StatusCode::NOT_FOUND, format!("Unknown community: {}", siren))
            }
            CommunityError::DatabaseError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
