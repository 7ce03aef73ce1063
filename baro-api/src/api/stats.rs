//! Per-community yearly aggregates feeding the front-end charts

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use sqlx::Row;

use baro_common::siren::validate_siren;

use crate::AppState;

/// One year's aggregate for one dataset
#[derive(Debug, Serialize)]
pub struct YearStat {
    pub annee: i64,
    pub count: i64,
    pub total_montant: f64,
}

/// Community statistics response
#[derive(Debug, Serialize)]
pub struct CommunityStatsResponse {
    pub siren: String,
    pub marches: Vec<YearStat>,
    pub subventions: Vec<YearStat>,
}

/// GET /api/communities/:siren/stats
///
/// Row count and total amount per year, for both datasets.
pub async fn get_community_stats(
    State(state): State<AppState>,
    Path(siren): Path<String>,
) -> Result<Json<CommunityStatsResponse>, StatsError> {
    validate_siren(&siren).map_err(|_| StatsError::InvalidSiren(siren.clone()))?;

    let marches = fetch_year_stats(
        &state,
        "SELECT annee_notification AS annee, COUNT(*), COALESCE(SUM(montant), 0)
         FROM marches_publics
         WHERE acheteur_siren = ?
         GROUP BY annee_notification
         ORDER BY annee_notification ASC",
        &siren,
    )
    .await?;

    let subventions = fetch_year_stats(
        &state,
        "SELECT annee, COUNT(*), COALESCE(SUM(montant), 0)
         FROM subventions
         WHERE attribuant_siren = ?
         GROUP BY annee
         ORDER BY annee ASC",
        &siren,
    )
    .await?;

    Ok(Json(CommunityStatsResponse {
        siren,
        marches,
        subventions,
    }))
}

async fn fetch_year_stats(
    state: &AppState,
    sql: &str,
    siren: &str,
) -> Result<Vec<YearStat>, StatsError> {
    let rows = sqlx::query(sql)
        .bind(siren)
        .fetch_all(&state.db)
        .await
        .map_err(|e| StatsError::DatabaseError(e.to_string()))?;

    Ok(rows
        .iter()
        .map(|row| YearStat {
            annee: row.get(0),
            count: row.get(1),
            total_montant: row.get(2),
        })
        .collect())
}

/// Statistics errors
#[derive(Debug)]
pub enum StatsError {
    InvalidSiren(String),
    DatabaseError(String),
}

impl IntoResponse for StatsError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            StatsError::InvalidSiren(siren) => {
                (StatusCode::BAD_REQUEST, format!("Invalid SIREN: {}", siren))
            }
            StatsError::DatabaseError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
