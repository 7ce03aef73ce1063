//! Rankings: best and worst scored communities
//!
//! Candidates are communities whose latest scorecard yields a global
//! grade. The grade itself may be derived, so ordering happens in Rust
//! after the fetch rather than in SQL.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::Row;

use baro_common::query::CommunityType;
use baro_common::score::{global_grade_opt, Grade};

use crate::AppState;

/// Default and maximum entries per ranking side
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 50;

/// Query parameters for rankings
#[derive(Debug, Deserialize)]
pub struct PalmaresQuery {
    /// Restrict the ranking to one authority type
    #[serde(rename = "type")]
    pub community_type: Option<CommunityType>,

    /// Entries per side
    pub limit: Option<i64>,
}

/// One ranked community
#[derive(Debug, Clone, Serialize)]
pub struct PalmaresEntry {
    pub siren: String,
    pub nom: String,
    #[serde(rename = "type")]
    pub community_type: String,
    pub population: Option<i64>,
    pub mp_score: Option<String>,
    pub subventions_score: Option<String>,
    pub global_score: String,
}

/// Ranking response
#[derive(Debug, Serialize)]
pub struct PalmaresResponse {
    pub best: Vec<PalmaresEntry>,
    pub worst: Vec<PalmaresEntry>,
}

/// GET /api/palmares
pub async fn get_palmares(
    State(state): State<AppState>,
    Query(query): Query<PalmaresQuery>,
) -> Result<Json<PalmaresResponse>, PalmaresError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT) as usize;

    // Only communities with both axis scores published can be ranked
    let sql = if query.community_type.is_some() {
        "SELECT siren, nom, type, population, mp_score, subventions_score
         FROM communities
         WHERE mp_score IS NOT NULL AND subventions_score IS NOT NULL AND type = ?"
    } else {
        "SELECT siren, nom, type, population, mp_score, subventions_score
         FROM communities
         WHERE mp_score IS NOT NULL AND subventions_score IS NOT NULL"
    };

    let mut q = sqlx::query(sql);
    if let Some(t) = query.community_type {
        q = q.bind(t.as_str());
    }
    let rows = q
        .fetch_all(&state.db)
        .await
        .map_err(|e| PalmaresError::DatabaseError(e.to_string()))?;

    let mut ranked: Vec<(Grade, PalmaresEntry)> = rows
        .iter()
        .filter_map(|row| {
            let mp_score: Option<String> = row.get(4);
            let subventions_score: Option<String> = row.get(5);
            let mp = mp_score.as_deref().and_then(|s| s.parse::<Grade>().ok());
            let sub = subventions_score
                .as_deref()
                .and_then(|s| s.parse::<Grade>().ok());
            let global = global_grade_opt(mp, sub)?;
            Some((
                global,
                PalmaresEntry {
                    siren: row.get(0),
                    nom: row.get(1),
                    community_type: row.get(2),
                    population: row.get(3),
                    mp_score,
                    subventions_score,
                    global_score: global.to_string(),
                },
            ))
        })
        .collect();

    // Stable tie-break on name keeps the ranking deterministic
    ranked.sort_by(|(ga, ea), (gb, eb)| ga.rank().cmp(&gb.rank()).then(ea.nom.cmp(&eb.nom)));

    let best: Vec<PalmaresEntry> = ranked.iter().take(limit).map(|(_, e)| e.clone()).collect();
    let worst: Vec<PalmaresEntry> = ranked
        .iter()
        .rev()
        .take(limit)
        .map(|(_, e)| e.clone())
        .collect();

    Ok(Json(PalmaresResponse { best, worst }))
}

/// Ranking errors
#[derive(Debug)]
pub enum PalmaresError {
    DatabaseError(String),
}

impl IntoResponse for PalmaresError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            PalmaresError::DatabaseError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
