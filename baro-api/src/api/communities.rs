//! Advanced community search with filters, sorting and pagination
//!
//! Thin HTTP shell over the query builder in `baro_common::query`:
//! filters arrive pre-validated (serde rejects unknown enum values with
//! a 400 before the handler runs), the builder produces the
//! parameterized statement pair, and this handler executes both and
//! shapes the JSON.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::Row;

use baro_common::pagination::{calculate_pagination, clamp_page_size};
use baro_common::query::{bind_scalar, bind_values, build_search, SearchParams};
use baro_common::score::{global_grade_opt, Grade};

use crate::AppState;

/// One community row in the search results
#[derive(Debug, Serialize, Deserialize)]
pub struct CommunityRow {
    pub siren: String,
    pub nom: String,
    #[serde(rename = "type")]
    pub community_type: String,
    pub population: Option<i64>,
    pub code_postal: Option<String>,
    pub mp_score: Option<String>,
    pub subventions_score: Option<String>,
    pub global_score: Option<String>,
    /// Year of the latest published scorecard, if any
    pub annee: Option<i64>,
}

/// Search response with rows and pagination metadata
#[derive(Debug, Serialize)]
pub struct CommunitySearchResponse {
    pub total_row_count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub communities: Vec<CommunityRow>,
}

/// GET /api/communities
///
/// Query params: `type`, `population`, `mp_score`, `subventions_score`,
/// `page`, `limit`, `by`, `direction` - all optional.
pub async fn search_communities(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<CommunitySearchResponse>, CommunitiesError> {
    let built = build_search(&params);

    // Total count first: pagination clamping needs it
    let total_row_count: i64 = bind_scalar(sqlx::query_scalar(&built.count_sql), &built.binds)
        .fetch_one(&state.db)
        .await
        .map_err(|e| CommunitiesError::DatabaseError(e.to_string()))?;

    let page_size = clamp_page_size(params.limit);
    let p = calculate_pagination(total_row_count, params.page.unwrap_or(1), page_size);

    let rows = bind_values(sqlx::query(&built.select_sql), &built.binds)
        .bind(p.page_size)
        .bind(p.offset)
        .fetch_all(&state.db)
        .await
        .map_err(|e| CommunitiesError::DatabaseError(e.to_string()))?;

    let communities = rows
        .iter()
        .map(|row| {
            let mp_score: Option<String> = row.get(5);
            let subventions_score: Option<String> = row.get(6);
            let stored_global: Option<String> = row.get(7);
            // Derive the global grade when the scorecard does not carry one
            let global_score = stored_global.or_else(|| {
                let mp = mp_score.as_deref().and_then(|s| s.parse::<Grade>().ok());
                let sub = subventions_score
                    .as_deref()
                    .and_then(|s| s.parse::<Grade>().ok());
                global_grade_opt(mp, sub).map(|g| g.to_string())
            });

            CommunityRow {
                siren: row.get(0),
                nom: row.get(1),
                community_type: row.get(2),
                population: row.get(3),
                code_postal: row.get(4),
                mp_score,
                subventions_score,
                global_score,
                annee: row.get(8),
            }
        })
        .collect();

    Ok(Json(CommunitySearchResponse {
        total_row_count,
        page: p.page,
        page_size: p.page_size,
        total_pages: p.total_pages,
        communities,
    }))
}

/// Community search errors
#[derive(Debug)]
pub enum CommunitiesError {
    DatabaseError(String),
}

impl IntoResponse for CommunitiesError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            CommunitiesError::DatabaseError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
