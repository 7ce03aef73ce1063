//! Name autocomplete for the search box

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::Row;

use crate::AppState;

/// Longest accepted query; commune names never come close
const MAX_QUERY_LEN: usize = 100;

/// Result rows per suggestion query
const SUGGESTION_LIMIT: i64 = 10;

/// Query parameters for autocomplete
#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    /// Name prefix typed so far
    pub q: String,
}

/// One autocomplete suggestion
#[derive(Debug, Serialize)]
pub struct Suggestion {
    pub siren: String,
    pub nom: String,
    #[serde(rename = "type")]
    pub community_type: String,
    pub population: Option<i64>,
}

/// Suggestion response
#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub query: String,
    pub suggestions: Vec<Suggestion>,
}

/// GET /api/suggest?q=prefix
///
/// Case-insensitive prefix match on community names, most populous
/// first, at most 10 rows.
pub async fn suggest_communities(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<SuggestResponse>, SuggestError> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(SuggestError::EmptyQuery);
    }
    if q.len() > MAX_QUERY_LEN {
        return Err(SuggestError::QueryTooLong);
    }

    // The prefix is data, not a pattern: escape LIKE wildcards. SQLite
    // LIKE only folds ASCII case, so the match runs against
    // nom_recherche, the lowercased copy of nom, with the query folded
    // the same way ("évry" has to reach "Évry-Courcouronnes").
    let pattern = format!("{}%", escape_like(&q.to_lowercase()));

    let rows = sqlx::query(
        "SELECT siren, nom, type, population
         FROM communities
         WHERE nom_recherche LIKE ? ESCAPE '\\'
         ORDER BY population DESC, nom ASC
         LIMIT ?",
    )
    .bind(&pattern)
    .bind(SUGGESTION_LIMIT)
    .fetch_all(&state.db)
    .await
    .map_err(|e| SuggestError::DatabaseError(e.to_string()))?;

    let suggestions = rows
        .iter()
        .map(|row| Suggestion {
            siren: row.get(0),
            nom: row.get(1),
            community_type: row.get(2),
            population: row.get(3),
        })
        .collect();

    Ok(Json(SuggestResponse {
        query: q.to_string(),
        suggestions,
    }))
}

/// Escape SQL LIKE wildcards in user input
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Autocomplete errors
#[derive(Debug)]
pub enum SuggestError {
    EmptyQuery,
    QueryTooLong,
    DatabaseError(String),
}

impl IntoResponse for SuggestError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            SuggestError::EmptyQuery => {
                (StatusCode::BAD_REQUEST, "Empty suggestion query".to_string())
            }
            SuggestError::QueryTooLong => {
                (StatusCode::BAD_REQUEST, "Suggestion query too long".to_string())
            }
            SuggestError::DatabaseError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
