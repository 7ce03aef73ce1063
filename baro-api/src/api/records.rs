//! Per-community procurement and subsidy record lists
//!
//! Both endpoints share the same shape: optional year filter,
//! pagination, newest and largest first.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use baro_common::db::models::{MarchePublic, Subvention};
use baro_common::pagination::{calculate_pagination, clamp_page_size};
use baro_common::siren::validate_siren;

use crate::AppState;

/// Query parameters for record lists
#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    /// Restrict to one year (notification year for marches)
    pub annee: Option<i64>,

    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,

    /// Rows per page
    pub limit: Option<i64>,
}

fn default_page() -> i64 {
    1
}

/// Record list response, generic over the row type
#[derive(Debug, Serialize)]
pub struct RecordsResponse<T> {
    pub siren: String,
    pub total_row_count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub rows: Vec<T>,
}

/// GET /api/communities/:siren/marches
pub async fn get_marches(
    State(state): State<AppState>,
    Path(siren): Path<String>,
    Query(query): Query<RecordsQuery>,
) -> Result<Json<RecordsResponse<MarchePublic>>, RecordsError> {
    validate_siren(&siren).map_err(|_| RecordsError::InvalidSiren(siren.clone()))?;

    let (count_sql, select_sql) = if query.annee.is_some() {
        (
            "SELECT COUNT(*) FROM marches_publics
             WHERE acheteur_siren = ? AND annee_notification = ?",
            "SELECT * FROM marches_publics
             WHERE acheteur_siren = ? AND annee_notification = ?
             ORDER BY annee_notification DESC, montant DESC
             LIMIT ? OFFSET ?",
        )
    } else {
        (
            "SELECT COUNT(*) FROM marches_publics WHERE acheteur_siren = ?",
            "SELECT * FROM marches_publics
             WHERE acheteur_siren = ?
             ORDER BY annee_notification DESC, montant DESC
             LIMIT ? OFFSET ?",
        )
    };

    let mut count = sqlx::query_scalar::<_, i64>(count_sql).bind(&siren);
    if let Some(annee) = query.annee {
        count = count.bind(annee);
    }
    let total_row_count = count
        .fetch_one(&state.db)
        .await
        .map_err(|e| RecordsError::DatabaseError(e.to_string()))?;

    let p = calculate_pagination(total_row_count, query.page, clamp_page_size(query.limit));

    let mut select = sqlx::query_as::<_, MarchePublic>(select_sql).bind(&siren);
    if let Some(annee) = query.annee {
        select = select.bind(annee);
    }
    let rows = select
        .bind(p.page_size)
        .bind(p.offset)
        .fetch_all(&state.db)
        .await
        .map_err(|e| RecordsError::DatabaseError(e.to_string()))?;

    Ok(Json(RecordsResponse {
        siren,
        total_row_count,
        page: p.page,
        page_size: p.page_size,
        total_pages: p.total_pages,
        rows,
    }))
}

/// GET /api/communities/:siren/subventions
pub async fn get_subventions(
    State(state): State<AppState>,
    Path(siren): Path<String>,
    Query(query): Query<RecordsQuery>,
) -> Result<Json<RecordsResponse<Subvention>>, RecordsError> {
    validate_siren(&siren).map_err(|_| RecordsError::InvalidSiren(siren.clone()))?;

    let (count_sql, select_sql) = if query.annee.is_some() {
        (
            "SELECT COUNT(*) FROM subventions WHERE attribuant_siren = ? AND annee = ?",
            "SELECT * FROM subventions
             WHERE attribuant_siren = ? AND annee = ?
             ORDER BY annee DESC, montant DESC
             LIMIT ? OFFSET ?",
        )
    } else {
        (
            "SELECT COUNT(*) FROM subventions WHERE attribuant_siren = ?",
            "SELECT * FROM subventions
             WHERE attribuant_siren = ?
             ORDER BY annee DESC, montant DESC
             LIMIT ? OFFSET ?",
        )
    };

    let mut count = sqlx::query_scalar::<_, i64>(count_sql).bind(&siren);
    if let Some(annee) = query.annee {
        count = count.bind(annee);
    }
    let total_row_count = count
        .fetch_one(&state.db)
        .await
        .map_err(|e| RecordsError::DatabaseError(e.to_string()))?;

    let p = calculate_pagination(total_row_count, query.page, clamp_page_size(query.limit));

    let mut select = sqlx::query_as::<_, Subvention>(select_sql).bind(&siren);
    if let Some(annee) = query.annee {
        select = select.bind(annee);
    }
    let rows = select
        .bind(p.page_size)
        .bind(p.offset)
        .fetch_all(&state.db)
        .await
        .map_err(|e| RecordsError::DatabaseError(e.to_string()))?;

    Ok(Json(RecordsResponse {
        siren,
        total_row_count,
        page: p.page,
        page_size: p.page_size,
        total_pages: p.total_pages,
        rows,
    }))
}

/// Record list errors
#[derive(Debug)]
pub enum RecordsError {
    InvalidSiren(String),
    DatabaseError(String),
}

impl IntoResponse for RecordsError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            RecordsError::InvalidSiren(siren) => {
                (StatusCode::BAD_REQUEST, format!("Invalid SIREN: {}", siren))
            }
            RecordsError::DatabaseError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
