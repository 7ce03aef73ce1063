//! Filtered/paginated query construction for advanced community search
//!
//! Translates an optional filter set (authority type, population ceiling,
//! two score-band filters) plus ordering into a parameterized SQL statement
//! over `communities` joined with each community's latest `bareme` row.
//! Filter values are always bound, never interpolated; the sort column is
//! drawn from a compile-time allow-list. Input validation happens at the
//! HTTP boundary (serde rejects unknown enums) so the builder itself
//! assumes validated input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::score::Grade;
use crate::{Error, Result};

/// Local-authority type codes as used in the national registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommunityType {
    /// Commune
    Com,
    /// Department
    Dep,
    /// Region
    Reg,
    /// Communaute de communes
    Cc,
    /// Communaute d'agglomeration
    Ca,
    /// Communaute urbaine
    Cu,
    /// Metropole
    Met,
}

impl CommunityType {
    pub fn as_str(self) -> &'static str {
        match self {
            CommunityType::Com => "COM",
            CommunityType::Dep => "DEP",
            CommunityType::Reg => "REG",
            CommunityType::Cc => "CC",
            CommunityType::Ca => "CA",
            CommunityType::Cu => "CU",
            CommunityType::Met => "MET",
        }
    }
}

impl fmt::Display for CommunityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommunityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "COM" => Ok(CommunityType::Com),
            "DEP" => Ok(CommunityType::Dep),
            "REG" => Ok(CommunityType::Reg),
            "CC" => Ok(CommunityType::Cc),
            "CA" => Ok(CommunityType::Ca),
            "CU" => Ok(CommunityType::Cu),
            "MET" => Ok(CommunityType::Met),
            other => Err(Error::InvalidInput(format!("Unknown community type: {}", other))),
        }
    }
}

/// Sortable columns for community search (the ORDER BY allow-list)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Nom,
    Population,
    Type,
    MpScore,
    SubventionsScore,
}

impl SortKey {
    /// Qualified column name for the search statement
    fn column(self) -> &'static str {
        match self {
            SortKey::Nom => "c.nom",
            SortKey::Population => "c.population",
            SortKey::Type => "c.type",
            SortKey::MpScore => "c.mp_score",
            SortKey::SubventionsScore => "c.subventions_score",
        }
    }
}

/// Sort direction for community search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Advanced-search parameters as carried in the URL query string.
///
/// Every field is optional; absent filters impose no predicate. Unknown
/// enum values or non-numeric numbers are rejected by serde during
/// extraction, before this struct reaches the query builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Authority type filter (COM, DEP, REG, CC, CA, CU, MET)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub community_type: Option<CommunityType>,

    /// Inclusive population ceiling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<i64>,

    /// Exact procurement grade filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mp_score: Option<Grade>,

    /// Exact subsidy grade filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subventions_score: Option<Grade>,

    /// Page number (1-indexed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    /// Rows per page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,

    /// Sort column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by: Option<SortKey>,

    /// Sort direction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
}

impl SearchParams {
    /// Encode to a URL query string (lossless round trip with
    /// [`SearchParams::from_query_string`])
    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(self).unwrap_or_default()
    }

    /// Decode from a URL query string
    pub fn from_query_string(s: &str) -> Result<Self> {
        serde_urlencoded::from_str(s)
            .map_err(|e| Error::InvalidInput(format!("Invalid query string: {}", e)))
    }
}

/// A bound SQL parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
}

/// A parameterized search statement pair: the COUNT statement for
/// pagination and the page SELECT with trailing `LIMIT ? OFFSET ?`
/// placeholders. `binds` covers the WHERE predicates of both statements;
/// the executor appends the limit and offset binds to the SELECT.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub count_sql: String,
    pub select_sql: String,
    pub binds: Vec<SqlValue>,
}

const SEARCH_FROM: &str = "FROM communities c \
     LEFT JOIN bareme b ON b.siren = c.siren \
     AND b.annee = (SELECT MAX(annee) FROM bareme WHERE siren = c.siren)";

/// Build the WHERE predicates and bind values for a filter set.
///
/// Exactly one predicate per present filter, in declaration order.
pub fn predicates(params: &SearchParams) -> (Vec<&'static str>, Vec<SqlValue>) {
    let mut clauses = Vec::new();
    let mut binds = Vec::new();

    if let Some(t) = params.community_type {
        clauses.push("c.type = ?");
        binds.push(SqlValue::Text(t.as_str().to_string()));
    }
    if let Some(pop) = params.population {
        clauses.push("c.population <= ?");
        binds.push(SqlValue::Int(pop));
    }
    if let Some(g) = params.mp_score {
        clauses.push("c.mp_score = ?");
        binds.push(SqlValue::Text(g.as_str().to_string()));
    }
    if let Some(g) = params.subventions_score {
        clauses.push("c.subventions_score = ?");
        binds.push(SqlValue::Text(g.as_str().to_string()));
    }

    (clauses, binds)
}

/// Build the parameterized statement pair for a search.
pub fn build_search(params: &SearchParams) -> BuiltQuery {
    let (clauses, binds) = predicates(params);

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let by = params.by.unwrap_or(SortKey::Nom);
    let direction = params.direction.unwrap_or(SortDirection::Asc);

    let count_sql = format!("SELECT COUNT(*) {}{}", SEARCH_FROM, where_clause);
    let select_sql = format!(
        "SELECT c.siren, c.nom, c.type, c.population, c.code_postal, \
         c.mp_score, c.subventions_score, b.global_score, b.annee \
         {}{} ORDER BY {} {} LIMIT ? OFFSET ?",
        SEARCH_FROM,
        where_clause,
        by.column(),
        direction.sql(),
    );

    BuiltQuery {
        count_sql,
        select_sql,
        binds,
    }
}

/// Bind accumulated values onto a sqlx query
pub fn bind_values<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    binds: &'q [SqlValue],
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    for value in binds {
        query = match value {
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Int(i) => query.bind(*i),
        };
    }
    query
}

/// Bind accumulated values onto a sqlx scalar query
pub fn bind_scalar<'q, T>(
    mut query: sqlx::query::QueryScalar<'q, sqlx::Sqlite, T, sqlx::sqlite::SqliteArguments<'q>>,
    binds: &'q [SqlValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Sqlite, T, sqlx::sqlite::SqliteArguments<'q>> {
    for value in binds {
        query = match value {
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Int(i) => query.bind(*i),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filters_no_predicates() {
        let params = SearchParams::default();
        let (clauses, binds) = predicates(&params);
        assert!(clauses.is_empty());
        assert!(binds.is_empty());

        let built = build_search(&params);
        assert!(!built.count_sql.contains("WHERE"));
        assert!(built.select_sql.ends_with("LIMIT ? OFFSET ?"));
        assert!(built.select_sql.contains("ORDER BY c.nom ASC"));
    }

    #[test]
    fn test_type_and_population_predicates_exact() {
        let params = SearchParams {
            community_type: Some(CommunityType::Com),
            population: Some(5000),
            ..Default::default()
        };
        let (clauses, binds) = predicates(&params);
        assert_eq!(clauses, vec!["c.type = ?", "c.population <= ?"]);
        assert_eq!(
            binds,
            vec![SqlValue::Text("COM".to_string()), SqlValue::Int(5000)]
        );
    }

    #[test]
    fn test_score_filters_bound_as_letters() {
        let params = SearchParams {
            mp_score: Some(Grade::B),
            subventions_score: Some(Grade::E),
            ..Default::default()
        };
        let (clauses, binds) = predicates(&params);
        assert_eq!(clauses, vec!["c.mp_score = ?", "c.subventions_score = ?"]);
        assert_eq!(
            binds,
            vec![SqlValue::Text("B".to_string()), SqlValue::Text("E".to_string())]
        );
    }

    #[test]
    fn test_all_filters_join_with_and() {
        let params = SearchParams {
            community_type: Some(CommunityType::Dep),
            population: Some(100_000),
            mp_score: Some(Grade::A),
            subventions_score: Some(Grade::C),
            ..Default::default()
        };
        let built = build_search(&params);
        assert!(built.count_sql.contains(
            "WHERE c.type = ? AND c.population <= ? AND c.mp_score = ? AND c.subventions_score = ?"
        ));
        assert_eq!(built.binds.len(), 4);
        // COUNT statement carries no pagination clauses
        assert!(!built.count_sql.contains("LIMIT"));
    }

    #[test]
    fn test_sort_allow_list() {
        let params = SearchParams {
            by: Some(SortKey::Population),
            direction: Some(SortDirection::Desc),
            ..Default::default()
        };
        let built = build_search(&params);
        assert!(built.select_sql.contains("ORDER BY c.population DESC"));
    }

    #[test]
    fn test_unknown_sort_key_rejected_at_boundary() {
        // serde is the boundary: an out-of-list column never deserializes
        let err = SearchParams::from_query_string("by=siren;drop");
        assert!(err.is_err());
        let err = SearchParams::from_query_string("by=created_at");
        assert!(err.is_err());
    }

    #[test]
    fn test_malformed_population_rejected_at_boundary() {
        assert!(SearchParams::from_query_string("population=lots").is_err());
        assert!(SearchParams::from_query_string("type=VILLAGE").is_err());
        assert!(SearchParams::from_query_string("mp_score=F").is_err());
    }

    #[test]
    fn test_query_string_round_trip() {
        let params = SearchParams {
            community_type: Some(CommunityType::Com),
            population: Some(5000),
            mp_score: Some(Grade::A),
            subventions_score: None,
            page: Some(3),
            limit: Some(50),
            by: Some(SortKey::MpScore),
            direction: Some(SortDirection::Desc),
        };
        let encoded = params.to_query_string();
        let decoded = SearchParams::from_query_string(&encoded).unwrap();
        assert_eq!(decoded, params);
    }

    #[test]
    fn test_query_string_round_trip_empty() {
        let params = SearchParams::default();
        let encoded = params.to_query_string();
        assert!(encoded.is_empty());
        let decoded = SearchParams::from_query_string(&encoded).unwrap();
        assert_eq!(decoded, params);
    }

    #[test]
    fn test_query_string_decode() {
        let decoded =
            SearchParams::from_query_string("type=COM&population=5000&by=nom&direction=asc")
                .unwrap();
        assert_eq!(decoded.community_type, Some(CommunityType::Com));
        assert_eq!(decoded.population, Some(5000));
        assert_eq!(decoded.by, Some(SortKey::Nom));
        assert_eq!(decoded.direction, Some(SortDirection::Asc));
    }

    #[test]
    fn test_community_type_parse() {
        assert_eq!("MET".parse::<CommunityType>().unwrap(), CommunityType::Met);
        assert!("commune".parse::<CommunityType>().is_err());
    }
}
