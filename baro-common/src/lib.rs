//! # Barometre Common Library
//!
//! Shared code for the Barometre services including:
//! - Database schema, models and initialization
//! - Transparency grade computation
//! - Filtered community-search query builder
//! - Pagination helpers
//! - Interpellation message composition
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod letter;
pub mod pagination;
pub mod query;
pub mod score;
pub mod siren;

pub use error::{Error, Result};
pub use score::Grade;
