//! Shared error type for the barometre crates
//!
//! The API handlers wrap their failures in per-endpoint enums with HTTP
//! mappings; this type covers the library crate itself. Only the
//! failure modes the library actually hits have variants: database
//! access, filesystem work during root-folder setup, and input
//! validation at the parsing boundaries (SIREN, grades, query strings).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rejected caller input: malformed SIREN, unknown grade letter,
    /// undeserializable query string.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
