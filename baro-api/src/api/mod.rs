//! HTTP API handlers for baro-api

pub mod communities;
pub mod community;
pub mod health;
pub mod interpellation;
pub mod palmares;
pub mod records;
pub mod stats;
pub mod suggest;

pub use communities::search_communities;
pub use community::get_community;
pub use health::health_check;
pub use interpellation::get_interpellation;
pub use palmares::get_palmares;
pub use records::{get_marches, get_subventions};
pub use stats::get_community_stats;
pub use suggest::suggest_communities;
