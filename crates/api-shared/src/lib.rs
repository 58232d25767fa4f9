//! Wire types shared between the REST API, the core repositories and the CLI.
//!
//! Row-shaped types derive `sqlx::FromRow` so repositories can return them
//! directly; everything derives serde and `utoipa::ToSchema` so the REST
//! layer can serialize them and list them in the OpenAPI document. JSON uses
//! camelCase field names to match the SPA.

pub mod health;
pub mod models;
pub mod requests;

pub use health::HealthRes;
