use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

impl HealthRes {
    /// Standard healthy response.
    pub fn alive() -> Self {
        Self {
            ok: true,
            message: "OPX is alive".into(),
        }
    }
}
