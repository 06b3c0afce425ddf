// GET handlers: root, version, ips

use axum::{Json, response::IntoResponse};
use serde::Serialize;

use crate::error::ApiError;
use crate::sysinfo_repo;
use crate::version::{NAME, VERSION};

#[derive(Debug, Serialize)]
pub(super) struct IpsResponse {
    ips: Vec<String>,
}

pub(super) async fn root_handler() -> &'static str {
    "pistats: POST /stats, GET /stats, GET /stats/latest"
}

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /ips — IPv4 addresses of the host's interfaces.
pub(super) async fn ips_handler() -> Result<Json<IpsResponse>, ApiError> {
    let ips = sysinfo_repo::local_ipv4_addresses().await?;
    Ok(Json(IpsResponse { ips }))
}
