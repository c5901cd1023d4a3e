//! Trustful role/action table.

use crate::WebResult;
use crate::error::AppError;
use axum::{Json, extract::Path};
use regaccess_core::trustful::{Role, TrustfulAction};
use serde::Serialize;

/// Actions offered to a role.
#[derive(Debug, Serialize)]
pub struct RoleActionsResponse {
    /// Normalized role name
    pub role: Role,
    /// Allowed actions, in menu order
    pub actions: Vec<TrustfulAction>,
}

/// `GET /api/trustful/roles/:role/actions`
///
/// ```bash
/// curl http://localhost:8080/api/trustful/roles/manager/actions
/// # {"role":"MANAGER","actions":["checkInVillager",...]}
/// ```
///
/// # Errors
///
/// 404 for an unknown role.
#[allow(clippy::unused_async)]
pub async fn role_actions(Path(role): Path<String>) -> WebResult<Json<RoleActionsResponse>> {
    let role: Role = role
        .parse()
        .map_err(|_| AppError::not_found("Role", &role))?;

    Ok(Json(RoleActionsResponse {
        role,
        actions: role.allowed_actions(),
    }))
}
