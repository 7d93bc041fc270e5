use crate::domain::services::auth::Claims;
use crate::error::AppError;

/// Authorization is `(claims, action, target) -> permit | deny` with one
/// absolute rule: cross-tenant access is always denied, regardless of role.

pub fn require_same_tenant(claims: &Claims, tenant_id: &str) -> Result<(), AppError> {
    if claims.tenant_id != tenant_id {
        return Err(AppError::Forbidden("Access to another tenant is not allowed".into()));
    }
    Ok(())
}

pub fn require_admin(claims: &Claims) -> Result<(), AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden("Administrator role required".into()));
    }
    Ok(())
}

pub fn require_admin_of(claims: &Claims, tenant_id: &str) -> Result<(), AppError> {
    require_same_tenant(claims, tenant_id)?;
    require_admin(claims)
}

/// Admins of the tenant, or the user themselves.
pub fn require_self_or_admin(claims: &Claims, tenant_id: &str, user_id: &str) -> Result<(), AppError> {
    require_same_tenant(claims, tenant_id)?;
    if claims.is_admin() || claims.sub == user_id {
        return Ok(());
    }
    Err(AppError::Forbidden("Not allowed to act on another user".into()))
}
