use crate::domain::services::auth::Claims;
use crate::error::AppError;
use crate::state::AuthServiceRef;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::Span;

/// Validated bearer claims. Handlers take this as an argument to require
/// authentication.
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthServiceRef: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AppError::Unauthorized)?
            .to_str()
            .map_err(|_| AppError::Unauthorized)?;

        let token = header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;

        let auth = <AuthServiceRef as FromRef<S>>::from_ref(state).0;
        let claims = auth.verify(token)?;

        Span::current().record("tenant_id", claims.tenant_id.as_str());
        Span::current().record("user_id", claims.sub.as_str());

        Ok(AuthUser(claims))
    }
}
