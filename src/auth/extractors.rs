use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use super::{claims::Identity, cookie::ACCESS_TOKEN_COOKIE, jwt::JwtKeys};
use crate::error::AppError;

/// Verified caller identity taken from the `access_token` cookie.
///
/// Handlers that take this extractor only run for authenticated requests; it
/// must come before any body extractor so rejected requests never reach
/// validation or storage.
pub struct AuthUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<JwtKeys>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(ACCESS_TOKEN_COOKIE)
            .map(|c| c.value().to_owned())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Unauthenticated("Authentication required".into()))?;

        let keys = Arc::<JwtKeys>::from_ref(state);
        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::InvalidToken(e)
        })?;

        Ok(AuthUser(claims.identity()))
    }
}
