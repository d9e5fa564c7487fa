use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        claims::Identity,
        cookie::{access_cookie, clear_access_cookie},
        dto::{CredentialsRequest, PublicUser, UserResponse},
        extractors::AuthUser,
        password::{hash_password, verify_password},
        repo::User,
    },
    error::AppError,
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/logout", post(logout))
        .route("/users/me", get(get_me))
}

/// Sign a token for `user` and attach it to the jar.
fn issue_cookie(state: &AppState, jar: CookieJar, user: &User) -> Result<CookieJar, AppError> {
    let keys = &state.jwt;
    let token = keys.sign(&Identity {
        id: user.id,
        email: user.email.clone(),
    })?;
    Ok(jar.add(access_cookie(token, keys.ttl, state.config.cookie_secure)))
}

fn public(user: User) -> Json<UserResponse> {
    Json(UserResponse {
        data: PublicUser {
            id: user.id,
            email: user.email,
        },
    })
}

#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<CredentialsRequest>,
) -> Result<(StatusCode, CookieJar, Json<UserResponse>), AppError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::BadRequest("Invalid email".into()));
    }

    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::BadRequest("Password too short".into()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.email, &hash).await?;
    let jar = issue_cookie(&state, jar, &user)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, jar, public(user)))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<CredentialsRequest>,
) -> Result<(CookieJar, Json<UserResponse>), AppError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::BadRequest("Invalid email".into()));
    }

    let Some(user) = User::find_by_email(&state.db, &payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let jar = issue_cookie(&state, jar, &user)?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((jar, public(user)))
}

#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    (
        jar.add(clear_access_cookie()),
        Json(serde_json::json!({ "message": "Logged out" })),
    )
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = User::find_by_id(&state.db, identity.id)
        .await?
        .ok_or_else(|| {
            warn!(user_id = %identity.id, "token refers to missing user");
            AppError::Unauthenticated("User not found".into())
        })?;
    Ok(public(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("admin1@example.com"));
        assert!(!is_valid_email("admin1example.com"));
        assert!(!is_valid_email("admin 1@example.com"));
        assert!(!is_valid_email("admin1@localhost"));
    }

    #[test]
    fn user_response_hides_password() {
        let user = User {
            id: uuid::Uuid::new_v4(),
            email: "test@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
        };
        let json = serde_json::to_string(&public(user).0).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(!json.contains("argon2"));
    }
}
