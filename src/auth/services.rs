use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::{jwt::JwtKeys, password::meets_policy},
    error::ApiError,
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Shape checks shared by signup and signin.
pub(crate) fn validate_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    if !is_valid_email(email) || !meets_policy(password) {
        return Err(ApiError::BadRequest("Invalid request body".into()));
    }
    Ok(())
}

/// Tokens handed out on a successful signup or signin.
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs a fresh token pair and makes the refresh token the user's only live one.
pub async fn issue_session(state: &AppState, user_id: Uuid) -> anyhow::Result<Session> {
    let keys = JwtKeys::from_ref(state);
    let refresh_token = keys.sign_refresh(user_id)?;
    state
        .users
        .set_refresh_token(user_id, Some(&refresh_token))
        .await?;
    let access_token = keys.sign_access(user_id)?;
    debug!(user_id = %user_id, "session issued");
    Ok(Session {
        access_token,
        refresh_token,
    })
}
