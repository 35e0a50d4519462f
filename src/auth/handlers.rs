use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::{header, HeaderMap, HeaderName},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        cookie::{cleared_refresh_cookie, get_cookie, refresh_cookie, REFRESH_COOKIE_NAME},
        dto::{MessageResponse, PublicUser, SigninRequest, SignupRequest, TokenResponse},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        services::{issue_session, normalize_email, validate_credentials},
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

type WithCookie<T> = ([(HeaderName, String); 1], Json<T>);

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/user/signup", post(signup))
        .route("/user/signin", post(signin))
        .route("/user/signout", post(signout))
        .route("/user/refresh", get(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn session_response(state: &AppState, access_token: String, refresh_token: &str) -> WithCookie<TokenResponse> {
    let cfg = &state.config;
    let cookie = refresh_cookie(refresh_token, cfg.jwt.refresh_ttl_seconds, cfg.cookie_secure);
    (
        [(header::SET_COOKIE, cookie)],
        Json(TokenResponse { jwt: access_token }),
    )
}

#[instrument(skip(state, body))]
pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<WithCookie<TokenResponse>> {
    let Json(payload) = body?;
    let email = normalize_email(&payload.email);
    validate_credentials(&email, &payload.password)?;
    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let hash = hash_password(&payload.password)?;
    let Some(user) = state.users.create_user(&email, name, &hash).await? else {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    };

    let session = issue_session(&state, user.id).await?;
    info!(user_id = %user.id, "user signed up");
    Ok(session_response(&state, session.access_token, &session.refresh_token))
}

#[instrument(skip(state, body))]
pub async fn signin(
    State(state): State<AppState>,
    body: Result<Json<SigninRequest>, JsonRejection>,
) -> ApiResult<WithCookie<TokenResponse>> {
    let Json(payload) = body?;
    let email = normalize_email(&payload.email);
    validate_credentials(&email, &payload.password)?;

    let invalid = || ApiError::Forbidden("Invalid email or password".into());

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "signin unknown email");
        return Err(invalid());
    };
    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "signin invalid password");
        return Err(invalid());
    }

    let session = issue_session(&state, user.id).await?;
    info!(user_id = %user.id, "user signed in");
    Ok(session_response(&state, session.access_token, &session.refresh_token))
}

#[instrument(skip(state, headers))]
pub async fn signout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<WithCookie<MessageResponse>> {
    let token = get_cookie(&headers, REFRESH_COOKIE_NAME)
        .ok_or_else(|| ApiError::Unauthorized("Missing refresh token".into()))?;

    let invalid = || ApiError::Forbidden("Invalid refresh token".into());
    let claims = JwtKeys::from_ref(&state).verify_refresh(token).map_err(|e| {
        warn!(error = %e, "signout with invalid refresh token");
        invalid()
    })?;

    // A superseded token must not end the session that replaced it.
    let user = state.users.find_by_id(claims.sub).await?.ok_or_else(invalid)?;
    if user.refresh_token.as_deref() != Some(token) {
        warn!(user_id = %user.id, "signout token does not match stored token");
        return Err(invalid());
    }

    state.users.set_refresh_token(user.id, None).await?;
    info!(user_id = %user.id, "user signed out");
    Ok((
        [(header::SET_COOKIE, cleared_refresh_cookie(state.config.cookie_secure))],
        Json(MessageResponse {
            message: "Signed out".into(),
        }),
    ))
}

#[instrument(skip(state, headers))]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<TokenResponse>> {
    let token = get_cookie(&headers, REFRESH_COOKIE_NAME)
        .ok_or_else(|| ApiError::Unauthorized("Missing refresh token".into()))?;

    let keys = JwtKeys::from_ref(&state);
    let invalid = || ApiError::Unauthorized("Invalid refresh token".into());
    let claims = keys.verify_refresh(token).map_err(|e| {
        warn!(error = %e, "refresh with invalid token");
        invalid()
    })?;

    let user = state.users.find_by_id(claims.sub).await?.ok_or_else(invalid)?;
    if user.refresh_token.as_deref() != Some(token) {
        warn!(user_id = %user.id, "refresh token does not match stored token");
        return Err(invalid());
    }

    let jwt = keys.sign_access(user.id)?;
    Ok(Json(TokenResponse { jwt }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<PublicUser>> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    Ok(Json(PublicUser {
        id: user.id,
        email: user.email,
        name: user.name,
    }))
}
