//! Handlers for sign-up, login, logout and the current account.

use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header::SET_COOKIE},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::auth::{AuthResponse, LoginRequest, MeResponse, MessageResponse, SignUpRequest};
use crate::api::middleware::auth::{expired_session_cookie_header, session_cookie_header};
use crate::domain::entities::{OwnerId, User};
use crate::error::AppError;
use crate::state::AppState;

/// Creates an account and starts a session.
///
/// # Endpoint
///
/// `POST /auth/register`
///
/// # Request Body
///
/// ```json
/// { "name": "Ana", "email": "ana@example.com", "password": "s3cret-pass" }
/// ```
///
/// # Response
///
/// `201 Created` with `Set-Cookie: token=...` and
/// `{"message": "User registered successfully", "user": {...}, "token": "..."}`.
///
/// # Errors
///
/// - 400 on validation failure
/// - 409 if the email is already registered
pub async fn sign_up_handler(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), AppError> {
    payload.validate()?;

    let user = state
        .account_service
        .sign_up(&payload.name, &payload.email, &payload.password)
        .await?;

    let (headers, body) = start_session(&state, user, "User registered successfully")?;
    Ok((StatusCode::CREATED, headers, Json(body)))
}

/// Checks credentials and starts a session.
///
/// # Endpoint
///
/// `POST /auth/login`
///
/// # Errors
///
/// - 400 on validation failure
/// - 401 with one generic message for an unknown email or a wrong password
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), AppError> {
    payload.validate()?;

    let user = state
        .account_service
        .login(&payload.email, &payload.password)
        .await?;

    let (headers, body) = start_session(&state, user, "Login successful")?;
    Ok((headers, Json(body)))
}

/// Ends the session by expiring the cookie.
///
/// # Endpoint
///
/// `POST /auth/logout`
///
/// Tokens are stateless: a copy held elsewhere stays valid until it expires.
pub async fn logout_handler(
    State(state): State<AppState>,
) -> Result<(HeaderMap, Json<MessageResponse>), AppError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        cookie_value(&expired_session_cookie_header(state.cookie_secure))?,
    );

    Ok((
        headers,
        Json(MessageResponse {
            message: "Logout successful".to_string(),
        }),
    ))
}

/// Returns the authenticated account.
///
/// # Endpoint
///
/// `GET /auth/me`
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Json<MeResponse>, AppError> {
    let user = state.account_service.current_user(&owner).await?;

    Ok(Json(MeResponse { user: user.into() }))
}

fn start_session(
    state: &AppState,
    user: User,
    message: &str,
) -> Result<(HeaderMap, AuthResponse), AppError> {
    let token = state.session_gate.issue(&user)?;
    let max_age = state.session_gate.ttl().num_seconds();

    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        cookie_value(&session_cookie_header(&token, max_age, state.cookie_secure))?,
    );

    Ok((
        headers,
        AuthResponse {
            message: message.to_string(),
            user: user.into(),
            token,
        },
    ))
}

fn cookie_value(cookie: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(cookie).map_err(|e| {
        AppError::internal("Failed to build session cookie", json!({ "reason": e.to_string() }))
    })
}
