use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::ValidatedSignup;

/// POST /signup - create an account from validated fields
pub async fn signup(
    State(state): State<AppState>,
    ValidatedSignup(body): ValidatedSignup,
) -> Result<impl IntoResponse, ApiError> {
    let user = User::create(
        &state.pool,
        &body.name,
        &body.email,
        &body.password,
        body.about.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /signin - verify the credential and issue a session token
pub async fn signin(
    State(state): State<AppState>,
    Json(body): Json<SigninRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = User::find_by_email(&state.pool, body.email.trim())
        .await?
        .ok_or_else(|| {
            ApiError::bad_request("User with that email does not exist. Please signup")
        })?;

    if !user.authenticate(&body.password) {
        return Err(ApiError::unauthorized("Email and password don't match"));
    }

    let token = generate_jwt(Claims::new(user.id, user.role)).map_err(|e| {
        tracing::error!("session token generation failed: {}", e);
        ApiError::internal_server_error("Could not sign in")
    })?;

    // Session cookie mirrors the token for browser clients
    let cookie = format!("t={}; Path=/; HttpOnly", token);
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(json!({ "token": token, "user": user })),
    ))
}

/// GET /signout - stateless: clears the client-held session cookie
pub async fn signout() -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, "t=; Path=/; Max-Age=0".to_string())]),
        Json(json!({ "message": "Signout success" })),
    )
}
