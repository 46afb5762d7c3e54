use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::Deserialize;
use serde_json::json;

use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::PathUser;
use crate::state::AppState;

/// GET /user/:userId - the loaded profile, credential material stripped
pub async fn read(Extension(PathUser(user)): Extension<PathUser>) -> Json<User> {
    Json(user)
}

/// Mutable profile fields. Anything else in the body is ignored, so
/// protected fields (role, id, timestamps) can never ride along.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub password: Option<String>,
    pub about: Option<String>,
}

/// PUT /user/:userId - merge the allow-listed fields and persist
pub async fn update(
    State(state): State<AppState>,
    Extension(PathUser(mut user)): Extension<PathUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    if let Some(name) = body.name {
        user.name = name;
    }
    if let Some(about) = body.about {
        user.about = Some(about);
    }
    if let Some(password) = &body.password {
        user.set_password(password);
    }

    let updated = user.update(&state.pool).await?;
    Ok(Json(updated))
}

/// DELETE /user/:userId - explicit account deletion
pub async fn remove(
    State(state): State<AppState>,
    Extension(PathUser(user)): Extension<PathUser>,
) -> Result<impl IntoResponse, ApiError> {
    User::delete(&state.pool, user.id).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}
