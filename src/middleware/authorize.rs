use axum::{extract::Request, middleware::Next, response::Response};

use crate::auth::ADMIN_ROLE;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::params::PathUser;

/// Ownership guard: the authenticated identity must match the user record
/// loaded for the `:userId` path parameter, unless it holds the admin
/// role. Runs after `user_by_id` and `require_signin`.
pub async fn is_auth(request: Request, next: Next) -> Result<Response, ApiError> {
    let auth = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Signin required"))?;
    let PathUser(profile) = request
        .extensions()
        .get::<PathUser>()
        .cloned()
        .ok_or_else(|| ApiError::bad_request("User not found"))?;

    if profile.id != auth.user_id && auth.role != ADMIN_ROLE {
        return Err(ApiError::forbidden("Access denied"));
    }

    Ok(next.run(request).await)
}

/// Role guard: the authenticated identity must hold the admin role.
pub async fn is_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let auth = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Signin required"))?;

    if auth.role != ADMIN_ROLE {
        return Err(ApiError::forbidden("Admin resource! Access denied"));
    }

    Ok(next.run(request).await)
}
