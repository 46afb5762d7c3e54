//! Declarative signup validation.
//!
//! Rules run in a fixed order and the response carries only the first
//! failing rule's message. `ValidatedSignup` is the extractor form: the
//! body is parsed and validated before the handler body ever runs.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub about: Option<String>,
}

/// Apply the signup rule chain, short-circuiting on the first failure.
pub fn user_signup(req: &SignupRequest) -> Result<(), String> {
    if req.name.is_empty() {
        return Err("Name is required".to_string());
    }
    if !email_shape_ok(&req.email) {
        return Err("Email must contain @".to_string());
    }
    if req.email.len() < 4 || req.email.len() > 32 {
        return Err("Email must be between 3 to 32 characters".to_string());
    }
    if req.password.is_empty() {
        return Err("Password is required".to_string());
    }
    if req.password.len() < 6 {
        return Err("Password must contain at least 6 characters".to_string());
    }
    if !req.password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain a number".to_string());
    }
    Ok(())
}

// Minimal local@domain.tld shape: at least one character before the '@',
// and a dot in the domain with characters on both sides
fn email_shape_ok(email: &str) -> bool {
    let Some(at) = email.find('@') else {
        return false;
    };
    if at == 0 {
        return false;
    }
    let domain = &email[at + 1..];
    matches!(domain.rfind('.'), Some(dot) if dot > 0 && dot + 1 < domain.len())
}

/// Signup body that has already passed the rule chain.
#[derive(Debug, Clone)]
pub struct ValidatedSignup(pub SignupRequest);

#[async_trait]
impl<S> FromRequest<S> for ValidatedSignup
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<SignupRequest>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        user_signup(&value).map_err(ApiError::bad_request)?;

        Ok(ValidatedSignup(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            about: None,
        }
    }

    #[test]
    fn valid_signup_passes() {
        assert!(user_signup(&request("Ryan", "ryan@example.com", "secret1")).is_ok());
    }

    #[test]
    fn empty_name_reported_first() {
        let err = user_signup(&request("", "", "")).unwrap_err();
        assert_eq!(err, "Name is required");
    }

    #[test]
    fn malformed_email_reported_before_password() {
        let err = user_signup(&request("Ryan", "not-an-email", "")).unwrap_err();
        assert_eq!(err, "Email must contain @");
    }

    #[test]
    fn email_length_bounds_enforced() {
        let err = user_signup(&request("Ryan", "a@b.c", "secret1"));
        assert!(err.is_ok());

        let long = format!("{}@example.com", "a".repeat(32));
        let err = user_signup(&request("Ryan", &long, "secret1")).unwrap_err();
        assert_eq!(err, "Email must be between 3 to 32 characters");
    }

    #[test]
    fn empty_password_reported_before_strength() {
        let err = user_signup(&request("Ryan", "ryan@example.com", "")).unwrap_err();
        assert_eq!(err, "Password is required");
    }

    #[test]
    fn short_password_rejected() {
        let err = user_signup(&request("Ryan", "ryan@example.com", "ab1")).unwrap_err();
        assert_eq!(err, "Password must contain at least 6 characters");
    }

    #[test]
    fn password_requires_a_digit() {
        let err = user_signup(&request("Ryan", "ryan@example.com", "abcdef")).unwrap_err();
        assert_eq!(err, "Password must contain a number");
    }

    #[test]
    fn email_shape_cases() {
        assert!(email_shape_ok("a@b.c"));
        assert!(email_shape_ok("first.last@sub.domain.org"));
        assert!(!email_shape_ok("ab.c"));
        assert!(!email_shape_ok("@b.c"));
        assert!(!email_shape_ok("a@.c"));
        assert!(!email_shape_ok("a@bc"));
        assert!(!email_shape_ok("a@bc."));
    }
}
