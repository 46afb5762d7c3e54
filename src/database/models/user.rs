use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::auth::credential;
use crate::database::pool::DatabaseError;

/// Account record. Credential material stays internal: `hashed_password`
/// and `salt` never serialize into a response body.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    #[serde(skip_serializing)]
    pub salt: String,
    pub about: Option<String>,
    pub role: i32,
    pub history: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Re-key the credential: fresh salt, then the keyed hash of the new
    /// plaintext. Any previously issued hash stops verifying.
    pub fn set_password(&mut self, plaintext: &str) {
        self.salt = credential::make_salt();
        self.hashed_password = credential::encrypt_password(plaintext, &self.salt);
    }

    pub fn authenticate(&self, plaintext: &str) -> bool {
        credential::verify_password(plaintext, &self.salt, &self.hashed_password)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Insert a new account from validated signup fields. A duplicate
    /// email surfaces as the store's unique violation.
    pub async fn create(
        pool: &PgPool,
        name: &str,
        email: &str,
        password: &str,
        about: Option<&str>,
    ) -> Result<User, DatabaseError> {
        let salt = credential::make_salt();
        let hashed_password = credential::encrypt_password(password, &salt);

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, hashed_password, salt, about)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(name.trim())
        .bind(email.trim())
        .bind(&hashed_password)
        .bind(&salt)
        .bind(about)
        .fetch_one(pool)
        .await?;
        Ok(user)
    }

    /// Persist the mutable profile fields (name/about/credential).
    pub async fn update(&self, pool: &PgPool) -> Result<User, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $1, about = $2, hashed_password = $3, salt = $4, updated_at = now()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(self.name.trim())
        .bind(&self.about)
        .bind(&self.hashed_password)
        .bind(&self.salt)
        .bind(self.id)
        .fetch_one(pool)
        .await?;
        Ok(user)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Append an order payload to the account's history list.
    pub async fn push_history(pool: &PgPool, id: Uuid, entry: &Value) -> Result<(), DatabaseError> {
        sqlx::query(
            "UPDATE users SET history = history || $1::jsonb, updated_at = now() WHERE id = $2",
        )
        .bind(entry)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_user() -> User {
        let mut user = User {
            id: Uuid::new_v4(),
            name: "Ryan".to_string(),
            email: "ryan@example.com".to_string(),
            hashed_password: String::new(),
            salt: String::new(),
            about: None,
            role: 0,
            history: json!([]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        user.set_password("secret123");
        user
    }

    #[test]
    fn set_password_regenerates_salt() {
        let mut user = sample_user();
        let (old_salt, old_hash) = (user.salt.clone(), user.hashed_password.clone());

        user.set_password("secret123");
        assert_ne!(user.salt, old_salt);
        assert_ne!(user.hashed_password, old_hash);
    }

    #[test]
    fn old_plaintext_fails_after_password_change() {
        let mut user = sample_user();
        assert!(user.authenticate("secret123"));

        user.set_password("another456");
        assert!(!user.authenticate("secret123"));
        assert!(user.authenticate("another456"));
    }

    #[test]
    fn serialized_user_has_no_credential_material() {
        let user = sample_user();
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("hashed_password").is_none());
        assert!(value.get("salt").is_none());
        assert!(value.get("email").is_some());
    }
}
