use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>, // the one live refresh token, if signed in
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
