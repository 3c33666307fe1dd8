use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,               // autoincrement user ID
    pub name: String,          // display name
    pub email: String,         // normalized (trimmed, lowercase) email
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, not exposed in JSON
}

/// Failure modes of inserting a user.
#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("email already registered")]
    EmailTaken,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
