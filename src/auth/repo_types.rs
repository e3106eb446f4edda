use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }
}

/// User record in the database. Hash and recovery fields never leave the
/// server; responses use `SafeUser` instead.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub approved: bool,
    pub phone: Option<String>,
    pub semester: Option<i32>,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires: Option<OffsetDateTime>,
    pub otp_hash: Option<String>,
    pub otp_expires: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}
