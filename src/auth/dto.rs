use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{Role, User};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub semester: i32,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SafeUser,
}

/// Projection of a user with the hash and recovery fields stripped.
#[derive(Debug, Serialize)]
pub struct SafeUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub approved: bool,
    pub semester: Option<i32>,
    pub phone: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for SafeUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            approved: u.approved,
            semester: u.semester,
            phone: u.phone,
            created_at: u.created_at,
        }
    }
}

/// Self-service profile update. Absent fields are left unchanged; an empty
/// phone string clears the stored phone.
#[derive(Debug, Deserialize)]
pub struct UpdateMeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub semester: Option<i32>,
    pub phone: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminUpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub approved: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetWithOtpRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminResetPasswordRequest {
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: &'static str,
    pub user: SafeUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_user_omits_hash_and_recovery_fields() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::Student,
            approved: false,
            phone: Some("03001234567".into()),
            semester: Some(3),
            reset_token_hash: Some("deadbeef".into()),
            reset_token_expires: None,
            otp_hash: Some("cafebabe".into()),
            otp_expires: None,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&SafeUser::from(user)).unwrap();
        assert!(json.contains("ada@example.com"));
        assert!(json.contains("\"role\":\"student\""));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("deadbeef"));
        assert!(!json.contains("cafebabe"));
    }
}
