use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use rand::Rng;
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{
            AdminResetPasswordRequest, ForgotPasswordRequest, MessageResponse,
            ResetPasswordRequest, ResetWithOtpRequest,
        },
        jwt::AdminUser,
        password::hash_password,
        repo_types::User,
        validation::validate_password,
    },
    error::ApiError,
    mail::OutgoingEmail,
    state::AppState,
};

const RESET_TOKEN_TTL: Duration = Duration::hours(1);
const OTP_TTL: Duration = Duration::minutes(10);

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/forgot", post(forgot_password))
        .route("/auth/reset", post(reset_password))
        .route("/auth/forgot-otp", post(forgot_otp))
        .route("/auth/reset-with-otp", post(reset_with_otp))
        .route("/auth/admin/reset/:id", post(admin_reset_password))
}

pub(crate) fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// High-entropy link token: the raw form goes out-of-band, only its hash is
/// stored. A database read alone cannot impersonate the user.
pub(crate) fn generate_reset_token() -> (String, String) {
    let bytes: [u8; 32] = rand::random();
    let raw = hex::encode(bytes);
    let hash = sha256_hex(&raw);
    (raw, hash)
}

/// 6-digit code, uniform over 100000..=999999.
pub(crate) fn generate_otp() -> (String, String) {
    let code = rand::thread_rng().gen_range(100_000..=999_999).to_string();
    let hash = sha256_hex(&code);
    (code, hash)
}

pub(crate) fn otp_is_valid(
    stored_hash: Option<&str>,
    expires: Option<OffsetDateTime>,
    now: OffsetDateTime,
    code: &str,
) -> bool {
    let (Some(stored), Some(expires)) = (stored_hash, expires) else {
        return false;
    };
    if expires < now {
        return false;
    }
    sha256_hex(code) == stored
}

async fn send_best_effort(state: &AppState, mail: OutgoingEmail) {
    // Delivery failure must not leak existence or transport errors.
    if let Err(e) = state.mailer.send(mail).await {
        error!(error = %e, "mail delivery failed");
    }
}

fn reset_email(config: &crate::config::AppConfig, to: &str, raw_token: &str) -> OutgoingEmail {
    let reset_url = format!("{}/reset?token={}", config.client_url, raw_token);
    let app_name = &config.app_name;
    OutgoingEmail {
        to: to.to_string(),
        subject: format!("{app_name} password reset"),
        text: format!(
            "Reset your password using this link: {reset_url}\n\
             The link expires in 1 hour. If you did not request this, ignore this email."
        ),
        html: format!(
            "<p>Reset your password using <a href=\"{reset_url}\">this link</a>.</p>\
             <p>The link expires in 1 hour.</p>"
        ),
    }
}

fn otp_email(config: &crate::config::AppConfig, to: &str, code: &str) -> OutgoingEmail {
    let app_name = &config.app_name;
    OutgoingEmail {
        to: to.to_string(),
        subject: format!("Your {app_name} password reset OTP"),
        text: format!(
            "Your OTP code is {code}. It expires in 10 minutes.\n\
             If you did not request this, you can ignore this email."
        ),
        html: format!("<p>Your OTP code is <b>{code}</b>.</p><p>It expires in 10 minutes.</p>"),
    }
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    // Identical response whether or not the account exists.
    let generic = MessageResponse {
        message: "If that email exists, a reset link has been sent",
    };

    let Some(user) = User::find_by_email(&state.db, &payload.email).await? else {
        return Ok(Json(generic));
    };

    let (raw, hash) = generate_reset_token();
    let expires = OffsetDateTime::now_utc() + RESET_TOKEN_TTL;
    User::set_reset_token(&state.db, user.id, &hash, expires).await?;

    send_best_effort(&state, reset_email(&state.config, &user.email, &raw)).await;

    info!(user_id = %user.id, "reset token issued");
    Ok(Json(generic))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_password(&payload.new_password)?;

    let hash = sha256_hex(&payload.token);
    let user = User::find_by_valid_reset_token(&state.db, &hash)
        .await?
        .ok_or(ApiError::InvalidOrExpiredToken)?;

    let password_hash = hash_password(&payload.new_password)?;
    User::complete_reset(&state.db, user.id, &password_hash).await?;

    info!(user_id = %user.id, "password reset via link token");
    Ok(Json(MessageResponse {
        message: "Password has been reset. You can now login.",
    }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_otp(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let generic = MessageResponse {
        message: "If that email exists, an OTP has been sent",
    };

    let Some(user) = User::find_by_email(&state.db, &payload.email).await? else {
        return Ok(Json(generic));
    };

    let (code, hash) = generate_otp();
    let expires = OffsetDateTime::now_utc() + OTP_TTL;
    User::set_otp(&state.db, user.id, &hash, expires).await?;

    send_best_effort(&state, otp_email(&state.config, &user.email, &code)).await;

    info!(user_id = %user.id, "otp issued");
    Ok(Json(generic))
}

#[instrument(skip(state, payload))]
pub async fn reset_with_otp(
    State(state): State<AppState>,
    Json(payload): Json<ResetWithOtpRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_password(&payload.new_password)?;

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(ApiError::InvalidOrExpiredOtp)?;

    if !otp_is_valid(
        user.otp_hash.as_deref(),
        user.otp_expires,
        OffsetDateTime::now_utc(),
        &payload.otp,
    ) {
        return Err(ApiError::InvalidOrExpiredOtp);
    }

    let password_hash = hash_password(&payload.new_password)?;
    User::complete_otp_reset(&state.db, user.id, &password_hash).await?;

    info!(user_id = %user.id, "password reset via otp");
    Ok(Json(MessageResponse {
        message: "Password has been reset. You can now login.",
    }))
}

#[instrument(skip(state, payload))]
pub async fn admin_reset_password(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_password(&payload.new_password)?;

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let password_hash = hash_password(&payload.new_password)?;
    User::set_password(&state.db, user.id, &password_hash).await?;

    info!(user_id = %user.id, admin_id = %admin_id, "password reset by admin");
    Ok(Json(MessageResponse {
        message: "Password updated by admin",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn reset_token_is_64_hex_chars_and_hash_matches() {
        let (raw, hash) = generate_reset_token();
        assert_eq!(raw.len(), 64);
        assert!(raw.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, sha256_hex(&raw));
    }

    #[test]
    fn reset_tokens_are_unique() {
        let (a, _) = generate_reset_token();
        let (b, _) = generate_reset_token();
        assert_ne!(a, b);
    }

    #[test]
    fn otp_is_six_digits_in_range() {
        for _ in 0..200 {
            let (code, hash) = generate_otp();
            assert_eq!(code.len(), 6);
            let n: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&n));
            assert_eq!(hash, sha256_hex(&code));
        }
    }

    #[test]
    fn otp_check_rejects_missing_fields() {
        let now = OffsetDateTime::now_utc();
        assert!(!otp_is_valid(None, None, now, "123456"));
        assert!(!otp_is_valid(Some("hash"), None, now, "123456"));
        assert!(!otp_is_valid(None, Some(now), now, "123456"));
    }

    #[test]
    fn otp_check_rejects_after_expiry_even_with_correct_code() {
        let now = OffsetDateTime::now_utc();
        let hash = sha256_hex("654321");
        let expired = now - Duration::seconds(1);
        assert!(!otp_is_valid(Some(&hash), Some(expired), now, "654321"));
    }

    #[test]
    fn otp_check_accepts_correct_unexpired_code() {
        let now = OffsetDateTime::now_utc();
        let hash = sha256_hex("654321");
        let expires = now + Duration::minutes(5);
        assert!(otp_is_valid(Some(&hash), Some(expires), now, "654321"));
        assert!(!otp_is_valid(Some(&hash), Some(expires), now, "111111"));
    }

    mod delivery {
        use super::super::*;
        use crate::mail::testing::{FailingMailer, RecordingMailer};
        use std::sync::Arc;

        #[tokio::test]
        async fn delivery_failure_is_swallowed() {
            let mut state = AppState::fake();
            state.mailer = Arc::new(FailingMailer);
            // Must complete without error; the caller never sees transport
            // failures.
            send_best_effort(&state, otp_email(&state.config, "student@example.com", "123456"))
                .await;
        }

        #[tokio::test]
        async fn reset_email_carries_link_with_raw_token() {
            let mailer = Arc::new(RecordingMailer::default());
            let mut state = AppState::fake();
            state.mailer = mailer.clone();

            let (raw, _) = generate_reset_token();
            send_best_effort(&state, reset_email(&state.config, "student@example.com", &raw))
                .await;

            let sent = mailer.sent.lock().unwrap();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].to, "student@example.com");
            let expected_url = format!("{}/reset?token={}", state.config.client_url, raw);
            assert!(sent[0].text.contains(&expected_url));
            assert!(sent[0].html.contains(&expected_url));
        }

        #[tokio::test]
        async fn otp_email_carries_code() {
            let mailer = Arc::new(RecordingMailer::default());
            let mut state = AppState::fake();
            state.mailer = mailer.clone();

            let (code, _) = generate_otp();
            send_best_effort(&state, otp_email(&state.config, "student@example.com", &code))
                .await;

            let sent = mailer.sent.lock().unwrap();
            assert_eq!(sent.len(), 1);
            assert!(sent[0].text.contains(&code));
            assert!(sent[0].html.contains(&code));
        }
    }
}
