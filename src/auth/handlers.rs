use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{
            AdminUpdateUserRequest, LoginRequest, LoginResponse, MessageResponse, SafeUser,
            SignupRequest, UpdateMeRequest, UpdateRoleRequest, UserResponse,
        },
        jwt::{AdminUser, AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo_types::{Role, User},
        validation::{validate_password, validate_phone, validate_semester},
    },
    error::{on_unique, ApiError},
    state::AppState,
};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(get_me))
        .route("/auth/me", put(update_me))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/all", get(list_users))
        .route("/auth/approve/:id", post(approve_user))
        .route("/auth/role/:id", put(update_role))
        .route("/auth/:id", put(update_user))
        .route("/auth/:id", delete(delete_user))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "signup with taken email");
        return Err(ApiError::Conflict("User already exists"));
    }
    validate_semester(payload.semester)?;
    if let Some(phone) = payload.phone.as_deref() {
        validate_phone(phone)?;
    }
    validate_password(&payload.password)?;

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        &payload.name,
        &payload.email,
        &hash,
        payload.semester,
        payload.phone.as_deref(),
    )
    .await
    .map_err(|e| on_unique(e, ApiError::Conflict("User already exists")))?;

    info!(user_id = %user.id, email = %user.email, "student signed up, pending approval");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Signup successful, pending admin approval",
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    // Approval is checked before the password is compared, so approval
    // state is observable with a guessed password. Known trade-off.
    if user.role == Role::Student && !user.approved {
        warn!(user_id = %user.id, "login before approval");
        return Err(ApiError::NotApproved);
    }

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, user.role)?;

    info!(user_id = %user.id, role = ?user.role, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<SafeUser>, ApiError> {
    let user = User::find_by_id(&state.db, auth.id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateMeRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let mut user = User::find_by_id(&state.db, auth.id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    if let Some(email) = payload.email {
        if email != user.email {
            if let Some(other) = User::find_by_email(&state.db, &email).await? {
                if other.id != user.id {
                    return Err(ApiError::Conflict("Email already in use"));
                }
            }
            user.email = email;
        }
    }
    if let Some(name) = payload.name {
        user.name = name;
    }
    if let Some(semester) = payload.semester {
        validate_semester(semester)?;
        user.semester = Some(semester);
    }
    if let Some(phone) = payload.phone {
        if phone.is_empty() {
            user.phone = None;
        } else {
            validate_phone(&phone)?;
            user.phone = Some(phone);
        }
    }

    if let Some(new_password) = payload.new_password {
        let current = payload
            .current_password
            .ok_or(ApiError::BadRequest("Current password required"))?;
        if !verify_password(&current, &user.password_hash)? {
            return Err(ApiError::InvalidCredentials);
        }
        validate_password(&new_password)?;
        user.password_hash = hash_password(&new_password)?;
    }

    user.save_profile(&state.db)
        .await
        .map_err(|e| on_unique(e, ApiError::Conflict("Email already in use")))?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(UserResponse {
        message: "Profile updated",
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<SafeUser>>, ApiError> {
    let users = User::list(&state.db).await?;
    Ok(Json(users.into_iter().map(SafeUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn approve_user(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = User::approve(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    info!(user_id = %user.id, admin_id = %admin_id, "user approved");
    Ok(Json(UserResponse {
        message: "User approved",
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_role(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let role = match payload.role.as_str() {
        "student" => Role::Student,
        "admin" => Role::Admin,
        _ => return Err(ApiError::Validation("Invalid role".into())),
    };
    let user = User::set_role(&state.db, id, role)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    info!(user_id = %user.id, admin_id = %admin_id, role = ?role, "role updated");
    Ok(Json(UserResponse {
        message: "Role updated",
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = User::admin_update(
        &state.db,
        id,
        payload.name.as_deref(),
        payload.email.as_deref(),
        payload.approved,
    )
    .await
    .map_err(|e| on_unique(e, ApiError::Conflict("Email already in use")))?
    .ok_or(ApiError::NotFound("User"))?;
    info!(user_id = %user.id, admin_id = %admin_id, "user edited by admin");
    Ok(Json(UserResponse {
        message: "User updated",
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = User::delete(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    info!(user_id = %user.id, admin_id = %admin_id, "user deleted");
    Ok(Json(UserResponse {
        message: "User deleted",
        user: user.into(),
    }))
}
