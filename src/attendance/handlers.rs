use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    attendance::{
        dto::{AttendanceOut, AttendanceWithUserOut, MarkResponse},
        eligibility::{check_window, midnight},
        repo::Attendance,
    },
    auth::{
        jwt::{AdminUser, AuthUser},
        repo_types::Role,
    },
    error::{on_unique, ApiError},
    state::AppState,
    tasks::repo::Task,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/attendance/mark", post(mark_generic))
        .route("/attendance/mark-by-task/:task_id", post(mark_by_task))
        .route("/attendance/me", get(my_attendance))
        .route("/attendance/all", get(all_attendance))
}

fn student_only(auth: &AuthUser) -> Result<(), ApiError> {
    if auth.role != Role::Student {
        return Err(ApiError::Forbidden("Only students can mark attendance"));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn mark_generic(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<(StatusCode, Json<MarkResponse>), ApiError> {
    student_only(&auth)?;

    let today = midnight(OffsetDateTime::now_utc());
    if Attendance::exists_generic_for_date(&state.db, auth.id, today).await? {
        return Err(ApiError::AlreadyMarked("Attendance already marked for today"));
    }

    let record = Attendance::insert_generic(&state.db, auth.id, today)
        .await
        .map_err(|e| on_unique(e, ApiError::AlreadyMarked("Attendance already marked for today")))?;

    info!(user_id = %auth.id, "attendance marked");
    Ok((
        StatusCode::CREATED,
        Json(MarkResponse {
            message: "Attendance marked",
            attendance: record.into(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn mark_by_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<Uuid>,
) -> Result<(StatusCode, Json<MarkResponse>), ApiError> {
    student_only(&auth)?;

    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or(ApiError::NotFound("Task"))?;

    let now = OffsetDateTime::now_utc();
    check_window(now, task.attendance_start, task.attendance_end)?;

    // Pre-check for a friendly error; the unique index is what actually
    // excludes the race.
    if Attendance::exists_for_task(&state.db, auth.id, task.id).await? {
        return Err(ApiError::AlreadyMarked(
            "Attendance already marked for this task",
        ));
    }

    let record = Attendance::insert_for_task(&state.db, auth.id, task.id, midnight(now))
        .await
        .map_err(|e| {
            on_unique(
                e,
                ApiError::AlreadyMarked("Attendance already marked for this task"),
            )
        })?;

    info!(user_id = %auth.id, task_id = %task.id, "attendance marked for task");
    Ok((
        StatusCode::CREATED,
        Json(MarkResponse {
            message: "Attendance marked for task",
            attendance: record.into(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn my_attendance(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<AttendanceOut>>, ApiError> {
    let records = Attendance::list_for_user(&state.db, auth.id).await?;
    Ok(Json(records.into_iter().map(AttendanceOut::from).collect()))
}

#[instrument(skip(state))]
pub async fn all_attendance(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<AttendanceWithUserOut>>, ApiError> {
    let records = Attendance::list_all_with_users(&state.db).await?;
    Ok(Json(
        records.into_iter().map(AttendanceWithUserOut::from).collect(),
    ))
}
