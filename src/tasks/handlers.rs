use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::jwt::{AdminUser, AuthUser},
    error::ApiError,
    state::AppState,
    tasks::{
        dto::{CreateTaskRequest, CreatedTaskResponse, TaskOut},
        repo::Task,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks/create", post(create_task))
        .route("/tasks/all", get(list_tasks))
}

#[instrument(skip(state, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<CreatedTaskResponse>), ApiError> {
    let task = Task::create(
        &state.db,
        &payload.title,
        payload.description.as_deref(),
        payload.link.as_deref(),
        payload.attendance_start,
        payload.attendance_end,
    )
    .await?;

    info!(task_id = %task.id, admin_id = %admin_id, title = %task.title, "task created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedTaskResponse {
            message: "Task created",
            task: task.into(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_tasks(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<TaskOut>>, ApiError> {
    let tasks = Task::list(&state.db).await?;
    Ok(Json(tasks.into_iter().map(TaskOut::from).collect()))
}
