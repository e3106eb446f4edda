use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::tasks::repo::Task;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    /// Window bounds are optional; a missing side is unbounded.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub attendance_start: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub attendance_end: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
pub struct TaskOut {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub attendance_start: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub attendance_end: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Task> for TaskOut {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            link: t.link,
            attendance_start: t.attendance_start,
            attendance_end: t.attendance_end,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedTaskResponse {
    pub message: &'static str,
    pub task: TaskOut,
}
