use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Task record. Append-only: there is no update or delete path.
#[derive(Debug, Clone, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub attendance_start: Option<OffsetDateTime>,
    pub attendance_end: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

const TASK_COLUMNS: &str =
    "id, title, description, link, attendance_start, attendance_end, created_at";

impl Task {
    pub async fn create(
        db: &PgPool,
        title: &str,
        description: Option<&str>,
        link: Option<&str>,
        attendance_start: Option<OffsetDateTime>,
        attendance_end: Option<OffsetDateTime>,
    ) -> anyhow::Result<Task> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (title, description, link, attendance_start, attendance_end) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(title)
        .bind(description)
        .bind(link)
        .bind(attendance_start)
        .bind(attendance_end)
        .fetch_one(db)
        .await?;
        Ok(task)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at DESC"
        ))
        .fetch_all(db)
        .await?;
        Ok(tasks)
    }
}
