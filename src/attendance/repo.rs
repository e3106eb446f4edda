use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "attendance_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

#[derive(Debug, Clone, FromRow)]
pub struct Attendance {
    pub id: Uuid,
    pub user_id: Uuid,
    pub task_id: Option<Uuid>,
    pub date: OffsetDateTime,
    pub status: AttendanceStatus,
    pub created_at: OffsetDateTime,
}

/// Attendance row joined with the user's identity, for the admin view.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceWithUser {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub task_id: Option<Uuid>,
    pub date: OffsetDateTime,
    pub status: AttendanceStatus,
    pub created_at: OffsetDateTime,
}

const ATTENDANCE_COLUMNS: &str = "id, user_id, task_id, date, status, created_at";

impl Attendance {
    /// Inserts a mark for a task. The partial unique index on
    /// (user_id, task_id) rejects a second mark; callers map the violation
    /// to AlreadyMarked.
    pub async fn insert_for_task(
        db: &PgPool,
        user_id: Uuid,
        task_id: Uuid,
        date: OffsetDateTime,
    ) -> Result<Attendance, sqlx::Error> {
        sqlx::query_as::<_, Attendance>(&format!(
            "INSERT INTO attendance (user_id, task_id, date, status) \
             VALUES ($1, $2, $3, 'present') \
             RETURNING {ATTENDANCE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(task_id)
        .bind(date)
        .fetch_one(db)
        .await
    }

    /// Task-less daily mark; the (user_id, date) index rejects duplicates.
    pub async fn insert_generic(
        db: &PgPool,
        user_id: Uuid,
        date: OffsetDateTime,
    ) -> Result<Attendance, sqlx::Error> {
        sqlx::query_as::<_, Attendance>(&format!(
            "INSERT INTO attendance (user_id, date, status) \
             VALUES ($1, $2, 'present') \
             RETURNING {ATTENDANCE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(date)
        .fetch_one(db)
        .await
    }

    pub async fn exists_for_task(
        db: &PgPool,
        user_id: Uuid,
        task_id: Uuid,
    ) -> anyhow::Result<bool> {
        let found: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM attendance WHERE user_id = $1 AND task_id = $2",
        )
        .bind(user_id)
        .bind(task_id)
        .fetch_optional(db)
        .await?;
        Ok(found.is_some())
    }

    pub async fn exists_generic_for_date(
        db: &PgPool,
        user_id: Uuid,
        date: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        let found: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM attendance WHERE user_id = $1 AND date = $2 AND task_id IS NULL",
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(db)
        .await?;
        Ok(found.is_some())
    }

    pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Attendance>> {
        let rows = sqlx::query_as::<_, Attendance>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance \
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_all_with_users(db: &PgPool) -> anyhow::Result<Vec<AttendanceWithUser>> {
        let rows = sqlx::query_as::<_, AttendanceWithUser>(
            "SELECT a.id, a.user_id, u.name AS user_name, u.email AS user_email, \
                    a.task_id, a.date, a.status, a.created_at \
             FROM attendance a \
             JOIN users u ON u.id = a.user_id \
             ORDER BY a.created_at DESC",
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
