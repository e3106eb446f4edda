use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::attendance::repo::{Attendance, AttendanceStatus, AttendanceWithUser};

#[derive(Debug, Serialize)]
pub struct AttendanceOut {
    pub id: Uuid,
    pub user_id: Uuid,
    pub task_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub status: AttendanceStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Attendance> for AttendanceOut {
    fn from(a: Attendance) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            task_id: a.task_id,
            date: a.date,
            status: a.status,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MarkResponse {
    pub message: &'static str,
    pub attendance: AttendanceOut,
}

/// Admin list item: record plus the owning user's identity for display.
#[derive(Debug, Serialize)]
pub struct AttendanceWithUserOut {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub task_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub status: AttendanceStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<AttendanceWithUser> for AttendanceWithUserOut {
    fn from(a: AttendanceWithUser) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            user_name: a.user_name,
            user_email: a.user_email,
            task_id: a.task_id,
            date: a.date,
            status: a.status,
            created_at: a.created_at,
        }
    }
}
