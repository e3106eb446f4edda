use time::{OffsetDateTime, Time};

use crate::error::ApiError;

/// Whether marking is currently permitted for a task's window.
///
/// No bounds means always open; only a start means open from that instant
/// onward; only an end means open until that instant. Boundary instants are
/// inclusive on both sides.
pub fn check_window(
    now: OffsetDateTime,
    start: Option<OffsetDateTime>,
    end: Option<OffsetDateTime>,
) -> Result<(), ApiError> {
    if let Some(start) = start {
        if now < start {
            return Err(ApiError::WindowNotOpen);
        }
    }
    if let Some(end) = end {
        if now > end {
            return Err(ApiError::WindowClosed);
        }
    }
    Ok(())
}

/// Calendar date for an attendance record: the instant truncated to
/// midnight UTC.
pub fn midnight(now: OffsetDateTime) -> OffsetDateTime {
    now.replace_time(Time::MIDNIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn now() -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    #[test]
    fn unbounded_window_is_always_open() {
        assert!(check_window(now(), None, None).is_ok());
    }

    #[test]
    fn future_start_is_not_open() {
        let t = now();
        let err = check_window(t, Some(t + Duration::hours(1)), None).unwrap_err();
        assert!(matches!(err, ApiError::WindowNotOpen));
    }

    #[test]
    fn past_end_is_closed() {
        let t = now();
        let err = check_window(t, None, Some(t - Duration::hours(1))).unwrap_err();
        assert!(matches!(err, ApiError::WindowClosed));
    }

    #[test]
    fn past_end_is_closed_even_with_open_start() {
        let t = now();
        let err =
            check_window(t, Some(t - Duration::hours(2)), Some(t - Duration::hours(1)))
                .unwrap_err();
        assert!(matches!(err, ApiError::WindowClosed));
    }

    #[test]
    fn inside_both_bounds_is_open() {
        let t = now();
        assert!(check_window(t, Some(t - Duration::hours(1)), Some(t + Duration::hours(1))).is_ok());
    }

    #[test]
    fn start_only_window_never_closes() {
        let t = now();
        assert!(check_window(t, Some(t - Duration::days(365)), None).is_ok());
    }

    #[test]
    fn end_only_window_is_open_until_end() {
        let t = now();
        assert!(check_window(t, None, Some(t + Duration::minutes(1))).is_ok());
    }

    #[test]
    fn boundary_instants_are_inclusive() {
        let t = now();
        assert!(check_window(t, Some(t), None).is_ok());
        assert!(check_window(t, None, Some(t)).is_ok());
    }

    #[test]
    fn midnight_truncates_time_of_day() {
        let t = now();
        let m = midnight(t);
        assert_eq!(m.date(), t.date());
        assert_eq!(m.time(), Time::MIDNIGHT);
    }
}
