use chrono::{DateTime, Utc};

/// Human-readable remaining duration for lockout messages, e.g. "59 minutes".
pub fn format_remaining(until: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (until - now).num_seconds().max(0);
    if seconds < 60 {
        return format!("{} second(s)", seconds.max(1));
    }
    // Partial minutes round up so the user never retries too early.
    let minutes = (seconds + 59) / 60;
    if minutes < 60 {
        format!("{} minute(s)", minutes)
    } else {
        let hours = minutes / 60;
        let rest = minutes % 60;
        if rest == 0 {
            format!("{} hour(s)", hours)
        } else {
            format!("{} hour(s) {} minute(s)", hours, rest)
        }
    }
}

/// Whole hours left in a cooldown window, rounded up and floored at 1.
pub fn hours_remaining_ceil(window_hours: i64, since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let elapsed_seconds = (now - since).num_seconds().max(0);
    let remaining_seconds = window_hours * 3600 - elapsed_seconds;
    let hours = (remaining_seconds + 3599) / 3600;
    hours.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn format_remaining_rounds_up_minutes() {
        let now = Utc::now();
        assert_eq!(
            format_remaining(now + Duration::seconds(61), now),
            "2 minute(s)"
        );
        assert_eq!(
            format_remaining(now + Duration::minutes(60), now),
            "1 hour(s)"
        );
        assert_eq!(
            format_remaining(now + Duration::seconds(30), now),
            "30 second(s)"
        );
    }

    #[test]
    fn hours_remaining_rounds_up_and_floors_at_one() {
        let now = Utc::now();
        // 10 hours elapsed of a 24 hour window -> 14 hours remain.
        assert_eq!(
            hours_remaining_ceil(24, now - Duration::hours(10), now),
            14
        );
        // 23.5 hours elapsed -> ceil(0.5) = 1.
        assert_eq!(
            hours_remaining_ceil(24, now - Duration::minutes(23 * 60 + 30), now),
            1
        );
        // Window already elapsed still reports at least 1.
        assert_eq!(
            hours_remaining_ceil(24, now - Duration::hours(30), now),
            1
        );
    }
}
