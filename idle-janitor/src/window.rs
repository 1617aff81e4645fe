use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};

/// How far back we look for activity before declaring the instance idle.
pub const IDLE_WINDOW_MINUTES: i64 = 2;

/// User-defined log-based metrics all live under this prefix.
pub const USER_METRIC_PREFIX: &str = "logging.googleapis.com/user/";

/// The trailing interval `[end - IDLE_WINDOW_MINUTES, end)` inspected for activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ActivityWindow {
    /// Build the window that ends at `now`. Sub-second precision is dropped so the bounds are
    /// exactly what ends up in the query.
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        let end = now.trunc_subsecs(0);
        let start = end - Duration::minutes(IDLE_WINDOW_MINUTES);

        Self { start, end }
    }

    pub fn start_time(&self) -> String {
        format_instant(&self.start)
    }

    pub fn end_time(&self) -> String {
        format_instant(&self.end)
    }
}

/// ISO-8601 UTC with second precision and a trailing `Z`, e.g. `2023-05-01T09:58:00Z`.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Monitoring filter selecting the metric's points for one instance since `start_time`.
pub fn build_filter(metric_name: &str, instance_name: &str, start_time: &str) -> String {
    format!(
        r#"metric.type="{}{}" AND resource.labels.instance_id="{}" AND timestamp >= "{}""#,
        USER_METRIC_PREFIX, metric_name, instance_name, start_time
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .expect("invalid test timestamp")
            .with_timezone(&Utc)
    }

    #[test]
    fn test_window_ends_now_and_starts_two_minutes_before() {
        let window = ActivityWindow::ending_at(utc("2023-05-01T10:00:00Z"));

        assert_eq!(window.start_time(), "2023-05-01T09:58:00Z");
        assert_eq!(window.end_time(), "2023-05-01T10:00:00Z");
    }

    #[test]
    fn test_window_is_two_minutes_across_boundaries() {
        let cases = [
            ("2023-05-01T10:00:00Z", "2023-05-01T09:58:00Z"),
            ("2023-05-02T00:01:00Z", "2023-05-01T23:59:00Z"),
            ("2023-06-01T00:00:30Z", "2023-05-31T23:58:30Z"),
            ("2024-01-01T00:00:00Z", "2023-12-31T23:58:00Z"),
            ("2024-03-01T00:01:59Z", "2024-02-29T23:59:59Z"),
        ];

        for (now, expected_start) in cases {
            let window = ActivityWindow::ending_at(utc(now));

            assert_eq!(window.end - window.start, Duration::minutes(2), "{}", now);
            assert_eq!(window.start_time(), expected_start, "{}", now);
            assert_eq!(window.end_time(), now, "{}", now);
        }
    }

    #[test]
    fn test_window_drops_sub_second_precision() {
        let window = ActivityWindow::ending_at(utc("2023-05-01T10:00:00.987654Z"));

        assert_eq!(window.end_time(), "2023-05-01T10:00:00Z");
        assert_eq!(window.start_time(), "2023-05-01T09:58:00Z");
        assert_eq!(window.end - window.start, Duration::minutes(2));
    }

    #[test]
    fn test_window_from_non_utc_input() {
        let now = DateTime::parse_from_rfc3339("2023-05-01T12:00:00+02:00")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(
            ActivityWindow::ending_at(now).start_time(),
            "2023-05-01T09:58:00Z"
        );
    }

    #[test]
    fn test_build_filter() {
        assert_eq!(
            build_filter("cpu_ping", "vm-1", "2023-05-01T09:58:00Z"),
            r#"metric.type="logging.googleapis.com/user/cpu_ping" AND resource.labels.instance_id="vm-1" AND timestamp >= "2023-05-01T09:58:00Z""#
        );
    }

    #[test]
    fn test_build_filter_is_deterministic() {
        let first = build_filter("cpu_ping", "vm-1", "2023-05-01T09:58:00Z");
        let second = build_filter("cpu_ping", "vm-1", "2023-05-01T09:58:00Z");

        assert_eq!(first.as_bytes(), second.as_bytes());
        assert_ne!(first, build_filter("cpu_ping", "vm-2", "2023-05-01T09:58:00Z"));
    }
}
