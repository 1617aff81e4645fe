pub const CHECK_STARTS: &str = "idle_janitor_checks_total";
pub const CHECK_ACTIVE: &str = "idle_janitor_active_total";
pub const CHECK_FAILURES: &str = "idle_janitor_check_failures_total";

pub const QUERY_TIME: &str = "idle_janitor_query_duration_seconds";

// Every stop is irreversible from our side, so it gets its own counter
pub const STOPS: &str = "idle_janitor_stops_total";
