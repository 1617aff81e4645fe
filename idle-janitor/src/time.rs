use chrono::{DateTime, Utc};

pub trait TimeSource {
    // Return the current UTC instant
    fn current_time(&self) -> DateTime<Utc>;
}

#[derive(Clone)]
pub struct SystemTime {}

impl TimeSource for SystemTime {
    fn current_time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant. Useful to pin the activity window in tests.
#[derive(Clone)]
pub struct FixedTime {
    pub time: DateTime<Utc>,
}

impl TimeSource for FixedTime {
    fn current_time(&self) -> DateTime<Utc> {
        self.time
    }
}
