use chrono::{Duration, NaiveDateTime, Utc};

/// Hours east of UTC. All stored timestamps use this fixed civil timezone
/// (Hanoi), never the host machine's local timezone.
const UTC_OFFSET_HOURS: i64 = 7;

/// The single time source for the application. Queries never read it
/// internally; callers resolve "now" once and pass timestamps and month
/// keys down explicitly.
pub(crate) struct Clock {
    frozen: Option<NaiveDateTime>,
}

impl Clock {
    pub(crate) fn system() -> Self {
        Self { frozen: None }
    }

    /// A clock pinned to the given "YYYY-MM-DD HH:MM:SS" instant.
    #[cfg(test)]
    pub(crate) fn fixed(timestamp: &str) -> Self {
        Self {
            frozen: NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S").ok(),
        }
    }

    fn now(&self) -> NaiveDateTime {
        match self.frozen {
            Some(t) => t,
            None => (Utc::now() + Duration::hours(UTC_OFFSET_HOURS)).naive_utc(),
        }
    }

    /// Current wall-clock instant as a sortable "YYYY-MM-DD HH:MM:SS" string.
    pub(crate) fn timestamp(&self) -> String {
        self.now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Current month key, "YYYY-MM".
    pub(crate) fn month(&self) -> String {
        self.now().format("%Y-%m").to_string()
    }
}
