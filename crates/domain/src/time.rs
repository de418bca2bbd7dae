//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp attached to hub events.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
///
/// Used as the receive time for events whose payload carries no date.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before && ts <= after);
    }
}
