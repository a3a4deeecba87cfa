//! Local timestamp helpers shared by storage and the editor session.

use chrono::{DateTime, Local};

/// Format used for the `timestamp` field of snippet records.
pub const RECORD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Format used for the timestamp part of new snippet file names.
pub const FILE_NAME_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S%6f";

/// Record timestamp for `now`; sorts lexicographically in time order.
pub fn record_timestamp(now: DateTime<Local>) -> String {
    now.format(RECORD_TIMESTAMP_FORMAT).to_string()
}

/// File-name-safe timestamp for `now`.
pub fn file_name_timestamp(now: DateTime<Local>) -> String {
    now.format(FILE_NAME_TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::{file_name_timestamp, record_timestamp};
    use chrono::{Local, TimeZone};

    #[test]
    fn timestamps_use_microsecond_precision() {
        let now = Local
            .with_ymd_and_hms(2024, 3, 9, 7, 5, 1)
            .single()
            .expect("unambiguous time")
            + chrono::Duration::microseconds(42);
        assert_eq!(record_timestamp(now), "2024-03-09 07:05:01.000042");
        assert_eq!(file_name_timestamp(now), "20240309070501000042");
    }
}
