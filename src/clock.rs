//! Wall-clock timestamps shared by response bodies and log lines.

use chrono::{SecondsFormat, Utc};

/// Current UTC time as ISO-8601 with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_format_is_millis_with_z_suffix() {
        let ts = now_iso8601();
        assert!(ts.ends_with('Z'), "{ts}");
        assert_eq!(ts.len(), "2024-05-01T12:00:00.000Z".len(), "{ts}");
        assert!(DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
