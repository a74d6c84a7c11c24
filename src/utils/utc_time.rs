//! UTC timestamp formatting shared by cache payloads and stat views.

use chrono::{DateTime, SecondsFormat, Utc};

/// Formats a timestamp as RFC 3339 UTC with a trailing `Z`.
pub fn format_utc_z(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses an RFC 3339 timestamp, requiring the UTC `Z` suffix.
///
/// Payloads written by this crate always carry the suffix; a value without it
/// is treated as foreign and rejected, so hand-edited or stale records cannot
/// shift an entry's times by a zone offset.
pub fn parse_utc_z(s: &str) -> Result<DateTime<Utc>, String> {
    if !s.ends_with('Z') {
        return Err(format!("timestamp {s:?} must be UTC with a trailing 'Z'"));
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp {s:?}: {e}"))
}

/// Serde adapter for mandatory `Z`-suffixed timestamps.
///
/// Use with `#[serde(with = "utc_z")]`.
pub mod utc_z {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_utc_z(dt))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_utc_z(&s).map_err(de::Error::custom)
    }
}

/// Serde adapter for optional `Z`-suffixed timestamps (`null` maps to `None`).
///
/// Use with `#[serde(with = "utc_z_opt")]`.
pub mod utc_z_opt {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_some(&super::format_utc_z(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<String> = Option::deserialize(deserializer)?;
        value
            .map(|s| super::parse_utc_z(&s).map_err(de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_carries_z_suffix() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 45).unwrap();
        let formatted = format_utc_z(&dt);

        assert!(formatted.ends_with('Z'));
        assert!(formatted.starts_with("2024-01-01T12:30:45"));
    }

    #[test]
    fn test_parse_round_trip() {
        // Microsecond precision, matching what format_utc_z emits.
        let dt = Utc.with_ymd_and_hms(2024, 5, 17, 8, 15, 30).unwrap()
            + chrono::Duration::microseconds(123_456);
        let parsed = parse_utc_z(&format_utc_z(&dt)).unwrap();

        assert_eq!(parsed, dt);
    }

    #[test]
    fn test_parse_accepts_whole_seconds() {
        let parsed = parse_utc_z("2024-01-01T00:00:00Z").unwrap();

        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_offset_form() {
        assert!(parse_utc_z("2024-01-01T00:00:00+00:00").is_err());
        assert!(parse_utc_z("2024-01-01T03:00:00+03:00").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_utc_z("not-a-timestamp-Z").is_err());
        assert!(parse_utc_z("").is_err());
    }
}
