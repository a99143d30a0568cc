//! Lenient timestamp decoding for backend payloads.
//!
//! The backend emits RFC 3339 strings, naive ISO-8601 strings (implicitly
//! UTC) or epoch milliseconds depending on the endpoint. Serialization
//! always writes RFC 3339.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Text(String),
}

fn parse_raw(raw: RawTimestamp) -> Result<DateTime<Utc>, String> {
    match raw {
        RawTimestamp::Millis(ms) => DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| format!("epoch millis out of range: {ms}")),
        RawTimestamp::Text(s) => parse_str(&s),
    }
}

/// Parse a timestamp string in any of the accepted textual forms.
pub fn parse_str(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    Err(format!("unrecognized timestamp: {s}"))
}

pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = RawTimestamp::deserialize(deserializer)?;
    parse_raw(raw).map_err(de::Error::custom)
}

/// Same rules for `Option<DateTime<Utc>>`; `null` and a missing field both map to `None`.
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
        raw.map(parse_raw).transpose().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_str("2024-01-01T12:00:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn naive_strings_are_utc() {
        let dt = parse_str("2024-01-01T12:00:00.250").unwrap();
        assert_eq!(dt.timestamp_millis(), Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap().timestamp_millis() + 250);
        assert!(parse_str("2024-01-01 08:30:00").is_ok());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_str("yesterday").is_err());
    }
}
