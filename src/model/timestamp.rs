use std::convert::TryFrom;
use std::time::Duration;

use chrono::prelude::*;

use crate::error::Result;

// Unix timestamp in milliseconds.
pub type Timestamp = i64;

pub trait TimestampTrait {
    fn add(&self, d: Duration) -> Self;
    fn sub(&self, d: Duration) -> Self;
    fn to_string_millis(&self) -> String;
}

impl TimestampTrait for Timestamp {
    #[inline]
    fn add(&self, d: Duration) -> Self {
        self.saturating_add(millis(d))
    }

    #[inline]
    fn sub(&self, d: Duration) -> Self {
        self.saturating_sub(millis(d))
    }

    fn to_string_millis(&self) -> String {
        match Utc.timestamp_millis_opt(*self).single() {
            Some(ts) => ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            None => self.to_string(),
        }
    }
}

#[inline]
fn millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

pub fn now() -> Timestamp {
    Utc::now().timestamp_millis()
}

pub fn parse_iso_time(s: &str) -> Result<Timestamp> {
    s.parse::<DateTime<Utc>>()
        .map(|t| t.timestamp_millis())
        .map_err(|e| ("timestamp parsing failed", e).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_sub() {
        let ts: Timestamp = 1609459200000;
        assert_eq!(ts.add(Duration::from_secs(5)), 1609459205000);
        assert_eq!(ts.sub(Duration::from_secs(60 * 60)), 1609455600000);
        assert_eq!(ts.add(Duration::from_millis(1)), 1609459200001);
        assert_eq!(ts.add(Duration::MAX), Timestamp::MAX);
    }

    #[test]
    fn test_parse_iso_time() -> std::result::Result<(), Box<dyn std::error::Error>> {
        #[rustfmt::skip]
        let tests = [
            ("2021-01-01T00:00:00Z", 1609459200000),
            ("2021-01-01T00:00:00.250Z", 1609459200250),
            ("2021-01-01T01:00:00+01:00", 1609459200000),
        ];

        for (input, expected) in &tests {
            assert_eq!(*expected, parse_iso_time(input)?, "while parsing {}", input);
        }

        assert!(parse_iso_time("yesterday").is_err());
        Ok(())
    }

    #[test]
    fn test_to_string_millis() {
        let ts: Timestamp = 1609459200250;
        assert_eq!(ts.to_string_millis(), "2021-01-01T00:00:00.250Z");
    }
}
