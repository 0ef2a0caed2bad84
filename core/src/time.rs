//! Temporal values on the wire.
//!
//! The API is inconsistent about timestamps: newer endpoints send RFC 3339
//! (`2020-02-13T15:31:44.000Z`), older ones send a bare
//! `2019-12-09 13:59:21` in UTC. `Timestamp` accepts both and normalizes to
//! `DateTime<Utc>`. Anything else fails to decode.
//!
//! Outgoing dates are formatted per field: `date_only` for calendar dates
//! such as `expected_close_date`, `local_timestamp` for instants such as
//! `add_time`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A UTC instant decoded from either of the API's timestamp formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(inner: DateTime<Utc>) -> Self {
        Self(inner)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn into_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(inner: DateTime<Utc>) -> Self {
        Self(inner)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(naive: NaiveDateTime) -> Self {
        Self(naive.and_utc())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTimestampError(String);

impl fmt::Display for ParseTimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid timestamp {:?}: expected RFC 3339 or YYYY-MM-DD HH:MM:SS",
            self.0
        )
    }
}

impl std::error::Error for ParseTimestampError {}

impl FromStr for Timestamp {
    type Err = ParseTimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(parsed.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
            .map(Self::from)
            .map_err(|_| ParseTimestampError(s.to_string()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Serialize an optional calendar date as `YYYY-MM-DD`.
pub mod date_only {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(de::Error::custom))
            .transpose()
    }
}

/// Serialize an optional instant as `YYYY-MM-DD HH:MM:SS` in UTC.
pub mod local_timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(at) => serializer.collect_str(&at.format(TIMESTAMP_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<Timestamp> = Option::deserialize(deserializer)?;
        Ok(raw.map(|ts| ts.into_datetime().naive_utc()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn both_formats_decode_to_same_instant() {
        let rfc: Timestamp = serde_json::from_str(r#""2020-02-13T15:31:44.000Z""#).unwrap();
        let local: Timestamp = serde_json::from_str(r#""2020-02-13 15:31:44""#).unwrap();
        assert_eq!(rfc, local);
        assert_eq!(
            rfc.into_datetime(),
            Utc.with_ymd_and_hms(2020, 2, 13, 15, 31, 44).unwrap()
        );
    }

    #[test]
    fn rfc3339_offsets_are_normalized() {
        let ts: Timestamp = "2019-12-09T15:59:21+02:00".parse().unwrap();
        assert_eq!(ts, "2019-12-09 13:59:21".parse().unwrap());
    }

    #[test]
    fn garbage_is_rejected() {
        for raw in [r#""yesterday""#, r#""2019-12-09""#, r#""""#, "12"] {
            assert!(serde_json::from_str::<Timestamp>(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn displays_in_local_format() {
        let ts: Timestamp = "2020-02-13T15:31:44.250Z".parse().unwrap();
        assert_eq!(ts.to_string(), "2020-02-13 15:31:44");
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Dated {
        #[serde(with = "date_only", default)]
        day: Option<NaiveDate>,
        #[serde(with = "local_timestamp", default)]
        at: Option<NaiveDateTime>,
    }

    #[test]
    fn per_field_formats() {
        let dated = Dated {
            day: NaiveDate::from_ymd_opt(2021, 3, 4),
            at: NaiveDate::from_ymd_opt(2021, 3, 4).and_then(|d| d.and_hms_opt(5, 6, 7)),
        };
        let json = serde_json::to_value(&dated).unwrap();
        assert_eq!(json["day"], "2021-03-04");
        assert_eq!(json["at"], "2021-03-04 05:06:07");
        let back: Dated = serde_json::from_value(json).unwrap();
        assert_eq!(back, dated);
    }
}
