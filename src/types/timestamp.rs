// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use chrono::DateTime;
use chrono::Duration;
use chrono::SecondsFormat;
use chrono::SubsecRound;
use chrono::Utc;
use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use crate::error::Fallible;
use crate::error::fail;

/// A UTC instant with millisecond precision. Sub-millisecond digits are
/// dropped on construction so that the textual form round-trips exactly.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(ts: DateTime<Utc>) -> Self {
        Self(ts.trunc_subsecs(3))
    }

    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    pub fn parse(s: &str) -> Fallible<Self> {
        match DateTime::parse_from_rfc3339(s) {
            Ok(ts) => Ok(Self::new(ts.with_timezone(&Utc))),
            Err(e) => fail(format!("invalid timestamp {s:?}: {e}")),
        }
    }

    pub fn to_rfc3339(self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn plus(self, duration: Duration) -> Self {
        Self(self.0 + duration)
    }

    pub fn plus_days(self, days: i64) -> Self {
        self.plus(Duration::days(days))
    }

    /// The signed duration from `earlier` to `self`.
    pub fn since(self, earlier: Timestamp) -> Duration {
        self.0 - earlier.0
    }

    /// Whole days elapsed since `earlier`, never negative.
    pub fn days_since(self, earlier: Timestamp) -> i64 {
        self.since(earlier).num_days().max(0)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let string = String::deserialize(deserializer)?;
        Timestamp::parse(&string).map_err(|e| serde::de::Error::custom(e.message().to_string()))
    }
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_rfc3339()))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Timestamp::parse(&string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_rfc3339_format() -> Fallible<()> {
        let ts = Timestamp::new(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap());
        assert_eq!(ts.to_rfc3339(), "2025-01-02T03:04:05.000Z");
        assert_eq!(Timestamp::parse("2025-01-02T03:04:05.000Z")?, ts);
        Ok(())
    }

    #[test]
    fn test_parse_offset() -> Fallible<()> {
        let ts = Timestamp::parse("2025-01-02T05:04:05+02:00")?;
        assert_eq!(ts.to_rfc3339(), "2025-01-02T03:04:05.000Z");
        Ok(())
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Timestamp::parse("yesterday").is_err());
    }

    #[test]
    fn test_now_round_trips() -> Fallible<()> {
        let ts = Timestamp::now();
        let json = serde_json::to_string(&ts)?;
        let back: Timestamp = serde_json::from_str(&json)?;
        assert_eq!(ts, back);
        Ok(())
    }

    #[test]
    fn test_days_since() {
        let a = Timestamp::new(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap());
        assert_eq!(a.plus_days(3).days_since(a), 3);
        assert_eq!(a.plus(Duration::hours(47)).days_since(a), 1);
        assert_eq!(a.days_since(a.plus_days(1)), 0);
    }
}
