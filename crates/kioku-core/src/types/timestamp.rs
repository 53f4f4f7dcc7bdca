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
use std::ops::Add;
use std::ops::Sub;

use chrono::DateTime;
use chrono::TimeDelta;
use chrono::Utc;

use crate::error::Fallible;

/// An instant in UTC, as handed to the scheduler by its caller.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(ts: DateTime<Utc>) -> Self {
        Self(ts)
    }

    #[cfg(feature = "clock")]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }

    pub fn to_rfc3339(self) -> String {
        self.0.to_rfc3339()
    }

    pub fn parse_rfc3339(s: &str) -> Fallible<Self> {
        let ts = DateTime::parse_from_rfc3339(s)?;
        Ok(Self(ts.with_timezone(&Utc)))
    }
}

impl Add<TimeDelta> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: TimeDelta) -> Self::Output {
        Timestamp(self.0 + rhs)
    }
}

impl Sub for Timestamp {
    type Output = TimeDelta;

    fn sub(self, rhs: Timestamp) -> Self::Output {
        self.0 - rhs.0
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_rfc3339_round_trip() -> Fallible<()> {
        let ts = Timestamp::new(Utc.with_ymd_and_hms(2022, 11, 29, 12, 30, 0).unwrap());
        assert_eq!(Timestamp::parse_rfc3339(&ts.to_rfc3339())?, ts);
        Ok(())
    }

    #[test]
    fn test_parse_normalizes_offset() -> Fallible<()> {
        let ts = Timestamp::parse_rfc3339("2022-11-29T21:30:00+09:00")?;
        let expected = Timestamp::new(Utc.with_ymd_and_hms(2022, 11, 29, 12, 30, 0).unwrap());
        assert_eq!(ts, expected);
        Ok(())
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Timestamp::parse_rfc3339("yesterday").is_err());
    }

    #[test]
    fn test_arithmetic() {
        let start = Timestamp::new(Utc.with_ymd_and_hms(2022, 11, 29, 12, 30, 0).unwrap());
        let end = start + TimeDelta::days(3);
        assert_eq!(end - start, TimeDelta::days(3));
        assert!(start < end);
    }
}
