use time::{
    format_description::well_known::{Iso8601, Rfc3339},
    macros::format_description,
    Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, UtcOffset,
};

use crate::format::{FormatRelative, Unit};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("empty datetime")]
    Empty,

    #[error("invalid datetime '{input}': {source}")]
    Invalid {
        input: String,
        source: time::error::Parse,
    },

    #[error("invalid utc offset '{input}'")]
    Offset { input: String },
}

/// An absolute instant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimePoint(pub OffsetDateTime);

impl TimePoint {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    pub fn from_unix_millis(millis: i64) -> Option<Self> {
        OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * 1_000_000)
            .ok()
            .map(Self)
    }

    pub fn unix_millis(self) -> i64 {
        (self.0.unix_timestamp_nanos() / 1_000_000) as i64
    }

    /// Parses an ISO 8601 datetime.
    ///
    /// Datetimes without an offset, and bare dates, are taken as UTC.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseError::Empty);
        }

        if let Ok(dt) = OffsetDateTime::parse(input, &Rfc3339) {
            return Ok(Self(dt));
        }
        if let Ok(dt) = OffsetDateTime::parse(input, &Iso8601::DEFAULT) {
            return Ok(Self(dt));
        }
        if let Ok(dt) = PrimitiveDateTime::parse(input, &Iso8601::DEFAULT) {
            return Ok(Self(dt.assume_utc()));
        }

        Date::parse(input, format_description!("[year]-[month]-[day]"))
            .map(|date| Self(date.midnight().assume_utc()))
            .map_err(|source| ParseError::Invalid {
                input: input.to_string(),
                source,
            })
    }

    /// Whole `unit`s elapsed from `then` until `self`, never negative.
    ///
    /// Years and months follow the calendar in `offset`, the other units
    /// are multiples of their fixed length.
    pub fn elapsed(self, then: Self, unit: Unit, offset: UtcOffset) -> i64 {
        let delta = self.0 - then.0;
        let n = match unit {
            Unit::Year => whole_months(then.local_pair(self, offset)) / 12,
            Unit::Month => whole_months(then.local_pair(self, offset)),
            Unit::Week => delta.whole_weeks(),
            Unit::Day => delta.whole_days(),
            Unit::Hour => delta.whole_hours(),
            Unit::Minute => delta.whole_minutes(),
        };
        n.max(0)
    }

    /// The time left until `self` is reached from `now`, in whole milliseconds.
    pub fn until(self, now: Self) -> Duration {
        Duration::milliseconds((self.0 - now.0).whole_milliseconds() as i64)
    }

    /// The absolute time in `offset`, e.g. `October 15, 2026, 14:05 UTC+02:00`.
    ///
    /// Instants that cannot be shown in `offset` (past the year 9999) are
    /// written as RFC 3339 in UTC.
    pub fn absolute(self, offset: UtcOffset, format: &(impl FormatRelative + ?Sized)) -> String {
        match self.0.checked_to_offset(offset) {
            Some(dt) => {
                let wall = PrimitiveDateTime::new(dt.date(), dt.time());
                format!("{} {}", format.datetime(wall), zone_name(offset))
            }
            None => self.in_utc().to_string(),
        }
    }

    fn in_utc(self) -> Self {
        self.0.checked_to_offset(UtcOffset::UTC).map_or(self, Self)
    }

    // both in `offset`, or both in UTC when one of them leaves the calendar
    fn local_pair(self, now: Self, offset: UtcOffset) -> (OffsetDateTime, OffsetDateTime) {
        match (self.0.checked_to_offset(offset), now.0.checked_to_offset(offset)) {
            (Some(then), Some(now)) => (then, now),
            _ => (self.in_utc().0, now.in_utc().0),
        }
    }
}

impl std::str::FromStr for TimePoint {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for TimePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.format(&Rfc3339) {
            Ok(s) => f.write_str(&s),
            Err(..) => write!(f, "{}", self.0),
        }
    }
}

/// Parses `Z`, `UTC`, an empty string or `±hh:mm`.
pub fn parse_offset(input: &str) -> Result<UtcOffset, ParseError> {
    match input.trim() {
        "" | "Z" | "UTC" | "utc" => Ok(UtcOffset::UTC),
        s => UtcOffset::parse(
            s,
            format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
        )
        .map_err(|_| ParseError::Offset {
            input: s.to_string(),
        }),
    }
}

fn zone_name(offset: UtcOffset) -> String {
    if offset.is_utc() {
        return String::from("UTC");
    }
    let (h, m, _) = offset.as_hms();
    let sign = if offset.is_negative() { '-' } else { '+' };
    format!("UTC{sign}{:02}:{:02}", h.unsigned_abs(), m.unsigned_abs())
}

// both sides must already be in the same offset
fn whole_months((then, now): (OffsetDateTime, OffsetDateTime)) -> i64 {
    let mut months = (now.year() as i64 - then.year() as i64) * 12
        + (now.month() as i64 - then.month() as i64);
    if months > 0 && add_months(then, months).map_or(true, |anchor| anchor > now) {
        months -= 1;
    }
    months
}

fn add_months(dt: OffsetDateTime, months: i64) -> Option<OffsetDateTime> {
    let total = dt.year() as i64 * 12 + (dt.month() as i64 - 1) + months;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = Month::January.nth_next(total.rem_euclid(12) as u8);
    let date = (1..=dt.day())
        .rev()
        .find_map(|day| Date::from_calendar_date(year, month, day).ok())?;
    Some(dt.replace_date(date))
}

#[cfg(test)]
mod tests {
    use time::macros::{datetime, offset};

    use super::*;
    use crate::format::English;

    #[track_caller]
    fn elapsed(then: OffsetDateTime, now: OffsetDateTime, unit: Unit) -> i64 {
        TimePoint(now).elapsed(TimePoint(then), unit, UtcOffset::UTC)
    }

    #[test]
    fn parsing() {
        #[track_caller]
        fn case(input: &str, expected: OffsetDateTime) {
            assert_eq!(TimePoint::parse(input).unwrap(), TimePoint(expected));
        }

        case("2024-06-15T12:00:00Z", datetime!(2024-06-15 12:00 UTC));
        case("2024-06-15T14:00:00+02:00", datetime!(2024-06-15 12:00 UTC));
        case("2024-06-15T12:00:00.250Z", datetime!(2024-06-15 12:00:00.25 UTC));
        case("2024-06-15T12:00:00", datetime!(2024-06-15 12:00 UTC));
        case("2024-06-15", datetime!(2024-06-15 0:00 UTC));
        case("  2024-06-15T12:00:00Z ", datetime!(2024-06-15 12:00 UTC));

        assert!(matches!(TimePoint::parse(""), Err(ParseError::Empty)));
        assert!(matches!(TimePoint::parse("   "), Err(ParseError::Empty)));
        assert!(matches!(
            TimePoint::parse("yesterday"),
            Err(ParseError::Invalid { .. })
        ));
    }

    #[test]
    fn unix_millis() {
        let t = TimePoint::from_unix_millis(1_718_452_800_123).unwrap();
        assert_eq!(t.unix_millis(), 1_718_452_800_123);
        assert_eq!(t.0, datetime!(2024-06-15 12:00:00.123 UTC));
    }

    #[test]
    fn calendar_months() {
        let now = datetime!(2024-03-15 12:00 UTC);
        assert_eq!(elapsed(datetime!(2024-02-15 12:00 UTC), now, Unit::Month), 1);
        assert_eq!(elapsed(datetime!(2024-02-15 12:01 UTC), now, Unit::Month), 0);
        assert_eq!(elapsed(datetime!(2023-03-15 12:00 UTC), now, Unit::Year), 1);
        assert_eq!(elapsed(datetime!(2023-03-15 12:01 UTC), now, Unit::Year), 0);
        assert_eq!(elapsed(datetime!(2023-03-15 12:01 UTC), now, Unit::Month), 11);

        // the 31st clamps to the end of shorter months
        let now = datetime!(2024-02-29 12:00 UTC);
        assert_eq!(elapsed(datetime!(2024-01-31 12:00 UTC), now, Unit::Month), 1);
        assert_eq!(elapsed(datetime!(2024-01-31 12:01 UTC), now, Unit::Month), 0);
    }

    #[test]
    fn fixed_units() {
        let now = datetime!(2024-06-15 12:00 UTC);
        assert_eq!(elapsed(datetime!(2024-06-14 11:00 UTC), now, Unit::Day), 1);
        assert_eq!(elapsed(datetime!(2024-06-14 11:00 UTC), now, Unit::Hour), 25);
        assert_eq!(elapsed(datetime!(2024-06-15 11:58:30 UTC), now, Unit::Minute), 1);
        assert_eq!(elapsed(datetime!(2024-06-01 12:00 UTC), now, Unit::Week), 2);
        assert_eq!(elapsed(datetime!(2024-06-16 12:00 UTC), now, Unit::Day), 0);
    }

    #[test]
    fn months_follow_the_viewer_offset() {
        // in UTC+01:00 this is March 1st 00:30 to April 1st 00:00
        let then = TimePoint(datetime!(2024-02-29 23:30 UTC));
        let now = TimePoint(datetime!(2024-03-31 23:00 UTC));
        assert_eq!(now.elapsed(then, Unit::Month, UtcOffset::UTC), 1);
        assert_eq!(now.elapsed(then, Unit::Month, offset!(+1)), 0);
    }

    #[test]
    fn absolute_time() {
        let t = TimePoint(datetime!(2026-10-15 12:05 UTC));
        assert_eq!(t.absolute(UtcOffset::UTC, &English), "October 15, 2026, 12:05 UTC");
        assert_eq!(
            t.absolute(offset!(+2), &English),
            "October 15, 2026, 14:05 UTC+02:00"
        );
        assert_eq!(
            t.absolute(offset!(-5:30), &English),
            "October 15, 2026, 06:35 UTC-05:30"
        );
    }

    #[test]
    fn end_of_the_calendar() {
        let t = TimePoint::parse("9999-12-31T23:30:00Z").unwrap();
        assert_eq!(t.absolute(offset!(+3), &English), "9999-12-31T23:30:00Z");
        assert_eq!(
            t.absolute(offset!(-3), &English),
            "December 31, 9999, 20:30 UTC-03:00"
        );

        let now = TimePoint::parse("9999-12-31T23:59:00Z").unwrap();
        assert_eq!(now.elapsed(t, Unit::Month, offset!(+3)), 0);
        assert_eq!(now.elapsed(t, Unit::Minute, offset!(+3)), 29);

        let then = TimePoint::parse("9998-11-30T12:00:00Z").unwrap();
        assert_eq!(now.elapsed(then, Unit::Month, offset!(+3)), 13);
        assert_eq!(now.elapsed(then, Unit::Year, offset!(+3)), 1);
    }

    #[test]
    fn offsets() {
        assert_eq!(parse_offset("").unwrap(), UtcOffset::UTC);
        assert_eq!(parse_offset("Z").unwrap(), UtcOffset::UTC);
        assert_eq!(parse_offset("+02:00").unwrap(), offset!(+2));
        assert_eq!(parse_offset("-05:30").unwrap(), offset!(-5:30));
        assert!(matches!(
            parse_offset("two hours"),
            Err(ParseError::Offset { .. })
        ));
    }
}
