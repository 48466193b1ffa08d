use time::{macros::format_description, PrimitiveDateTime};

/// A relative-time unit, ordered from the finest to the coarsest.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Unit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Unit {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// The catalog key holding the plural forms for this unit.
    pub const fn plural_key(self) -> &'static str {
        match self {
            Self::Minute => "relativetime.mins",
            Self::Hour => "relativetime.hours",
            Self::Day => "relativetime.days",
            Self::Week => "relativetime.weeks",
            Self::Month => "relativetime.months",
            Self::Year => "relativetime.years",
        }
    }

    /// The dedicated "one unit ago" string, only calendar units have one.
    pub const fn singular_key(self) -> Option<&'static str> {
        match self {
            Self::Day => Some("relativetime.1day"),
            Self::Week => Some("relativetime.1week"),
            Self::Month => Some("relativetime.1month"),
            Self::Year => Some("relativetime.1year"),
            Self::Minute | Self::Hour => None,
        }
    }

    /// The dedicated "two units ago" string, only calendar units have one.
    pub const fn dual_key(self) -> Option<&'static str> {
        match self {
            Self::Day => Some("relativetime.2days"),
            Self::Week => Some("relativetime.2weeks"),
            Self::Month => Some("relativetime.2months"),
            Self::Year => Some("relativetime.2years"),
            Self::Minute | Self::Hour => None,
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Untranslated relative-time phrasing, used when a catalog has no string
/// for the requested form, and the viewer's absolute datetime format.
pub trait FormatRelative {
    /// `value` is negative for the past and positive for the future.
    fn format_relative(&self, value: i64, unit: Unit) -> String;

    fn now(&self) -> String;

    fn future(&self) -> String;

    /// A wall-clock datetime, without its zone: `October 15, 2026, 14:05`.
    fn datetime(&self, dt: PrimitiveDateTime) -> String {
        let text = dt.format(format_description!(
            "[month repr:long] [day padding:none], [year], [hour]:[minute]"
        ));
        text.unwrap_or_else(|err| {
            log::warn!("cannot format {dt}: {err}");
            dt.to_string()
        })
    }
}

/// Long-style English phrasing: `2 days ago`, `in 1 hour`.
#[derive(Copy, Clone, Debug, Default)]
pub struct English;

impl FormatRelative for English {
    fn format_relative(&self, value: i64, unit: Unit) -> String {
        let n = value.unsigned_abs();
        let unit = plural(unit.as_str(), n);
        if value < 0 {
            format!("{n} {unit} ago")
        } else {
            format!("in {n} {unit}")
        }
    }

    fn now(&self) -> String {
        String::from("now")
    }

    fn future(&self) -> String {
        String::from("in the future")
    }
}

fn plural(name: &str, n: u64) -> std::borrow::Cow<'_, str> {
    if n == 1 {
        name.into()
    } else {
        format!("{name}s").into()
    }
}

pub trait FormatTime {
    fn as_readable_time(&self) -> String;
}

impl FormatTime for std::time::Duration {
    fn as_readable_time(&self) -> String {
        readable_millis(self.as_millis())
    }
}

impl FormatTime for time::Duration {
    fn as_readable_time(&self) -> String {
        readable_millis(self.whole_milliseconds().unsigned_abs())
    }
}

fn readable_millis(mut millis: u128) -> String {
    const TABLE: [(&str, u128); 5] = [
        ("day", 86_400_000),
        ("hour", 3_600_000),
        ("minute", 60_000),
        ("second", 1_000),
        ("millisecond", 1),
    ];

    if millis == 0 {
        return String::from("0 milliseconds");
    }

    let mut parts = vec![];
    for (name, size) in TABLE {
        let n = millis / size;
        if n > 0 {
            parts.push(format!("{n} {}", plural(name, n as u64)));
            millis %= size;
        }
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_phrasing() {
        assert_eq!(English.format_relative(-2, Unit::Day), "2 days ago");
        assert_eq!(English.format_relative(-1, Unit::Minute), "1 minute ago");
        assert_eq!(English.format_relative(1, Unit::Hour), "in 1 hour");
        assert_eq!(English.format_relative(3, Unit::Year), "in 3 years");
        assert_eq!(English.now(), "now");
    }

    #[test]
    fn english_datetime() {
        let dt = time::macros::datetime!(2026-10-05 09:05);
        assert_eq!(English.datetime(dt), "October 5, 2026, 09:05");
    }

    #[test]
    fn calendar_units_have_dedicated_keys() {
        for unit in [Unit::Day, Unit::Week, Unit::Month, Unit::Year] {
            assert!(unit.singular_key().is_some());
            assert!(unit.dual_key().is_some());
        }
        for unit in [Unit::Minute, Unit::Hour] {
            assert_eq!(unit.singular_key(), None);
            assert_eq!(unit.dual_key(), None);
        }
        assert_eq!(Unit::Minute.plural_key(), "relativetime.mins");
    }

    #[test]
    fn readable_durations() {
        assert_eq!(time::Duration::DAY.as_readable_time(), "1 day");
        assert_eq!(
            std::time::Duration::from_millis(61_500).as_readable_time(),
            "1 minute, 1 second, 500 milliseconds"
        );
        assert_eq!(time::Duration::seconds(30).as_readable_time(), "30 seconds");
        assert_eq!(time::Duration::ZERO.as_readable_time(), "0 milliseconds");
    }
}
