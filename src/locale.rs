//! Untranslated phrasing and tooltip dates from CLDR data, for viewers whose
//! language isn't English.

use fixed_decimal::Decimal;
use icu::{
    datetime::{
        fieldsets::YMDT,
        input::{Date, DateTime, Time},
        options::TimePrecision,
        DateTimeFormatter,
    },
    experimental::relativetime::{
        options::Numeric, RelativeTimeFormatter, RelativeTimeFormatterOptions,
    },
    locale::Locale,
};
use time::PrimitiveDateTime;

use crate::format::{English, FormatRelative, Unit};

#[derive(Debug, thiserror::Error)]
pub enum LocaleError {
    #[error("invalid locale '{input}': {reason}")]
    Invalid { input: String, reason: String },

    #[error("no {what} data for '{locale}': {reason}")]
    Data {
        locale: String,
        what: &'static str,
        reason: String,
    },
}

/// Parses a BCP 47 language tag, e.g. `ru` or `pt-BR`.
pub fn parse_locale(input: &str) -> Result<Locale, LocaleError> {
    input
        .trim()
        .parse::<Locale>()
        .map_err(|err| LocaleError::Invalid {
            input: input.to_string(),
            reason: err.to_string(),
        })
}

/// Long-style phrasing in the viewer's locale: `5 лет назад`, `in 2 days`.
pub struct Cldr {
    locale: Locale,
    // in `Unit` order, finest first
    units: [RelativeTimeFormatter; 6],
    now: RelativeTimeFormatter,
    datetime: DateTimeFormatter<YMDT>,
}

impl std::fmt::Debug for Cldr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cldr")
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

impl Cldr {
    pub fn new(locale: &Locale) -> Result<Self, LocaleError> {
        let always = RelativeTimeFormatterOptions {
            numeric: Numeric::Always,
        };
        let relative = || unavailable(locale, "relative time");
        let units = [
            RelativeTimeFormatter::try_new_long_minute(locale.into(), always)
                .map_err(relative())?,
            RelativeTimeFormatter::try_new_long_hour(locale.into(), always).map_err(relative())?,
            RelativeTimeFormatter::try_new_long_day(locale.into(), always).map_err(relative())?,
            RelativeTimeFormatter::try_new_long_week(locale.into(), always).map_err(relative())?,
            RelativeTimeFormatter::try_new_long_month(locale.into(), always)
                .map_err(relative())?,
            RelativeTimeFormatter::try_new_long_year(locale.into(), always).map_err(relative())?,
        ];

        // "now" is the numeric-auto name of zero seconds
        let now = RelativeTimeFormatter::try_new_long_second(
            locale.into(),
            RelativeTimeFormatterOptions {
                numeric: Numeric::Auto,
            },
        )
        .map_err(relative())?;

        let fields = YMDT::long().with_time_precision(TimePrecision::Minute);
        let datetime = DateTimeFormatter::try_new(locale.into(), fields)
            .map_err(unavailable(locale, "datetime"))?;

        log::debug!("loaded relative time data for {locale}");

        Ok(Self {
            locale: locale.clone(),
            units,
            now,
            datetime,
        })
    }

    pub const fn locale(&self) -> &Locale {
        &self.locale
    }

    fn unit(&self, unit: Unit) -> &RelativeTimeFormatter {
        let index = match unit {
            Unit::Minute => 0,
            Unit::Hour => 1,
            Unit::Day => 2,
            Unit::Week => 3,
            Unit::Month => 4,
            Unit::Year => 5,
        };
        &self.units[index]
    }
}

fn unavailable<E: std::fmt::Display>(
    locale: &Locale,
    what: &'static str,
) -> impl FnOnce(E) -> LocaleError {
    let locale = locale.to_string();
    move |err| LocaleError::Data {
        locale,
        what,
        reason: err.to_string(),
    }
}

impl FormatRelative for Cldr {
    fn format_relative(&self, value: i64, unit: Unit) -> String {
        self.unit(unit).format(Decimal::from(value)).to_string()
    }

    fn now(&self) -> String {
        self.now.format(Decimal::from(0i64)).to_string()
    }

    // CLDR has no phrase for an unspecified future
    fn future(&self) -> String {
        English.future()
    }

    fn datetime(&self, dt: PrimitiveDateTime) -> String {
        let date = Date::try_new_iso(dt.year(), dt.month() as u8, dt.day());
        let time = Time::try_new(dt.hour(), dt.minute(), dt.second(), 0);
        match (date, time) {
            (Ok(date), Ok(time)) => self.datetime.format(&DateTime { date, time }).to_string(),
            _ => English.datetime(dt),
        }
    }
}
