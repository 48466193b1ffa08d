//! Localized relative-time text ("2 days ago") and when it goes stale.

use time::{Duration, UtcOffset};

use crate::{
    catalog::{Catalog, FUTURE, NOW},
    format::{English, FormatRelative, Unit},
    time::TimePoint,
};

pub const HALF_MINUTE: Duration = Duration::seconds(30);
pub const ONE_MINUTE: Duration = Duration::minutes(1);
pub const ONE_HOUR: Duration = Duration::hours(1);
pub const ONE_DAY: Duration = Duration::days(1);

/// What the displayed text describes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Elapsed {
    Future,
    Now,
    Ago { unit: Unit, count: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relative {
    pub text: String,
    /// The absolute time, in the viewer's offset.
    pub tooltip: String,
    pub elapsed: Elapsed,
    /// How long until `text` has to be computed again.
    pub next: Duration,
}

impl Relative {
    pub fn next_millis(&self) -> i64 {
        self.next.whole_milliseconds() as i64
    }
}

pub struct RelativeTime {
    active: Catalog,
    fallback: Catalog,
    generic: Box<dyn FormatRelative + Send + Sync>,
    offset: UtcOffset,
}

impl std::fmt::Debug for RelativeTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelativeTime")
            .field("active", &self.active.plural_rule)
            .field("fallback", &self.fallback.plural_rule)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

impl RelativeTime {
    pub fn new(active: Catalog, fallback: Catalog) -> Self {
        Self {
            active,
            fallback,
            generic: Box::new(English),
            offset: UtcOffset::UTC,
        }
    }

    /// Replaces the phrasing used for strings missing from the catalogs,
    /// and the tooltip's datetime format.
    pub fn with_generic(mut self, generic: impl FormatRelative + Send + Sync + 'static) -> Self {
        self.generic = Box::new(generic);
        self
    }

    /// The viewer's offset, used for calendar arithmetic and the tooltip.
    pub fn with_offset(mut self, offset: UtcOffset) -> Self {
        self.offset = offset;
        self
    }

    pub const fn offset(&self) -> UtcOffset {
        self.offset
    }

    /// Formats a `datetime` attribute.
    ///
    /// Returns `None` when it is missing or unparseable; such a datetime
    /// should not be rescheduled.
    pub fn format_attribute(&self, datetime: Option<&str>, now: TimePoint) -> Option<Relative> {
        let then = match TimePoint::parse(datetime?) {
            Ok(then) => then,
            Err(err) => {
                log::debug!("not formatting: {err}");
                return None;
            }
        };
        Some(self.format(then, now))
    }

    pub fn format(&self, then: TimePoint, now: TimePoint) -> Relative {
        let tooltip = then.absolute(self.offset, &*self.generic);

        if now < then {
            return Relative {
                text: self.fixed(FUTURE),
                tooltip,
                elapsed: Elapsed::Future,
                next: then.until(now),
            };
        }

        const UNITS: [(Unit, Duration); 6] = [
            (Unit::Year, ONE_DAY),
            (Unit::Month, ONE_DAY),
            (Unit::Week, ONE_DAY),
            (Unit::Day, ONE_DAY),
            (Unit::Hour, ONE_HOUR),
            (Unit::Minute, ONE_MINUTE),
        ];

        for (unit, next) in UNITS {
            let count = now.elapsed(then, unit, self.offset);
            if count < 1 {
                continue;
            }

            let count = count as u64;
            return Relative {
                text: self.calendar(unit, count),
                tooltip,
                elapsed: Elapsed::Ago { unit, count },
                next,
            };
        }

        Relative {
            text: self.fixed(NOW),
            tooltip,
            elapsed: Elapsed::Now,
            next: HALF_MINUTE,
        }
    }

    /// The pluralized `unit` string for `n` in the active language, or the
    /// untranslated phrasing when the active catalog lacks that form.
    pub fn pluralized(&self, unit: Unit, n: u64) -> String {
        self.active
            .plural(unit.plural_key(), n)
            .unwrap_or_else(|| {
                let value = i64::try_from(n).map_or(i64::MIN, |n| -n);
                self.generic.format_relative(value, unit)
            })
    }

    // only calendar units have dedicated "1 unit" and "2 units" strings
    fn calendar(&self, unit: Unit, n: u64) -> String {
        let special = match n {
            1 => unit.singular_key(),
            2 => unit.dual_key(),
            _ => None,
        };
        special
            .and_then(|key| self.active.string(key))
            .map(str::to_string)
            .unwrap_or_else(|| self.pluralized(unit, n))
    }

    fn fixed(&self, key: &str) -> String {
        if let Some(s) = self.active.string(key).or_else(|| self.fallback.string(key)) {
            return s.to_string();
        }
        match key {
            FUTURE => self.generic.future(),
            _ => self.generic.now(),
        }
    }
}
