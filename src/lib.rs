mod catalog;
mod config;
mod element;
mod format;
mod fuzzy;
mod locale;
mod plural;
mod relative;
mod time;

pub use catalog::{known_keys, Catalog, CatalogError, Issue, PageData, FUTURE, NOW};
pub use config::{Catalogs, Config, ConfigError, Viewer};
pub use element::{Element, Update};
pub use format::{English, FormatRelative, FormatTime, Unit};
pub use locale::{parse_locale, Cldr, LocaleError};
pub use plural::{resolve, PluralError, PluralRule};
pub use relative::{
    Elapsed, Relative, RelativeTime, HALF_MINUTE, ONE_DAY, ONE_HOUR, ONE_MINUTE,
};
pub use self::time::{parse_offset, ParseError, TimePoint};
