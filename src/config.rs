use std::path::{Path, PathBuf};

use icu::locale::Locale;
use mlua::LuaSerdeExt as _;
use serde::{de::Error as _, Deserialize, Deserializer};
use time::UtcOffset;

use crate::{
    catalog::{Catalog, CatalogError, PageData},
    locale::{parse_locale, Cldr, LocaleError},
    relative::RelativeTime,
    time::parse_offset,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read configuration file at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("lua error: {0}")]
    Lua(#[from] mlua::Error),

    #[error("invalid configuration file")]
    Invalid(Vec<String>),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Locale(#[from] LocaleError),
}

/// Where the translations come from: either a page payload, or one catalog
/// per language.
#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct Catalogs {
    #[serde(default)]
    pub page_data: Option<PathBuf>,

    #[serde(default)]
    pub active: Option<PathBuf>,

    #[serde(default)]
    pub fallback: Option<PathBuf>,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Viewer {
    /// e.g. `+02:00`, empty for UTC
    #[serde(default = "utc", deserialize_with = "deserialize_offset")]
    pub utc_offset: UtcOffset,

    /// The viewer's language, e.g. `ru`. Untranslated forms and the tooltip
    /// are written in English when unset.
    #[serde(default, deserialize_with = "deserialize_locale")]
    pub locale: Option<Locale>,
}

impl Default for Viewer {
    fn default() -> Self {
        Self {
            utc_offset: UtcOffset::UTC,
            locale: None,
        }
    }
}

const fn utc() -> UtcOffset {
    UtcOffset::UTC
}

fn deserialize_offset<'de, D: Deserializer<'de>>(de: D) -> Result<UtcOffset, D::Error> {
    let input = String::deserialize(de)?;
    parse_offset(&input).map_err(|err| {
        D::Error::custom(format!(
            "display.utc_offset: {err} (this looks like \"+02:00\", or \"UTC\")"
        ))
    })
}

fn deserialize_locale<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Locale>, D::Error> {
    match Option::<String>::deserialize(de)? {
        Some(input) if !input.trim().is_empty() => parse_locale(&input)
            .map(Some)
            .map_err(|err| D::Error::custom(format!("display.locale: {err}"))),
        _ => Ok(None),
    }
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalogs: Catalogs,

    #[serde(default)]
    pub display: Viewer,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        Self::from_lua(&source)
    }

    /// Evaluates a Lua chunk returning the configuration table.
    pub fn from_lua(source: &str) -> Result<Self, ConfigError> {
        let lua = mlua::Lua::new();

        lua.globals().set(
            "get_env",
            lua.create_function(|_, key: String| Ok(std::env::var(&key).ok()))?,
        )?;

        let value = lua.load(source).eval()?;
        let config: Config = lua.from_value(value)?;

        let errors = config.validate();
        if !errors.is_empty() {
            return Err(ConfigError::Invalid(errors));
        }
        Ok(config)
    }

    fn validate(&self) -> Vec<String> {
        let mut errors = vec![];

        let catalogs = &self.catalogs;
        match (&catalogs.page_data, &catalogs.active) {
            (None, None) => errors.push(String::from(
                "error: catalogs.active or catalogs.page_data is required\n\
                 note: this is the translation of the displayed language",
            )),
            (Some(..), Some(..)) => errors.push(String::from(
                "error: catalogs.active and catalogs.page_data cannot both be set\n\
                 note: page_data already contains both languages",
            )),
            _ => {}
        }

        if catalogs.page_data.is_some() && catalogs.fallback.is_some() {
            errors.push(String::from(
                "error: catalogs.fallback cannot be used with catalogs.page_data\n\
                 note: page_data already contains both languages",
            ));
        }

        for (key, path) in [
            ("page_data", &catalogs.page_data),
            ("active", &catalogs.active),
            ("fallback", &catalogs.fallback),
        ] {
            if path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
                errors.push(format!(
                    "error: catalogs.{key} is empty\nnote: this is a path to a json file"
                ));
            }
        }

        errors
    }

    /// Loads the configured catalogs, and the viewer's locale data.
    pub fn formatter(&self) -> Result<RelativeTime, ConfigError> {
        let (active, fallback) = match &self.catalogs {
            Catalogs {
                page_data: Some(path),
                ..
            } => PageData::load(path)?.into_catalogs(),
            Catalogs { active, fallback, .. } => {
                let active = active.as_ref().map(Catalog::load).transpose()?;
                let fallback = fallback.as_ref().map(Catalog::load).transpose()?;
                (active.unwrap_or_default(), fallback.unwrap_or_default())
            }
        };

        for (name, catalog) in [("active", &active), ("fallback", &fallback)] {
            for issue in catalog.validate() {
                log::warn!("{name} catalog: {issue}");
            }
        }

        let formatter = RelativeTime::new(active, fallback).with_offset(self.display.utc_offset);
        match &self.display.locale {
            Some(locale) => Ok(formatter.with_generic(Cldr::new(locale)?)),
            None => Ok(formatter),
        }
    }
}
