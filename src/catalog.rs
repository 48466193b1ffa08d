use std::{collections::HashMap, path::Path};

use crate::{format::Unit, fuzzy, plural::PluralRule};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("cannot read catalog {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid catalog: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fixed string shown for a datetime less than a minute ago.
pub const NOW: &str = "NOW";
/// Fixed string shown for a datetime in the future.
pub const FUTURE: &str = "FUTURE";

const UNITS: [Unit; 6] = [
    Unit::Minute,
    Unit::Hour,
    Unit::Day,
    Unit::Week,
    Unit::Month,
    Unit::Year,
];

/// Every key the relative-time formatter reads.
pub fn known_keys() -> impl Iterator<Item = &'static str> {
    UNITS
        .into_iter()
        .flat_map(|unit| [Some(unit.plural_key()), unit.singular_key(), unit.dual_key()])
        .flatten()
        .chain([NOW, FUTURE])
}

/// The translated strings of one language.
#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub plural_rule: PluralRule,

    /// Plural forms by key, indexed by the plural rule's form index.
    #[serde(default)]
    pub plural_strings: HashMap<String, Vec<String>>,

    #[serde(default)]
    pub strings: HashMap<String, String>,
}

impl Catalog {
    pub fn new(plural_rule: PluralRule) -> Self {
        Self {
            plural_rule,
            ..Self::default()
        }
    }

    pub fn with_plural<I>(mut self, key: impl Into<String>, forms: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let forms = forms.into_iter().map(Into::into).collect();
        self.plural_strings.insert(key.into(), forms);
        self
    }

    pub fn with_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.strings.insert(key.into(), value.into());
        self
    }

    pub fn from_json(data: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        Self::from_json(&read(path.as_ref())?)
    }

    /// The fixed string for `key`. Empty strings count as missing.
    pub fn string(&self, key: &str) -> Option<&str> {
        self.strings
            .get(key)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// The plural form of `key` for `n`, with `n` substituted for `%d`.
    /// Empty forms count as missing.
    pub fn plural(&self, key: &str, n: u64) -> Option<String> {
        let form = self.plural_rule.form(n);
        self.plural_strings
            .get(key)?
            .get(form)
            .filter(|s| !s.is_empty())
            .map(|s| s.replacen("%d", &n.to_string(), 1))
    }

    /// Checks the relative-time entries of this catalog.
    pub fn validate(&self) -> Vec<Issue> {
        let mut issues = vec![];

        let mut keys = self
            .plural_strings
            .keys()
            .chain(self.strings.keys())
            .filter(|key| key.starts_with("relativetime."))
            .collect::<Vec<_>>();
        keys.sort();
        keys.dedup();

        for key in keys {
            if !known_keys().any(|known| known == key.as_str()) {
                issues.push(Issue::UnknownKey {
                    key: key.clone(),
                    suggestion: fuzzy::closest(key, known_keys(), true).map(str::to_string),
                });
            }
        }

        for unit in UNITS {
            let key = unit.plural_key();
            let Some(forms) = self.plural_strings.get(key) else {
                continue;
            };

            let expected = self.plural_rule.form_count();
            if forms.len() != expected {
                issues.push(Issue::FormCount {
                    key: key.to_string(),
                    rule: self.plural_rule,
                    expected,
                    found: forms.len(),
                });
            }

            for (form, s) in forms.iter().enumerate() {
                if !s.is_empty() && !s.contains("%d") {
                    issues.push(Issue::MissingPlaceholder {
                        key: key.to_string(),
                        form,
                    });
                }
            }
        }

        issues
    }
}

/// A problem found by [`Catalog::validate`]. Formatting still works, but
/// degrades to the untranslated phrasing or drops the count.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Issue {
    #[error("unknown key '{key}'{}", did_you_mean(.suggestion))]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
    },

    #[error("'{key}' has {found} forms, but plural rule {rule} needs {expected}")]
    FormCount {
        key: String,
        rule: PluralRule,
        expected: usize,
        found: usize,
    },

    #[error("form {form} of '{key}' has no %d placeholder")]
    MissingPlaceholder { key: String, form: usize },
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(", did you mean '{s}'?"))
        .unwrap_or_default()
}

/// The translation payload a page is rendered with: the current language
/// and the default language used when a string is not translated.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PageData {
    #[serde(default)]
    pub plural_rule_lang: PluralRule,

    #[serde(default)]
    pub plural_rule_fallback: PluralRule,

    #[serde(default)]
    pub pluralstrings_lang: HashMap<String, Vec<String>>,

    #[serde(default)]
    pub pluralstrings_fallback: HashMap<String, Vec<String>>,

    #[serde(default)]
    pub datetimestrings: HashMap<String, String>,
}

impl PageData {
    pub fn from_json(data: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        Self::from_json(&read(path.as_ref())?)
    }

    /// Splits the payload into the active and the fallback catalog.
    pub fn into_catalogs(self) -> (Catalog, Catalog) {
        let active = Catalog {
            plural_rule: self.plural_rule_lang,
            plural_strings: self.pluralstrings_lang,
            strings: self.datetimestrings,
        };
        let fallback = Catalog {
            plural_rule: self.plural_rule_fallback,
            plural_strings: self.pluralstrings_fallback,
            strings: HashMap::new(),
        };
        (active, fallback)
    }
}

fn read(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_string_lossy().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn russian() -> Catalog {
        Catalog::new(PluralRule::Russian).with_plural(
            "relativetime.days",
            ["%d день назад", "%d дня назад", "%d дней назад"],
        )
    }

    #[test]
    fn plural_forms() {
        let catalog = russian();
        assert_eq!(catalog.plural("relativetime.days", 1).unwrap(), "1 день назад");
        assert_eq!(catalog.plural("relativetime.days", 3).unwrap(), "3 дня назад");
        assert_eq!(catalog.plural("relativetime.days", 5).unwrap(), "5 дней назад");
        assert_eq!(catalog.plural("relativetime.days", 21).unwrap(), "21 день назад");
        assert_eq!(catalog.plural("relativetime.hours", 1), None);
    }

    #[test]
    fn empty_and_short_forms_are_missing() {
        let catalog = Catalog::new(PluralRule::Common)
            .with_plural("relativetime.days", ["%d day ago", ""])
            .with_plural("relativetime.weeks", ["%d week ago"])
            .with_string(NOW, "");
        assert_eq!(catalog.plural("relativetime.days", 1).unwrap(), "1 day ago");
        assert_eq!(catalog.plural("relativetime.days", 2), None);
        assert_eq!(catalog.plural("relativetime.weeks", 2), None);
        assert_eq!(catalog.string(NOW), None);
    }

    #[test]
    fn replaces_only_the_first_placeholder() {
        let catalog = Catalog::new(PluralRule::OneForm).with_plural("relativetime.mins", ["%d/%d"]);
        assert_eq!(catalog.plural("relativetime.mins", 4).unwrap(), "4/%d");
    }

    #[test]
    fn validation() {
        let catalog = russian()
            .with_plural("relativetime.hours", ["час назад", "%d часа назад"])
            .with_string("relativetime.1dya", "вчера")
            .with_string("relativetime.1day", "вчера")
            .with_string("unrelated.key", "x");

        let issues = catalog.validate();
        assert_eq!(
            issues,
            vec![
                Issue::UnknownKey {
                    key: "relativetime.1dya".into(),
                    suggestion: Some("relativetime.1day".into()),
                },
                Issue::FormCount {
                    key: "relativetime.hours".into(),
                    rule: PluralRule::Russian,
                    expected: 3,
                    found: 2,
                },
                Issue::MissingPlaceholder {
                    key: "relativetime.hours".into(),
                    form: 0,
                },
            ]
        );
        assert_eq!(
            issues[0].to_string(),
            "unknown key 'relativetime.1dya', did you mean 'relativetime.1day'?"
        );
        assert!(russian().validate().is_empty());
    }

    #[test]
    fn catalog_json() {
        let catalog = Catalog::from_json(
            r#"{
                "plural_rule": 13,
                "plural_strings": { "relativetime.years": ["", "", "", "", "", "%d سنة"] },
                "strings": { "NOW": "الآن" }
            }"#,
        )
        .unwrap();
        assert_eq!(catalog.plural_rule, PluralRule::Arabic);
        assert_eq!(catalog.plural("relativetime.years", 100).unwrap(), "100 سنة");
        assert_eq!(catalog.plural("relativetime.years", 1), None);
        assert_eq!(catalog.string(NOW), Some("الآن"));

        assert!(matches!(
            Catalog::from_json(r#"{ "plural_rule": 42 }"#),
            Err(CatalogError::Json(..))
        ));
    }

    #[test]
    fn page_data_splits_into_catalogs() {
        let data = PageData::from_json(
            r#"{
                "PLURAL_RULE_LANG": 7,
                "PLURAL_RULE_FALLBACK": 0,
                "PLURALSTRINGS_LANG": { "relativetime.mins": ["%d minutę temu", "%d minuty temu", "%d minut temu"] },
                "PLURALSTRINGS_FALLBACK": { "relativetime.mins": ["%d minute ago", "%d minutes ago"] },
                "DATETIMESTRINGS": { "NOW": "teraz", "FUTURE": "w przyszłości" }
            }"#,
        )
        .unwrap();

        let (active, fallback) = data.into_catalogs();
        assert_eq!(active.plural_rule, PluralRule::Polish);
        assert_eq!(active.plural("relativetime.mins", 22).unwrap(), "22 minuty temu");
        assert_eq!(active.string(FUTURE), Some("w przyszłości"));
        assert_eq!(fallback.plural_rule, PluralRule::Common);
        assert_eq!(fallback.plural("relativetime.mins", 2).unwrap(), "2 minutes ago");
    }

    #[test]
    fn missing_file() {
        let err = Catalog::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
