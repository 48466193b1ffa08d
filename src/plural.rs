//! The plural rule families known to the translation catalogs.
//!
//! The index of each rule is shared with the catalogs (`PLURAL_RULE_LANG`,
//! `PLURAL_RULE_FALLBACK`). Reordering the variants breaks every translation.
//!
//! See <https://www.unicode.org/cldr/charts/46/supplemental/language_plural_rules.html>

#[derive(Debug, thiserror::Error)]
pub enum PluralError {
    #[error("unknown plural rule: {0} (expected 0..={max})", max = PluralRule::ALL.len() - 1)]
    UnknownRule(usize),
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(try_from = "usize")]
pub enum PluralRule {
    /// English, German, ...
    #[default]
    Common = 0,
    Bengali = 1,
    Icelandic = 2,
    Filipino = 3,
    OneForm = 4,
    Czech = 5,
    Russian = 6,
    Polish = 7,
    Latvian = 8,
    Lithuanian = 9,
    French = 10,
    Catalan = 11,
    Slovenian = 12,
    Arabic = 13,
}

impl PluralRule {
    pub const ALL: [Self; 14] = [
        Self::Common,
        Self::Bengali,
        Self::Icelandic,
        Self::Filipino,
        Self::OneForm,
        Self::Czech,
        Self::Russian,
        Self::Polish,
        Self::Latvian,
        Self::Lithuanian,
        Self::French,
        Self::Catalan,
        Self::Slovenian,
        Self::Arabic,
    ];

    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::ALL.len() {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Common => "common 2-form",
            Self::Bengali => "bengali 2-form",
            Self::Icelandic => "icelandic 2-form",
            Self::Filipino => "filipino 2-form",
            Self::OneForm => "one form",
            Self::Czech => "czech 3-form",
            Self::Russian => "russian 3-form",
            Self::Polish => "polish 3-form",
            Self::Latvian => "latvian 3-form",
            Self::Lithuanian => "lithuanian 3-form",
            Self::French => "french 3-form",
            Self::Catalan => "catalan 3-form",
            Self::Slovenian => "slovenian 4-form",
            Self::Arabic => "arabic 6-form",
        }
    }

    /// How many plural forms a catalog has to provide for this rule.
    pub const fn form_count(self) -> usize {
        match self {
            Self::OneForm => 1,
            Self::Common | Self::Bengali | Self::Icelandic | Self::Filipino => 2,
            Self::Czech
            | Self::Russian
            | Self::Polish
            | Self::Latvian
            | Self::Lithuanian
            | Self::French
            | Self::Catalan => 3,
            Self::Slovenian => 4,
            Self::Arabic => 6,
        }
    }

    /// Maps the amount `n` to the index of its plural form.
    ///
    /// The result is always less than [`Self::form_count`].
    pub const fn form(self, n: u64) -> usize {
        let (n10, n100) = (n % 10, n % 100);
        match self {
            Self::Common => (n != 1) as usize,
            Self::Bengali => (n > 1) as usize,
            Self::Icelandic => (n10 != 1 || n100 == 11) as usize,
            Self::Filipino => {
                (n != 1 && n != 2 && n != 3 && (n10 == 4 || n10 == 6 || n10 == 9)) as usize
            }
            Self::OneForm => 0,
            Self::Czech => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
            Self::Russian => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if n10 >= 2 && n10 <= 4 && (n100 < 10 || n100 >= 20) {
                    1
                } else {
                    2
                }
            }
            Self::Polish => {
                if n == 1 {
                    0
                } else if n10 >= 2 && n10 <= 4 && (n100 < 10 || n100 >= 20) {
                    1
                } else {
                    2
                }
            }
            Self::Latvian => {
                if n10 == 0 || (n100 >= 11 && n100 <= 19) {
                    0
                } else if n10 == 1 && n100 != 11 {
                    1
                } else {
                    2
                }
            }
            Self::Lithuanian => {
                let teens = n100 >= 11 && n100 <= 19;
                if n10 == 1 && !teens {
                    0
                } else if n10 >= 2 && !teens {
                    1
                } else {
                    2
                }
            }
            Self::French => {
                if n == 0 || n == 1 {
                    0
                } else if n % 1_000_000 == 0 {
                    1
                } else {
                    2
                }
            }
            Self::Catalan => {
                if n == 1 {
                    0
                } else if n != 0 && n % 1_000_000 == 0 {
                    1
                } else {
                    2
                }
            }
            Self::Slovenian => match n100 {
                1 => 0,
                2 => 1,
                3 | 4 => 2,
                _ => 3,
            },
            Self::Arabic => match n {
                0 => 0,
                1 => 1,
                2 => 2,
                _ if n100 >= 3 && n100 <= 10 => 3,
                _ if n100 >= 11 => 4,
                _ => 5,
            },
        }
    }
}

impl TryFrom<usize> for PluralRule {
    type Error = PluralError;
    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or(PluralError::UnknownRule(index))
    }
}

impl std::fmt::Display for PluralRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:2}] {}", self.index(), self.name())
    }
}

/// Resolves the plural form of `n` for the rule at `rule`.
pub fn resolve(rule: usize, n: u64) -> Result<usize, PluralError> {
    PluralRule::try_from(rule).map(|rule| rule.form(n))
}
