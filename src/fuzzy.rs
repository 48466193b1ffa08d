use std::borrow::Cow;

/// Finds the choice closest to `query`, if any is close enough.
pub fn closest<'a>(
    query: &str,
    choices: impl IntoIterator<Item = &'a str>,
    case_insensitive: bool,
) -> Option<&'a str> {
    fn normalize(s: &str, case_insensitive: bool) -> Cow<'_, str> {
        if case_insensitive {
            Cow::from(s.to_lowercase())
        } else {
            Cow::from(s)
        }
    }

    let query = normalize(query, case_insensitive);

    choices
        .into_iter()
        .map(|s| {
            let score = strsim::jaro_winkler(&query, &normalize(s, case_insensitive));
            (score, s)
        })
        .max_by(|(l, _), (r, _)| l.total_cmp(r))
        .filter(|&(score, _)| score > 0.7)
        .map(|(_, s)| s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_keys() {
        let keys = ["relativetime.days", "relativetime.mins", "relativetime.hours"];
        assert_eq!(
            closest("relativetime.minutes", keys, false),
            Some("relativetime.mins")
        );
        assert_eq!(
            closest("RELATIVETIME.DAYS", keys, true),
            Some("relativetime.days")
        );
        assert_eq!(closest("zzz", keys, true), None);
    }
}
