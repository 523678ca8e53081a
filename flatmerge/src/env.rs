//! Snapshot of prefixed environment variables as a flat map.

use figment::providers::Env;
use uncased::{Uncased, UncasedStr};

use crate::value::FlatMap;

/// Collect every environment variable whose name starts with `prefix`.
///
/// The prefix is matched ignoring ASCII case and stripped; the remainder of
/// each name keeps its case so it can address fields directly. Variables
/// named exactly `prefix` are skipped.
///
/// # Examples
///
/// ```rust,no_run
/// use flatmerge::{env_map, expand};
///
/// // APP_DB__PORT=5432 becomes {"DB": {"PORT": "5432"}}
/// let nested = expand(env_map("APP_"));
/// # let _ = nested;
/// ```
#[must_use]
pub fn env_map(prefix: &str) -> FlatMap {
    let owned = prefix.to_owned();
    let provider = Env::raw()
        .filter_map(move |key| strip_prefix(key, &owned))
        .lowercase(false);
    let flat: FlatMap = provider
        .iter()
        .map(|(key, value)| (key.into_string(), value))
        .collect();
    tracing::debug!(prefix, variables = flat.len(), "collected environment variables");
    flat
}

fn strip_prefix<'k>(key: &'k UncasedStr, prefix: &str) -> Option<Uncased<'k>> {
    let name = key.as_str();
    let head = name.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    name.get(prefix.len()..)
        .filter(|rest| !rest.is_empty())
        .map(Uncased::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("APP_name", "APP_", Some("name"))]
    #[case("app_Address__City", "APP_", Some("Address__City"))]
    #[case("APP_", "APP_", None)]
    #[case("OTHER_name", "APP_", None)]
    #[case("AP", "APP_", None)]
    #[case("anything", "", Some("anything"))]
    fn strips_prefixes_ignoring_case(
        #[case] key: &str,
        #[case] prefix: &str,
        #[case] expected: Option<&str>,
    ) {
        let stripped = strip_prefix(UncasedStr::new(key), prefix);
        assert_eq!(stripped.as_ref().map(|k| k.as_str()), expected);
    }

    #[test]
    fn collects_prefixed_variables() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("FLATMERGE_TEST_name", "John");
            jail.set_env("FLATMERGE_TEST_address__City", "San Diego");
            jail.set_env("UNRELATED_VALUE", "x");

            let flat = env_map("flatmerge_test_");
            assert_eq!(flat.get("name").map(String::as_str), Some("John"));
            assert_eq!(
                flat.get("address__City").map(String::as_str),
                Some("San Diego")
            );
            assert!(!flat.contains_key("UNRELATED_VALUE"));
            Ok(())
        });
    }
}
