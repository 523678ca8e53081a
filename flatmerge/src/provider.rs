//! Figment provider backed by an expanded flat map.
//!
//! Lets a flat map take part in a [`figment::Figment`] pipeline alongside
//! file and environment providers. Scalar text is interpreted the same way
//! figment's own environment provider interprets variable values, so `8080`
//! arrives as a number and `true` as a boolean.

use figment::value::{Dict as FigmentDict, Map, Tag, Value as FigmentValue};
use figment::{Error, Metadata, Profile, Provider};

use crate::expand::Expander;
use crate::options::MergeOptions;
use crate::value::{Dict, Value};

/// Provider serving an expanded flat map under one profile.
///
/// # Examples
///
/// ```rust
/// use figment::Figment;
/// use flatmerge::FlatMapProvider;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Config {
///     name: String,
///     db: Db,
/// }
///
/// #[derive(Deserialize)]
/// struct Db {
///     hosts: Vec<String>,
///     port: u16,
/// }
///
/// let provider = FlatMapProvider::new([
///     ("name", "svc"),
///     ("db__hosts", "a, b"),
///     ("db__port", "5432"),
/// ]);
/// let config: Config = Figment::from(provider).extract()?;
/// assert_eq!(config.name, "svc");
/// assert_eq!(config.db.hosts, ["a", "b"]);
/// assert_eq!(config.db.port, 5432);
/// # Ok::<_, figment::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct FlatMapProvider {
    dict: Dict,
    profile: Profile,
}

impl FlatMapProvider {
    /// Expand `flat` with default options.
    #[must_use]
    pub fn new<I, K, V>(flat: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::with_options(flat, &MergeOptions::default())
    }

    /// Expand `flat` with `options`.
    #[must_use]
    pub fn with_options<I, K, V>(flat: I, options: &MergeOptions) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::from_dict(Expander::new(options).expand(flat))
    }

    /// Serve an already expanded dictionary.
    #[must_use]
    pub const fn from_dict(dict: Dict) -> Self {
        Self {
            dict,
            profile: Profile::Default,
        }
    }

    /// Emit values under `profile` instead of the default profile.
    #[must_use]
    pub fn profile(mut self, profile: impl Into<Profile>) -> Self {
        self.profile = profile.into();
        self
    }
}

impl Provider for FlatMapProvider {
    fn metadata(&self) -> Metadata {
        Metadata::named("flat map")
    }

    fn profile(&self) -> Option<Profile> {
        Some(self.profile.clone())
    }

    fn data(&self) -> Result<Map<Profile, FigmentDict>, Error> {
        Ok(self.profile.collect(to_figment_dict(&self.dict)))
    }
}

fn to_figment_dict(dict: &Dict) -> FigmentDict {
    dict.iter()
        .map(|(key, value)| (key.clone(), to_figment_value(value)))
        .collect()
}

fn to_figment_value(value: &Value) -> FigmentValue {
    match value {
        Value::Scalar(text) => parse_text(text),
        Value::List(items) => {
            FigmentValue::Array(Tag::Default, items.iter().map(|item| parse_text(item)).collect())
        }
        Value::Object(dict) => FigmentValue::Dict(Tag::Default, to_figment_dict(dict)),
    }
}

fn parse_text(text: &str) -> FigmentValue {
    let Ok(value) = text.parse::<FigmentValue>();
    value
}
