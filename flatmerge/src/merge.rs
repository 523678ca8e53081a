//! Merge entry points combining flat maps and typed records.
//!
//! Two precedence rules apply and they point in opposite directions:
//!
//! - [`Merger::merge_maps`] applies maps last to first, so the **first** map
//!   has the final say for every key it contains;
//! - [`Merger::merge_structs`] applies records first to last, but a field is
//!   only filled while it is still zero, so the **first** non-zero value wins.
//!
//! [`Merger::merge`] runs the map stage before the record stage, so values
//! from the map take precedence over any record.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::classify::Classifier;
use crate::decode::decode_into_at;
use crate::error::MergeResult;
use crate::expand::Expander;
use crate::flatten::{Flatten, flatten_with};
use crate::options::MergeOptions;
use crate::record::fill_record;
use crate::value::{Dict, FlatMap, Value};

/// Merge operations bound to one set of [`MergeOptions`].
///
/// # Examples
///
/// ```rust
/// use flatmerge::{MergeOptions, Merger};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Deserialize, Serialize)]
/// struct Database {
///     host: String,
///     pool: Pool,
/// }
///
/// #[derive(Default, Deserialize, Serialize)]
/// struct Pool {
///     size: u8,
/// }
///
/// let merger = Merger::new(MergeOptions::new().separator("."));
/// let mut db = Database::default();
/// merger.merge_map(&mut db, [("host", "db.internal"), ("pool.size", "8")])?;
/// assert_eq!(db.host, "db.internal");
/// assert_eq!(db.pool.size, 8);
/// # Ok::<_, flatmerge::MergeError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct Merger {
    options: MergeOptions,
}

impl Merger {
    /// Create a merger using `options`.
    #[must_use]
    pub const fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    /// Returns the options this merger was built with.
    #[must_use]
    pub const fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Classify one raw value.
    #[must_use]
    pub fn classify(&self, raw: &str) -> Value {
        Classifier::new(&self.options).classify(raw)
    }

    /// Expand a flat map into a nested dictionary.
    #[must_use]
    pub fn expand<I, K, V>(&self, flat: I) -> Dict
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Expander::new(&self.options).expand(flat)
    }

    /// Expand `flat` and overlay it onto `dst`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MergeError::Snapshot`] when `dst` cannot be captured
    /// and [`crate::MergeError::Decode`] when the expanded map does not fit
    /// `T`.
    pub fn merge_map<T, I, K, V>(&self, dst: &mut T, flat: I) -> MergeResult<()>
    where
        T: Serialize + DeserializeOwned,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.apply_map(dst, flat, 0)
    }

    /// Overlay several flat maps; the first map has the highest precedence.
    ///
    /// Maps are applied from last to first. The chain stops at the first
    /// failure, leaving the maps applied so far in place. The error carries
    /// the failing map's position in `maps`.
    ///
    /// # Errors
    ///
    /// See [`Merger::merge_map`].
    pub fn merge_maps<T, M, I, K, V>(&self, dst: &mut T, maps: M) -> MergeResult<()>
    where
        T: Serialize + DeserializeOwned,
        M: IntoIterator<Item = I>,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let sources: Vec<I> = maps.into_iter().collect();
        for (index, flat) in sources.into_iter().enumerate().rev() {
            self.apply_map(dst, flat, index)?;
        }
        Ok(())
    }

    /// Fill the zero-valued fields of `dst` from `records`, in order.
    ///
    /// A set optional field is never zero, so `Some(0)` survives a later
    /// `Some(5)`. The chain stops at the first failure, leaving the records folded so
    /// far in place.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MergeError::Snapshot`] when `dst` cannot be captured
    /// and [`crate::MergeError::StructMerge`] when a record cannot be folded
    /// in.
    pub fn merge_structs<T, R, I>(&self, dst: &mut T, records: I) -> MergeResult<()>
    where
        T: Serialize + DeserializeOwned,
        I: IntoIterator<Item = R>,
        R: Serialize,
    {
        for (index, record) in records.into_iter().enumerate() {
            tracing::debug!(index, "folding record source");
            fill_record(dst, &record, index)?;
        }
        Ok(())
    }

    /// Overlay `flat` onto `dst`, then fill remaining zero fields from
    /// `records`.
    ///
    /// # Errors
    ///
    /// See [`Merger::merge_map`] and [`Merger::merge_structs`].
    pub fn merge<T, I, K, V, R, S>(&self, dst: &mut T, flat: I, records: S) -> MergeResult<()>
    where
        T: Serialize + DeserializeOwned,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
        S: IntoIterator<Item = R>,
        R: Serialize,
    {
        self.merge_map(dst, flat)?;
        self.merge_structs(dst, records)
    }

    /// Flatten `value` into a flat map using this merger's separator and tag
    /// preference.
    ///
    /// # Errors
    ///
    /// See [`crate::to_flat_map`].
    pub fn to_flat_map<T: Flatten + ?Sized>(&self, value: Option<&T>) -> MergeResult<FlatMap> {
        flatten_with(&self.options, value)
    }

    fn apply_map<T, I, K, V>(&self, dst: &mut T, flat: I, index: usize) -> MergeResult<()>
    where
        T: Serialize + DeserializeOwned,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let dict = self.expand(flat);
        tracing::debug!(index, keys = dict.len(), "applying map source");
        decode_into_at(dst, dict, index)
    }
}

/// Overlay `flat` onto `dst` using default options.
///
/// # Errors
///
/// See [`Merger::merge_map`].
///
/// # Examples
///
/// ```rust
/// use flatmerge::merge_map;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Deserialize, Serialize)]
/// struct Simple {
///     #[serde(rename = "F1")]
///     f1: i32,
///     #[serde(rename = "F2")]
///     f2: String,
/// }
///
/// let mut simple = Simple::default();
/// merge_map(&mut simple, [("F1", "1"), ("F2", "one")])?;
/// assert_eq!((simple.f1, simple.f2.as_str()), (1, "one"));
/// # Ok::<_, flatmerge::MergeError>(())
/// ```
pub fn merge_map<T, I, K, V>(dst: &mut T, flat: I) -> MergeResult<()>
where
    T: Serialize + DeserializeOwned,
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    Merger::default().merge_map(dst, flat)
}

/// Overlay several flat maps using default options; the first map wins.
///
/// # Errors
///
/// See [`Merger::merge_maps`].
pub fn merge_maps<T, M, I, K, V>(dst: &mut T, maps: M) -> MergeResult<()>
where
    T: Serialize + DeserializeOwned,
    M: IntoIterator<Item = I>,
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    Merger::default().merge_maps(dst, maps)
}

/// Fill zero-valued fields of `dst` from `records`; the first non-zero
/// value wins.
///
/// # Errors
///
/// See [`Merger::merge_structs`].
pub fn merge_structs<T, R, I>(dst: &mut T, records: I) -> MergeResult<()>
where
    T: Serialize + DeserializeOwned,
    I: IntoIterator<Item = R>,
    R: Serialize,
{
    Merger::default().merge_structs(dst, records)
}

/// Overlay `flat` onto `dst` and then fold in `records`, using default
/// options.
///
/// # Errors
///
/// See [`Merger::merge`].
pub fn merge<T, I, K, V, R, S>(dst: &mut T, flat: I, records: S) -> MergeResult<()>
where
    T: Serialize + DeserializeOwned,
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
    S: IntoIterator<Item = R>,
    R: Serialize,
{
    Merger::default().merge(dst, flat, records)
}
