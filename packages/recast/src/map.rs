//! Keyed containers with dot-path resolution.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use time::OffsetDateTime;

use crate::error::Error;
use crate::key::Key;
use crate::value::{Data, Value};

/// An ordered map from [`Key`] to [`Data`].
///
/// Lookups mint a fresh [`Value`] per query, so repeated conversions of the
/// same entry never observe each other. String keys containing `.` resolve
/// through nested maps, with a literal key of the same spelling taking
/// precedence at every level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Map {
    entries: BTreeMap<Key, Data>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the previous payload under that key.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Data>) -> Option<Data> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove an entry, returning its payload.
    pub fn remove(&mut self, key: impl Into<Key>) -> Option<Data> {
        self.entries.remove(&key.into())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Data)> {
        self.entries.iter()
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }

    /// Whether `key` resolves to a non-nil value.
    pub fn has(&self, key: impl Into<Key>) -> bool {
        self.get(key).map(|v| !v.is_nil()).unwrap_or(false)
    }

    /// Resolve one key to a fresh [`Value`].
    pub fn get(&self, key: impl Into<Key>) -> Result<Value, Error> {
        self.get_first([key])
    }

    /// Resolve the first candidate key that matches, in order.
    ///
    /// Each candidate is tried literally first; a string key containing `.`
    /// then walks nested maps segment by segment. Traversal failures (a
    /// non-map midpoint, a missing tail) are collected and reported only if
    /// every candidate fails.
    pub fn get_first<I>(&self, keys: I) -> Result<Value, Error>
    where
        I: IntoIterator,
        I::Item: Into<Key>,
    {
        let mut attempted = Vec::new();
        let mut causes = Vec::new();
        for key in keys {
            let key = key.into();
            if let Some(data) = self.entries.get(&key) {
                return Ok(Value::new(data.clone()));
            }
            if let Some((head, rest)) = key.as_str().and_then(|path| path.split_once('.')) {
                match self.get_nested(head, rest) {
                    Ok(Some(value)) => return Ok(value),
                    Ok(None) => {}
                    Err(err) => causes.push(err),
                }
            }
            attempted.push(key.to_string());
        }
        Err(Error::no_valid_key(attempted, causes))
    }

    /// Walk into the map under `head` and resolve `rest` there.
    ///
    /// `Ok(None)` means `head` is simply absent. An error means `head`
    /// exists but the remaining path cannot resolve through it.
    fn get_nested(&self, head: &str, rest: &str) -> Result<Option<Value>, Error> {
        let Some(data) = self.entries.get(&Key::from(head)) else {
            return Ok(None);
        };
        let sub = Value::new(data.clone()).as_map()?;
        sub.get_first([rest]).map(Some)
    }

    /// Resolve `key` and view the result as a nested map.
    pub fn submap(&self, key: impl Into<Key>) -> Result<Map, Error> {
        self.get(key)?.as_map()
    }

    /// Resolve `key` and render its string form. Fails only on lookup.
    pub fn get_string(&self, key: impl Into<Key>) -> Result<String, Error> {
        Ok(self.get(key)?.as_string())
    }

    /// Build a map from a `key=value` string.
    ///
    /// `input` splits on `separator` (`,` when empty); each chunk splits at
    /// its first `=`. Keys are trimmed, values are kept verbatim, and a
    /// chunk without `=` maps its trimmed text to nil.
    pub fn from_kv_str(input: &str, separator: &str) -> Map {
        let separator = if separator.is_empty() { "," } else { separator };
        let mut map = Map::new();
        for chunk in input.split(separator) {
            match chunk.split_once('=') {
                Some((key, value)) => map.insert(key.trim(), value),
                None => map.insert(chunk.trim(), Data::Null),
            };
        }
        map
    }
}

macro_rules! typed_get {
    ($($fn:ident via $as:ident -> $ty:ty;)+) => {$(
        #[doc = concat!("Resolve `key` and convert via [`Value::", stringify!($as), "`].")]
        pub fn $fn(&self, key: impl Into<Key>) -> Result<$ty, Error> {
            self.get(key)?.$as()
        }
    )+};
}

impl Map {
    typed_get! {
        get_int via as_i64 -> i64;
        get_uint via as_u64 -> u64;
        get_float via as_f64 -> f64;
        get_bool via as_bool -> bool;
        get_time via as_time -> OffsetDateTime;
    }
}

impl<K: Into<Key>, V: Into<Data>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<K: Into<Key>, V: Into<Data>> From<BTreeMap<K, V>> for Map {
    fn from(entries: BTreeMap<K, V>) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: Into<Key>, V: Into<Data>, S> From<HashMap<K, V, S>> for Map {
    fn from(entries: HashMap<K, V, S>) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: Into<Key>, V: Into<Data>, const N: usize> From<[(K, V); N]> for Map {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
    }
}
