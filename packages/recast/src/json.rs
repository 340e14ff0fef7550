//! JSON interchange.
//!
//! Adapters between [`serde_json::Value`] trees and the engine's [`Data`]
//! model, plus the [`Map::from_json`] and [`Map::to_json`] conveniences.

use crate::error::Error;
use crate::map::Map;
use crate::value::Data;

impl From<serde_json::Value> for Data {
    /// Numbers prefer `Int`, then `Uint`, then `Float`, so magnitudes above
    /// `i64::MAX` survive without a lossy float detour.
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Data::Null,
            serde_json::Value::Bool(b) => Data::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Data::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Data::Uint(u)
                } else {
                    Data::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Data::Str(s),
            serde_json::Value::Array(items) => {
                Data::List(items.into_iter().map(Data::from).collect())
            }
            serde_json::Value::Object(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(key, Data::from(value));
                }
                Data::Map(map)
            }
        }
    }
}

impl From<&Data> for serde_json::Value {
    /// Kinds without a JSON analogue render through their string form; a
    /// non-finite float becomes `null`.
    fn from(data: &Data) -> Self {
        match data {
            Data::Null => serde_json::Value::Null,
            Data::Bool(b) => (*b).into(),
            Data::Int(n) => (*n).into(),
            Data::Uint(n) => (*n).into(),
            Data::Float(x) => serde_json::Number::from_f64(*x)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Data::Char(_) | Data::Time(_) | Data::Ip(_) => data.to_string().into(),
            Data::Str(s) => s.clone().into(),
            Data::Bytes(b) => String::from_utf8_lossy(b).into_owned().into(),
            Data::List(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Data::Map(map) => serde_json::Value::from(map),
        }
    }
}

impl From<&Map> for serde_json::Value {
    fn from(map: &Map) -> Self {
        let mut object = serde_json::Map::new();
        for (key, value) in map.iter() {
            object.insert(key.to_string(), serde_json::Value::from(value));
        }
        serde_json::Value::Object(object)
    }
}

impl Map {
    /// Parse a JSON object into a map.
    ///
    /// The document must be an object at the top level; other documents
    /// parse but are rejected as [`Error::Unhandled`].
    pub fn from_json(input: &str) -> Result<Map, Error> {
        let parsed: serde_json::Value =
            serde_json::from_str(input).map_err(|err| Error::parse(input, err))?;
        match Data::from(parsed) {
            Data::Map(map) => Ok(map),
            other => Err(Error::unhandled(other.kind())),
        }
    }

    /// Render this map as a compact JSON object string, keys in map order.
    pub fn to_json(&self) -> String {
        serde_json::Value::from(self).to_string()
    }
}
