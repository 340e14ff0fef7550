//! Recast: Schema-less Value Coercion
//!
//! Recast turns loosely-typed data (JSON documents, `key=value` strings,
//! scraped records) into concrete Rust values without a schema:
//! - `Value`: One dynamically-typed datum plus its conversion surface
//! - `Map`: Keyed container with dot-path lookup and multi-key fallback
//! - `Registry`: Ordered chain of custom converters behind the built-ins
//! - `FromMap` / `ToMap`: Struct binding driven by field tags
//!
//! Use this crate for:
//! - Ingesting data whose types don't match the destination fields
//! - Tolerant parsing where `"8080"`, `8080`, and `8080.0` mean the same
//! - Flattened access into nested documents via dotted keys
//!
//! # Example
//!
//! ```rust
//! use recast::{Map, Value};
//!
//! fn read_port(config: &Map) -> Result<i64, recast::Error> {
//!     config.get_int("port")
//! }
//!
//! let config = Map::from_kv_str("port=8080, host=localhost", ",");
//! assert_eq!(read_port(&config).unwrap(), 8080);
//! assert_eq!(config.get_string("host").unwrap(), "localhost");
//! assert_eq!(Value::new("123.6").as_i64().unwrap(), 123);
//! ```

mod bind;
mod convert;
mod error;
mod json;
mod key;
mod map;
mod net;
mod registry;
mod timeparse;
mod value;
mod varint;

pub use bind::{Field, FromMap, ToMap};
pub use convert::{Context, FromValue, ToOptions, BOOL_STRINGS_FALSE, BOOL_STRINGS_TRUE};
pub use error::Error;
pub use key::Key;
pub use map::Map;
pub use net::MacAddr;
pub use registry::{Convert, Registry};
pub use value::{Data, Kind, Value, DEFAULT_SEPARATORS};

// Derive macros; same names as the traits they implement
#[cfg(feature = "derive")]
pub use recast_derive::{FromMap, ToMap};
