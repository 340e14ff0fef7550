//! Dynamically-typed values.
//!
//! [`Value`] wraps exactly one [`Data`] payload and exposes the conversion
//! surface: typed accessors, list decomposition, map views, and the generic
//! [`Value::to`] entry point driven by [`FromValue`](crate::FromValue).

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::convert::{Context, FromValue};
use crate::error::Error;
use crate::map::Map;
use crate::net::MacAddr;

/// Separator chain used when a caller supplies none.
pub const DEFAULT_SEPARATORS: &[&str] = &[",", "\n"];

/// A single dynamically-typed datum.
///
/// The closed set of kinds every conversion dispatches over. Construction
/// goes through the `From` impls below, so any supported Rust value lifts
/// into a `Data` without loss: a `u64` above `i64::MAX` stays a `Uint`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Data {
    /// Absence of a value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// Unsigned 64-bit integer.
    Uint(u64),
    /// 64-bit floating point.
    Float(f64),
    /// Single character.
    Char(char),
    /// UTF-8 string.
    Str(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Point in time.
    Time(OffsetDateTime),
    /// IPv4 or IPv6 address.
    Ip(IpAddr),
    /// Ordered sequence.
    List(Vec<Data>),
    /// Keyed container.
    Map(Map),
}

impl Data {
    /// The kind tag of this datum.
    pub fn kind(&self) -> Kind {
        match self {
            Data::Null => Kind::Null,
            Data::Bool(_) => Kind::Bool,
            Data::Int(_) => Kind::Int,
            Data::Uint(_) => Kind::Uint,
            Data::Float(_) => Kind::Float,
            Data::Char(_) => Kind::Char,
            Data::Str(_) => Kind::Str,
            Data::Bytes(_) => Kind::Bytes,
            Data::Time(_) => Kind::Time,
            Data::Ip(_) => Kind::Ip,
            Data::List(_) => Kind::List,
            Data::Map(_) => Kind::Map,
        }
    }

    /// Lift anything convertible into a list datum.
    pub fn list<I>(items: I) -> Data
    where
        I: IntoIterator,
        I::Item: Into<Data>,
    {
        Data::List(items.into_iter().map(Into::into).collect())
    }
}

/// Discriminant of [`Data`], used in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Uint,
    Float,
    Char,
    Str,
    Bytes,
    Time,
    Ip,
    List,
    Map,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "nil",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::Char => "char",
            Kind::Str => "string",
            Kind::Bytes => "bytes",
            Kind::Time => "time",
            Kind::Ip => "ip",
            Kind::List => "list",
            Kind::Map => "map",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Data {
    /// The natural textual form. Never fails: nil is empty, a char renders
    /// as the literal character, bytes render as lossy UTF-8.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Data::Null => Ok(()),
            Data::Bool(b) => write!(f, "{b}"),
            Data::Int(n) => write!(f, "{n}"),
            Data::Uint(n) => write!(f, "{n}"),
            Data::Float(x) => write!(f, "{x}"),
            Data::Char(c) => write!(f, "{c}"),
            Data::Str(s) => f.write_str(s),
            Data::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            Data::Time(t) => match t.format(&Rfc3339) {
                Ok(formatted) => f.write_str(&formatted),
                Err(_) => write!(f, "{t}"),
            },
            Data::Ip(ip) => write!(f, "{ip}"),
            Data::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Data::Map(map) => write!(f, "{map}"),
        }
    }
}

macro_rules! data_from_int {
    ($variant:ident as $repr:ty: $($ty:ty),+) => {$(
        impl From<$ty> for Data {
            fn from(value: $ty) -> Self {
                Data::$variant(value as $repr)
            }
        }
    )+};
}

data_from_int!(Int as i64: i8, i16, i32, i64, isize);
data_from_int!(Uint as u64: u8, u16, u32, u64, usize);

impl From<f32> for Data {
    fn from(value: f32) -> Self {
        Data::Float(f64::from(value))
    }
}

impl From<f64> for Data {
    fn from(value: f64) -> Self {
        Data::Float(value)
    }
}

impl From<bool> for Data {
    fn from(value: bool) -> Self {
        Data::Bool(value)
    }
}

impl From<char> for Data {
    fn from(value: char) -> Self {
        Data::Char(value)
    }
}

impl From<&str> for Data {
    fn from(value: &str) -> Self {
        Data::Str(value.to_owned())
    }
}

impl From<String> for Data {
    fn from(value: String) -> Self {
        Data::Str(value)
    }
}

impl From<&String> for Data {
    fn from(value: &String) -> Self {
        Data::Str(value.clone())
    }
}

impl From<Vec<u8>> for Data {
    fn from(value: Vec<u8>) -> Self {
        Data::Bytes(value)
    }
}

impl From<&[u8]> for Data {
    fn from(value: &[u8]) -> Self {
        Data::Bytes(value.to_vec())
    }
}

impl From<Vec<Data>> for Data {
    fn from(value: Vec<Data>) -> Self {
        Data::List(value)
    }
}

impl From<Vec<Value>> for Data {
    fn from(value: Vec<Value>) -> Self {
        Data::List(value.into_iter().map(Value::into_data).collect())
    }
}

// Common list payloads, so `ToMap` fields and map inserts lift directly.
// `Vec<u8>` stays bytes; other element types go through `Data::list`.
macro_rules! data_from_vec {
    ($($ty:ty),+) => {$(
        impl From<Vec<$ty>> for Data {
            fn from(value: Vec<$ty>) -> Self {
                Data::list(value)
            }
        }
    )+};
}

data_from_vec!(String, &str, i64, u64, f64, bool);

impl From<OffsetDateTime> for Data {
    fn from(value: OffsetDateTime) -> Self {
        Data::Time(value)
    }
}

impl From<IpAddr> for Data {
    fn from(value: IpAddr) -> Self {
        Data::Ip(value)
    }
}

impl From<Ipv4Addr> for Data {
    fn from(value: Ipv4Addr) -> Self {
        Data::Ip(IpAddr::V4(value))
    }
}

impl From<Ipv6Addr> for Data {
    fn from(value: Ipv6Addr) -> Self {
        Data::Ip(IpAddr::V6(value))
    }
}

impl From<MacAddr> for Data {
    /// Stored as the display string; the conversion path parses it back.
    fn from(value: MacAddr) -> Self {
        Data::Str(value.to_string())
    }
}

impl From<Map> for Data {
    fn from(value: Map) -> Self {
        Data::Map(value)
    }
}

impl<T: Into<Data>> From<Option<T>> for Data {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => Data::Null,
        }
    }
}

impl From<()> for Data {
    fn from(_: ()) -> Self {
        Data::Null
    }
}

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        value.data
    }
}

/// A dynamically-typed value plus its conversion operations.
///
/// A `Value` is a transient view: lookups mint a fresh one per query and
/// conversion never mutates it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Value {
    data: Data,
}

impl Value {
    /// Wrap a datum.
    pub fn new(data: impl Into<Data>) -> Self {
        Self { data: data.into() }
    }

    /// Borrow the payload.
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Take the payload.
    pub fn into_data(self) -> Data {
        self.data
    }

    /// Kind tag of the payload.
    pub fn kind(&self) -> Kind {
        self.data.kind()
    }

    /// Whether the payload is [`Data::Null`].
    pub fn is_nil(&self) -> bool {
        matches!(self.data, Data::Null)
    }

    /// Convert into `dest` using the default context.
    ///
    /// See [`FromValue`] for the dispatch rules.
    pub fn to<T: FromValue>(&self, dest: &mut T) -> Result<(), Error> {
        self.to_in(dest, &Context::new())
    }

    /// Convert into `dest` with an explicit context (registry and options).
    pub fn to_in<T: FromValue>(&self, dest: &mut T, ctx: &Context<'_>) -> Result<(), Error> {
        *dest = T::from_value(self, ctx)?;
        Ok(())
    }

    /// Decompose into a sequence of values.
    ///
    /// Native sequences yield one value per element, in order. Strings are
    /// split by the first separator in `separators` that produces more than
    /// one piece, falling back to a single element; an empty `separators`
    /// means [`DEFAULT_SEPARATORS`]. Any other scalar yields itself. Nil
    /// yields [`Error::NilValue`].
    pub fn list(&self, separators: &[&str]) -> Result<Vec<Value>, Error> {
        match &self.data {
            Data::Null => Err(Error::NilValue),
            Data::List(items) => Ok(items.iter().cloned().map(Value::new).collect()),
            Data::Bytes(bytes) => Ok(bytes.iter().map(|b| Value::new(*b)).collect()),
            Data::Str(s) => Ok(split_str(s, separators)
                .into_iter()
                .map(Value::new)
                .collect()),
            _ => Ok(vec![self.clone()]),
        }
    }

    /// String-list form of the payload.
    ///
    /// Native sequences render each element via string conversion. Anything
    /// else, scalar or not, is rendered to its string form first and then
    /// split by the separator chain, so `Value::new(1.4)` with separator
    /// `"."` yields `["1", "4"]`.
    pub fn as_string_list(&self, separators: &[&str]) -> Result<Vec<String>, Error> {
        match &self.data {
            Data::List(items) => Ok(items.iter().map(Data::to_string).collect()),
            Data::Bytes(bytes) => Ok(bytes.iter().map(u8::to_string).collect()),
            _ => Ok(split_str(&self.as_string(), separators)),
        }
    }

    /// View the payload as a [`Map`].
    ///
    /// Only map payloads qualify: nil is [`Error::NilValue`], anything else
    /// is [`Error::Unhandled`].
    pub fn as_map(&self) -> Result<Map, Error> {
        match &self.data {
            Data::Map(map) => Ok(map.clone()),
            Data::Null => Err(Error::NilValue),
            other => Err(Error::unhandled(other.kind())),
        }
    }

    /// String form of the payload. Never fails; nil is the empty string.
    pub fn as_string(&self) -> String {
        self.data.to_string()
    }
}

macro_rules! accessors {
    ($($as:ident / $or:ident -> $ty:ty, $kind:literal, $default:expr;)+) => {$(
        #[doc = concat!("Convert the payload to ", $kind, ".")]
        pub fn $as(&self) -> Result<$ty, Error> {
            <$ty>::from_value(self, &Context::new())
        }

        #[doc = concat!("Convert to ", $kind, ", swallowing errors.")]
        pub fn $or(&self) -> $ty {
            self.$as().unwrap_or($default)
        }
    )+};
}

impl Value {
    accessors! {
        as_i8 / as_i8_or_default -> i8, "a signed 8-bit integer", 0;
        as_i16 / as_i16_or_default -> i16, "a signed 16-bit integer", 0;
        as_i32 / as_i32_or_default -> i32, "a signed 32-bit integer", 0;
        as_i64 / as_i64_or_default -> i64, "a signed 64-bit integer", 0;
        as_u8 / as_u8_or_default -> u8, "an unsigned 8-bit integer", 0;
        as_u16 / as_u16_or_default -> u16, "an unsigned 16-bit integer", 0;
        as_u32 / as_u32_or_default -> u32, "an unsigned 32-bit integer", 0;
        as_u64 / as_u64_or_default -> u64, "an unsigned 64-bit integer", 0;
        as_f32 / as_f32_or_default -> f32, "a 32-bit float", 0.0;
        as_f64 / as_f64_or_default -> f64, "a 64-bit float", 0.0;
        as_bool / as_bool_or_default -> bool, "a boolean", false;
        as_char / as_char_or_default -> char, "a character", '\0';
        as_time / as_time_or_default -> OffsetDateTime, "a timestamp", OffsetDateTime::UNIX_EPOCH;
        as_ip / as_ip_or_default -> IpAddr, "an IP address", IpAddr::V4(Ipv4Addr::UNSPECIFIED);
        as_mac / as_mac_or_default -> MacAddr, "a MAC address", MacAddr::default();
    }
}

impl From<Data> for Value {
    fn from(data: Data) -> Self {
        Value { data }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.data.fmt(f)
    }
}

fn split_str(input: &str, separators: &[&str]) -> Vec<String> {
    let separators = if separators.is_empty() {
        DEFAULT_SEPARATORS
    } else {
        separators
    };
    for sep in separators {
        let pieces: Vec<&str> = input.split(sep).collect();
        if pieces.len() > 1 {
            return pieces.into_iter().map(str::to_owned).collect();
        }
    }
    vec![input.to_owned()]
}
