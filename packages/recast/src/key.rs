//! Map keys.

use std::fmt;

use crate::error::Error;
use crate::value::Data;

/// A hashable, ordered key for [`Map`](crate::Map) entries.
///
/// Keys are a closed variant set so that source documents with mixed key
/// kinds (string columns, integer ids) can index the same map with
/// structural equality. Only [`Key::Str`] participates in dot-path
/// resolution.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// Textual key.
    Str(String),
    /// Signed integer key.
    Int(i64),
    /// Unsigned integer key. Kept apart from `Int` so a source that used
    /// both `5u64` and `5i64` stays distinguishable.
    Uint(u64),
    /// Boolean key.
    Bool(bool),
    /// Character key.
    Char(char),
    /// Raw byte-string key.
    Bytes(Vec<u8>),
}

impl Key {
    /// The textual payload, if this is a [`Key::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => f.write_str(s),
            Key::Int(n) => write!(f, "{n}"),
            Key::Uint(n) => write!(f, "{n}"),
            Key::Bool(b) => write!(f, "{b}"),
            Key::Char(c) => write!(f, "{c}"),
            Key::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_owned())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

impl From<&String> for Key {
    fn from(value: &String) -> Self {
        Key::Str(value.clone())
    }
}

macro_rules! key_from_int {
    ($variant:ident as $repr:ty: $($ty:ty),+) => {$(
        impl From<$ty> for Key {
            fn from(value: $ty) -> Self {
                Key::$variant(value as $repr)
            }
        }
    )+};
}

key_from_int!(Int as i64: i8, i16, i32, i64, isize);
key_from_int!(Uint as u64: u8, u16, u32, u64, usize);

impl From<bool> for Key {
    fn from(value: bool) -> Self {
        Key::Bool(value)
    }
}

impl From<char> for Key {
    fn from(value: char) -> Self {
        Key::Char(value)
    }
}

impl From<Vec<u8>> for Key {
    fn from(value: Vec<u8>) -> Self {
        Key::Bytes(value)
    }
}

impl From<&[u8]> for Key {
    fn from(value: &[u8]) -> Self {
        Key::Bytes(value.to_vec())
    }
}

impl TryFrom<Data> for Key {
    type Error = Error;

    /// Keys must be hashable: nil, floats, and containers are rejected.
    fn try_from(data: Data) -> Result<Self, Error> {
        match data {
            Data::Str(s) => Ok(Key::Str(s)),
            Data::Int(n) => Ok(Key::Int(n)),
            Data::Uint(n) => Ok(Key::Uint(n)),
            Data::Bool(b) => Ok(Key::Bool(b)),
            Data::Char(c) => Ok(Key::Char(c)),
            Data::Bytes(b) => Ok(Key::Bytes(b)),
            Data::Null => Err(Error::NilValue),
            other => Err(Error::unhandled(other.kind())),
        }
    }
}
