//! Conversion of values into concrete target types.
//!
//! [`FromValue`] is the single dispatch seam. Implementing it for a type is
//! exclusive: no built-in logic runs for that type. The impls here cover the
//! primitive scalar targets with the engine's fixed rules; pointer-chain
//! targets (`Option`, `Box`) materialize and recurse; sequence targets expand
//! the source through the list resolver. Custom target types extend the
//! engine through a [`Registry`](crate::Registry) carried in the [`Context`].

use std::any::Any;

use crate::error::Error;
use crate::map::Map;
use crate::registry::Registry;
use crate::value::{Data, Value};
use crate::varint;

/// Strings read as `false`, consulted before the generic parser.
pub const BOOL_STRINGS_FALSE: &[&str] = &["", "0", "no", "n", "false", "na", "n/a"];

/// Strings read as `true`, consulted before the generic parser.
pub const BOOL_STRINGS_TRUE: &[&str] = &["1", "yes", "y", "true"];

/// Switches for map-to-struct binding.
#[derive(Clone, Copy, Debug)]
pub struct ToOptions {
    /// Untagged fields fall back to their own name as the lookup key.
    pub field_name_fallback: bool,
    /// Skip untagged fields outright.
    pub skip_untagged: bool,
    /// Append the field name after tag-provided keys as a last resort.
    pub append_field_name: bool,
    /// Demote "no candidate key matched" to a silent skip.
    pub ignore_missing: bool,
    /// Attempt every field and aggregate failures instead of failing fast.
    pub collect_errors: bool,
}

impl Default for ToOptions {
    fn default() -> Self {
        Self {
            field_name_fallback: true,
            skip_untagged: false,
            append_field_name: false,
            ignore_missing: false,
            collect_errors: false,
        }
    }
}

/// Carries the converter registry and binding options through a conversion.
///
/// Cheap to copy; build one per ingest and pass it to the `_in` variants of
/// [`Value::to`](crate::Value::to) and [`Map::to`](crate::Map::to).
#[derive(Clone, Copy, Debug, Default)]
pub struct Context<'a> {
    registry: Option<&'a Registry>,
    options: ToOptions,
}

impl<'a> Context<'a> {
    /// Context with no registry and default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context consulting `registry` for custom target types.
    pub fn with_registry(registry: &'a Registry) -> Self {
        Self {
            registry: Some(registry),
            options: ToOptions::default(),
        }
    }

    /// Replace the binding options.
    pub fn with_options(mut self, options: ToOptions) -> Self {
        self.options = options;
        self
    }

    /// The attached registry, if any.
    pub fn registry(&self) -> Option<&'a Registry> {
        self.registry
    }

    /// The binding options.
    pub fn options(&self) -> &ToOptions {
        &self.options
    }

    /// Offer `value` to the registry for target `T`.
    ///
    /// `None` when no registry is attached or no converter claims the type;
    /// the claim outcome, success or failure, is final otherwise.
    pub fn claim<T: Any>(&self, value: &Value) -> Option<Result<T, Error>> {
        self.registry.and_then(|registry| registry.claim(value))
    }
}

/// Types that can construct themselves from a [`Value`].
///
/// This is the from-value capability: a type implementing it takes over its
/// own conversion entirely. Derived structs consult the registry first and
/// then fall back to map binding; scalar impls apply the fixed built-in
/// rules.
pub trait FromValue: Sized {
    /// Build `Self` from `value`.
    fn from_value(value: &Value, ctx: &Context<'_>) -> Result<Self, Error>;
}

macro_rules! int_from_value {
    ($decode:path => $($ty:ty),+) => {$(
        impl FromValue for $ty {
            /// Numeric kinds cast with truncation; strings parse at the
            /// target width (float-form strings truncate); booleans map to
            /// 1/0; byte buffers decode as a varint.
            fn from_value(value: &Value, _ctx: &Context<'_>) -> Result<Self, Error> {
                match value.data() {
                    Data::Null => Err(Error::NilValue),
                    Data::Bool(b) => Ok(*b as u8 as $ty),
                    Data::Int(n) => Ok(*n as $ty),
                    Data::Uint(n) => Ok(*n as $ty),
                    Data::Float(x) => Ok(*x as $ty),
                    Data::Char(c) => Ok(*c as u32 as $ty),
                    Data::Str(s) => {
                        let s = s.trim();
                        if s.contains('.') {
                            let x: f64 = s.parse().map_err(|err| Error::parse(s, err))?;
                            Ok(x as $ty)
                        } else {
                            s.parse::<$ty>().map_err(|err| Error::parse(s, err))
                        }
                    }
                    Data::Bytes(bytes) => $decode(bytes)
                        .map(|(n, _)| n as $ty)
                        .ok_or_else(|| {
                            Error::parse_msg(format!("{bytes:?}"), "varint decode consumed no bytes")
                        }),
                    other => Err(Error::unhandled(other.kind())),
                }
            }
        }
    )+};
}

int_from_value!(varint::decode_signed => i8, i16, i32, i64, isize);
int_from_value!(varint::decode_unsigned => u8, u16, u32, u64, usize);

macro_rules! float_from_value {
    ($ty:ty, $from_bits:expr) => {
        impl FromValue for $ty {
            /// Strings always parse as floats (exponent forms included);
            /// byte buffers decode a varint and reinterpret the bits.
            fn from_value(value: &Value, _ctx: &Context<'_>) -> Result<Self, Error> {
                match value.data() {
                    Data::Null => Err(Error::NilValue),
                    Data::Bool(b) => Ok(*b as u8 as $ty),
                    Data::Int(n) => Ok(*n as $ty),
                    Data::Uint(n) => Ok(*n as $ty),
                    Data::Float(x) => Ok(*x as $ty),
                    Data::Char(c) => Ok(*c as u32 as $ty),
                    Data::Str(s) => {
                        let s = s.trim();
                        s.parse::<$ty>().map_err(|err| Error::parse(s, err))
                    }
                    Data::Bytes(bytes) => varint::decode_unsigned(bytes)
                        .map(|(bits, _)| ($from_bits)(bits))
                        .ok_or_else(|| {
                            Error::parse_msg(format!("{bytes:?}"), "varint decode consumed no bytes")
                        }),
                    other => Err(Error::unhandled(other.kind())),
                }
            }
        }
    };
}

float_from_value!(f32, |bits: u64| f32::from_bits(bits as u32));
float_from_value!(f64, f64::from_bits);

impl FromValue for bool {
    /// The lowercased string form is checked against the fixed token sets
    /// before the generic parser, so ambiguous tokens fail rather than
    /// silently defaulting.
    fn from_value(value: &Value, _ctx: &Context<'_>) -> Result<Self, Error> {
        if value.is_nil() {
            return Err(Error::NilValue);
        }
        let lowered = value.as_string().to_lowercase();
        if BOOL_STRINGS_FALSE.contains(&lowered.as_str()) {
            return Ok(false);
        }
        if BOOL_STRINGS_TRUE.contains(&lowered.as_str()) {
            return Ok(true);
        }
        match lowered.as_str() {
            "t" => Ok(true),
            "f" => Ok(false),
            other => other.parse::<bool>().map_err(|err| Error::parse(other, err)),
        }
    }
}

impl FromValue for String {
    /// Never fails; see [`Value::as_string`].
    fn from_value(value: &Value, _ctx: &Context<'_>) -> Result<Self, Error> {
        Ok(value.as_string())
    }
}

impl FromValue for char {
    fn from_value(value: &Value, _ctx: &Context<'_>) -> Result<Self, Error> {
        match value.data() {
            Data::Null => Err(Error::NilValue),
            Data::Char(c) => Ok(*c),
            Data::Str(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(Error::parse_msg(s, "expected exactly one character")),
                }
            }
            Data::Int(n) => u32::try_from(*n)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| Error::parse_msg(n.to_string(), "not a valid character code point")),
            Data::Uint(n) => u32::try_from(*n)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| Error::parse_msg(n.to_string(), "not a valid character code point")),
            other => Err(Error::unhandled(other.kind())),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    /// Nil becomes `None`; anything else converts into the payload. This is
    /// the pointer-chain materialization rule rendered with explicit
    /// optionality.
    fn from_value(value: &Value, ctx: &Context<'_>) -> Result<Self, Error> {
        if value.is_nil() {
            return Ok(None);
        }
        T::from_value(value, ctx).map(Some)
    }
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_value(value: &Value, ctx: &Context<'_>) -> Result<Self, Error> {
        T::from_value(value, ctx).map(Box::new)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    /// Expands the source via [`Value::list`] with the default separators
    /// and converts every element; failure on any element discards the
    /// whole conversion.
    fn from_value(value: &Value, ctx: &Context<'_>) -> Result<Self, Error> {
        let items = value.list(&[])?;
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let converted =
                T::from_value(item, ctx).map_err(|err| Error::element(index, err))?;
            out.push(converted);
        }
        Ok(out)
    }
}

impl<T: FromValue, const N: usize> FromValue for [T; N] {
    fn from_value(value: &Value, ctx: &Context<'_>) -> Result<Self, Error> {
        let items = Vec::<T>::from_value(value, ctx)?;
        if items.len() != N {
            return Err(Error::Length {
                want: N,
                got: items.len(),
            });
        }
        items
            .try_into()
            .map_err(|_| Error::invalid_target::<[T; N]>())
    }
}

impl FromValue for Value {
    fn from_value(value: &Value, _ctx: &Context<'_>) -> Result<Self, Error> {
        Ok(value.clone())
    }
}

impl FromValue for Data {
    fn from_value(value: &Value, _ctx: &Context<'_>) -> Result<Self, Error> {
        Ok(value.data().clone())
    }
}

impl FromValue for Map {
    fn from_value(value: &Value, _ctx: &Context<'_>) -> Result<Self, Error> {
        value.as_map()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_casts_truncate_as_policy() {
        // Narrowing wraps, float-to-int truncates toward zero.
        assert_eq!(Value::new(300i64).as_i8().unwrap(), 44);
        assert_eq!(Value::new(123.6f64).as_i64().unwrap(), 123);
        assert_eq!(Value::new(-1i64).as_u32().unwrap(), u32::MAX);
        assert_eq!(Value::new(5u64).as_i16().unwrap(), 5);
        assert_eq!(Value::new(true).as_i64().unwrap(), 1);
        assert_eq!(Value::new(false).as_f64().unwrap(), 0.0);
        assert_eq!(Value::new('A').as_u32().unwrap(), 65);
    }

    #[test]
    fn string_numbers_trim_and_respect_width() {
        assert_eq!(Value::new(" 123.0").as_i64().unwrap(), 123);
        assert_eq!(Value::new("123.0 ").as_i64().unwrap(), 123);
        assert_eq!(Value::new("123.6").as_u8().unwrap(), 123);
        assert_eq!(Value::new("6622").as_u32().unwrap(), 6622);
        // Width-checked integer parse: out of range fails.
        assert!(matches!(
            Value::new("300").as_i8(),
            Err(Error::Parse { .. })
        ));
        assert!(matches!(
            Value::new("-5").as_u32(),
            Err(Error::Parse { .. })
        ));
        assert!(matches!(
            Value::new("c").as_i64(),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn float_strings_parse_directly() {
        assert_eq!(Value::new("1.5").as_f32().unwrap(), 1.5);
        assert_eq!(Value::new("1e5").as_f64().unwrap(), 100_000.0);
        assert_eq!(Value::new("123").as_f64().unwrap(), 123.0);
        assert!(matches!(
            Value::new("wat").as_f64(),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn byte_buffers_decode_as_varints() {
        let buf = vec![0x9cu8, 0x85, 0xe3, 0x0b, 0, 0, 0, 0];
        assert_eq!(Value::new(buf).as_i64().unwrap(), 12_345_678);
        // Unsigned targets use the plain variant.
        assert_eq!(Value::new(vec![0x01u8]).as_u64().unwrap(), 1);
        assert!(matches!(
            Value::new(Vec::<u8>::new()).as_u64(),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn float_targets_reinterpret_varint_bits() {
        let bits = 1.5f64.to_bits();
        let mut buf = Vec::new();
        let mut rest = bits;
        loop {
            let group = (rest & 0x7f) as u8;
            rest >>= 7;
            if rest == 0 {
                buf.push(group);
                break;
            }
            buf.push(group | 0x80);
        }
        assert_eq!(Value::new(buf).as_f64().unwrap(), 1.5);
    }

    #[test]
    fn bool_tokens_before_generic_parser() {
        for input in ["", "0", "no", "n", "FALSE", "na", "N/A", "f"] {
            assert_eq!(Value::new(input).as_bool().unwrap(), false, "{input:?}");
        }
        for input in ["1", "YES", "y", "true", "T"] {
            assert_eq!(Value::new(input).as_bool().unwrap(), true, "{input:?}");
        }
        assert!(matches!(
            Value::new("maybe").as_bool(),
            Err(Error::Parse { .. })
        ));
        // Non-string sources go through their string form.
        assert_eq!(Value::new(1i64).as_bool().unwrap(), true);
        assert_eq!(Value::new(0i64).as_bool().unwrap(), false);
        assert!(Value::new(5i64).as_bool().is_err());
        assert!(matches!(Value::new(()).as_bool(), Err(Error::NilValue)));
    }

    #[test]
    fn string_conversion_never_fails() {
        assert_eq!(Value::new(()).as_string(), "");
        assert_eq!(Value::new(15i64).as_string(), "15");
        assert_eq!(Value::new("as is").as_string(), "as is");
    }

    #[test]
    fn char_conversion() {
        assert_eq!(Value::new('x').as_char().unwrap(), 'x');
        assert_eq!(Value::new("y").as_char().unwrap(), 'y');
        assert_eq!(Value::new(65i64).as_char().unwrap(), 'A');
        assert!(Value::new("too long").as_char().is_err());
        assert!(matches!(Value::new(()).as_char(), Err(Error::NilValue)));
    }

    #[test]
    fn option_and_box_materialize() {
        let mut maybe: Option<i64> = Some(9);
        Value::new(()).to(&mut maybe).unwrap();
        assert_eq!(maybe, None);
        Value::new("123").to(&mut maybe).unwrap();
        assert_eq!(maybe, Some(123));

        let mut boxed: Box<u16> = Box::new(0);
        Value::new(42i64).to(&mut boxed).unwrap();
        assert_eq!(*boxed, 42);

        let mut chained: Option<Box<i8>> = None;
        Value::new(7i64).to(&mut chained).unwrap();
        assert_eq!(chained.as_deref(), Some(&7));
    }

    #[test]
    fn sequence_targets_expand_and_abort_whole() {
        let mut numbers: Vec<i64> = Vec::new();
        Value::new("1,2,3").to(&mut numbers).unwrap();
        assert_eq!(numbers, vec![1, 2, 3]);

        let mut strings: Vec<String> = Vec::new();
        Value::new("a\nb").to(&mut strings).unwrap();
        assert_eq!(strings, vec!["a", "b"]);

        let mut failed: Vec<i64> = Vec::new();
        let err = Value::new("1,x,3").to(&mut failed).unwrap_err();
        assert!(matches!(err, Error::Element { index: 1, .. }));
        assert!(failed.is_empty());

        let mut fixed: [u8; 2] = [0; 2];
        Value::new("4,5").to(&mut fixed).unwrap();
        assert_eq!(fixed, [4, 5]);
        assert!(matches!(
            Value::new("4,5,6").to(&mut fixed),
            Err(Error::Length { want: 2, got: 3 })
        ));
    }

    #[test]
    fn bytes_expand_per_element() {
        let mut bytes: Vec<u8> = Vec::new();
        Value::new(vec![1u8, 2, 3]).to(&mut bytes).unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn identity_targets() {
        let value = Value::new("keep");
        let mut out = Value::default();
        value.to(&mut out).unwrap();
        assert_eq!(out, value);

        let mut data = Data::Null;
        value.to(&mut data).unwrap();
        assert_eq!(data, Data::Str("keep".into()));
    }
}
