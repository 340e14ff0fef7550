//! Error types for conversion, lookup, and binding.

use std::fmt;

use crate::value::Kind;

/// Errors produced while converting values, resolving keys, or binding maps
/// onto destination types.
///
/// Wrapping variants (`Field`, `Element`, `NoValidKey`, `Multiple`) preserve
/// their causes for [`std::error::Error::source`] walking, so a caller can
/// inspect every path segment or field that failed.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A concrete value was required but the source holds nil.
    #[error("value is nil")]
    NilValue,

    /// A converter claimed a destination it never actually wrote.
    #[error("destination {target} was claimed but not written")]
    InvalidTarget {
        /// Type name of the destination slot.
        target: &'static str,
    },

    /// No built-in rule or registered converter covers the source value.
    #[error("no conversion handles {kind} value")]
    Unhandled {
        /// Kind of the source value.
        kind: Kind,
    },

    /// Every candidate key failed to resolve against the map.
    #[error("no valid key among [{}]{}", .keys.join(", "), fmt_causes(.errors))]
    NoValidKey {
        /// The keys that were attempted, in order.
        keys: Vec<String>,
        /// Errors from failed nested traversals along the way.
        errors: Vec<Error>,
    },

    /// A textual form could not be parsed into the requested kind.
    #[error("parsing {input:?}: {source}")]
    Parse {
        /// The input that failed to parse.
        input: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A failure while binding one named field.
    #[error("field {field}: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<Error>,
    },

    /// A failure while converting one element of a sequence.
    #[error("element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    /// A field ended up with no lookup keys at all.
    #[error("field {field} has no lookup keys")]
    NoKeys { field: String },

    /// A fixed-size destination did not match the source length.
    #[error("expected {want} elements, got {got}")]
    Length { want: usize, got: usize },

    /// Several independent failures, collected instead of failing fast.
    #[error("{}", fmt_list(.0))]
    Multiple(Vec<Error>),
}

impl Error {
    /// Wrap a parse failure with the offending input.
    pub fn parse<E>(input: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Parse {
            input: input.into(),
            source: Box::new(source),
        }
    }

    /// Parse failure with a free-form message instead of an underlying error.
    pub fn parse_msg(input: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            input: input.into(),
            source: Box::new(Message(message.into())),
        }
    }

    /// An [`Error::Unhandled`] for a value of the given kind.
    pub fn unhandled(kind: Kind) -> Self {
        Error::Unhandled { kind }
    }

    /// Wrap a field-level failure with the field name.
    pub fn field(field: &str, source: Error) -> Self {
        Error::Field {
            field: field.to_owned(),
            source: Box::new(source),
        }
    }

    /// Wrap an element-level failure with its index.
    pub fn element(index: usize, source: Error) -> Self {
        Error::Element {
            index,
            source: Box::new(source),
        }
    }

    /// Exhaustive lookup failure over `keys`, carrying traversal errors.
    pub fn no_valid_key(keys: Vec<String>, errors: Vec<Error>) -> Self {
        Error::NoValidKey { keys, errors }
    }

    pub(crate) fn invalid_target<T: ?Sized>() -> Self {
        Error::InvalidTarget {
            target: std::any::type_name::<T>(),
        }
    }

    /// Join collected errors into one. A single error passes through
    /// unwrapped; two or more become [`Error::Multiple`].
    pub fn join(mut errors: Vec<Error>) -> Self {
        if errors.len() == 1 {
            errors.remove(0)
        } else {
            Error::Multiple(errors)
        }
    }
}

fn fmt_causes(errors: &[Error]) -> String {
    if errors.is_empty() {
        String::new()
    } else {
        format!(": {}", fmt_list(errors))
    }
}

fn fmt_list(errors: &[Error]) -> String {
    errors
        .iter()
        .map(Error::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Message {}
