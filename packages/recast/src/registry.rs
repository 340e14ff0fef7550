//! Ordered converter registry.
//!
//! A [`Registry`] holds custom [`Convert`] implementations behind the
//! built-in scalar conversions. Lookup walks the chain in order and the
//! first converter to claim a target type settles the outcome, success or
//! failure.

use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;
use std::net::IpAddr;

use time::OffsetDateTime;
use tracing::trace;

use crate::convert::{Context, FromValue};
use crate::error::Error;
use crate::net::MacAddr;
use crate::value::Value;

/// A conversion rule for one or more target types.
///
/// `convert` inspects the erased `target` slot, an `&mut Option<T>` for the
/// requested type. Returning `None` declines the target and lets the next
/// converter in the chain run. Returning `Some` claims it: fill the slot and
/// return `Some(Ok(()))`, or report `Some(Err(..))` to stop the walk.
pub trait Convert: Send + Sync {
    fn convert(&self, value: &Value, target: &mut dyn Any) -> Option<Result<(), Error>>;
}

/// The built-in conversions, always consulted first.
struct Standard;

macro_rules! claim {
    ($value:expr, $target:expr, [$($ty:ty),* $(,)?]) => {
        $(
            if let Some(slot) = $target.downcast_mut::<Option<$ty>>() {
                return Some(<$ty>::from_value($value, &Context::new()).map(|v| {
                    *slot = Some(v);
                }));
            }
        )*
    };
}

impl Convert for Standard {
    fn convert(&self, value: &Value, target: &mut dyn Any) -> Option<Result<(), Error>> {
        claim!(
            value,
            target,
            [
                i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool, char,
                String, OffsetDateTime, IpAddr, MacAddr,
            ]
        );
        None
    }
}

/// Adapter turning a plain closure into a single-target [`Convert`].
struct FnConvert<T, F> {
    convert: F,
    target: PhantomData<fn() -> T>,
}

impl<T, F> Convert for FnConvert<T, F>
where
    T: Any,
    F: Fn(&Value) -> Result<T, Error> + Send + Sync,
{
    fn convert(&self, value: &Value, target: &mut dyn Any) -> Option<Result<(), Error>> {
        let slot = target.downcast_mut::<Option<T>>()?;
        Some((self.convert)(value).map(|v| {
            *slot = Some(v);
        }))
    }
}

/// An ordered chain of converters.
///
/// The standard scalar conversions run first and cannot be shadowed;
/// registered converters run in registration order behind them.
pub struct Registry {
    converters: Vec<Box<dyn Convert>>,
}

impl Registry {
    pub const fn new() -> Self {
        Self {
            converters: Vec::new(),
        }
    }

    /// Appends a converter to the chain.
    pub fn register<C: Convert + 'static>(&mut self, converter: C) -> &mut Self {
        self.converters.push(Box::new(converter));
        self
    }

    /// Appends a closure handling exactly one target type.
    pub fn register_fn<T, F>(&mut self, convert: F) -> &mut Self
    where
        T: Any,
        F: Fn(&Value) -> Result<T, Error> + Send + Sync + 'static,
    {
        self.register(FnConvert {
            convert,
            target: PhantomData,
        })
    }

    /// Converts `value` to `T` through the chain.
    pub fn convert<T: Any>(&self, value: &Value) -> Result<T, Error> {
        let mut slot: Option<T> = None;
        self.convert_into(value, &mut slot)?;
        slot.ok_or_else(|| Error::invalid_target::<T>())
    }

    /// Converts into an erased slot, walking the chain until a converter
    /// claims the target.
    pub fn convert_into(&self, value: &Value, target: &mut dyn Any) -> Result<(), Error> {
        for converter in self.iter() {
            if let Some(outcome) = converter.convert(value, target) {
                return outcome;
            }
        }
        Err(Error::unhandled(value.kind()))
    }

    /// Like [`convert`](Self::convert) but reports whether any converter
    /// claimed the target at all, letting callers fall back when none did.
    pub fn claim<T: Any>(&self, value: &Value) -> Option<Result<T, Error>> {
        let mut slot: Option<T> = None;
        for converter in self.iter() {
            if let Some(outcome) = converter.convert(value, &mut slot) {
                trace!(
                    target_type = type_name::<T>(),
                    ok = outcome.is_ok(),
                    "converter claimed target"
                );
                return Some(match outcome {
                    Ok(()) => slot.ok_or_else(|| Error::invalid_target::<T>()),
                    Err(err) => Err(err),
                });
            }
        }
        None
    }

    fn iter(&self) -> impl Iterator<Item = &dyn Convert> {
        std::iter::once(&Standard as &dyn Convert)
            .chain(self.converters.iter().map(Box::as_ref))
    }

    /// Number of registered converters, the standard pass excluded.
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("converters", &self.converters.len())
            .finish()
    }
}
