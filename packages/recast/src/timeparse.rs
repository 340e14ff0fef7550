//! Timestamp conversion.
//!
//! Numbers are Unix epoch seconds; strings are tried against a fixed layout
//! table, most common forms first.

use lazy_static::lazy_static;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::format_description::{self, BorrowedFormatItem};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use crate::convert::{Context, FromValue};
use crate::error::Error;
use crate::value::{Data, Value};

/// How a layout's parsed components assemble into a timestamp.
#[derive(Clone, Copy)]
enum LayoutKind {
    /// Carries its own UTC offset.
    Offset,
    /// Date and time without an offset; read as UTC.
    Local,
    /// Date only; midnight UTC.
    DateOnly,
    /// Time only; on the epoch date.
    TimeOnly,
}

struct Layout {
    kind: LayoutKind,
    items: Vec<BorrowedFormatItem<'static>>,
}

lazy_static! {
    /// Layouts tried in order after the well-known RFC 3339/2822 forms.
    /// Legacy forms that need a timezone-abbreviation table or lack a year
    /// component cannot be expressed and are left out.
    static ref STRING_LAYOUTS: Vec<Layout> = [
        // 2006-01-02 15:04:05
        (LayoutKind::Local, "[year]-[month]-[day] [hour]:[minute]:[second]"),
        // 2006-01-02
        (LayoutKind::DateOnly, "[year]-[month]-[day]"),
        // 15:04:05
        (LayoutKind::TimeOnly, "[hour]:[minute]:[second]"),
        // Mon Jan  2 15:04:05 2006 (ctime)
        (
            LayoutKind::Local,
            "[weekday repr:short] [month repr:short] [day padding:space] [hour]:[minute]:[second] [year]",
        ),
        // Mon Jan  2 15:04:05 UTC 2006
        (
            LayoutKind::Local,
            "[weekday repr:short] [month repr:short] [day padding:space] [hour]:[minute]:[second] UTC [year]",
        ),
        // Mon Jan 02 15:04:05 -0700 2006
        (
            LayoutKind::Offset,
            "[weekday repr:short] [month repr:short] [day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute] [year]",
        ),
        // 3:04PM
        (LayoutKind::TimeOnly, "[hour repr:12 padding:none]:[minute][period]"),
    ]
    .iter()
    .map(|(kind, layout)| Layout {
        kind: *kind,
        items: format_description::parse_borrowed::<2>(layout).unwrap_or_default(),
    })
    .collect();
}

/// Parse a textual timestamp by trying the known layouts in order.
pub(crate) fn parse_timestamp(input: &str) -> Result<OffsetDateTime, Error> {
    let input = input.trim();
    if let Ok(parsed) = OffsetDateTime::parse(input, &Rfc3339) {
        return Ok(parsed);
    }
    if let Ok(parsed) = OffsetDateTime::parse(input, &Rfc2822) {
        return Ok(parsed);
    }
    for layout in STRING_LAYOUTS.iter() {
        let items = layout.items.as_slice();
        if items.is_empty() {
            continue;
        }
        let parsed = match layout.kind {
            LayoutKind::Offset => OffsetDateTime::parse(input, items).ok(),
            LayoutKind::Local => PrimitiveDateTime::parse(input, items)
                .ok()
                .map(PrimitiveDateTime::assume_utc),
            LayoutKind::DateOnly => Date::parse(input, items)
                .ok()
                .map(|date| date.midnight().assume_utc()),
            LayoutKind::TimeOnly => Time::parse(input, items)
                .ok()
                .map(|t| OffsetDateTime::UNIX_EPOCH.replace_time(t)),
        };
        if let Some(parsed) = parsed {
            return Ok(parsed);
        }
    }
    Err(Error::parse_msg(input, "no known timestamp layout matched"))
}

impl FromValue for OffsetDateTime {
    /// Integers and floats are epoch seconds; unsigned values above
    /// `i64::MAX` fail rather than wrap.
    fn from_value(value: &Value, _ctx: &Context<'_>) -> Result<Self, Error> {
        match value.data() {
            Data::Null => Err(Error::NilValue),
            Data::Time(t) => Ok(*t),
            Data::Int(n) => from_epoch(*n),
            Data::Uint(n) => {
                let n = i64::try_from(*n).map_err(|err| Error::parse(n.to_string(), err))?;
                from_epoch(n)
            }
            Data::Float(x) => from_epoch(*x as i64),
            Data::Str(s) => parse_timestamp(s),
            other => Err(Error::unhandled(other.kind())),
        }
    }
}

fn from_epoch(seconds: i64) -> Result<OffsetDateTime, Error> {
    OffsetDateTime::from_unix_timestamp(seconds)
        .map_err(|err| Error::parse(seconds.to_string(), err))
}
