//! Timestamps.
//!
//! Emitted as `YYYY-MM-DD HH:MM:SS[.ffffff] ±HH:MM`, or with `Z` for a zero
//! offset. The fraction is left out when the sub-second part is zero and
//! widens to nine digits only when the value has sub-microsecond precision.
//! Years outside `0000..=9999` carry a sign and as many digits as they need
//! (`+10000-01-01`, `-0001-12-31`).
//!
//! Offsets are written in whole minutes. Encoding a timestamp whose offset
//! has leftover seconds fails with [`Error::MalformedPayload`].
//!
//! Decode accepts:
//!
//! - date-only text (`2024-01-01`), read as midnight UTC
//! - signed years of four or more digits
//! - `T`/`t` or whitespace between date and time
//! - a fraction of up to nine digits
//! - zones `Z`, `±H`, `±HH`, `±HH:MM`, `±HHMM`; a missing zone means UTC
//! - the mapping form `{at: <timestamp>}`
//!
//! ```rust
//! use tagcodec::{decode, Node, Registry, Style, Value};
//!
//! let registry = Registry::with_builtins();
//! let node = Node::scalar("tag:yaml.org,2002:timestamp", "2024-01-01", Style::Plain);
//!
//! let Value::Timestamp(ts) = decode(&node, &registry).unwrap() else { panic!() };
//! assert_eq!(ts.to_rfc3339(), "2024-01-01T00:00:00+00:00");
//! ```

use super::expect_scalar;
use crate::{tag, Codec, Decoder, Encoder, Error, Node, Result, Style, Value, ValueKind};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

static DATETIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^([-+]?[0-9]{4,})-([0-9]{1,2})-([0-9]{1,2})",
        r"(?:(?:[Tt]|[ \t]+)([0-9]{1,2}):([0-9]{2}):([0-9]{2})(?:\.([0-9]*))?",
        r"[ \t]*(Z|[-+][0-9]{1,2}(?::?[0-9]{2})?)?)?$",
    ))
    .expect("Invalid regex")
});

/// Canonical text of a timestamp. Seconds left over in the offset are dropped.
#[must_use]
pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    let mut out = ts.format("%Y-%m-%d %H:%M:%S").to_string();

    let nanos = ts.nanosecond() % 1_000_000_000;
    if nanos != 0 {
        if nanos % 1_000 == 0 {
            out.push_str(&format!(".{:06}", nanos / 1_000));
        } else {
            out.push_str(&format!(".{:09}", nanos));
        }
    }

    let minutes = ts.offset().local_minus_utc() / 60;
    if minutes == 0 {
        out.push_str(" Z");
    } else {
        let sign = if minutes < 0 { '-' } else { '+' };
        let minutes = minutes.abs();
        out.push_str(&format!(" {}{:02}:{:02}", sign, minutes / 60, minutes % 60));
    }
    out
}

/// Parses timestamp text in any of the accepted forms.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    let caps = DATETIME_PATTERN.captures(text.trim())?;
    let number = |i: usize| -> Option<u32> { caps.get(i)?.as_str().parse().ok() };

    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, number(2)?, number(3)?)?;
    if caps.get(4).is_none() {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return FixedOffset::east_opt(0)?.from_local_datetime(&midnight).single();
    }

    let nanos = match caps.get(7).map(|m| m.as_str()) {
        Some(fraction) if !fraction.is_empty() => {
            let digits: String =
                fraction.chars().chain(std::iter::repeat('0')).take(9).collect();
            digits.parse().ok()?
        }
        _ => 0,
    };
    let naive = date.and_hms_nano_opt(number(4)?, number(5)?, number(6)?, nanos)?;

    let offset = match caps.get(8).map(|m| m.as_str()) {
        None | Some("Z") => FixedOffset::east_opt(0)?,
        Some(zone) => FixedOffset::east_opt(parse_zone(zone)?)?,
    };
    offset.from_local_datetime(&naive).single()
}

/// Seconds east of UTC for `±H`, `±HH`, `±HH:MM` or `±HHMM`.
fn parse_zone(zone: &str) -> Option<i32> {
    let (sign, digits) = match zone.split_at(1) {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() > 2 => digits.split_at(digits.len() - 2),
        None => (digits, "0"),
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    Some(sign * (hours * 3600 + minutes * 60))
}

pub struct TimestampCodec;

impl Codec for TimestampCodec {
    fn tag(&self) -> &str {
        tag::TIMESTAMP
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Timestamp
    }

    fn encode(&self, value: &Value, _encoder: &mut Encoder<'_>) -> Result<Node> {
        let Value::Timestamp(ts) = value else {
            return Err(Error::custom(format!(
                "timestamp codec cannot encode {}",
                value.kind()
            )));
        };
        let offset = ts.offset().local_minus_utc();
        if offset % 60 != 0 {
            return Err(Error::malformed(
                tag::TIMESTAMP,
                "offset in whole minutes",
                format!("offset of {} seconds", offset),
            ));
        }
        Ok(Node::scalar(tag::TIMESTAMP, format_timestamp(ts), Style::Plain))
    }

    fn decode(&self, tag: &str, node: &Node, decoder: &mut Decoder<'_>) -> Result<Value> {
        if node.is_mapping() {
            let fields = decoder.decode_fields(tag, node)?;
            return match fields.get("at") {
                Some(Value::Timestamp(ts)) => Ok(Value::Timestamp(*ts)),
                Some(Value::String(text)) => {
                    parse_timestamp(text).map(Value::Timestamp).ok_or_else(|| {
                        Error::malformed(tag, "timestamp text", format!("`{}`", text))
                            .with_field("at")
                    })
                }
                Some(other) => {
                    Err(Error::malformed(tag, "timestamp", other.to_string()).with_field("at"))
                }
                None => Err(Error::malformed(tag, "`at` field", node.describe())),
            };
        }
        let text = expect_scalar(tag, node)?;
        parse_timestamp(text)
            .map(Value::Timestamp)
            .ok_or_else(|| Error::malformed(tag, "timestamp text", node.describe()))
    }
}
