//! Semantic checks every schema-aware backend applies the same way.
//!
//! The parser leaves field names, function names, enum literals and literal
//! values unchecked. These helpers turn each rule into the matching
//! [`Error`] kind so that two backends reject the same query with the same
//! error.

use crate::ast::{Comparator, LiteralKind};
use crate::error::{Error, Result};
use crate::functions::{FunctionCatalog, FunctionSignature};
use crate::schema::{SchemaResolver, ValueType};
use base64::{Engine as _, alphabet, engine};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

static DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]{4}-[0-9]{2}-[0-9]{2})T([0-9]{2}):([0-9]{2})(?::([0-9]{2})(?:\.([0-9]+))?)?(Z|[+-][0-9]{2}:[0-9]{2})?$",
    )
    .expect("date-time pattern")
});

static TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2}):([0-9]{2})(?::([0-9]{2})(?:\.([0-9]+))?)?$").expect("time pattern")
});

static DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(-)?P(?:([0-9]+)D)?(?:T(?:([0-9]+)H)?(?:([0-9]+)M)?(?:([0-9]+)(?:\.([0-9]+))?S)?)?$",
    )
    .expect("duration pattern")
});

/// A literal decoded into a typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Decimal(Decimal),
    /// Numbers outside the decimal range, `NaN` and `INF`
    Float(f64),
    Boolean(bool),
    Null,
    Date(NaiveDate),
    DateTime {
        local: NaiveDateTime,
        offset: Option<FixedOffset>,
    },
    Time(NaiveTime),
    Duration(TimeDelta),
    Guid(String),
    Binary(Vec<u8>),
}

/// Static type of a literal kind.
pub fn literal_type(kind: LiteralKind) -> ValueType {
    match kind {
        LiteralKind::String => ValueType::String,
        LiteralKind::Number => ValueType::Number,
        LiteralKind::Boolean => ValueType::Boolean,
        LiteralKind::Null => ValueType::Null,
        LiteralKind::Date => ValueType::Date,
        LiteralKind::DateTime => ValueType::Datetime,
        LiteralKind::Time => ValueType::Time,
        LiteralKind::Duration => ValueType::Duration,
        LiteralKind::Guid => ValueType::Guid,
        LiteralKind::Binary => ValueType::Binary,
    }
}

/// Decodes a literal, failing with [`Error::Value`] when the text is well
/// formed but the value is impossible (e.g. `2023-02-30`).
pub fn decode_literal(kind: LiteralKind, value: &str) -> Result<LiteralValue> {
    let invalid = || Error::value(value);

    Ok(match kind {
        LiteralKind::String => LiteralValue::String(value.to_string()),
        LiteralKind::Number => decode_number(value).ok_or_else(invalid)?,
        LiteralKind::Boolean => match value.to_ascii_lowercase().as_str() {
            "true" => LiteralValue::Boolean(true),
            "false" => LiteralValue::Boolean(false),
            _ => return Err(invalid()),
        },
        LiteralKind::Null => LiteralValue::Null,
        LiteralKind::Date => LiteralValue::Date(
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())?,
        ),
        LiteralKind::DateTime => decode_datetime(value).ok_or_else(invalid)?,
        LiteralKind::Time => {
            let caps = TIME.captures(value).ok_or_else(invalid)?;
            let time = hms(caps.get(1), caps.get(2), caps.get(3), caps.get(4));
            LiteralValue::Time(time.ok_or_else(invalid)?)
        }
        LiteralKind::Duration => {
            LiteralValue::Duration(decode_duration(value).ok_or_else(invalid)?)
        }
        LiteralKind::Guid => LiteralValue::Guid(value.to_ascii_lowercase()),
        LiteralKind::Binary => {
            // Clients disagree about base64 padding, so accept both.
            let config = engine::GeneralPurposeConfig::new()
                .with_decode_padding_mode(engine::DecodePaddingMode::Indifferent);
            let engine = engine::GeneralPurpose::new(&alphabet::URL_SAFE, config);
            LiteralValue::Binary(engine.decode(value).map_err(|_| invalid())?)
        }
    })
}

fn decode_number(value: &str) -> Option<LiteralValue> {
    match value {
        "NaN" => return Some(LiteralValue::Float(f64::NAN)),
        "INF" => return Some(LiteralValue::Float(f64::INFINITY)),
        _ => {}
    }
    let decimal = if value.contains(['e', 'E']) {
        Decimal::from_scientific(value).ok()
    } else {
        Decimal::from_str(value).ok()
    };
    match decimal {
        Some(d) => Some(LiteralValue::Decimal(d)),
        None => value
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(LiteralValue::Float),
    }
}

fn capture_u32(m: Option<regex::Match<'_>>) -> Option<u32> {
    m.map_or(Some(0), |m| m.as_str().parse().ok())
}

/// Fraction digits as nanoseconds, extra precision truncated.
fn nanos(m: Option<regex::Match<'_>>) -> Option<u32> {
    let Some(m) = m else {
        return Some(0);
    };
    let digits: String = m.as_str().chars().chain(std::iter::repeat('0')).take(9).collect();
    digits.parse().ok()
}

fn hms(
    hour: Option<regex::Match<'_>>,
    minute: Option<regex::Match<'_>>,
    second: Option<regex::Match<'_>>,
    fraction: Option<regex::Match<'_>>,
) -> Option<NaiveTime> {
    NaiveTime::from_hms_nano_opt(
        capture_u32(hour)?,
        capture_u32(minute)?,
        capture_u32(second)?,
        nanos(fraction)?,
    )
}

fn decode_datetime(value: &str) -> Option<LiteralValue> {
    let caps = DATE_TIME.captures(value)?;
    let date = NaiveDate::parse_from_str(caps.get(1)?.as_str(), "%Y-%m-%d").ok()?;
    let time = hms(caps.get(2), caps.get(3), caps.get(4), caps.get(5))?;

    let offset = match caps.get(6).map(|m| m.as_str()) {
        None => None,
        Some("Z") => Some(FixedOffset::east_opt(0)?),
        Some(text) => {
            let sign = if text.starts_with('-') { -1 } else { 1 };
            let hours: i32 = text[1..3].parse().ok()?;
            let minutes: i32 = text[4..6].parse().ok()?;
            if minutes >= 60 {
                return None;
            }
            Some(FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?)
        }
    };

    Some(LiteralValue::DateTime {
        local: date.and_time(time),
        offset,
    })
}

/// ISO 8601 day-time duration, e.g. `P1DT2H30M`, `-PT0.5S`.
fn decode_duration(value: &str) -> Option<TimeDelta> {
    let caps = DURATION.captures(value)?;
    // `P` alone, or a dangling `T`, carry no component.
    if (2..=5).all(|i| caps.get(i).is_none()) || value.ends_with('T') {
        return None;
    }

    let component = |i: usize| -> Option<i64> {
        caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok())
    };
    let total = TimeDelta::try_days(component(2)?)?
        .checked_add(&TimeDelta::try_hours(component(3)?)?)?
        .checked_add(&TimeDelta::try_minutes(component(4)?)?)?
        .checked_add(&TimeDelta::try_seconds(component(5)?)?)?
        .checked_add(&TimeDelta::nanoseconds(i64::from(nanos(caps.get(6))?)))?;

    Some(if caps.get(1).is_some() { -total } else { total })
}

/// Resolves a field path, naming the first segment the schema does not know.
pub fn resolve_path(resolver: &dyn SchemaResolver, path: &[String]) -> Result<ValueType> {
    let segments: Vec<&str> = path.iter().map(String::as_str).collect();
    if let Some(ty) = resolver.resolve_field(&segments) {
        debug!(field = %segments.join("/"), ty = %ty, "resolved field");
        return Ok(ty);
    }

    let unresolved = (1..=segments.len())
        .find(|&len| resolver.resolve_field(&segments[..len]).is_none())
        .unwrap_or(segments.len());
    Err(Error::invalid_field(segments[..unresolved].join("/")))
}

/// Looks a function up and checks its arity.
pub fn check_function<'c>(
    catalog: &'c FunctionCatalog,
    name: &str,
    given: usize,
) -> Result<&'c FunctionSignature> {
    let signature = catalog.get(name).ok_or_else(|| Error::UnknownFunction {
        function: name.to_string(),
    })?;
    if !signature.supported {
        return Err(Error::UnsupportedFunction {
            function: name.to_string(),
        });
    }
    if given < signature.min_args || given > signature.max_args {
        return Err(Error::ArgumentCount {
            function: name.to_string(),
            min: signature.min_args,
            max: signature.max_args,
            given,
        });
    }
    debug!(function = name, args = given, "function call accepted");
    Ok(signature)
}

/// Checks the type of argument `index` of a call.
pub fn check_argument(
    signature: &FunctionSignature,
    index: usize,
    actual: &ValueType,
) -> Result<()> {
    let expected = signature.param(index);
    if expected.accepts(actual) {
        return Ok(());
    }
    Err(Error::ArgumentType {
        function: Some(signature.name.clone()),
        expected: Some(expected.to_string()),
        actual: Some(actual.to_string()),
    })
}

/// Checks that `type_name'value'` is a member of the enum declared on `field`.
pub fn check_enum_literal(
    resolver: &dyn SchemaResolver,
    field: &str,
    field_enum: &str,
    type_name: &str,
    value: &str,
) -> Result<()> {
    if type_name != field_enum {
        return Err(Error::EnumType {
            enum_type: type_name.to_string(),
            field: field.to_string(),
        });
    }
    check_enum_member(resolver, type_name, value)
}

/// Checks that `value` is a member of the enum type `type_name`.
pub fn check_enum_member(
    resolver: &dyn SchemaResolver,
    type_name: &str,
    value: &str,
) -> Result<()> {
    let Some(values) = resolver.enum_values(type_name) else {
        return Err(Error::value(format!("{type_name}'{value}'")));
    };
    if values.iter().any(|v| v == value) {
        return Ok(());
    }
    Err(Error::InvalidEnumValue {
        value: value.to_string(),
        enum_type: type_name.to_string(),
        valid_values: values.to_vec(),
    })
}

/// Ordering comparators make no sense against `null`.
pub fn check_ordering(comparator: Comparator, ty: &ValueType, value_text: &str) -> Result<()> {
    if comparator.is_ordering() && *ty == ValueType::Null {
        return Err(Error::type_error(comparator.as_str(), value_text));
    }
    Ok(())
}

/// Whether values of the two types can be compared with each other.
pub fn comparable(left: &ValueType, right: &ValueType) -> bool {
    match (left, right) {
        (ValueType::Any, _) | (_, ValueType::Any) => true,
        (ValueType::Null, _) | (_, ValueType::Null) => true,
        (a, b) if a.is_temporal() && b.is_temporal() => {
            a == b || !matches!((a, b), (ValueType::Time, _) | (_, ValueType::Time))
        }
        (a, b) => a == b,
    }
}
