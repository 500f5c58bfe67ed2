use std::time::Duration;

use nom::{branch::alt, bytes::complete::tag, character::complete::digit1};

use super::parse::{IResult, ParseError, Span};
use crate::error::{Error, Result};

pub fn parse_duration(s: &str) -> Result<Duration> {
    match duration(Span::new(s)) {
        Ok((_, d)) => Ok(d),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(Error::config(format!(
            "invalid duration '{}' at offset {}: {}",
            s,
            e.offset(),
            e.message()
        ))),
        Err(nom::Err::Incomplete(_)) => Err(Error::config(format!("incomplete duration '{}'", s))),
    }
}

/// Parse Go-like duration string: `5s`, `30m`, `1h30m`, `500ms`.
/// - Only positive durations.
/// - No fractional units.
/// - Units are always ordered from longest to shortest.
pub(crate) fn duration(input: Span) -> IResult<Duration> {
    let (rest, duration) = duration_inner(input, Unit::Day)?;

    if !rest.fragment().is_empty() {
        return Err(nom::Err::Failure(ParseError::new(
            "unexpected trailing characters".to_owned(),
            rest,
        )));
    }

    if duration.eq(&Duration::from_millis(0)) {
        return Err(nom::Err::Failure(ParseError::new(
            "duration must be greater than 0".to_owned(),
            input,
        )));
    }

    Ok((rest, duration))
}

enum Unit {
    Millisecond,
    Second, // 1000 milliseconds
    Minute, // 60 seconds
    Hour,   // 60 minutes
    Day,    // 24 hours
}

impl Unit {
    fn from_literal(u: &str) -> Option<Self> {
        use Unit::*;
        match u {
            "d" => Some(Day),
            "h" => Some(Hour),
            "m" => Some(Minute),
            "s" => Some(Second),
            "ms" => Some(Millisecond),
            _ => None,
        }
    }

    fn milliseconds(&self) -> u64 {
        use Unit::*;
        match self {
            Millisecond => 1,
            Second => 1000,
            Minute => 60 * 1000,
            Hour => 60 * 60 * 1000,
            Day => 24 * 60 * 60 * 1000,
        }
    }

    fn descendant(&self) -> Option<Self> {
        use Unit::*;
        match self {
            Millisecond => None,
            Second => Some(Millisecond),
            Minute => Some(Second),
            Hour => Some(Minute),
            Day => Some(Hour),
        }
    }
}

fn duration_inner(input: Span, max_allowed_unit: Unit) -> IResult<Duration> {
    let (rest, multiplier) = digit1(input)?;

    // "ms" must be tried before "m".
    let (rest, unit) = alt((tag("ms"), tag("s"), tag("m"), tag("h"), tag("d")))(rest)?;

    let unit = match Unit::from_literal(unit.fragment()) {
        Some(unit) if unit.milliseconds() <= max_allowed_unit.milliseconds() => unit,
        _ => {
            return Err(nom::Err::Failure(ParseError::new(
                "invalid duration literal".to_owned(),
                input,
            )))
        }
    };

    let overflow = || {
        nom::Err::Failure(ParseError::new(
            "duration overflow occurred".to_owned(),
            input,
        ))
    };

    let duration = multiplier
        .fragment()
        .parse::<u32>()
        .ok()
        .and_then(|m| Duration::from_millis(unit.milliseconds()).checked_mul(m))
        .ok_or_else(overflow)?;

    match unit.descendant() {
        Some(next_unit) => {
            let (rest, more_duration) = match duration_inner(rest, next_unit) {
                Ok((rest, more_duration)) => (rest, more_duration),
                Err(nom::Err::Error(_)) => (rest, Duration::from_millis(0)),
                Err(e) => return Err(e),
            };
            let total = duration.checked_add(more_duration).ok_or_else(overflow)?;
            Ok((rest, total))
        }
        None => Ok((rest, duration)),
    }
}
