use std::fmt::Display;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

use crate::core::{BusError, Result};

pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Create a datetime from a string, or `None` for a missing/empty input.
///
/// `timezone` (`UTC`, `Z`, `+03:00`, `-0500`) applies to inputs without an
/// explicit offset and defaults to UTC.
pub fn datetime_instantiator(
    datetime: Option<&str>,
    timezone: Option<&str>,
) -> Result<Option<DateTime<FixedOffset>>> {
    let Some(datetime) = datetime.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let offset = match timezone.map(str::trim).filter(|s| !s.is_empty()) {
        Some(tz) => parse_offset(tz)?,
        None => utc_offset(),
    };

    if datetime.eq_ignore_ascii_case("now") {
        return Ok(Some(Utc::now().with_timezone(&offset)));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(datetime) {
        return Ok(Some(parsed));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(datetime, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(datetime, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| {
            BusError::CreateDateTimeFailed(format!("unrecognised datetime '{datetime}'"))
        })?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(Some)
        .ok_or_else(|| BusError::CreateDateTimeFailed(format!("ambiguous datetime '{datetime}'")))
}

/// Format a datetime, or `None` when no datetime is given.
pub fn datetime_to_string<Tz>(datetime: Option<&DateTime<Tz>>, format: &str) -> Result<Option<String>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(datetime) = datetime else {
        return Ok(None);
    };

    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if format.is_empty() || items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(BusError::InvalidDateTimeFormat(format.to_string()));
    }

    Ok(Some(
        datetime.format_with_items(items.into_iter()).to_string(),
    ))
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

fn parse_offset(timezone: &str) -> Result<FixedOffset> {
    if timezone.eq_ignore_ascii_case("utc") || timezone == "Z" {
        return Ok(utc_offset());
    }

    let invalid = || BusError::CreateDateTimeFailed(format!("unsupported timezone '{timezone}'"));

    let (sign, rest) = match timezone.as_bytes().first() {
        Some(b'+') => (1, &timezone[1..]),
        Some(b'-') => (-1, &timezone[1..]),
        _ => return Err(invalid()),
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
