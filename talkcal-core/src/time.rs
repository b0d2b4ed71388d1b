//! Time normalization: form input → timestamps in the reference zone.
//!
//! Browsers submit `datetime-local` values without any offset. They are read
//! as wall-clock times in the [`ReferenceZone`] and written back out as
//! `YYYYMMDDTHHMMSS`, with the zone declared separately through `TZID`.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDateTime, Utc};

use crate::constants::DEFAULT_DURATION_MINUTES;
use crate::error::{TalkCalError, TalkCalResult};
use crate::timezone::ReferenceZone;

/// Wall-clock formats accepted from the form, most specific first.
const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Local timestamp format used for DTSTART/DTEND with a TZID parameter.
const ICS_LOCAL_FORMAT: &str = "%Y%m%dT%H%M%S";

/// UTC timestamp format used for DTSTAMP.
const ICS_UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Format of the `datetime-local` inputs on the form.
const FORM_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Years that fit the four-digit `YYYY` of a stamp.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 0..=9999;

/// Start and end of a talk, both expressed in the reference zone.
#[derive(Debug, Clone, PartialEq)]
pub struct EventWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl EventWindow {
    pub fn start_stamp(&self) -> String {
        format_ics_local(&self.start)
    }

    pub fn end_stamp(&self) -> String {
        format_ics_local(&self.end)
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Normalize the start and (optional) end submitted by the form.
///
/// A missing or blank `end` becomes `start + 1 hour`. Anything else that
/// does not parse is rejected, as is an end before the start. A zero-length
/// window is accepted.
pub fn normalize(start: &str, end: Option<&str>, zone: &ReferenceZone) -> TalkCalResult<EventWindow> {
    if start.trim().is_empty() {
        return Err(TalkCalError::invalid_time(start, "start time is required"));
    }
    let start = parse_local(start, zone)?;

    let end = match end.map(str::trim).filter(|s| !s.is_empty()) {
        Some(end) => parse_local(end, zone)?,
        None => default_end(start).ok_or_else(|| {
            TalkCalError::invalid_time(&format_ics_local(&start), "default end time is out of range")
        })?,
    };

    if end < start {
        return Err(TalkCalError::EndBeforeStart {
            start: format_ics_local(&start),
            end: format_ics_local(&end),
        });
    }

    Ok(EventWindow { start, end })
}

/// Parse a single form value into an instant in the reference zone.
///
/// Values without an offset are wall-clock times in `zone`. Values with an
/// explicit offset (RFC 3339) keep their absolute instant and are shifted
/// into `zone`.
pub fn parse_local(input: &str, zone: &ReferenceZone) -> TalkCalResult<DateTime<FixedOffset>> {
    let s = input.trim();

    let parsed = if let Some(naive) = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        zone.localize(naive)
            .ok_or_else(|| TalkCalError::invalid_time(input, "out of range"))?
    } else {
        DateTime::parse_from_rfc3339(s)
            .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%:z"))
            .map_err(|_| {
                TalkCalError::invalid_time(input, "expected a date-time like 2024-03-01T14:00")
            })?
            .with_timezone(&zone.offset())
    };

    if !YEAR_RANGE.contains(&parsed.year()) {
        return Err(TalkCalError::invalid_time(
            input,
            "year must be between 0000 and 9999",
        ));
    }
    Ok(parsed)
}

/// `start` + the default duration, if that still fits a four-digit year.
fn default_end(start: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    start
        .checked_add_signed(Duration::minutes(DEFAULT_DURATION_MINUTES))
        .filter(|end| YEAR_RANGE.contains(&end.year()))
}

/// Read a `YYYYMMDDTHHMMSS` stamp back as an instant in `zone`.
pub fn parse_ics_local(value: &str, zone: &ReferenceZone) -> TalkCalResult<DateTime<FixedOffset>> {
    let well_formed = value.len() == 15
        && value.char_indices().all(|(i, c)| {
            if i == 8 {
                c == 'T'
            } else {
                c.is_ascii_digit()
            }
        });
    if !well_formed {
        return Err(TalkCalError::invalid_time(
            value,
            "expected a timestamp like 20240301T140000",
        ));
    }

    let naive = NaiveDateTime::parse_from_str(value, ICS_LOCAL_FORMAT)
        .map_err(|e| TalkCalError::invalid_time(value, e.to_string()))?;
    zone.localize(naive)
        .ok_or_else(|| TalkCalError::invalid_time(value, "out of range"))
}

/// Format as `YYYYMMDDTHHMMSS` in the datetime's own offset.
pub fn format_ics_local(dt: &DateTime<FixedOffset>) -> String {
    dt.format(ICS_LOCAL_FORMAT).to_string()
}

/// Format as `YYYYMMDDTHHMMSSZ`.
pub fn format_ics_utc(dt: &DateTime<Utc>) -> String {
    dt.format(ICS_UTC_FORMAT).to_string()
}

/// Values to pre-fill the form with: now and now + 1 hour, local to `zone`.
pub fn form_defaults(now: DateTime<Utc>, zone: &ReferenceZone) -> TalkCalResult<(String, String)> {
    let start = now.with_timezone(&zone.offset());
    let end = default_end(start).ok_or_else(|| {
        TalkCalError::invalid_time(&format_ics_local(&start), "default end time is out of range")
    })?;
    Ok((
        start.format(FORM_FORMAT).to_string(),
        end.format(FORM_FORMAT).to_string(),
    ))
}
