//! The fixed reference timezone all local times are serialized in.
//!
//! Only a constant offset is modeled: the VTIMEZONE block carries a single
//! STANDARD rule and no daylight-saving transitions.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::constants::{DEFAULT_TZID, DEFAULT_TZNAME, DEFAULT_UTC_OFFSET_SECS, TZURL_BASE};
use crate::error::{TalkCalError, TalkCalResult};

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceZone {
    tzid: String,
    tzname: String,
    offset: FixedOffset,
}

impl Default for ReferenceZone {
    /// Asia/Shanghai, UTC+08:00, no DST
    fn default() -> Self {
        ReferenceZone {
            tzid: DEFAULT_TZID.to_string(),
            tzname: DEFAULT_TZNAME.to_string(),
            offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_SECS)
                .unwrap_or_else(|| Utc.fix()),
        }
    }
}

impl ReferenceZone {
    /// Build a zone from an IANA id, an abbreviation and an explicit offset.
    ///
    /// The id must be known to the IANA database since calendar clients
    /// match `TZID` against it.
    pub fn new(tzid: &str, tzname: &str, offset: FixedOffset) -> TalkCalResult<Self> {
        let tz = parse_tzid(tzid)?;
        let tzname = tzname.trim();
        if tzname.is_empty() {
            return Err(TalkCalError::Config(format!(
                "Timezone abbreviation for {tz} must not be empty"
            )));
        }

        Ok(ReferenceZone {
            tzid: tz.name().to_string(),
            tzname: tzname.to_string(),
            offset,
        })
    }

    /// Build a zone whose offset is the one the IANA database gives for `at`.
    pub fn from_iana(tzid: &str, tzname: &str, at: DateTime<Utc>) -> TalkCalResult<Self> {
        let tz = parse_tzid(tzid)?;
        let offset = tz.offset_from_utc_datetime(&at.naive_utc()).fix();
        Self::new(tz.name(), tzname, offset)
    }

    pub fn tzid(&self) -> &str {
        &self.tzid
    }

    pub fn tzname(&self) -> &str {
        &self.tzname
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Interpret a wall-clock time as local to this zone.
    ///
    /// `None` when the instant falls outside the range chrono can represent.
    pub fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        naive.and_local_timezone(self.offset).single()
    }

    /// Offset in the `+HHMM` form used by TZOFFSETFROM/TZOFFSETTO.
    pub fn offset_ics(&self) -> String {
        format_offset(self.offset, false)
    }

    /// Location of the zone definition published by tzurl.org.
    pub fn tzurl(&self) -> String {
        format!("{TZURL_BASE}/{}", self.tzid)
    }
}

fn parse_tzid(tzid: &str) -> TalkCalResult<Tz> {
    tzid.trim()
        .parse::<Tz>()
        .map_err(|_| TalkCalError::Config(format!("Unknown timezone '{tzid}'")))
}

/// Parse a UTC offset like `+08:00`, `+0800`, `-05:30` or `Z`.
pub fn parse_utc_offset(s: &str) -> TalkCalResult<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") {
        return Ok(Utc.fix());
    }

    let invalid = || TalkCalError::Config(format!("Invalid UTC offset '{s}'. Expected +HH:MM"));

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(invalid()),
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: i32 = digits[0..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..4].parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Render an offset as `+HHMM`, or `+HH:MM` when `colon` is set.
pub fn format_offset(offset: FixedOffset, colon: bool) -> String {
    let secs = offset.local_minus_utc();
    let sign = if secs < 0 { '-' } else { '+' };
    let secs = secs.abs();
    let (hours, minutes) = (secs / 3600, (secs % 3600) / 60);

    if colon {
        format!("{sign}{hours:02}:{minutes:02}")
    } else {
        format!("{sign}{hours:02}{minutes:02}")
    }
}
