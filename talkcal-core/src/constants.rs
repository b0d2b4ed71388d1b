//! Fixed values used across talkcal.

/// IANA id of the default reference timezone.
pub const DEFAULT_TZID: &str = "Asia/Shanghai";

/// Abbreviation written as TZNAME for the default zone.
pub const DEFAULT_TZNAME: &str = "CST";

/// UTC+08:00
pub const DEFAULT_UTC_OFFSET_SECS: i32 = 8 * 3600;

pub const TZURL_BASE: &str = "https://www.tzurl.org/zoneinfo-outlook";

pub const DEFAULT_PRODUCT_ID: &str = "-//Van Abel//talk-calendar//EN";

/// Domain suffix of generated UIDs.
pub const DEFAULT_UID_DOMAIN: &str = "talk-calendar.local";

/// Minutes before the talk starts that the reminder fires.
pub const DEFAULT_REMINDER_MINUTES: u32 = 30;

/// Duration applied when the form leaves the end time empty.
pub const DEFAULT_DURATION_MINUTES: i64 = 60;

/// File extension of generated documents.
pub const ICS_EXTENSION: &str = "ics";

pub const ICS_MIME_TYPE: &str = "text/calendar";

/// Longest filename most filesystems accept, in bytes.
pub const MAX_FILENAME_BYTES: usize = 255;
