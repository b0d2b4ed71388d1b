//! Generation settings.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_PRODUCT_ID, DEFAULT_REMINDER_MINUTES, DEFAULT_TZID, DEFAULT_TZNAME,
    DEFAULT_UID_DOMAIN,
};
use crate::error::TalkCalResult;
use crate::timezone::{ReferenceZone, parse_utc_offset};

/// Settings for the `[calendar]` section of the server configuration.
///
/// Every field has a default, so an empty section yields the values the
/// talk calendar has always used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarOptions {
    /// IANA id written as TZID
    pub timezone: String,

    /// Abbreviation written as TZNAME
    pub tzname: String,

    /// Fixed offset such as "+08:00". Taken from the IANA database when unset.
    pub utc_offset: Option<String>,

    pub product_id: String,

    pub uid_domain: String,

    pub reminder_minutes: u32,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        CalendarOptions {
            timezone: DEFAULT_TZID.to_string(),
            tzname: DEFAULT_TZNAME.to_string(),
            utc_offset: None,
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            uid_domain: DEFAULT_UID_DOMAIN.to_string(),
            reminder_minutes: DEFAULT_REMINDER_MINUTES,
        }
    }
}

impl CalendarOptions {
    /// Resolve the configured zone. Fails on an unknown id or a bad offset.
    pub fn zone(&self) -> TalkCalResult<ReferenceZone> {
        match self.utc_offset.as_deref().map(str::trim) {
            Some(offset) if !offset.is_empty() => {
                ReferenceZone::new(&self.timezone, &self.tzname, parse_utc_offset(offset)?)
            }
            _ => ReferenceZone::from_iana(&self.timezone, &self.tzname, Utc::now()),
        }
    }

    pub fn reminder(&self) -> Duration {
        Duration::minutes(i64::from(self.reminder_minutes))
    }
}
