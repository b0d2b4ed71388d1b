//! ICS document generation for a single talk.

use chrono::{DateTime, Duration, Utc};

use super::writer::IcsWriter;
use crate::error::{TalkCalError, TalkCalResult};
use crate::options::CalendarOptions;
use crate::talk::TalkEvent;
use crate::time::{format_ics_utc, parse_ics_local};
use crate::timezone::ReferenceZone;

/// Start of the single STANDARD observance of the reference zone.
const STANDARD_SINCE: &str = "19700101T000000";

/// Resolved settings for document generation.
#[derive(Debug, Clone, PartialEq)]
pub struct IcsSettings {
    pub zone: ReferenceZone,
    pub product_id: String,
    pub reminder: Duration,
}

impl Default for IcsSettings {
    fn default() -> Self {
        let options = CalendarOptions::default();
        IcsSettings {
            zone: ReferenceZone::default(),
            reminder: options.reminder(),
            product_id: options.product_id,
        }
    }
}

impl IcsSettings {
    pub fn from_options(options: &CalendarOptions) -> TalkCalResult<Self> {
        Ok(IcsSettings {
            zone: options.zone()?,
            product_id: options.product_id.clone(),
            reminder: options.reminder(),
        })
    }
}

/// Everything about a document that is not taken from the form.
#[derive(Debug, Clone)]
pub struct EventStamps {
    /// DTSTART as `YYYYMMDDTHHMMSS` in the reference zone
    pub start: String,
    /// DTEND as `YYYYMMDDTHHMMSS` in the reference zone
    pub end: String,
    /// Creation instant, written as DTSTAMP
    pub created: DateTime<Utc>,
    pub uid: String,
}

/// Generate the .ics content for a talk.
///
/// `stamps.start`/`stamps.end` must already be normalized; they are checked
/// but never defaulted here.
pub fn generate_ics(talk: &TalkEvent, stamps: &EventStamps, settings: &IcsSettings) -> TalkCalResult<String> {
    let title = talk.title.trim();
    if title.is_empty() {
        return Err(TalkCalError::InvalidTitle("title must not be empty".into()));
    }

    let start = parse_ics_local(&stamps.start, &settings.zone)?;
    let end = parse_ics_local(&stamps.end, &settings.zone)?;
    if end < start {
        return Err(TalkCalError::EndBeforeStart {
            start: stamps.start.clone(),
            end: stamps.end.clone(),
        });
    }

    let uid = stamps.uid.trim();
    if uid.is_empty() || uid.chars().any(char::is_control) {
        return Err(TalkCalError::IcsGenerate(format!("unusable UID {uid:?}")));
    }

    let tzid = settings.zone.tzid();
    let mut w = IcsWriter::new();

    w.begin("VCALENDAR")
        .text("PRODID", &settings.product_id)
        .raw("VERSION", "2.0")
        .raw("CALSCALE", "GREGORIAN");

    write_timezone(&mut w, &settings.zone);

    w.begin("VEVENT")
        .raw("DTSTAMP", &format_ics_utc(&stamps.created))
        .text("UID", uid)
        .param_raw("DTSTART", &[("TZID", tzid)], &stamps.start)
        .param_raw("DTEND", &[("TZID", tzid)], &stamps.end)
        .text("SUMMARY", title);

    if let Some(remark) = talk.remark() {
        w.uri("URL", remark);
    }

    w.text("DESCRIPTION", &talk.description_text());

    if let Some(venue) = talk.venue() {
        w.text("LOCATION", venue);
    }

    w.raw("STATUS", "CONFIRMED").raw("TRANSP", "TRANSPARENT");

    // Locator only, never the file bytes
    if let Some(ref attachment) = talk.attachment {
        match attachment.format_type.as_deref() {
            Some(fmttype) => w.param_uri("ATTACH", &[("FMTTYPE", fmttype)], &attachment.url),
            None => w.uri("ATTACH", &attachment.url),
        };
    }

    w.begin("VALARM")
        .raw("ACTION", "DISPLAY")
        .text("DESCRIPTION", title)
        .raw("TRIGGER", &trigger_before(settings.reminder))
        .end("VALARM");

    w.end("VEVENT").end("VCALENDAR");

    w.finish()
}

/// VTIMEZONE with one STANDARD rule and no transitions.
fn write_timezone(w: &mut IcsWriter, zone: &ReferenceZone) {
    let offset = zone.offset_ics();

    w.begin("VTIMEZONE")
        .text("TZID", zone.tzid())
        .uri("TZURL", &zone.tzurl())
        .text("X-LIC-LOCATION", zone.tzid())
        .begin("STANDARD")
        .text("TZNAME", zone.tzname())
        .raw("TZOFFSETFROM", &offset)
        .raw("TZOFFSETTO", &offset)
        .raw("DTSTART", STANDARD_SINCE)
        .end("STANDARD")
        .end("VTIMEZONE");
}

/// Negative DURATION value, e.g. `-PT30M`.
fn trigger_before(lead: Duration) -> String {
    format!("-PT{}M", lead.num_minutes().max(0))
}
