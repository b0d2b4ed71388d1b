//! Reading a talk document back, using the icalendar crate's parser.
//!
//! Used to check generated output and by the tests; only the properties
//! talkcal writes are extracted.

use icalendar::parser::{Component, Property, read_calendar, unfold};

use super::escape::unescape_text;
use crate::error::{TalkCalError, TalkCalResult};

/// A date-time property as written, e.g. `DTSTART;TZID=Asia/Shanghai:20240301T140000`.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamp {
    pub tzid: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAttachment {
    pub url: String,
    pub format_type: Option<String>,
}

/// The single VEVENT of a talk document plus its surroundings.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTalk {
    pub product_id: Option<String>,
    pub timezones: Vec<String>,
    pub uid: String,
    pub dtstamp: Option<String>,
    pub summary: String,
    pub start: Stamp,
    pub end: Stamp,
    pub url: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub attachments: Vec<ParsedAttachment>,
    /// Minutes before the start, one entry per VALARM
    pub reminders: Vec<i64>,
}

/// Parse a document produced by [`generate_ics`](super::generate_ics).
///
/// Fails unless there is exactly one VEVENT with a UID, DTSTART and DTEND.
pub fn read_talk(content: &str) -> TalkCalResult<ParsedTalk> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| TalkCalError::IcsParse(e.to_string()))?;

    let events: Vec<&Component> = calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .collect();
    let vevent = match events.as_slice() {
        [vevent] => *vevent,
        other => {
            return Err(TalkCalError::IcsParse(format!(
                "expected one VEVENT, found {}",
                other.len()
            )));
        }
    };

    let product_id = calendar
        .properties
        .iter()
        .find(|p| p.name == "PRODID")
        .map(|p| p.val.to_string());

    let timezones = calendar
        .components
        .iter()
        .filter(|c| c.name == "VTIMEZONE")
        .filter_map(|c| c.find_prop("TZID"))
        .map(|p| p.val.to_string())
        .collect();

    let required = |name: &str| {
        vevent
            .find_prop(name)
            .ok_or_else(|| TalkCalError::IcsParse(format!("VEVENT has no {name}")))
    };

    let uid = required("UID")?.val.to_string();
    let start = to_stamp(required("DTSTART")?);
    let end = to_stamp(required("DTEND")?);

    let text = |name: &str| vevent.find_prop(name).map(|p| unescape_text(p.val.as_ref()));

    let attachments = vevent
        .properties
        .iter()
        .filter(|p| p.name == "ATTACH")
        .map(|p| ParsedAttachment {
            url: p.val.to_string(),
            format_type: param(p, "FMTTYPE"),
        })
        .collect();

    let reminders = vevent
        .components
        .iter()
        .filter(|c| c.name == "VALARM")
        .filter_map(|alarm| parse_trigger_minutes(alarm.find_prop("TRIGGER")?.val.as_ref()))
        .collect();

    Ok(ParsedTalk {
        product_id,
        timezones,
        uid,
        dtstamp: vevent.find_prop("DTSTAMP").map(|p| p.val.to_string()),
        summary: text("SUMMARY").unwrap_or_default(),
        start,
        end,
        url: vevent.find_prop("URL").map(|p| p.val.to_string()),
        description: text("DESCRIPTION"),
        location: text("LOCATION"),
        status: vevent.find_prop("STATUS").map(|p| p.val.to_string()),
        attachments,
        reminders,
    })
}

fn to_stamp(prop: &Property) -> Stamp {
    Stamp {
        tzid: param(prop, "TZID"),
        value: prop.val.to_string(),
    }
}

fn param(prop: &Property, key: &str) -> Option<String> {
    prop.params
        .iter()
        .find(|p| p.key == key)
        .and_then(|p| p.val.as_ref().map(|v| v.to_string()))
}

/// Duration designators and their length in minutes.
const DATE_UNITS: &[(char, i64)] = &[('W', 7 * 24 * 60), ('D', 24 * 60)];
const TIME_UNITS: &[(char, i64)] = &[('H', 60), ('M', 1), ('S', 0)];

/// Parse a TRIGGER duration into minutes before the event.
///
/// Handles the day/hour/minute forms (`-PT30M`, `-PT1H30M`, `-P1D`, `-P1DT2H`).
/// Triggers after the start come out negative.
fn parse_trigger_minutes(value: &str) -> Option<i64> {
    let value = value.trim();
    let (is_before, rest) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    let rest = rest.strip_prefix('P')?;

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, time),
        None => (rest, ""),
    };

    let mut minutes = 0i64;
    let mut number = String::new();
    for (part, units) in [(date_part, DATE_UNITS), (time_part, TIME_UNITS)] {
        for c in part.chars() {
            if c.is_ascii_digit() {
                number.push(c);
                continue;
            }
            let (_, factor) = units.iter().find(|(unit, _)| *unit == c)?;
            minutes += number.parse::<i64>().ok()? * factor;
            number.clear();
        }
        if !number.is_empty() {
            return None;
        }
    }

    Some(if is_before { minutes } else { -minutes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ics::{EventStamps, IcsSettings, generate_ics};
    use crate::talk::{Attachment, TalkEvent};
    use chrono::{TimeZone, Utc};

    fn generated(talk: &TalkEvent) -> String {
        let stamps = EventStamps {
            start: "20240301T140000".into(),
            end: "20240301T150000".into(),
            created: Utc.with_ymd_and_hms(2024, 2, 20, 9, 30, 0).unwrap(),
            uid: "1708421400000-abc@talk-calendar.local".into(),
        };
        generate_ics(talk, &stamps, &IcsSettings::default()).unwrap()
    }

    #[test]
    fn test_read_back_generated_document() {
        let talk = TalkEvent {
            title: "Colloquium".into(),
            speaker: "Ada Lovelace".into(),
            venue: "Room 101, Main Building".into(),
            remark: "https://example.com/talk".into(),
            ..Default::default()
        };
        let parsed = read_talk(&generated(&talk)).expect("Should parse generated ICS");

        assert_eq!(parsed.uid, "1708421400000-abc@talk-calendar.local");
        assert_eq!(parsed.summary, "Colloquium");
        assert_eq!(parsed.product_id.as_deref(), Some("-//Van Abel//talk-calendar//EN"));
        assert_eq!(parsed.timezones, vec!["Asia/Shanghai".to_string()]);
        assert_eq!(parsed.dtstamp.as_deref(), Some("20240220T093000Z"));
        assert_eq!(
            parsed.start,
            Stamp {
                tzid: Some("Asia/Shanghai".into()),
                value: "20240301T140000".into()
            }
        );
        assert_eq!(parsed.end.value, "20240301T150000");
        assert_eq!(parsed.url.as_deref(), Some("https://example.com/talk"));
        assert_eq!(parsed.location.as_deref(), Some("Room 101, Main Building"));
        assert_eq!(parsed.status.as_deref(), Some("CONFIRMED"));
        assert_eq!(parsed.reminders, vec![30]);
        assert!(parsed.attachments.is_empty());
    }

    #[test]
    fn test_read_back_description_lines() {
        let talk = TalkEvent {
            title: "T".into(),
            speaker: "Ada".into(),
            affiliation: "AE Ltd".into(),
            host: "Charles".into(),
            description: "Engines; looms".into(),
            ..Default::default()
        };
        let parsed = read_talk(&generated(&talk)).unwrap();
        assert_eq!(
            parsed.description.as_deref(),
            Some("Speaker: Ada\nAffiliation: AE Ltd\nHost: Charles\nAbstract: Engines; looms\n")
        );
    }

    #[test]
    fn test_read_back_long_folded_summary() {
        let title = "Formal methods for distributed storage engines and the people who build them".repeat(2);
        let talk = TalkEvent {
            title: title.clone(),
            ..Default::default()
        };
        let parsed = read_talk(&generated(&talk)).unwrap();
        assert_eq!(parsed.summary, title);
    }

    #[test]
    fn test_read_back_attachment() {
        let talk = TalkEvent {
            title: "T".into(),
            ..Default::default()
        }
        .with_attachment(Some(
            Attachment::new("https://talks.example.org/uploads/1-slides.pdf")
                .with_format_type("application/pdf"),
        ));
        let parsed = read_talk(&generated(&talk)).unwrap();

        assert_eq!(
            parsed.attachments,
            vec![ParsedAttachment {
                url: "https://talks.example.org/uploads/1-slides.pdf".into(),
                format_type: Some("application/pdf".into()),
            }]
        );
    }

    #[test]
    fn test_read_talk_requires_single_event() {
        let ics = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:TEST\r\nEND:VCALENDAR\r\n";
        assert!(matches!(read_talk(ics), Err(TalkCalError::IcsParse(_))));
    }

    #[test]
    fn test_read_talk_requires_start() {
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VEVENT\r\n\
UID:test-123\r\n\
SUMMARY:Test\r\n\
DTEND:20240101T110000Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";
        let err = read_talk(ics).unwrap_err();
        assert!(err.to_string().contains("DTSTART"));
    }

    #[test]
    fn test_parse_trigger_minutes() {
        assert_eq!(parse_trigger_minutes("-PT30M"), Some(30));
        assert_eq!(parse_trigger_minutes("-PT1H30M"), Some(90));
        assert_eq!(parse_trigger_minutes("-P1D"), Some(1440));
        assert_eq!(parse_trigger_minutes("-P1DT2H"), Some(1560));
        assert_eq!(parse_trigger_minutes("PT15M"), Some(-15));
        assert_eq!(parse_trigger_minutes("-PT30"), None);
        assert_eq!(parse_trigger_minutes("30M"), None);
    }
}
