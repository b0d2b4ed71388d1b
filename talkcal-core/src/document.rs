//! Turning a submitted talk into a finished calendar document.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::clock::{Clock, RandomUid, SystemClock, UidSource};
use crate::constants::{ICS_EXTENSION, ICS_MIME_TYPE, MAX_FILENAME_BYTES};
use crate::error::{TalkCalError, TalkCalResult};
use crate::ics::{EventStamps, IcsSettings, generate_ics};
use crate::options::CalendarOptions;
use crate::talk::TalkEvent;
use crate::time::{self, EventWindow};
use crate::timezone::ReferenceZone;

/// Characters no mainstream filesystem accepts in a filename.
const ILLEGAL_FILENAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// A generated .ics document and the name to offer it under.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDocument {
    content: String,
    filename: String,
}

impl CalendarDocument {
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> &'static str {
        ICS_MIME_TYPE
    }

    /// `(content, filename)`
    pub fn into_parts(self) -> (String, String) {
        (self.content, self.filename)
    }
}

/// Derive `<title>.ics`, rejecting titles that cannot name a file.
pub fn ics_filename(title: &str) -> TalkCalResult<String> {
    let stem = title.trim();

    if stem.is_empty() {
        return Err(TalkCalError::InvalidTitle("title must not be empty".into()));
    }
    if stem == "." || stem == ".." {
        return Err(TalkCalError::InvalidTitle(format!("'{stem}' is not a file name")));
    }
    if let Some(c) = stem
        .chars()
        .find(|c| c.is_control() || ILLEGAL_FILENAME_CHARS.contains(c))
    {
        return Err(TalkCalError::InvalidTitle(format!(
            "title must not contain {c:?}"
        )));
    }

    let filename = format!("{stem}.{ICS_EXTENSION}");
    if filename.len() > MAX_FILENAME_BYTES {
        return Err(TalkCalError::InvalidTitle(format!(
            "title is too long for a file name ({} bytes, at most {})",
            filename.len(),
            MAX_FILENAME_BYTES
        )));
    }

    Ok(filename)
}

/// Generates talk documents with a fixed set of options.
///
/// The clock and UID source are injected; the defaults are the wall clock and
/// random UIDs.
#[derive(Clone)]
pub struct TalkCalendar {
    settings: IcsSettings,
    clock: Arc<dyn Clock>,
    uids: Arc<dyn UidSource>,
}

impl std::fmt::Debug for TalkCalendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TalkCalendar")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl TalkCalendar {
    /// Resolve `options`; fails with [`TalkCalError::Config`] on a bad zone.
    pub fn new(options: &CalendarOptions) -> TalkCalResult<Self> {
        Ok(Self::with_sources(
            IcsSettings::from_options(options)?,
            Arc::new(SystemClock),
            Arc::new(RandomUid::new(options.uid_domain.clone())),
        ))
    }

    pub fn with_sources(settings: IcsSettings, clock: Arc<dyn Clock>, uids: Arc<dyn UidSource>) -> Self {
        TalkCalendar {
            settings,
            clock,
            uids,
        }
    }

    pub fn zone(&self) -> &ReferenceZone {
        &self.settings.zone
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Start and end the form should be pre-filled with.
    pub fn form_defaults(&self) -> TalkCalResult<(String, String)> {
        time::form_defaults(self.now(), self.zone())
    }

    /// Normalize the talk's times in the configured zone.
    pub fn window(&self, talk: &TalkEvent) -> TalkCalResult<EventWindow> {
        time::normalize(&talk.start_local, talk.end_local(), self.zone())
    }

    /// Validate, normalize and build the document for `talk`.
    ///
    /// Nothing is produced unless every step succeeds.
    pub fn generate(&self, talk: &TalkEvent) -> TalkCalResult<CalendarDocument> {
        let filename = ics_filename(&talk.title)?;
        let window = self.window(talk)?;

        let created = self.now();
        let stamps = EventStamps {
            start: window.start_stamp(),
            end: window.end_stamp(),
            created,
            uid: self.uids.next_uid(created),
        };

        let content = generate_ics(talk, &stamps, &self.settings)?;
        Ok(CalendarDocument { content, filename })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, FixedUid};
    use crate::ics::read_talk;
    use crate::talk::Attachment;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;

    /// Moves forward one second on every reading.
    struct SteppingClock(Mutex<DateTime<Utc>>);

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut now = self.0.lock().unwrap();
            *now += Duration::seconds(1);
            *now
        }
    }

    fn fixed_calendar() -> TalkCalendar {
        TalkCalendar::with_sources(
            IcsSettings::default(),
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 2, 20, 9, 30, 0).unwrap())),
            Arc::new(FixedUid("fixed@talk-calendar.local".into())),
        )
    }

    fn colloquium() -> TalkEvent {
        TalkEvent {
            title: "Colloquium".into(),
            start_local: "2024-03-01T14:00".into(),
            end_local: String::new(),
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_colloquium() {
        let doc = fixed_calendar().generate(&colloquium()).unwrap();

        assert_eq!(doc.filename(), "Colloquium.ics");
        assert_eq!(doc.mime_type(), "text/calendar");
        let content = doc.content();
        assert!(content.contains("DTSTART;TZID=Asia/Shanghai:20240301T140000\r\n"));
        assert!(content.contains("DTEND;TZID=Asia/Shanghai:20240301T150000\r\n"));
        assert!(content.contains("SUMMARY:Colloquium\r\n"));
        assert!(content.contains("DTSTAMP:20240220T093000Z\r\n"));
        assert!(content.contains("UID:fixed@talk-calendar.local\r\n"));
        assert!(!content.contains("ATTACH"));
    }

    #[test]
    fn test_generate_is_deterministic_with_fixed_sources() {
        let calendar = fixed_calendar();
        let first = calendar.generate(&colloquium()).unwrap();
        let second = calendar.generate(&colloquium()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_identical_inputs_get_distinct_stamp_and_uid() {
        let calendar = TalkCalendar::with_sources(
            IcsSettings::default(),
            Arc::new(SteppingClock(Mutex::new(
                Utc.with_ymd_and_hms(2024, 2, 20, 9, 30, 0).unwrap(),
            ))),
            Arc::new(RandomUid::new("talk-calendar.local")),
        );

        let first = read_talk(calendar.generate(&colloquium()).unwrap().content()).unwrap();
        let second = read_talk(calendar.generate(&colloquium()).unwrap().content()).unwrap();

        assert_ne!(first.uid, second.uid);
        assert_ne!(first.dtstamp, second.dtstamp);
        assert_eq!(first.start, second.start);
    }

    #[test]
    fn test_generate_with_attachment() {
        let url = "https://talks.example.org/uploads/1709272800000-slides.pdf";
        let talk = colloquium().with_attachment(Some(Attachment::new(url)));
        let doc = fixed_calendar().generate(&talk).unwrap();

        let parsed = read_talk(doc.content()).unwrap();
        assert_eq!(parsed.attachments.len(), 1);
        assert_eq!(parsed.attachments[0].url, url);
    }

    #[test]
    fn test_round_trip_against_declared_offset() {
        let talk = TalkEvent {
            end_local: "2024-03-01T15:45".into(),
            ..colloquium()
        };
        let calendar = fixed_calendar();
        let window = calendar.window(&talk).unwrap();
        let parsed = read_talk(calendar.generate(&talk).unwrap().content()).unwrap();

        let zone = calendar.zone();
        assert_eq!(parsed.start.tzid.as_deref(), Some(zone.tzid()));
        assert_eq!(time::parse_ics_local(&parsed.start.value, zone).unwrap(), window.start);
        assert_eq!(time::parse_ics_local(&parsed.end.value, zone).unwrap(), window.end);
    }

    #[test]
    fn test_empty_title_yields_no_document() {
        for title in ["", "   "] {
            let talk = TalkEvent {
                title: title.into(),
                ..colloquium()
            };
            let err = fixed_calendar().generate(&talk).unwrap_err();
            assert!(matches!(err, TalkCalError::InvalidTitle(_)));
            assert!(err.is_validation());
        }
    }

    #[test]
    fn test_bad_times_are_validation_errors() {
        let talk = TalkEvent {
            start_local: String::new(),
            ..colloquium()
        };
        assert!(fixed_calendar().generate(&talk).unwrap_err().is_validation());

        let talk = TalkEvent {
            end_local: "2024-03-01T13:00".into(),
            ..colloquium()
        };
        let err = fixed_calendar().generate(&talk).unwrap_err();
        assert!(matches!(err, TalkCalError::EndBeforeStart { .. }));
    }

    #[test]
    fn test_ics_filename_accepts_ordinary_titles() {
        assert_eq!(ics_filename("Colloquium").unwrap(), "Colloquium.ics");
        assert_eq!(ics_filename("  Spring Seminar 2024 ").unwrap(), "Spring Seminar 2024.ics");
        assert_eq!(ics_filename("数学讲座").unwrap(), "数学讲座.ics");
    }

    #[test]
    fn test_ics_filename_rejects_unusable_titles() {
        let too_long = "x".repeat(252);
        let bad = [
            "a/b", "a\\b", "Time: 14:00", "what?", "star*", "\"quoted\"", "<tag>", "a|b",
            "line\nbreak", "tab\there", ".", "..", too_long.as_str(),
        ];
        for title in bad {
            let err = ics_filename(title).unwrap_err();
            assert!(matches!(err, TalkCalError::InvalidTitle(_)), "accepted {title:?}");
        }

        // 251 + ".ics" is exactly the limit
        assert!(ics_filename(&"x".repeat(251)).is_ok());
    }

    #[test]
    fn test_new_rejects_bad_zone() {
        let options = CalendarOptions {
            timezone: "Not/AZone".into(),
            ..Default::default()
        };
        assert!(matches!(TalkCalendar::new(&options), Err(TalkCalError::Config(_))));
    }

    #[test]
    fn test_form_defaults_use_clock() {
        let (start, end) = fixed_calendar().form_defaults().unwrap();
        assert_eq!(start, "2024-02-20T17:30");
        assert_eq!(end, "2024-02-20T18:30");
    }
}
