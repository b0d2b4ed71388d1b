//! Core types for talkcal.
//!
//! Turns a talk submitted through a web form into a single-event iCalendar
//! document:
//! - `time` normalizes form date-times into the reference timezone
//! - `ics` writes (and reads back) the document
//! - `document` ties both together behind [`TalkCalendar`]
//!
//! Nothing in here touches the network or the disk.

pub mod clock;
pub mod constants;
pub mod document;
pub mod error;
pub mod ics;
pub mod options;
pub mod talk;
pub mod time;
pub mod timezone;

pub use clock::{Clock, FixedClock, FixedUid, RandomUid, SystemClock, UidSource};
pub use document::{CalendarDocument, TalkCalendar, ics_filename};
pub use error::{TalkCalError, TalkCalResult};
pub use options::CalendarOptions;
pub use talk::{Attachment, TalkEvent};
pub use timezone::ReferenceZone;
