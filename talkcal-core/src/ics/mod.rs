//! ICS file generation and parsing.
//!
//! Documents are written line by line with RFC 5545 escaping and folding,
//! and read back with the icalendar crate's parser.

mod escape;
mod fold;
mod generate;
mod parse;
mod writer;

pub use escape::{escape_text, unescape_text};
pub use fold::{fold_line, unfold};
pub use generate::{EventStamps, IcsSettings, generate_ics};
pub use parse::{ParsedAttachment, ParsedTalk, Stamp, read_talk};
pub use writer::IcsWriter;
