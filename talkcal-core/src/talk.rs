//! The talk submitted through the form.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A talk as entered on the form. Lives for a single request.
///
/// Empty strings are how the form says "not given"; accessors such as
/// [`TalkEvent::remark`] turn them into `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TalkEvent {
    pub title: String,
    pub speaker: String,
    pub affiliation: String,
    pub host: String,
    pub description: String,
    pub venue: String,
    pub remark: String,

    /// Local start time, e.g. "2024-03-01T14:00"
    #[serde(rename = "starttime")]
    pub start_local: String,

    /// Local end time; blank means one hour after the start
    #[serde(rename = "endtime")]
    pub end_local: String,

    #[serde(skip)]
    pub attachment: Option<Attachment>,
}

/// A file stored elsewhere that the event links to.
///
/// Only the locator ends up in the document, never the file content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,

    /// Media type, written as FMTTYPE when known
    pub format_type: Option<String>,
}

impl Attachment {
    pub fn new(url: impl Into<String>) -> Self {
        Attachment {
            url: url.into(),
            format_type: None,
        }
    }

    pub fn with_format_type(mut self, format_type: impl Into<String>) -> Self {
        let format_type = format_type.into();
        self.format_type = if format_type.trim().is_empty() {
            None
        } else {
            Some(format_type)
        };
        self
    }
}

impl TalkEvent {
    /// Build from the raw form mapping. Missing keys read as empty.
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let get = |key: &str| fields.get(key).cloned().unwrap_or_default();

        TalkEvent {
            title: get("title"),
            speaker: get("speaker"),
            affiliation: get("affiliation"),
            host: get("host"),
            description: get("description"),
            venue: get("venue"),
            remark: get("remark"),
            start_local: get("starttime"),
            end_local: get("endtime"),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Option<Attachment>) -> Self {
        self.attachment = attachment;
        self
    }

    pub fn end_local(&self) -> Option<&str> {
        non_empty(&self.end_local)
    }

    pub fn remark(&self) -> Option<&str> {
        non_empty(&self.remark)
    }

    pub fn venue(&self) -> Option<&str> {
        non_empty(&self.venue)
    }

    /// The labelled multi-line DESCRIPTION text.
    pub fn description_text(&self) -> String {
        format!(
            "Speaker: {}\nAffiliation: {}\nHost: {}\nAbstract: {}\n",
            self.speaker, self.affiliation, self.host, self.description
        )
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}
