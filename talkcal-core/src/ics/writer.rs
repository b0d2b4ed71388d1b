//! Line-by-line construction of an iCalendar document.

use super::escape::{clean_uri, escape_text, param_value};
use super::fold::fold_line;
use crate::error::{TalkCalError, TalkCalResult};

/// Accumulates folded, CRLF-terminated content lines.
///
/// Values go through the escaping that matches their type: [`text`](Self::text)
/// for TEXT, [`uri`](Self::uri) for URIs, [`raw`](Self::raw) for values that
/// are already in wire form (timestamps, offsets, fixed keywords).
/// `BEGIN`/`END` pairs are checked when the document is finished.
#[derive(Debug, Default)]
pub struct IcsWriter {
    out: String,
    open: Vec<String>,
    error: Option<String>,
}

impl IcsWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, component: &str) -> &mut Self {
        self.line(&format!("BEGIN:{component}"));
        self.open.push(component.to_string());
        self
    }

    pub fn end(&mut self, component: &str) -> &mut Self {
        match self.open.pop() {
            Some(open) if open == component => {}
            Some(open) => self.fail(format!("END:{component} while {open} is open")),
            None => self.fail(format!("END:{component} without BEGIN")),
        }
        self.line(&format!("END:{component}"));
        self
    }

    pub fn raw(&mut self, name: &str, value: &str) -> &mut Self {
        self.param_raw(name, &[], value)
    }

    pub fn text(&mut self, name: &str, value: &str) -> &mut Self {
        self.param_raw(name, &[], &escape_text(value))
    }

    pub fn uri(&mut self, name: &str, value: &str) -> &mut Self {
        self.param_uri(name, &[], value)
    }

    pub fn param_uri(&mut self, name: &str, params: &[(&str, &str)], value: &str) -> &mut Self {
        self.param_raw(name, params, &clean_uri(value))
    }

    /// A property with parameters and a value written as given.
    pub fn param_raw(&mut self, name: &str, params: &[(&str, &str)], value: &str) -> &mut Self {
        let mut line = String::with_capacity(name.len() + value.len() + 16);
        line.push_str(name);
        for (key, val) in params {
            line.push(';');
            line.push_str(key);
            line.push('=');
            line.push_str(&param_value(val));
        }
        line.push(':');
        line.push_str(value);
        self.line(&line);
        self
    }

    /// The finished document. Fails if components were left open or mismatched.
    pub fn finish(self) -> TalkCalResult<String> {
        if let Some(error) = self.error {
            return Err(TalkCalError::IcsGenerate(error));
        }
        if let Some(open) = self.open.last() {
            return Err(TalkCalError::IcsGenerate(format!("{open} was never closed")));
        }
        Ok(self.out)
    }

    fn line(&mut self, line: &str) {
        self.out.push_str(&fold_line(line));
    }

    fn fail(&mut self, message: String) {
        self.error.get_or_insert(message);
    }
}
