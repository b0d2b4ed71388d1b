//! Content line folding (RFC 5545 §3.1).

/// Maximum line length in octets, not counting the CRLF.
const MAX_LINE_OCTETS: usize = 75;

/// Fold a content line at 75 octets and terminate it with CRLF.
///
/// Continuation lines start with a single space, which counts towards
/// their length. UTF-8 sequences are never split.
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return format!("{line}\r\n");
    }

    let mut result = String::with_capacity(line.len() + (line.len() / MAX_LINE_OCTETS + 1) * 3);
    let mut current = 0;

    for c in line.chars() {
        let width = c.len_utf8();
        if current + width > MAX_LINE_OCTETS {
            result.push_str("\r\n ");
            current = 1;
        }
        result.push(c);
        current += width;
    }

    result.push_str("\r\n");
    result
}

/// Join folded lines back together.
pub fn unfold(content: &str) -> String {
    content.replace("\r\n ", "").replace("\r\n\t", "").replace("\n ", "")
}
