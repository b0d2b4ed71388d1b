//! Value escaping for content lines (RFC 5545 §3.3.11, §3.2).

/// Escape a TEXT value: backslash, comma, semicolon and newlines.
///
/// CRLF and bare LF both become `\n`; a bare CR is dropped.
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            ',' => result.push_str("\\,"),
            ';' => result.push_str("\\;"),
            '\n' => result.push_str("\\n"),
            '\t' => result.push(c),
            c if c.is_control() => {}
            _ => result.push(c),
        }
    }
    result
}

/// Reverse of [`escape_text`]. Unknown escapes keep their backslash.
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some(&next @ (',' | ';' | '\\')) => {
                result.push(next);
                chars.next();
            }
            Some('n' | 'N') => {
                result.push('\n');
                chars.next();
            }
            _ => result.push(c),
        }
    }

    result
}

/// URI values are not TEXT and must not be escaped, but they still
/// cannot carry line breaks or other control characters.
pub fn clean_uri(s: &str) -> String {
    s.trim().chars().filter(|c| !c.is_control()).collect()
}

/// Quote a parameter value when it contains `:`, `;` or `,`.
///
/// DQUOTE is not allowed inside a quoted value and is dropped,
/// as are control characters.
pub fn param_value(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(|c| *c != '"' && !c.is_control())
        .collect();

    if cleaned.contains([':', ';', ',']) {
        format!("\"{cleaned}\"")
    } else {
        cleaned
    }
}
