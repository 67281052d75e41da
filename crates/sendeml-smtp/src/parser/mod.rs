//! SMTP response parser.
//!
//! SMTP replies can be single-line or multi-line:
//! - Single: `250 OK\r\n`
//! - Multi: `250-First line\r\n250-Second line\r\n250 Last line\r\n`
//!
//! Only the final line (code followed by a space, or the bare code) decides
//! the outcome of a command; intermediate lines are collected and ignored.

use crate::types::{Reply, ReplyCode};

/// Returns the reply code if `line` starts with three ASCII digits.
#[must_use]
pub fn reply_code(line: &str) -> Option<ReplyCode> {
    let code = line.get(..3)?;
    if !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    code.parse().ok().map(ReplyCode::new)
}

/// Checks if a line is the last line of a reply (`^\d{3} ` or a bare code).
#[must_use]
pub fn is_last_reply_line(line: &str) -> bool {
    reply_code(line).is_some() && matches!(line.as_bytes().get(3), None | Some(b' '))
}

/// Checks if a line continues a multi-line reply (`^\d{3}-`).
#[must_use]
pub fn is_intermediate_reply_line(line: &str) -> bool {
    reply_code(line).is_some() && line.as_bytes().get(3) == Some(&b'-')
}

/// Checks if a reply line is positive: its first character is `2` or `3`.
///
/// Empty or malformed lines are negative.
#[must_use]
pub fn is_positive_reply(line: &str) -> bool {
    matches!(line.as_bytes().first(), Some(b'2' | b'3'))
}

/// Builds a reply from the lines read so far.
///
/// Returns `None` unless the last line is a final reply line.
#[must_use]
pub fn parse_reply(lines: Vec<String>) -> Option<Reply> {
    let last = lines.last()?;
    if !is_last_reply_line(last) {
        return None;
    }
    let code = reply_code(last)?;
    Some(Reply::new(code, lines))
}
