//! Physical header lines.
//!
//! A header is handled as a list of raw lines, each one a slice of the
//! original buffer ending with its LF (the last line may have none).
//! Concatenating the lines always reproduces the buffer byte for byte.
//!
//! Header fields may be folded (RFC 5322 section 2.2.3): a line whose first
//! byte is a space or a tab continues the field of the line before it.

use crate::error::{Error, Result};
use crate::scan::find_all_lf;

/// Field name prefix of the `Date` header.
pub const DATE_FIELD: &[u8] = b"Date:";

/// Field name prefix of the `Message-ID` header.
pub const MESSAGE_ID_FIELD: &[u8] = b"Message-ID:";

/// Splits `buf` into physical lines.
///
/// Every line keeps its terminating LF. The slice after the last LF is
/// always returned as the final line, even when it is empty.
#[must_use]
pub fn split_lines(buf: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for index in find_all_lf(buf) {
        lines.push(&buf[offset..=index]);
        offset = index + 1;
    }
    lines.push(&buf[offset..]);
    lines
}

/// Concatenates raw lines back into one buffer.
#[must_use]
pub fn concat_lines<L: AsRef<[u8]>>(lines: &[L]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(lines.iter().map(|l| l.as_ref().len()).sum());
    for line in lines {
        buf.extend_from_slice(line.as_ref());
    }
    buf
}

/// Checks whether `line` starts with the field name prefix `name`.
///
/// # Errors
///
/// Returns [`Error::EmptyFieldName`] if `name` is empty.
pub fn match_field(line: &[u8], name: &[u8]) -> Result<bool> {
    if name.is_empty() {
        return Err(Error::EmptyFieldName);
    }
    Ok(line.starts_with(name))
}

/// Checks whether `line` starts a `Date` field.
#[must_use]
pub fn is_date_line(line: &[u8]) -> bool {
    line.starts_with(DATE_FIELD)
}

/// Checks whether `line` starts a `Message-ID` field.
#[must_use]
pub fn is_message_id_line(line: &[u8]) -> bool {
    line.starts_with(MESSAGE_ID_FIELD)
}

/// Checks whether `b` is folding white space (space or horizontal tab).
#[must_use]
pub const fn is_wsp(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Checks whether `line` continues the previous field.
#[must_use]
pub fn is_folded_line(line: &[u8]) -> bool {
    line.first().copied().is_some_and(is_wsp)
}

/// Returns the index of the first line after `index` that is not a folding
/// continuation, or `lines.len()` when the continuation runs to the end.
#[must_use]
pub fn skip_folded<L: AsRef<[u8]>>(lines: &[L], index: usize) -> usize {
    let start = (index + 1).min(lines.len());
    lines[start..]
        .iter()
        .position(|line| !is_folded_line(line.as_ref()))
        .map_or(lines.len(), |i| start + i)
}

/// Removes the folding continuation lines that directly follow `index`.
#[must_use]
pub fn drop_folding_after<L: AsRef<[u8]> + Clone>(lines: &[L], index: usize) -> Vec<L> {
    let next = skip_folded(lines, index);
    let keep = (index + 1).min(lines.len());
    lines[..keep].iter().chain(&lines[next..]).cloned().collect()
}
