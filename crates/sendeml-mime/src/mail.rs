//! Header/body separation.

use crate::scan::{BLANK_LINE_TAIL, find_cr, has_blank_line_at};

/// The blank line separating the header from the body.
pub const BLANK_LINE: &[u8] = b"\r\n\r\n";

/// Returns the index of the CR that starts the first blank line.
///
/// `None` means the buffer has no header/body boundary at all.
#[must_use]
pub fn find_blank_line(buf: &[u8]) -> Option<usize> {
    let mut offset = 0;
    while let Some(index) = find_cr(buf, offset) {
        if has_blank_line_at(buf, index) {
            return Some(index);
        }
        offset = index + 1;
    }
    None
}

/// Splits a message into its header and body.
///
/// Neither part contains the blank line itself. Returns `None` if the
/// message has no blank line.
#[must_use]
pub fn split_mail(buf: &[u8]) -> Option<(&[u8], &[u8])> {
    let index = find_blank_line(buf)?;
    let body_start = index + BLANK_LINE_TAIL.len() + 1;
    Some((&buf[..index], &buf[body_start..]))
}

/// Joins a header and a body with a blank line.
#[must_use]
pub fn combine_mail(header: &[u8], body: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(header.len() + BLANK_LINE.len() + body.len());
    buf.extend_from_slice(header);
    buf.extend_from_slice(BLANK_LINE);
    buf.extend_from_slice(body);
    buf
}
