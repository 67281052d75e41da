//! `Date` and `Message-ID` replacement.
//!
//! Only the header is touched. The first matching field is replaced by a
//! freshly generated single line, and any continuation lines that folded
//! the old value are dropped. Every other byte of the message is kept.

use std::borrow::Cow;
use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};
use rand::distr::{Alphanumeric, SampleString};

use crate::error::{Error, Result};
use crate::line::{concat_lines, is_date_line, is_message_id_line, skip_folded, split_lines};
use crate::mail::{combine_mail, split_mail};

/// Line terminator of generated fields.
pub const CRLF: &str = "\r\n";

/// RFC 5322 date-time format. chrono always renders English names here.
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Number of random characters inside the generated `Message-ID`.
const MESSAGE_ID_LENGTH: usize = 62;

/// A header line that is either borrowed from the original buffer or generated.
pub type RawLine<'a> = Cow<'a, [u8]>;

/// Returns `true` when neither field is to be updated.
#[must_use]
pub const fn is_not_update(update_date: bool, update_message_id: bool) -> bool {
    !update_date && !update_message_id
}

/// Formats a `Date` field line for `time`.
#[must_use]
pub fn make_date_line_at<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("Date: {}{CRLF}", time.format(DATE_FORMAT))
}

/// Formats a `Date` field line for the current local time.
#[must_use]
pub fn make_now_date_line() -> String {
    make_date_line_at(&Local::now())
}

/// Formats a `Message-ID` field line with a random identifier.
#[must_use]
pub fn make_random_message_id_line() -> String {
    let id = Alphanumeric.sample_string(&mut rand::rng(), MESSAGE_ID_LENGTH);
    format!("Message-ID: <{id}>{CRLF}")
}

/// Replaces the first line matching `matches` with the output of `make_line`.
///
/// Continuation lines of the replaced field are removed. If the field was
/// the unterminated last line, the new line loses its CRLF as well so the
/// header keeps its shape. Lines are returned unchanged when nothing matches.
pub fn replace_line<'a, P, M>(
    lines: &[RawLine<'a>],
    matches: P,
    make_line: M,
) -> Vec<RawLine<'a>>
where
    P: Fn(&[u8]) -> bool,
    M: FnOnce() -> String,
{
    let Some(index) = lines.iter().position(|line| matches(line.as_ref())) else {
        return lines.to_vec();
    };
    let next = skip_folded(lines, index);

    let mut line = make_line().into_bytes();
    if !lines[next - 1].ends_with(b"\n") && line.ends_with(CRLF.as_bytes()) {
        line.truncate(line.len() - CRLF.len());
    }

    let mut replaced = Vec::with_capacity(lines.len() - (next - index) + 1);
    replaced.extend_from_slice(&lines[..index]);
    replaced.push(Cow::Owned(line));
    replaced.extend_from_slice(&lines[next..]);
    replaced
}

/// Replaces the `Date` field with the current time.
#[must_use]
pub fn replace_date_line<'a>(lines: &[RawLine<'a>]) -> Vec<RawLine<'a>> {
    replace_line(lines, is_date_line, make_now_date_line)
}

/// Replaces the `Message-ID` field with a random one.
#[must_use]
pub fn replace_message_id_line<'a>(lines: &[RawLine<'a>]) -> Vec<RawLine<'a>> {
    replace_line(lines, is_message_id_line, make_random_message_id_line)
}

/// Splits `buf` into borrowed raw lines.
#[must_use]
pub fn raw_lines(buf: &[u8]) -> Vec<RawLine<'_>> {
    split_lines(buf).into_iter().map(Cow::Borrowed).collect()
}

/// Rewrites the requested fields of a header block.
///
/// A field missing from the header is left alone. With both flags off the
/// header is returned as is.
#[must_use]
pub fn replace_header(
    header: &[u8],
    update_date: bool,
    update_message_id: bool,
) -> Cow<'_, [u8]> {
    if is_not_update(update_date, update_message_id) {
        return Cow::Borrowed(header);
    }

    let mut lines = raw_lines(header);
    if update_date {
        lines = replace_date_line(&lines);
    }
    if update_message_id {
        lines = replace_message_id_line(&lines);
    }
    Cow::Owned(concat_lines(&lines))
}

/// Rewrites the requested header fields of a whole message.
///
/// # Errors
///
/// Returns [`Error::InvalidMessage`] if an update is requested and the
/// message has no blank line separating header and body.
pub fn replace_mail(
    buf: &[u8],
    update_date: bool,
    update_message_id: bool,
) -> Result<Cow<'_, [u8]>> {
    if is_not_update(update_date, update_message_id) {
        return Ok(Cow::Borrowed(buf));
    }

    let (header, body) = split_mail(buf).ok_or(Error::InvalidMessage)?;
    let header = replace_header(header, update_date, update_message_id);
    Ok(Cow::Owned(combine_mail(&header, body)))
}
