//! Raw byte scanning.
//!
//! Messages are never decoded as text: every marker the rewriter needs
//! (line ends and the header/body separator) is located by byte search.

/// Carriage return.
pub const CR: u8 = b'\r';

/// Line feed.
pub const LF: u8 = b'\n';

/// Bytes that must follow a CR for it to start a blank line (`CR LF CR LF`).
pub const BLANK_LINE_TAIL: &[u8] = b"\n\r\n";

/// Returns the index of the first `target` at or after `offset`.
#[must_use]
pub fn find_byte(buf: &[u8], target: u8, offset: usize) -> Option<usize> {
    buf.get(offset..)?
        .iter()
        .position(|&b| b == target)
        .map(|i| i + offset)
}

/// Returns the index of the first CR at or after `offset`.
#[must_use]
pub fn find_cr(buf: &[u8], offset: usize) -> Option<usize> {
    find_byte(buf, CR, offset)
}

/// Returns the index of the first LF at or after `offset`.
#[must_use]
pub fn find_lf(buf: &[u8], offset: usize) -> Option<usize> {
    find_byte(buf, LF, offset)
}

/// Returns an iterator over the index of every LF in `buf`.
#[must_use]
pub const fn find_all_lf(buf: &[u8]) -> ByteIndices<'_> {
    ByteIndices::new(buf, LF)
}

/// Checks whether the CR at `index` is followed by `pattern`.
///
/// Returns `false` when fewer than `pattern.len() + 1` bytes remain from
/// `index`, so a truncated marker at the end of the buffer never matches.
#[must_use]
pub fn has_pattern_at(buf: &[u8], index: usize, pattern: &[u8]) -> bool {
    if buf.len().saturating_sub(index) < pattern.len() + 1 {
        return false;
    }
    &buf[index + 1..=index + pattern.len()] == pattern
}

/// Checks whether a blank line (`CR LF CR LF`) starts at `index`.
#[must_use]
pub fn has_blank_line_at(buf: &[u8], index: usize) -> bool {
    has_pattern_at(buf, index, BLANK_LINE_TAIL)
}

/// Iterator over the positions of one byte value.
///
/// The iterator is `Clone`, so a scan can be restarted from any point
/// without searching the buffer again up to there.
#[derive(Debug, Clone)]
pub struct ByteIndices<'a> {
    buf: &'a [u8],
    target: u8,
    offset: usize,
}

impl<'a> ByteIndices<'a> {
    /// Creates an iterator over every `target` in `buf`.
    #[must_use]
    pub const fn new(buf: &'a [u8], target: u8) -> Self {
        Self {
            buf,
            target,
            offset: 0,
        }
    }
}

impl Iterator for ByteIndices<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let index = find_byte(self.buf, self.target, self.offset)?;
        self.offset = index + 1;
        Some(index)
    }
}

impl std::iter::FusedIterator for ByteIndices<'_> {}
