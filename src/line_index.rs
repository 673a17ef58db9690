//! Line-oriented index over an original text.
//!
//! Large originals get a content→positions map so the line-based matchers
//! can jump straight to candidate lines instead of scanning; small ones
//! are cheaper to scan directly, so the applier only builds this above
//! its size threshold.

use std::collections::HashMap;

use memchr::memchr_iter;

/// Strip leading and trailing ASCII whitespace.
///
/// The comparison set is space, tab, CR, LF, VT, and FF. Spelled out
/// because `char::is_ascii_whitespace` does not include vertical tab.
pub(crate) fn trim_ascii(s: &str) -> &str {
    s.trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0B' | '\x0C'))
}

/// Split `text` into its `\n`-delimited lines plus their start offsets.
///
/// Mirrors `str::split('\n')`: a trailing newline yields a final empty
/// line. The offsets table has one extra entry equal to `text.len()`, so
/// `offsets[i + 1]` is always the exclusive end of line `i`'s span
/// (including its newline byte, when present).
pub(crate) fn split_with_offsets(text: &str) -> (Vec<&str>, Vec<usize>) {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut offsets = Vec::with_capacity(lines.len() + 1);
    offsets.push(0);
    for nl in memchr_iter(b'\n', text.as_bytes()) {
        offsets.push(nl + 1);
    }
    offsets.push(text.len());
    debug_assert_eq!(offsets.len(), lines.len() + 1);
    (lines, offsets)
}

/// Index of an original text's lines, keyed by trimmed content.
///
/// Everything borrows the original; construction is a single pass.
pub(crate) struct LineIndex<'a> {
    lines: Vec<&'a str>,
    line_offsets: Vec<usize>,
    content_to_positions: HashMap<&'a str, Vec<usize>>,
}

impl<'a> LineIndex<'a> {
    pub(crate) fn new(original: &'a str) -> Self {
        let (lines, line_offsets) = split_with_offsets(original);
        let mut content_to_positions: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, line) in lines.iter().enumerate() {
            content_to_positions
                .entry(trim_ascii(line))
                .or_default()
                .push(i);
        }
        Self {
            lines,
            line_offsets,
            content_to_positions,
        }
    }

    /// Line indices whose trimmed content equals `trimmed`, in ascending
    /// order. Empty if the content never occurs.
    pub(crate) fn positions_of(&self, trimmed: &str) -> &[usize] {
        self.content_to_positions
            .get(trimmed)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Byte offset of line `i`'s first byte; `offset_of_line(line_count())`
    /// is the total length.
    pub(crate) fn offset_of_line(&self, i: usize) -> usize {
        self.line_offsets[i]
    }

    /// Raw content of line `i`, without its newline.
    pub(crate) fn line_at(&self, i: usize) -> &'a str {
        self.lines[i]
    }

    pub(crate) fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Index of the first line whose start offset is at or past `cursor`.
    pub(crate) fn first_line_at_or_after(&self, cursor: usize) -> usize {
        self.line_offsets[..self.lines.len()].partition_point(|&off| off < cursor)
    }

    /// Candidate start lines for a search block: positions `p >= min_line`
    /// whose trimmed content equals the first search line's, additionally
    /// filtered (for multi-line blocks) to those whose `p + k - 1`-th line
    /// matches the last search line.
    pub(crate) fn find_potential_starts(
        &self,
        search_lines: &[&str],
        min_line: usize,
    ) -> Vec<usize> {
        let Some(first) = search_lines.first() else {
            return Vec::new();
        };
        let k = search_lines.len();
        let n = self.lines.len();
        let last_trimmed = trim_ascii(search_lines[k - 1]);

        self.positions_of(trim_ascii(first))
            .iter()
            .copied()
            .filter(|&p| p >= min_line)
            .filter(|&p| k < 2 || (p + k - 1 < n && trim_ascii(self.lines[p + k - 1]) == last_trimmed))
            .collect()
    }
}
