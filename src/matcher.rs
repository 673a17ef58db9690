//! Matching strategies for locating a SEARCH block in the original text.
//!
//! Three strategies, tried by the applier in a fixed order:
//!
//! 1. [`match_exact`]: byte-for-byte substring search (Boyer-Moore,
//!    bad-character rule).
//! 2. [`match_line_trimmed`]: line-by-line comparison ignoring leading
//!    and trailing whitespace on each line.
//! 3. [`match_block_anchor`]: for blocks of three or more lines, anchors
//!    on the first and last lines and ignores interior drift.
//!
//! All three take a cursor and never return a range starting below it;
//! ranges are half-open byte spans of the original.

use crate::line_index::{split_with_offsets, trim_ascii, LineIndex};

/// Blocks shorter than this never use anchor matching: with fewer than
/// three lines the anchors would be adjacent and the match meaningless.
pub(crate) const BLOCK_ANCHOR_MIN_LINES: usize = 3;

/// Byte-exact occurrence of `search` in `original` at or after `cursor`.
///
/// Boyer-Moore with only the bad-character rule; the pattern table is
/// built from every byte but the last, and unseen bytes shift by the full
/// pattern length. An empty pattern matches immediately at the cursor.
pub(crate) fn match_exact(original: &str, search: &str, cursor: usize) -> Option<(usize, usize)> {
    if search.is_empty() {
        return Some((cursor, cursor));
    }
    let text = original.as_bytes();
    let pat = search.as_bytes();
    let m = pat.len();
    if cursor + m > text.len() {
        return None;
    }

    let mut shift = [m; 256];
    for (i, &b) in pat[..m - 1].iter().enumerate() {
        shift[b as usize] = m - 1 - i;
    }

    let mut pos = cursor;
    while pos + m <= text.len() {
        if &text[pos..pos + m] == pat {
            return Some((pos, pos + m));
        }
        pos += shift[text[pos + m - 1] as usize];
    }
    None
}

/// Locate `search` by comparing trimmed lines, starting at the first line
/// whose offset is at or past `cursor`.
///
/// The trailing empty line produced by the search content's final newline
/// is dropped before comparison. Candidates are tried in ascending line
/// order; for multi-line blocks a candidate must also match on its last
/// line before the interior is verified.
pub(crate) fn match_line_trimmed(
    original: &str,
    search: &str,
    cursor: usize,
    index: Option<&LineIndex<'_>>,
) -> Option<(usize, usize)> {
    let search_lines = search_lines_of(search)?;
    let k = search_lines.len();
    let trimmed: Vec<&str> = search_lines.iter().map(|l| trim_ascii(l)).collect();

    if let Some(index) = index {
        let n = index.line_count();
        if k > n {
            return None;
        }
        let start_line = index.first_line_at_or_after(cursor);
        for p in index.find_potential_starts(&search_lines, start_line) {
            if verify_index(index, p, &trimmed) {
                return Some((index.offset_of_line(p), index.offset_of_line(p + k)));
            }
        }
        return None;
    }

    let (lines, offsets) = split_with_offsets(original);
    let n = lines.len();
    if k > n {
        return None;
    }
    let start_line = first_line_at_or_after(&offsets, n, cursor);
    for p in start_line..=(n - k) {
        if trim_ascii(lines[p]) != trimmed[0] {
            continue;
        }
        if k >= 2 && trim_ascii(lines[p + k - 1]) != trimmed[k - 1] {
            continue;
        }
        if trimmed
            .iter()
            .enumerate()
            .all(|(j, t)| trim_ascii(lines[p + j]) == *t)
        {
            return Some((offsets[p], offsets[p + k]));
        }
    }
    None
}

/// Locate a block of `k >= 3` lines by its first and last trimmed lines
/// alone. Interior content drift is deliberately ignored.
pub(crate) fn match_block_anchor(
    original: &str,
    search: &str,
    cursor: usize,
    index: Option<&LineIndex<'_>>,
) -> Option<(usize, usize)> {
    let search_lines = search_lines_of(search)?;
    let k = search_lines.len();
    if k < BLOCK_ANCHOR_MIN_LINES {
        return None;
    }
    let anchor_first = trim_ascii(search_lines[0]);
    let anchor_last = trim_ascii(search_lines[k - 1]);

    if let Some(index) = index {
        let n = index.line_count();
        if k > n {
            return None;
        }
        let start_line = index.first_line_at_or_after(cursor);
        for &p in index.positions_of(anchor_first) {
            if p < start_line || p + k > n {
                continue;
            }
            if trim_ascii(index.line_at(p + k - 1)) == anchor_last {
                return Some((index.offset_of_line(p), index.offset_of_line(p + k)));
            }
        }
        return None;
    }

    let (lines, offsets) = split_with_offsets(original);
    let n = lines.len();
    if k > n {
        return None;
    }
    let start_line = first_line_at_or_after(&offsets, n, cursor);
    for p in start_line..=(n - k) {
        if trim_ascii(lines[p]) == anchor_first && trim_ascii(lines[p + k - 1]) == anchor_last {
            return Some((offsets[p], offsets[p + k]));
        }
    }
    None
}

/// Search content split into lines, with the trailing empty line from the
/// applier-appended newline removed. `None` when nothing remains.
fn search_lines_of(search: &str) -> Option<Vec<&str>> {
    let mut lines: Vec<&str> = search.split('\n').collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines)
    }
}

fn verify_index(index: &LineIndex<'_>, p: usize, trimmed: &[&str]) -> bool {
    trimmed
        .iter()
        .enumerate()
        .all(|(j, t)| trim_ascii(index.line_at(p + j)) == *t)
}

/// Linear counterpart of `LineIndex::first_line_at_or_after` for the
/// direct-scan path.
fn first_line_at_or_after(offsets: &[usize], line_count: usize, cursor: usize) -> usize {
    offsets[..line_count]
        .iter()
        .position(|&off| off >= cursor)
        .unwrap_or(line_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Exact matching
    // ========================================================================

    #[test]
    fn test_exact_empty_pattern_matches_at_cursor() {
        assert_eq!(match_exact("abc", "", 0), Some((0, 0)));
        assert_eq!(match_exact("abc", "", 2), Some((2, 2)));
        assert_eq!(match_exact("", "", 0), Some((0, 0)));
    }

    #[test]
    fn test_exact_finds_first_occurrence() {
        let text = "one two one two\n";
        assert_eq!(match_exact(text, "one", 0), Some((0, 3)));
        assert_eq!(match_exact(text, "two", 0), Some((4, 7)));
    }

    #[test]
    fn test_exact_respects_cursor() {
        let text = "one two one two\n";
        assert_eq!(match_exact(text, "one", 1), Some((8, 11)));
        assert_eq!(match_exact(text, "one", 9), None);
    }

    #[test]
    fn test_exact_no_match() {
        assert_eq!(match_exact("hello world", "absent", 0), None);
        assert_eq!(match_exact("short", "much longer pattern", 0), None);
    }

    #[test]
    fn test_exact_match_at_end() {
        assert_eq!(match_exact("abcdef", "def", 0), Some((3, 6)));
        assert_eq!(match_exact("abcdef", "def", 3), Some((3, 6)));
        assert_eq!(match_exact("abcdef", "def", 4), None);
    }

    #[test]
    fn test_exact_multibyte() {
        let text = "let greeting = \"héllo\";\n";
        assert_eq!(match_exact(text, "héllo", 0), Some((16, 22)));
    }

    #[test]
    fn test_exact_cursor_at_end() {
        assert_eq!(match_exact("abc", "c", 3), None);
    }

    #[test]
    fn test_exact_repetitive_pattern() {
        // Shift table degenerates to 1 on runs of the same byte.
        let text = "aaaaab";
        assert_eq!(match_exact(text, "aab", 0), Some((3, 6)));
    }

    // ========================================================================
    // Line-trimmed matching
    // ========================================================================

    #[test]
    fn test_line_trimmed_indent_drift() {
        let original = "function subtract(a, b) {\n    return a - b;\n}\n";
        let search = "function subtract(a, b) {\n  return a - b;\n}\n";
        assert_eq!(
            match_line_trimmed(original, search, 0, None),
            Some((0, original.len()))
        );
    }

    #[test]
    fn test_line_trimmed_respects_cursor() {
        let original = "x\ny\nx\ny\n";
        assert_eq!(match_line_trimmed(original, "x\n", 0, None), Some((0, 2)));
        assert_eq!(match_line_trimmed(original, "x\n", 1, None), Some((4, 6)));
        assert_eq!(match_line_trimmed(original, "x\n", 5, None), None);
    }

    #[test]
    fn test_line_trimmed_interior_mismatch_fails() {
        let original = "a\nb\nc\n";
        assert_eq!(match_line_trimmed(original, "a\nX\nc\n", 0, None), None);
    }

    #[test]
    fn test_line_trimmed_last_line_pruning() {
        // First line matches twice; only the second occurrence is followed
        // by the right last line.
        let original = "start\none\nstart\ntwo\n";
        assert_eq!(
            match_line_trimmed(original, "start\ntwo\n", 0, None),
            Some((10, 20))
        );
    }

    #[test]
    fn test_line_trimmed_range_spans_trailing_newline() {
        let original = "a\nb\nc";
        assert_eq!(match_line_trimmed(original, "b\nc\n", 0, None), Some((2, 5)));
    }

    #[test]
    fn test_line_trimmed_longer_than_original() {
        assert_eq!(match_line_trimmed("a\n", "a\nb\nc\n", 0, None), None);
    }

    #[test]
    fn test_line_trimmed_index_agrees_with_direct_scan() {
        let original = "fn f() {\n\tcall();\n}\nfn g() {\n\tcall();\n}\n";
        let search = "fn g() {\n    call();\n}\n";
        let index = LineIndex::new(original);
        let direct = match_line_trimmed(original, search, 0, None);
        let indexed = match_line_trimmed(original, search, 0, Some(&index));
        assert_eq!(direct, Some((20, original.len())));
        assert_eq!(direct, indexed);
    }

    #[test]
    fn test_line_trimmed_empty_search_is_none() {
        assert_eq!(match_line_trimmed("a\n", "", 0, None), None);
        assert_eq!(match_line_trimmed("a\n", "\n", 0, None), None);
    }

    // ========================================================================
    // Block-anchor matching
    // ========================================================================

    #[test]
    fn test_block_anchor_requires_three_lines() {
        let original = "a\nb\n";
        assert_eq!(match_block_anchor(original, "a\nb\n", 0, None), None);
    }

    #[test]
    fn test_block_anchor_ignores_interior_drift() {
        let original = "function process() {\n    stepOne();\n    stepTwo();\n    stepThree();\n}\n";
        let search = "function process() {\n    differentOne();\n    differentTwo();\n    differentThree();\n}\n";
        assert_eq!(
            match_block_anchor(original, search, 0, None),
            Some((0, original.len()))
        );
    }

    #[test]
    fn test_block_anchor_respects_cursor() {
        let original = "{\nx\n}\n{\ny\n}\n";
        let search = "{\nz\n}\n";
        assert_eq!(match_block_anchor(original, search, 0, None), Some((0, 6)));
        assert_eq!(match_block_anchor(original, search, 1, None), Some((6, 12)));
    }

    #[test]
    fn test_block_anchor_last_line_must_match() {
        let original = "{\nx\nEOF\n";
        assert_eq!(match_block_anchor(original, "{\nx\n}\n", 0, None), None);
    }

    #[test]
    fn test_block_anchor_index_agrees_with_direct_scan() {
        let original = "header\nalpha\nbeta\nfooter\n";
        let search = "header\nchanged one\nchanged two\nfooter\n";
        let index = LineIndex::new(original);
        let direct = match_block_anchor(original, search, 0, None);
        assert_eq!(direct, Some((0, original.len())));
        assert_eq!(direct, match_block_anchor(original, search, 0, Some(&index)));
    }
}
