//! Streaming applier: drives the block parser, locates SEARCH content via
//! the matcher ladder, and builds the new file content incrementally.

use memchr::memchr_iter;
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::line_index::LineIndex;
use crate::matcher;
use crate::parser::{self, BlockParser, LineAction, ParserState, SEARCH_MARKER};

/// Originals larger than this get a line index for candidate lookup; below
/// it, direct scans beat the map-construction overhead.
pub const LARGE_FILE_THRESHOLD: usize = 1_048_576;

/// A contiguous span of the result text produced by one block's
/// replacement. Offsets and line numbers are in *result* coordinates; a
/// pure deletion yields an empty span, which is still recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangeRegion {
    /// Newlines in the result before `start_offset` (zero-based).
    pub start_line: usize,
    /// Newlines in the result before `end_offset` (zero-based).
    pub end_line: usize,
    /// Byte offset where the replacement starts.
    pub start_offset: usize,
    /// Byte offset just past the replacement end.
    pub end_offset: usize,
}

/// The reconstructed file content plus the result-side regions the applied
/// blocks touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChangeResult {
    pub content: String,
    pub changed_regions: Vec<ChangeRegion>,
}

/// Bookkeeping for the block currently between `=======` and
/// `>>>>>>> REPLACE`.
#[derive(Debug, Clone, Copy)]
struct OpenBlock {
    /// End of the matched range in the original; the cursor lands here on
    /// close.
    match_end: usize,
    /// Result offset where this block's replacement began.
    replacement_start: usize,
    /// Result length before this block appended anything; truncation point
    /// if the block turns out malformed.
    pre_block_len: usize,
}

/// Incremental SEARCH/REPLACE applicator over one original text.
///
/// Feed diff chunks as they arrive with [`process_chunk`]; pass
/// `is_final = true` on the last one so the untouched tail of the original
/// is appended. Each call returns the content built so far (a valid prefix
/// of the final content) together with every change region recorded so
/// far.
///
/// [`process_chunk`]: StreamingApplier::process_chunk
pub struct StreamingApplier<'a> {
    original: &'a str,
    /// Byte offset just past the last applied match; never moves backward.
    cursor: usize,
    result: String,
    changed_regions: Vec<ChangeRegion>,
    parser: BlockParser,
    open: Option<OpenBlock>,
    /// Unterminated final line withheld from the previous chunk, prepended
    /// to the next one.
    carry: String,
    index: Option<LineIndex<'a>>,
}

impl<'a> StreamingApplier<'a> {
    pub fn new(original: &'a str) -> Self {
        Self {
            original,
            cursor: 0,
            result: String::new(),
            changed_regions: Vec::new(),
            parser: BlockParser::new(),
            open: None,
            carry: String::new(),
            index: None,
        }
    }

    /// Process one chunk of streamed diff text.
    pub fn process_chunk(&mut self, chunk: &str, is_final: bool) -> Result<FileChangeResult> {
        let carried: String;
        let text: &str = if self.carry.is_empty() {
            chunk
        } else {
            let mut joined = std::mem::take(&mut self.carry);
            joined.push_str(chunk);
            carried = joined;
            &carried
        };

        // A final chunk with no block opener and an idle machine cannot
        // change anything: emit the untouched tail directly.
        if is_final && self.parser.state() == ParserState::Idle && !text.contains(SEARCH_MARKER) {
            self.result.push_str(&self.original[self.cursor..]);
            self.cursor = self.original.len();
            return Ok(self.snapshot());
        }

        let (complete, tail) = match text.rfind('\n') {
            Some(i) => (Some(&text[..i]), &text[i + 1..]),
            None => (None, &text[..]),
        };

        if let Some(body) = complete {
            for line in body.split('\n') {
                self.apply_line(line)?;
            }
        }

        if !tail.is_empty() {
            if parser::is_marker(tail) {
                self.apply_line(tail)?;
            } else if is_final {
                // A truncated marker at the very end of the stream is
                // dropped; any other unterminated line is real content.
                if !tail.starts_with(['<', '=', '>']) {
                    self.apply_line(tail)?;
                }
            } else {
                self.carry.push_str(tail);
            }
        }

        if is_final {
            self.result.push_str(&self.original[self.cursor..]);
            self.cursor = self.original.len();
        }
        Ok(self.snapshot())
    }

    fn apply_line(&mut self, line: &str) -> Result<()> {
        match self.parser.feed_line(line) {
            LineAction::None => {}
            LineAction::Abandon => self.abandon_open_block(),
            LineAction::SearchComplete(search) => self.begin_block(&search)?,
            LineAction::ReplaceLine(body) => {
                if self.open.is_some() {
                    self.result.push_str(body);
                    self.result.push('\n');
                }
            }
            LineAction::Close => self.close_block(),
        }
        Ok(())
    }

    /// Locate the finalized search content and emit the untouched prefix
    /// up to the match.
    fn begin_block(&mut self, search: &str) -> Result<()> {
        let (match_start, match_end) = self.locate(search)?;
        let pre_block_len = self.result.len();
        if match_start > self.cursor {
            self.result.push_str(&self.original[self.cursor..match_start]);
        }
        self.open = Some(OpenBlock {
            match_end,
            replacement_start: self.result.len(),
            pre_block_len,
        });
        debug!(match_start, match_end, "located search block");
        Ok(())
    }

    fn locate(&mut self, search: &str) -> Result<(usize, usize)> {
        if search.is_empty() {
            // Empty SEARCH: insertion into an empty file, otherwise a
            // whole-file replacement.
            return Ok(if self.original.is_empty() {
                (0, 0)
            } else {
                (0, self.original.len())
            });
        }

        if let Some(range) = matcher::match_exact(self.original, search, self.cursor) {
            return Ok(range);
        }
        self.ensure_index();
        let index = self.index.as_ref();
        if let Some(range) = matcher::match_line_trimmed(self.original, search, self.cursor, index) {
            trace!("exact match failed, line-trimmed match succeeded");
            return Ok(range);
        }
        if let Some(range) = matcher::match_block_anchor(self.original, search, self.cursor, index) {
            trace!("falling back to block-anchor match");
            return Ok(range);
        }

        let search_content = search.strip_suffix('\n').unwrap_or(search).to_string();
        debug!(%search_content, "all matching strategies failed");
        Err(Error::NoMatch { search_content })
    }

    fn close_block(&mut self) {
        let Some(block) = self.open.take() else {
            return;
        };
        let start_line = count_newlines(&self.result[..block.replacement_start]);
        let end_line = count_newlines(&self.result);
        self.changed_regions.push(ChangeRegion {
            start_line,
            end_line,
            start_offset: block.replacement_start,
            end_offset: self.result.len(),
        });
        self.cursor = block.match_end;
        debug!(
            start_offset = block.replacement_start,
            end_offset = self.result.len(),
            "applied replacement"
        );
    }

    /// Roll a malformed block back out of the result so the silently
    /// dropped block leaves no bytes behind.
    fn abandon_open_block(&mut self) {
        if let Some(block) = self.open.take() {
            self.result.truncate(block.pre_block_len);
            debug!("discarded malformed block");
        }
    }

    fn ensure_index(&mut self) {
        if self.index.is_none() && self.original.len() > LARGE_FILE_THRESHOLD {
            self.index = Some(LineIndex::new(self.original));
        }
    }

    fn snapshot(&self) -> FileChangeResult {
        FileChangeResult {
            content: self.result.clone(),
            changed_regions: self.changed_regions.clone(),
        }
    }
}

/// Apply a complete diff (or a single chunk of one) against `original` in
/// one call.
pub fn apply_diff_chunk(diff: &str, original: &str, is_final: bool) -> Result<FileChangeResult> {
    let mut applier = StreamingApplier::new(original);
    applier.process_chunk(diff, is_final)
}

fn count_newlines(s: &str) -> usize {
    memchr_iter(b'\n', s.as_bytes()).count()
}
