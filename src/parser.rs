//! Incremental line parser for SEARCH/REPLACE blocks.
//!
//! The parser consumes one diff line at a time and tells the applier what
//! to do with it. It owns the accumulating search buffer; replace-body
//! lines are handed back immediately so the applier can emit them as they
//! arrive.

/// Opens a block's search section.
pub(crate) const SEARCH_MARKER: &str = "<<<<<<< SEARCH";
/// Separates the search section from the replace section.
pub(crate) const SEPARATOR_MARKER: &str = "=======";
/// Closes a block.
pub(crate) const REPLACE_MARKER: &str = ">>>>>>> REPLACE";

/// True if `line` is exactly one of the three marker lines.
pub(crate) fn is_marker(line: &str) -> bool {
    matches!(line, SEARCH_MARKER | SEPARATOR_MARKER | REPLACE_MARKER)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ParserState {
    /// Between blocks; non-marker lines are discarded.
    #[default]
    Idle,
    /// Accumulating search lines.
    InSearch,
    /// Forwarding replace lines.
    InReplace,
}

/// What the applier must do in response to one parsed line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LineAction<'l> {
    /// Nothing externally visible.
    None,
    /// `=======` reached: the finalized search content is ready to match.
    /// Non-empty content carries a trailing newline.
    SearchComplete(String),
    /// A replace-body line to emit verbatim (the applier appends the
    /// newline).
    ReplaceLine(&'l str),
    /// `>>>>>>> REPLACE` reached: commit the block.
    Close,
    /// The in-flight block (if any) was discarded: a block was re-opened
    /// or a marker arrived out of sequence.
    Abandon,
}

#[derive(Debug, Default)]
pub(crate) struct BlockParser {
    state: ParserState,
    search_lines: Vec<String>,
}

impl BlockParser {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn state(&self) -> ParserState {
        self.state
    }

    pub(crate) fn feed_line<'l>(&mut self, line: &'l str) -> LineAction<'l> {
        match (self.state, line) {
            (state, SEARCH_MARKER) => {
                self.state = ParserState::InSearch;
                self.search_lines.clear();
                if state == ParserState::Idle {
                    LineAction::None
                } else {
                    LineAction::Abandon
                }
            }
            (ParserState::Idle, _) => LineAction::None,
            (ParserState::InSearch, SEPARATOR_MARKER) => {
                self.state = ParserState::InReplace;
                let search = if self.search_lines.is_empty() {
                    String::new()
                } else {
                    let mut joined = self.search_lines.join("\n");
                    joined.push('\n');
                    joined
                };
                self.search_lines.clear();
                LineAction::SearchComplete(search)
            }
            (ParserState::InSearch, REPLACE_MARKER) => {
                // Close without a separator: malformed, drop the block.
                self.state = ParserState::Idle;
                self.search_lines.clear();
                LineAction::Abandon
            }
            (ParserState::InSearch, _) => {
                self.search_lines.push(line.to_string());
                LineAction::None
            }
            (ParserState::InReplace, REPLACE_MARKER) => {
                self.state = ParserState::Idle;
                LineAction::Close
            }
            (ParserState::InReplace, SEPARATOR_MARKER) => {
                // A second separator cannot re-open a block; the current
                // one is discarded and trailing lines are swallowed until
                // the machine resets.
                LineAction::Abandon
            }
            (ParserState::InReplace, _) => LineAction::ReplaceLine(line),
        }
    }
}
