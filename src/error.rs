//! Error types for SEARCH/REPLACE diff application.

use thiserror::Error;

/// Errors that can occur while applying a streamed diff.
///
/// Malformed block sequences are not errors: the parser recovers from them
/// silently and later well-formed blocks still apply.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// None of the matching strategies located the SEARCH block in the
    /// original content. Fatal for the call.
    #[error("no match found for search content:\n{search_content}")]
    NoMatch {
        /// The search body that failed to match, with its trailing newline
        /// trimmed, so a caller can show it verbatim.
        search_content: String,
    },
}

/// Result type for diff application.
pub type Result<T> = std::result::Result<T, Error>;
