//! Streaming SEARCH/REPLACE diff application for LLM-generated edits.
//!
//! This crate reconstructs the new content of a file from fenced edit
//! blocks as a language model streams them out:
//!
//! ```text
//! <<<<<<< SEARCH
//! lines to locate in the original
//! =======
//! lines to put in their place
//! >>>>>>> REPLACE
//! ```
//!
//! Each block's SEARCH section is located in the original through a ladder
//! of three strategies (byte-exact, then line-trimmed, then block-anchor
//! for blocks of three or more lines), so minor whitespace and content
//! drift in the model output still applies. Content outside matched
//! regions is preserved byte for byte,
//! and every replacement is reported as a character-offset region of the
//! result for downstream highlighting.
//!
//! The engine works on partial input: chunks can end mid-line or even
//! mid-marker, and replacement lines appear in the output as soon as they
//! arrive, so intermediate results are valid prefixes of the final
//! content.
//!
//! # Usage
//!
//! ```rust,ignore
//! use srdiff::{StreamingApplier, apply_diff_chunk};
//!
//! // One-shot: the whole diff is already in hand.
//! let result = apply_diff_chunk(diff, original, true)?;
//! write_file(path, &result.content);
//! highlight(&result.changed_regions);
//!
//! // Streaming: feed chunks as the model produces them.
//! let mut applier = StreamingApplier::new(original);
//! while let Some(chunk) = stream.next().await {
//!     let partial = applier.process_chunk(&chunk, false)?;
//!     preview(&partial.content);
//! }
//! let final_result = applier.process_chunk("", true)?;
//! ```
//!
//! Failure to locate a SEARCH block is fatal for the call and reported
//! with the offending search content ([`Error::NoMatch`]); malformed
//! block sequences (re-opened blocks, stray markers) are dropped silently
//! and later well-formed blocks still apply.

mod applier;
mod error;
mod line_index;
mod matcher;
mod parser;

pub use applier::{
    apply_diff_chunk, ChangeRegion, FileChangeResult, StreamingApplier, LARGE_FILE_THRESHOLD,
};
pub use error::{Error, Result};
