use alloc::string::String;

use bstr::ByteSlice;
use thiserror::Error;

/// Failure of a JSON parse.
///
/// Renders as `"<reason> at character <offset>, found: <next 10 bytes>..."`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason} at character {offset}, found: {found}...")]
pub struct JsonError {
    /// What went wrong.
    pub reason: JsonErrorReason,
    /// Byte offset into the input where it went wrong.
    pub offset: usize,
    /// Up to ten bytes of input from `offset`, lossily decoded.
    pub found: String,
}

impl JsonError {
    pub(crate) fn at(reason: JsonErrorReason, input: &[u8], offset: usize) -> Self {
        let start = offset.min(input.len());
        let end = start.saturating_add(10).min(input.len());
        Self {
            reason,
            offset,
            found: input[start..end].to_str_lossy().into_owned(),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonErrorReason {
    #[error("Missing Label")]
    MissingLabel,
    #[error("Unexpected Character")]
    UnexpectedCharacter,
    #[error("Expected ]")]
    ExpectedArrayEnd,
    #[error("Expected }}")]
    ExpectedObjectEnd,
    #[error("Unterminated String")]
    UnterminatedString,
    #[error("Nesting Too Deep")]
    TooDeep,
}
