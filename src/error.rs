use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
/// Errors returned by this crate.
///
/// Every variant is unrecoverable for the current connection: once the byte
/// stream may be corrupted there is no meaningful partial-message retry. The
/// session layer is expected to close the socket and drop the decoder.
///
/// Running out of bytes mid-token is *not* an error; [`crate::Decoder::feed`]
/// simply keeps the partial token buffered and returns the messages completed
/// so far.
pub enum GateError {
    /// The input can never become a valid wire token, no matter what bytes
    /// follow (stray leading byte, missing separator, unbalanced `)`,
    /// number out of range).
    #[error("syntax error: {0}")]
    Syntax(String),
    /// The decoder reached an internal state not covered by its state
    /// machine. This indicates a defect in the decoder itself, not bad input.
    #[error("internal decoder error: {0}")]
    InternalDecoder(String),
    /// The classifier was given a structure that is not a command: either not
    /// a list, or a list whose first element is not a word.
    #[error("malformed command: {0}")]
    MalformedCommand(String),
    /// A per-connection memory or nesting budget was exhausted.
    #[error("{resource} limit exceeded ({limit})")]
    ResourceExceeded {
        /// What ran out: `"message size"` or `"list nesting"`.
        resource: &'static str,
        /// The configured limit that was hit.
        limit: usize,
    },
}
