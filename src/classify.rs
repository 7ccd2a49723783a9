//! Command-safety classification for `ra_svn` traffic.
//!
//! Classification is purely name-based: the first word of a top-level
//! message is looked up in a fixed safe set. Command semantics are never
//! interpreted here.

use crate::SvnItem;
use crate::error::GateError;

/// Authentication words a client may send in place of a command.
const AUTH_WORDS: &[&str] = &["EXTERNAL"];

/// Main read operations of the `ra_svn` command set.
const READ_COMMANDS: &[&str] = &[
    "reparent",
    "get-latest-rev",
    "get-dated-rev",
    "rev-proplist",
    "rev-prop",
    "get-file",
    "get-dir",
    "check-path",
    "stat",
    "update",
    "get-mergeinfo",
    "switch",
    "status",
    "diff",
    "log",
    "get-file-revs",
    "get-locations",
];

/// Report framing sent by clients while driving an update/status/diff report.
const REPORT_COMMANDS: &[&str] = &[
    "set-path",
    "delete-path",
    "link-path",
    "finish-report",
    "abort-report",
];

/// Response framing words.
const RESPONSE_WORDS: &[&str] = &["success", "failure"];

/// Returns whether a decoded top-level message is a read-only command.
///
/// `structure` must be a list whose first element is a word (every `ra_svn`
/// command and response starts that way); anything else fails with
/// [`GateError::MalformedCommand`].
///
/// The safe set is closed: any word outside it — unknown, future, or known
/// mutating commands like `commit`, `lock`, or `change-rev-prop` — classifies
/// as requiring write access. Unrecognized always means unsafe.
pub fn is_read_only(structure: &SvnItem) -> Result<bool, GateError> {
    let Some(items) = structure.as_list() else {
        return Err(GateError::MalformedCommand(format!(
            "expected a command list, got {structure}"
        )));
    };
    let Some(first) = items.first() else {
        return Err(GateError::MalformedCommand("empty command list".into()));
    };
    let Some(word) = first.as_word() else {
        return Err(GateError::MalformedCommand(format!(
            "command name is not a word: {first}"
        )));
    };
    Ok(is_safe_word(word))
}

fn is_safe_word(word: &str) -> bool {
    AUTH_WORDS.contains(&word)
        || READ_COMMANDS.contains(&word)
        || REPORT_COMMANDS.contains(&word)
        || RESPONSE_WORDS.contains(&word)
}
