//! Fatal configuration errors: the one failure surface that is never routed
//! through the reporter (see §7 of the design notes — this is the direct
//! analog of the teacher's `ConfigError`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("unrecognized token in severity overrides: '{0}'")]
    UnknownToken(String),

    #[error("unknown message kind: '{0}'")]
    UnknownKind(String),

    #[error("unknown severity: '{0}' (expected error, warn, or ignore)")]
    InvalidSeverity(String),

    #[error("cannot demote {kind} to a severity below error")]
    IllegalDemotion { kind: &'static str },

    #[error("could not read skip list '{path}': {source}")]
    SkipListIo { path: String, source: std::io::Error },

    #[error("invalid object id on line {line} of skip list")]
    SkipListMalformed { line: usize },

    #[error("skiplist= requires a path")]
    SkipListMissingPath,
}
