//! Compile-time table of diagnostic kinds and their default severities.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Severity as classified internally, before the reporter collapses it for
/// the sink (see [`crate::report`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
    Fatal,
}

/// The closed set of diagnostic kinds an object can trigger.
///
/// Ordering and membership mirror the `FOREACH_MSG_ID` table of the real
/// `fsck.c`: fatal header-framing errors first, then structural errors, then
/// style/portability warnings, then cosmetic infos.
///
/// Serializes to exactly the string [`Kind::lowercase`] returns: `serde`'s
/// `camelCase` rename of a `PascalCase` variant name drops the same
/// underscores `lowercase`'s symbolic-name transform does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum Kind {
    // fatal
    NulInHeader,
    UnterminatedHeader,
    // errors
    BadDate,
    BadDateOverflow,
    BadEmail,
    BadName,
    BadObjectSha1,
    BadParentSha1,
    BadTagObject,
    BadTimezone,
    BadTree,
    BadTreeSha1,
    BadType,
    DuplicateEntries,
    MissingAuthor,
    MissingCommitter,
    MissingEmail,
    MissingGraft,
    MissingNameBeforeEmail,
    MissingObject,
    MissingParent,
    MissingSpaceBeforeDate,
    MissingSpaceBeforeEmail,
    MissingTag,
    MissingTagEntry,
    MissingTagObject,
    MissingTree,
    MissingType,
    MissingTypeEntry,
    MultipleAuthors,
    TagObjectNotTag,
    TreeNotSorted,
    UnknownType,
    ZeroPaddedDate,
    // warnings
    BadFilemode,
    EmptyName,
    FullPathname,
    HasDot,
    HasDotdot,
    HasDotgit,
    NullSha1,
    ZeroPaddedFilemode,
    // infos
    BadTagName,
    MissingTaggerEntry,
}

/// Number of members of [`Kind`]. Kept in sync by the `catalog_is_complete`
/// test below rather than relied on blindly.
pub const KIND_COUNT: usize = 41;

impl Kind {
    /// All kinds, in declaration order. Used to materialize the effective
    /// severity table and to build the lowercase lookup index.
    pub const ALL: [Kind; KIND_COUNT] = [
        Kind::NulInHeader,
        Kind::UnterminatedHeader,
        Kind::BadDate,
        Kind::BadDateOverflow,
        Kind::BadEmail,
        Kind::BadName,
        Kind::BadObjectSha1,
        Kind::BadParentSha1,
        Kind::BadTagObject,
        Kind::BadTimezone,
        Kind::BadTree,
        Kind::BadTreeSha1,
        Kind::BadType,
        Kind::DuplicateEntries,
        Kind::MissingAuthor,
        Kind::MissingCommitter,
        Kind::MissingEmail,
        Kind::MissingGraft,
        Kind::MissingNameBeforeEmail,
        Kind::MissingObject,
        Kind::MissingParent,
        Kind::MissingSpaceBeforeDate,
        Kind::MissingSpaceBeforeEmail,
        Kind::MissingTag,
        Kind::MissingTagEntry,
        Kind::MissingTagObject,
        Kind::MissingTree,
        Kind::MissingType,
        Kind::MissingTypeEntry,
        Kind::MultipleAuthors,
        Kind::TagObjectNotTag,
        Kind::TreeNotSorted,
        Kind::UnknownType,
        Kind::ZeroPaddedDate,
        Kind::BadFilemode,
        Kind::EmptyName,
        Kind::FullPathname,
        Kind::HasDot,
        Kind::HasDotdot,
        Kind::HasDotgit,
        Kind::NullSha1,
        Kind::ZeroPaddedFilemode,
        Kind::BadTagName,
        Kind::MissingTaggerEntry,
    ];

    /// Index into the effective-severity table / lowercase index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The upper-cased, underscored symbolic name, e.g. `MISSING_EMAIL`.
    pub fn symbolic(self) -> &'static str {
        match self {
            Kind::NulInHeader => "NUL_IN_HEADER",
            Kind::UnterminatedHeader => "UNTERMINATED_HEADER",
            Kind::BadDate => "BAD_DATE",
            Kind::BadDateOverflow => "BAD_DATE_OVERFLOW",
            Kind::BadEmail => "BAD_EMAIL",
            Kind::BadName => "BAD_NAME",
            Kind::BadObjectSha1 => "BAD_OBJECT_SHA1",
            Kind::BadParentSha1 => "BAD_PARENT_SHA1",
            Kind::BadTagObject => "BAD_TAG_OBJECT",
            Kind::BadTimezone => "BAD_TIMEZONE",
            Kind::BadTree => "BAD_TREE",
            Kind::BadTreeSha1 => "BAD_TREE_SHA1",
            Kind::BadType => "BAD_TYPE",
            Kind::DuplicateEntries => "DUPLICATE_ENTRIES",
            Kind::MissingAuthor => "MISSING_AUTHOR",
            Kind::MissingCommitter => "MISSING_COMMITTER",
            Kind::MissingEmail => "MISSING_EMAIL",
            Kind::MissingGraft => "MISSING_GRAFT",
            Kind::MissingNameBeforeEmail => "MISSING_NAME_BEFORE_EMAIL",
            Kind::MissingObject => "MISSING_OBJECT",
            Kind::MissingParent => "MISSING_PARENT",
            Kind::MissingSpaceBeforeDate => "MISSING_SPACE_BEFORE_DATE",
            Kind::MissingSpaceBeforeEmail => "MISSING_SPACE_BEFORE_EMAIL",
            Kind::MissingTag => "MISSING_TAG",
            Kind::MissingTagEntry => "MISSING_TAG_ENTRY",
            Kind::MissingTagObject => "MISSING_TAG_OBJECT",
            Kind::MissingTree => "MISSING_TREE",
            Kind::MissingType => "MISSING_TYPE",
            Kind::MissingTypeEntry => "MISSING_TYPE_ENTRY",
            Kind::MultipleAuthors => "MULTIPLE_AUTHORS",
            Kind::TagObjectNotTag => "TAG_OBJECT_NOT_TAG",
            Kind::TreeNotSorted => "TREE_NOT_SORTED",
            Kind::UnknownType => "UNKNOWN_TYPE",
            Kind::ZeroPaddedDate => "ZERO_PADDED_DATE",
            Kind::BadFilemode => "BAD_FILEMODE",
            Kind::EmptyName => "EMPTY_NAME",
            Kind::FullPathname => "FULL_PATHNAME",
            Kind::HasDot => "HAS_DOT",
            Kind::HasDotdot => "HAS_DOTDOT",
            Kind::HasDotgit => "HAS_DOTGIT",
            Kind::NullSha1 => "NULL_SHA1",
            Kind::ZeroPaddedFilemode => "ZERO_PADDED_FILEMODE",
            Kind::BadTagName => "BAD_TAG_NAME",
            Kind::MissingTaggerEntry => "MISSING_TAGGER_ENTRY",
        }
    }

    /// Default severity, as classified internally (pre-collapse).
    pub fn default_severity(self) -> Severity {
        use Kind::*;
        match self {
            NulInHeader | UnterminatedHeader => Severity::Fatal,
            BadTagName | MissingTaggerEntry => Severity::Info,
            BadFilemode | EmptyName | FullPathname | HasDot | HasDotdot | HasDotgit
            | NullSha1 | ZeroPaddedFilemode => Severity::Warn,
            _ => Severity::Error,
        }
    }

    /// The externally visible, lowercase identifier used in the severity
    /// override mini-language and in report message prefixes: underscores
    /// are dropped and the character that followed one is kept verbatim, so
    /// `MISSING_EMAIL` becomes `missingEmail`.
    pub fn lowercase(self) -> &'static str {
        &lowercase_table()[self.index()]
    }

    /// Reverse lookup: accepts the lowercase form case-insensitively and
    /// with or without underscores (`missingEmail`, `missingemail`,
    /// `MISSING_EMAIL` all resolve).
    pub fn parse(text: &str) -> Option<Kind> {
        let folded = fold(text);
        Kind::ALL
            .iter()
            .find(|k| fold(k.lowercase()) == folded)
            .copied()
    }
}

/// Lowercases and strips underscores, for case/underscore-insensitive
/// matching of user-supplied kind names.
fn fold(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Builds the lowercase identifier for a symbolic name the same way the
/// original does: drop every underscore, and keep the character that
/// followed one exactly as written (so `BAD_TAG_NAME` -> `badTagName`, not
/// `badtagname`).
fn downcase_symbolic(symbolic: &str) -> String {
    let mut out = String::with_capacity(symbolic.len());
    let mut after_underscore = false;
    for c in symbolic.chars() {
        if c == '_' {
            after_underscore = true;
            continue;
        }
        if out.is_empty() || !after_underscore {
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
        after_underscore = false;
    }
    out
}

fn lowercase_table() -> &'static [String; KIND_COUNT] {
    static TABLE: OnceLock<[String; KIND_COUNT]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut out: [String; KIND_COUNT] = std::array::from_fn(|_| String::new());
        for (i, k) in Kind::ALL.iter().enumerate() {
            out[i] = downcase_symbolic(k.symbolic());
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_count_matches_all_array() {
        assert_eq!(Kind::ALL.len(), KIND_COUNT);
    }

    #[test]
    fn json_serialization_matches_lowercase_form_for_every_kind() {
        for k in Kind::ALL {
            let json = serde_json::to_string(&k).unwrap();
            assert_eq!(json, format!("\"{}\"", k.lowercase()));
        }
    }

    #[test]
    fn lowercase_form_drops_underscores_keeps_case() {
        assert_eq!(Kind::MissingEmail.lowercase(), "missingEmail");
        assert_eq!(Kind::BadTagName.lowercase(), "badTagName");
        assert_eq!(Kind::NulInHeader.lowercase(), "nulInHeader");
    }

    #[test]
    fn parse_round_trips_through_lowercase() {
        for k in Kind::ALL {
            assert_eq!(Kind::parse(k.lowercase()), Some(k));
        }
    }

    #[test]
    fn parse_is_case_and_underscore_insensitive() {
        assert_eq!(Kind::parse("MISSING_EMAIL"), Some(Kind::MissingEmail));
        assert_eq!(Kind::parse("missingemail"), Some(Kind::MissingEmail));
        assert_eq!(Kind::parse("missing_email"), Some(Kind::MissingEmail));
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        assert_eq!(Kind::parse("not_a_real_kind"), None);
    }

    #[test]
    fn default_severities_match_catalog_partition() {
        assert_eq!(Kind::NulInHeader.default_severity(), Severity::Fatal);
        assert_eq!(Kind::UnterminatedHeader.default_severity(), Severity::Fatal);
        assert_eq!(Kind::BadDate.default_severity(), Severity::Error);
        assert_eq!(Kind::TreeNotSorted.default_severity(), Severity::Error);
        assert_eq!(Kind::BadFilemode.default_severity(), Severity::Warn);
        assert_eq!(Kind::HasDotgit.default_severity(), Severity::Warn);
        assert_eq!(Kind::BadTagName.default_severity(), Severity::Info);
        assert_eq!(Kind::MissingTaggerEntry.default_severity(), Severity::Info);
    }

    #[test]
    fn fatal_kinds_cannot_be_demoted_to_less_than_error() {
        // demotion enforcement itself lives in policy.rs; here we only
        // check the invariant that classifies which kinds are subject to it.
        let fatal_kinds: Vec<Kind> = Kind::ALL
            .iter()
            .copied()
            .filter(|k| k.default_severity() == Severity::Fatal)
            .collect();
        assert_eq!(fatal_kinds, vec![Kind::NulInHeader, Kind::UnterminatedHeader]);
    }
}
