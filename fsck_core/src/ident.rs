//! Header well-formedness (§4.D.1) and the author/committer identity-line
//! state machine (§4.D.2). Grounded in `fsck.c`'s `verify_headers` and
//! `fsck_ident`; styled after the teacher's `checkers/sql_header.rs`
//! hand-rolled scanner (byte cursor, no regex).

use crate::catalog::Kind;
use crate::object::ObjectId;
use crate::policy::Options;
use crate::report::{report, Sink};

/// Scans a commit or tag header for a `NUL` byte or a missing blank-line
/// terminator. Returns the sink's result for the first failing check, or 0
/// if the header is well-formed.
///
/// Preserves the original's trailing-newline leniency (SPEC_FULL.md §4.D.1,
/// open question): a header lacking the `LF LF` separator is still accepted
/// if the buffer's last byte is a bare `LF` and there is no body.
pub fn verify_headers(
    buffer: &[u8],
    object: &ObjectId,
    options: &Options,
    sink: &mut dyn Sink,
) -> i32 {
    for (i, &byte) in buffer.iter().enumerate() {
        match byte {
            0 => {
                return report(
                    options,
                    Some(object),
                    Kind::NulInHeader,
                    &format!("unterminated header: NUL at offset {i}"),
                    sink,
                );
            }
            b'\n' => {
                if buffer.get(i + 1) == Some(&b'\n') {
                    return 0;
                }
            }
            _ => {}
        }
    }

    if buffer.last() == Some(&b'\n') {
        return 0;
    }

    report(options, Some(object), Kind::UnterminatedHeader, "unterminated header", sink)
}

/// Validates one `<name> SP <LT>email<GT> SP <unixtime> SP <tz>` line at the
/// front of `input`.
///
/// Returns `(sink_result, remainder)`. The remainder always starts just past
/// this line's terminating `LF` (or at the end of `input` if there is none)
/// regardless of whether the line was valid — mirroring `fsck_ident`, which
/// advances its cursor before running any check, so a broken author line
/// never desynchronizes parsing of the lines that follow it.
pub fn check_ident<'a>(
    input: &'a [u8],
    object: &ObjectId,
    options: &Options,
    sink: &mut dyn Sink,
) -> (i32, &'a [u8]) {
    let (line, rest) = match memchr::memchr(b'\n', input) {
        Some(pos) => (&input[..pos], &input[pos + 1..]),
        None => (input, &input[input.len()..]),
    };

    macro_rules! fail {
        ($kind:expr, $msg:expr) => {
            return (report(options, Some(object), $kind, $msg, sink), rest)
        };
    }

    if line.first() == Some(&b'<') {
        fail!(
            Kind::MissingNameBeforeEmail,
            "invalid author/committer line - missing space before email"
        );
    }

    let mut p = 0usize;
    while p < line.len() && line[p] != b'<' && line[p] != b'>' {
        p += 1;
    }
    if line.get(p) == Some(&b'>') {
        fail!(Kind::BadName, "invalid author/committer line - bad name");
    }
    if line.get(p) != Some(&b'<') {
        fail!(Kind::MissingEmail, "invalid author/committer line - missing email");
    }
    if p == 0 || line[p - 1] != b' ' {
        fail!(
            Kind::MissingSpaceBeforeEmail,
            "invalid author/committer line - missing space before email"
        );
    }
    p += 1; // past '<'
    while p < line.len() && line[p] != b'<' && line[p] != b'>' {
        p += 1;
    }
    if line.get(p) != Some(&b'>') {
        fail!(Kind::BadEmail, "invalid author/committer line - bad email");
    }
    p += 1; // past '>'
    if line.get(p) != Some(&b' ') {
        fail!(
            Kind::MissingSpaceBeforeDate,
            "invalid author/committer line - missing space before date"
        );
    }
    p += 1;

    let date_start = p;
    if line.get(p) == Some(&b'0') && line.get(p + 1) != Some(&b' ') {
        fail!(Kind::ZeroPaddedDate, "invalid author/committer line - zero-padded date");
    }
    while p < line.len() && line[p].is_ascii_digit() {
        p += 1;
    }
    if p > date_start {
        let value: u64 = std::str::from_utf8(&line[date_start..p])
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(u64::MAX);
        if date_overflows(value) {
            fail!(
                Kind::BadDateOverflow,
                "invalid author/committer line - date causes integer overflow"
            );
        }
    }
    if p == date_start || line.get(p) != Some(&b' ') {
        fail!(Kind::BadDate, "invalid author/committer line - bad date");
    }
    p += 1;

    let tz = &line[p..];
    let valid_tz =
        tz.len() == 5 && matches!(tz[0], b'+' | b'-') && tz[1..].iter().all(u8::is_ascii_digit);
    if !valid_tz {
        fail!(Kind::BadTimezone, "invalid author/committer line - bad time zone");
    }

    (0, rest)
}

/// Numeric overflow predicate for a parsed `unixtime`. The original treats
/// this as a host-supplied collaborator (time_t width is platform
/// dependent); here it is a pure deterministic check against a signed
/// 64-bit range, which is what every supported host platform uses.
fn date_overflows(value: u64) -> bool {
    value > i64::MAX as u64
}
