//! Applies policy to a candidate diagnostic, formats it, and dispatches to
//! the host sink. Grounded in `report()`/`fsck_error_function` of the
//! original `fsck.c`.

use serde::{Deserialize, Serialize};

use crate::catalog::Kind;
use crate::object::ObjectId;
use crate::policy::{Effective, Options};

/// Severity as seen by the sink, after `Fatal`/`Info` have been collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSeverity {
    Error,
    Warn,
}

/// A fully materialized diagnostic, as seen at the sink boundary: the kind
/// has already been folded into `message`'s `"<symbolic>: ..."` prefix, the
/// same shape the host's own `Sink::report` receives. For hosts that want
/// to collect or serialize the diagnostics a run produced rather than only
/// reacting to each one as it arrives. Mirrors the teacher's
/// `CheckDiagnostic` in shape, minus the file/line/column fields this
/// domain has no concept of — an object is the unit of location here, not
/// a source position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: ReportSeverity,
    /// Hex object id, if the diagnostic was object-scoped.
    pub object: Option<String>,
    pub message: String,
}

/// A [`Sink`] that collects every non-suppressed diagnostic it sees instead
/// of dispatching to an external stream, for hosts that want the full set
/// at the end of a run (e.g. to serialize as JSON via `serde_json`).
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl Sink for CollectingSink {
    fn report(&mut self, object: Option<&ObjectId>, severity: ReportSeverity, message: &str) -> i32 {
        self.diagnostics.push(Diagnostic {
            severity,
            object: object.map(ObjectId::to_hex),
            message: message.to_string(),
        });
        match severity {
            ReportSeverity::Error => 1,
            ReportSeverity::Warn => 0,
        }
    }
}

/// Where classified diagnostics go. Implementations decide what a `0`
/// (continue) versus `1` (treat as fatal to the overall run) return means
/// for their host.
pub trait Sink {
    fn report(&mut self, object: Option<&ObjectId>, severity: ReportSeverity, message: &str) -> i32;
}

impl<F> Sink for F
where
    F: FnMut(Option<&ObjectId>, ReportSeverity, &str) -> i32,
{
    fn report(&mut self, object: Option<&ObjectId>, severity: ReportSeverity, message: &str) -> i32 {
        self(object, severity, message)
    }
}

/// The default sink: prints `object <hex>: <message>` to stderr for
/// warnings (returning 0) and to stderr for errors (returning 1), mirroring
/// `fsck_error_function`'s warning/error split.
#[derive(Debug, Default)]
pub struct DefaultSink;

impl Sink for DefaultSink {
    fn report(&mut self, object: Option<&ObjectId>, severity: ReportSeverity, message: &str) -> i32 {
        let prefix = match object {
            Some(id) => format!("object {id}: "),
            None => String::new(),
        };
        match severity {
            ReportSeverity::Warn => {
                eprintln!("warning: {prefix}{message}");
                0
            }
            ReportSeverity::Error => {
                eprintln!("error: {prefix}{message}");
                1
            }
        }
    }
}

/// Builds the `"<camelCase-kind>: <message>"` prefix the same way
/// `append_msg_id` does.
fn formatted_message(kind: Kind, message: &str) -> String {
    format!("{}: {}", kind.lowercase(), message)
}

/// Applies policy to one diagnostic and, if not suppressed, dispatches it to
/// `sink`. Returns the sink's return value, or 0 if suppressed by policy or
/// the skip list.
pub fn report(
    options: &Options,
    object: Option<&ObjectId>,
    kind: Kind,
    message: &str,
    sink: &mut dyn Sink,
) -> i32 {
    let effective = options.effective_severity(kind);
    if effective == Effective::Ignore {
        return 0;
    }
    if let Some(id) = object {
        if options.is_skipped(id) {
            return 0;
        }
    }

    let severity = match effective {
        Effective::Fatal | Effective::Error => ReportSeverity::Error,
        Effective::Info | Effective::Warn => ReportSeverity::Warn,
        Effective::Ignore => unreachable!("handled above"),
    };

    let text = formatted_message(kind, message);
    match severity {
        ReportSeverity::Error => log::debug!("fsck error: {text}"),
        ReportSeverity::Warn => log::debug!("fsck warning: {text}"),
    }

    sink.report(object, severity, &text)
}
