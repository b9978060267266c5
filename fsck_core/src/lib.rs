//! Object integrity checker for content-addressed object stores of the Git
//! family — blobs, trees, commits, and tags identified by 20-byte SHA-1
//! digests.
//!
//! This crate is the validator plus its policy engine: a message catalog
//! with per-diagnostic default severities ([`catalog`]), a policy layer
//! that remaps severities at runtime and can suppress diagnostics for a
//! configured set of object identifiers ([`policy`]), the format validators
//! for tree, commit, and tag objects ([`validators`], blobs are trivially
//! valid), and the reachability walker that enumerates outbound references
//! from an object for graph-level fsck ([`walk`]).
//!
//! Object lookup, hashing, the surrounding CLI, and reference-name syntax
//! are host responsibilities, expressed here only as the traits in
//! [`host`].

pub mod catalog;
pub mod error;
pub mod host;
pub mod ident;
pub mod object;
pub mod policy;
pub mod report;
pub mod validators;
pub mod walk;

use host::HostServices;
use object::{Object, ObjectData};
use policy::Options;
use report::Sink;

/// Validates one object's serialized form against the grammar and semantic
/// rules for its kind, dispatching to [`validators::tree::validate_tree`],
/// [`validators::commit::validate_commit`], or
/// [`validators::tag::validate_tag`]. Blobs carry no grammar and always
/// pass.
///
/// Returns the sum of the sink's returns for tree objects (every tripped
/// flag reports independently), or the sink's return for the first failing
/// check for commits and tags (grammar is ordered production, so the scan
/// stops at the first broken line). Returns `-1`, independent of the
/// diagnostic stream, if the metadata this check depends on was never
/// resolved by the host (SPEC_FULL.md §7.3) — a null commit tree is
/// reported as `BAD_TREE` through the sink instead, since `tree` is a
/// checked field rather than a precondition.
pub fn fsck_object(
    object: &Object,
    options: &Options,
    sink: &mut dyn Sink,
    host: &dyn HostServices,
) -> i32 {
    match &object.data {
        ObjectData::Blob => 0,
        ObjectData::Tree { buffer } => match buffer.as_deref() {
            Some(buffer) => validators::tree::validate_tree(&object.id, buffer, options, sink, host),
            None => -1,
        },
        ObjectData::Commit { .. } => validators::commit::validate_commit(object, options, sink, host),
        ObjectData::Tag { .. } => validators::tag::validate_tag(object, options, sink, host),
    }
}
