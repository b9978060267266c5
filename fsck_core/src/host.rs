//! §6 external interfaces, expressed as traits the embedding host
//! implements. Object lookup / on-disk reading is an explicit Non-goal
//! (SPEC_FULL.md §1), so these traits cover only the narrow slice the
//! validators actually call out to: graft resolution, the on-demand tag
//! buffer fetch, refname syntax, and the two dot-git alias detectors.

use crate::object::{ObjectId, ObjectKind};

/// A graft's declared parent arrangement for a commit, as returned by
/// `lookup_commit_graft`. `Shallow` is the original's `nr_parent == -1`
/// sentinel for a shallow clone boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Graft {
    Shallow,
    Parents(u32),
}

/// The subset of object-store access the validators need: resolving a
/// commit's graft override, and fetching a tag's buffer on demand when the
/// caller didn't already provide one (the only lazy-read path in the
/// validator, per SPEC_FULL.md §5).
pub trait ObjectStore {
    fn lookup_commit_graft(&self, id: &ObjectId) -> Option<Graft>;

    fn read_object(&self, id: &ObjectId) -> Option<(ObjectKind, Vec<u8>)>;
}

/// Reference-name syntax, as consumed when validating a tag's `tag` line
/// wrapped as `refs/tags/<name>`. Returns `true` iff the name is valid.
pub trait RefnameValidator {
    fn check_refname_format(&self, refname: &str) -> bool;
}

/// Platform-specific `.git` alias detection (HFS/NTFS homoglyphs and
/// case-folding tricks), consulted by the tree validator's `has_dotgit`
/// flag alongside the exact `.git` match.
pub trait DotgitDetector {
    fn is_hfs_dotgit(&self, name: &[u8]) -> bool;
    fn is_ntfs_dotgit(&self, name: &[u8]) -> bool;
}

/// The full set of host collaborators `fsck_object` needs, bundled so
/// callers only have to pass one value. Blanket-implemented for anything
/// implementing the three pieces.
pub trait HostServices: ObjectStore + RefnameValidator + DotgitDetector {}
impl<T: ObjectStore + RefnameValidator + DotgitDetector + ?Sized> HostServices for T {}

/// A host with none of the optional collaborators wired up: no grafts, no
/// on-demand reads, permissive refname checking, no dot-git aliasing.
/// Useful for tests and for embedders that only care about buffers they
/// already have in hand.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl ObjectStore for NullHost {
    fn lookup_commit_graft(&self, _id: &ObjectId) -> Option<Graft> {
        None
    }

    fn read_object(&self, _id: &ObjectId) -> Option<(ObjectKind, Vec<u8>)> {
        None
    }
}

impl RefnameValidator for NullHost {
    fn check_refname_format(&self, refname: &str) -> bool {
        !refname.is_empty() && !refname.contains("..") && !refname.ends_with('/')
    }
}

impl DotgitDetector for NullHost {
    fn is_hfs_dotgit(&self, _name: &[u8]) -> bool {
        false
    }

    fn is_ntfs_dotgit(&self, _name: &[u8]) -> bool {
        false
    }
}
