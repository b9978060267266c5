//! Tree grammar and ordering validator (§4.D.5). Grounded in `fsck.c`'s
//! `fsck_tree` and `verify_ordered`.

use std::cmp::Ordering;

use crate::catalog::Kind;
use crate::host::{DotgitDetector, HostServices};
use crate::object::ObjectId;
use crate::policy::Options;
use crate::report::{report, Sink};

pub const MODE_REGULAR_755: u32 = 0o100_755;
pub const MODE_REGULAR_644: u32 = 0o100_644;
pub const MODE_REGULAR_664: u32 = 0o100_664;
pub const MODE_SYMLINK: u32 = 0o120_000;
pub const MODE_DIRECTORY: u32 = 0o040_000;
pub const MODE_GITLINK: u32 = 0o160_000;

const TYPE_MASK: u32 = 0o170_000;

pub fn is_directory(mode: u32) -> bool {
    mode & TYPE_MASK == MODE_DIRECTORY
}

pub fn is_gitlink(mode: u32) -> bool {
    mode & TYPE_MASK == MODE_GITLINK
}

pub fn is_regular(mode: u32) -> bool {
    mode & TYPE_MASK == 0o100_000
}

pub fn is_symlink(mode: u32) -> bool {
    mode & TYPE_MASK == 0o120_000
}

/// One `<mode> SP <name> NUL <oid>` entry, borrowed from the buffer it was
/// parsed out of.
#[derive(Debug, Clone, Copy)]
pub struct TreeEntry<'a> {
    pub mode: u32,
    pub zero_padded: bool,
    pub name: &'a [u8],
    pub oid: ObjectId,
}

/// Iterates the entries of a tree's raw buffer in on-disk order. Stops
/// (without reporting) the moment the buffer cannot be decoded as another
/// well-formed entry, mirroring `tree_entry`'s trust that the object store
/// only ever hands it a buffer of whole entries.
pub fn parse_entries(buffer: &[u8]) -> impl Iterator<Item = TreeEntry<'_>> {
    TreeEntryIter { remaining: buffer }
}

struct TreeEntryIter<'a> {
    remaining: &'a [u8],
}

impl<'a> Iterator for TreeEntryIter<'a> {
    type Item = TreeEntry<'a>;

    fn next(&mut self) -> Option<TreeEntry<'a>> {
        if self.remaining.is_empty() {
            return None;
        }
        let space = memchr::memchr(b' ', self.remaining)?;
        let mode_text = &self.remaining[..space];
        if mode_text.is_empty() || !mode_text.iter().all(u8::is_ascii_digit) {
            return None;
        }
        let mode_str = std::str::from_utf8(mode_text).ok()?;
        let mode = u32::from_str_radix(mode_str, 8).ok()?;
        let zero_padded = mode_text[0] == b'0';

        let after_mode = &self.remaining[space + 1..];
        let nul = memchr::memchr(0, after_mode)?;
        let name = &after_mode[..nul];
        let after_name = &after_mode[nul + 1..];
        if after_name.len() < 20 {
            return None;
        }
        let mut oid_bytes = [0u8; 20];
        oid_bytes.copy_from_slice(&after_name[..20]);
        self.remaining = &after_name[20..];

        Some(TreeEntry { mode, zero_padded, name, oid: ObjectId::from_bytes(oid_bytes) })
    }
}

enum PairOrder {
    Ok,
    Unordered,
    Duplicate,
}

/// Entries are ordered as if directory names had a trailing `/` appended
/// (SPEC_FULL.md §4.D.5). `verify_ordered` in the original.
fn verify_ordered(prev: &TreeEntry<'_>, next: &TreeEntry<'_>) -> PairOrder {
    let len = prev.name.len().min(next.name.len());
    match prev.name[..len].cmp(&next.name[..len]) {
        Ordering::Less => return PairOrder::Ok,
        Ordering::Greater => return PairOrder::Unordered,
        Ordering::Equal => {}
    }

    let raw_byte = |entry: &TreeEntry<'_>| -> u8 {
        if len < entry.name.len() { entry.name[len] } else { 0 }
    };

    // Duplicate-ness is decided on the raw terminator bytes, before any
    // directory `/` substitution: two entries whose names are identical as
    // written are duplicates regardless of what type either one is.
    if raw_byte(prev) == 0 && raw_byte(next) == 0 {
        return PairOrder::Duplicate;
    }

    let virtual_byte = |entry: &TreeEntry<'_>| -> u8 {
        if len < entry.name.len() {
            entry.name[len]
        } else if is_directory(entry.mode) {
            b'/'
        } else {
            0
        }
    };

    let c1 = virtual_byte(prev);
    let c2 = virtual_byte(next);
    if c1 < c2 {
        PairOrder::Ok
    } else {
        PairOrder::Unordered
    }
}

#[derive(Default)]
struct Flags {
    null_sha1: bool,
    full_path: bool,
    empty_name: bool,
    has_dot: bool,
    has_dotdot: bool,
    has_dotgit: bool,
    zero_pad: bool,
    bad_modes: bool,
    dup_entries: bool,
    not_sorted: bool,
}

/// Validates a tree's raw entry buffer, reporting at most one diagnostic per
/// flag regardless of how many entries trip it. Returns the sum of the
/// sink's returns.
pub fn validate_tree(
    id: &ObjectId,
    buffer: &[u8],
    options: &Options,
    sink: &mut dyn Sink,
    host: &dyn HostServices,
) -> i32 {
    let mut flags = Flags::default();
    let mut prev: Option<TreeEntry<'_>> = None;

    for entry in parse_entries(buffer) {
        flags.null_sha1 |= entry.oid.is_null();
        flags.full_path |= entry.name.contains(&b'/');
        flags.empty_name |= entry.name.is_empty();
        flags.has_dot |= entry.name == b".";
        flags.has_dotdot |= entry.name == b"..";
        flags.has_dotgit |= entry.name == b".git"
            || host.is_hfs_dotgit(entry.name)
            || host.is_ntfs_dotgit(entry.name);
        flags.zero_pad |= entry.zero_padded;

        match entry.mode {
            MODE_REGULAR_755 | MODE_REGULAR_644 | MODE_SYMLINK | MODE_DIRECTORY
            | MODE_GITLINK => {}
            MODE_REGULAR_664 if !options.is_strict() => {}
            _ => flags.bad_modes = true,
        }

        if let Some(prev_entry) = prev {
            match verify_ordered(&prev_entry, &entry) {
                PairOrder::Unordered => flags.not_sorted = true,
                PairOrder::Duplicate => flags.dup_entries = true,
                PairOrder::Ok => {}
            }
        }
        prev = Some(entry);
    }

    let mut total = 0;
    if flags.null_sha1 {
        total += report(options, Some(id), Kind::NullSha1, "contains entries pointing to null sha1", sink);
    }
    if flags.full_path {
        total += report(options, Some(id), Kind::FullPathname, "contains full pathnames", sink);
    }
    if flags.empty_name {
        total += report(options, Some(id), Kind::EmptyName, "contains empty pathname", sink);
    }
    if flags.has_dot {
        total += report(options, Some(id), Kind::HasDot, "contains '.'", sink);
    }
    if flags.has_dotdot {
        total += report(options, Some(id), Kind::HasDotdot, "contains '..'", sink);
    }
    if flags.has_dotgit {
        total += report(options, Some(id), Kind::HasDotgit, "contains '.git'", sink);
    }
    if flags.zero_pad {
        total += report(options, Some(id), Kind::ZeroPaddedFilemode, "contains zero-padded file modes", sink);
    }
    if flags.bad_modes {
        total += report(options, Some(id), Kind::BadFilemode, "contains bad file modes", sink);
    }
    if flags.dup_entries {
        total += report(options, Some(id), Kind::DuplicateEntries, "contains duplicate file entries", sink);
    }
    if flags.not_sorted {
        total += report(options, Some(id), Kind::TreeNotSorted, "not properly sorted", sink);
    }
    total
}
