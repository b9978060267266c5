//! Commit grammar validator (§4.D.3). Grounded in `fsck.c`'s
//! `fsck_commit_buffer`.

use crate::catalog::Kind;
use crate::host::{Graft, HostServices, ObjectStore};
use crate::ident;
use crate::object::{Object, ObjectData, ObjectId};
use crate::policy::Options;
use crate::report::{report, Sink};

/// Consumes a `<40-hex> LF` field. Returns whether the hex/terminator were
/// well formed, and the remainder of the buffer advanced by exactly 41
/// bytes (saturating at the buffer's end) regardless of validity — mirrors
/// `buffer += 41` in the original, which advances unconditionally once the
/// fixed-width field has been looked at.
fn take_hex_line(buf: &[u8]) -> (bool, &[u8]) {
    let valid = buf.len() >= 41
        && buf[..40].iter().all(u8::is_ascii_hexdigit)
        && buf[40] == b'\n';
    (valid, &buf[buf.len().min(41)..])
}

fn strip_prefix<'a>(buf: &'a [u8], prefix: &[u8]) -> Option<&'a [u8]> {
    buf.strip_prefix(prefix)
}

/// Validates a commit's raw serialized buffer against the grammar in
/// SPEC_FULL.md §4.D.3, plus the graft/tree-link semantic checks.
pub fn validate_commit(
    object: &Object,
    options: &Options,
    sink: &mut dyn Sink,
    host: &dyn HostServices,
) -> i32 {
    let ObjectData::Commit { raw, tree, parents } = &object.data else {
        unreachable!("validate_commit called on a non-commit object")
    };
    let Some(buffer) = raw.as_deref() else {
        // No raw buffer to validate against — structural parse failure,
        // independent of the diagnostic stream (SPEC_FULL.md §7.3).
        return -1;
    };
    let id = &object.id;

    if ident::verify_headers(buffer, id, options, sink) != 0 {
        return -1;
    }

    let Some(mut cursor) = strip_prefix(buffer, b"tree ") else {
        return report(options, Some(id), Kind::MissingTree, "invalid format - expected 'tree' line", sink);
    };
    let (tree_sha1_ok, rest) = take_hex_line(cursor);
    cursor = rest;
    if !tree_sha1_ok {
        let err = report(options, Some(id), Kind::BadTreeSha1, "invalid 'tree' line format - bad sha1", sink);
        if err != 0 {
            return err;
        }
    }

    let mut parent_line_count = 0u32;
    while let Some(after) = strip_prefix(cursor, b"parent ") {
        let (sha1_ok, rest) = take_hex_line(after);
        cursor = rest;
        if !sha1_ok {
            let err = report(options, Some(id), Kind::BadParentSha1, "invalid 'parent' line format - bad sha1", sink);
            if err != 0 {
                return err;
            }
        }
        parent_line_count += 1;
    }

    let parent_count = parents.len() as u32;
    match host.lookup_commit_graft(id) {
        Some(Graft::Shallow) if parent_count == 0 => {}
        Some(Graft::Shallow) => {
            let err = report(options, Some(id), Kind::MissingGraft, "graft objects missing", sink);
            if err != 0 {
                return err;
            }
        }
        Some(Graft::Parents(n)) if n == parent_count => {}
        Some(Graft::Parents(_)) => {
            let err = report(options, Some(id), Kind::MissingGraft, "graft objects missing", sink);
            if err != 0 {
                return err;
            }
        }
        None => {
            if parent_count != parent_line_count {
                let err = report(options, Some(id), Kind::MissingParent, "parent objects missing", sink);
                if err != 0 {
                    return err;
                }
            }
        }
    }

    let mut author_count = 0u32;
    while let Some(after) = strip_prefix(cursor, b"author ") {
        author_count += 1;
        let (err, rest) = ident::check_ident(after, id, options, sink);
        if err != 0 {
            return err;
        }
        cursor = rest;
    }
    if author_count < 1 {
        let err = report(options, Some(id), Kind::MissingAuthor, "invalid format - expected 'author' line", sink);
        if err != 0 {
            return err;
        }
    } else if author_count > 1 {
        let err = report(options, Some(id), Kind::MultipleAuthors, "invalid format - multiple 'author' lines", sink);
        if err != 0 {
            return err;
        }
    }

    let Some(after) = strip_prefix(cursor, b"committer ") else {
        return report(options, Some(id), Kind::MissingCommitter, "invalid format - expected 'committer' line", sink);
    };
    let (err, _rest) = ident::check_ident(after, id, options, sink);
    if err != 0 {
        return err;
    }

    if tree.is_none() {
        return report(options, Some(id), Kind::BadTree, "could not load commit's tree", sink);
    }

    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullHost;
    use crate::object::ObjectKind;
    use crate::report::ReportSeverity;

    fn hex(byte: u8) -> String {
        hex::encode([byte; 20])
    }

    fn well_formed_commit(parents: usize) -> (Vec<u8>, ObjectId, Vec<ObjectId>) {
        let tree_id = ObjectId::from_bytes([1; 20]);
        let mut parent_ids = Vec::new();
        let mut buf = format!("tree {}\n", hex(1));
        for i in 0..parents {
            let pid = ObjectId::from_bytes([10 + i as u8; 20]);
            buf.push_str(&format!("parent {}\n", hex(10 + i as u8)));
            parent_ids.push(pid);
        }
        buf.push_str("author A U Thor <a@x> 1234567890 +0000\n");
        buf.push_str("committer A U Thor <a@x> 1234567890 +0000\n");
        buf.push('\n');
        (buf.into_bytes(), tree_id, parent_ids)
    }

    fn collecting_sink() -> (std::rc::Rc<std::cell::RefCell<Vec<String>>>, impl FnMut(Option<&ObjectId>, ReportSeverity, &str) -> i32) {
        let calls = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let calls2 = calls.clone();
        let sink = move |_: Option<&ObjectId>, sev: ReportSeverity, m: &str| {
            calls2.borrow_mut().push(m.split(':').next().unwrap().to_string());
            if sev == ReportSeverity::Error { 1 } else { 0 }
        };
        (calls, sink)
    }

    #[test]
    fn well_formed_commit_passes_clean() {
        let (buf, tree_id, parents) = well_formed_commit(2);
        let id = ObjectId::from_bytes([99; 20]);
        let object = Object::commit(id, buf, Some(tree_id), parents);
        let opts = Options::new();
        let (calls, mut sink) = collecting_sink();
        let result = validate_commit(&object, &opts, &mut sink, &NullHost);
        assert_eq!(result, 0);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn missing_tree_line_is_reported() {
        let id = ObjectId::from_bytes([99; 20]);
        let buf = b"author A U Thor <a@x> 1 +0000\ncommitter A U Thor <a@x> 1 +0000\n\n".to_vec();
        let object = Object::commit(id, buf, Some(ObjectId::from_bytes([1; 20])), vec![]);
        let opts = Options::new();
        let (calls, mut sink) = collecting_sink();
        validate_commit(&object, &opts, &mut sink, &NullHost);
        assert_eq!(calls.borrow().as_slice(), ["missingTree"]);
    }

    #[test]
    fn parent_count_mismatch_without_graft_is_missing_parent() {
        let (buf, tree_id, _parents) = well_formed_commit(1);
        let id = ObjectId::from_bytes([99; 20]);
        // in-memory parents disagree with the single "parent" line above.
        let object = Object::commit(id, buf, Some(tree_id), vec![]);
        let opts = Options::new();
        let (calls, mut sink) = collecting_sink();
        validate_commit(&object, &opts, &mut sink, &NullHost);
        assert!(calls.borrow().contains(&"missingParent".to_string()));
    }

    #[test]
    fn multiple_authors_is_flagged() {
        let tree_id = ObjectId::from_bytes([1; 20]);
        let id = ObjectId::from_bytes([99; 20]);
        let buf = format!(
            "tree {}\nauthor A <a@x> 1 +0000\nauthor B <b@x> 1 +0000\ncommitter A <a@x> 1 +0000\n\n",
            hex(1)
        )
        .into_bytes();
        let object = Object::commit(id, buf, Some(tree_id), vec![]);
        let opts = Options::new();
        let (calls, mut sink) = collecting_sink();
        validate_commit(&object, &opts, &mut sink, &NullHost);
        assert!(calls.borrow().contains(&"multipleAuthors".to_string()));
    }

    #[test]
    fn null_tree_link_is_bad_tree() {
        let (buf, _tree_id, parents) = well_formed_commit(0);
        let id = ObjectId::from_bytes([99; 20]);
        let object = Object::commit(id, buf, None, parents);
        let opts = Options::new();
        let (calls, mut sink) = collecting_sink();
        validate_commit(&object, &opts, &mut sink, &NullHost);
        assert!(calls.borrow().contains(&"badTree".to_string()));
    }

    struct ShallowGraft;
    impl ObjectStore for ShallowGraft {
        fn lookup_commit_graft(&self, _id: &ObjectId) -> Option<Graft> {
            Some(Graft::Shallow)
        }
        fn read_object(&self, _id: &ObjectId) -> Option<(ObjectKind, Vec<u8>)> {
            None
        }
    }
    impl crate::host::RefnameValidator for ShallowGraft {
        fn check_refname_format(&self, refname: &str) -> bool {
            !refname.is_empty()
        }
    }
    impl crate::host::DotgitDetector for ShallowGraft {
        fn is_hfs_dotgit(&self, _name: &[u8]) -> bool {
            false
        }
        fn is_ntfs_dotgit(&self, _name: &[u8]) -> bool {
            false
        }
    }

    #[test]
    fn shallow_graft_with_no_parents_is_accepted() {
        let (buf, tree_id, _parents) = well_formed_commit(0);
        let id = ObjectId::from_bytes([99; 20]);
        let object = Object::commit(id, buf, Some(tree_id), vec![]);
        let opts = Options::new();
        let (calls, mut sink) = collecting_sink();
        validate_commit(&object, &opts, &mut sink, &ShallowGraft);
        assert!(calls.borrow().is_empty());
    }
}
