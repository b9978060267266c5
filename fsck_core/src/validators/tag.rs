//! Tag grammar validator (§4.D.4). Grounded in `fsck.c`'s `fsck_tag` and
//! `fsck_tag_buffer`.

use crate::catalog::Kind;
use crate::host::{HostServices, ObjectStore, RefnameValidator};
use crate::ident;
use crate::object::{Object, ObjectData, ObjectKind};
use crate::policy::Options;
use crate::report::{report, Sink};

fn strip_prefix<'a>(buf: &'a [u8], prefix: &[u8]) -> Option<&'a [u8]> {
    buf.strip_prefix(prefix)
}

fn split_line(buf: &[u8]) -> Option<(&[u8], &[u8])> {
    let pos = memchr::memchr(b'\n', buf)?;
    Some((&buf[..pos], &buf[pos + 1..]))
}

/// Validates a tag object: first that it actually points at a tagged
/// object (a host-resolution fact carried in [`ObjectData::Tag`]), then its
/// serialized grammar.
pub fn validate_tag(
    object: &Object,
    options: &Options,
    sink: &mut dyn Sink,
    host: &dyn HostServices,
) -> i32 {
    let ObjectData::Tag { raw, tagged, tagged_kind: _ } = &object.data else {
        unreachable!("validate_tag called on a non-tag object")
    };
    let id = &object.id;

    if tagged.is_none() {
        return report(options, Some(id), Kind::BadTagObject, "could not load tagged object", sink);
    }

    validate_tag_buffer(object, raw.as_deref(), options, sink, host)
}

fn validate_tag_buffer(
    object: &Object,
    data: Option<&[u8]>,
    options: &Options,
    sink: &mut dyn Sink,
    host: &dyn HostServices,
) -> i32 {
    let id = &object.id;

    let owned;
    let buffer: &[u8] = match data {
        Some(buf) => buf,
        None => match host.read_object(id) {
            None => return report(options, Some(id), Kind::MissingTagObject, "cannot read tag object", sink),
            Some((kind, bytes)) => {
                if kind != ObjectKind::Tag {
                    return report(
                        options,
                        Some(id),
                        Kind::TagObjectNotTag,
                        &format!("expected tag got {}", kind.name()),
                        sink,
                    );
                }
                owned = bytes;
                &owned
            }
        },
    };

    let hdr = ident::verify_headers(buffer, id, options, sink);
    if hdr != 0 {
        return hdr;
    }

    let Some(after_object) = strip_prefix(buffer, b"object ") else {
        return report(options, Some(id), Kind::MissingObject, "invalid format - expected 'object' line", sink);
    };
    let object_sha1_ok =
        after_object.len() >= 41 && after_object[..40].iter().all(u8::is_ascii_hexdigit) && after_object[40] == b'\n';
    let mut cursor = &after_object[after_object.len().min(41)..];
    if !object_sha1_ok {
        let err = report(options, Some(id), Kind::BadObjectSha1, "invalid 'object' line format - bad sha1", sink);
        if err != 0 {
            return err;
        }
    }

    let Some(after_type) = strip_prefix(cursor, b"type ") else {
        return report(options, Some(id), Kind::MissingTypeEntry, "invalid format - expected 'type' line", sink);
    };
    let Some((type_line, rest)) = split_line(after_type) else {
        return report(options, Some(id), Kind::MissingType, "invalid format - unexpected end after 'type' line", sink);
    };
    cursor = rest;
    if ObjectKind::from_name(std::str::from_utf8(type_line).unwrap_or("")).is_none() {
        let err = report(options, Some(id), Kind::BadType, "invalid 'type' value", sink);
        if err != 0 {
            return err;
        }
    }

    let Some(after_tag) = strip_prefix(cursor, b"tag ") else {
        return report(options, Some(id), Kind::MissingTagEntry, "invalid format - expected 'tag' line", sink);
    };
    let Some((tag_line, rest)) = split_line(after_tag) else {
        return report(options, Some(id), Kind::MissingTag, "invalid format - unexpected end after 'type' line", sink);
    };
    cursor = rest;
    let tag_name = String::from_utf8_lossy(tag_line);
    let refname = format!("refs/tags/{tag_name}");
    if !host.check_refname_format(&refname) {
        let err = report(options, Some(id), Kind::BadTagName, &format!("invalid 'tag' name: {tag_name}"), sink);
        if err != 0 {
            return err;
        }
    }

    match strip_prefix(cursor, b"tagger ") {
        None => {
            let err = report(options, Some(id), Kind::MissingTaggerEntry, "invalid format - expected 'tagger' line", sink);
            if err != 0 {
                return err;
            }
            0
        }
        Some(after_tagger) => {
            let (err, _rest) = ident::check_ident(after_tagger, id, options, sink);
            err
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Graft, NullHost};
    use crate::object::ObjectId;
    use crate::report::ReportSeverity;

    fn hex(byte: u8) -> String {
        hex::encode([byte; 20])
    }

    fn well_formed_tag_buffer(with_tagger: bool) -> Vec<u8> {
        let mut buf = format!("object {}\ntype commit\ntag v1.0\n", hex(1));
        if with_tagger {
            buf.push_str("tagger A U Thor <a@x> 1234567890 +0000\n");
        }
        buf.push('\n');
        buf.into_bytes()
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
    fn well_formed_tag_passes_clean() {
        let id = ObjectId::from_bytes([1; 20]);
        let tagged = ObjectId::from_bytes([2; 20]);
        let object = Object::tag(id, well_formed_tag_buffer(true), Some(tagged), Some(ObjectKind::Commit));
        let opts = Options::new();
        let (calls, mut sink) = collecting_sink();
        let result = validate_tag(&object, &opts, &mut sink, &NullHost);
        assert_eq!(result, 0);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn missing_tagger_is_silent_by_default_but_warns_when_enabled() {
        let id = ObjectId::from_bytes([1; 20]);
        let tagged = ObjectId::from_bytes([2; 20]);
        let object = Object::tag(id, well_formed_tag_buffer(false), Some(tagged), Some(ObjectKind::Commit));

        let opts = Options::new();
        let (calls, mut sink) = collecting_sink();
        validate_tag(&object, &opts, &mut sink, &NullHost);
        assert!(calls.borrow().is_empty());

        let opts = Options::new();
        opts.apply_overrides("missingTaggerEntry=warn").unwrap();
        let (calls, mut sink) = collecting_sink();
        validate_tag(&object, &opts, &mut sink, &NullHost);
        assert_eq!(calls.borrow().as_slice(), ["missingTaggerEntry"]);
    }

    #[test]
    fn untagged_object_is_bad_tag_object() {
        let id = ObjectId::from_bytes([1; 20]);
        let object = Object::tag(id, well_formed_tag_buffer(true), None, None);
        let opts = Options::new();
        let (calls, mut sink) = collecting_sink();
        validate_tag(&object, &opts, &mut sink, &NullHost);
        assert_eq!(calls.borrow().as_slice(), ["badTagObject"]);
    }

    #[test]
    fn unknown_type_is_flagged() {
        let id = ObjectId::from_bytes([1; 20]);
        let tagged = ObjectId::from_bytes([2; 20]);
        let buf = format!("object {}\ntype potato\ntag v1.0\ntagger A <a@x> 1 +0000\n\n", hex(1)).into_bytes();
        let object = Object::tag(id, buf, Some(tagged), None);
        let opts = Options::new();
        let (calls, mut sink) = collecting_sink();
        validate_tag(&object, &opts, &mut sink, &NullHost);
        assert!(calls.borrow().contains(&"badType".to_string()));
    }

    struct RejectAllRefnames;
    impl ObjectStore for RejectAllRefnames {
        fn lookup_commit_graft(&self, _id: &ObjectId) -> Option<Graft> {
            None
        }
        fn read_object(&self, _id: &ObjectId) -> Option<(ObjectKind, Vec<u8>)> {
            None
        }
    }
    impl crate::host::RefnameValidator for RejectAllRefnames {
        fn check_refname_format(&self, _refname: &str) -> bool {
            false
        }
    }
    impl crate::host::DotgitDetector for RejectAllRefnames {
        fn is_hfs_dotgit(&self, _name: &[u8]) -> bool {
            false
        }
        fn is_ntfs_dotgit(&self, _name: &[u8]) -> bool {
            false
        }
    }

    #[test]
    fn bad_tag_name_is_info_level_and_continues() {
        let id = ObjectId::from_bytes([1; 20]);
        let tagged = ObjectId::from_bytes([2; 20]);
        let object = Object::tag(id, well_formed_tag_buffer(true), Some(tagged), Some(ObjectKind::Commit));
        let opts = Options::new();
        let (calls, mut sink) = collecting_sink();
        let result = validate_tag(&object, &opts, &mut sink, &RejectAllRefnames);
        assert_eq!(result, 0);
        assert!(calls.borrow().is_empty());
    }
}
