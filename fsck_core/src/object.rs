//! Object identity and the polymorphic object shapes the validators inspect.

use std::fmt;

/// A 20-byte SHA-1 object identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; 20]);

impl ObjectId {
    pub const NULL: ObjectId = ObjectId([0u8; 20]);

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        ObjectId(bytes)
    }

    /// Parses a lowercase 40-hex string into an id. Returns `None` on any
    /// malformed input (wrong length, non-hex digit, uppercase is rejected
    /// the way the skip-list loader rejects it).
    pub fn from_hex(text: &str) -> Option<Self> {
        if text.len() != 40 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let mut out = [0u8; 20];
        hex::decode_to_slice(text, &mut out).ok()?;
        Some(ObjectId(out))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 20]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// The four object kinds of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectKind {
    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
            ObjectKind::Tag => "tag",
        }
    }

    /// Counterpart of the host's `typename_from_string`, provided here as a
    /// fallback for tests and for hosts that don't need a custom table.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "blob" => Some(ObjectKind::Blob),
            "tree" => Some(ObjectKind::Tree),
            "commit" => Some(ObjectKind::Commit),
            "tag" => Some(ObjectKind::Tag),
            _ => None,
        }
    }
}

/// In-memory metadata the validators work from. Parsing a raw buffer into
/// this shape is a host responsibility (see [`crate::host::ObjectStore`]);
/// the validators themselves only ever read it.
#[derive(Debug, Clone)]
pub struct Object {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub data: ObjectData,
}

#[derive(Debug, Clone)]
pub enum ObjectData {
    Blob,
    Tree {
        /// Raw serialized entry buffer, unmodified, used by the grammar
        /// validator. `None` when the host could not or did not supply one.
        buffer: Option<Vec<u8>>,
    },
    Commit {
        raw: Option<Vec<u8>>,
        tree: Option<ObjectId>,
        parents: Vec<ObjectId>,
    },
    Tag {
        raw: Option<Vec<u8>>,
        tagged: Option<ObjectId>,
        tagged_kind: Option<ObjectKind>,
    },
}

impl Object {
    pub fn blob(id: ObjectId) -> Self {
        Object { id, kind: ObjectKind::Blob, data: ObjectData::Blob }
    }

    pub fn tree(id: ObjectId, buffer: Vec<u8>) -> Self {
        Object {
            id,
            kind: ObjectKind::Tree,
            data: ObjectData::Tree { buffer: Some(buffer) },
        }
    }

    pub fn commit(id: ObjectId, raw: Vec<u8>, tree: Option<ObjectId>, parents: Vec<ObjectId>) -> Self {
        Object {
            id,
            kind: ObjectKind::Commit,
            data: ObjectData::Commit { raw: Some(raw), tree, parents },
        }
    }

    pub fn tag(id: ObjectId, raw: Vec<u8>, tagged: Option<ObjectId>, tagged_kind: Option<ObjectKind>) -> Self {
        Object {
            id,
            kind: ObjectKind::Tag,
            data: ObjectData::Tag { raw: Some(raw), tagged, tagged_kind },
        }
    }
}
