//! Severity overrides, skip-list handling, and the effective severity table.
//!
//! Grounded in `fsck_set_msg_types`/`fsck_set_msg_type`/`init_skiplist` of
//! the original `fsck.c`, shaped like the teacher's `CheckConfig` in
//! `config.rs` (materialize-on-first-override, `Off`-as-`Ignore`).

use std::cell::RefCell;

use crate::catalog::{Kind, Severity, KIND_COUNT};
use crate::error::PolicyError;

/// The severity a diagnostic is ultimately reported at, after any user
/// override. Distinct from [`Severity`]: `Ignore` only ever arises from
/// policy, never as a catalog default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effective {
    Fatal,
    Error,
    Warn,
    Info,
    Ignore,
}

impl From<Severity> for Effective {
    fn from(s: Severity) -> Self {
        match s {
            Severity::Fatal => Effective::Fatal,
            Severity::Error => Effective::Error,
            Severity::Warn => Effective::Warn,
            Severity::Info => Effective::Info,
        }
    }
}

/// The three severities a user override may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Override {
    Error,
    Warn,
    Ignore,
}

impl Override {
    fn parse(text: &str) -> Option<Override> {
        match text {
            "error" => Some(Override::Error),
            "warn" => Some(Override::Warn),
            "ignore" => Some(Override::Ignore),
            _ => None,
        }
    }
}

impl From<Override> for Effective {
    fn from(o: Override) -> Self {
        match o {
            Override::Error => Effective::Error,
            Override::Warn => Effective::Warn,
            Override::Ignore => Effective::Ignore,
        }
    }
}

/// An ordered set of object identifiers whose diagnostics are suppressed.
#[derive(Debug, Default)]
pub struct SkipList {
    ids: Vec<crate::object::ObjectId>,
    sorted: bool,
}

impl SkipList {
    pub fn new() -> Self {
        SkipList { ids: Vec::new(), sorted: true }
    }

    pub fn push(&mut self, id: crate::object::ObjectId) {
        if self.sorted {
            if let Some(last) = self.ids.last() {
                if *last > id {
                    self.sorted = false;
                }
            }
        }
        self.ids.push(id);
    }

    pub fn contains(&mut self, id: &crate::object::ObjectId) -> bool {
        if !self.sorted {
            self.ids.sort_unstable();
            self.ids.dedup();
            self.sorted = true;
        }
        self.ids.binary_search(id).is_ok()
    }

    /// Loads one 20-byte id per 41-byte line (40 hex + LF) from raw bytes.
    /// Splitting the IO itself out lets callers supply file contents from
    /// any source; `Options::load_skiplist_file` wraps the actual read.
    pub fn load(&mut self, contents: &[u8]) -> Result<(), PolicyError> {
        if contents.len() % 41 != 0 {
            return Err(PolicyError::SkipListMalformed { line: contents.len() / 41 + 1 });
        }
        for (i, chunk) in contents.chunks(41).enumerate() {
            if chunk[40] != b'\n' {
                return Err(PolicyError::SkipListMalformed { line: i + 1 });
            }
            let hex = std::str::from_utf8(&chunk[..40])
                .map_err(|_| PolicyError::SkipListMalformed { line: i + 1 })?;
            let id = crate::object::ObjectId::from_hex(hex)
                .ok_or(PolicyError::SkipListMalformed { line: i + 1 })?;
            self.push(id);
        }
        Ok(())
    }
}

/// Per-invocation validator configuration: severity overrides, strict mode,
/// and the skip list. Carries interior mutability for its lazily
/// materialized state (the severity table, and the skip list's sortedness)
/// because callers treat it as shared-but-single-threaded state across a
/// run (§5: callers must serialize their own access, the crate does not add
/// thread synchronization on top).
#[derive(Debug)]
pub struct Options {
    strict: bool,
    table: RefCell<Option<[Effective; KIND_COUNT]>>,
    skiplist: RefCell<Option<SkipList>>,
}

impl Default for Options {
    fn default() -> Self {
        Options { strict: false, table: RefCell::new(None), skiplist: RefCell::new(None) }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Whether strict mode was requested at construction.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Effective severity before skip-list filtering, mirroring
    /// `fsck_msg_type`: use the materialized table if one exists, otherwise
    /// compute from the catalog default plus strict-mode promotion.
    ///
    /// `Info`-class kinds default to `Ignore`: the mini-language's three
    /// user-selectable severities (`error`/`warn`/`ignore`) never include
    /// "info", so an `Info` kind can only ever be *enabled* (to `Warn`) by
    /// an explicit override, never silently shown by default (SPEC_FULL.md
    /// §8, "missing tagger" scenario).
    pub fn effective_severity(&self, kind: Kind) -> Effective {
        if let Some(table) = self.table.borrow().as_ref() {
            return table[kind.index()];
        }
        match kind.default_severity() {
            Severity::Info => Effective::Ignore,
            Severity::Warn if self.strict => Effective::Error,
            other => Effective::from(other),
        }
    }

    fn materialize_if_needed(&self) {
        if self.table.borrow().is_some() {
            return;
        }
        let mut table = [Effective::Ignore; KIND_COUNT];
        for k in Kind::ALL {
            table[k.index()] = self.effective_severity(k);
        }
        *self.table.borrow_mut() = Some(table);
    }

    fn set_override(&self, kind: Kind, severity: Override) -> Result<(), PolicyError> {
        if kind.default_severity() == Severity::Fatal && severity != Override::Error {
            return Err(PolicyError::IllegalDemotion { kind: kind.symbolic() });
        }
        self.materialize_if_needed();
        let mut table = self.table.borrow_mut();
        table.as_mut().unwrap()[kind.index()] = severity.into();
        Ok(())
    }

    pub fn is_skipped(&self, id: &crate::object::ObjectId) -> bool {
        match self.skiplist.borrow_mut().as_mut() {
            Some(list) => list.contains(id),
            None => false,
        }
    }

    pub fn add_to_skiplist(&self, id: crate::object::ObjectId) {
        self.skiplist.borrow_mut().get_or_insert_with(SkipList::new).push(id);
    }

    fn load_skiplist_bytes(&self, contents: &[u8]) -> Result<(), PolicyError> {
        let mut guard = self.skiplist.borrow_mut();
        let list = guard.get_or_insert_with(SkipList::new);
        list.load(contents)
    }

    fn load_skiplist_file(&self, path: &str) -> Result<(), PolicyError> {
        let contents = std::fs::read(path)
            .map_err(|source| PolicyError::SkipListIo { path: path.to_string(), source })?;
        self.load_skiplist_bytes(&contents)
    }

    /// Parses a severity-override string: whitespace/comma/pipe-separated
    /// tokens of the form `skiplist=<path>` or `<kind>{=|:}<severity>`.
    pub fn apply_overrides(&self, values: &str) -> Result<(), PolicyError> {
        for token in values.split(|c: char| c == ' ' || c == ',' || c == '|') {
            if token.is_empty() {
                continue;
            }
            let delim_pos = token.find(['=', ':']);
            let (key_raw, rest) = match delim_pos {
                Some(pos) => (&token[..pos], Some(&token[pos + 1..])),
                None => (token, None),
            };
            let key = key_raw.to_ascii_lowercase();

            if key == "skiplist" {
                let path = rest.filter(|p| !p.is_empty()).ok_or(PolicyError::SkipListMissingPath)?;
                self.load_skiplist_file(path)?;
                continue;
            }

            let value = rest.ok_or_else(|| PolicyError::UnknownToken(token.to_string()))?;
            let kind = Kind::parse(&key).ok_or_else(|| PolicyError::UnknownKind(key_raw.to_string()))?;
            let severity =
                Override::parse(value).ok_or_else(|| PolicyError::InvalidSeverity(value.to_string()))?;
            self.set_override(kind, severity)?;
        }
        Ok(())
    }
}
