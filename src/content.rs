//! The host platform's content storage, seen from this crate.
//!
//! Post reading/writing, metadata and language-variant pairing all belong to
//! the platform; this crate only consumes them through [`ContentStore`].
//! [`MemoryContentStore`] is a reference implementation backing the tests and
//! the demo server.

use crate::errors::{Error, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

/// Platform bookkeeping keys that must never be submitted for translation.
pub const RESERVED_META_KEYS: &[&str] = &["_edit_lock", "_edit_last"];

#[derive(Debug, Clone)]
pub struct ContentRecord {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub excerpt: String,
    /// Publication state, e.g. "draft" or "publish".
    pub status: String,
    /// Record type, e.g. "post" or "page".
    pub kind: String,
}

#[derive(Debug, Clone)]
pub struct NewContentRecord {
    pub title: String,
    pub body: String,
    pub excerpt: String,
    pub status: String,
    pub kind: String,
}

#[derive(Debug, Clone)]
pub struct Attachment {
    pub id: i64,
    pub title: String,
    pub excerpt: String,
    pub alt: Option<String>,
}

/// Everything this crate needs from the host platform.
pub trait ContentStore: Send + Sync {
    fn get_record(&self, id: i64) -> Result<Option<ContentRecord>>;
    fn create_record(&self, record: NewContentRecord) -> Result<i64>;

    /// Write the three translated core fields in one call.
    fn apply_translation(&self, id: i64, title: &str, body: &str, excerpt: &str) -> Result<()>;

    /// All metadata of a record, reserved keys included; submission filters
    /// them out.
    fn get_meta(&self, id: i64) -> Result<BTreeMap<String, String>>;
    fn set_meta(&self, id: i64, key: &str, value: &str) -> Result<()>;

    fn attachments(&self, id: i64) -> Result<Vec<Attachment>>;

    /// Host language slug of a record, when the platform tracks one.
    fn language_of(&self, id: i64) -> Result<Option<String>>;
    fn set_language(&self, id: i64, host_code: &str) -> Result<()>;

    /// The record paired to `id` for `host_code`, `id` itself included when
    /// it already carries that language.
    fn variant(&self, id: i64, host_code: &str) -> Result<Option<i64>>;
    fn link_variants(&self, a: i64, b: i64) -> Result<()>;

    /// Host language slugs the platform is configured with.
    fn languages(&self) -> Vec<String>;

    /// Whether the platform keeps per-language content variants at all. When
    /// false, translations overwrite the source record in place.
    fn supports_variants(&self) -> bool;
}

// ==================== In-memory implementation ====================

#[derive(Default)]
struct Inner {
    next_id: i64,
    records: BTreeMap<i64, ContentRecord>,
    meta: HashMap<i64, BTreeMap<String, String>>,
    attachments: HashMap<i64, Vec<Attachment>>,
    record_language: HashMap<i64, String>,
    /// Variant pairing as an undirected adjacency set.
    links: HashMap<i64, HashSet<i64>>,
}

pub struct MemoryContentStore {
    inner: Mutex<Inner>,
    languages: Vec<String>,
    supports_variants: bool,
}

impl MemoryContentStore {
    pub fn new(languages: Vec<String>) -> Self {
        Self {
            inner: Mutex::new(Inner { next_id: 1, ..Inner::default() }),
            supports_variants: !languages.is_empty(),
            languages,
        }
    }

    /// A store without language-variant support.
    pub fn without_variants() -> Self {
        Self::new(Vec::new())
    }

    /// Seed a record with a language in one step.
    pub fn add_record(&self, record: NewContentRecord, language: Option<&str>) -> i64 {
        let id = self.create_record(record).expect("memory store is infallible");
        if let Some(language) = language {
            self.set_language(id, language).expect("memory store is infallible");
        }
        id
    }

    pub fn set_attachments(&self, id: i64, attachments: Vec<Attachment>) {
        self.inner.lock().unwrap().attachments.insert(id, attachments);
    }

    /// Records reachable from `id` through variant links, `id` included.
    fn variant_group(inner: &Inner, id: i64) -> HashSet<i64> {
        let mut seen = HashSet::from([id]);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(neighbors) = inner.links.get(&current) {
                for &next in neighbors {
                    if seen.insert(next) {
                        stack.push(next);
                    }
                }
            }
        }
        seen
    }
}

impl ContentStore for MemoryContentStore {
    fn get_record(&self, id: i64) -> Result<Option<ContentRecord>> {
        Ok(self.inner.lock().unwrap().records.get(&id).cloned())
    }

    fn create_record(&self, record: NewContentRecord) -> Result<i64> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.records.insert(
            id,
            ContentRecord {
                id,
                title: record.title,
                body: record.body,
                excerpt: record.excerpt,
                status: record.status,
                kind: record.kind,
            },
        );
        Ok(id)
    }

    fn apply_translation(&self, id: i64, title: &str, body: &str, excerpt: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .records
            .get_mut(&id)
            .ok_or_else(|| Error::Content(format!("no content record {id}")))?;
        record.title = title.to_string();
        record.body = body.to_string();
        record.excerpt = excerpt.to_string();
        Ok(())
    }

    fn get_meta(&self, id: i64) -> Result<BTreeMap<String, String>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .meta
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    fn set_meta(&self, id: i64, key: &str, value: &str) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .meta
            .entry(id)
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn attachments(&self, id: i64) -> Result<Vec<Attachment>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .attachments
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    fn language_of(&self, id: i64) -> Result<Option<String>> {
        Ok(self.inner.lock().unwrap().record_language.get(&id).cloned())
    }

    fn set_language(&self, id: i64, host_code: &str) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .record_language
            .insert(id, host_code.to_string());
        Ok(())
    }

    fn variant(&self, id: i64, host_code: &str) -> Result<Option<i64>> {
        let inner = self.inner.lock().unwrap();
        let group = Self::variant_group(&inner, id);
        Ok(group
            .into_iter()
            .find(|member| inner.record_language.get(member).map(String::as_str) == Some(host_code)))
    }

    fn link_variants(&self, a: i64, b: i64) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.links.entry(a).or_default().insert(b);
        inner.links.entry(b).or_default().insert(a);
        Ok(())
    }

    fn languages(&self) -> Vec<String> {
        self.languages.clone()
    }

    fn supports_variants(&self) -> bool {
        self.supports_variants
    }
}
