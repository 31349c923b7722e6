//! Annotation persistence
//!
//! Notes are stored per document URL in a plain key/value store. The value is
//! a JSON array of stored notes, each holding the serialized range strings and
//! the comments:
//!
//! ```text
//! [{"ranges":["0/2:0,0/4:3"],"comments":[{"author":"ann","text":"…","created":1700000000}]}]
//! ```
//!
//! Loading resolves every range against the current registry. An annotation
//! whose range no longer resolves is dropped on its own and logged; the rest
//! of the batch still loads.

use super::{Comment, Note};
use crate::error::{RangeError, StoreError};
use crate::range::Range;
use crate::registry::SentenceRegistry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Minimal string key/value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    /// Returns whether the key existed
    fn remove(&mut self, key: &str) -> Result<bool, StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.remove(key).is_some())
    }
}

/// A key/value store backed by one JSON object file.
///
/// The file is read on every access so that several processes appending notes
/// see each other's writes. A missing file is an empty store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut entries = self.read()?;
        entries.insert(key.to_string(), value);
        self.write(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.read()?;
        let existed = entries.remove(key).is_some();
        if existed {
            self.write(&entries)?;
        }
        Ok(existed)
    }
}

/// On-disk shape of one note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredNote {
    pub ranges: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// A note whose ranges all resolved
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedNote {
    pub ranges: Vec<Range>,
    pub comments: Vec<Comment>,
}

/// An annotation dropped while loading
#[derive(Debug, Clone, PartialEq)]
pub struct StaleAnnotation {
    /// Position of the note in the stored batch
    pub index: usize,
    pub range: String,
    pub error: RangeError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub notes: Vec<LoadedNote>,
    pub stale: Vec<StaleAnnotation>,
}

/// Notes keyed by document URL
#[derive(Debug, Clone)]
pub struct AnnotationStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> AnnotationStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Raw stored notes for a document
    pub fn stored(&self, url: &str) -> Result<Vec<StoredNote>, StoreError> {
        match self.store.get(url)? {
            Some(value) => Ok(serde_json::from_str(&value)?),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the stored notes of a document.
    ///
    /// Notes whose ranges no longer serialize against `registry` are skipped.
    /// Returns the number of notes written.
    pub fn save<'a>(
        &mut self,
        url: &str,
        notes: impl IntoIterator<Item = &'a Note>,
        registry: &SentenceRegistry,
    ) -> Result<usize, StoreError> {
        let mut stored = Vec::new();
        for note in notes {
            match store_note(note, registry) {
                Ok(entry) => stored.push(entry),
                Err(err) => warn!(note = %note.id, error = %err, "skipping unserializable note"),
            }
        }
        let written = stored.len();
        self.store.set(url, serde_json::to_string(&stored)?)?;
        debug!(url, written, "saved annotations");
        Ok(written)
    }

    /// Append one note to the stored batch, leaving existing entries untouched
    pub fn append(
        &mut self,
        url: &str,
        note: &Note,
        registry: &SentenceRegistry,
    ) -> Result<(), crate::error::Error> {
        let entry = store_note(note, registry)?;
        let mut stored = self.stored(url)?;
        stored.push(entry);
        self.store.set(url, serde_json::to_string(&stored).map_err(StoreError::from)?)?;
        Ok(())
    }

    /// Resolve the stored notes of a document against the current registry
    pub fn load(&self, url: &str, registry: &SentenceRegistry) -> Result<LoadReport, StoreError> {
        let mut report = LoadReport::default();
        for (index, entry) in self.stored(url)?.into_iter().enumerate() {
            match resolve_note(&entry, registry) {
                Ok(ranges) => report.notes.push(LoadedNote {
                    ranges,
                    comments: entry.comments,
                }),
                Err((range, error)) => {
                    warn!(url, index, range = %range, error = %error, "dropping stale annotation");
                    report.stale.push(StaleAnnotation {
                        index,
                        range,
                        error,
                    });
                }
            }
        }
        debug!(
            url,
            loaded = report.notes.len(),
            stale = report.stale.len(),
            "loaded annotations"
        );
        Ok(report)
    }

    pub fn clear(&mut self, url: &str) -> Result<bool, StoreError> {
        self.store.remove(url)
    }
}

fn store_note(note: &Note, registry: &SentenceRegistry) -> Result<StoredNote, RangeError> {
    let ranges = note
        .ranges
        .iter()
        .map(|range| range.serialize(registry))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(StoredNote {
        ranges,
        comments: note.comments.clone(),
    })
}

fn resolve_note(
    entry: &StoredNote,
    registry: &SentenceRegistry,
) -> Result<Vec<Range>, (String, RangeError)> {
    entry
        .ranges
        .iter()
        .map(|data| Range::deserialize(data, registry).map_err(|err| (data.clone(), err)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::NoteBook;
    use crate::registry::{tokenize, Rank, Sentence, SentenceId};

    const URL: &str = "https://example.com/article";

    fn registry(texts: &[&str]) -> SentenceRegistry {
        SentenceRegistry::new(
            texts
                .iter()
                .enumerate()
                .map(|(i, text)| Sentence::new(SentenceId(i), 0, Rank::new(50), tokenize(text)))
                .collect(),
        )
    }

    #[test]
    fn test_save_then_load() {
        let reg = registry(&["The quick fox jumps.", "It lands."]);
        let mut book = NoteBook::new();
        book.add(
            vec![Range::single(SentenceId(0), 4, 13).unwrap()],
            vec![Comment::at("ann", "nice", 5)],
        );

        let mut store = AnnotationStore::new(MemoryStore::new());
        assert_eq!(store.save(URL, book.iter(), &reg).unwrap(), 1);
        assert_eq!(
            store.stored(URL).unwrap()[0].ranges,
            vec!["0/2:0,0/4:3".to_string()]
        );

        let report = store.load(URL, &reg).unwrap();
        assert!(report.stale.is_empty());
        assert_eq!(report.notes.len(), 1);
        assert_eq!(report.notes[0].ranges[0].text(&reg), "quick fox");
        assert_eq!(report.notes[0].comments, vec![Comment::at("ann", "nice", 5)]);
    }

    #[test]
    fn test_stale_annotation_is_dropped_alone() {
        let reg = registry(&["Only one sentence."]);
        let mut kv = MemoryStore::new();
        kv.set(
            URL,
            r#"[{"ranges":["0/0:0,0/2:3"]},{"ranges":["3/0:0,3/0:2"]},{"ranges":["0/4:0,0/4:8"]}]"#
                .to_string(),
        )
        .unwrap();

        let report = AnnotationStore::new(kv).load(URL, &reg).unwrap();
        assert_eq!(report.notes.len(), 2);
        assert_eq!(report.stale.len(), 1);
        assert_eq!(report.stale[0].index, 1);
        assert_eq!(report.stale[0].error, RangeError::Stale(SentenceId(3)));
    }

    #[test]
    fn test_missing_document_loads_empty() {
        let store = AnnotationStore::new(MemoryStore::new());
        assert_eq!(
            store.load(URL, &registry(&["A."])).unwrap(),
            LoadReport::default()
        );
    }

    #[test]
    fn test_json_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");

        let mut first = JsonFileStore::new(&path);
        assert_eq!(first.get("a").unwrap(), None);
        first.set("a", "1".to_string()).unwrap();
        first.set("b", "2".to_string()).unwrap();

        let mut second = JsonFileStore::new(&path);
        assert_eq!(second.get("a").unwrap().as_deref(), Some("1"));
        assert!(second.remove("a").unwrap());
        assert!(!second.remove("a").unwrap());
        assert_eq!(first.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_append_keeps_existing_entries() {
        let reg = registry(&["The quick fox jumps."]);
        let mut kv = MemoryStore::new();
        kv.set(URL, r#"[{"ranges":["9/0:0,9/0:1"]}]"#.to_string())
            .unwrap();
        let mut store = AnnotationStore::new(kv);

        let mut book = NoteBook::new();
        let id = book.add(vec![Range::single(SentenceId(0), 0, 3).unwrap()], Vec::new());
        store.append(URL, book.get(id).unwrap(), &reg).unwrap();

        let stored = store.stored(URL).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].ranges, vec!["9/0:0,9/0:1".to_string()]);
        assert_eq!(stored[1].ranges, vec!["0/0:0,0/0:3".to_string()]);
    }
}
