// File: src/persistence.rs
use crate::core::answer::{Answer, AnswerKind};
use crate::core::game::{HistoryEntry, ProgressObserver};
use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

const PROGRESS_FILE: &str = "progress.bin";

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes through a temporary file in the target directory, then renames it
/// over `path`. On error `path` is left untouched.
pub fn write_atomically<F>(path: &Path, write: F) -> StoreResult<()>
where
    F: FnOnce(&mut BufWriter<&NamedTempFile>) -> StoreResult<()>,
{
    let parent_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir).map_err(io_error(parent_dir))?;

    let temp_file = NamedTempFile::new_in(parent_dir).map_err(io_error(parent_dir))?;
    {
        let mut writer = BufWriter::new(&temp_file);
        write(&mut writer)?;
        writer.flush().map_err(io_error(path))?;
    }
    temp_file
        .persist(path)
        .map_err(|e| io_error(path)(e.error))?;
    Ok(())
}

/// Pretty-printed JSON, written atomically.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StoreResult<()> {
    write_atomically(path, |writer| {
        serde_json::to_writer_pretty(writer, value)?;
        Ok(())
    })
}

pub fn save_bincode<T: Serialize + ?Sized>(path: &Path, value: &T) -> StoreResult<()> {
    write_atomically(path, |writer| {
        bincode::serialize_into(writer, value)?;
        Ok(())
    })
}

/// `Ok(None)` when nothing was saved at `path` yet.
pub fn load_bincode<T: for<'de> Deserialize<'de>>(path: &Path) -> StoreResult<Option<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error(path)(e)),
    };
    let reader = BufReader::new(file);
    Ok(Some(bincode::deserialize_from(reader)?))
}

/// Key/value byte store used to keep downloaded assets available offline.
pub trait CacheStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;
    fn put(&mut self, key: &str, bytes: &[u8]) -> StoreResult<()>;
}

/// One file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    root: PathBuf,
}

impl FileCacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
            .collect();
        self.root.join(format!("{file_name}.cache"))
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    fn put(&mut self, key: &str, bytes: &[u8]) -> StoreResult<()> {
        let path = self.path_for(key);
        write_atomically(&path, |writer| writer.write_all(bytes).map_err(io_error(&path)))
    }
}

/// The answer and committed guesses of the last session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedProgress {
    pub answer: Answer,
    pub history: Vec<HistoryEntry>,
}

impl SavedProgress {
    /// Whether this record belongs to the daily puzzle `answer`. A changed
    /// dictionary or puzzle length can give the same day another answer.
    pub fn is_same_daily(&self, answer: &Answer) -> bool {
        self.answer.kind == AnswerKind::Daily
            && answer.kind == AnswerKind::Daily
            && self.answer.index == answer.index
            && self.answer.transcript == answer.transcript
    }
}

/// Saves and restores a single [`SavedProgress`] record.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(PROGRESS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, progress: &SavedProgress) -> StoreResult<()> {
        save_bincode(&self.path, progress)
    }

    pub fn load(&self) -> StoreResult<Option<SavedProgress>> {
        load_bincode(&self.path)
    }

    /// History to restore when starting the daily puzzle `answer`.
    ///
    /// A saved record for the same day is returned as is. Any other record is
    /// replaced by an empty one for `answer`. An unreadable record counts as
    /// no record.
    pub fn restore_daily(&self, answer: &Answer) -> Vec<HistoryEntry> {
        match self.load() {
            Ok(Some(saved)) if saved.is_same_daily(answer) => {
                debug!(index = ?answer.index, guesses = saved.history.len(), "Restoring daily progress");
                return saved.history;
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, path = %self.path.display(), "Discarding unreadable progress"),
        }
        self.reset_daily(answer);
        Vec::new()
    }

    /// Replaces whatever is saved with an empty record for `answer`.
    pub fn reset_daily(&self, answer: &Answer) {
        let fresh = SavedProgress {
            answer: answer.clone(),
            history: Vec::new(),
        };
        if let Err(e) = self.save(&fresh) {
            warn!(error = %e, "Failed to reset saved progress");
        }
    }
}

/// Saves progress after every committed guess. Failures are logged, never
/// surfaced to the game.
pub struct ProgressCache {
    store: ProgressStore,
}

impl ProgressCache {
    pub fn new(store: ProgressStore) -> Self {
        Self { store }
    }
}

impl ProgressObserver for ProgressCache {
    fn history_changed(&mut self, answer: &Answer, history: &[HistoryEntry]) {
        let progress = SavedProgress {
            answer: answer.clone(),
            history: history.to_vec(),
        };
        if let Err(e) = self.store.save(&progress) {
            warn!(error = %e, path = %self.store.path().display(), "Failed to save progress");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transcript::Transcript;

    fn daily(index: i64) -> Answer {
        Answer {
            transcript: Transcript::parse("k aa t").unwrap(),
            words: vec!["cat".into()],
            kind: AnswerKind::Daily,
            index: Some(index),
        }
    }

    fn entry(word: &str, raw: &str) -> HistoryEntry {
        HistoryEntry {
            transcript: Transcript::parse(raw).unwrap(),
            word: word.into(),
        }
    }

    #[test]
    fn progress_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::in_dir(dir.path());
        assert_eq!(store.load().unwrap(), None);

        let progress = SavedProgress {
            answer: daily(12),
            history: vec![entry("bat", "b aa t")],
        };
        store.save(&progress).unwrap();
        assert_eq!(store.load().unwrap(), Some(progress));
    }

    #[test]
    fn same_day_restores_other_day_resets() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::in_dir(dir.path());
        let mut cache = ProgressCache::new(store.clone());
        cache.history_changed(&daily(3), &[entry("bat", "b aa t")]);

        assert_eq!(store.restore_daily(&daily(3)), vec![entry("bat", "b aa t")]);
        assert!(store.restore_daily(&daily(4)).is_empty());
        // The stale record was replaced.
        assert!(store.restore_daily(&daily(3)).is_empty());
        assert_eq!(store.load().unwrap().unwrap().answer.index, Some(4));
    }

    #[test]
    fn same_day_with_another_answer_resets() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::in_dir(dir.path());
        let mut cache = ProgressCache::new(store.clone());
        cache.history_changed(&daily(3), &[entry("bat", "b aa t")]);

        let mut changed = daily(3);
        changed.transcript = Transcript::parse("k aa t s").unwrap();
        assert!(store.restore_daily(&changed).is_empty());
        assert_eq!(store.load().unwrap().unwrap().answer, changed);
    }

    #[test]
    fn random_records_are_never_restored() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::in_dir(dir.path());
        let mut random = daily(3);
        random.kind = AnswerKind::Random;
        store
            .save(&SavedProgress {
                answer: random,
                history: vec![entry("bat", "b aa t")],
            })
            .unwrap();
        assert!(store.restore_daily(&daily(3)).is_empty());
    }

    #[test]
    fn corrupt_progress_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::in_dir(dir.path());
        fs::write(store.path(), b"abc").unwrap();
        assert!(store.load().is_err());
        assert!(store.restore_daily(&daily(1)).is_empty());
        assert!(store.load().unwrap().is_some());
    }

    #[test]
    fn file_cache_store_keeps_bytes_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = FileCacheStore::new(dir.path());
        assert_eq!(cache.get("dictionary-2022-11-12-1").unwrap(), None);
        cache.put("dictionary-2022-11-12-1", b"{}").unwrap();
        cache.put("dictionary/../other", b"[]").unwrap();
        assert_eq!(cache.get("dictionary-2022-11-12-1").unwrap(), Some(b"{}".to_vec()));
        assert_eq!(cache.get("dictionary/../other").unwrap(), Some(b"[]".to_vec()));
    }

    #[test]
    fn failed_write_leaves_target_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        fs::write(&path, b"old").unwrap();
        let result = write_atomically(&path, |_| {
            Err(StoreError::Io {
                path: PathBuf::from("x"),
                source: io::Error::new(io::ErrorKind::Other, "boom"),
            })
        });
        assert!(result.is_err());
        assert_eq!(fs::read(&path).unwrap(), b"old");
    }
}
