use crate::error::{Result, StudentDbError};
use crate::record::Collection;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Loads and saves the whole student collection as one document.
/// There is no incremental API: every save rewrites everything.
pub trait RecordStore {
    /// Read and parse the persisted document.
    /// Fails with `Storage` if it is missing or malformed.
    fn load(&self) -> Result<Collection>;

    /// Overwrite the persisted document with `collection`.
    fn save(&self, collection: &Collection) -> Result<()>;
}

/// A store backed by a single JSON file on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write an empty collection if no document exists yet.
    /// Returns true if a new document was created.
    pub fn create_if_missing(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        log::info!("Creating empty student document at {}", self.path.display());
        self.save(&Collection::new())?;
        Ok(true)
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self) -> Result<Collection> {
        log::debug!("Loading students from {}", self.path.display());
        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            StudentDbError::Storage(format!("cannot read {}: {e}", self.path.display()))
        })?;
        parse_document(&raw)
    }

    fn save(&self, collection: &Collection) -> Result<()> {
        let body = render_document(collection)?;
        let dir = self.parent_dir();
        std::fs::create_dir_all(dir)?;

        // temp file + fsync + rename
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(body.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StudentDbError::Io(e.error))?;

        log::debug!(
            "Saved {} students to {}",
            collection.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// An in-memory store holding the serialized document, for tests and
/// embedding. `None` means no document exists.
#[derive(Default)]
pub struct MemoryStore {
    document: Mutex<Option<String>>,
}

impl MemoryStore {
    /// A store containing an empty collection.
    pub fn new() -> Self {
        MemoryStore {
            document: Mutex::new(Some("{}".to_string())),
        }
    }

    /// A store with no document at all; `load` fails until the first save.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A store seeded with raw document text, which may be malformed.
    pub fn with_document(raw: impl Into<String>) -> Self {
        MemoryStore {
            document: Mutex::new(Some(raw.into())),
        }
    }

    /// The current raw document text.
    pub fn document(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // Saves swap the whole string; a poisoned lock still holds a full document.
        self.document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> Result<Collection> {
        match self.lock().as_deref() {
            Some(raw) => parse_document(raw),
            None => Err(StudentDbError::Storage("no student document".into())),
        }
    }

    fn save(&self, collection: &Collection) -> Result<()> {
        let body = render_document(collection)?;
        *self.lock() = Some(body);
        Ok(())
    }
}

fn parse_document(raw: &str) -> Result<Collection> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| StudentDbError::Storage(format!("document is not valid JSON: {e}")))?;
    Collection::from_json(value)
}

fn render_document(collection: &Collection) -> Result<String> {
    let mut body = serde_json::to_string_pretty(&collection.to_json()?)?;
    body.push('\n');
    Ok(body)
}
