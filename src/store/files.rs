// RKSOK — Text-file Phonebook Store
//
// One `<name>.txt` file per record inside a phonebook directory. Writes go to
// a uniquely named temp file that is renamed over the target, so a reader or
// a concurrent writer never observes a half-written record.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::repository::PhonebookStore;
use super::StoreError;

const RECORD_EXTENSION: &str = "txt";

/// Directory-backed phonebook.
pub struct FilePhonebookStore {
    dir: PathBuf,
}

impl FilePhonebookStore {
    /// Use `dir` as the phonebook, creating it if missing.
    pub fn new(dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&dir)?;
        tracing::info!(dir = %dir.display(), "File phonebook ready");
        Ok(Self { dir })
    }

    /// The directory holding record files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve the file for a record. Names that would escape the directory
    /// are refused.
    fn record_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        if name.contains(['/', '\\', '\0']) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", name, RECORD_EXTENSION)))
    }
}

impl PhonebookStore for FilePhonebookStore {
    fn fetch(&self, name: &str) -> Result<Option<String>, StoreError> {
        let path = self.record_path(name)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, name: &str, payload: &str) -> Result<(), StoreError> {
        let path = self.record_path(name)?;
        let tmp = self.dir.join(format!(".{}.tmp", Uuid::new_v4()));

        let result = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(payload.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        })();

        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        tracing::debug!(name, "Record file written");
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let path = self.record_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
