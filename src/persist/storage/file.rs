use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use fs2::FileExt;

use super::{Storage, StorageError};

/// One JSON file per key inside a directory.
///
/// Writes go to a temporary file that is renamed over the target while
/// an exclusive lock is held on `<key>.lock`, so a reader never sees a
/// half-written snapshot and two processes never interleave writes.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File backing `key`. Characters that are awkward in file names
    /// (`persist:root`) are replaced.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }

    fn lock(&self, key: &str) -> Result<File, StorageError> {
        let path = self.dir.join(format!("{}.lock", file_stem(key)));
        let write_err = |source| StorageError::Write {
            key: key.to_string(),
            path: path.clone(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(write_err)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(write_err)?;
        file.lock_exclusive().map_err(write_err)?;
        Ok(file)
    }
}

fn file_stem(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let write_err = |source| StorageError::Write {
            key: key.to_string(),
            path: path.clone(),
            source,
        };

        let lock = self.lock(key)?;
        let mut file = File::create(&tmp).map_err(write_err)?;
        file.write_all(value).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        drop(file);
        fs::rename(&tmp, &path).map_err(write_err)?;
        FileExt::unlock(&lock).map_err(write_err)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let lock = self.lock(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(StorageError::Write {
                    key: key.to_string(),
                    path,
                    source,
                })
            }
        }
        FileExt::unlock(&lock).map_err(|source| StorageError::Write {
            key: key.to_string(),
            path: self.path_for(key),
            source,
        })?;
        Ok(())
    }
}
