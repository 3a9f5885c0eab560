use std::{fs, io::Write, path::{Path, PathBuf}};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::error::ProviderError;

/// On-disk store of raw service responses keyed by a hash of the request.
#[derive(Debug, Clone)]
pub(crate) struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    pub(crate) fn new(dir: &Path) -> Self {
        Self { dir: dir.to_path_buf() }
    }

    /// Hex SHA-256 of the request URL and body.
    pub(crate) fn key(url: &str, body: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        hasher.update([0u8]);
        hasher.update(body.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Stored response for `key`, if any.
    pub(crate) fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ProviderError> {
        match fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Store a response (write to temp file, then atomic rename).
    pub(crate) fn put(&self, key: &str, bytes: &[u8]) -> Result<(), ProviderError> {
        fs::create_dir_all(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all().ok(); // best-effort fsync file
        tmp.persist(self.path(key)).map_err(|e| e.error)?;
        Ok(())
    }
}
