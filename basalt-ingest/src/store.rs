//! Data-store abstraction for fetching backing files.
//!
//! The ingest pipeline only ever sees a local file: remote objects are
//! staged into uniquely named temp files by [`DataStore::copy`], and the
//! caller unlinks the copy when its work unit finishes. The crate ships the
//! local-filesystem implementation; object-store clients (S3, GCS) are
//! registered by the embedding process through the [`StoreFactory`].

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use basalt_meta::DataSource;
use basalt_result::{Error, Result};

/// Directory-listing entry.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub is_dir: bool,
    /// Modification time in epoch seconds.
    pub mtime: i64,
    pub size: u64,
    /// Key relative to the store's domain.
    pub name: String,
    pub domain: String,
}

/// A file-backed data source addressed by string keys.
pub trait DataStore: Send + Sync {
    /// List entries under a key prefix.
    fn list(&self, prefix: &str) -> Result<Vec<FileInfo>>;

    /// Stage the object behind `key` into a freshly created, uniquely named
    /// local temp file. The caller owns the returned path and is expected
    /// to unlink it.
    fn copy(&self, key: &str) -> Result<PathBuf>;

    /// Read up to `buf.len()` bytes from the start of the object.
    fn read(&self, key: &str, buf: &mut [u8]) -> Result<usize>;

    /// Copy `from` to `to` within the store.
    fn sync(&self, from: &str, to: &str, recursive: bool) -> Result<()>;
}

/// Builds the store client for a `(source, domain)` pair.
pub type StoreFactory = Box<dyn Fn(DataSource, &str) -> Result<Box<dyn DataStore>> + Send + Sync>;

/// Factory that serves local-filesystem domains and rejects everything else.
pub fn default_store_factory() -> StoreFactory {
    Box::new(|source, domain| match source {
        DataSource::Local => Ok(Box::new(LocalStore::new(domain)) as Box<dyn DataStore>),
        other => Err(Error::InvalidArgumentError(format!(
            "no data store client registered for source {other:?}"
        ))),
    })
}

/// Local filesystem rooted at a domain directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl DataStore for LocalStore {
    fn list(&self, prefix: &str) -> Result<Vec<FileInfo>> {
        let dir = self.resolve(prefix);
        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            let mtime = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0);
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let name = if prefix.is_empty() {
                file_name
            } else {
                format!("{}/{}", prefix.trim_end_matches('/'), file_name)
            };
            entries.push(FileInfo {
                is_dir: meta.is_dir(),
                mtime,
                size: meta.len(),
                name,
                domain: self.root.display().to_string(),
            });
        }
        Ok(entries)
    }

    fn copy(&self, key: &str) -> Result<PathBuf> {
        let mut from = File::open(self.resolve(key))?;
        let mut staged = tempfile::Builder::new().prefix("basalt-ingest-").tempfile()?;
        io::copy(&mut from, staged.as_file_mut())?;
        let (_file, path) = staged
            .keep()
            .map_err(|err| Error::Internal(format!("cannot keep staged file: {err}")))?;
        Ok(path)
    }

    fn read(&self, key: &str, buf: &mut [u8]) -> Result<usize> {
        let mut file = File::open(self.resolve(key))?;
        let mut total = 0;
        while total < buf.len() {
            let n = file.read(&mut buf[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }
        Ok(total)
    }

    fn sync(&self, from: &str, to: &str, recursive: bool) -> Result<()> {
        copy_path(&self.resolve(from), &self.resolve(to), recursive)
    }
}

fn copy_path(from: &Path, to: &Path, recursive: bool) -> Result<()> {
    if from.is_dir() {
        fs::create_dir_all(to)?;
        for entry in fs::read_dir(from)? {
            let entry = entry?;
            let source = entry.path();
            let target = to.join(entry.file_name());
            if source.is_dir() {
                if recursive {
                    copy_path(&source, &target, true)?;
                }
            } else {
                fs::copy(&source, &target)?;
            }
        }
    } else {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from, to)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn copy_stages_into_removable_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("data.tsv"), b"1\ta\n").unwrap();

        let store = LocalStore::new(dir.path());
        let staged = store.copy("data.tsv").unwrap();
        assert_ne!(staged, dir.path().join("data.tsv"));
        assert_eq!(fs::read(&staged).unwrap(), b"1\ta\n");

        fs::remove_file(&staged).unwrap();
    }

    #[test]
    fn list_and_read() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("part")).unwrap();
        fs::write(dir.path().join("part/a.csv"), b"hello").unwrap();

        let store = LocalStore::new(dir.path());
        let entries = store.list("part").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "part/a.csv");
        assert_eq!(entries[0].size, 5);
        assert!(!entries[0].is_dir);

        let mut buf = [0u8; 16];
        assert_eq!(store.read("part/a.csv", &mut buf).unwrap(), 5);
        assert_eq!(&buf[..5], b"hello");
    }

    #[test]
    fn sync_copies_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        let mut f = File::create(dir.path().join("src/nested/x.bin")).unwrap();
        f.write_all(b"xyz").unwrap();

        let store = LocalStore::new(dir.path());
        store.sync("src", "dst", true).unwrap();
        assert_eq!(fs::read(dir.path().join("dst/nested/x.bin")).unwrap(), b"xyz");
    }

    #[test]
    fn factory_only_serves_local() {
        let factory = default_store_factory();
        assert!(factory(DataSource::Local, "/tmp").is_ok());
        assert!(factory(DataSource::S3, "bucket").is_err());
        assert!(factory(DataSource::Kafka, "broker").is_err());
    }
}
