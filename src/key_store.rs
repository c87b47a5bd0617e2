//! On-disk tenant credential records.
//!
//! Layout: a 4-byte little-endian `u32` length followed by exactly that many payload
//! bytes. The payload is a JSON object `{"token": ..., "url": ...}`. Files written by
//! earlier deployments use the same layout and stay readable.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StorageError;

const PREFIX_LEN: usize = 4;

/// Remote credentials of one tenant database.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantKeyRecord {
    pub token: String,
    pub url: String,
}

impl TenantKeyRecord {
    #[must_use]
    pub fn new(token: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            url: url.into(),
        }
    }
}

impl std::fmt::Debug for TenantKeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantKeyRecord")
            .field("token", &"<redacted>")
            .field("url", &self.url)
            .finish()
    }
}

/// Write `payload` behind its length prefix, replacing any existing file.
///
/// The bytes land in a sibling temporary file that is renamed over `path`, so readers
/// never observe a half-written record.
///
/// # Errors
/// `StorageError::TooLarge` if the payload exceeds `u32::MAX` bytes, `StorageError::Io`
/// if the file cannot be written.
pub fn write(path: &Path, payload: &[u8]) -> Result<(), StorageError> {
    let len = u32::try_from(payload.len()).map_err(|_| StorageError::TooLarge(payload.len()))?;
    let tmp = temp_path(path);
    let io_err = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    let result = (|| -> std::io::Result<()> {
        let mut file = File::create(&tmp)?;
        file.write_all(&len.to_le_bytes())?;
        file.write_all(payload)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if let Err(source) = result {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(source));
    }

    debug!(path = %path.display(), bytes = payload.len(), "wrote credential file");
    Ok(())
}

/// Read the payload stored at `path`.
///
/// # Errors
/// `StorageError::NotFound` if there is no file, `StorageError::Corrupt` if the file holds
/// fewer bytes than its prefix declares, `StorageError::Io` for other read failures.
pub fn read(path: &Path) -> Result<Vec<u8>, StorageError> {
    let io_err = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    if !path.exists() {
        return Err(StorageError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let mut file = File::open(path).map_err(io_err)?;

    let mut prefix = Vec::with_capacity(PREFIX_LEN);
    (&mut file)
        .take(PREFIX_LEN as u64)
        .read_to_end(&mut prefix)
        .map_err(io_err)?;
    let prefix: [u8; PREFIX_LEN] = prefix.as_slice().try_into().map_err(|_| StorageError::Corrupt {
        path: path.to_path_buf(),
        declared: PREFIX_LEN as u64,
        available: prefix.len() as u64,
    })?;
    let declared = u64::from(u32::from_le_bytes(prefix));

    let mut payload = Vec::new();
    file.take(declared)
        .read_to_end(&mut payload)
        .map_err(io_err)?;
    if payload.len() as u64 != declared {
        return Err(StorageError::Corrupt {
            path: path.to_path_buf(),
            declared,
            available: payload.len() as u64,
        });
    }

    Ok(payload)
}

/// Serialize and persist a credential record.
///
/// # Errors
/// Any error from [`write`].
pub fn write_record(path: &Path, record: &TenantKeyRecord) -> Result<(), StorageError> {
    let payload = serde_json::to_vec(record).map_err(|source| StorageError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    write(path, &payload)
}

/// Load and decode a credential record.
///
/// # Errors
/// Any error from [`read`], or `StorageError::Decode` if the payload is not a record.
pub fn read_record(path: &Path) -> Result<TenantKeyRecord, StorageError> {
    let payload = read(path)?;
    serde_json::from_slice(&payload).map_err(|source| StorageError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

#[must_use]
pub fn exists(path: &Path) -> bool {
    path.is_file()
}

/// Delete a credential file.
///
/// # Errors
/// `StorageError::NotFound` if absent, `StorageError::Io` if removal fails.
pub fn remove(path: &Path) -> Result<(), StorageError> {
    fs::remove_file(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            StorageError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(format!(".tmp-{}", std::process::id()));
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_little_endian() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.bin");
        write(&path, b"abc").unwrap();
        let raw = fs::read(&path).unwrap();
        assert_eq!(raw, vec![3, 0, 0, 0, b'a', b'b', b'c']);
    }

    #[test]
    fn short_prefix_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.bin");
        fs::write(&path, [1u8, 0]).unwrap();
        assert!(matches!(
            read(&path),
            Err(StorageError::Corrupt { declared: 4, available: 2, .. })
        ));
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.bin");
        write(&path, b"payload").unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn record_debug_hides_token() {
        let record = TenantKeyRecord::new("jwt-secret", "libsql://a.turso.io");
        assert!(!format!("{record:?}").contains("jwt-secret"));
    }
}
