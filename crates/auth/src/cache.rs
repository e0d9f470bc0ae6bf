// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk OAuth token cache shared between client processes.
//!
//! The file is YAML keyed by audience:
//!
//! ```yaml
//! zeebe.example.com:
//!   auth:
//!     credentials:
//!       access_token: eyJ...
//!       token_type: Bearer
//!       expiry: 2026-10-19T12:00:00Z
//! ```
//!
//! All reads and writes go through one lock; writes replace the file
//! atomically via a temp file and rename.

use crate::error::CacheError;
use crate::token::CachedToken;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use zb_core::env::{self, EnvLookup};

/// Directory and file under the home directory used when no path is set.
pub const DEFAULT_CACHE_DIR: &str = ".camunda";
pub const DEFAULT_CACHE_FILE: &str = "credentials";

const DIR_MODE: u32 = 0o770;
const FILE_MODE: u32 = 0o660;
const WRITE_MODE: u32 = 0o600;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    auth: AuthEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AuthEntry {
    credentials: CachedToken,
}

#[derive(Debug)]
pub struct OAuthCredentialsCache {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, CachedToken>>,
}

impl OAuthCredentialsCache {
    /// Open the cache at `path`, or at the resolved default location.
    ///
    /// Creates the parent directory and an empty file when missing. Fails
    /// when the path names a directory.
    pub fn open(path: Option<PathBuf>, env: &dyn EnvLookup) -> Result<Self, CacheError> {
        let path = resolve_path(path, env)?;
        ensure_cache_file(&path)?;
        let cache = Self { path, entries: Mutex::new(BTreeMap::new()) };
        cache.refresh()?;
        Ok(cache)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reload every entry from disk, replacing the in-memory view.
    pub fn refresh(&self) -> Result<(), CacheError> {
        let mut entries = self.entries.lock();
        *entries = read_entries(&self.path)?;
        Ok(())
    }

    pub fn get(&self, audience: &str) -> Option<CachedToken> {
        self.entries.lock().get(audience).cloned()
    }

    /// Store `token` for `audience` and persist the whole cache.
    pub fn update(&self, audience: &str, token: CachedToken) -> Result<(), CacheError> {
        let mut entries = self.entries.lock();
        entries.insert(audience.to_string(), token);
        write_entries(&self.path, &entries)
    }
}

/// `ZEEBE_CLIENT_CONFIG_PATH`, then the explicit path, then
/// `$HOME/.camunda/credentials`.
pub fn resolve_path(explicit: Option<PathBuf>, env: &dyn EnvLookup) -> Result<PathBuf, CacheError> {
    if let Some(path) = env.non_empty(env::CLIENT_CONFIG_PATH) {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = explicit.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }
    env.home_dir()
        .map(|home| home.join(DEFAULT_CACHE_DIR).join(DEFAULT_CACHE_FILE))
        .ok_or(CacheError::NoPath)
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CacheError + '_ {
    move |source| CacheError::Io { path: path.to_path_buf(), source }
}

fn ensure_cache_file(path: &Path) -> Result<(), CacheError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        match std::fs::metadata(dir) {
            Ok(meta) if !meta.is_dir() => return Err(CacheError::NotADirectory(dir.to_path_buf())),
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                std::fs::create_dir_all(dir).map_err(io_error(dir))?;
                set_mode(dir, DIR_MODE)?;
            }
            Err(e) => return Err(io_error(dir)(e)),
        }
    }

    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Err(CacheError::IsDirectory(path.to_path_buf())),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
                .map_err(io_error(path))?;
            set_mode(path, FILE_MODE)
        }
        Err(e) => Err(io_error(path)(e)),
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, CachedToken>, CacheError> {
    let content = std::fs::read_to_string(path).map_err(io_error(path))?;
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let file: BTreeMap<String, CacheEntry> = serde_yaml::from_str(&content)
        .map_err(|source| CacheError::Yaml { path: path.to_path_buf(), source })?;
    Ok(file.into_iter().map(|(aud, entry)| (aud, entry.auth.credentials)).collect())
}

fn write_entries(path: &Path, entries: &BTreeMap<String, CachedToken>) -> Result<(), CacheError> {
    let file: BTreeMap<&str, CacheEntry> = entries
        .iter()
        .map(|(aud, token)| {
            (aud.as_str(), CacheEntry { auth: AuthEntry { credentials: token.clone() } })
        })
        .collect();
    let yaml = serde_yaml::to_string(&file)
        .map_err(|source| CacheError::Yaml { path: path.to_path_buf(), source })?;

    // one temp file per write, next to the target
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_error(dir))?;
    set_mode(tmp.path(), WRITE_MODE)?;
    tmp.write_all(yaml.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(io_error(path))?;
    tmp.persist(path).map_err(|e| io_error(path)(e.error))?;
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<(), CacheError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(io_error(path))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<(), CacheError> {
    Ok(())
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
