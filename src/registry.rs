use std::{collections::HashMap, fs, path::Path};

use dashmap::{mapref::entry::Entry, DashMap};

use crate::{
    error::{PersistenceError, ShortenError},
    keygen::KeyGenerator,
    snapshot,
};

/// How many fresh keys `shorten` draws before giving up on a full key space.
pub const MAX_KEY_ATTEMPTS: usize = 10;

/// Thread-safe mapping short_key -> original_url.
///
/// Backed by a DashMap so concurrent shorten and resolve calls never race on
/// the underlying table. Keys are only ever written into vacant slots, so an
/// existing mapping is never replaced by a later shorten.
#[derive(Debug)]
pub struct UrlRegistry {
    urls: DashMap<String, String>,
    keys: KeyGenerator,
}

impl UrlRegistry {
    pub fn new() -> Self {
        Self::with_generator(KeyGenerator::new())
    }

    pub fn with_generator(keys: KeyGenerator) -> Self {
        Self {
            urls: DashMap::new(),
            keys,
        }
    }

    /// Store `original_url` under a freshly generated key and return the key.
    ///
    /// Any non-empty string is accepted and stored verbatim.
    pub fn shorten(&self, original_url: &str) -> Result<String, ShortenError> {
        if original_url.is_empty() {
            return Err(ShortenError::InvalidInput);
        }

        for _ in 0..MAX_KEY_ATTEMPTS {
            match self.urls.entry(self.keys.generate()) {
                Entry::Vacant(slot) => {
                    let key = slot.key().clone();
                    slot.insert(original_url.to_owned());
                    tracing::debug!(%key, "shortened {}", original_url);
                    return Ok(key);
                }
                Entry::Occupied(slot) => {
                    tracing::warn!(key = %slot.key(), "short key collision, regenerating");
                }
            }
        }

        Err(ShortenError::KeySpaceExhausted(MAX_KEY_ATTEMPTS))
    }

    /// Look up the original URL for `short_key`. `None` means not found.
    pub fn resolve(&self, short_key: &str) -> Option<String> {
        self.urls.get(short_key).map(|v| v.clone())
    }

    /// Write every mapping to `path`, replacing whatever was there.
    ///
    /// The snapshot is written to a sibling temp file first and renamed into
    /// place, so an interrupted write leaves the previous snapshot intact.
    /// Returns the number of entries written.
    pub fn persist(&self, path: &Path) -> Result<usize, PersistenceError> {
        let urls: HashMap<String, String> = self
            .urls
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let bytes = snapshot::encode(&urls)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let tmp = tmp_path(path);
        fs::write(&tmp, bytes)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        Ok(urls.len())
    }

    /// Replace the in-memory mappings with the snapshot at `path`.
    ///
    /// Meant for startup: readers running concurrently may briefly observe an
    /// empty registry. On error the current mappings are left untouched.
    pub fn hydrate(&self, path: &Path) -> Result<usize, PersistenceError> {
        let bytes = fs::read(path)?;
        let urls = snapshot::decode(&bytes)?;
        let count = urls.len();

        self.urls.clear();
        for (key, url) in urls {
            self.urls.insert(key, url);
        }

        Ok(count)
    }

    /// Number of stored mappings.
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl Default for UrlRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn tmp_path(path: &Path) -> std::path::PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
