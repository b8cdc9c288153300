// File: src/assets.rs
//! Fetching the dictionary assets, with an offline-first local cache keyed by
//! asset version.

use crate::core::dictionary::{describe_version, AnswersAsset, AssetVersion, Dictionary, DictionaryAsset};
use crate::error::{DictionaryError, DictionaryResult};
use crate::persistence::CacheStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where the assets live and which version they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    #[serde(default)]
    pub version: Option<AssetVersion>,
    pub dictionary: String,
    #[serde(default)]
    pub answers: Option<String>,
}

impl AssetManifest {
    pub fn load(path: &Path) -> DictionaryResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| DictionaryError::Fetch {
            location: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(serde_json::from_str(&raw)?)
    }
}

pub trait AssetFetcher {
    fn fetch(&self, location: &str) -> DictionaryResult<Vec<u8>>;
}

/// Resolves locations relative to a directory.
#[derive(Debug, Clone)]
pub struct FsAssetFetcher {
    root: PathBuf,
}

impl FsAssetFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetFetcher for FsAssetFetcher {
    fn fetch(&self, location: &str) -> DictionaryResult<Vec<u8>> {
        let path = self.root.join(location);
        fs::read(&path).map_err(|e| DictionaryError::Fetch {
            location: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

pub fn cache_key(asset: &str, version: &AssetVersion) -> String {
    format!("{asset}-{version}")
}

/// Fetches, parses and caches one asset. A cached copy for the same version
/// wins over the network; a cached copy that no longer parses is refetched.
fn load_asset<T>(
    fetcher: &dyn AssetFetcher,
    cache: &mut dyn CacheStore,
    name: &str,
    location: &str,
    version: Option<&AssetVersion>,
) -> DictionaryResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    let key = version.map(|v| cache_key(name, v));

    if let Some(key) = key.as_deref() {
        match cache.get(key) {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(asset) => {
                    debug!(key, "Asset cache hit");
                    return Ok(asset);
                }
                Err(e) => warn!(key, error = %e, "Cached asset is corrupt, refetching"),
            },
            Ok(None) => debug!(key, "Asset cache miss"),
            Err(e) => warn!(key, error = %e, "Asset cache unavailable"),
        }
    }

    let bytes = fetcher.fetch(location)?;
    let asset = serde_json::from_slice(&bytes)?;
    if let Some(key) = key.as_deref() {
        if let Err(e) = cache.put(key, &bytes) {
            warn!(key, error = %e, "Failed to cache asset");
        }
    }
    Ok(asset)
}

/// Loads the dictionary (and curated answers, if the manifest names them).
pub fn load_dictionary(
    fetcher: &dyn AssetFetcher,
    cache: &mut dyn CacheStore,
    manifest: &AssetManifest,
) -> DictionaryResult<Dictionary> {
    let version = manifest.version.as_ref();
    info!(version = ?version, dictionary = %manifest.dictionary, "Loading assets");

    let dictionary: DictionaryAsset = load_asset(fetcher, cache, "dictionary", &manifest.dictionary, version)?;
    let answers: Option<AnswersAsset> = manifest
        .answers
        .as_deref()
        .map(|location| load_asset(fetcher, cache, "answers", location, version))
        .transpose()?;

    let dictionary = Dictionary::from_assets(dictionary, answers)?;
    if let Some(expected) = version {
        if dictionary.version() != Some(expected) {
            return Err(DictionaryError::ManifestMismatch {
                manifest: expected.to_string(),
                asset: describe_version(dictionary.version()),
            });
        }
    }
    Ok(dictionary)
}
