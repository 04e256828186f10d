//! Chart persistence.
//!
//! One pretty-printed JSON file per store key, plus a `manifest.json`
//! recording a BLAKE3 hash and creation timestamp per entry. The
//! orchestrator only sees the [`ChartStore`] trait so it can be tested
//! without touching disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use stemchart_spec::{sanitize_id, ChartError, ChartFile};

/// Storage interface for resolved charts.
///
/// Keys are the sanitized strings produced by
/// [`stemchart_spec::chart_key`] and friends. `put` overwrites whole
/// entries; there is no partial update.
pub trait ChartStore {
    /// Loads the chart stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<ChartFile>, ChartError>;

    /// Persists `chart` under `key`, replacing any previous entry.
    fn put(&self, key: &str, chart: &ChartFile) -> Result<(), ChartError>;

    /// Cheap existence check without decoding the entry.
    fn exists(&self, key: &str) -> bool;
}

/// Manifest entry recorded per stored chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEntry {
    /// BLAKE3 hash of the serialized chart JSON.
    pub hash: String,
    /// RFC 3339 timestamp of the last write.
    pub created_at: String,
}

/// Store-level manifest, one entry per key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreManifest {
    #[serde(default)]
    pub entries: BTreeMap<String, StoreEntry>,
}

/// Filesystem-backed chart store.
pub struct FsChartStore {
    charts_dir: PathBuf,
}

impl FsChartStore {
    /// Creates a store rooted at `charts_dir`. The directory is created
    /// lazily on the first write.
    pub fn new(charts_dir: impl Into<PathBuf>) -> Self {
        Self {
            charts_dir: charts_dir.into(),
        }
    }

    /// Default charts directory under the platform data dir.
    pub fn default_charts_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("stemchart").join("charts"))
    }

    /// Root directory of this store.
    pub fn charts_dir(&self) -> &PathBuf {
        &self.charts_dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.charts_dir.join(format!("{}.json", sanitize_id(key)))
    }

    fn manifest_path(&self) -> PathBuf {
        self.charts_dir.join("manifest.json")
    }

    fn load_manifest(&self) -> StoreManifest {
        // A missing or corrupt manifest only loses bookkeeping, never
        // chart data; start over from empty.
        fs::read_to_string(self.manifest_path())
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    fn write_manifest(&self, manifest: &StoreManifest) -> Result<(), ChartError> {
        let json = serde_json::to_string_pretty(manifest)?;
        fs::write(self.manifest_path(), json)?;
        Ok(())
    }

    /// Returns entry count and total size on disk.
    pub fn info(&self) -> Result<StoreInfo, ChartError> {
        if !self.charts_dir.exists() {
            return Ok(StoreInfo {
                charts_dir: self.charts_dir.clone(),
                entry_count: 0,
                total_size_bytes: 0,
            });
        }

        let mut entry_count = 0u64;
        let mut total_size_bytes = 0u64;
        for entry in walkdir::WalkDir::new(&self.charts_dir) {
            let entry = entry.map_err(|e| ChartError::Persistence(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            total_size_bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
            let name = entry.file_name().to_string_lossy();
            if name.ends_with(".json") && name != "manifest.json" {
                entry_count += 1;
            }
        }

        Ok(StoreInfo {
            charts_dir: self.charts_dir.clone(),
            entry_count,
            total_size_bytes,
        })
    }

    /// Removes every stored chart and the manifest. Returns the number of
    /// charts removed.
    pub fn clear(&self) -> Result<u64, ChartError> {
        if !self.charts_dir.exists() {
            return Ok(0);
        }

        let mut count = 0u64;
        for entry in fs::read_dir(&self.charts_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let is_manifest = path.file_name().and_then(|n| n.to_str()) == Some("manifest.json");
            fs::remove_file(&path)?;
            if !is_manifest {
                count += 1;
            }
        }

        Ok(count)
    }
}

impl ChartStore for FsChartStore {
    fn get(&self, key: &str) -> Result<Option<ChartFile>, ChartError> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)?;
        Ok(Some(ChartFile::from_json(&json)?))
    }

    fn put(&self, key: &str, chart: &ChartFile) -> Result<(), ChartError> {
        fs::create_dir_all(&self.charts_dir)?;

        let json = chart.to_json_pretty()?;
        fs::write(self.entry_path(key), &json)?;

        let mut manifest = self.load_manifest();
        manifest.entries.insert(
            sanitize_id(key),
            StoreEntry {
                hash: blake3::hash(json.as_bytes()).to_hex().to_string(),
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        );
        self.write_manifest(&manifest)
    }

    fn exists(&self, key: &str) -> bool {
        self.entry_path(key).exists()
    }
}

/// Store statistics for the `store info` command.
#[derive(Debug, Clone)]
pub struct StoreInfo {
    pub charts_dir: PathBuf,
    pub entry_count: u64,
    pub total_size_bytes: u64,
}

/// In-memory store used by orchestrator tests.
#[derive(Default)]
pub struct MemoryChartStore {
    entries: Mutex<BTreeMap<String, ChartFile>>,
}

impl MemoryChartStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, ChartFile>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl ChartStore for MemoryChartStore {
    fn get(&self, key: &str) -> Result<Option<ChartFile>, ChartError> {
        Ok(self.lock().get(key).cloned())
    }

    fn put(&self, key: &str, chart: &ChartFile) -> Result<(), ChartError> {
        self.lock().insert(key.to_string(), chart.clone());
        Ok(())
    }

    fn exists(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }
}
