use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult};

pub const DEFAULT_MAX_PER_COUNTRY: usize = 1000;
pub const DEFAULT_SAVE_EVERY: usize = 10;

type CacheMap = BTreeMap<String, VecDeque<String>>;

struct CacheState {
    entries: CacheMap,
    insertions: usize,
}

/// Per-country addresses accepted in earlier runs, persisted as a JSON object
/// of `country -> [address, ...]`.
pub struct AddressCache {
    path: PathBuf,
    max_per_country: usize,
    save_every: usize,
    state: Mutex<CacheState>,
    save_guard: Mutex<()>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheSummary {
    pub path: String,
    pub countries: BTreeMap<String, usize>,
    pub total: usize,
}

impl AddressCache {
    pub fn new(path: impl Into<PathBuf>, max_per_country: usize, save_every: usize) -> Self {
        Self {
            path: path.into(),
            max_per_country: max_per_country.max(1),
            save_every: save_every.max(1),
            state: Mutex::new(CacheState {
                entries: CacheMap::new(),
                insertions: 0,
            }),
            save_guard: Mutex::new(()),
        }
    }

    /// Opens the cache at `path` and loads whatever is already persisted.
    pub fn open(path: impl Into<PathBuf>, max_per_country: usize, save_every: usize) -> Self {
        let cache = Self::new(path, max_per_country, save_every);
        cache.load();
        cache
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the in-memory state with the persisted file. A missing or
    /// unreadable file leaves the cache empty.
    pub fn load(&self) {
        let entries = match read_entries(&self.path) {
            Ok(Some(raw)) => self.bounded(raw),
            Ok(None) => {
                debug!(
                    target: "address_cache",
                    path = %self.path.display(),
                    "no address cache on disk; starting empty"
                );
                CacheMap::new()
            }
            Err(err) => {
                warn!(
                    target: "address_cache",
                    path = %self.path.display(),
                    error = %err,
                    "failed to load address cache; starting empty"
                );
                CacheMap::new()
            }
        };

        let total: usize = entries.values().map(VecDeque::len).sum();
        info!(
            target: "address_cache",
            countries = entries.len(),
            total,
            "address cache loaded"
        );
        let mut state = self.state.lock();
        state.entries = entries;
        state.insertions = 0;
    }

    pub fn get_random<R: Rng + ?Sized>(&self, country_code: &str, rng: &mut R) -> Option<String> {
        let state = self.state.lock();
        let addresses = state.entries.get(country_code)?;
        if addresses.is_empty() {
            return None;
        }
        addresses.get(rng.gen_range(0..addresses.len())).cloned()
    }

    /// Inserts a new address. Returns `true` when the address was not cached
    /// yet. Every `save_every` insertions the whole cache is written out.
    pub fn add(&self, country_code: &str, address: &str) -> bool {
        let (added, save_due) = self.insert(country_code, address);
        if save_due {
            self.save();
        }
        added
    }

    /// Same as [`AddressCache::add`], but a due save runs on the blocking
    /// pool instead of the calling worker.
    pub async fn add_async(self: &Arc<Self>, country_code: &str, address: &str) -> bool {
        let (added, save_due) = self.insert(country_code, address);
        if save_due {
            self.save_async().await;
        }
        added
    }

    fn insert(&self, country_code: &str, address: &str) -> (bool, bool) {
        let mut state = self.state.lock();
        let addresses = state.entries.entry(country_code.to_string()).or_default();
        if addresses.iter().any(|existing| existing == address) {
            return (false, false);
        }
        addresses.push_back(address.to_string());
        while addresses.len() > self.max_per_country {
            addresses.pop_front();
        }
        state.insertions += 1;
        (true, state.insertions % self.save_every == 0)
    }

    /// Writes the cache to disk. Failures are logged and the in-memory state
    /// keeps serving lookups.
    pub fn save(&self) {
        if let Err(err) = self.try_save() {
            warn!(
                target: "address_cache",
                path = %self.path.display(),
                error = %err,
                "failed to persist address cache"
            );
        }
    }

    pub async fn save_async(self: &Arc<Self>) {
        let cache = Arc::clone(self);
        if let Err(err) = tokio::task::spawn_blocking(move || cache.save()).await {
            warn!(
                target: "address_cache",
                path = %self.path.display(),
                error = %err,
                "address cache save task failed"
            );
        }
    }

    pub fn try_save(&self) -> AppResult<()> {
        let _guard = self.save_guard.lock();
        let snapshot = self.state.lock().entries.clone();
        write_entries(&self.path, &snapshot)?;
        let total: usize = snapshot.values().map(VecDeque::len).sum();
        debug!(
            target: "address_cache",
            path = %self.path.display(),
            total,
            "address cache saved"
        );
        Ok(())
    }

    pub fn len(&self, country_code: &str) -> usize {
        self.state
            .lock()
            .entries
            .get(country_code)
            .map(VecDeque::len)
            .unwrap_or(0)
    }

    pub fn contains(&self, country_code: &str, address: &str) -> bool {
        self.state
            .lock()
            .entries
            .get(country_code)
            .is_some_and(|addresses| addresses.iter().any(|a| a == address))
    }

    pub fn summary(&self) -> CacheSummary {
        let state = self.state.lock();
        let countries: BTreeMap<String, usize> = state
            .entries
            .iter()
            .map(|(code, addresses)| (code.clone(), addresses.len()))
            .collect();
        CacheSummary {
            path: self.path.to_string_lossy().to_string(),
            total: countries.values().sum(),
            countries,
        }
    }

    fn bounded(&self, raw: BTreeMap<String, Vec<String>>) -> CacheMap {
        raw.into_iter()
            .map(|(code, addresses)| {
                let mut unique: VecDeque<String> = VecDeque::with_capacity(addresses.len());
                for address in addresses {
                    if !unique.contains(&address) {
                        unique.push_back(address);
                    }
                }
                while unique.len() > self.max_per_country {
                    unique.pop_front();
                }
                (code, unique)
            })
            .collect()
    }
}

fn read_entries(path: &Path) -> AppResult<Option<BTreeMap<String, Vec<String>>>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(AppError::Io(err)),
    }
}

/// Writes through a sibling temp file and renames it into place, so readers
/// never observe a half-written cache.
fn write_entries(path: &Path, entries: &CacheMap) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let serialized = serde_json::to_string_pretty(entries)?;
    let tmp_path = temp_path(path);
    fs::write(&tmp_path, serialized)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut buf = path.to_path_buf();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "address_cache.json".into());
    buf.set_file_name(format!("{file_name}.tmp"));
    buf
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn starts_empty_when_file_missing() {
        let dir = tempdir().unwrap();
        let cache = AddressCache::open(dir.path().join("cache.json"), 1000, 10);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(cache.get_random("ES", &mut rng), None);
        assert_eq!(cache.summary().total, 0);
    }

    #[test]
    fn starts_empty_when_file_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{ not json").unwrap();
        let cache = AddressCache::open(&path, 1000, 10);
        assert_eq!(cache.len("ES"), 0);

        assert!(cache.add("ES", "Calle Mayor 10, 28013 Madrid"));
        cache.try_save().unwrap();
        let reloaded = AddressCache::open(&path, 1000, 10);
        assert_eq!(reloaded.len("ES"), 1);
    }

    #[test]
    fn rejects_duplicates_per_country() {
        let dir = tempdir().unwrap();
        let cache = AddressCache::new(dir.path().join("cache.json"), 1000, 10);
        assert!(cache.add("ES", "Calle Mayor 10, 28013 Madrid"));
        assert!(!cache.add("ES", "Calle Mayor 10, 28013 Madrid"));
        assert!(cache.add("PT", "Calle Mayor 10, 28013 Madrid"));
        assert_eq!(cache.len("ES"), 1);
        assert_eq!(cache.len("PT"), 1);
    }

    #[test]
    fn evicts_oldest_entries_past_bound() {
        let dir = tempdir().unwrap();
        let cache = AddressCache::new(dir.path().join("cache.json"), 1000, 10_000);
        for i in 0..1005 {
            cache.add("DE", &format!("Hauptstrasse {i}, 10115 Berlin"));
            assert!(cache.len("DE") <= 1000);
        }
        assert_eq!(cache.len("DE"), 1000);
        for i in 0..5 {
            assert!(!cache.contains("DE", &format!("Hauptstrasse {i}, 10115 Berlin")));
        }
        assert!(cache.contains("DE", "Hauptstrasse 5, 10115 Berlin"));
        assert!(cache.contains("DE", "Hauptstrasse 1004, 10115 Berlin"));
    }

    #[test]
    fn saves_every_nth_insertion() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let cache = AddressCache::new(&path, 1000, 10);
        for i in 0..9 {
            cache.add("FR", &format!("Rue de Rivoli {i}, 75001 Paris"));
        }
        assert!(!path.exists());

        cache.add("GB", "Baker Street 221, NW1 6XE London");
        assert!(path.exists());
        let reloaded = AddressCache::open(&path, 1000, 10);
        assert_eq!(reloaded.len("FR"), 9);
        assert_eq!(reloaded.len("GB"), 1);
    }

    #[tokio::test]
    async fn add_async_saves_off_the_worker() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let cache = Arc::new(AddressCache::new(&path, 1000, 2));
        assert!(cache.add_async("ES", "Calle Mayor 10, 28013 Madrid").await);
        assert!(!path.exists());
        assert!(!cache.add_async("ES", "Calle Mayor 10, 28013 Madrid").await);
        assert!(!path.exists());

        assert!(cache.add_async("ES", "Gran Via 1, 28013 Madrid").await);
        assert!(path.exists());
        assert_eq!(AddressCache::open(&path, 1000, 2).len("ES"), 2);
    }

    #[test]
    fn get_random_returns_cached_entry() {
        let dir = tempdir().unwrap();
        let cache = AddressCache::new(dir.path().join("cache.json"), 1000, 10);
        let addresses = [
            "Calle Mayor 10, 28013 Madrid",
            "Gran Via 1, 28013 Madrid",
            "Calle de Alcala 20, 28014 Madrid",
        ];
        for address in addresses {
            cache.add("ES", address);
        }
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let picked = cache.get_random("ES", &mut rng).unwrap();
            assert!(addresses.contains(&picked.as_str()));
        }
        assert_eq!(cache.get_random("DE", &mut rng), None);
    }

    #[test]
    fn save_failure_is_not_fatal() {
        let dir = tempdir().unwrap();
        // a directory where the cache file should be makes the rename fail
        let path = dir.path().join("cache.json");
        fs::create_dir_all(path.join("occupied")).unwrap();
        let cache = AddressCache::new(&path, 1000, 1);
        assert!(cache.add("ES", "Calle Mayor 10, 28013 Madrid"));
        assert!(cache.try_save().is_err());
        assert_eq!(cache.len("ES"), 1);
    }

    #[test]
    fn load_trims_oversized_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let addresses: Vec<String> = (0..20).map(|i| format!("Street {i}, 1000 City")).collect();
        fs::write(
            &path,
            serde_json::to_string(&BTreeMap::from([("NL".to_string(), addresses)])).unwrap(),
        )
        .unwrap();
        let cache = AddressCache::open(&path, 5, 10);
        assert_eq!(cache.len("NL"), 5);
        assert!(cache.contains("NL", "Street 19, 1000 City"));
        assert!(!cache.contains("NL", "Street 14, 1000 City"));
    }
}
