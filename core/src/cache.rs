//! # Document Cache
//!
//! Time-bounded read-through cache from project name to `ApiDocument`, shared
//! by the mock, proxy and export endpoints. Entries expire a fixed time after
//! they were written and are never invalidated otherwise.

use crate::document::model::ApiDocument;
use crate::error::AppResult;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Lifetime of a cache entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// File name of the source dialect document inside a project directory.
pub const SOURCE_DOCUMENT: &str = "swagger.json";

/// Monotonic time source.
pub trait Clock: Send + Sync {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Wall clock measured from its creation.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicU64,
}

impl ManualClock {
    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    document: Arc<ApiDocument>,
    stored_at: Duration,
}

/// The shared project document cache.
pub struct DocumentCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl Default for DocumentCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl DocumentCache {
    /// A cache on the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock::default()))
    }

    /// A cache on the given clock.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        self.clock.now().saturating_sub(entry.stored_at) < self.ttl
    }

    /// The cached document; an expired entry is evicted and reported absent.
    pub fn get(&self, project: &str) -> Option<Arc<ApiDocument>> {
        let fresh = self
            .entries
            .get(project)
            .map(|entry| self.is_fresh(&entry).then(|| entry.document.clone()))?;
        if fresh.is_none() {
            tracing::debug!(project, "cache entry expired");
            self.entries.remove_if(project, |_, entry| !self.is_fresh(entry));
        }
        fresh
    }

    /// Stores a document, replacing any previous entry.
    pub fn put(&self, project: &str, document: ApiDocument) -> Arc<ApiDocument> {
        let document = Arc::new(document);
        self.entries.insert(
            project.to_string(),
            CacheEntry {
                document: document.clone(),
                stored_at: self.clock.now(),
            },
        );
        document
    }

    /// The cached document, or the one `loader` produces on a miss. Only one
    /// caller loads a given project at a time; `Ok(None)` means the backing
    /// data is absent.
    pub fn get_or_load<F>(&self, project: &str, loader: F) -> AppResult<Option<Arc<ApiDocument>>>
    where
        F: FnOnce(&str) -> AppResult<Option<ApiDocument>>,
    {
        if let Some(document) = self.get(project) {
            return Ok(Some(document));
        }
        match self.entries.entry(project.to_string()) {
            Entry::Occupied(entry) if self.is_fresh(entry.get()) => {
                Ok(Some(entry.get().document.clone()))
            }
            Entry::Occupied(mut entry) => {
                let Some(document) = loader(project)? else {
                    entry.remove();
                    return Ok(None);
                };
                let document = Arc::new(document);
                entry.insert(CacheEntry {
                    document: document.clone(),
                    stored_at: self.clock.now(),
                });
                Ok(Some(document))
            }
            Entry::Vacant(entry) => {
                let Some(document) = loader(project)? else {
                    return Ok(None);
                };
                tracing::debug!(project, "cache filled");
                let document = Arc::new(document);
                entry.insert(CacheEntry {
                    document: document.clone(),
                    stored_at: self.clock.now(),
                });
                Ok(Some(document))
            }
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Loads `<root>/<project>/swagger.json`; `Ok(None)` when the project has no
/// document or its name would leave `root`.
pub fn load_from_dir(root: &Path, project: &str) -> AppResult<Option<ApiDocument>> {
    let escapes = project.contains(|c: char| c == '/' || c == '\\') || project.starts_with('.');
    if project.is_empty() || escapes {
        return Ok(None);
    }
    let path: PathBuf = root.join(project).join(SOURCE_DOCUMENT);
    if !path.is_file() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)?;
    ApiDocument::from_json(&content).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn cache() -> (DocumentCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        (DocumentCache::with_clock(DEFAULT_TTL, clock.clone()), clock)
    }

    #[test]
    fn test_expiry() {
        let (cache, clock) = cache();
        cache.put("shop", ApiDocument::new("shop", "1"));
        clock.advance(Duration::from_secs(59));
        assert!(cache.get("shop").is_some());
        clock.advance(Duration::from_secs(2));
        assert!(cache.get("shop").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_read_through() {
        let (cache, clock) = cache();
        let mut loads = 0;
        let doc = cache
            .get_or_load("shop", |p| {
                loads += 1;
                Ok(Some(ApiDocument::new(p, "1")))
            })
            .unwrap()
            .unwrap();
        assert_eq!(doc.info.title, "shop");

        cache
            .get_or_load("shop", |_| panic!("fresh entry must not reload"))
            .unwrap();
        assert_eq!(loads, 1);

        clock.advance(Duration::from_secs(61));
        let reloaded = cache
            .get_or_load("shop", |p| Ok(Some(ApiDocument::new(p, "2"))))
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.info.version, "2");
    }

    #[test]
    fn test_absent_backing_data() {
        let (cache, _) = cache();
        let missing = cache.get_or_load("ghost", |_| Ok(None)).unwrap();
        assert!(missing.is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("shop")).unwrap();
        let doc = ApiDocument::new("shop", "1.0");
        fs::write(
            dir.path().join("shop").join(SOURCE_DOCUMENT),
            serde_json::to_string(&doc).unwrap(),
        )
        .unwrap();

        assert_eq!(load_from_dir(dir.path(), "shop").unwrap(), Some(doc));
        assert_eq!(load_from_dir(dir.path(), "other").unwrap(), None);
        assert_eq!(load_from_dir(dir.path(), "../shop").unwrap(), None);
    }
}
