use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Memoizes loaded resources by name for the cache's lifetime.
///
/// Lookup and insert happen under one lock, so concurrent requests for the
/// same missing name run the loader once and all receive the same `Arc`.
/// Entries are never evicted; they are released when the cache is cleared or
/// dropped.
pub struct ResourceCache<T> {
    entries: Mutex<HashMap<String, Arc<T>>>,
}

impl<T> ResourceCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `name`, loading it on a miss.
    ///
    /// The lock is held while `load` runs. A failed load caches nothing.
    pub fn get_or_load<E, F>(&self, name: &str, load: F) -> Result<Arc<T>, E>
    where
        F: FnOnce(&str) -> Result<T, E>,
    {
        let mut entries = self.entries.lock();

        if let Some(hit) = entries.get(name) {
            log::trace!("resource cache hit: {name}");
            return Ok(Arc::clone(hit));
        }

        let value = Arc::new(load(name)?);
        entries.insert(name.to_string(), Arc::clone(&value));
        log::debug!("resource cached: {name}");
        Ok(value)
    }

    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.entries.lock().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.lock().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Cached names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Drops every entry. Values still referenced elsewhere live on until
    /// their last `Arc` goes.
    pub fn clear(&self) {
        let drained: Vec<Arc<T>> = self.entries.lock().drain().map(|(_, v)| v).collect();
        // Release outside the lock; dropping a GPU resource may log or block.
        drop(drained);
    }
}

impl<T> Default for ResourceCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;

    #[derive(Debug, PartialEq)]
    struct Handle(String);

    fn loader(calls: &AtomicUsize) -> impl Fn(&str) -> Result<Handle, String> + '_ {
        move |name| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Handle(name.to_string()))
        }
    }

    #[test]
    fn second_resolve_returns_same_instance() {
        let cache = ResourceCache::new();
        let calls = AtomicUsize::new(0);

        let a = cache.get_or_load("character.png", loader(&calls)).unwrap();
        let b = cache.get_or_load("character.png", loader(&calls)).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_names_load_separately() {
        let cache = ResourceCache::new();
        let calls = AtomicUsize::new(0);

        cache.get_or_load("a", loader(&calls)).unwrap();
        cache.get_or_load("b", loader(&calls)).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.names(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let cache: ResourceCache<Handle> = ResourceCache::new();

        let err = cache
            .get_or_load("missing", |_| Err::<Handle, _>("no such file"))
            .unwrap_err();
        assert_eq!(err, "no such file");
        assert!(!cache.contains("missing"));

        let calls = AtomicUsize::new(0);
        cache.get_or_load("missing", loader(&calls)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_resolves_load_once() {
        const THREADS: usize = 8;
        let cache = ResourceCache::new();
        let calls = AtomicUsize::new(0);
        let barrier = Barrier::new(THREADS);

        let handles: Vec<Arc<Handle>> = std::thread::scope(|s| {
            let workers: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        cache.get_or_load("shared", loader(&calls)).unwrap()
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
    }

    #[test]
    fn clear_releases_entries() {
        let cache = ResourceCache::new();
        let calls = AtomicUsize::new(0);
        let kept = cache.get_or_load("x", loader(&calls)).unwrap();

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(Arc::strong_count(&kept), 1);

        cache.get_or_load("x", loader(&calls)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
