//! Backend registry: maps backend names to constructors and caches
//! singleton instances.
//!
//! The registry is the only string-keyed dispatch point in the crate; every
//! other component works against the [`BookStore`] trait. Each registered
//! name gets at most one instance per process, constructed on first
//! resolution and never refreshed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::DatabaseConfig;
use crate::storage::port::BookStore;
use crate::storage::types::BackendKind;
use crate::storage::{MySqlStore, PostgresStore, StorageError};

/// Zero-argument backend constructor.
///
/// Constructors must not perform network I/O beyond preparing a lazy
/// connection pool; connectivity is validated by the first real operation or
/// [`BookStore::health_check`].
pub type StoreCtor = Box<dyn Fn() -> Result<Arc<dyn BookStore>, StorageError> + Send + Sync>;

struct Slot {
    ctor: StoreCtor,
    instance: Option<Arc<dyn BookStore>>,
}

/// Process-wide registry of storage backends.
///
/// Slots are guarded by a single mutex, which is held across first-time
/// construction so that concurrent resolutions of the same name can never
/// build two instances. Constructors are cheap (lazy pools only), so the
/// critical section stays short.
#[derive(Default)]
pub struct StoreRegistry {
    slots: Mutex<HashMap<String, Slot>>,
}

impl std::fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreRegistry")
            .field("backends", &self.names())
            .finish_non_exhaustive()
    }
}

impl StoreRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in backends whose connection URLs
    /// are present in `config`.
    ///
    /// Pool settings come from the config; the constructors capture them and
    /// stay lazy, so this never touches the network.
    pub fn from_config(config: &DatabaseConfig) -> Self {
        let registry = Self::new();

        if let Some(url) = config.postgres_url.clone() {
            let (size, timeout) = (config.pool_size, config.acquire_timeout);
            registry.register(BackendKind::Postgres.as_ref(), move || {
                let store = PostgresStore::connect_lazy_with(&url, size, timeout)?;
                Ok(Arc::new(store) as Arc<dyn BookStore>)
            });
        }

        if let Some(url) = config.mysql_url.clone() {
            let (size, timeout) = (config.pool_size, config.acquire_timeout);
            registry.register(BackendKind::Mysql.as_ref(), move || {
                let store = MySqlStore::connect_lazy_with(&url, size, timeout)?;
                Ok(Arc::new(store) as Arc<dyn BookStore>)
            });
        }

        registry
    }

    /// Associate `name` with a constructor.
    ///
    /// Re-registering an existing name overwrites it silently and drops any
    /// cached instance, so the next [`StoreRegistry::resolve`] constructs
    /// through the new constructor.
    pub fn register<F>(&self, name: impl Into<String>, ctor: F)
    where
        F: Fn() -> Result<Arc<dyn BookStore>, StorageError> + Send + Sync + 'static,
    {
        let mut slots = self.slots.lock().expect("registry mutex poisoned");
        slots.insert(
            name.into(),
            Slot {
                ctor: Box::new(ctor),
                instance: None,
            },
        );
    }

    /// Resolve `name` to its singleton instance, constructing it on first use.
    ///
    /// Returns [`StorageError::UnknownBackend`] for unregistered names. A
    /// constructor failure is returned to the caller and leaves the slot
    /// empty, so a later resolve retries construction.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn BookStore>, StorageError> {
        let mut slots = self.slots.lock().expect("registry mutex poisoned");
        let slot = slots
            .get_mut(name)
            .ok_or_else(|| StorageError::UnknownBackend(name.to_string()))?;

        if let Some(instance) = &slot.instance {
            return Ok(Arc::clone(instance));
        }

        let instance = (slot.ctor)()?;
        slot.instance = Some(Arc::clone(&instance));
        tracing::info!(backend = %name, "Storage backend constructed");
        Ok(instance)
    }

    /// Names of all registered backends, sorted.
    pub fn names(&self) -> Vec<String> {
        let slots = self.slots.lock().expect("registry mutex poisoned");
        let mut names: Vec<String> = slots.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::{Book, BookFilter, BookPatch, HealthReport, NewBook};
    use crate::storage::FragmentMatching;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    /// A do-nothing store carrying a label so tests can tell instances apart.
    struct StubStore {
        label: &'static str,
    }

    #[async_trait::async_trait]
    impl BookStore for StubStore {
        fn name(&self) -> &str {
            self.label
        }

        fn fragment_matching(&self) -> FragmentMatching {
            FragmentMatching::CaseInsensitive
        }

        async fn create(&self, _book: NewBook) -> Result<Book, StorageError> {
            Err(StorageError::Unavailable("stub".into()))
        }

        async fn get(&self, _id: Uuid) -> Result<Book, StorageError> {
            Err(StorageError::NotFound)
        }

        async fn list(&self, _offset: u64, _limit: u64) -> Result<Vec<Book>, StorageError> {
            Ok(Vec::new())
        }

        async fn search(&self, _filter: &BookFilter) -> Result<Vec<Book>, StorageError> {
            Ok(Vec::new())
        }

        async fn update(&self, _id: Uuid, _patch: BookPatch) -> Result<Book, StorageError> {
            Err(StorageError::NotFound)
        }

        async fn delete(&self, _id: Uuid) -> Result<(), StorageError> {
            Err(StorageError::NotFound)
        }

        async fn health_check(&self) -> HealthReport {
            HealthReport::healthy(self.label)
        }
    }

    #[test]
    fn test_resolve_unknown_backend() {
        let registry = StoreRegistry::new();
        let err = registry.resolve("oracle").err().unwrap();
        assert!(matches!(err, StorageError::UnknownBackend(name) if name == "oracle"));
    }

    #[test]
    fn test_resolve_returns_singleton() {
        let registry = StoreRegistry::new();
        registry.register("stub", || Ok(Arc::new(StubStore { label: "stub" })));

        let a = registry.resolve("stub").unwrap();
        let b = registry.resolve("stub").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_reregister_overwrites_and_rebuilds() {
        let registry = StoreRegistry::new();
        registry.register("stub", || Ok(Arc::new(StubStore { label: "first" })));
        assert_eq!(registry.resolve("stub").unwrap().name(), "first");

        registry.register("stub", || Ok(Arc::new(StubStore { label: "second" })));
        assert_eq!(registry.resolve("stub").unwrap().name(), "second");
    }

    #[test]
    fn test_ctor_failure_is_retried() {
        static ATTEMPTS: AtomicUsize = AtomicUsize::new(0);

        let registry = StoreRegistry::new();
        registry.register("flaky", || {
            if ATTEMPTS.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(StorageError::Unavailable("first attempt".into()))
            } else {
                Ok(Arc::new(StubStore { label: "flaky" }))
            }
        });

        assert!(registry.resolve("flaky").is_err());
        assert!(registry.resolve("flaky").is_ok());
        assert_eq!(ATTEMPTS.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrent_resolve_constructs_once() {
        let constructions = Arc::new(AtomicUsize::new(0));
        let registry = Arc::new(StoreRegistry::new());

        let counter = Arc::clone(&constructions);
        registry.register("stub", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(10));
            Ok(Arc::new(StubStore { label: "stub" }))
        });

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.resolve("stub").unwrap())
            })
            .collect();

        let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(constructions.load(Ordering::SeqCst), 1);
        for instance in &instances[1..] {
            assert!(Arc::ptr_eq(&instances[0], instance));
        }
    }

    #[test]
    fn test_names_sorted() {
        let registry = StoreRegistry::new();
        registry.register("mysql", || Ok(Arc::new(StubStore { label: "mysql" })));
        registry.register("postgres", || Ok(Arc::new(StubStore { label: "postgres" })));
        assert_eq!(registry.names(), vec!["mysql", "postgres"]);
    }
}
