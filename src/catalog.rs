// Catalog of bookable event services and the store that loads it once per session

use std::{
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use futures::future::{AbortHandle, Abortable, Aborted};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ExpoConfig;

pub type ServiceId = u32;

// Immutable list handed to every downstream component
pub type Catalog = Arc<[Arc<Service>]>;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Catalog decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Catalog load cancelled")]
    Cancelled,

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Catalog source error: {0}")]
    Source(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    DJ,
    Photographer,
    Caterer,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::DJ => "DJ",
            Category::Photographer => "Photographer",
            Category::Caterer => "Caterer",
            Category::Other(name) => name.as_str(),
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "DJ" => Category::DJ,
            "Photographer" => Category::Photographer,
            "Caterer" => Category::Caterer,
            _ => Category::Other(value),
        }
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Category::from(value.to_string())
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: u32,
    pub user: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub category: Category,
    pub price: u32,
    pub rating: f64,
    pub location: String,
    // ISO dates, distinct, in display order
    pub availability: Vec<String>,
    pub images: Vec<String>,
    pub reviews: Arc<[Review]>,
}

// The three services the front end ships with
pub const SAMPLE_CATALOG_JSON: &str = include_str!("../samples/services.json");

pub fn sample_services() -> Result<Vec<Service>, FetchError> {
    Ok(serde_json::from_str(SAMPLE_CATALOG_JSON)?)
}

// Collaborator that supplies the service list. A real deployment puts a
// network call behind this; there is a single attempt and no retry.
#[async_trait]
pub trait CatalogSource: Send + Sync + 'static {
    async fn fetch(&self) -> Result<Vec<Service>, FetchError>;
}

// Simulated fetch: waits for the configured latency then hands out a fixed list
pub struct MockCatalogSource {
    services: Vec<Service>,
    delay_ms: AtomicUsize,
    jitter_ms: AtomicUsize,
    fail_next_loads: AtomicUsize,
    fetch_count: AtomicUsize,
}

impl MockCatalogSource {
    pub fn new(services: Vec<Service>) -> Self {
        Self {
            services,
            delay_ms: AtomicUsize::new(0),
            jitter_ms: AtomicUsize::new(0),
            fail_next_loads: AtomicUsize::new(0),
            fetch_count: AtomicUsize::new(0),
        }
    }

    pub fn sample(config: &ExpoConfig) -> Result<Self, FetchError> {
        let source = Self::new(sample_services()?);
        source.set_delay(config.load_latency_ms as usize, config.load_jitter_ms as usize);
        Ok(source)
    }

    pub fn set_delay(&self, delay_ms: usize, jitter_ms: usize) {
        self.delay_ms.store(delay_ms, Ordering::SeqCst);
        self.jitter_ms.store(jitter_ms, Ordering::SeqCst);
    }

    pub fn fail_next_loads(&self, count: usize) {
        self.fail_next_loads.store(count, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for MockCatalogSource {
    async fn fetch(&self) -> Result<Vec<Service>, FetchError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        let delay = self.delay_ms.load(Ordering::SeqCst);
        let jitter = match self.jitter_ms.load(Ordering::SeqCst) {
            0 => 0,
            max => rand::random::<usize>() % max,
        };
        if delay + jitter > 0 {
            tokio::time::sleep(Duration::from_millis((delay + jitter) as u64)).await;
        }

        let fail_count = self.fail_next_loads.load(Ordering::SeqCst);
        if fail_count > 0 {
            self.fail_next_loads.store(fail_count - 1, Ordering::SeqCst);
            return Err(FetchError::Network("Service unavailable".to_string()));
        }

        Ok(self.services.clone())
    }
}

#[derive(Debug, Clone)]
pub enum CatalogState {
    Loading,
    Ready(Catalog),
    Failed(String),
}

pub struct CatalogStore {
    source: Arc<dyn CatalogSource>,
    state: RwLock<CatalogState>,
    // at most one fetch in flight
    in_flight: tokio::sync::Mutex<()>,
}

impl CatalogStore {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            state: RwLock::new(CatalogState::Loading),
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.state.read(), CatalogState::Loading)
    }

    pub fn state(&self) -> CatalogState {
        self.state.read().clone()
    }

    // None until the load has resolved successfully
    pub fn services(&self) -> Option<Catalog> {
        match &*self.state.read() {
            CatalogState::Ready(catalog) => Some(catalog.clone()),
            _ => None,
        }
    }

    pub fn get(&self, id: ServiceId) -> Option<Arc<Service>> {
        self.services()?.iter().find(|s| s.id == id).cloned()
    }

    // Resolves the session's single fetch. Once settled, later calls return
    // the settled outcome without touching the source again.
    pub async fn load(&self) -> Result<Catalog, FetchError> {
        match self.state() {
            CatalogState::Ready(catalog) => return Ok(catalog),
            CatalogState::Failed(reason) => return Err(FetchError::Unavailable(reason)),
            CatalogState::Loading => {}
        }

        let _in_flight = self.in_flight.lock().await;
        // a concurrent caller may have settled it while we waited
        match self.state() {
            CatalogState::Ready(catalog) => return Ok(catalog),
            CatalogState::Failed(reason) => return Err(FetchError::Unavailable(reason)),
            CatalogState::Loading => {}
        }

        debug!("catalog load started");
        let fetched = self.source.fetch().await;

        let mut state = self.state.write();

        match fetched {
            Ok(services) => {
                let catalog: Catalog = services.into_iter().map(Arc::new).collect::<Vec<_>>().into();
                info!(services = catalog.len(), "catalog loaded");
                *state = CatalogState::Ready(catalog.clone());
                Ok(catalog)
            }
            Err(e) => {
                warn!(error = %e, "catalog load failed");
                *state = CatalogState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    // Runs the load on the runtime. Dropping or cancelling the handle before
    // resolution leaves the store in `Loading`.
    pub fn spawn_load(self: &Arc<Self>) -> LoadHandle {
        let (abort, registration) = AbortHandle::new_pair();
        let store = self.clone();
        let join = tokio::spawn(Abortable::new(
            async move { store.load().await },
            registration,
        ));

        LoadHandle {
            abort,
            join: Some(join),
        }
    }
}

pub struct LoadHandle {
    abort: AbortHandle,
    join: Option<JoinHandle<Result<Result<Catalog, FetchError>, Aborted>>>,
}

impl LoadHandle {
    pub fn cancel(&self) {
        if !self.abort.is_aborted() {
            debug!("catalog load cancelled");
            self.abort.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.abort.is_aborted()
    }

    pub async fn wait(mut self) -> Result<Catalog, FetchError> {
        let Some(join) = self.join.take() else {
            return Err(FetchError::Cancelled);
        };

        match join.await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(Aborted)) => Err(FetchError::Cancelled),
            Err(e) if e.is_cancelled() => Err(FetchError::Cancelled),
            Err(e) => Err(FetchError::Source(anyhow::Error::new(e))),
        }
    }
}

impl Drop for LoadHandle {
    fn drop(&mut self) {
        if self.join.is_some() {
            self.abort.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(source: MockCatalogSource) -> (Arc<CatalogStore>, Arc<MockCatalogSource>) {
        let source = Arc::new(source);
        let store = Arc::new(CatalogStore::new(source.clone()));
        (store, source)
    }

    #[test]
    fn test_sample_catalog_decodes() {
        let services = sample_services().unwrap();
        assert_eq!(services.len(), 3);

        let dj = &services[0];
        assert_eq!(dj.name, "DJ Max");
        assert_eq!(dj.category, Category::DJ);
        assert_eq!(dj.price, 5000);
        assert_eq!(dj.rating, 4.5);
        assert_eq!(dj.availability, vec!["2025-08-25", "2025-08-28", "2025-09-02"]);
        assert_eq!(dj.reviews.len(), 4);
        assert!(services.iter().all(|s| !s.images.is_empty()));
    }

    #[test]
    fn test_unknown_category_is_kept() {
        let category: Category = serde_json::from_str(r#""Decorator""#).unwrap();
        assert_eq!(category, Category::Other("Decorator".to_string()));
        assert_eq!(serde_json::to_string(&category).unwrap(), r#""Decorator""#);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_until_latency_elapses() {
        let source = MockCatalogSource::sample(&ExpoConfig::default()).unwrap();
        let (store, _) = store_with(source);

        let handle = store.spawn_load();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(store.is_loading());
        assert!(store.services().is_none());

        let catalog = handle.wait().await.unwrap();
        assert_eq!(catalog.len(), 3);
        assert!(!store.is_loading());
        assert_eq!(store.get(2).map(|s| s.name.clone()), Some("Click Studios".to_string()));
    }

    #[tokio::test]
    async fn test_load_settles_once() {
        let (store, source) = store_with(MockCatalogSource::new(sample_services().unwrap()));

        let first = store.load().await.unwrap();
        let second = store.load().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_loads_share_one_fetch() {
        let source = MockCatalogSource::sample(&ExpoConfig::default()).unwrap();
        let (store, source) = store_with(source);

        let (first, second) = tokio::join!(store.load(), store.load());

        assert!(Arc::ptr_eq(&first.unwrap(), &second.unwrap()));
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_reported_not_retried() {
        let source = MockCatalogSource::new(sample_services().unwrap());
        source.fail_next_loads(1);
        let (store, source) = store_with(source);

        assert!(matches!(store.load().await, Err(FetchError::Network(_))));
        assert!(!store.is_loading());
        assert!(matches!(store.state(), CatalogState::Failed(_)));

        assert!(matches!(store.load().await, Err(FetchError::Unavailable(_))));
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sample_source_uses_configured_latency() {
        let config = ExpoConfig::from_json_str(r#"{ "load_latency_ms": 50 }"#).unwrap();
        let (store, _) = store_with(MockCatalogSource::sample(&config).unwrap());

        let handle = store.spawn_load();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(store.is_loading());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!store.is_loading());
        assert_eq!(handle.wait().await.unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_load_applies_nothing() {
        let source = MockCatalogSource::sample(&ExpoConfig::default()).unwrap();
        let (store, _) = store_with(source);

        let handle = store.spawn_load();
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.cancel();
        assert!(handle.is_cancelled());

        assert!(matches!(handle.wait().await, Err(FetchError::Cancelled)));
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(store.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_tears_down_load() {
        let source = MockCatalogSource::sample(&ExpoConfig::default()).unwrap();
        let (store, _) = store_with(source);

        drop(store.spawn_load());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(store.is_loading());
    }
}
