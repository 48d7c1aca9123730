// Offline-first cache interceptor over a closed asset manifest
use crate::application::errors::{CacheError, SyncError};
use crate::domain::cache_manifest::CacheManifest;
use crate::infrastructure::cache_storage::CacheStorage;
use crate::infrastructure::http_fetch::{HttpFetch, HttpRequest, HttpResponse};
use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptorState {
    /// No generation has finished installing; every request hits the network.
    Installing,
    Active { generation: String },
}

/// Serves manifest URLs from the active generation and falls through to the
/// network for everything else. Runtime responses are never stored.
pub struct CacheInterceptor {
    network: Arc<dyn HttpFetch>,
    storage: Arc<dyn CacheStorage>,
    active: RwLock<Option<String>>,
}

impl CacheInterceptor {
    pub fn new(network: Arc<dyn HttpFetch>, storage: Arc<dyn CacheStorage>) -> Self {
        Self {
            network,
            storage,
            active: RwLock::new(None),
        }
    }

    pub async fn state(&self) -> InterceptorState {
        match self.active.read().await.clone() {
            Some(generation) => InterceptorState::Active { generation },
            None => InterceptorState::Installing,
        }
    }

    /// Precache every manifest URL, then activate the generation. Any failed
    /// or non-2xx fetch aborts the install before anything is stored, so the
    /// previously active generation keeps serving.
    pub async fn install(&self, manifest: &CacheManifest) -> Result<(), CacheError> {
        let generation = manifest.generation.to_string();
        tracing::info!(%generation, assets = manifest.urls.len(), "installing asset cache");

        let fetches = manifest.urls.iter().map(|url| {
            let generation = generation.clone();
            async move {
                let response = self
                    .network
                    .get(&HttpRequest::asset(url.as_str()))
                    .await
                    .map_err(|source| CacheError::ManifestFetch {
                        generation: generation.clone(),
                        url: url.clone(),
                        source,
                    })?;
                if !response.status.is_success() {
                    return Err(CacheError::ManifestStatus {
                        generation,
                        url: url.clone(),
                        status: response.status.as_u16(),
                    });
                }
                Ok((url.clone(), response))
            }
        });

        let entries = match try_join_all(fetches).await {
            Ok(entries) => entries,
            Err(error) => {
                tracing::warn!(%generation, error = %error, "asset cache install failed");
                return Err(error);
            }
        };

        self.storage.put_generation(&generation, entries).await;
        self.activate(&generation).await;
        Ok(())
    }

    async fn activate(&self, generation: &str) {
        *self.active.write().await = Some(generation.to_string());

        for stale in self.storage.generations().await {
            if stale != generation && self.storage.delete_generation(&stale).await {
                tracing::info!(generation = %stale, "deleted stale cache generation");
            }
        }
        tracing::info!(%generation, "asset cache active");
    }
}

#[async_trait]
impl HttpFetch for CacheInterceptor {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, SyncError> {
        let active = self.active.read().await.clone();
        if let Some(generation) = active {
            if let Some(cached) = self.storage.lookup(&generation, &request.url).await {
                tracing::debug!(url = %request.url, %generation, "served from cache");
                return Ok(cached);
            }
        }

        self.network.get(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache_manifest::CacheGeneration;
    use crate::infrastructure::cache_storage::MemoryCacheStorage;
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Network double: known URLs answer 200, everything else is unreachable.
    #[derive(Default)]
    struct FakeNetwork {
        bodies: Mutex<HashMap<String, String>>,
        offline: AtomicBool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeNetwork {
        fn serving(urls: &[&str]) -> Self {
            let network = Self::default();
            for url in urls {
                network.set_body(url, &format!("body of {}", url));
            }
            network
        }

        fn set_body(&self, url: &str, body: &str) {
            self.bodies
                .lock()
                .unwrap()
                .insert(url.to_string(), body.to_string());
        }

        fn calls_to(&self, url: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
        }
    }

    #[async_trait]
    impl HttpFetch for FakeNetwork {
        async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, SyncError> {
            self.calls.lock().unwrap().push(request.url.clone());
            if self.offline.load(Ordering::SeqCst) {
                return Err(SyncError::transport(&request.url, None, "network unreachable"));
            }
            match self.bodies.lock().unwrap().get(&request.url) {
                Some(body) => Ok(HttpResponse::new(&request.url, StatusCode::OK, body.clone())),
                None => Err(SyncError::transport(&request.url, None, "dns error")),
            }
        }
    }

    fn manifest(version: &str, urls: &[&str]) -> CacheManifest {
        CacheManifest::from_assets(CacheGeneration::new("iotsync", version), "http://app.local", urls)
    }

    fn setup(network: FakeNetwork) -> (CacheInterceptor, Arc<FakeNetwork>, Arc<MemoryCacheStorage>) {
        let network = Arc::new(network);
        let storage = Arc::new(MemoryCacheStorage::new());
        let interceptor = CacheInterceptor::new(network.clone(), storage.clone());
        (interceptor, network, storage)
    }

    #[tokio::test]
    async fn test_installed_assets_served_offline() {
        let (interceptor, network, _) =
            setup(FakeNetwork::serving(&["http://app.local/", "http://app.local/app.js"]));

        interceptor.install(&manifest("v1", &["/", "/app.js"])).await.unwrap();
        assert_eq!(
            interceptor.state().await,
            InterceptorState::Active { generation: "iotsync@v1".to_string() }
        );

        network.offline.store(true, Ordering::SeqCst);
        let response = interceptor.get(&HttpRequest::asset("http://app.local/app.js")).await.unwrap();
        assert_eq!(&response.body[..], b"body of http://app.local/app.js");
        assert_eq!(network.calls_to("http://app.local/app.js"), 1);
    }

    #[tokio::test]
    async fn test_unreachable_manifest_url_blocks_activation() {
        let (interceptor, network, storage) = setup(FakeNetwork::serving(&["http://app.local/"]));

        let err = interceptor
            .install(&manifest("v1", &["/", "/missing.css"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::ManifestFetch { ref url, .. } if url == "http://app.local/missing.css"));
        assert_eq!(interceptor.state().await, InterceptorState::Installing);
        assert!(storage.generations().await.is_empty());

        interceptor.get(&HttpRequest::asset("http://app.local/")).await.unwrap();
        assert_eq!(network.calls_to("http://app.local/"), 2);
    }

    #[tokio::test]
    async fn test_runtime_responses_are_not_cached() {
        let api = "http://sensor.local/api/temperature/current";
        let (interceptor, network, storage) = setup(FakeNetwork::serving(&["http://app.local/", api]));
        interceptor.install(&manifest("v1", &["/"])).await.unwrap();

        interceptor.get(&HttpRequest::json(api)).await.unwrap();
        network.set_body(api, "fresh");
        let second = interceptor.get(&HttpRequest::json(api)).await.unwrap();

        assert_eq!(&second.body[..], b"fresh");
        assert_eq!(network.calls_to(api), 2);
        assert!(storage.lookup("iotsync@v1", api).await.is_none());
    }

    #[tokio::test]
    async fn test_activation_deletes_stale_generations() {
        let (interceptor, _, storage) = setup(FakeNetwork::serving(&["http://app.local/"]));
        storage.put_generation("iotsync@v0", Vec::new()).await;
        storage.put_generation("other@v9", Vec::new()).await;

        interceptor.install(&manifest("v1", &["/"])).await.unwrap();
        assert_eq!(storage.generations().await, vec!["iotsync@v1"]);
    }

    #[tokio::test]
    async fn test_failed_upgrade_keeps_previous_generation() {
        let (interceptor, network, storage) = setup(FakeNetwork::serving(&["http://app.local/"]));
        interceptor.install(&manifest("v1", &["/"])).await.unwrap();

        let result = interceptor.install(&manifest("v2", &["/", "/new.js"])).await;
        assert!(result.is_err());
        assert_eq!(
            interceptor.state().await,
            InterceptorState::Active { generation: "iotsync@v1".to_string() }
        );
        assert_eq!(storage.generations().await, vec!["iotsync@v1"]);

        network.offline.store(true, Ordering::SeqCst);
        assert!(interceptor.get(&HttpRequest::asset("http://app.local/")).await.is_ok());
    }

    #[tokio::test]
    async fn test_non_success_status_fails_install() {
        struct NotFound;

        #[async_trait]
        impl HttpFetch for NotFound {
            async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, SyncError> {
                Ok(HttpResponse::new(&request.url, StatusCode::NOT_FOUND, "missing"))
            }
        }

        let interceptor = CacheInterceptor::new(Arc::new(NotFound), Arc::new(MemoryCacheStorage::new()));
        let err = interceptor.install(&manifest("v1", &["/"])).await.unwrap_err();
        assert!(matches!(err, CacheError::ManifestStatus { status: 404, .. }));
        assert_eq!(interceptor.state().await, InterceptorState::Installing);
    }
}
