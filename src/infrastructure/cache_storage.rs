// Generation-keyed response store backing the cache interceptor
use crate::infrastructure::http_fetch::HttpResponse;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Store a whole generation at once, replacing any previous contents
    /// under the same name.
    async fn put_generation(&self, generation: &str, entries: Vec<(String, HttpResponse)>);

    /// Exact-URL lookup within one generation.
    async fn lookup(&self, generation: &str, url: &str) -> Option<HttpResponse>;

    async fn generations(&self) -> Vec<String>;

    async fn delete_generation(&self, generation: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    generations: RwLock<HashMap<String, HashMap<String, HttpResponse>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn put_generation(&self, generation: &str, entries: Vec<(String, HttpResponse)>) {
        let entries: HashMap<String, HttpResponse> = entries.into_iter().collect();
        self.generations
            .write()
            .await
            .insert(generation.to_string(), entries);
    }

    async fn lookup(&self, generation: &str, url: &str) -> Option<HttpResponse> {
        self.generations
            .read()
            .await
            .get(generation)
            .and_then(|entries| entries.get(url))
            .cloned()
    }

    async fn generations(&self) -> Vec<String> {
        let mut names: Vec<String> = self.generations.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    async fn delete_generation(&self, generation: &str) -> bool {
        self.generations.write().await.remove(generation).is_some()
    }
}
