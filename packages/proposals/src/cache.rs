//! In-memory classification cache.
//!
//! Keyed by the exact description string. Entries never expire: the cache
//! lives as long as its owner (normally one `Classifier` per process).
//! Each key holds a once-cell, so concurrent lookups of the same uncached
//! description wait on a single computation instead of issuing duplicate
//! backend calls.

use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::types::proposal::ClassificationResult;

/// Description → classification memo.
#[derive(Default)]
pub struct ClassificationCache {
    entries: DashMap<String, Arc<OnceCell<ClassificationResult>>>,
}

impl ClassificationCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for a description, if one has been computed.
    pub fn get(&self, description: &str) -> Option<ClassificationResult> {
        self.entries
            .get(description)
            .and_then(|cell| cell.get().cloned())
    }

    /// Store a result, replacing any previous one.
    pub fn put(&self, description: impl Into<String>, result: ClassificationResult) {
        self.entries
            .insert(description.into(), Arc::new(OnceCell::new_with(Some(result))));
    }

    /// Return the cached result or compute, store and return it.
    ///
    /// Callers racing on the same key share one `init` run.
    pub async fn get_or_insert_with<F, Fut>(&self, description: &str, init: F) -> ClassificationResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClassificationResult>,
    {
        // Clone the cell out so no map shard lock is held across the await.
        let cell = Arc::clone(&self.entries.entry(description.to_string()).or_default());
        cell.get_or_init(init).await.clone()
    }

    /// Number of descriptions with a stored result.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::category::Category;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_get_absent_then_put() {
        let cache = ClassificationCache::new();
        assert!(cache.get("Troca de lâmpadas").is_none());
        assert!(cache.is_empty());

        let result = ClassificationResult::new(
            Category::IluminacaoPublica,
            vec!["Rua Garibaldi".to_string()],
        );
        cache.put("Troca de lâmpadas", result.clone());

        assert_eq!(cache.get("Troca de lâmpadas"), Some(result));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keys_are_exact_strings() {
        let cache = ClassificationCache::new();
        cache.put("Poda de árvores", ClassificationResult::fallback());

        assert!(cache.get("Poda de árvores ").is_none());
        assert!(cache.get("poda de árvores").is_none());
    }

    #[tokio::test]
    async fn test_get_or_insert_runs_init_once() {
        let cache = ClassificationCache::new();
        let runs = AtomicUsize::new(0);

        for _ in 0..3 {
            let result = cache
                .get_or_insert_with("Ementa", || async {
                    runs.fetch_add(1, Ordering::SeqCst);
                    ClassificationResult::new(Category::PrediosPublicos, vec![])
                })
                .await;
            assert_eq!(result.category, Category::PrediosPublicos);
        }

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_put_overrides_computed_entry() {
        let cache = ClassificationCache::new();
        cache
            .get_or_insert_with("Ementa", || async { ClassificationResult::fallback() })
            .await;

        cache.put(
            "Ementa",
            ClassificationResult::new(Category::GestaoDeResiduos, vec![]),
        );

        assert_eq!(
            cache.get("Ementa").map(|r| r.category),
            Some(Category::GestaoDeResiduos)
        );
    }
}
