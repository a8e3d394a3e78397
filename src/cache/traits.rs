//! Cache trait definitions
//!
//! Two seams, mirroring the storage the hosting environment provides:
//! - `CacheStorage`: the process-wide registry of named generations
//!   (open, enumerate, delete)
//! - `Generation`: one named key-value store of response snapshots
//!
//! Both are object-safe so components receive explicitly-injected handles
//! rather than reaching for an ambient global; tests substitute mocks.

use std::sync::Arc;

use async_trait::async_trait;

use super::entry::{RequestKey, StoredResponse};
use super::error::CacheError;
use super::stats::CacheStats;

/// One named cache generation
#[async_trait]
pub trait Generation: Send + Sync {
    /// Look up a stored response by request identity
    /// Returns None on miss
    async fn lookup(&self, key: &RequestKey) -> Result<Option<StoredResponse>, CacheError>;

    /// Store a response snapshot under a request identity
    /// Overwrites any existing entry for that identity (last write wins)
    async fn put(&self, key: RequestKey, response: StoredResponse) -> Result<(), CacheError>;

    /// Enumerate the request identities currently stored
    async fn keys(&self) -> Result<Vec<RequestKey>, CacheError>;

    /// Number of entries currently stored
    async fn len(&self) -> Result<usize, CacheError>;

    /// Get generation statistics
    async fn stats(&self) -> Result<CacheStats, CacheError>;
}

/// Registry of named generations
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a generation by identifier, creating it if absent
    async fn open(&self, name: &str) -> Result<Arc<dyn Generation>, CacheError>;

    /// Enumerate all generation identifiers present in storage
    async fn names(&self) -> Result<Vec<String>, CacheError>;

    /// Delete an entire generation by identifier
    /// Returns true if the generation existed and was deleted
    async fn delete(&self, name: &str) -> Result<bool, CacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    // Mock implementations proving the traits are object-safe and have the
    // intended shapes.
    struct MockGeneration;

    #[async_trait]
    impl Generation for MockGeneration {
        async fn lookup(&self, _key: &RequestKey) -> Result<Option<StoredResponse>, CacheError> {
            Ok(None)
        }

        async fn put(&self, _key: RequestKey, _response: StoredResponse) -> Result<(), CacheError> {
            Ok(())
        }

        async fn keys(&self) -> Result<Vec<RequestKey>, CacheError> {
            Ok(vec![])
        }

        async fn len(&self) -> Result<usize, CacheError> {
            Ok(0)
        }

        async fn stats(&self) -> Result<CacheStats, CacheError> {
            Ok(CacheStats::default())
        }
    }

    struct MockStorage;

    #[async_trait]
    impl CacheStorage for MockStorage {
        async fn open(&self, _name: &str) -> Result<Arc<dyn Generation>, CacheError> {
            Ok(Arc::new(MockGeneration))
        }

        async fn names(&self) -> Result<Vec<String>, CacheError> {
            Ok(vec![])
        }

        async fn delete(&self, _name: &str) -> Result<bool, CacheError> {
            Ok(false)
        }
    }

    #[test]
    fn test_traits_are_object_safe() {
        fn assert_storage(_: &dyn CacheStorage) {}
        fn assert_generation(_: &dyn Generation) {}
        assert_storage(&MockStorage);
        assert_generation(&MockGeneration);
    }

    #[test]
    fn test_mocks_satisfy_send_sync_bounds() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockStorage>();
        assert_send_sync::<MockGeneration>();
    }

    #[tokio::test]
    async fn test_can_drive_mock_through_trait_objects() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MockStorage);
        let generation = storage.open("runtime-cache-v1").await.unwrap();

        let key = RequestKey::get("/data.json");
        assert!(generation.lookup(&key).await.unwrap().is_none());

        let response = StoredResponse::new(200, vec![], Bytes::from("payload"));
        assert!(generation.put(key, response).await.is_ok());
        assert_eq!(generation.len().await.unwrap(), 0);
    }
}
