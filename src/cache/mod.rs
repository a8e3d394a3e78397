// Cache generation module
//
// A "generation" is a named, durable key-value store mapping request
// identities to stored response snapshots. Two generations are current at
// any time: the precache (application shell) and the runtime cache.

pub mod entry;
pub mod error;
pub mod memory;
pub mod stats;
pub mod traits;

pub use entry::{RequestKey, StoredResponse};
pub use error::CacheError;
pub use memory::{MemoryCacheStorage, MemoryGeneration};
pub use stats::CacheStats;
pub use traits::{CacheStorage, Generation};
