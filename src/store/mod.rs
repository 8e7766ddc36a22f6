pub mod disk;
pub mod memory;

use crate::core::cache::KeyValueCollection;
use disk::DiskCollection;
use memory::MemoryCollection;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::hash::Hash;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Opens the named collection under `data_path/cache`, falling back to an
/// in-memory collection when the directory cannot be used.
pub fn open_collection<K, V>(data_path: Option<&Path>, name: &str) -> Arc<dyn KeyValueCollection<K, V>>
where
    K: Eq + Hash + Serialize + Debug + Send + Sync + 'static,
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    if let Some(path) = data_path {
        match DiskCollection::open(&path.join("cache"), name) {
            Ok(collection) => return Arc::new(collection),
            Err(e) => debug!("Falling back to memory cache for {}: {}", name, e),
        }
    }
    Arc::new(MemoryCollection::new())
}
