pub mod memory_kv;
pub mod sqlite_kv;
pub mod traits;

pub use memory_kv::MemoryKeyValueStore;
pub use sqlite_kv::SqliteKeyValueStore;
pub use traits::KeyValueStore;
