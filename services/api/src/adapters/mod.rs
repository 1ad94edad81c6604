pub mod blob;
pub mod db;
pub mod memory;

pub use blob::LocalBlobStorage;
pub use db::DbAdapter;
pub use memory::InMemoryStore;
