pub mod config;
pub mod error;
pub mod file_config;
pub mod persist;
pub mod seed;
pub mod store;
pub mod types;

pub use config::AppConfig;
pub use error::{StoreError, StoreResult};
pub use file_config::FileConfig;
pub use persist::{load_state, save_state, FileStore, KeyValueStore, MemoryStore};
pub use store::{AppState, StateEvent};
pub use types::*;
