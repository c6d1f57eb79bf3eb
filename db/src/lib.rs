//! Catalog storage and configuration for tabgen.
//!
//! The catalog keeps one [`CatalogEntry`] per tool: its path, the version
//! seen on the last scan, and the version and fingerprint its completion
//! scripts were generated from. A [`CatalogStore`] persists the catalog
//! together with extracted tool trees and generated scripts;
//! [`FileStore`] writes them under a base directory and [`MemoryStore`]
//! keeps them in memory for tests.
//!
//! # Quick start
//!
//! ```no_run
//! use tabgen_db::{CatalogEntry, CatalogStore, FileStore, TabgenConfig};
//!
//! let config = TabgenConfig::load("tabgen.yml").unwrap();
//! let store = FileStore::open(config.base_dir().unwrap()).unwrap();
//!
//! let mut catalog = store.load_catalog().unwrap();
//! catalog.insert(CatalogEntry::new("git", "/usr/bin/git"));
//! store.save_catalog(&catalog).unwrap();
//! ```

mod catalog;
mod config;
mod error;
mod store;

pub use catalog::{Catalog, CatalogEntry};
pub use config::{DEFAULT_DIR_NAME, GenerationConfig, MAX_CONFIG_DEPTH, StorageConfig, TabgenConfig};
pub use error::{Result, StorageError};
pub use store::{CatalogStore, FileStore, MemoryStore};
