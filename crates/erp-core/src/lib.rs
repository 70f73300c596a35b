//! erp-core: Core library for the tk-erp data layer
//!
//! Provides the data model, whole-graph storage and date-scoped document
//! numbering for a small-business ERP. No server, no database - one JSON
//! blob loaded and saved wholesale.

pub mod clock;
pub mod config;
pub mod document;
pub mod error;
pub mod id;
pub mod manager;
pub mod patch;
pub mod seed;
pub mod stats;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use document::DocumentGraph;
pub use error::Error;
pub use id::{DocumentKind, IdAllocator};
pub use manager::DataManager;
pub use patch::Patch;
pub use stats::DashboardStats;
pub use store::{JsonFileStore, MemoryStore, Store};

/// Result type for tk-erp operations
pub type Result<T> = std::result::Result<T, Error>;
