//! # CareSwap Persistence
//!
//! Storage for users, admins, help requests and the moderation log.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 dyn Store                    │
//! │  ┌───────────────┐      ┌─────────────────┐  │
//! │  │  MemoryStore  │      │   SqliteStore   │  │
//! │  │  (RwLock)     │      │ (repos + tx)    │  │
//! │  └───────────────┘      └─────────────────┘  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use careswap_persistence::{SqliteStore, Store};
//!
//! let store = SqliteStore::open(Path::new("data/careswap.db")).await?;
//! let user = store.find_user_by_email("senior@test.com").await?;
//! ```

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use error::{PersistenceError, PersistenceResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::{AcceptOutcome, RequestFilter, Store};
