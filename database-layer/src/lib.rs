//! Health data store for the VitalWatch engine
//!
//! The [`HealthStore`] trait is the only way the API layer touches
//! persistent state. Two backends implement it:
//!
//! - [`InMemoryStore`]: concurrent in-process tables, used for development
//!   and tests
//! - [`PostgresStore`]: PostgreSQL via `sqlx`, with email uniqueness and
//!   foreign references enforced by the schema
//!
//! Timestamps come from an injected [`Clock`] so history windows can be
//! tested against a fixed "now".
//!
//! # Example
//!
//! ```rust
//! use database_layer::{FilterPeriod, HealthStore, InMemoryStore, SystemClock};
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! # async fn demo() -> database_layer::DatabaseResult<()> {
//! let store = InMemoryStore::new(Arc::new(SystemClock));
//! let today = store
//!     .list_vital_samples_by_user(Uuid::new_v4(), FilterPeriod::parse("day"))
//!     .await?;
//! assert!(today.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod connection;
pub mod error;
pub mod memory;
pub mod merge;
pub mod models;
pub mod period;
pub mod postgres;
pub mod store;

pub use clock::*;
pub use connection::*;
pub use error::*;
pub use memory::*;
pub use merge::*;
pub use models::*;
pub use period::*;
pub use postgres::*;
pub use store::*;
