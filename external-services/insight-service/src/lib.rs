//! Health summary generation
//!
//! VitalWatch does not generate text itself. It renders a fixed prompt from
//! the patient's profile and latest vital sample and relays whatever the
//! configured text-generation provider returns.
//!
//! ```rust
//! use insight_service::{create_generator, InsightConfig};
//!
//! // No API key configured: the feature is simply unavailable
//! let generator = create_generator(&InsightConfig::default()).unwrap();
//! assert!(generator.is_none());
//! ```

pub mod config;
pub mod error;
pub mod prompt;
pub mod providers;

pub use config::*;
pub use error::*;
pub use prompt::*;
pub use providers::*;
