//! CNPJ Insight Core
//!
//! Everything the dashboard does that does not touch the DOM:
//! - format: currency, CNPJ, CNAE, dates and badge/colour tiers
//! - models: tolerant raw backend records and their normalized forms
//! - pipeline / filters: filter → sort → paginate over in-memory lists
//! - market: KPI card derivation
//! - intent / reply: the chat assistant's router and reply formatting
//! - recents / favorites: small list-maintenance rules backed by storage

pub mod config;
pub mod error;
pub mod favorites;
pub mod filters;
pub mod format;
pub mod intent;
pub mod market;
pub mod models;
pub mod pipeline;
pub mod recents;
pub mod reply;

mod lenient;

pub use config::AppConfig;
pub use error::ApiError;
pub use intent::{classify, Intent, Section, SectionJump};
pub use pipeline::{paginate, Page};
pub use reply::{dispatch, RegistryApi};
