//! `rollsync-recon` — membership-to-CRM reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded records, returns classified
//! results. The only IO surface is the CSV normalization boundary in
//! [`engine`]; no CLI dependencies.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod payment;
pub mod status;
pub mod summary;

pub use config::SyncConfig;
pub use engine::run;
pub use error::ReconError;
pub use model::{ReconInput, ReconResult};
