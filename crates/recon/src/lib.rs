//! `planfact-recon`: plan-vs-actual expense reconciliation engine.
//!
//! Pure engine crate: receives pre-fetched worksheet tables, returns
//! reconciled rows filtered for the caller. No CLI dependencies; the only IO
//! lives behind the [`source::DataProvider`] trait.

pub mod access;
pub mod aggregate;
pub mod columns;
pub mod config;
pub mod engine;
pub mod error;
pub mod kpi;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod source;
pub mod summary;

pub use access::{filter_for, filter_for_caller, filter_projects, Caller, FilterOutcome, IdentityResolver, Role, StaticCredentials};
pub use config::ReconConfig;
pub use engine::{load_input, reconcile, run};
pub use error::{AccessError, ReconError, Side};
pub use model::{Cell, ReconInput, ReconResult, ReconciledRecord, Table};
pub use normalize::normalize_amount;
