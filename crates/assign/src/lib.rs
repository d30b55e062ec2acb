//! `abgrid-assign` — Balanced A/B label assignment engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns labelled rows.
//! No CLI or IO dependencies.

pub mod assign;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod group;
pub mod history;
pub mod join;
pub mod model;
pub mod policy;
pub mod summary;

pub use config::AssignConfig;
pub use engine::run;
pub use error::{AssignError, AssignWarning};
pub use model::{AssignInput, AssignResult, AssignedRow, Label, Table};
