//! Core of the rusty-dash data dashboard.
//!
//! Everything that does not draw pixels lives here so it can be tested
//! without a window: the tabular data model and loaders, row filters, the
//! statistics engine, chart series preparation, saved reports, export, and
//! settings.
//! The `rusty-dash` binary wraps these in an egui shell.

pub mod chart;
pub mod data;
pub mod error;
pub mod export;
pub mod report;
pub mod settings;
pub mod stats;
