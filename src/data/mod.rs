//! Tabular data: cells, rows and datasets ([`model`]), file readers
//! ([`loader`]), the in-memory list of loaded datasets ([`library`]) and
//! categorical row filters ([`filter`]).
//!
//! A loaded [`model::Dataset`] is never modified by filtering. Filters only
//! produce the indices of visible rows, and those rows are what the
//! statistics, charts and exports downstream are fed.

pub mod filter;
pub mod library;
pub mod loader;
pub mod model;
