//! Statistics over the visible rows of a dataset.
//!
//! * [`engine`] – descriptive statistics and the Pearson correlation matrix
//! * [`distribution`] – bucketed value distribution of one column
//! * [`format`] – display rounding and correlation strength bands
//!
//! Every function here is total: bad or missing cells degrade to omitted
//! entries or zero correlations, never to errors.

pub mod distribution;
pub mod engine;
pub mod format;

pub use engine::{
    AnalysisReport, ColumnStats, CorrelatedPair, CorrelationMatrix, StatsTable, analyze,
    compute_column_stats, compute_correlation_matrix, compute_statistics,
};
