use serde::{Deserialize, Serialize};

use crate::data::model::Row;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Descriptive statistics of one column, at full `f64` precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation (divisor `count`).
    pub std_dev: f64,
}

/// One line of a [`StatsTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsEntry {
    pub column: String,
    #[serde(flatten)]
    pub stats: ColumnStats,
}

/// Column → statistics, in selection order.
///
/// A column without any numeric value has no entry at all; `get` returning
/// `None` means "no statistics available", which is not the same as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsTable {
    entries: Vec<StatsEntry>,
}

impl StatsTable {
    pub fn get(&self, column: &str) -> Option<&ColumnStats> {
        self.entries
            .iter()
            .find(|e| e.column == column)
            .map(|e| &e.stats)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatsEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Square correlation matrix aligned with `columns`, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// A pair of distinct columns and their correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedPair {
    pub first: String,
    pub second: String,
    pub r: f64,
}

impl CorrelationMatrix {
    /// Number of columns (and rows).
    pub fn size(&self) -> usize {
        self.columns.len()
    }

    /// Correlation between columns `i` and `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is not below [`size`](Self::size). Use
    /// [`try_get`](Self::try_get) for unchecked indices.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    /// Correlation between columns `i` and `j`, `None` when out of range.
    pub fn try_get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i)?.get(j).copied()
    }

    /// Distinct pairs (upper triangle) with `|r| >= threshold`, strongest first.
    pub fn strong_pairs(&self, threshold: f64) -> Vec<CorrelatedPair> {
        let n = self.size();
        let mut pairs: Vec<CorrelatedPair> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .filter(|&(i, j)| self.values[i][j].abs() >= threshold)
            .map(|(i, j)| CorrelatedPair {
                first: self.columns[i].clone(),
                second: self.columns[j].clone(),
                r: self.values[i][j],
            })
            .collect();
        pairs.sort_by(|a, b| b.r.abs().total_cmp(&a.r.abs()));
        pairs
    }
}

/// Everything one "Analyse" click produces. Replaced as a whole in UI state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub dataset: String,
    pub row_count: usize,
    pub columns: Vec<String>,
    pub statistics: StatsTable,
    pub correlation: CorrelationMatrix,
}

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// Statistics of the numeric cells of `column`.
///
/// Non-numeric and missing cells are dropped silently. Returns `None` when
/// nothing numeric remains.
pub fn compute_column_stats<'a, I>(rows: I, column: &str) -> Option<ColumnStats>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut values: Vec<f64> = rows
        .into_iter()
        .filter_map(|row| row.number(column))
        .collect();

    if values.is_empty() {
        return None;
    }

    values.sort_by(f64::total_cmp);
    let count = values.len();
    let n = count as f64;
    let min = values[0];
    let max = values[count - 1];

    // Work on values divided by a power of two near the largest magnitude:
    // exact, and sums of squares can no longer overflow.
    let scale = pow2_scale(min.abs().max(max.abs()));
    let scaled_mean = values.iter().map(|v| v / scale).sum::<f64>() / n;
    let mean = (scaled_mean * scale).clamp(min, max);

    let mid = count / 2;
    let median = if count % 2 == 0 {
        (values[mid - 1] / scale + values[mid] / scale) / 2.0 * scale
    } else {
        values[mid]
    };

    let variance = values
        .iter()
        .map(|v| (v / scale - scaled_mean).powi(2))
        .sum::<f64>()
        / n;

    Some(ColumnStats {
        count,
        mean,
        median,
        min,
        max,
        std_dev: variance.sqrt() * scale,
    })
}

/// Power of two close to `max_abs`, used to bring values near 1 before
/// squaring. Division by it is exact for every normal `f64`.
fn pow2_scale(max_abs: f64) -> f64 {
    if max_abs == 0.0 {
        return 1.0;
    }
    let exp = max_abs.log2().floor().clamp(-1022.0, 1023.0) as i32;
    2f64.powi(exp)
}

/// Statistics for each selected column, in selection order, omitting
/// columns that have no numeric values.
pub fn compute_statistics<'a, I>(rows: I, columns: &[String]) -> StatsTable
where
    I: IntoIterator<Item = &'a Row> + Clone,
{
    let entries = columns
        .iter()
        .filter_map(|column| {
            let stats = compute_column_stats(rows.clone(), column);
            if stats.is_none() {
                log::debug!("column '{column}' has no numeric values, omitted");
            }
            Some(StatsEntry {
                column: column.clone(),
                stats: stats?,
            })
        })
        .collect();

    StatsTable { entries }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation of two columns over the rows where both are numeric.
///
/// The means are taken over those shared rows only. Returns `0.0` when either
/// side has zero variance, which includes the no-shared-rows case. The result
/// is always within `[-1, 1]`, whatever the magnitude of the inputs.
pub fn pearson<'a, I>(rows: I, x_column: &str, y_column: &str) -> f64
where
    I: IntoIterator<Item = &'a Row>,
{
    let pairs: Vec<(f64, f64)> = rows
        .into_iter()
        .filter_map(|row| Some((row.number(x_column)?, row.number(y_column)?)))
        .collect();

    if pairs.is_empty() {
        return 0.0;
    }

    let (max_x, max_y) = pairs
        .iter()
        .fold((0.0f64, 0.0f64), |(mx, my), &(x, y)| (mx.max(x.abs()), my.max(y.abs())));
    let (sx, sy) = (pow2_scale(max_x), pow2_scale(max_y));

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0 / sx).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1 / sy).sum::<f64>() / n;

    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_yy = 0.0;
    for &(x, y) in &pairs {
        let dx = x / sx - mean_x;
        let dy = y / sy - mean_y;
        sum_xy += dx * dy;
        sum_xx += dx * dx;
        sum_yy += dy * dy;
    }

    // A constant side can still leave rounding residue in its deviations.
    let (x0, y0) = pairs[0];
    let x_constant = pairs.iter().all(|p| p.0 == x0);
    let y_constant = pairs.iter().all(|p| p.1 == y0);
    if x_constant || y_constant || sum_xx == 0.0 || sum_yy == 0.0 {
        return 0.0;
    }
    (sum_xy / (sum_xx.sqrt() * sum_yy.sqrt())).clamp(-1.0, 1.0)
}

/// Pairwise correlation matrix over the selected columns.
///
/// The diagonal is `1.0` whatever the data. Each off-diagonal entry is
/// computed on its own, so `[i][j]` and `[j][i]` agree up to rounding.
pub fn compute_correlation_matrix<'a, I>(rows: I, columns: &[String]) -> CorrelationMatrix
where
    I: IntoIterator<Item = &'a Row> + Clone,
{
    let values = columns
        .iter()
        .enumerate()
        .map(|(i, col_i)| {
            columns
                .iter()
                .enumerate()
                .map(|(j, col_j)| {
                    if i == j {
                        1.0
                    } else {
                        pearson(rows.clone(), col_i, col_j)
                    }
                })
                .collect()
        })
        .collect();

    CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    }
}

/// Run the full analysis over `rows` for the selected columns.
pub fn analyze<'a, I>(dataset: &str, rows: I, columns: &[String]) -> AnalysisReport
where
    I: IntoIterator<Item = &'a Row> + Clone,
{
    let row_count = rows.clone().into_iter().count();
    let statistics = compute_statistics(rows.clone(), columns);
    let correlation = compute_correlation_matrix(rows, columns);

    log::info!(
        "analysed {row_count} rows of '{dataset}': {} of {} columns have statistics",
        statistics.len(),
        columns.len()
    );

    AnalysisReport {
        dataset: dataset.to_string(),
        row_count,
        columns: columns.to_vec(),
        statistics,
        correlation,
    }
}
