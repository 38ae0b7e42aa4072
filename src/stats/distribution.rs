use serde::{Deserialize, Serialize};

use crate::data::model::Row;

/// One equal-width interval of a value distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    /// Share of all numeric values, in percent.
    pub percentage: f64,
}

impl Bucket {
    /// Axis label such as `"1.0-2.5"`.
    pub fn label(&self) -> String {
        format!("{:.1}-{:.1}", self.lower, self.upper)
    }
}

/// Distribution of the numeric cells of `column` over `buckets` equal-width
/// intervals `[lower, upper)`. The last interval also holds the maximum.
///
/// A constant column yields a single bucket holding every value; a column
/// without numeric cells (or `buckets == 0`) yields nothing.
pub fn histogram<'a, I>(rows: I, column: &str, buckets: usize) -> Vec<Bucket>
where
    I: IntoIterator<Item = &'a Row>,
{
    let values: Vec<f64> = rows
        .into_iter()
        .filter_map(|row| row.number(column))
        .collect();

    if values.is_empty() || buckets == 0 {
        return Vec::new();
    }

    let total = values.len();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range == 0.0 {
        return vec![Bucket {
            lower: min,
            upper: max,
            count: total,
            percentage: 100.0,
        }];
    }

    let width = range / buckets as f64;
    let mut counts = vec![0usize; buckets];
    for v in &values {
        let idx = (((v - min) / width) as usize).min(buckets - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(k, count)| {
            let lower = min + k as f64 * width;
            let upper = if k + 1 == buckets { max } else { lower + width };
            Bucket {
                lower,
                upper,
                count,
                percentage: count as f64 / total as f64 * 100.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;
    use approx::assert_relative_eq;

    fn rows(values: &[f64]) -> Vec<Row> {
        values
            .iter()
            .map(|&v| Row::from_iter([("v", v)]))
            .collect()
    }

    #[test]
    fn counts_cover_every_value_including_max() {
        let data = rows(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        let hist = histogram(&data, "v", 10);

        assert_eq!(hist.len(), 10);
        assert_eq!(hist.iter().map(|b| b.count).sum::<usize>(), 11);
        assert_eq!(hist[9].count, 2);
        assert_relative_eq!(hist[9].upper, 10.0);
        assert_relative_eq!(hist[0].percentage, 100.0 / 11.0);
        assert_eq!(hist[0].label(), "0.0-1.0");
    }

    #[test]
    fn constant_column_single_bucket() {
        let data = rows(&[4.0, 4.0, 4.0]);
        let hist = histogram(&data, "v", 10);
        assert_eq!(hist.len(), 1);
        assert_eq!(hist[0].count, 3);
        assert_relative_eq!(hist[0].percentage, 100.0);
    }

    #[test]
    fn no_numeric_values_no_buckets() {
        let data = vec![Row::from_iter([("v", CellValue::from("n/a"))])];
        assert!(histogram(&data, "v", 10).is_empty());
        assert!(histogram(&rows(&[1.0, 2.0]), "v", 0).is_empty());
    }
}
