use serde::{Deserialize, Serialize};

use crate::data::model::{Dataset, Row};

// ---------------------------------------------------------------------------
// Chart configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Pie,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Bar, ChartKind::Line, ChartKind::Pie];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar",
            ChartKind::Line => "Line",
            ChartKind::Pie => "Pie",
        }
    }
}

/// Kind-specific switches; each kind ignores the ones that do not apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    /// Bar: stack series on top of each other.
    pub stacked: bool,
    /// Bar: draw bars horizontally.
    pub horizontal: bool,
    /// Show value labels / percentages.
    pub show_labels: bool,
    /// Pie: leave a hole in the middle.
    pub donut: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub title: String,
    pub kind: ChartKind,
    /// X axis for bar/line, category for pie.
    pub x_column: Option<String>,
    /// Plotted series for bar/line; only the first is used for pie values.
    pub y_columns: Vec<String>,
    pub options: ChartOptions,
}

impl ChartConfig {
    /// Starting configuration for a freshly loaded dataset: first column on
    /// the x axis, first other numeric column as the only series.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        let x_column = dataset.column_names.first().cloned();
        let y_columns = dataset
            .numeric_columns()
            .into_iter()
            .find(|c| Some(c) != x_column.as_ref())
            .into_iter()
            .collect();
        ChartConfig {
            title: dataset.name.clone(),
            x_column,
            y_columns,
            ..Default::default()
        }
    }

    pub fn toggle_series(&mut self, column: &str) {
        if let Some(pos) = self.y_columns.iter().position(|c| c == column) {
            self.y_columns.remove(pos);
        } else {
            self.y_columns.push(column.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Series preparation (bar / line)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub x: f64,
    pub y: f64,
    /// Text of the x cell, used for category axes and tooltips.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

/// Whether every non-null cell of `column` is numeric (and at least one is).
fn column_is_numeric<'a, I>(rows: I, column: &str) -> bool
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut seen = false;
    for row in rows {
        let cell = row.get(column);
        if cell.is_null() {
            continue;
        }
        if cell.as_f64().is_none() {
            return false;
        }
        seen = true;
    }
    seen
}

/// One series per y column. The x coordinate is the numeric x cell when the
/// x column is numeric, otherwise the row position. Rows whose y cell is not
/// numeric (or whose numeric x cell is missing) are skipped.
pub fn build_series<'a, I>(rows: I, config: &ChartConfig) -> Vec<Series>
where
    I: IntoIterator<Item = &'a Row> + Clone,
{
    let x_column = config.x_column.as_deref();
    let x_numeric = x_column.is_some_and(|x| column_is_numeric(rows.clone(), x));

    config
        .y_columns
        .iter()
        .map(|y_column| {
            let points = rows
                .clone()
                .into_iter()
                .enumerate()
                .filter_map(|(pos, row)| {
                    let y = row.number(y_column)?;
                    let (x, label) = match x_column {
                        Some(col) if x_numeric => {
                            let x = row.number(col)?;
                            (x, row.get(col).to_string())
                        }
                        Some(col) => (pos as f64, row.get(col).to_string()),
                        None => (pos as f64, pos.to_string()),
                    };
                    Some(SeriesPoint { x, y, label })
                })
                .collect();
            Series {
                name: y_column.clone(),
                points,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pie slices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    /// Share of the positive total, in `[0, 1]`.
    pub fraction: f64,
}

/// Sum `value_column` per distinct `name_column` label, in first-appearance
/// order. Categories whose total is not positive are dropped.
pub fn pie_slices<'a, I>(rows: I, name_column: &str, value_column: &str) -> Vec<PieSlice>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut totals: Vec<(String, f64)> = Vec::new();
    for row in rows {
        let Some(value) = row.number(value_column) else {
            continue;
        };
        let label = row.get(name_column).to_string();
        match totals.iter_mut().find(|(l, _)| *l == label) {
            Some((_, sum)) => *sum += value,
            None => totals.push((label, value)),
        }
    }

    totals.retain(|(_, v)| *v > 0.0);
    let total: f64 = totals.iter().map(|(_, v)| v).sum();

    totals
        .into_iter()
        .map(|(label, value)| PieSlice {
            label,
            value,
            fraction: value / total,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;
    use approx::assert_relative_eq;

    fn sales() -> Vec<Row> {
        vec![
            Row::from_iter([
                ("region", CellValue::from("North")),
                ("sales", CellValue::Float(10.0)),
                ("units", CellValue::Integer(1)),
            ]),
            Row::from_iter([
                ("region", CellValue::from("South")),
                ("sales", CellValue::from("n/a")),
                ("units", CellValue::Integer(2)),
            ]),
            Row::from_iter([
                ("region", CellValue::from("North")),
                ("sales", CellValue::Float(30.0)),
                ("units", CellValue::Integer(3)),
            ]),
        ]
    }

    #[test]
    fn text_x_axis_uses_row_position() {
        let rows = sales();
        let config = ChartConfig {
            x_column: Some("region".into()),
            y_columns: vec!["sales".into()],
            ..Default::default()
        };
        let series = build_series(&rows, &config);
        assert_eq!(series.len(), 1);
        let xs: Vec<f64> = series[0].points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 2.0]);
        assert_eq!(series[0].points[1].label, "North");
    }

    #[test]
    fn numeric_x_axis_uses_values() {
        let rows = sales();
        let config = ChartConfig {
            x_column: Some("units".into()),
            y_columns: vec!["sales".into(), "units".into()],
            ..Default::default()
        };
        let series = build_series(&rows, &config);
        assert_eq!(series[0].points.len(), 2);
        assert_eq!(series[0].points[1].x, 3.0);
        assert_eq!(series[1].points.len(), 3);
    }

    #[test]
    fn pie_sums_per_category() {
        let rows = sales();
        let slices = pie_slices(&rows, "region", "units");
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].label, "North");
        assert_relative_eq!(slices[0].value, 4.0);
        assert_relative_eq!(slices[0].fraction, 4.0 / 6.0);
        assert_relative_eq!(slices.iter().map(|s| s.fraction).sum::<f64>(), 1.0);
    }

    #[test]
    fn pie_drops_non_positive_totals() {
        let rows = vec![
            Row::from_iter([("k", CellValue::from("a")), ("v", CellValue::Integer(-3))]),
            Row::from_iter([("k", CellValue::from("b")), ("v", CellValue::Integer(5))]),
        ];
        let slices = pie_slices(&rows, "k", "v");
        assert_eq!(slices.len(), 1);
        assert_relative_eq!(slices[0].fraction, 1.0);
    }

    #[test]
    fn default_config_picks_a_numeric_series() {
        let ds = Dataset::new(
            "sales.csv",
            vec!["region".into(), "sales".into(), "units".into()],
            sales(),
        );
        let config = ChartConfig::for_dataset(&ds);
        assert_eq!(config.x_column.as_deref(), Some("region"));
        // "sales" holds "n/a", so the first fully numeric column is "units"
        assert_eq!(config.y_columns, vec!["units".to_string()]);

        let mut config = config;
        config.toggle_series("units");
        assert!(config.y_columns.is_empty());
    }
}
