use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One generated record.
struct Sale {
    id: i64,
    month: i64,
    region: &'static str,
    product: &'static str,
    units: i64,
    price: f64,
    revenue: f64,
    /// Constant column, correlates to exactly zero with everything.
    tax_rate: f64,
    /// Roughly one record in eight has no satisfaction score.
    satisfaction: Option<f64>,
}

fn generate(rng: &mut SimpleRng) -> Vec<Sale> {
    let regions = ["North", "South", "East", "West"];
    let products = [("Widget", 9.5), ("Gadget", 24.0), ("Gizmo", 4.25)];

    let mut sales = Vec::new();
    let mut id = 0;
    for month in 1..=12 {
        for (r, &region) in regions.iter().enumerate() {
            for &(product, base_price) in &products {
                let seasonal = 1.0 + 0.3 * ((month as f64) / 12.0 * std::f64::consts::TAU).sin();
                let units = rng
                    .gauss(40.0 * seasonal + 5.0 * r as f64, 6.0)
                    .round()
                    .max(0.0) as i64;
                let price = (base_price * rng.gauss(1.0, 0.05) * 100.0).round() / 100.0;
                let satisfaction = (rng.next_f64() > 0.125)
                    .then(|| (rng.gauss(3.5 + units as f64 / 40.0, 0.4) * 10.0).round() / 10.0);

                sales.push(Sale {
                    id,
                    month,
                    region,
                    product,
                    units,
                    price,
                    revenue: units as f64 * price,
                    tax_rate: 0.2,
                    satisfaction,
                });
                id += 1;
            }
        }
    }
    sales
}

fn write_parquet(sales: &[Sale], path: &str) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("month", DataType::Int64, false),
        Field::new("region", DataType::Utf8, false),
        Field::new("product", DataType::Utf8, false),
        Field::new("units", DataType::Int64, false),
        Field::new("price", DataType::Float64, false),
        Field::new("revenue", DataType::Float64, false),
        Field::new("tax_rate", DataType::Float64, false),
        Field::new("satisfaction", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(sales.iter().map(|s| s.id))),
            Arc::new(Int64Array::from_iter_values(sales.iter().map(|s| s.month))),
            Arc::new(StringArray::from_iter_values(sales.iter().map(|s| s.region))),
            Arc::new(StringArray::from_iter_values(sales.iter().map(|s| s.product))),
            Arc::new(Int64Array::from_iter_values(sales.iter().map(|s| s.units))),
            Arc::new(Float64Array::from_iter_values(sales.iter().map(|s| s.price))),
            Arc::new(Float64Array::from_iter_values(sales.iter().map(|s| s.revenue))),
            Arc::new(Float64Array::from_iter_values(sales.iter().map(|s| s.tax_rate))),
            Arc::new(Float64Array::from(
                sales.iter().map(|s| s.satisfaction).collect::<Vec<_>>(),
            )),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn write_csv(sales: &[Sale], path: &str) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create CSV file");
    writer
        .write_record([
            "id", "month", "region", "product", "units", "price", "revenue", "tax_rate",
            "satisfaction",
        ])
        .expect("Failed to write CSV header");
    for s in sales {
        writer
            .write_record([
                s.id.to_string(),
                s.month.to_string(),
                s.region.to_string(),
                s.product.to_string(),
                s.units.to_string(),
                s.price.to_string(),
                s.revenue.to_string(),
                s.tax_rate.to_string(),
                s.satisfaction.map(|v| v.to_string()).unwrap_or_default(),
            ])
            .expect("Failed to write CSV record");
    }
    writer.flush().expect("Failed to flush CSV");
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let sales = generate(&mut rng);

    write_parquet(&sales, "sample_data.parquet");
    write_csv(&sales, "sample_data.csv");

    println!(
        "Wrote {} records to sample_data.parquet and sample_data.csv",
        sales.len()
    );
}
