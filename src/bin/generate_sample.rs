use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

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

/// One weather-station reading.
#[derive(Serialize)]
struct Reading {
    id: i64,
    station: String,
    hour: i64,
    temperature: f64,
    humidity: f64,
    raining: bool,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn readings() -> Vec<Reading> {
    let mut rng = SimpleRng::new(42);
    let stations = [("North", 12.0, 70.0), ("Harbor", 16.0, 82.0), ("Ridge", 8.0, 60.0)];

    let mut rows = Vec::new();
    let mut id = 0;
    for (station, base_temp, base_humidity) in stations {
        for hour in 0..24 {
            let daily = (std::f64::consts::PI * (hour as f64 - 9.0) / 12.0).sin();
            let temperature = base_temp + 6.0 * daily + rng.gauss(0.0, 0.8);
            let humidity = (base_humidity - 10.0 * daily + rng.gauss(0.0, 3.0)).clamp(0.0, 100.0);
            rows.push(Reading {
                id,
                station: station.to_string(),
                hour,
                temperature: round2(temperature),
                humidity: round2(humidity),
                raining: humidity > 85.0,
            });
            id += 1;
        }
    }
    rows
}

fn write_parquet(rows: &[Reading], path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("station", DataType::Utf8, false),
        Field::new("hour", DataType::Int64, false),
        Field::new("temperature", DataType::Float64, false),
        Field::new("humidity", DataType::Float64, false),
        Field::new("raining", DataType::Boolean, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.id))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.station.as_str()))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.hour))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.temperature))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.humidity))),
            Arc::new(BooleanArray::from(rows.iter().map(|r| r.raining).collect::<Vec<_>>())),
        ],
    )
    .context("building record batch")?;

    let file = File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_json(rows: &[Reading], path: &str) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {path}"))?;
    serde_json::to_writer_pretty(BufWriter::new(file), rows).context("writing JSON records")?;
    Ok(())
}

fn main() -> Result<()> {
    let rows = readings();

    write_parquet(&rows, "sample_data.parquet")?;
    write_json(&rows, "sample_data.json")?;

    println!(
        "Wrote {} readings to sample_data.parquet and sample_data.json",
        rows.len()
    );
    Ok(())
}
