use std::f64::consts::TAU;

const HEADER: [&str; 18] = [
    "No", "year", "month", "day", "hour", "PM2.5", "PM10", "SO2", "NO2", "CO", "O3", "TEMP",
    "PRES", "DEWP", "RAIN", "wd", "WSPM", "station",
];

const WIND_DIRECTIONS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

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
        let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
        mean + std_dev * z
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        _ => 31,
    }
}

/// A cell that goes missing (`NA`) about 2% of the time.
fn cell(rng: &mut SimpleRng, value: f64) -> String {
    if rng.next_f64() < 0.02 {
        "NA".to_string()
    } else {
        format!("{value:.1}")
    }
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);
    let output_path = "sample_station.csv";
    let mut writer = csv::Writer::from_path(output_path)?;
    writer.write_record(HEADER)?;

    // One year of hourly observations, March to February like the PRSA files.
    let months: Vec<(i32, u32)> = (3..=12).map(|m| (2013, m)).chain((1..=2).map(|m| (2014, m))).collect();

    let mut row_id: u64 = 0;
    let mut pm25 = 80.0_f64;
    for (year, month) in months {
        // Winter is colder and more polluted.
        let season = (TAU * (month as f64 - 1.0) / 12.0).cos();
        for day in 1..=days_in_month(year, month) {
            for hour in 0..24u32 {
                row_id += 1;
                let diurnal = (TAU * (hour as f64 - 20.0) / 24.0).cos();
                let rain = if rng.next_f64() < 0.05 { rng.next_f64() * 6.0 } else { 0.0 };

                // Mean-reverting walk with a nightly bump; rain washes it out.
                let target = 70.0 + 40.0 * season + 15.0 * diurnal;
                pm25 += 0.15 * (target - pm25) + rng.gauss(0.0, 12.0) - 8.0 * rain;
                pm25 = pm25.max(3.0);

                let temp = 13.0 - 15.0 * season - 4.0 * diurnal + rng.gauss(0.0, 1.5);
                let measurements = [
                    pm25.round(),
                    (pm25 * 1.3 + rng.gauss(10.0, 5.0)).max(3.0).round(),
                    (12.0 + 10.0 * season + rng.gauss(0.0, 3.0)).max(1.0),
                    (pm25 * 0.4 + 20.0 + rng.gauss(0.0, 6.0)).max(2.0),
                    (pm25 * 12.0 + 300.0 + rng.gauss(0.0, 80.0)).max(100.0).round(),
                    (60.0 - 35.0 * season - 20.0 * diurnal + rng.gauss(0.0, 8.0)).max(1.0),
                    temp,
                    1012.0 + 12.0 * season + rng.gauss(0.0, 2.0),
                    temp - 8.0 - 6.0 * season + rng.gauss(0.0, 2.0),
                ];
                let wspm = (1.8 + rng.gauss(0.0, 0.8)).max(0.0);
                let wd = WIND_DIRECTIONS[(rng.next_u64() % WIND_DIRECTIONS.len() as u64) as usize];

                let mut record = vec![
                    row_id.to_string(),
                    year.to_string(),
                    month.to_string(),
                    day.to_string(),
                    hour.to_string(),
                ];
                for value in measurements {
                    record.push(cell(&mut rng, value));
                }
                record.push(format!("{rain:.1}"));
                record.push(if rng.next_f64() < 0.01 { "NA".to_string() } else { wd.to_string() });
                record.push(cell(&mut rng, wspm));
                record.push("Sample".to_string());
                writer.write_record(&record)?;
            }
        }
    }
    writer.flush()?;

    println!("Wrote {row_id} hourly observations to {output_path}");
    Ok(())
}
