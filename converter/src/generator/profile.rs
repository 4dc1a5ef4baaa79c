use chrono::{NaiveDate, NaiveTime, Timelike};
use igccore::math::EARTH_RADIUS_M;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const SECONDS_PER_DAY: u32 = 86_400;

/// Configuration for generating a synthetic IGC flight log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub launch_latitude: f64,
    pub launch_longitude: f64,
    pub launch_altitude: f64,
    pub fix_count: usize,
    pub interval_s: u32,
    /// Horizontal airspeed in m/s.
    pub airspeed: f64,
    /// Seconds per full thermalling circle.
    pub circle_period_s: f64,
    pub noise: f64,
    pub seed: u64,
    pub serial: String,
    pub pilot: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            date: NaiveDate::from_ymd_opt(2021, 7, 15).expect("valid default date"),
            start: NaiveTime::from_hms_opt(11, 0, 0).expect("valid default time"),
            launch_latitude: 47.622361,
            launch_longitude: 15.8575,
            launch_altitude: 1500.0,
            fix_count: 120,
            interval_s: 2,
            airspeed: 10.0,
            circle_period_s: 40.0,
            noise: 0.3,
            seed: 0,
            serial: "SIM001".to_string(),
            pilot: None,
        }
    }
}

/// Integer degrees and thousandths of a minute for one coordinate.
fn encode_coordinate(value: f64) -> (u32, u32) {
    let absolute = value.abs();
    let mut degrees = absolute.floor() as u32;
    let mut milliminutes = ((absolute - degrees as f64) * 60_000.0).round() as u32;
    if milliminutes >= 60_000 {
        degrees += 1;
        milliminutes -= 60_000;
    }
    (degrees, milliminutes)
}

fn fix_line(time_of_day: u32, latitude: f64, longitude: f64, altitude: f64) -> String {
    let (lat_deg, lat_min) = encode_coordinate(latitude);
    let (lon_deg, lon_min) = encode_coordinate(longitude);
    let altitude = altitude.round() as i32;
    format!(
        "B{:02}{:02}{:02}{:02}{:05}{}{:03}{:05}{}A{:05}{:05}",
        time_of_day / 3600,
        time_of_day / 60 % 60,
        time_of_day % 60,
        lat_deg,
        lat_min,
        if latitude < 0.0 { 'S' } else { 'N' },
        lon_deg,
        lon_min,
        if longitude < 0.0 { 'W' } else { 'E' },
        altitude - 8,
        altitude
    )
}

/// Builds a log of a glider circling in a thermal, drifting downwind.
pub fn build_igc_log(config: &GeneratorConfig) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut lines = vec![
        format!("AXSM:{}", config.serial),
        format!("HFDTE{}", config.date.format("%d%m%y")),
        "HFGTYGLIDERTYPE:Synthetic".to_string(),
    ];
    if let Some(pilot) = config.pilot.as_ref() {
        lines.push(format!("HFPLTPILOTINCHARGE:{}", pilot));
    }

    let interval = config.interval_s.max(1);
    let period = config.circle_period_s.max(1.0);
    let start = config.start.num_seconds_from_midnight();
    let mut north: f64 = 0.0;
    let mut east: f64 = 0.0;
    let mut altitude = config.launch_altitude;

    for index in 0..config.fix_count {
        let t = index as f64 * interval as f64;
        let latitude = config.launch_latitude + (north / EARTH_RADIUS_M).to_degrees();
        let longitude = config.launch_longitude
            + (east / (EARTH_RADIUS_M * config.launch_latitude.to_radians().cos())).to_degrees();
        let time_of_day = (start + index as u32 * interval) % SECONDS_PER_DAY;
        lines.push(fix_line(time_of_day, latitude, longitude, altitude));

        let heading = 2.0 * PI * t / period;
        let jitter = if config.noise > 0.0 {
            rng.gen_range(-config.noise..config.noise)
        } else {
            0.0
        };
        // circle plus a steady drift to the east
        north += heading.cos() * config.airspeed * interval as f64;
        east += (heading.sin() * config.airspeed + 2.0) * interval as f64;
        let climb = 1.5 + (2.0 * PI * t / (10.0 * period)).sin() + jitter;
        altitude += climb * interval as f64;
    }

    lines
}
