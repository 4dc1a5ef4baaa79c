use crate::math::geo::to_planar;
use crate::math::units::UnitConfig;
use crate::prelude::{ProcessingStage, StageError, StageResult};
use crate::processing::launch_site::nearest_launch_site;
use crate::telemetry::log::LogManager;
use crate::track::{Flight, FlightTrack, Kinematics};

/// Added to every time delta so fixes sharing a timestamp do not divide by zero.
///
/// Biases speeds between genuinely simultaneous fixes; coarse recorders emit those.
pub const TIME_EPSILON_SECONDS: f64 = 1e-3;

/// Conversion factors resolved once per run.
#[derive(Debug, Clone, Copy)]
struct Factors {
    horizontal: f64,
    vertical: f64,
}

/// Stage deriving planar position, ground speed and vertical speed per sample.
pub struct KinematicsStage {
    units: Option<UnitConfig>,
    factors: Option<Factors>,
    logger: LogManager,
}

impl KinematicsStage {
    pub fn new() -> Self {
        Self {
            units: None,
            factors: None,
            logger: LogManager::new("kinematics"),
        }
    }

    fn derive(&self, track: &FlightTrack, factors: Factors) -> Kinematics {
        let n = track.len();
        let (planar_x, planar_y): (Vec<f64>, Vec<f64>) = track
            .latitudes
            .iter()
            .zip(&track.longitudes)
            .map(|(&lat, &lon)| to_planar(lat, lon))
            .unzip();

        let mut ground_speed = vec![0.0; n];
        let mut vertical_speed = vec![0.0; n];
        let mut backwards = 0usize;
        for i in 0..n.saturating_sub(1) {
            let seconds = (track.timestamps[i + 1] - track.timestamps[i]).num_seconds();
            if seconds < 0 {
                backwards += 1;
            }
            let dt = seconds as f64 + TIME_EPSILON_SECONDS;
            let dx = (planar_x[i + 1] - planar_x[i]).hypot(planar_y[i + 1] - planar_y[i]);
            let d_alt = track.altitudes[i + 1] - track.altitudes[i];
            ground_speed[i] = factors.horizontal * dx / dt;
            vertical_speed[i] = factors.vertical * d_alt / dt;
        }
        if backwards > 0 {
            self.logger
                .warn(&format!("{} fix pairs go back in time", backwards));
        }

        Kinematics {
            planar_x,
            planar_y,
            vertical_speed,
            ground_speed,
        }
    }
}

impl Default for KinematicsStage {
    fn default() -> Self {
        Self::new()
    }
}

fn check_columns(track: &FlightTrack) -> StageResult<()> {
    let n = track.len();
    let consistent = track.latitudes.len() == n
        && track.longitudes.len() == n
        && track.altitudes.len() == n
        && track.pressure_altitudes.len() == n
        && track.fix_validity.len() == n;
    if n == 0 {
        return Err(StageError::malformed("track has no samples"));
    }
    if !consistent {
        return Err(StageError::Internal(format!(
            "track columns disagree in length ({} timestamps)",
            n
        )));
    }
    Ok(())
}

impl ProcessingStage for KinematicsStage {
    type Config = UnitConfig;
    type Input = Flight;
    type Output = Flight;

    fn initialize(&mut self, config: &UnitConfig) -> StageResult<()> {
        config.validate()?;
        self.factors = Some(Factors {
            horizontal: config.horizontal.factor(),
            vertical: config.vertical.factor(),
        });
        self.units = Some(*config);
        Ok(())
    }

    fn execute(&mut self, input: Flight) -> StageResult<Flight> {
        let (units, factors) = match (self.units, self.factors) {
            (Some(units), Some(factors)) => (units, factors),
            _ => return Err(StageError::Internal("stage not initialized".into())),
        };
        let Flight {
            mut track,
            mut metadata,
        } = input;
        check_columns(&track)?;

        let kinematics = self.derive(&track, factors);
        let site = nearest_launch_site(track.latitudes[0], track.longitudes[0]);
        self.logger.record(&format!(
            "derived {} samples, launch site {}",
            track.len(),
            site
        ));

        track.kinematics = Some(kinematics);
        metadata.launch_site = Some(site.to_string());
        metadata.units = Some(units);
        Ok(Flight { track, metadata })
    }

    fn cleanup(&mut self) {
        self.units = None;
        self.factors = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::units::Unit;
    use crate::track::{FixRecord, FixValidity, FlightMetadata};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn fix(second: u32, latitude: f64, longitude: f64, altitude: f64) -> FixRecord {
        FixRecord {
            timestamp: NaiveDate::from_ymd_opt(2021, 7, 15)
                .unwrap()
                .and_hms_opt(10, 0, second)
                .unwrap(),
            latitude,
            longitude,
            validity: FixValidity::ThreeD,
            pressure_altitude: altitude,
            gps_altitude: altitude,
        }
    }

    fn flight(fixes: Vec<FixRecord>) -> Flight {
        Flight {
            track: FlightTrack::from_fixes(fixes).unwrap(),
            metadata: FlightMetadata::default(),
        }
    }

    fn run(units: UnitConfig, input: Flight) -> Flight {
        let mut stage = KinematicsStage::new();
        stage.initialize(&units).unwrap();
        let output = stage.execute(input).unwrap();
        stage.cleanup();
        output
    }

    #[test]
    fn stationary_fixes_have_zero_speed_in_any_unit() {
        for horizontal in [Unit::KilometersPerHour, Unit::Knots, Unit::MetersPerSecond] {
            let units = UnitConfig {
                horizontal,
                vertical: Unit::FeetPerMinute,
                altitude: Unit::Feet,
            };
            let output = run(
                units,
                flight(vec![fix(0, 47.6, 15.8, 1000.0), fix(1, 47.6, 15.8, 1000.0)]),
            );
            let kinematics = output.track.kinematics.unwrap();
            assert_eq!(kinematics.ground_speed, vec![0.0, 0.0]);
            assert_eq!(kinematics.vertical_speed, vec![0.0, 0.0]);
        }
    }

    #[test]
    fn eastward_kilometer_in_ten_seconds() {
        // 1 km east along the equator
        let lon_step = 1000.0 / crate::math::geo::EARTH_RADIUS_M;
        let output = run(
            UnitConfig::default(),
            flight(vec![
                fix(0, 0.0, 0.0, 500.0),
                fix(10, 0.0, lon_step.to_degrees(), 500.0),
            ]),
        );
        let kinematics = output.track.kinematics.unwrap();
        let expected = 3.6 * 1000.0 / (10.0 + TIME_EPSILON_SECONDS);
        assert_relative_eq!(kinematics.ground_speed[0], expected, max_relative = 1e-6);
        assert_eq!(kinematics.ground_speed[1], 0.0);
        assert_eq!(kinematics.vertical_speed[0], 0.0);
    }

    #[test]
    fn vertical_speed_keeps_sign() {
        let output = run(
            UnitConfig::default(),
            flight(vec![
                fix(0, 47.6, 15.8, 1000.0),
                fix(2, 47.6, 15.8, 1004.0),
                fix(4, 47.6, 15.8, 998.0),
            ]),
        );
        let kinematics = output.track.kinematics.unwrap();
        assert_relative_eq!(kinematics.vertical_speed[0], 4.0 / (2.0 + TIME_EPSILON_SECONDS));
        assert_relative_eq!(kinematics.vertical_speed[1], -6.0 / (2.0 + TIME_EPSILON_SECONDS));
        assert_eq!(kinematics.vertical_speed[2], 0.0);
        assert_eq!(kinematics.planar_x.len(), 3);
    }

    #[test]
    fn equal_timestamps_use_epsilon() {
        let output = run(
            UnitConfig {
                horizontal: Unit::MetersPerSecond,
                ..Default::default()
            },
            flight(vec![fix(0, 47.6, 15.8, 1000.0), fix(0, 47.6, 15.8, 1001.0)]),
        );
        let kinematics = output.track.kinematics.unwrap();
        assert_relative_eq!(kinematics.vertical_speed[0], 1.0 / TIME_EPSILON_SECONDS);
    }

    #[test]
    fn metadata_gains_launch_site_and_units() {
        let units = UnitConfig::from_tokens("knots", "m/s", "ft").unwrap();
        let output = run(units, flight(vec![fix(0, 47.6223, 15.8576, 1500.0)]));
        assert_eq!(output.metadata.launch_site.as_deref(), Some("Sonnwendstein"));
        assert_eq!(output.metadata.units, Some(units));
        let kinematics = output.track.kinematics.unwrap();
        assert_eq!(kinematics.ground_speed, vec![0.0]);
    }

    #[test]
    fn execute_requires_initialization() {
        let mut stage = KinematicsStage::new();
        let result = stage.execute(flight(vec![fix(0, 47.6, 15.8, 1000.0)]));
        assert!(matches!(result, Err(StageError::Internal(_))));
    }

    #[test]
    fn initialize_rejects_misplaced_units() {
        let mut stage = KinematicsStage::new();
        let units = UnitConfig {
            horizontal: Unit::Feet,
            ..Default::default()
        };
        assert!(matches!(
            stage.initialize(&units),
            Err(StageError::InvalidUnit(_))
        ));
    }
}
