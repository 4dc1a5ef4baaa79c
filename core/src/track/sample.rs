use crate::prelude::{StageError, StageResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// GPS fix quality carried by each fix record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FixValidity {
    ThreeD,
    TwoD,
}

/// One decoded fix record.
#[derive(Debug, Clone, PartialEq)]
pub struct FixRecord {
    pub timestamp: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub validity: FixValidity,
    pub pressure_altitude: f64,
    pub gps_altitude: f64,
}

/// Per-sample quantities derived by the kinematics stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Kinematics {
    pub planar_x: Vec<f64>,
    pub planar_y: Vec<f64>,
    pub vertical_speed: Vec<f64>,
    pub ground_speed: Vec<f64>,
}

/// Column-oriented flight track; every column shares one index space.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlightTrack {
    pub timestamps: Vec<NaiveDateTime>,
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
    pub altitudes: Vec<f64>,
    pub pressure_altitudes: Vec<f64>,
    pub fix_validity: Vec<FixValidity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinematics: Option<Kinematics>,
}

impl FlightTrack {
    /// Builds a track from decoded fixes in file order.
    pub fn from_fixes(fixes: Vec<FixRecord>) -> StageResult<Self> {
        if fixes.is_empty() {
            return Err(StageError::malformed("no fix records found"));
        }

        let len = fixes.len();
        let mut track = FlightTrack {
            timestamps: Vec::with_capacity(len),
            latitudes: Vec::with_capacity(len),
            longitudes: Vec::with_capacity(len),
            altitudes: Vec::with_capacity(len),
            pressure_altitudes: Vec::with_capacity(len),
            fix_validity: Vec::with_capacity(len),
            kinematics: None,
        };
        for fix in fixes {
            track.timestamps.push(fix.timestamp);
            track.latitudes.push(fix.latitude);
            track.longitudes.push(fix.longitude);
            track.altitudes.push(fix.gps_altitude);
            track.pressure_altitudes.push(fix.pressure_altitude);
            track.fix_validity.push(fix.validity);
        }
        Ok(track)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamps.first().copied()
    }

    /// Seconds between the first fix and the fix at `index`.
    pub fn elapsed_seconds(&self, index: usize) -> i64 {
        match (self.timestamps.first(), self.timestamps.get(index)) {
            (Some(start), Some(current)) => (*current - *start).num_seconds(),
            _ => 0,
        }
    }

    pub fn duration_seconds(&self) -> i64 {
        self.elapsed_seconds(self.len().saturating_sub(1))
    }
}
