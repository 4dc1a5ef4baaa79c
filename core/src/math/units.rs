use crate::prelude::{StageError, StageResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display units, each with a multiplicative factor from meters or meters/second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "km/h")]
    KilometersPerHour,
    #[serde(rename = "knots")]
    Knots,
    #[serde(rename = "mph")]
    MilesPerHour,
    #[serde(rename = "m/s")]
    MetersPerSecond,
    #[serde(rename = "ft/min")]
    FeetPerMinute,
    #[serde(rename = "ft")]
    Feet,
    #[serde(rename = "m")]
    Meters,
}

impl Unit {
    pub const ALL: [Unit; 7] = [
        Unit::KilometersPerHour,
        Unit::Knots,
        Unit::MilesPerHour,
        Unit::MetersPerSecond,
        Unit::FeetPerMinute,
        Unit::Feet,
        Unit::Meters,
    ];

    pub fn factor(self) -> f64 {
        match self {
            Unit::KilometersPerHour => 3.6,
            Unit::Knots => 1.9438444924406,
            Unit::MilesPerHour => 2.2369362920544,
            Unit::MetersPerSecond => 1.0,
            Unit::FeetPerMinute => 196.85039370078738,
            Unit::Feet => 3.280839895013123,
            Unit::Meters => 1.0,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Unit::KilometersPerHour => "km/h",
            Unit::Knots => "knots",
            Unit::MilesPerHour => "mph",
            Unit::MetersPerSecond => "m/s",
            Unit::FeetPerMinute => "ft/min",
            Unit::Feet => "ft",
            Unit::Meters => "m",
        }
    }

    fn is_horizontal(self) -> bool {
        matches!(
            self,
            Unit::KilometersPerHour | Unit::Knots | Unit::MilesPerHour | Unit::MetersPerSecond
        )
    }

    fn is_vertical(self) -> bool {
        self.is_horizontal() || self == Unit::FeetPerMinute
    }

    fn is_altitude(self) -> bool {
        matches!(self, Unit::Feet | Unit::Meters)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Unit {
    type Err = StageError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Unit::ALL
            .iter()
            .copied()
            .find(|unit| unit.token() == token)
            .ok_or_else(|| StageError::InvalidUnit(format!("unknown unit token '{}'", token)))
    }
}

/// Looks up the conversion factor for any supported unit token.
pub fn conversion_factor(token: &str) -> StageResult<f64> {
    token.parse::<Unit>().map(Unit::factor)
}

/// Unit selection for the three displayed quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitConfig {
    pub horizontal: Unit,
    pub vertical: Unit,
    pub altitude: Unit,
}

impl UnitConfig {
    /// Builds a configuration from unit tokens, rejecting units used for the wrong quantity.
    pub fn from_tokens(horizontal: &str, vertical: &str, altitude: &str) -> StageResult<Self> {
        let config = Self {
            horizontal: horizontal.parse()?,
            vertical: vertical.parse()?,
            altitude: altitude.parse()?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StageResult<()> {
        if !self.horizontal.is_horizontal() {
            return Err(StageError::InvalidUnit(format!(
                "'{}' is not a horizontal speed unit",
                self.horizontal
            )));
        }
        if !self.vertical.is_vertical() {
            return Err(StageError::InvalidUnit(format!(
                "'{}' is not a vertical speed unit",
                self.vertical
            )));
        }
        if !self.altitude.is_altitude() {
            return Err(StageError::InvalidUnit(format!(
                "'{}' is not an altitude unit",
                self.altitude
            )));
        }
        Ok(())
    }
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            horizontal: Unit::KilometersPerHour,
            vertical: Unit::MetersPerSecond,
            altitude: Unit::Meters,
        }
    }
}
