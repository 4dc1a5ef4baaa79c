pub mod geo;
pub mod units;

pub use geo::{great_circle_distance, to_planar, EARTH_RADIUS_M};
pub use units::{conversion_factor, Unit, UnitConfig};
