//! Core pipeline of the IGC to KML converter.
//!
//! Flight logs pass through three stages: the IGC reader builds a
//! column-oriented track, the kinematics stage derives speeds and classifies
//! the launch site, and the KML stage renders a color-segmented document.
//! None of the stages touch the filesystem.

pub mod igc;
pub mod kml;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;
pub mod track;

pub use prelude::{ProcessingStage, StageError, StageResult};
pub use track::{Flight, FlightMetadata, FlightTrack};
