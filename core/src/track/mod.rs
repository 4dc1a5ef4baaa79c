pub mod metadata;
pub mod sample;

pub use metadata::FlightMetadata;
pub use sample::{FixRecord, FixValidity, FlightTrack, Kinematics};

/// A track travelling through the pipeline together with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Flight {
    pub track: FlightTrack,
    pub metadata: FlightMetadata,
}

impl Flight {
    pub fn new(track: FlightTrack, metadata: FlightMetadata) -> Self {
        Self { track, metadata }
    }
}
