use crate::workflow::config::ConverterConfig;
use anyhow::Context;
use chrono::NaiveDateTime;
use igccore::igc::parse_igc_str;
use igccore::kml::KmlStage;
use igccore::math::UnitConfig;
use igccore::prelude::ProcessingStage;
use igccore::processing::KinematicsStage;
use igccore::{Flight, FlightMetadata};
use std::fs;
use std::path::Path;

pub struct ConversionResult {
    pub kml: String,
    pub metadata: FlightMetadata,
    pub sample_count: usize,
    pub start: NaiveDateTime,
    pub duration_seconds: i64,
}

/// Reads the log as UTF-8, falling back to latin-1 for older recorders.
fn decode_log(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    }
}

#[derive(Clone)]
pub struct Runner {
    config: ConverterConfig,
    units: UnitConfig,
}

impl Runner {
    /// Validates the unit selection before any input is touched.
    pub fn new(config: ConverterConfig) -> anyhow::Result<Self> {
        let units = config.unit_config().context("resolving display units")?;
        Ok(Self { config, units })
    }

    pub fn convert_file(&self, path: &Path) -> anyhow::Result<ConversionResult> {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let contents = decode_log(bytes);
        self.convert_str(&contents)
            .with_context(|| format!("converting {}", path.display()))
    }

    pub fn convert_str(&self, contents: &str) -> anyhow::Result<ConversionResult> {
        let (track, mut metadata) = parse_igc_str(contents).context("parsing IGC log")?;
        if let Some(pilot) = self.config.pilot.as_ref() {
            metadata.pilot = Some(pilot.clone());
        }

        let mut kinematics_stage = KinematicsStage::new();
        kinematics_stage
            .initialize(&self.units)
            .context("initializing kinematics stage")?;
        let flight = kinematics_stage
            .execute(Flight::new(track, metadata))
            .context("executing kinematics stage")?;
        kinematics_stage.cleanup();

        let mut kml_stage = KmlStage::new();
        kml_stage
            .initialize(&self.config.render)
            .context("initializing KML stage")?;
        let rendered = kml_stage.execute(flight).context("executing KML stage")?;
        kml_stage.cleanup();

        let track = &rendered.flight.track;
        let start = track
            .first_timestamp()
            .context("processed track has no samples")?;
        Ok(ConversionResult {
            sample_count: track.len(),
            duration_seconds: track.duration_seconds(),
            start,
            kml: rendered.kml,
            metadata: rendered.flight.metadata,
        })
    }
}
