use crate::math::units::UnitConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Header keys that may carry the pilot name when none is supplied by the caller.
const PILOT_HEADER_KEYS: [&str; 2] = ["HFPLTPILOTINCHARGE", "HFPLTPILOT"];

/// Flight metadata assembled in stages: parser, processor, then caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FlightMetadata {
    pub date: Option<NaiveDate>,
    pub timezone_offset_hours: Option<f64>,
    pub serial_number: Option<String>,
    /// Generic header records, keyed verbatim.
    pub headers: BTreeMap<String, String>,
    pub launch_site: Option<String>,
    pub pilot: Option<String>,
    pub units: Option<UnitConfig>,
}

impl FlightMetadata {
    /// Pilot supplied by the caller, else the logger's pilot header.
    pub fn pilot_name(&self) -> Option<&str> {
        if let Some(pilot) = self.pilot.as_deref().map(str::trim) {
            if !pilot.is_empty() {
                return Some(pilot);
            }
        }
        PILOT_HEADER_KEYS
            .iter()
            .filter_map(|key| self.headers.get(*key))
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }

    pub fn launch_site_or_unknown(&self) -> &str {
        self.launch_site.as_deref().unwrap_or("Unknown")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_pilot_wins_over_header() {
        let mut metadata = FlightMetadata::default();
        metadata
            .headers
            .insert("HFPLTPILOTINCHARGE".into(), "Logger Pilot".into());
        assert_eq!(metadata.pilot_name(), Some("Logger Pilot"));

        metadata.pilot = Some("Jane Doe".into());
        assert_eq!(metadata.pilot_name(), Some("Jane Doe"));
    }

    #[test]
    fn blank_pilot_values_are_ignored() {
        let mut metadata = FlightMetadata {
            pilot: Some("  ".into()),
            ..Default::default()
        };
        metadata.headers.insert("HFPLTPILOT".into(), "".into());
        assert_eq!(metadata.pilot_name(), None);
    }

    #[test]
    fn unknown_headers_survive_json_round_trip() {
        let mut metadata = FlightMetadata::default();
        metadata
            .headers
            .insert("HFGTYGLIDERTYPE".into(), "Nova: Mentor 7".into());
        let json = metadata.to_json().unwrap();
        let restored: FlightMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, metadata);
    }
}
