use crate::kml::colormap::{color_bin, ColorRamp, COLOR_RAMPS, JET9, RDGN9};
use crate::math::units::UnitConfig;
use crate::prelude::{ProcessingStage, StageError, StageResult};
use crate::telemetry::log::LogManager;
use crate::track::{Flight, FlightMetadata, FlightTrack, Kinematics};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

const KML_NAMESPACE: &str = "http://earth.google.com/kml/2.0";
const CURTAIN_STYLE: &str = "curtain";
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Color ranges of the rendered series, in meters/second.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub vario_range: (f64, f64),
    pub speed_range: (f64, f64),
    pub include_elapsed: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            vario_range: (-4.0, 4.0),
            speed_range: (0.0, 60.0 / 3.6),
            include_elapsed: false,
        }
    }
}

/// Rendered KML document along with the flight it was built from.
#[derive(Debug, Clone)]
pub struct RenderedFlight {
    pub kml: String,
    pub flight: Flight,
}

/// One colored folder of the document.
struct Series {
    title: String,
    unit: String,
    ramp: &'static ColorRamp,
    min: f64,
    max: f64,
    values: Vec<f64>,
}

/// Escapes text placed into element content.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// `Site - Pilot: DD.MM.YYYY`, leaving out whatever is unknown.
pub fn document_title(metadata: &FlightMetadata) -> String {
    let mut title = metadata.launch_site_or_unknown().to_string();
    if let Some(pilot) = metadata.pilot_name() {
        title.push_str(" - ");
        title.push_str(pilot);
    }
    if let Some(date) = metadata.date {
        title.push_str(&date.format(": %d.%m.%Y").to_string());
    }
    title
}

fn write_styles(out: &mut String) -> StageResult<()> {
    for ramp in COLOR_RAMPS.iter() {
        for (index, color) in ramp.colors.iter().enumerate() {
            writeln!(out, "<Style id=\"{}\">", ramp.style_id(index))?;
            writeln!(out, "\t<LineStyle>")?;
            writeln!(out, "\t<color>{}</color>", color)?;
            writeln!(out, "\t<width>3</width>")?;
            writeln!(out, "\t</LineStyle>")?;
            writeln!(out, "</Style>")?;
        }
    }
    writeln!(out, "<Style id=\"{}\">", CURTAIN_STYLE)?;
    writeln!(out, "\t<LineStyle><color>7fffffff</color><width>1</width></LineStyle>")?;
    writeln!(out, "\t<PolyStyle><color>4cffffff</color></PolyStyle>")?;
    writeln!(out, "</Style>")?;
    Ok(())
}

fn write_coordinate(out: &mut String, track: &FlightTrack, i: usize) -> StageResult<()> {
    writeln!(
        out,
        "  {:.6},{:.6},{:.0}",
        track.longitudes[i], track.latitudes[i], track.altitudes[i]
    )?;
    Ok(())
}

fn check_lengths(track: &FlightTrack, kinematics: &Kinematics) -> StageResult<()> {
    let n = track.len();
    let columns = [
        track.latitudes.len(),
        track.longitudes.len(),
        track.altitudes.len(),
        kinematics.vertical_speed.len(),
        kinematics.ground_speed.len(),
    ];
    if columns.iter().any(|&len| len != n) {
        return Err(StageError::Internal(format!(
            "kinematics do not match the track ({} samples, columns {:?})",
            n, columns
        )));
    }
    Ok(())
}

/// Stage rendering a processed flight as a color-segmented KML document.
pub struct KmlStage {
    config: Option<RenderConfig>,
    logger: LogManager,
}

impl KmlStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new("kml"),
        }
    }

    fn series(
        config: &RenderConfig,
        track: &FlightTrack,
        kinematics: &Kinematics,
        units: &UnitConfig,
    ) -> Vec<Series> {
        let vertical = units.vertical.factor();
        let horizontal = units.horizontal.factor();
        let mut series = vec![
            Series {
                title: format!("Vario [{}]", units.vertical),
                unit: units.vertical.to_string(),
                ramp: &RDGN9,
                min: config.vario_range.0 * vertical,
                max: config.vario_range.1 * vertical,
                values: kinematics.vertical_speed.clone(),
            },
            Series {
                title: format!("Speed [{}]", units.horizontal),
                unit: units.horizontal.to_string(),
                ramp: &RDGN9,
                min: config.speed_range.0 * horizontal,
                max: config.speed_range.1 * horizontal,
                values: kinematics.ground_speed.clone(),
            },
        ];
        if config.include_elapsed {
            let values = (0..track.len())
                .map(|i| track.elapsed_seconds(i) as f64 / SECONDS_PER_MINUTE)
                .collect();
            series.push(Series {
                title: "Elapsed [min]".to_string(),
                unit: "min".to_string(),
                ramp: &JET9,
                min: 0.0,
                max: track.duration_seconds() as f64 / SECONDS_PER_MINUTE,
                values,
            });
        }
        series
    }

    fn write_series(
        out: &mut String,
        track: &FlightTrack,
        units: &UnitConfig,
        series: &Series,
    ) -> StageResult<()> {
        let altitude_factor = units.altitude.factor();
        writeln!(out, "<Folder>")?;
        writeln!(out, "<name>{}</name>", escape_xml(&series.title))?;
        for i in 0..track.len().saturating_sub(1) {
            let bin = color_bin(series.values[i], series.min, series.max, series.ramp.len());
            writeln!(out, "<Placemark>")?;
            writeln!(out, "\t<styleUrl>#{}</styleUrl>", series.ramp.style_id(bin))?;
            writeln!(
                out,
                "\t<name>{}, {:.0}{}, {:.1}{}</name>",
                track.timestamps[i].format("%H:%M:%S"),
                track.altitudes[i] * altitude_factor,
                units.altitude,
                series.values[i],
                escape_xml(&series.unit)
            )?;
            writeln!(out, "\t<LineString>")?;
            writeln!(out, "\t<altitudeMode>absolute</altitudeMode>")?;
            writeln!(out, "\t<coordinates>")?;
            write_coordinate(out, track, i)?;
            write_coordinate(out, track, i + 1)?;
            writeln!(out, "\t</coordinates>")?;
            writeln!(out, "\t</LineString>")?;
            writeln!(out, "</Placemark>")?;
        }
        writeln!(out, "</Folder>")?;
        Ok(())
    }

    fn write_curtain(out: &mut String, track: &FlightTrack) -> StageResult<()> {
        writeln!(out, "<Placemark>")?;
        writeln!(out, "\t<name>Curtain</name>")?;
        writeln!(out, "\t<styleUrl>#{}</styleUrl>", CURTAIN_STYLE)?;
        writeln!(out, "\t<LineString>")?;
        writeln!(out, "\t<extrude>1</extrude>")?;
        writeln!(out, "\t<tessellate>1</tessellate>")?;
        writeln!(out, "\t<altitudeMode>absolute</altitudeMode>")?;
        writeln!(out, "\t<coordinates>")?;
        for i in 0..track.len() {
            write_coordinate(out, track, i)?;
        }
        writeln!(out, "\t</coordinates>")?;
        writeln!(out, "\t</LineString>")?;
        writeln!(out, "</Placemark>")?;
        Ok(())
    }

    /// Builds the whole document in memory.
    pub fn render(&self, flight: &Flight) -> StageResult<String> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;
        let track = &flight.track;
        let kinematics = track
            .kinematics
            .as_ref()
            .ok_or_else(|| StageError::Internal("track has no derived kinematics".into()))?;
        check_lengths(track, kinematics)?;
        let units = flight.metadata.units.unwrap_or_default();

        let mut out = String::new();
        writeln!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(out, "<kml xmlns=\"{}\">", KML_NAMESPACE)?;
        writeln!(out, "<Document>")?;
        writeln!(out, "<open>1</open>")?;
        write_styles(&mut out)?;
        writeln!(
            out,
            "<name>{}</name>",
            escape_xml(&document_title(&flight.metadata))
        )?;
        writeln!(out, "<Folder>")?;
        writeln!(out, "<name>Flight track</name>")?;
        writeln!(out, "<open>1</open>")?;
        writeln!(
            out,
            "<Style><ListStyle><listItemType>radioFolder</listItemType></ListStyle></Style>"
        )?;
        let series = Self::series(config, track, kinematics, &units);
        for entry in &series {
            Self::write_series(&mut out, track, &units, entry)?;
        }
        writeln!(out, "</Folder>")?;
        Self::write_curtain(&mut out, track)?;
        writeln!(out, "</Document>")?;
        writeln!(out, "</kml>")?;

        self.logger.record(&format!(
            "rendered {} series over {} samples ({} bytes)",
            series.len(),
            track.len(),
            out.len()
        ));
        Ok(out)
    }
}

impl Default for KmlStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for KmlStage {
    type Config = RenderConfig;
    type Input = Flight;
    type Output = RenderedFlight;

    fn initialize(&mut self, config: &RenderConfig) -> StageResult<()> {
        if config.vario_range.1 <= config.vario_range.0
            || config.speed_range.1 <= config.speed_range.0
        {
            self.logger
                .warn("empty color range configured; affected series use a single color");
        }
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: Flight) -> StageResult<RenderedFlight> {
        let kml = self.render(&input)?;
        Ok(RenderedFlight { kml, flight: input })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
