use crate::igc::record::{
    decode_date, decode_fix, decode_timezone, serial_number, split_header,
};
use crate::prelude::{StageError, StageResult};
use crate::telemetry::log::LogManager;
use crate::track::{FixRecord, FlightMetadata, FlightTrack};
use chrono::{Duration, NaiveDateTime, Timelike};

const SECONDS_PER_HOUR: f64 = 3600.0;
/// A time of day this far behind the previous fix means the flight crossed midnight.
const ROLLOVER_THRESHOLD_SECONDS: i64 = 12 * 3600;

/// Incremental IGC reader tracking the date anchor between records.
struct IgcReader {
    metadata: FlightMetadata,
    fixes: Vec<FixRecord>,
    anchor: Option<NaiveDateTime>,
    pending_offset: Option<Duration>,
    day_offset: i64,
    last_time_of_day: Option<i64>,
    skipped: usize,
    logger: LogManager,
}

impl IgcReader {
    fn new() -> Self {
        Self {
            metadata: FlightMetadata::default(),
            fixes: Vec::new(),
            anchor: None,
            pending_offset: None,
            day_offset: 0,
            last_time_of_day: None,
            skipped: 0,
            logger: LogManager::new("igc"),
        }
    }

    fn read_line(&mut self, line: &str, line_no: usize) -> StageResult<()> {
        let line = line.trim_end();
        if line.is_empty() {
            return Ok(());
        }

        if line.starts_with('B') {
            self.read_fix(line, line_no)
        } else if line.starts_with("HFDTE") {
            self.read_date(line, line_no)
        } else if line.starts_with("HFTZNTIMEZONE") {
            self.read_timezone(line, line_no)
        } else if line.starts_with('H') {
            let (key, value) = split_header(line);
            self.metadata.headers.insert(key.to_string(), value.to_string());
            Ok(())
        } else if line.starts_with('A') {
            self.metadata.serial_number = Some(serial_number(line).to_string());
            Ok(())
        } else {
            let kind = line.chars().next().unwrap_or_default();
            self.logger
                .detail(&format!("line {}: ignoring '{}' record", line_no, kind));
            self.skipped += 1;
            Ok(())
        }
    }

    fn read_date(&mut self, line: &str, line_no: usize) -> StageResult<()> {
        let date = decode_date(line, line_no)?;
        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
            StageError::malformed_at(line_no, format!("cannot anchor date {}", date))
        })?;
        let offset = self.pending_offset.take().unwrap_or_else(Duration::zero);
        self.metadata.date = Some(date);
        self.anchor = Some(shift(midnight, offset, line_no)?);
        Ok(())
    }

    fn read_timezone(&mut self, line: &str, line_no: usize) -> StageResult<()> {
        let hours = decode_timezone(line, line_no)?;
        let offset = Duration::try_seconds((hours * SECONDS_PER_HOUR).round() as i64)
            .ok_or_else(|| StageError::malformed_at(line_no, "timezone offset out of range"))?;
        self.metadata.timezone_offset_hours = Some(hours);
        match self.anchor {
            Some(anchor) => self.anchor = Some(shift(anchor, offset, line_no)?),
            None => self.pending_offset = Some(offset),
        }
        Ok(())
    }

    fn read_fix(&mut self, line: &str, line_no: usize) -> StageResult<()> {
        let anchor = self.anchor.ok_or_else(|| {
            StageError::malformed_at(line_no, "fix record before date record")
        })?;
        let raw = decode_fix(line, line_no)?;

        let time_of_day = raw.time_of_day.num_seconds_from_midnight() as i64;
        if let Some(last) = self.last_time_of_day {
            if time_of_day + ROLLOVER_THRESHOLD_SECONDS < last {
                self.day_offset += 1;
            }
        }
        self.last_time_of_day = Some(time_of_day);

        let since_anchor = Duration::try_days(self.day_offset)
            .and_then(|days| days.checked_add(&Duration::try_seconds(time_of_day)?))
            .ok_or_else(|| StageError::malformed_at(line_no, "fix time out of range"))?;
        let timestamp = shift(anchor, since_anchor, line_no)?;
        self.fixes.push(FixRecord {
            timestamp,
            latitude: raw.latitude,
            longitude: raw.longitude,
            validity: raw.validity,
            pressure_altitude: raw.pressure_altitude,
            gps_altitude: raw.gps_altitude,
        });
        Ok(())
    }
}

fn shift(instant: NaiveDateTime, by: Duration, line_no: usize) -> StageResult<NaiveDateTime> {
    instant
        .checked_add_signed(by)
        .ok_or_else(|| StageError::malformed_at(line_no, "timestamp out of range"))
}

/// Parses the lines of an IGC flight log into a track and its metadata.
///
/// Samples keep file order. Fails with `MalformedInput` when a fix precedes the
/// date record, when a fix field cannot be decoded, or when no fix is present.
pub fn parse_igc<I, S>(lines: I) -> StageResult<(FlightTrack, FlightMetadata)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut reader = IgcReader::new();
    for (index, line) in lines.into_iter().enumerate() {
        reader.read_line(line.as_ref(), index + 1)?;
    }

    reader.logger.record(&format!(
        "parsed {} fixes, {} headers, {} ignored records",
        reader.fixes.len(),
        reader.metadata.headers.len(),
        reader.skipped
    ));
    let track = FlightTrack::from_fixes(reader.fixes)?;
    Ok((track, reader.metadata))
}

/// Convenience wrapper over [`parse_igc`] for a whole file's contents.
pub fn parse_igc_str(contents: &str) -> StageResult<(FlightTrack, FlightMetadata)> {
    parse_igc(contents.lines())
}
