use crate::prelude::{StageError, StageResult};
use crate::track::FixValidity;
use chrono::{NaiveDate, NaiveTime};
use std::ops::Range;
use std::str::FromStr;

/// Degrees per thousandth of an arc minute.
pub const MILLIMINUTES_IN_DEG: f64 = 1e-3 / 60.0;

/// Shortest line that holds every fixed-width field of a fix record.
pub const FIX_RECORD_MIN_LEN: usize = 35;
/// Largest accepted timezone offset magnitude, in hours.
pub const MAX_TIMEZONE_OFFSET_HOURS: f64 = 24.0;

/// Fields of a fix record before it is anchored to a calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFix {
    pub time_of_day: NaiveTime,
    pub latitude: f64,
    pub longitude: f64,
    pub validity: FixValidity,
    pub pressure_altitude: f64,
    pub gps_altitude: f64,
}

/// Converts integer degrees plus thousandths of a minute into decimal degrees.
pub fn decode_degrees(degrees: u32, milliminutes: u32) -> f64 {
    degrees as f64 + milliminutes as f64 * MILLIMINUTES_IN_DEG
}

fn field<'a>(
    line: &'a str,
    range: Range<usize>,
    line_no: usize,
    name: &str,
) -> StageResult<&'a str> {
    line.get(range)
        .ok_or_else(|| StageError::malformed_at(line_no, format!("missing {} field", name)))
}

fn number<T: FromStr>(line: &str, range: Range<usize>, line_no: usize, name: &str) -> StageResult<T> {
    let text = field(line, range, line_no, name)?;
    text.parse::<T>().map_err(|_| {
        StageError::malformed_at(line_no, format!("invalid {} '{}' in '{}'", name, text, line))
    })
}

fn hemisphere(
    line: &str,
    index: usize,
    line_no: usize,
    positive: &str,
    negative: &str,
) -> StageResult<f64> {
    match field(line, index..index + 1, line_no, "hemisphere")? {
        h if h == positive => Ok(1.0),
        h if h == negative => Ok(-1.0),
        other => Err(StageError::malformed_at(
            line_no,
            format!("invalid hemisphere '{}' (expected {} or {})", other, positive, negative),
        )),
    }
}

/// Decodes the fixed-width fields of a `B` record.
pub fn decode_fix(line: &str, line_no: usize) -> StageResult<RawFix> {
    if line.len() < FIX_RECORD_MIN_LEN {
        return Err(StageError::malformed_at(
            line_no,
            format!(
                "fix record has {} characters, expected at least {}",
                line.len(),
                FIX_RECORD_MIN_LEN
            ),
        ));
    }

    let hour: u32 = number(line, 1..3, line_no, "hour")?;
    let minute: u32 = number(line, 3..5, line_no, "minute")?;
    let second: u32 = number(line, 5..7, line_no, "second")?;
    let time_of_day = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| {
        StageError::malformed_at(
            line_no,
            format!("invalid time of day {:02}:{:02}:{:02}", hour, minute, second),
        )
    })?;

    let latitude = decode_degrees(
        number(line, 7..9, line_no, "latitude degrees")?,
        number(line, 9..14, line_no, "latitude minutes")?,
    ) * hemisphere(line, 14, line_no, "N", "S")?;
    let longitude = decode_degrees(
        number(line, 15..18, line_no, "longitude degrees")?,
        number(line, 18..23, line_no, "longitude minutes")?,
    ) * hemisphere(line, 23, line_no, "E", "W")?;

    let validity = match field(line, 24..25, line_no, "fix validity")? {
        "A" => FixValidity::ThreeD,
        "V" => FixValidity::TwoD,
        other => {
            return Err(StageError::malformed_at(
                line_no,
                format!("invalid fix validity '{}'", other),
            ))
        }
    };

    let pressure_altitude: i32 = number(line, 25..30, line_no, "pressure altitude")?;
    let gps_altitude: i32 = number(line, 30..35, line_no, "GPS altitude")?;

    Ok(RawFix {
        time_of_day,
        latitude,
        longitude,
        validity,
        pressure_altitude: pressure_altitude as f64,
        gps_altitude: gps_altitude as f64,
    })
}

/// Decodes `HFDTE150721` as well as `HFDTEDATE:150721,01`.
pub fn decode_date(line: &str, line_no: usize) -> StageResult<NaiveDate> {
    let rest = line.get(5..).unwrap_or_default();
    let rest = rest.strip_prefix("DATE:").unwrap_or(rest);
    let digits = rest
        .get(..6)
        .ok_or_else(|| StageError::malformed_at(line_no, format!("truncated date record '{}'", line)))?;
    NaiveDate::parse_from_str(digits, "%d%m%y").map_err(|err| {
        StageError::malformed_at(line_no, format!("invalid date '{}': {}", digits, err))
    })
}

/// Decodes the fractional hour offset of `HFTZNTIMEZONE:<hours>`.
pub fn decode_timezone(line: &str, line_no: usize) -> StageResult<f64> {
    let value = line
        .split_once(':')
        .map(|(_, value)| value)
        .unwrap_or_else(|| line.get(13..).unwrap_or_default())
        .trim();
    let invalid =
        || StageError::malformed_at(line_no, format!("invalid timezone offset '{}'", value));
    let hours = value.parse::<f64>().map_err(|_| invalid())?;
    if !hours.is_finite() || hours.abs() > MAX_TIMEZONE_OFFSET_HOURS {
        return Err(invalid());
    }
    Ok(hours)
}

/// Splits a generic header at its first colon.
pub fn split_header(line: &str) -> (&str, &str) {
    line.split_once(':').unwrap_or((line, ""))
}

/// Text following the last colon of a device identity record.
pub fn serial_number(line: &str) -> &str {
    line.rsplit_once(':')
        .map(|(_, serial)| serial)
        .unwrap_or_else(|| line.get(1..).unwrap_or_default())
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FIX: &str = "B1101354737335N01551450EA0138201495";

    #[test]
    fn degrees_decode_from_thousandths_of_minute() {
        assert_relative_eq!(decode_degrees(47, 37335), 47.622250, epsilon = 1e-9);
    }

    #[test]
    fn fix_record_decodes_every_field() {
        let fix = decode_fix(FIX, 1).unwrap();
        assert_eq!(fix.time_of_day, NaiveTime::from_hms_opt(11, 1, 35).unwrap());
        assert_relative_eq!(fix.latitude, 47.622250, epsilon = 1e-9);
        assert_relative_eq!(fix.longitude, 15.0 + 51450.0 * MILLIMINUTES_IN_DEG, epsilon = 1e-9);
        assert_eq!(fix.validity, FixValidity::ThreeD);
        assert_eq!(fix.pressure_altitude, 1382.0);
        assert_eq!(fix.gps_altitude, 1495.0);
    }

    #[test]
    fn south_and_west_hemispheres_negate() {
        let fix = decode_fix("B1101354737335S01551450WV0138201495", 1).unwrap();
        assert!(fix.latitude < 0.0);
        assert!(fix.longitude < 0.0);
        assert_eq!(fix.validity, FixValidity::TwoD);
    }

    #[test]
    fn negative_altitudes_are_accepted() {
        let fix = decode_fix("B1101354737335N01551450EA-0012-0003", 1).unwrap();
        assert_eq!(fix.pressure_altitude, -12.0);
        assert_eq!(fix.gps_altitude, -3.0);
    }

    #[test]
    fn non_numeric_field_reports_line() {
        let err = decode_fix("B11013547X7335N01551450EA0138201495", 7).unwrap_err();
        assert!(matches!(err, StageError::MalformedInput { line: Some(7), .. }));
    }

    #[test]
    fn short_fix_record_is_malformed() {
        assert!(decode_fix("B110135473", 3).is_err());
    }

    #[test]
    fn invalid_time_of_day_is_malformed() {
        assert!(decode_fix("B2561354737335N01551450EA0138201495", 1).is_err());
    }

    #[test]
    fn both_date_layouts_decode() {
        let expected = NaiveDate::from_ymd_opt(2021, 7, 15).unwrap();
        assert_eq!(decode_date("HFDTE150721", 1).unwrap(), expected);
        assert_eq!(decode_date("HFDTEDATE:150721,01", 1).unwrap(), expected);
        assert!(decode_date("HFDTE1507", 1).is_err());
    }

    #[test]
    fn header_splits_at_first_colon() {
        assert_eq!(
            split_header("HFGTYGLIDERTYPE:Nova: Mentor 7"),
            ("HFGTYGLIDERTYPE", "Nova: Mentor 7")
        );
        assert_eq!(split_header("HFNOCOLON"), ("HFNOCOLON", ""));
    }

    #[test]
    fn serial_number_follows_last_colon() {
        assert_eq!(serial_number("AXCT:FLIGHT:ABC123"), "ABC123");
        assert_eq!(serial_number("AXGD001"), "XGD001");
    }

    #[test]
    fn timezone_offset_is_fractional_hours() {
        assert_eq!(decode_timezone("HFTZNTIMEZONE:+5.5", 1).unwrap(), 5.5);
        assert_eq!(decode_timezone("HFTZNTIMEZONE:-2", 1).unwrap(), -2.0);
        assert!(decode_timezone("HFTZNTIMEZONE:abc", 1).is_err());
    }

    #[test]
    fn timezone_offset_must_be_finite_and_bounded() {
        for line in [
            "HFTZNTIMEZONE:inf",
            "HFTZNTIMEZONE:-inf",
            "HFTZNTIMEZONE:NaN",
            "HFTZNTIMEZONE:3000000000",
            "HFTZNTIMEZONE:24.5",
        ] {
            assert!(
                matches!(
                    decode_timezone(line, 4),
                    Err(StageError::MalformedInput { line: Some(4), .. })
                ),
                "{} was accepted",
                line
            );
        }
        assert_eq!(decode_timezone("HFTZNTIMEZONE:-24", 1).unwrap(), -24.0);
    }
}
