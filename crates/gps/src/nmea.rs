//! NMEA 0183 sentence parsing.
//!
//! Only the two sentences that carry a position fix are decoded:
//!
//! ```text
//! $--GGA,hhmmss.ss,ddmm.mmmm,N,dddmm.mmmm,E,q,nn,h.h,alt,M,sep,M,age,ref*CS
//! $--RMC,hhmmss.ss,A,ddmm.mmmm,N,dddmm.mmmm,E,spd,crs,ddmmyy,var,E[,mode]*CS
//! ```
//!
//! The talker ID (`GP`, `GN`, `GL`, ...) is ignored. Every other sentence
//! parses as [`Sentence::Other`].

use std::fmt;

use chrono::{NaiveDate, NaiveTime};

use crate::error::NmeaError;

/// A parsed sentence.
#[derive(Debug, Clone, PartialEq)]
pub enum Sentence {
    Gga(Gga),
    Rmc(Rmc),
    /// Any sentence type without position data; holds the three-letter type.
    Other(String),
}

/// Global Positioning System fix data.
#[derive(Debug, Clone, PartialEq)]
pub struct Gga {
    pub timestamp: Option<NaiveTime>,
    pub position: Option<Position>,
    /// 0 = invalid, 1 = GPS, 2 = DGPS, higher values are RTK/estimated modes.
    pub quality: u8,
    pub satellites: Option<u8>,
    pub altitude: Option<Altitude>,
}

/// Recommended minimum navigation data.
#[derive(Debug, Clone, PartialEq)]
pub struct Rmc {
    pub timestamp: Option<NaiveTime>,
    /// `A` = data valid, `V` = warning.
    pub status: char,
    pub position: Option<Position>,
    pub date: Option<NaiveDate>,
}

/// Signed decimal-degree coordinates plus the hemisphere letters they came with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub lat_dir: char,
    pub lon_dir: char,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Altitude {
    pub value: f64,
    pub units: String,
}

/// A usable position fix.
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
    pub lat_dir: char,
    pub lon_dir: char,
    /// Only GGA sentences report altitude.
    pub altitude: Option<Altitude>,
    pub timestamp: Option<NaiveTime>,
}

impl Sentence {
    /// Returns the fix if this sentence reports a valid one.
    pub fn fix(&self) -> Option<Fix> {
        let (position, altitude, timestamp) = match self {
            Sentence::Rmc(rmc) if rmc.status == 'A' => (rmc.position?, None, rmc.timestamp),
            Sentence::Gga(gga) if matches!(gga.quality, 1 | 2) => {
                (gga.position?, gga.altitude.clone(), gga.timestamp)
            }
            _ => return None,
        };

        Some(Fix {
            latitude: position.latitude,
            longitude: position.longitude,
            lat_dir: position.lat_dir,
            lon_dir: position.lon_dir,
            altitude,
            timestamp,
        })
    }
}

impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Latitude: {:.6} {}", self.latitude.abs(), self.lat_dir)?;
        write!(f, "Longitude: {:.6} {}", self.longitude.abs(), self.lon_dir)?;
        if let Some(alt) = &self.altitude {
            write!(f, "\nAltitude: {} {}", alt.value, alt.units)?;
        }
        if let Some(ts) = self.timestamp {
            write!(f, "\nTime (UTC): {ts}")?;
        }
        Ok(())
    }
}

/// Parses one sentence, verifying its checksum when one is present.
pub fn parse(line: &str) -> Result<Sentence, NmeaError> {
    let body = line.trim().strip_prefix('$').ok_or(NmeaError::MissingStart)?;

    let body = match body.split_once('*') {
        Some((data, checksum)) => {
            verify_checksum(data, checksum)?;
            data
        }
        None => body,
    };

    let fields: Vec<&str> = body.split(',').collect();
    let address = fields[0];
    let kind = address
        .len()
        .checked_sub(3)
        .and_then(|start| address.get(start..))
        .unwrap_or(address);
    let field = |i: usize| fields.get(i).copied().unwrap_or("");

    // Proprietary sentences ($P...) carry vendor-specific layouts.
    if address.starts_with('P') {
        return Ok(Sentence::Other(kind.to_string()));
    }

    match kind {
        "GGA" => Ok(Sentence::Gga(Gga {
            timestamp: parse_time(field(1))?,
            position: parse_position(field(2), field(3), field(4), field(5))?,
            quality: parse_optional::<u8>("fix quality", field(6))?.unwrap_or(0),
            satellites: parse_optional("satellite count", field(7))?,
            altitude: parse_optional::<f64>("altitude", field(9))?.map(|value| Altitude {
                value,
                units: field(10).to_string(),
            }),
        })),
        "RMC" => Ok(Sentence::Rmc(Rmc {
            timestamp: parse_time(field(1))?,
            status: field(2).chars().next().unwrap_or('V'),
            position: parse_position(field(3), field(4), field(5), field(6))?,
            date: parse_date(field(9))?,
        })),
        other => Ok(Sentence::Other(other.to_string())),
    }
}

fn verify_checksum(data: &str, checksum: &str) -> Result<(), NmeaError> {
    let checksum = checksum.trim();
    if checksum.len() != 2 {
        return Err(NmeaError::InvalidChecksum(checksum.to_string()));
    }
    let expected = u8::from_str_radix(checksum, 16)
        .map_err(|_| NmeaError::InvalidChecksum(checksum.to_string()))?;
    let computed = data.bytes().fold(0u8, |acc, b| acc ^ b);

    if expected != computed {
        return Err(NmeaError::Checksum { expected, computed });
    }
    Ok(())
}

fn parse_optional<T: std::str::FromStr>(
    field: &'static str,
    value: &str,
) -> Result<Option<T>, NmeaError> {
    if value.is_empty() {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| invalid(field, value))
}

/// `hhmmss` with optional fractional seconds.
fn parse_time(value: &str) -> Result<Option<NaiveTime>, NmeaError> {
    if value.is_empty() {
        return Ok(None);
    }
    let (whole, frac) = value.split_once('.').unwrap_or((value, ""));
    if whole.len() != 6 || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("time", value));
    }

    let num = |range: std::ops::Range<usize>| whole[range].parse::<u32>().unwrap_or(0);
    let micros = if frac.is_empty() {
        0
    } else {
        let digits: String = frac.chars().chain(std::iter::repeat('0')).take(6).collect();
        digits.parse::<u32>().map_err(|_| invalid("time", value))?
    };

    NaiveTime::from_hms_micro_opt(num(0..2), num(2..4), num(4..6), micros)
        .map(Some)
        .ok_or_else(|| invalid("time", value))
}

/// `ddmmyy`; two-digit years below 69 are 20xx.
fn parse_date(value: &str) -> Result<Option<NaiveDate>, NmeaError> {
    if value.is_empty() {
        return Ok(None);
    }
    if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("date", value));
    }

    let num = |range: std::ops::Range<usize>| value[range].parse::<u32>().unwrap_or(0);
    let yy = num(4..6) as i32;
    let year = if yy < 69 { 2000 + yy } else { 1900 + yy };

    NaiveDate::from_ymd_opt(year, num(2..4), num(0..2))
        .map(Some)
        .ok_or_else(|| invalid("date", value))
}

fn parse_position(
    lat: &str,
    lat_dir: &str,
    lon: &str,
    lon_dir: &str,
) -> Result<Option<Position>, NmeaError> {
    if lat.is_empty() || lon.is_empty() {
        return Ok(None);
    }

    let lat_dir = hemisphere("latitude hemisphere", lat_dir, ['N', 'S'])?;
    let lon_dir = hemisphere("longitude hemisphere", lon_dir, ['E', 'W'])?;

    let mut latitude = degrees_minutes("latitude", lat)?;
    let mut longitude = degrees_minutes("longitude", lon)?;
    if lat_dir == 'S' {
        latitude = -latitude;
    }
    if lon_dir == 'W' {
        longitude = -longitude;
    }

    Ok(Some(Position {
        latitude,
        longitude,
        lat_dir,
        lon_dir,
    }))
}

fn hemisphere(field: &'static str, value: &str, allowed: [char; 2]) -> Result<char, NmeaError> {
    match value.chars().next() {
        Some(c) if value.len() == 1 && allowed.contains(&c) => Ok(c),
        _ => Err(invalid(field, value)),
    }
}

/// Converts `dddmm.mmmm` to unsigned decimal degrees.
fn degrees_minutes(field: &'static str, value: &str) -> Result<f64, NmeaError> {
    let int_len = value.find('.').unwrap_or(value.len());
    if !value.is_ascii() || int_len < 2 {
        return Err(invalid(field, value));
    }
    let (deg, min) = value.split_at(int_len - 2);

    let degrees = if deg.is_empty() {
        0.0
    } else {
        deg.parse::<u32>().map_err(|_| invalid(field, value))? as f64
    };
    let minutes: f64 = min.parse().map_err(|_| invalid(field, value))?;
    if !(0.0..60.0).contains(&minutes) {
        return Err(invalid(field, value));
    }

    Ok(degrees + minutes / 60.0)
}

fn invalid(field: &'static str, value: &str) -> NmeaError {
    NmeaError::InvalidField {
        field,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
    const RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn parses_gga() {
        let Sentence::Gga(gga) = parse(GGA).unwrap() else {
            panic!("expected GGA");
        };
        assert_eq!(gga.timestamp, NaiveTime::from_hms_opt(12, 35, 19));
        assert_eq!(gga.quality, 1);
        assert_eq!(gga.satellites, Some(8));

        let pos = gga.position.unwrap();
        assert!(close(pos.latitude, 48.1173));
        assert!(close(pos.longitude, 11.0 + 31.0 / 60.0));
        assert_eq!((pos.lat_dir, pos.lon_dir), ('N', 'E'));

        let alt = gga.altitude.unwrap();
        assert!(close(alt.value, 545.4));
        assert_eq!(alt.units, "M");
    }

    #[test]
    fn parses_rmc() {
        let Sentence::Rmc(rmc) = parse(RMC).unwrap() else {
            panic!("expected RMC");
        };
        assert_eq!(rmc.status, 'A');
        assert_eq!(rmc.date, NaiveDate::from_ymd_opt(1994, 3, 23));
        assert!(rmc.position.is_some());
    }

    #[test]
    fn gga_fix_includes_altitude() {
        let fix = parse(GGA).unwrap().fix().unwrap();
        assert!(close(fix.latitude, 48.1173));
        assert!(fix.altitude.is_some());
        assert_eq!(fix.timestamp, NaiveTime::from_hms_opt(12, 35, 19));
    }

    #[test]
    fn rmc_fix_has_no_altitude() {
        let fix = parse(RMC).unwrap().fix().unwrap();
        assert!(fix.altitude.is_none());
        assert!(close(fix.longitude, 11.516_666_666));
    }

    #[test]
    fn southern_and_western_hemispheres_are_negative() {
        let line = "$GNRMC,083559.00,A,3352.1280,S,15112.7040,W,0.004,77.52,091202,,,A*4F";
        let fix = parse(line).unwrap().fix().unwrap();
        assert!(close(fix.latitude, -(33.0 + 52.128 / 60.0)));
        assert!(close(fix.longitude, -(151.0 + 12.704 / 60.0)));
        assert_eq!((fix.lat_dir, fix.lon_dir), ('S', 'W'));
        assert_eq!(fix.timestamp, NaiveTime::from_hms_opt(8, 35, 59));
    }

    #[test]
    fn dgps_gga_is_a_fix() {
        let line = "$GNGGA,001043.50,3540.1234,N,13945.6789,E,2,12,0.8,40.0,M,39.5,M,,*4E";
        let fix = parse(line).unwrap().fix().unwrap();
        assert!(close(fix.latitude, 35.0 + 40.1234 / 60.0));
        assert_eq!(fix.timestamp, NaiveTime::from_hms_milli_opt(0, 10, 43, 500));
    }

    #[test]
    fn void_rmc_is_not_a_fix() {
        let sentence = parse("$GPRMC,123519,V,,,,,,,230394,,*33").unwrap();
        assert!(matches!(&sentence, Sentence::Rmc(r) if r.status == 'V' && r.position.is_none()));
        assert!(sentence.fix().is_none());
    }

    #[test]
    fn gga_without_fix_quality_is_not_a_fix() {
        let sentence = parse("$GPGGA,123519,,,,,0,00,99.99,,,,,,*45").unwrap();
        assert!(sentence.fix().is_none());
    }

    #[test]
    fn other_sentences_are_passed_through() {
        let line = "$GPGSV,3,1,11,03,03,111,00,04,15,270,00,06,01,010,00,13,06,292,00*74";
        let sentence = parse(line).unwrap();
        assert_eq!(sentence, Sentence::Other("GSV".into()));
        assert!(sentence.fix().is_none());
    }

    #[test]
    fn checksum_mismatch_is_rejected() {
        let corrupted = GGA.replace("4807.038", "4807.039");
        assert!(matches!(
            parse(&corrupted),
            Err(NmeaError::Checksum { expected: 0x47, .. })
        ));
        assert!(matches!(
            parse("$GPGGA,123519*ZZ"),
            Err(NmeaError::InvalidChecksum(_))
        ));
    }

    #[test]
    fn missing_checksum_is_accepted() {
        let line = GGA.split_once('*').unwrap().0;
        assert!(parse(line).unwrap().fix().is_some());
    }

    #[test]
    fn missing_dollar_is_rejected() {
        assert_eq!(parse("GPGGA,123519"), Err(NmeaError::MissingStart));
    }

    #[test]
    fn bad_hemisphere_is_rejected() {
        assert!(matches!(
            parse("$GPRMC,123519,A,4807.038,X,01131.000,E,,,230394,,"),
            Err(NmeaError::InvalidField {
                field: "latitude hemisphere",
                ..
            })
        ));
    }

    #[test]
    fn fix_display_uses_hemisphere_letters() {
        let line = "$GNRMC,083559.00,A,3352.1280,S,15112.7040,W,0.004,77.52,091202,,,A*4F";
        let text = parse(line).unwrap().fix().unwrap().to_string();
        assert!(text.starts_with("Latitude: 33.868800 S\nLongitude: 151.211733 W"));
        assert!(text.ends_with("Time (UTC): 08:35:59"));
    }
}
