//! Minimal NMEA 0183 parser for position fixes.
//!
//! Only the two sentences that carry a position are understood:
//!
//! ```text
//! $--RMC,hhmmss.ss,A,ddmm.mmmm,N,dddmm.mmmm,E,speed,course,ddmmyy,,*hh
//! $--GGA,hhmmss.ss,ddmm.mmmm,N,dddmm.mmmm,E,q,sats,hdop,alt,M,,,,*hh
//! ```
//!
//! The checksum is the XOR of every byte between `$` and `*`, written as two
//! hex digits. Any talker ID is accepted.

use crate::types::Location;

/// Longest sentence allowed by NMEA 0183 (82) plus slack for CR/LF.
pub const MAX_SENTENCE_LENGTH: usize = 96;

/// Error type for sentence parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NmeaError {
    /// Missing `$`, `*` or a required field.
    Format,
    /// Checksum mismatch.
    Checksum,
    /// Well-formed sentence without position data.
    Unsupported,
}

/// Parse one sentence.
///
/// Returns `Ok(Some(location))` for a sentence reporting a fix, `Ok(None)`
/// for a position sentence without one (RMC status `V`, GGA quality 0).
/// The returned location is not range-checked.
pub fn parse_sentence(line: &[u8]) -> Result<Option<Location>, NmeaError> {
    let line = strip_line_ending(line);
    let payload = extract_verified_payload(line)?;

    let mut fields = payload.split(|&b| b == b',');
    let address = fields.next().ok_or(NmeaError::Format)?;
    if address.len() != 5 {
        return Err(NmeaError::Format);
    }

    match &address[2..] {
        b"RMC" => {
            let _time = fields.next().ok_or(NmeaError::Format)?;
            let status = fields.next().ok_or(NmeaError::Format)?;
            let position = parse_position(&mut fields)?;
            if status != b"A" {
                return Ok(None);
            }
            Ok(position)
        }
        b"GGA" => {
            let _time = fields.next().ok_or(NmeaError::Format)?;
            let position = parse_position(&mut fields)?;
            let quality = fields.next().ok_or(NmeaError::Format)?;
            if quality.is_empty() || quality == b"0" {
                return Ok(None);
            }
            Ok(position)
        }
        _ => Err(NmeaError::Unsupported),
    }
}

/// Read the four `lat,N/S,lon,E/W` fields. Empty fields mean "no fix".
fn parse_position<'a, I>(fields: &mut I) -> Result<Option<Location>, NmeaError>
where
    I: Iterator<Item = &'a [u8]>,
{
    let lat = fields.next().ok_or(NmeaError::Format)?;
    let lat_hemi = fields.next().ok_or(NmeaError::Format)?;
    let lon = fields.next().ok_or(NmeaError::Format)?;
    let lon_hemi = fields.next().ok_or(NmeaError::Format)?;

    if lat.is_empty() || lon.is_empty() {
        return Ok(None);
    }

    let latitude = match lat_hemi {
        b"N" => parse_coordinate(lat, 2)?,
        b"S" => -parse_coordinate(lat, 2)?,
        _ => return Err(NmeaError::Format),
    };
    let longitude = match lon_hemi {
        b"E" => parse_coordinate(lon, 3)?,
        b"W" => -parse_coordinate(lon, 3)?,
        _ => return Err(NmeaError::Format),
    };
    Ok(Some(Location::new(latitude, longitude)))
}

/// `ddmm.mmmm` / `dddmm.mmmm` to decimal degrees.
fn parse_coordinate(field: &[u8], degree_digits: usize) -> Result<f64, NmeaError> {
    if field.len() <= degree_digits {
        return Err(NmeaError::Format);
    }
    let (deg, min) = field.split_at(degree_digits);
    let degrees = parse_f64(deg)?;
    let minutes = parse_f64(min)?;
    if !(0.0..60.0).contains(&minutes) {
        return Err(NmeaError::Format);
    }
    Ok(degrees + minutes / 60.0)
}

fn parse_f64(field: &[u8]) -> Result<f64, NmeaError> {
    core::str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or(NmeaError::Format)
}

/// Calculate XOR checksum of the payload bytes.
#[inline]
pub fn calculate_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// Strip trailing CR and/or LF from a line.
#[inline]
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    if end > 0 && line[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && line[end - 1] == b'\r' {
        end -= 1;
    }
    &line[..end]
}

/// Check the `$...*hh` framing and checksum, returning the bytes in between.
fn extract_verified_payload(line: &[u8]) -> Result<&[u8], NmeaError> {
    if line.first() != Some(&b'$') {
        return Err(NmeaError::Format);
    }
    let star = line
        .iter()
        .rposition(|&b| b == b'*')
        .ok_or(NmeaError::Format)?;
    let payload = &line[1..star];
    let checksum = &line[star + 1..];
    if checksum.len() != 2 {
        return Err(NmeaError::Format);
    }

    let expected = parse_hex_u8(checksum)?;
    if calculate_checksum(payload) != expected {
        return Err(NmeaError::Checksum);
    }
    Ok(payload)
}

fn parse_hex_u8(s: &[u8]) -> Result<u8, NmeaError> {
    s.iter().try_fold(0u8, |acc, &c| {
        let nibble = match c {
            b'0'..=b'9' => c - b'0',
            b'A'..=b'F' => c - b'A' + 10,
            b'a'..=b'f' => c - b'a' + 10,
            _ => return Err(NmeaError::Format),
        };
        Ok((acc << 4) | nibble)
    })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::format;
    use std::string::String;

    fn with_checksum(body: &str) -> String {
        format!("${}*{:02X}\r\n", body, calculate_checksum(body.as_bytes()))
    }

    #[test]
    fn test_rmc_fix() {
        let line = with_checksum("GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W");
        let loc = parse_sentence(line.as_bytes()).unwrap().unwrap();
        assert!((loc.latitude - (48.0 + 7.038 / 60.0)).abs() < 1e-9);
        assert!((loc.longitude - (11.0 + 31.0 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn test_rmc_void_has_no_fix() {
        let line = with_checksum("GNRMC,123519,V,,,,,,,230394,,");
        assert_eq!(parse_sentence(line.as_bytes()), Ok(None));
    }

    #[test]
    fn test_gga_southern_western() {
        let line = with_checksum("GPGGA,092750.000,5321.6802,S,00630.3372,W,1,8,1.03,61.7,M,55.2,M,,");
        let loc = parse_sentence(line.as_bytes()).unwrap().unwrap();
        assert!(loc.latitude < -53.0 && loc.latitude > -54.0);
        assert!(loc.longitude < -6.0 && loc.longitude > -7.0);
    }

    #[test]
    fn test_gga_quality_zero() {
        let line = with_checksum("GPGGA,092750.000,5321.6802,N,00630.3372,W,0,0,,,M,,M,,");
        assert_eq!(parse_sentence(line.as_bytes()), Ok(None));
    }

    #[test]
    fn test_bad_checksum() {
        let line = b"$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*00";
        assert_eq!(parse_sentence(line), Err(NmeaError::Checksum));
    }

    #[test]
    fn test_unsupported_sentence() {
        let line = with_checksum("GPGSV,3,1,11,03,03,111,00");
        assert_eq!(parse_sentence(line.as_bytes()), Err(NmeaError::Unsupported));
    }

    #[test]
    fn test_garbage() {
        assert_eq!(parse_sentence(b"hello"), Err(NmeaError::Format));
        assert_eq!(parse_sentence(b"$GPRMC,1"), Err(NmeaError::Format));
    }
}
