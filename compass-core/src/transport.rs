//! Configuration commands shared by the companion-app transports.
//!
//! Each transport write arrives as one ASCII line of the form `key=value` or
//! a bare verb:
//!
//! ```text
//! spawn=<lat>,<lon>          spawn location, decimal degrees
//! colors=#RRGGBB,#RRGGBB     spawn and south pointer colours
//! brightness=<0-255>
//! model=lite|gps
//! server=wifi|ble
//! text=<message>             show a transient message
//! calibrate | reboot | reset | get
//! ```
//!
//! Writes never touch device state directly; [`Command::into_event`] turns
//! them into bus events for the dispatcher.

use core::fmt::Write;

use crate::event::{ConfigCommand, Event, EventKind, Source};
use crate::settings::Settings;
use crate::types::{Location, Model, PointerColor, Rgb, ServerMode};

/// Maximum accepted command line.
pub const MAX_COMMAND_LENGTH: usize = 96;

/// Capacity of a formatted status line.
pub const STATUS_CAPACITY: usize = 160;

/// Error type for command parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Unknown key or verb.
    Unknown,
    /// Value could not be parsed.
    Parse,
    /// Value parsed but is out of range.
    Range,
}

/// A parsed transport command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Config(ConfigCommand),
    Calibrate,
    FactoryReset,
    Show(crate::event::Text),
    /// Read back the persisted settings.
    Query,
}

impl Command {
    /// Event to post for this command; queries are answered by the transport.
    #[must_use]
    pub fn into_event(self, source: Source) -> Option<Event> {
        let kind = match self {
            Command::Config(cmd) => EventKind::Config(cmd),
            Command::Calibrate => EventKind::SensorCalibrateRequest,
            Command::FactoryReset => EventKind::FactoryReset,
            Command::Show(text) => EventKind::Text(text),
            Command::Query => return None,
        };
        Some(Event::new(source, kind))
    }
}

/// Parse one command line (trailing CR/LF and surrounding spaces ignored).
pub fn parse_command(line: &[u8]) -> Result<Command, CommandError> {
    let line = core::str::from_utf8(line)
        .map_err(|_| CommandError::Parse)?
        .trim();

    let (key, value) = match line.split_once('=') {
        Some((key, value)) => (key.trim(), Some(value.trim())),
        None => (line, None),
    };

    match (key, value) {
        ("calibrate", None) => Ok(Command::Calibrate),
        ("reset", None) => Ok(Command::FactoryReset),
        ("reboot", None) => Ok(Command::Config(ConfigCommand::Reboot)),
        ("get", None) => Ok(Command::Query),
        ("spawn", Some(v)) => parse_location(v).map(|l| Command::Config(ConfigCommand::SetSpawn(l))),
        ("colors", Some(v)) => parse_colors(v).map(|c| Command::Config(ConfigCommand::SetColors(c))),
        ("brightness", Some(v)) => {
            parse_brightness(v).map(|b| Command::Config(ConfigCommand::SetBrightness(b)))
        }
        ("model", Some(v)) => parse_model(v).map(|m| Command::Config(ConfigCommand::SetModel(m))),
        ("server", Some(v)) => {
            parse_server_mode(v).map(|m| Command::Config(ConfigCommand::SetServerMode(m)))
        }
        ("text", Some(v)) => {
            let mut text = crate::event::Text::new();
            text.push_str(v).map_err(|_| CommandError::Range)?;
            Ok(Command::Show(text))
        }
        _ => Err(CommandError::Unknown),
    }
}

/// `"lat,lon"` in decimal degrees; must be a valid location.
pub fn parse_location(value: &str) -> Result<Location, CommandError> {
    let (lat, lon) = value.split_once(',').ok_or(CommandError::Parse)?;
    let latitude: f64 = lat.trim().parse().map_err(|_| CommandError::Parse)?;
    let longitude: f64 = lon.trim().parse().map_err(|_| CommandError::Parse)?;
    let location = Location::new(latitude, longitude);
    if !location.is_valid() {
        return Err(CommandError::Range);
    }
    Ok(location)
}

/// `"#RRGGBB,#RRGGBB"`: spawn colour then south colour.
pub fn parse_colors(value: &str) -> Result<PointerColor, CommandError> {
    let (spawn, south) = value.split_once(',').ok_or(CommandError::Parse)?;
    Ok(PointerColor {
        spawn: parse_rgb(spawn.trim())?,
        south: parse_rgb(south.trim())?,
    })
}

/// `"#RRGGBB"` (the `#` is optional).
pub fn parse_rgb(value: &str) -> Result<Rgb, CommandError> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 {
        return Err(CommandError::Parse);
    }
    let packed = u32::from_str_radix(hex, 16).map_err(|_| CommandError::Parse)?;
    Ok(Rgb::from_u32(packed))
}

/// Decimal `0..=255`.
pub fn parse_brightness(value: &str) -> Result<u8, CommandError> {
    let raw: u16 = value.parse().map_err(|_| CommandError::Parse)?;
    u8::try_from(raw).map_err(|_| CommandError::Range)
}

fn parse_model(value: &str) -> Result<Model, CommandError> {
    match value {
        "lite" => Ok(Model::Lite),
        "gps" => Ok(Model::Gps),
        _ => Err(CommandError::Parse),
    }
}

fn parse_server_mode(value: &str) -> Result<ServerMode, CommandError> {
    match value {
        "wifi" => Ok(ServerMode::Wifi),
        "ble" => Ok(ServerMode::Ble),
        _ => Err(CommandError::Parse),
    }
}

/// `"lat,lon"` with six decimals.
pub fn format_location<W: Write>(out: &mut W, location: &Location) -> core::fmt::Result {
    write!(out, "{:.6},{:.6}", location.latitude, location.longitude)
}

/// `"#RRGGBB"`.
pub fn format_rgb<W: Write>(out: &mut W, color: Rgb) -> core::fmt::Result {
    write!(out, "#{:06X}", color.to_u32())
}

/// One-line summary answering a `get` query.
#[must_use]
pub fn status_line(settings: &Settings) -> heapless::String<STATUS_CAPACITY> {
    let mut out = heapless::String::new();
    // Capacity covers the longest possible line; a failed write only truncates.
    let _ = write_status(&mut out, settings);
    out
}

fn write_status<W: Write>(out: &mut W, settings: &Settings) -> core::fmt::Result {
    out.write_str("spawn=")?;
    format_location(out, &settings.spawn)?;
    out.write_str(" colors=")?;
    format_rgb(out, settings.colors.spawn)?;
    out.write_char(',')?;
    format_rgb(out, settings.colors.south)?;
    write!(out, " brightness={}", settings.brightness)?;
    out.write_str(match settings.model {
        Model::Lite => " model=lite",
        Model::Gps => " model=gps",
    })?;
    out.write_str(match settings.server_mode {
        ServerMode::Wifi => " server=wifi",
        ServerMode::Ble => " server=ble",
    })?;
    out.write_str(if settings.calibration.is_uninitialized() {
        " calibrated=no"
    } else {
        " calibrated=yes"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_command() {
        let cmd = parse_command(b"spawn=45.123456,90.654321\r\n").unwrap();
        assert_eq!(
            cmd,
            Command::Config(ConfigCommand::SetSpawn(Location::new(45.123456, 90.654321)))
        );
    }

    #[test]
    fn test_spawn_out_of_range() {
        assert_eq!(parse_location("200,200"), Err(CommandError::Range));
        assert_eq!(parse_location("45.0"), Err(CommandError::Parse));
    }

    #[test]
    fn test_colors_command() {
        let colors = parse_colors("#00FF00,#0000FF").unwrap();
        assert_eq!(colors.spawn, Rgb::new(0, 255, 0));
        assert_eq!(colors.south, Rgb::new(0, 0, 255));
        assert_eq!(parse_rgb("#12345"), Err(CommandError::Parse));
        assert_eq!(parse_rgb("#GG0000"), Err(CommandError::Parse));
    }

    #[test]
    fn test_brightness_bounds() {
        assert_eq!(parse_brightness("0"), Ok(0));
        assert_eq!(parse_brightness("255"), Ok(255));
        assert_eq!(parse_brightness("256"), Err(CommandError::Range));
        assert_eq!(parse_brightness("-1"), Err(CommandError::Parse));
    }

    #[test]
    fn test_verbs_become_events() {
        let event = parse_command(b"calibrate").unwrap().into_event(Source::Ble).unwrap();
        assert_eq!(event.kind, EventKind::SensorCalibrateRequest);
        assert_eq!(event.source, Source::Ble);

        let event = parse_command(b"reset").unwrap().into_event(Source::WebServer).unwrap();
        assert_eq!(event.kind, EventKind::FactoryReset);

        assert_eq!(parse_command(b"get").unwrap().into_event(Source::Console), None);
        assert_eq!(parse_command(b"launch"), Err(CommandError::Unknown));
    }

    #[test]
    fn test_status_line() {
        let settings = Settings::defaults(Model::Gps);
        let line = status_line(&settings);
        assert!(line.starts_with("spawn=39.908692,116.397477 colors=#FF1414,#FF1414"));
        assert!(line.ends_with("calibrated=no"));
    }
}
