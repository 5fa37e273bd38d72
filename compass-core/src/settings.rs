//! Persisted configuration record.
//!
//! # Layout
//!
//! All multi-byte fields are little-endian.
//!
//! ```text
//! off  len  field
//!   0    4  magic "MCMP"
//!   4    1  layout version
//!   5    1  model (0 = Lite, 1 = Gps)
//!   6    1  server mode (0 = Wifi, 1 = Ble)
//!   7    1  brightness
//!   8    8  spawn latitude  (f64)
//!  16    8  spawn longitude (f64)
//!  24    4  spawn pointer colour 0x00RRGGBB
//!  28    4  south pointer colour 0x00RRGGBB
//!  32   24  calibration profile (3 x f32 offset, 3 x f32 scale)
//!  56    2  CRC-16/IBM-3740 over bytes 0..56
//! ```

use crc::{Crc, CRC_16_IBM_3740};

use crate::calibration::{CalibrationProfile, PROFILE_BLOB_LEN};
use crate::types::{Location, Model, PointerColor, Rgb, ServerMode, DEFAULT_BRIGHTNESS};

/// Encoded record size.
pub const RECORD_LEN: usize = 58;

const MAGIC: [u8; 4] = *b"MCMP";
const VERSION: u8 = 1;
const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Error type for record decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// No record present (erased flash or foreign data).
    Absent,
    /// Record written by an incompatible firmware.
    Version,
    /// Integrity check failed.
    Checksum,
    /// A field holds an out-of-range value.
    Field,
}

/// Everything the device keeps across reboots.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    pub calibration: CalibrationProfile,
    pub spawn: Location,
    pub colors: PointerColor,
    pub brightness: u8,
    pub model: Model,
    pub server_mode: ServerMode,
}

impl Settings {
    /// First-boot defaults for the given hardware model.
    #[must_use]
    pub fn defaults(model: Model) -> Self {
        Self {
            calibration: CalibrationProfile::UNINITIALIZED,
            spawn: Location::DEFAULT_SPAWN,
            colors: PointerColor::default(),
            brightness: DEFAULT_BRIGHTNESS,
            model,
            server_mode: ServerMode::Ble,
        }
    }

    #[must_use]
    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut buf = [0u8; RECORD_LEN];
        buf[0..4].copy_from_slice(&MAGIC);
        buf[4] = VERSION;
        buf[5] = self.model.to_byte();
        buf[6] = self.server_mode.to_byte();
        buf[7] = self.brightness;
        buf[8..16].copy_from_slice(&self.spawn.latitude.to_le_bytes());
        buf[16..24].copy_from_slice(&self.spawn.longitude.to_le_bytes());
        buf[24..28].copy_from_slice(&self.colors.spawn.to_u32().to_le_bytes());
        buf[28..32].copy_from_slice(&self.colors.south.to_u32().to_le_bytes());
        buf[32..56].copy_from_slice(&self.calibration.to_bytes());
        let crc = CRC16.checksum(&buf[..56]);
        buf[56..58].copy_from_slice(&crc.to_le_bytes());
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self, RecordError> {
        if buf.len() < RECORD_LEN || buf[0..4] != MAGIC {
            return Err(RecordError::Absent);
        }
        if buf[4] != VERSION {
            return Err(RecordError::Version);
        }
        let stored = u16::from_le_bytes([buf[56], buf[57]]);
        if CRC16.checksum(&buf[..56]) != stored {
            return Err(RecordError::Checksum);
        }

        let model = Model::from_byte(buf[5]).ok_or(RecordError::Field)?;
        let server_mode = ServerMode::from_byte(buf[6]).ok_or(RecordError::Field)?;
        let spawn = Location::new(read_f64(&buf[8..16]), read_f64(&buf[16..24]));
        let colors = PointerColor {
            spawn: Rgb::from_u32(read_u32(&buf[24..28])),
            south: Rgb::from_u32(read_u32(&buf[28..32])),
        };
        let mut blob = [0u8; PROFILE_BLOB_LEN];
        blob.copy_from_slice(&buf[32..56]);

        Ok(Self {
            calibration: CalibrationProfile::from_bytes(&blob),
            spawn: if spawn.is_valid() {
                spawn
            } else {
                Location::DEFAULT_SPAWN
            },
            colors,
            brightness: buf[7],
            model,
            server_mode,
        })
    }
}

fn read_f64(bytes: &[u8]) -> f64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    f64::from_le_bytes(raw)
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
