//! Core compass types: samples, locations, modes, colours.

/// Signed 3-axis reading from one bias-cancelled magnetometer read.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl RawSample {
    /// Create a new sample from its three axes.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    #[must_use]
    pub const fn from_axes(axes: [i32; 3]) -> Self {
        Self::new(axes[0], axes[1], axes[2])
    }

    #[inline]
    #[must_use]
    pub const fn axes(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Offset- and scale-corrected sample, rounded back to integer counts.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibratedSample {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CalibratedSample {
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    #[must_use]
    pub const fn from_axes(axes: [i32; 3]) -> Self {
        Self::new(axes[0], axes[1], axes[2])
    }

    #[inline]
    #[must_use]
    pub const fn axes(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Geographic coordinate in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Placeholder used before the first fix; deliberately out of range.
    pub const UNKNOWN: Self = Self::new(255.0, 255.0);

    /// Factory default spawn point.
    pub const DEFAULT_SPAWN: Self = Self::new(39.908692, 116.397477);

    #[inline]
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// A location is valid when both coordinates are finite and in range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

/// What the pointer is aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WorkType {
    /// Point toward the saved spawn location.
    Spawn,
    /// Point along the magnetic heading.
    South,
}

impl WorkType {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            WorkType::Spawn => WorkType::South,
            WorkType::South => WorkType::Spawn,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    Starting,
    Calibrate,
    Compass,
    Info,
    /// Terminal; only an external reset leaves this state.
    Fatal,
}

/// Hardware variant. Only the `Gps` model carries a receiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Model {
    Lite,
    Gps,
}

impl Model {
    /// Work type selected on boot.
    #[must_use]
    pub const fn default_work_type(self) -> WorkType {
        match self {
            Model::Lite => WorkType::South,
            Model::Gps => WorkType::Spawn,
        }
    }

    /// Azimuth source subscribed to on boot.
    #[must_use]
    pub const fn default_subscribe_source(self) -> crate::event::Source {
        match self {
            Model::Lite => crate::event::Source::Sensor,
            Model::Gps => crate::event::Source::Nether,
        }
    }

    pub(crate) const fn to_byte(self) -> u8 {
        match self {
            Model::Lite => 0,
            Model::Gps => 1,
        }
    }

    pub(crate) const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Model::Lite),
            1 => Some(Model::Gps),
            _ => None,
        }
    }
}

/// Supported magnetometer chips.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorModel {
    Qmc5883l,
    Qmc5883p,
    Mmc5883ma,
}

impl SensorModel {
    /// Every supported chip, in probe order.
    pub const ALL: [SensorModel; 3] = [
        SensorModel::Qmc5883l,
        SensorModel::Qmc5883p,
        SensorModel::Mmc5883ma,
    ];

    /// Fixed 7-bit I2C address of the chip.
    #[must_use]
    pub const fn address(self) -> u8 {
        match self {
            SensorModel::Qmc5883l => 0x0D,
            SensorModel::Qmc5883p => 0x2C,
            SensorModel::Mmc5883ma => 0x30,
        }
    }

    /// Look up the chip that answers on `address`.
    #[must_use]
    pub fn from_address(address: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|model| model.address() == address)
    }
}

/// Transport the companion app talks to. Persisted only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServerMode {
    Wifi,
    Ble,
}

impl ServerMode {
    pub(crate) const fn to_byte(self) -> u8 {
        match self {
            ServerMode::Wifi => 0,
            ServerMode::Ble => 1,
        }
    }

    pub(crate) const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(ServerMode::Wifi),
            1 => Some(ServerMode::Ble),
            _ => None,
        }
    }
}

/// 24-bit colour.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    #[must_use]
    pub const fn from_u32(packed: u32) -> Self {
        Self::new((packed >> 16) as u8, (packed >> 8) as u8, packed as u8)
    }

    #[must_use]
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// Pointer colours for the two work types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PointerColor {
    pub spawn: Rgb,
    pub south: Rgb,
}

impl PointerColor {
    pub const DEFAULT_RGB: Rgb = Rgb::from_u32(0xFF1414);

    #[must_use]
    pub const fn for_work_type(&self, work_type: WorkType) -> Rgb {
        match work_type {
            WorkType::Spawn => self.spawn,
            WorkType::South => self.south,
        }
    }
}

impl Default for PointerColor {
    fn default() -> Self {
        Self {
            spawn: Self::DEFAULT_RGB,
            south: Self::DEFAULT_RGB,
        }
    }
}

/// Default LED brightness (0-255).
pub const DEFAULT_BRIGHTNESS: u8 = 56;

/// Magnetometer failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// No known chip answered during probing and the full bus scan.
    Unavailable,
    /// Data-ready never asserted within the retry budget.
    Timeout,
    /// I2C transaction failed.
    Bus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_validity() {
        assert!(Location::new(45.0, 90.0).is_valid());
        assert!(Location::new(-90.0, 180.0).is_valid());
        assert!(!Location::new(200.0, 200.0).is_valid());
        assert!(!Location::new(45.0, -180.5).is_valid());
        assert!(!Location::UNKNOWN.is_valid());
        assert!(!Location::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_work_type_toggle() {
        assert_eq!(WorkType::Spawn.toggled(), WorkType::South);
        assert_eq!(WorkType::South.toggled(), WorkType::Spawn);
    }

    #[test]
    fn test_sensor_model_address_lookup() {
        assert_eq!(SensorModel::from_address(0x0D), Some(SensorModel::Qmc5883l));
        assert_eq!(SensorModel::from_address(0x2C), Some(SensorModel::Qmc5883p));
        assert_eq!(SensorModel::from_address(0x30), Some(SensorModel::Mmc5883ma));
        assert_eq!(SensorModel::from_address(0x1E), None);
    }

    #[test]
    fn test_rgb_packing() {
        let c = Rgb::from_u32(0xFF1414);
        assert_eq!(c, Rgb::new(0xFF, 0x14, 0x14));
        assert_eq!(c.to_u32(), 0xFF1414);
    }
}
