//! Discrete events carried by the [`EventBus`](crate::bus::EventBus).

use crate::types::{Location, Model, PointerColor, ServerMode};

/// Maximum text payload in bytes.
pub const TEXT_CAPACITY: usize = 64;

/// Fixed-capacity text payload.
pub type Text = heapless::String<TEXT_CAPACITY>;

/// Producer that posted an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Source {
    Button,
    Sensor,
    WebServer,
    Ble,
    Gps,
    /// Synthetic wandering-needle generator.
    Nether,
    /// Line-oriented UART configuration console.
    Console,
    Other,
}

impl Source {
    /// The azimuth source a South-mode long press switches to.
    #[must_use]
    pub const fn toggled_subscription(self) -> Self {
        match self {
            Source::Sensor => Source::Nether,
            _ => Source::Sensor,
        }
    }
}

/// Configuration writes coming from a transport.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigCommand {
    SetSpawn(Location),
    SetColors(PointerColor),
    SetBrightness(u8),
    SetModel(Model),
    SetServerMode(ServerMode),
    Reboot,
}

/// Event payload, one variant per event type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    /// Heading in degrees, `[0, 360)`.
    ///
    /// Kept fractional: the needle damper and the bearing math both work on
    /// sub-degree values, and the renderer quantises to pixels itself.
    Azimuth { angle: f32 },
    /// Transient text to show on the matrix.
    Text(Text),
    ButtonClick,
    ButtonLongPress,
    ButtonMultiClick { clicks: u8 },
    SensorCalibrateRequest,
    FactoryReset,
    /// GPS fix (possibly out of range; validated by the consumer).
    Location(Location),
    Config(ConfigCommand),
    /// Auto-expiry of the Info screen identified by `token`.
    InfoExpired { token: u32 },
    /// The magnetometer disappeared and cannot be recovered without reset.
    SensorUnavailable,
}

/// An event together with the producer that posted it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Event {
    pub source: Source,
    pub kind: EventKind,
}

impl Event {
    #[inline]
    #[must_use]
    pub const fn new(source: Source, kind: EventKind) -> Self {
        Self { source, kind }
    }

    #[inline]
    #[must_use]
    pub const fn azimuth(source: Source, angle: f32) -> Self {
        Self::new(source, EventKind::Azimuth { angle })
    }

    /// Text event; input longer than [`TEXT_CAPACITY`] is truncated on a
    /// character boundary.
    #[must_use]
    pub fn text(source: Source, text: &str) -> Self {
        let mut payload = Text::new();
        for ch in text.chars() {
            if payload.push(ch).is_err() {
                break;
            }
        }
        Self::new(source, EventKind::Text(payload))
    }

    /// True for events whose loss would drop a user action.
    #[must_use]
    pub fn is_control(&self) -> bool {
        !matches!(
            self.kind,
            EventKind::Azimuth { .. } | EventKind::Location(_)
        )
    }
}
