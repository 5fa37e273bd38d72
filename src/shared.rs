//! Global state and inter-task communication.
//!
//! Producers post to [`EVENTS`]; only the dispatcher task receives from it.
//! Everything the dispatcher exports to other tasks goes through the
//! signals and watches below.

use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_sync::watch::Watch;
use embassy_time::{Delay, Timer};
use portable_atomic::AtomicU8;

use compass_core::types::DEFAULT_BRIGHTNESS;
use compass_core::{
    BusError, DutyDecision, Event, EventBus, HeadingPipeline, Rgb, Settings, Text,
    EVENT_QUEUE_DEPTH,
};
use magnetometer::AnyMagnetometer;

/// Blocking I2C0 bus the magnetometer sits on.
pub type SensorBus = I2c<'static, I2C0, Blocking>;
pub type Sensor = AnyMagnetometer<SensorBus, Delay>;
pub type Pipeline = HeadingPipeline<Sensor>;
/// `None` when no magnetometer was found at boot.
pub type SharedPipeline = Mutex<CriticalSectionRawMutex, Option<Pipeline>>;

/// How long a control producer waits for queue space before dropping.
pub const POST_DEADLINE_MS: u64 = 20;

/// What the LED task should show.
#[derive(Clone, Debug)]
pub enum RenderCommand {
    /// Needle at `angle` degrees clockwise from the top of the matrix.
    Needle { angle: f32, color: Rgb },
    /// Scrolling text, repeated until replaced.
    Text { text: Text, color: Rgb },
}

/// Pending auto-close of an Info screen.
#[derive(Clone, Copy, Debug)]
pub struct InfoExpiry {
    pub after_ms: u32,
    pub token: u32,
}

/// The single event queue.
pub static EVENTS: EventBus<CriticalSectionRawMutex, EVENT_QUEUE_DEPTH> = EventBus::new();

/// Latest frame request for the LED task (latest value wins).
pub static RENDER: Signal<CriticalSectionRawMutex, RenderCommand> = Signal::new();

/// Duty-cycle decision for the GPS task.
pub static GPS_DUTY: Signal<CriticalSectionRawMutex, DutyDecision> = Signal::new();

/// Info-screen timer request for the expiry task.
pub static INFO_EXPIRY: Signal<CriticalSectionRawMutex, InfoExpiry> = Signal::new();

/// Persisted settings as last saved, read by the console.
pub static SETTINGS: Watch<CriticalSectionRawMutex, Settings, 2> = Watch::new();

/// LED brightness (0-255), applied on every frame.
pub static BRIGHTNESS: AtomicU8 = AtomicU8::new(DEFAULT_BRIGHTNESS);

/// Post a control event, waiting at most [`POST_DEADLINE_MS`] for space.
pub async fn post(event: Event) -> Result<(), BusError> {
    EVENTS
        .post_within(event, Timer::after_millis(POST_DEADLINE_MS))
        .await
}

/// Post a control event that must not be lost, retrying until it is queued.
pub async fn post_control(event: Event) {
    while post(event.clone()).await.is_err() {
        defmt::warn!("event bus full, retrying {:?}", event.kind);
    }
}
