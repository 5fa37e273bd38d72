//! Device state machine.
//!
//! The active state is one variant of [`ActiveState`] held in a single slot
//! of the [`StateMachine`]. A transition runs `on_exit` on the old state,
//! drops it, constructs the new one and runs its `on_enter`, exactly once
//! each.

mod calibrating;
mod compass;
mod factory_reset;
mod info;
mod machine;

use core::future::Future;

pub use calibrating::CalibratingState;
pub use compass::{CompassState, RefreshLimiter, REFRESH_INTERVAL_MS};
pub use factory_reset::FactoryResetState;
pub use info::{InfoState, INFO_DURATION_MS};
pub use machine::{Boot, StateMachine};

use crate::context::Context;
use crate::event::{ConfigCommand, Event, Text};
use crate::services::Board;
use crate::types::Location;

/// Text shown when no magnetometer could be found.
pub const SENSOR_ERROR_TEXT: &str = "Sensor Error 100";

/// Behaviour of one device mode.
pub trait State {
    fn name(&self) -> &'static str;

    /// Runs once after construction. Returning a state chains straight into it.
    fn on_enter<B: Board>(
        &mut self,
        ctx: &mut Context,
        board: &mut B,
    ) -> impl Future<Output = Option<StateId>>;

    /// Runs once before the state is dropped.
    fn on_exit<B: Board>(&mut self, ctx: &mut Context, board: &mut B);

    /// Handle one dispatched event; `Some` requests a transition.
    fn handle_event<B: Board>(
        &mut self,
        ctx: &mut Context,
        board: &mut B,
        event: Event,
    ) -> Option<StateId>;
}

/// Text screen parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InfoScreen {
    pub text: Text,
    /// Fatal screens never expire and have no outgoing transition.
    pub fatal: bool,
}

impl InfoScreen {
    #[must_use]
    pub fn transient(text: Text) -> Self {
        Self { text, fatal: false }
    }

    #[must_use]
    pub fn sensor_fatal() -> Self {
        let mut text = Text::new();
        // fits: the constant is shorter than the capacity
        let _ = text.push_str(SENSOR_ERROR_TEXT);
        Self { text, fatal: true }
    }
}

/// Identifies the state to construct next.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StateId {
    Compass,
    Calibrating,
    FactoryReset,
    Info(InfoScreen),
}

/// Closed set of device states.
pub enum ActiveState {
    Compass(CompassState),
    Calibrating(CalibratingState),
    FactoryReset(FactoryResetState),
    Info(InfoState),
}

impl From<StateId> for ActiveState {
    fn from(id: StateId) -> Self {
        match id {
            StateId::Compass => ActiveState::Compass(CompassState::new()),
            StateId::Calibrating => ActiveState::Calibrating(CalibratingState::new()),
            StateId::FactoryReset => ActiveState::FactoryReset(FactoryResetState::new()),
            StateId::Info(screen) => ActiveState::Info(InfoState::new(screen)),
        }
    }
}

impl State for ActiveState {
    fn name(&self) -> &'static str {
        match self {
            ActiveState::Compass(s) => s.name(),
            ActiveState::Calibrating(s) => s.name(),
            ActiveState::FactoryReset(s) => s.name(),
            ActiveState::Info(s) => s.name(),
        }
    }

    async fn on_enter<B: Board>(&mut self, ctx: &mut Context, board: &mut B) -> Option<StateId> {
        match self {
            ActiveState::Compass(s) => s.on_enter(ctx, board).await,
            ActiveState::Calibrating(s) => s.on_enter(ctx, board).await,
            ActiveState::FactoryReset(s) => s.on_enter(ctx, board).await,
            ActiveState::Info(s) => s.on_enter(ctx, board).await,
        }
    }

    fn on_exit<B: Board>(&mut self, ctx: &mut Context, board: &mut B) {
        match self {
            ActiveState::Compass(s) => s.on_exit(ctx, board),
            ActiveState::Calibrating(s) => s.on_exit(ctx, board),
            ActiveState::FactoryReset(s) => s.on_exit(ctx, board),
            ActiveState::Info(s) => s.on_exit(ctx, board),
        }
    }

    fn handle_event<B: Board>(
        &mut self,
        ctx: &mut Context,
        board: &mut B,
        event: Event,
    ) -> Option<StateId> {
        match self {
            ActiveState::Compass(s) => s.handle_event(ctx, board, event),
            ActiveState::Calibrating(s) => s.handle_event(ctx, board, event),
            ActiveState::FactoryReset(s) => s.handle_event(ctx, board, event),
            ActiveState::Info(s) => s.handle_event(ctx, board, event),
        }
    }
}

/// Save the settings record, logging failures; the device keeps running.
pub(crate) fn persist<B: Board>(ctx: &Context, board: &mut B) {
    if let Err(e) = board.save(ctx.settings()) {
        error!("failed to persist settings: {:?}", e);
    }
    board.publish_settings(ctx.settings());
}

/// Record a GPS fix. Out-of-range fixes are discarded without side effects.
pub(crate) fn track_location<B: Board>(ctx: &mut Context, board: &mut B, location: Location) {
    if !location.is_valid() {
        debug!("discarding invalid fix");
        return;
    }
    if !ctx.gps_fixed {
        info!("first gps fix {} {}", location.latitude, location.longitude);
        ctx.subscribe_source = crate::event::Source::Sensor;
    }
    ctx.current_location = location;
    ctx.gps_fixed = true;

    if let Some(decision) = ctx.gps_duty.on_fix(&location, &ctx.spawn_location()) {
        board.apply_gps_duty(decision);
    }
}

/// Apply a transport configuration write.
pub(crate) fn apply_config<B: Board>(ctx: &mut Context, board: &mut B, command: ConfigCommand) {
    match command {
        ConfigCommand::SetSpawn(location) => {
            if !location.is_valid() {
                warn!("rejecting out-of-range spawn location");
                return;
            }
            ctx.settings_mut().spawn = location;
            info!("spawn set to {} {}", location.latitude, location.longitude);
        }
        ConfigCommand::SetColors(colors) => ctx.settings_mut().colors = colors,
        ConfigCommand::SetBrightness(brightness) => {
            ctx.settings_mut().brightness = brightness;
            board.set_brightness(brightness);
        }
        ConfigCommand::SetModel(model) => {
            // work type defaults follow on the next boot
            ctx.settings_mut().model = model;
        }
        ConfigCommand::SetServerMode(mode) => ctx.settings_mut().server_mode = mode,
        ConfigCommand::Reboot => {
            info!("reboot requested");
            board.reboot();
            return;
        }
    }
    persist(ctx, board);
}
