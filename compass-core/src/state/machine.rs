//! Owns the context, the board and the single active state.

use super::{ActiveState, InfoScreen, State, StateId};
use crate::context::Context;
use crate::event::{Event, EventKind};
use crate::services::Board;
use crate::types::DeviceState;

/// How the device came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Boot {
    Normal,
    /// Calibration was requested while booting (button held at power-up).
    CalibrateRequested,
    /// No magnetometer answered the probe.
    SensorMissing,
}

/// Event dispatcher. Every state transition and context write happens here.
pub struct StateMachine<B: Board> {
    ctx: Context,
    board: B,
    state: Option<ActiveState>,
}

impl<B: Board> StateMachine<B> {
    #[must_use]
    pub fn new(ctx: Context, board: B) -> Self {
        Self {
            ctx,
            board,
            state: None,
        }
    }

    /// Leave `Starting` and enter the first state.
    pub async fn start(&mut self, boot: Boot) {
        self.board.publish_settings(self.ctx.settings());
        self.board.set_brightness(self.ctx.settings().brightness);
        info!("boot: {:?}", boot);

        let first = match boot {
            Boot::Normal => StateId::Compass,
            Boot::CalibrateRequested => StateId::Calibrating,
            Boot::SensorMissing => StateId::Info(InfoScreen::sensor_fatal()),
        };
        self.transition(first).await;
    }

    /// Deliver one event to the active state and apply any transition.
    pub async fn dispatch(&mut self, event: Event) {
        if matches!(event.kind, EventKind::SensorUnavailable) {
            if self.ctx.device_state != DeviceState::Fatal {
                self.transition(StateId::Info(InfoScreen::sensor_fatal())).await;
            }
            return;
        }

        let Some(state) = self.state.as_mut() else {
            warn!("event before start dropped");
            return;
        };
        if let Some(next) = state.handle_event(&mut self.ctx, &mut self.board, event) {
            self.transition(next).await;
        }
    }

    async fn transition(&mut self, mut next: StateId) {
        loop {
            if let Some(mut old) = self.state.take() {
                old.on_exit(&mut self.ctx, &mut self.board);
                debug!("leaving {}", old.name());
            }
            let mut state = ActiveState::from(next);
            debug!("entering {}", state.name());
            let chained = state.on_enter(&mut self.ctx, &mut self.board).await;
            self.state = Some(state);
            match chained {
                Some(id) => next = id,
                None => break,
            }
        }
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    #[must_use]
    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// Name of the active state, if started.
    #[must_use]
    pub fn state_name(&self) -> Option<&'static str> {
        self.state.as_ref().map(|s| s.name())
    }
}
