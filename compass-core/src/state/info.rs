//! Text screen, either transient or fatal.

use super::{apply_config, track_location, InfoScreen, State, StateId};
use crate::button::FACTORY_RESET_CLICKS;
use crate::context::Context;
use crate::event::{Event, EventKind};
use crate::services::Board;
use crate::types::DeviceState;

/// How long a transient text screen stays up.
pub const INFO_DURATION_MS: u32 = 3_000;

pub struct InfoState {
    screen: InfoScreen,
    /// Identifies the expiry timer armed by this instance.
    token: Option<u32>,
}

impl InfoState {
    #[must_use]
    pub fn new(screen: InfoScreen) -> Self {
        Self {
            screen,
            token: None,
        }
    }

    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.screen.fatal
    }
}

impl State for InfoState {
    fn name(&self) -> &'static str {
        if self.screen.fatal {
            "Fatal"
        } else {
            "Info"
        }
    }

    async fn on_enter<B: Board>(&mut self, ctx: &mut Context, board: &mut B) -> Option<StateId> {
        if self.screen.fatal {
            ctx.device_state = DeviceState::Fatal;
            error!("fatal: {}", self.screen.text.as_str());
        } else {
            ctx.device_state = DeviceState::Info;
            let token = ctx.next_info_token();
            self.token = Some(token);
            board.schedule_info_expiry(INFO_DURATION_MS, token);
        }
        board.render_text(&self.screen.text);
        None
    }

    fn on_exit<B: Board>(&mut self, _ctx: &mut Context, _board: &mut B) {}

    fn handle_event<B: Board>(
        &mut self,
        ctx: &mut Context,
        board: &mut B,
        event: Event,
    ) -> Option<StateId> {
        if self.screen.fatal {
            return None;
        }
        match event.kind {
            EventKind::InfoExpired { token } if Some(token) == self.token => Some(StateId::Compass),
            EventKind::InfoExpired { .. } => {
                debug!("stale info expiry ignored");
                None
            }
            EventKind::Location(location) => {
                track_location(ctx, board, location);
                None
            }
            EventKind::Config(command) => {
                apply_config(ctx, board, command);
                None
            }
            EventKind::SensorCalibrateRequest => Some(StateId::Calibrating),
            EventKind::FactoryReset => Some(StateId::FactoryReset),
            EventKind::ButtonMultiClick { clicks } if clicks >= FACTORY_RESET_CLICKS => {
                Some(StateId::FactoryReset)
            }
            EventKind::Text(text) => Some(StateId::Info(InfoScreen::transient(text))),
            EventKind::Azimuth { .. }
            | EventKind::ButtonClick
            | EventKind::ButtonLongPress
            | EventKind::ButtonMultiClick { .. }
            | EventKind::SensorUnavailable => None,
        }
    }
}
