//! Wipes persisted settings and restarts the device.

use super::{State, StateId};
use crate::context::Context;
use crate::event::Event;
use crate::services::Board;
use crate::types::DeviceState;

/// Terminal state; the reboot ends it.
pub struct FactoryResetState;

impl FactoryResetState {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for FactoryResetState {
    fn default() -> Self {
        Self::new()
    }
}

impl State for FactoryResetState {
    fn name(&self) -> &'static str {
        "FactoryReset"
    }

    async fn on_enter<B: Board>(&mut self, ctx: &mut Context, board: &mut B) -> Option<StateId> {
        ctx.device_state = DeviceState::Info;
        board.render_text("Factory Reset");
        warn!("factory reset: erasing settings");
        if let Err(e) = board.erase() {
            error!("erase failed: {:?}", e);
        }
        board.reboot();
        None
    }

    fn on_exit<B: Board>(&mut self, _ctx: &mut Context, _board: &mut B) {}

    fn handle_event<B: Board>(
        &mut self,
        _ctx: &mut Context,
        _board: &mut B,
        _event: Event,
    ) -> Option<StateId> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, Source};
    use crate::settings::Settings;
    use crate::testing::{Call, MockBoard};
    use crate::types::Model;
    use embassy_futures::block_on;

    #[test]
    fn test_erases_then_reboots() {
        let mut board = MockBoard::new();
        let mut ctx = Context::new(Settings::defaults(Model::Gps), None);
        let mut state = FactoryResetState::new();

        assert_eq!(block_on(state.on_enter(&mut ctx, &mut board)), None);
        let erase = board.calls.iter().position(|c| *c == Call::Erase);
        let reboot = board.calls.iter().position(|c| *c == Call::Reboot);
        assert!(erase.is_some());
        assert!(erase < reboot);

        let click = Event::new(Source::Button, EventKind::ButtonClick);
        assert_eq!(state.handle_event(&mut ctx, &mut board, click), None);
    }
}
