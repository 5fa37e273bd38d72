//! Runs the magnetometer min/max sweep and stores the result.

use super::{persist, InfoScreen, State, StateId};
use crate::calibration::SWEEP_DURATION_MS;
use crate::context::Context;
use crate::event::Event;
use crate::services::Board;
use crate::types::{DeviceState, SensorError};

/// Active for the whole sweep. The sweep runs inside `on_enter`, so events
/// posted meanwhile stay queued on the bus until it finishes.
pub struct CalibratingState;

impl CalibratingState {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for CalibratingState {
    fn default() -> Self {
        Self::new()
    }
}

impl State for CalibratingState {
    fn name(&self) -> &'static str {
        "Calibrating"
    }

    async fn on_enter<B: Board>(&mut self, ctx: &mut Context, board: &mut B) -> Option<StateId> {
        ctx.device_state = DeviceState::Calibrate;
        board.render_text("Calibrating");
        info!("calibration sweep started, rotate the device");

        match board.sweep(SWEEP_DURATION_MS).await {
            Ok(profile) => {
                info!(
                    "calibration done, offset {} {} {}",
                    profile.offset[0],
                    profile.offset[1],
                    profile.offset[2]
                );
                ctx.settings_mut().calibration = profile;
                persist(ctx, board);
                Some(StateId::Compass)
            }
            Err(SensorError::Unavailable) => {
                error!("magnetometer lost during calibration");
                Some(StateId::Info(InfoScreen::sensor_fatal()))
            }
            Err(e) => {
                warn!("calibration aborted: {:?}", e);
                Some(StateId::Compass)
            }
        }
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
    use crate::calibration::CalibrationProfile;
    use crate::settings::Settings;
    use crate::testing::{Call, MockBoard};
    use crate::types::Model;
    use embassy_futures::block_on;

    #[test]
    fn test_sweep_result_persisted() {
        let profile = CalibrationProfile {
            offset: [10.0, -4.0, 2.0],
            scale: [1.1, 0.9, 1.0],
        };
        let mut board = MockBoard::new();
        board.sweep_result = Ok(profile);
        let mut ctx = Context::new(Settings::defaults(Model::Lite), None);

        let next = block_on(CalibratingState::new().on_enter(&mut ctx, &mut board));
        assert_eq!(next, Some(StateId::Compass));
        assert_eq!(ctx.device_state, DeviceState::Calibrate);
        assert_eq!(ctx.settings().calibration, profile);
        assert_eq!(board.saved().map(|s| s.calibration), Some(profile));
        assert!(board.calls.contains(&Call::Sweep(SWEEP_DURATION_MS)));
    }

    #[test]
    fn test_lost_sensor_is_fatal() {
        let mut board = MockBoard::new();
        board.sweep_result = Err(SensorError::Unavailable);
        let mut ctx = Context::new(Settings::defaults(Model::Lite), None);

        let next = block_on(CalibratingState::new().on_enter(&mut ctx, &mut board));
        assert_eq!(next, Some(StateId::Info(InfoScreen::sensor_fatal())));
        assert_eq!(board.saved(), None);
    }

    #[test]
    fn test_bus_error_returns_to_compass_without_saving() {
        let mut board = MockBoard::new();
        board.sweep_result = Err(SensorError::Bus);
        let mut ctx = Context::new(Settings::defaults(Model::Lite), None);

        let next = block_on(CalibratingState::new().on_enter(&mut ctx, &mut board));
        assert_eq!(next, Some(StateId::Compass));
        assert_eq!(board.saved(), None);
    }
}
