//! Normal operation: show the heading or the way to spawn.

use super::{apply_config, track_location, InfoScreen, State, StateId};
use crate::button::FACTORY_RESET_CLICKS;
use crate::context::Context;
use crate::event::{Event, EventKind, Source};
use crate::services::Board;
use crate::types::{DeviceState, WorkType};

/// Minimum spacing of accepted azimuth events (about 30 Hz).
pub const REFRESH_INTERVAL_MS: u64 = 33;

/// Drops events arriving closer together than a fixed interval.
#[derive(Debug, Clone, Copy)]
pub struct RefreshLimiter {
    interval_ms: u64,
    last_ms: Option<u64>,
}

impl RefreshLimiter {
    #[must_use]
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// True if an event at `now_ms` may pass; records it when it does.
    pub fn allow(&mut self, now_ms: u64) -> bool {
        match self.last_ms {
            Some(last) if now_ms.saturating_sub(last) < self.interval_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }
}

pub struct CompassState {
    limiter: RefreshLimiter,
}

impl CompassState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            limiter: RefreshLimiter::new(REFRESH_INTERVAL_MS),
        }
    }

    fn on_button_click(ctx: &mut Context) {
        ctx.work_type = ctx.work_type.toggled();
        if ctx.work_type == WorkType::South {
            ctx.subscribe_source = Source::Sensor;
        }
        info!("work type -> {:?}", ctx.work_type);
    }

    fn on_long_press<B: Board>(ctx: &mut Context, board: &mut B) {
        match ctx.work_type {
            WorkType::Spawn => {
                let current = ctx.current_location;
                if current.is_valid() {
                    ctx.settings_mut().spawn = current;
                    super::persist(ctx, board);
                    info!("spawn saved {} {}", current.latitude, current.longitude);
                } else {
                    warn!("cannot save spawn, no valid location");
                }
            }
            WorkType::South => {
                ctx.subscribe_source = ctx.subscribe_source.toggled_subscription();
                info!("azimuth source -> {:?}", ctx.subscribe_source);
            }
        }
    }

    fn on_azimuth<B: Board>(&mut self, ctx: &mut Context, board: &mut B, source: Source, angle: f32) {
        if ctx.device_state != DeviceState::Compass {
            return;
        }

        match ctx.work_type {
            WorkType::Spawn => match ctx.fix() {
                None => {
                    if source != Source::Nether || !self.limiter.allow(board.now_ms()) {
                        return;
                    }
                    board.set_pointer_color(ctx.settings().colors.spawn);
                    board.render_heading(angle);
                }
                Some(current) => {
                    if source != Source::Sensor || !self.limiter.allow(board.now_ms()) {
                        return;
                    }
                    let target = ctx.spawn_location();
                    board.set_pointer_color(ctx.settings().colors.spawn);
                    board.render_bearing_toward(&target, &current, angle);
                }
            },
            WorkType::South => {
                if source != ctx.subscribe_source || !self.limiter.allow(board.now_ms()) {
                    return;
                }
                ctx.azimuth = angle;
                board.set_pointer_color(ctx.settings().colors.south);
                board.render_heading(angle);
            }
        }
    }
}

impl Default for CompassState {
    fn default() -> Self {
        Self::new()
    }
}

impl State for CompassState {
    fn name(&self) -> &'static str {
        "Compass"
    }

    async fn on_enter<B: Board>(&mut self, ctx: &mut Context, _board: &mut B) -> Option<StateId> {
        ctx.device_state = DeviceState::Compass;
        if ctx.work_type == WorkType::South {
            ctx.subscribe_source = Source::Sensor;
        }
        None
    }

    fn on_exit<B: Board>(&mut self, _ctx: &mut Context, _board: &mut B) {}

    fn handle_event<B: Board>(
        &mut self,
        ctx: &mut Context,
        board: &mut B,
        event: Event,
    ) -> Option<StateId> {
        match event.kind {
            EventKind::ButtonClick => Self::on_button_click(ctx),
            EventKind::ButtonLongPress => Self::on_long_press(ctx, board),
            EventKind::Azimuth { angle } => self.on_azimuth(ctx, board, event.source, angle),
            EventKind::SensorCalibrateRequest => return Some(StateId::Calibrating),
            EventKind::FactoryReset => return Some(StateId::FactoryReset),
            EventKind::ButtonMultiClick { clicks } if clicks >= FACTORY_RESET_CLICKS => {
                return Some(StateId::FactoryReset)
            }
            EventKind::Location(location) => track_location(ctx, board, location),
            EventKind::Config(command) => apply_config(ctx, board, command),
            EventKind::Text(text) => return Some(StateId::Info(InfoScreen::transient(text))),
            EventKind::ButtonMultiClick { .. }
            | EventKind::InfoExpired { .. }
            | EventKind::SensorUnavailable => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ConfigCommand;
    use crate::settings::Settings;
    use crate::testing::{Call, MockBoard};
    use crate::types::{Location, Model};
    use embassy_futures::block_on;

    fn compass(model: Model) -> (CompassState, Context, MockBoard) {
        let mut ctx = Context::new(Settings::defaults(model), None);
        let mut board = MockBoard::new();
        let mut state = CompassState::new();
        assert_eq!(block_on(state.on_enter(&mut ctx, &mut board)), None);
        (state, ctx, board)
    }

    fn ev(source: Source, kind: EventKind) -> Event {
        Event::new(source, kind)
    }

    #[test]
    fn test_click_toggles_work_type_and_resets_source() {
        let (mut state, mut ctx, mut board) = compass(Model::Gps);
        assert_eq!(ctx.work_type, WorkType::Spawn);
        ctx.subscribe_source = Source::Nether;

        state.handle_event(&mut ctx, &mut board, ev(Source::Button, EventKind::ButtonClick));
        assert_eq!(ctx.work_type, WorkType::South);
        assert_eq!(ctx.subscribe_source, Source::Sensor);

        state.handle_event(&mut ctx, &mut board, ev(Source::Button, EventKind::ButtonClick));
        assert_eq!(ctx.work_type, WorkType::Spawn);
    }

    #[test]
    fn test_long_press_saves_valid_spawn() {
        let (mut state, mut ctx, mut board) = compass(Model::Gps);
        ctx.current_location = Location::new(45.0, 90.0);

        state.handle_event(&mut ctx, &mut board, ev(Source::Button, EventKind::ButtonLongPress));
        assert_eq!(ctx.spawn_location(), Location::new(45.0, 90.0));
        assert_eq!(board.saved().map(|s| s.spawn), Some(Location::new(45.0, 90.0)));
    }

    #[test]
    fn test_long_press_ignores_invalid_location() {
        let (mut state, mut ctx, mut board) = compass(Model::Gps);
        ctx.current_location = Location::new(200.0, 200.0);

        state.handle_event(&mut ctx, &mut board, ev(Source::Button, EventKind::ButtonLongPress));
        assert_eq!(ctx.spawn_location(), Location::DEFAULT_SPAWN);
        assert_eq!(board.saved(), None);
    }

    #[test]
    fn test_long_press_in_south_toggles_source() {
        let (mut state, mut ctx, mut board) = compass(Model::Lite);
        assert_eq!(ctx.subscribe_source, Source::Sensor);

        state.handle_event(&mut ctx, &mut board, ev(Source::Button, EventKind::ButtonLongPress));
        assert_eq!(ctx.subscribe_source, Source::Nether);
        state.handle_event(&mut ctx, &mut board, ev(Source::Button, EventKind::ButtonLongPress));
        assert_eq!(ctx.subscribe_source, Source::Sensor);
    }

    #[test]
    fn test_south_filters_unsubscribed_source() {
        let (mut state, mut ctx, mut board) = compass(Model::Lite);
        assert_eq!(ctx.work_type, WorkType::South);

        state.handle_event(&mut ctx, &mut board, Event::azimuth(Source::Gps, 42.0));
        assert_eq!(board.render_count(), 0);

        state.handle_event(&mut ctx, &mut board, Event::azimuth(Source::Sensor, 42.0));
        assert_eq!(board.render_count(), 1);
        assert_eq!(ctx.azimuth, 42.0);
        assert!(board.calls.contains(&Call::Heading(42.0)));
    }

    #[test]
    fn test_spawn_without_fix_only_shows_nether() {
        let (mut state, mut ctx, mut board) = compass(Model::Gps);

        state.handle_event(&mut ctx, &mut board, Event::azimuth(Source::Sensor, 10.0));
        assert_eq!(board.render_count(), 0);

        state.handle_event(&mut ctx, &mut board, Event::azimuth(Source::Nether, 20.0));
        assert_eq!(board.render_count(), 1);
        assert!(board.calls.contains(&Call::Heading(20.0)));
    }

    #[test]
    fn test_spawn_with_fix_renders_bearing_from_sensor() {
        let (mut state, mut ctx, mut board) = compass(Model::Gps);
        let here = Location::new(39.9, 116.3);
        state.handle_event(&mut ctx, &mut board, ev(Source::Gps, EventKind::Location(here)));

        state.handle_event(&mut ctx, &mut board, Event::azimuth(Source::Nether, 20.0));
        assert_eq!(board.render_count(), 0);

        state.handle_event(&mut ctx, &mut board, Event::azimuth(Source::Sensor, 30.0));
        assert_eq!(board.render_count(), 1);
        assert!(board.calls.contains(&Call::BearingToward {
            target: Location::DEFAULT_SPAWN,
            current: here,
            heading: 30.0,
        }));
    }

    #[test]
    fn test_azimuth_rate_limited() {
        let (mut state, mut ctx, mut board) = compass(Model::Lite);

        board.now = 1_000;
        state.handle_event(&mut ctx, &mut board, Event::azimuth(Source::Sensor, 1.0));
        board.now = 1_020;
        state.handle_event(&mut ctx, &mut board, Event::azimuth(Source::Sensor, 2.0));
        assert_eq!(board.render_count(), 1);

        board.now = 1_034;
        state.handle_event(&mut ctx, &mut board, Event::azimuth(Source::Sensor, 3.0));
        assert_eq!(board.render_count(), 2);
    }

    #[test]
    fn test_azimuth_ignored_outside_compass_device_state() {
        let (mut state, mut ctx, mut board) = compass(Model::Lite);
        ctx.device_state = DeviceState::Info;
        state.handle_event(&mut ctx, &mut board, Event::azimuth(Source::Sensor, 1.0));
        assert_eq!(board.render_count(), 0);
    }

    #[test]
    fn test_invalid_fix_discarded() {
        let (mut state, mut ctx, mut board) = compass(Model::Gps);
        let bad = Location::new(200.0, 200.0);
        state.handle_event(&mut ctx, &mut board, ev(Source::Gps, EventKind::Location(bad)));
        assert!(!ctx.gps_fixed);
        assert_eq!(ctx.current_location, Location::UNKNOWN);
        assert!(board.duty_decisions().is_empty());
    }

    #[test]
    fn test_fix_drives_gps_duty_cycle() {
        let (mut state, mut ctx, mut board) = compass(Model::Gps);
        let near_spawn = Location::new(39.91, 116.40);
        state.handle_event(&mut ctx, &mut board, ev(Source::Gps, EventKind::Location(near_spawn)));
        let decisions = board.duty_decisions();
        assert_eq!(decisions.len(), 1);
        assert!(decisions[0].gps_power_enabled);
        assert_eq!(decisions[0].sleep_interval_s, 0);
    }

    #[test]
    fn test_transitions() {
        let (mut state, mut ctx, mut board) = compass(Model::Lite);
        assert_eq!(
            state.handle_event(&mut ctx, &mut board, ev(Source::Button, EventKind::SensorCalibrateRequest)),
            Some(StateId::Calibrating)
        );
        assert_eq!(
            state.handle_event(&mut ctx, &mut board, ev(Source::Ble, EventKind::FactoryReset)),
            Some(StateId::FactoryReset)
        );
        assert_eq!(
            state.handle_event(&mut ctx, &mut board, ev(Source::Button, EventKind::ButtonMultiClick { clicks: 5 })),
            Some(StateId::FactoryReset)
        );
        assert_eq!(
            state.handle_event(&mut ctx, &mut board, ev(Source::Button, EventKind::ButtonMultiClick { clicks: 2 })),
            None
        );
    }

    #[test]
    fn test_config_writes_persist() {
        let (mut state, mut ctx, mut board) = compass(Model::Lite);
        let spawn = Location::new(1.5, 2.5);
        state.handle_event(
            &mut ctx,
            &mut board,
            ev(Source::Console, EventKind::Config(ConfigCommand::SetSpawn(spawn))),
        );
        state.handle_event(
            &mut ctx,
            &mut board,
            ev(Source::Console, EventKind::Config(ConfigCommand::SetBrightness(9))),
        );
        assert_eq!(board.saved().map(|s| (s.spawn, s.brightness)), Some((spawn, 9)));
        assert!(board.calls.contains(&Call::Brightness(9)));

        state.handle_event(
            &mut ctx,
            &mut board,
            ev(Source::Console, EventKind::Config(ConfigCommand::Reboot)),
        );
        assert!(board.calls.contains(&Call::Reboot));
    }
}
