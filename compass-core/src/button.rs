//! Single-button gesture recogniser.
//!
//! Fed one sample per tick (10 ms in the firmware). Presses shorter than the
//! debounce time are ignored; releases separated by less than the click
//! window accumulate into a multi-click; holding past the long-press time
//! reports a long press as soon as the threshold is crossed.

use crate::event::{Event, EventKind, Source};

/// Presses or releases shorter than this are contact bounce.
pub const DEBOUNCE_MS: u64 = 50;
/// Gap after the last release that ends a click sequence.
pub const CLICK_WINDOW_MS: u64 = 400;
/// Hold time that turns a press into a long press.
pub const LONG_PRESS_MS: u64 = 800;

/// Click count that requests a calibration sweep.
pub const CALIBRATE_CLICKS: u8 = 3;
/// Click count that requests a factory reset.
pub const FACTORY_RESET_CLICKS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gesture {
    Click,
    MultiClick(u8),
    LongPress,
}

impl Gesture {
    /// Bus event for a gesture; click counts without a meaning produce none.
    #[must_use]
    pub fn into_event(self) -> Option<Event> {
        let kind = match self {
            Gesture::Click => EventKind::ButtonClick,
            Gesture::LongPress => EventKind::ButtonLongPress,
            Gesture::MultiClick(CALIBRATE_CLICKS) => EventKind::SensorCalibrateRequest,
            Gesture::MultiClick(clicks) if clicks >= FACTORY_RESET_CLICKS => {
                EventKind::ButtonMultiClick { clicks }
            }
            Gesture::MultiClick(_) => return None,
        };
        Some(Event::new(Source::Button, kind))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Down { since: u64, clicks: u8 },
    Up { since: u64, clicks: u8 },
    Held,
}

/// Tick-driven gesture state machine.
#[derive(Debug, Clone, Copy)]
pub struct ButtonDetector {
    phase: Phase,
}

impl ButtonDetector {
    #[must_use]
    pub const fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    /// Advance with the button level sampled at `now_ms`.
    pub fn tick(&mut self, now_ms: u64, pressed: bool) -> Option<Gesture> {
        match self.phase {
            Phase::Idle => {
                if pressed {
                    self.phase = Phase::Down {
                        since: now_ms,
                        clicks: 0,
                    };
                }
                None
            }
            Phase::Down { since, clicks } => {
                let held = now_ms.saturating_sub(since);
                if pressed {
                    if clicks == 0 && held >= LONG_PRESS_MS {
                        self.phase = Phase::Held;
                        return Some(Gesture::LongPress);
                    }
                    return None;
                }
                if held < DEBOUNCE_MS {
                    // bounce: forget this press
                    self.phase = if clicks == 0 {
                        Phase::Idle
                    } else {
                        Phase::Up { since, clicks }
                    };
                    return None;
                }
                self.phase = Phase::Up {
                    since: now_ms,
                    clicks: clicks.saturating_add(1),
                };
                None
            }
            Phase::Up { since, clicks } => {
                let gap = now_ms.saturating_sub(since);
                if pressed && gap >= DEBOUNCE_MS {
                    self.phase = Phase::Down {
                        since: now_ms,
                        clicks,
                    };
                    return None;
                }
                if !pressed && gap >= CLICK_WINDOW_MS {
                    self.phase = Phase::Idle;
                    return Some(if clicks == 1 {
                        Gesture::Click
                    } else {
                        Gesture::MultiClick(clicks)
                    });
                }
                None
            }
            Phase::Held => {
                if !pressed {
                    self.phase = Phase::Idle;
                }
                None
            }
        }
    }
}

impl Default for ButtonDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;

    const TICK: u64 = 10;

    /// Drive the detector with `(pressed, duration_ms)` segments.
    fn run(segments: &[(bool, u64)]) -> Vec<Gesture> {
        let mut detector = ButtonDetector::new();
        let mut now = 0;
        let mut out = Vec::new();
        for &(pressed, duration) in segments {
            let end = now + duration;
            while now < end {
                if let Some(g) = detector.tick(now, pressed) {
                    out.push(g);
                }
                now += TICK;
            }
        }
        out
    }

    #[test]
    fn test_single_click() {
        assert_eq!(run(&[(true, 100), (false, 600)]), [Gesture::Click]);
    }

    #[test]
    fn test_bounce_ignored() {
        assert!(run(&[(true, 20), (false, 600)]).is_empty());
    }

    #[test]
    fn test_triple_click() {
        let g = run(&[
            (true, 100),
            (false, 150),
            (true, 100),
            (false, 150),
            (true, 100),
            (false, 600),
        ]);
        assert_eq!(g, [Gesture::MultiClick(3)]);
        assert_eq!(
            g[0].into_event().map(|e| e.kind),
            Some(EventKind::SensorCalibrateRequest)
        );
    }

    #[test]
    fn test_five_clicks_request_reset() {
        let mut segments = Vec::new();
        for _ in 0..5 {
            segments.push((true, 80));
            segments.push((false, 120));
        }
        segments.push((false, 600));
        let g = run(&segments);
        assert_eq!(g, [Gesture::MultiClick(5)]);
        assert_eq!(
            g[0].into_event().map(|e| e.kind),
            Some(EventKind::ButtonMultiClick { clicks: 5 })
        );
    }

    #[test]
    fn test_long_press_fires_once() {
        assert_eq!(run(&[(true, 2000), (false, 600)]), [Gesture::LongPress]);
    }

    #[test]
    fn test_double_click_has_no_event() {
        assert_eq!(Gesture::MultiClick(2).into_event(), None);
    }
}
