//! GPS power management.
//!
//! The receiver is the largest power draw on the GPS model. Far from the
//! target the fix only needs refreshing occasionally, so the receiver sleeps
//! for longer the further away the device is.

use crate::geo::distance_km;
use crate::types::Location;

/// Post-boot window in which the first sentence must arrive.
pub const PRESENCE_WINDOW_MS: u64 = 30_000;

/// One bracket of the distance-to-sleep table.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SleepConfigRow {
    /// Upper bound of this bracket, in kilometres.
    pub distance_threshold_km: f32,
    pub sleep_interval_s: u32,
    pub gps_power_enabled: bool,
}

impl SleepConfigRow {
    pub const fn new(distance_threshold_km: f32, sleep_interval_s: u32, gps_power_enabled: bool) -> Self {
        Self {
            distance_threshold_km,
            sleep_interval_s,
            gps_power_enabled,
        }
    }
}

/// Ascending by threshold.
pub const SLEEP_TABLE: [SleepConfigRow; 4] = [
    SleepConfigRow::new(10.0, 0, true),
    SleepConfigRow::new(50.0, 300, false),
    SleepConfigRow::new(100.0, 600, false),
    SleepConfigRow::new(200.0, 900, false),
];

/// What the GPS task should do after a fix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyDecision {
    pub sleep_interval_s: u32,
    pub gps_power_enabled: bool,
}

/// Maps distance-to-target onto the sleep table.
#[derive(Clone, Copy, Debug)]
pub struct GpsDutyCycleController {
    table: &'static [SleepConfigRow],
}

impl GpsDutyCycleController {
    /// `table` must be non-empty and sorted by ascending threshold.
    #[must_use]
    pub const fn new(table: &'static [SleepConfigRow]) -> Self {
        Self { table }
    }

    /// Pick the bracket containing `distance_km`.
    ///
    /// Scans from the largest threshold downward and stops at the first row
    /// whose threshold is below the distance. Distances beyond the last
    /// threshold use the last row.
    #[must_use]
    pub fn decide(&self, distance_km: f32) -> Option<DutyDecision> {
        let mut chosen = self.table.last()?;
        for row in self.table.iter().rev() {
            if distance_km <= row.distance_threshold_km {
                chosen = row;
            } else {
                break;
            }
        }
        Some(DutyDecision {
            sleep_interval_s: chosen.sleep_interval_s,
            gps_power_enabled: chosen.gps_power_enabled,
        })
    }

    /// Decision for a fix at `current` heading to `target`.
    ///
    /// Invalid locations produce no decision.
    #[must_use]
    pub fn on_fix(&self, current: &Location, target: &Location) -> Option<DutyDecision> {
        if !current.is_valid() || !target.is_valid() {
            return None;
        }
        let distance = distance_km(current, target) as f32;
        let decision = self.decide(distance)?;
        debug!(
            "gps duty: {} km -> sleep {} s, power {}",
            distance,
            decision.sleep_interval_s,
            decision.gps_power_enabled
        );
        Some(decision)
    }
}

impl Default for GpsDutyCycleController {
    fn default() -> Self {
        Self::new(&SLEEP_TABLE)
    }
}

/// Outcome of the post-boot presence check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Presence {
    Pending,
    Present,
    Absent,
}

/// Decides whether a receiver is fitted at all.
#[derive(Clone, Copy, Debug)]
pub struct PresenceMonitor {
    deadline_ms: u64,
    seen: bool,
}

impl PresenceMonitor {
    #[must_use]
    pub const fn new(boot_ms: u64, window_ms: u64) -> Self {
        Self {
            deadline_ms: boot_ms + window_ms,
            seen: false,
        }
    }

    /// Record that the receiver produced a well-formed sentence.
    pub fn record(&mut self) {
        self.seen = true;
    }

    #[must_use]
    pub const fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }

    #[must_use]
    pub fn check(&self, now_ms: u64) -> Presence {
        if self.seen {
            Presence::Present
        } else if now_ms >= self.deadline_ms {
            Presence::Absent
        } else {
            Presence::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(sleep: u32, power: bool) -> Option<DutyDecision> {
        Some(DutyDecision {
            sleep_interval_s: sleep,
            gps_power_enabled: power,
        })
    }

    #[test]
    fn test_bracket_selection() {
        let ctl = GpsDutyCycleController::default();
        assert_eq!(ctl.decide(5.0), decision(0, true));
        assert_eq!(ctl.decide(75.0), decision(600, false));
        assert_eq!(ctl.decide(10.0), decision(0, true));
        assert_eq!(ctl.decide(10.5), decision(300, false));
        assert_eq!(ctl.decide(150.0), decision(900, false));
        assert_eq!(ctl.decide(5000.0), decision(900, false));
    }

    #[test]
    fn test_empty_table() {
        static EMPTY: [SleepConfigRow; 0] = [];
        assert_eq!(GpsDutyCycleController::new(&EMPTY).decide(1.0), None);
    }

    #[test]
    fn test_invalid_fix_ignored() {
        let ctl = GpsDutyCycleController::default();
        assert_eq!(ctl.on_fix(&Location::UNKNOWN, &Location::DEFAULT_SPAWN), None);
        assert_eq!(
            ctl.on_fix(&Location::DEFAULT_SPAWN, &Location::DEFAULT_SPAWN),
            decision(0, true)
        );
    }

    #[test]
    fn test_presence_window() {
        let mut monitor = PresenceMonitor::new(1_000, PRESENCE_WINDOW_MS);
        assert_eq!(monitor.check(5_000), Presence::Pending);
        assert_eq!(monitor.check(31_000), Presence::Absent);
        monitor.record();
        assert_eq!(monitor.check(31_000), Presence::Present);
    }
}
