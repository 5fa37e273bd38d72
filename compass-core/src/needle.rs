//! Spring-damper interpolation of the displayed heading.
//!
//! Raw headings jump when the user turns quickly; the display follows them
//! like a physical needle instead. Differences are taken along the shortest
//! arc so the needle never swings the long way round through 0°.

use crate::heading::normalize;

pub const STIFFNESS: f32 = 60.0;
pub const DAMPING: f32 = 6.0;
pub const MASS: f32 = 1.0;
/// Integration step matching the 60 Hz sensor poll.
pub const STEP_S: f32 = 1.0 / 60.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct NeedleDamper {
    position: Option<f32>,
    velocity: f32,
}

impl NeedleDamper {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            position: None,
            velocity: 0.0,
        }
    }

    /// Move one step toward `target` and return the displayed heading.
    ///
    /// The first call snaps to the target.
    pub fn update(&mut self, target: f32) -> f32 {
        let Some(position) = self.position else {
            let start = normalize(target);
            self.position = Some(start);
            return start;
        };

        let mut diff = normalize(target) - position;
        if diff > 180.0 {
            diff -= 360.0;
        } else if diff < -180.0 {
            diff += 360.0;
        }

        let accel = (STIFFNESS * diff - DAMPING * self.velocity) / MASS;
        self.velocity += accel * STEP_S;
        let next = normalize(position + self.velocity * STEP_S);
        self.position = Some(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_snaps() {
        let mut needle = NeedleDamper::new();
        assert_eq!(needle.update(123.0), 123.0);
    }

    #[test]
    fn test_converges_to_target() {
        let mut needle = NeedleDamper::new();
        needle.update(0.0);
        let mut shown = 0.0;
        for _ in 0..600 {
            shown = needle.update(90.0);
        }
        assert!((shown - 90.0).abs() < 0.5, "{}", shown);
    }

    #[test]
    fn test_takes_shortest_arc() {
        let mut needle = NeedleDamper::new();
        needle.update(350.0);
        let next = needle.update(10.0);
        // moving forward through 360, not back through 180
        assert!(next > 350.0 || next < 10.0, "{}", next);
    }
}
