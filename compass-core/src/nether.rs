//! Wandering placeholder needle shown while there is no GPS fix.
//!
//! The needle drifts one frame per tick toward a random target frame and
//! picks a new target on arrival, so the display looks "lost" rather than
//! frozen.

/// Highest animation frame index; frames span the full circle.
pub const MAX_FRAME_INDEX: u8 = 26;

/// Tick period used by the firmware.
pub const NETHER_PERIOD_MS: u64 = 50;

/// Small xorshift generator; quality is irrelevant for an animation.
#[derive(Debug, Clone, Copy)]
struct XorShift32(u32);

impl XorShift32 {
    const fn new(seed: u32) -> Self {
        // xorshift must never hold zero
        Self(if seed == 0 { 0x9E37_79B9 } else { seed })
    }

    fn next(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NetherGenerator {
    current: u8,
    target: u8,
    rng: XorShift32,
}

impl NetherGenerator {
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self {
            current: 0,
            target: 0,
            rng: XorShift32::new(seed),
        }
    }

    #[must_use]
    pub const fn frame(&self) -> u8 {
        self.current
    }

    /// Advance one step and return the azimuth to display.
    pub fn tick(&mut self) -> f32 {
        if self.current == self.target {
            self.target = (self.rng.next() % (u32::from(MAX_FRAME_INDEX) + 1)) as u8;
        } else if self.current < self.target {
            self.current += 1;
        } else {
            self.current -= 1;
        }
        frame_to_azimuth(self.current)
    }
}

/// Azimuth represented by an animation frame.
#[must_use]
pub fn frame_to_azimuth(frame: u8) -> f32 {
    f32::from(frame.min(MAX_FRAME_INDEX)) * 360.0 / f32::from(MAX_FRAME_INDEX)
}
