//! Nether task: wandering needle shown while there is no GPS fix.

use embassy_time::{Duration, Instant, Ticker};

use compass_core::nether::NETHER_PERIOD_MS;
use compass_core::{Event, NetherGenerator, Source};

use crate::shared::EVENTS;

pub async fn run() -> ! {
    // any non-zero seed will do; boot time varies with flash and probing
    let seed = (Instant::now().as_ticks() as u32) | 1;
    let mut generator = NetherGenerator::new(seed);
    let mut ticker = Ticker::every(Duration::from_millis(NETHER_PERIOD_MS));

    loop {
        ticker.next().await;
        let _ = EVENTS.try_post(Event::azimuth(Source::Nether, generator.tick()));
    }
}
