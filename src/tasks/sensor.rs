//! Sensor task: polls the heading pipeline at 60 Hz and posts azimuths.

use defmt::{error, warn};
use embassy_time::{Duration, Ticker};

use compass_core::{Event, EventKind, NeedleDamper, SensorError, Source};

use crate::shared::{post_control, SharedPipeline, EVENTS};

/// Consecutive bus failures after which the magnetometer is declared gone
/// (one second at the poll rate).
pub const MAX_CONSECUTIVE_BUS_ERRORS: u32 = 60;

pub async fn run(pipeline: &'static SharedPipeline) {
    let mut ticker = Ticker::every(Duration::from_hz(60));
    let mut damper = NeedleDamper::new();
    let mut bus_errors = 0u32;

    loop {
        ticker.next().await;

        let result = match pipeline.lock().await.as_mut() {
            Some(p) => p.poll(),
            None => Err(SensorError::Unavailable),
        };

        match result {
            Ok(heading) => {
                bus_errors = 0;
                let shown = damper.update(heading);
                // refused while the queue is backed up; the next frame replaces it
                let _ = EVENTS.try_post(Event::azimuth(Source::Sensor, shown));
            }
            Err(SensorError::Timeout) => {}
            Err(SensorError::Bus) => {
                bus_errors += 1;
                if bus_errors == 1 {
                    warn!("magnetometer read failed");
                }
                if bus_errors >= MAX_CONSECUTIVE_BUS_ERRORS {
                    break;
                }
            }
            Err(SensorError::Unavailable) => break,
        }
    }

    error!("magnetometer unavailable, sensor task stopping");
    post_control(Event::new(Source::Sensor, EventKind::SensorUnavailable)).await;
}
