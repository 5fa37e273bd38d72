//! Button task: samples the button every 10 ms and posts gestures.

use defmt::debug;
use embassy_time::{Duration, Instant, Ticker};
use embedded_hal::digital::InputPin;

use compass_core::ButtonDetector;

use crate::shared::post_control;

pub const SAMPLE_PERIOD_MS: u64 = 10;

/// `pin` reads low while the button is pressed.
pub async fn run<P: InputPin>(mut pin: P) -> ! {
    let mut detector = ButtonDetector::new();
    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_PERIOD_MS));

    loop {
        ticker.next().await;
        let pressed = pin.is_low().unwrap_or(false);
        let Some(gesture) = detector.tick(Instant::now().as_millis(), pressed) else {
            continue;
        };
        debug!("button gesture {:?}", gesture);
        if let Some(event) = gesture.into_event() {
            post_control(event).await;
        }
    }
}
