//! Info expiry task: posts `InfoExpired` once an Info screen has been up
//! long enough.
//!
//! A newer request re-arms the timer. The token lets the dispatcher ignore
//! an expiry that belongs to a screen already replaced.

use embassy_futures::select::{select, Either};
use embassy_time::Timer;

use compass_core::{Event, EventKind, Source};

use crate::shared::{post_control, INFO_EXPIRY};

pub async fn run() -> ! {
    let mut pending = INFO_EXPIRY.wait().await;

    loop {
        match select(
            Timer::after_millis(u64::from(pending.after_ms)),
            INFO_EXPIRY.wait(),
        )
        .await
        {
            Either::First(()) => {
                let event = Event::new(
                    Source::Other,
                    EventKind::InfoExpired {
                        token: pending.token,
                    },
                );
                post_control(event).await;
                pending = INFO_EXPIRY.wait().await;
            }
            Either::Second(next) => pending = next,
        }
    }
}
