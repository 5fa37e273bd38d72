//! GPS task: reads NMEA sentences, posts fixes and duty-cycles the receiver.

use defmt::{debug, info, warn};
use embassy_futures::select::{select3, Either3};
use embassy_time::{Instant, Timer};
use embedded_hal::digital::OutputPin;

use compass_core::gps::PRESENCE_WINDOW_MS;
use compass_core::nmea::parse_sentence;
use compass_core::{DutyDecision, Event, EventKind, Presence, PresenceMonitor, Source};

use crate::line_reader::LineReader;
use crate::shared::{post, GPS_DUTY};

/// `power` drives the receiver's enable line (high = on).
pub async fn run<P: OutputPin>(mut reader: LineReader<'static>, mut power: P) -> ! {
    let _ = power.set_high();
    let mut presence = PresenceMonitor::new(Instant::now().as_millis(), PRESENCE_WINDOW_MS);
    info!("GPS task started");

    loop {
        let deadline = async {
            match presence.check(Instant::now().as_millis()) {
                Presence::Pending => Timer::at(Instant::from_millis(presence.deadline_ms())).await,
                Presence::Present | Presence::Absent => core::future::pending::<()>().await,
            }
        };

        match select3(reader.read_line(), GPS_DUTY.wait(), deadline).await {
            Either3::First(Ok(())) => match parse_sentence(reader.line()) {
                Ok(fix) => {
                    presence.record();
                    let Some(location) = fix else { continue };
                    if post(Event::new(Source::Gps, EventKind::Location(location)))
                        .await
                        .is_err()
                    {
                        debug!("fix dropped");
                    }
                }
                Err(e) => debug!("nmea: {:?}", e),
            },
            Either3::First(Err(e)) => warn!("GPS uart error: {:?}", e),
            Either3::Second(decision) => apply_duty(&mut power, decision).await,
            Either3::Third(()) => {
                if presence.check(Instant::now().as_millis()) == Presence::Absent {
                    warn!("no GPS data within {} ms, powering receiver off", PRESENCE_WINDOW_MS);
                    let _ = power.set_low();
                    core::future::pending::<()>().await;
                }
            }
        }
    }
}

async fn apply_duty<P: OutputPin>(power: &mut P, decision: DutyDecision) {
    if decision.gps_power_enabled {
        let _ = power.set_high();
        return;
    }
    info!("GPS sleeping {} s", decision.sleep_interval_s);
    let _ = power.set_low();
    Timer::after_secs(u64::from(decision.sleep_interval_s)).await;
    let _ = power.set_high();
}
