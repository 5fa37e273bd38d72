//! Bounded multi-producer, single-consumer event queue.
//!
//! # Overflow policy
//!
//! One FIFO carries every event, so dispatch order is post order.
//!
//! Control events (button, GPS fixes, transport writes, timers) block with a
//! timeout: [`EventBus::post_within`] waits for free space until the
//! caller-supplied deadline future completes; if it does, the event is
//! dropped and the producer gets [`BusError::Timeout`].
//! [`EventBus::try_post`] is the same policy with a zero deadline.
//!
//! Azimuth samples are only admitted while fewer than
//! [`MAX_QUEUED_SAMPLES`] events are queued. A consumer that stalls (the
//! calibration sweep) therefore finds at most that many stale samples, and
//! the rest of the capacity stays free for control events.

use core::future::Future;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;

use crate::event::{Event, EventKind};

/// Queue depth used by the firmware.
pub const EVENT_QUEUE_DEPTH: usize = 16;

/// Queue fill level above which azimuth samples are refused.
pub const MAX_QUEUED_SAMPLES: usize = 4;

/// Error type for posting events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// The queue stayed full until the deadline; the event was dropped.
    Timeout,
}

/// FIFO event queue drained by exactly one dispatcher.
pub struct EventBus<M: RawMutex, const N: usize> {
    channel: Channel<M, Event, N>,
}

impl<M: RawMutex, const N: usize> EventBus<M, N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Fill level below which a sample may still be queued; at most half the
    /// queue.
    const fn sample_limit() -> usize {
        let half = N / 2;
        if half < MAX_QUEUED_SAMPLES {
            half
        } else {
            MAX_QUEUED_SAMPLES
        }
    }

    /// Post without waiting.
    pub fn try_post(&self, event: Event) -> Result<(), BusError> {
        if matches!(event.kind, EventKind::Azimuth { .. })
            && self.channel.len() >= Self::sample_limit()
        {
            return Err(BusError::Timeout);
        }
        self.channel.try_send(event).map_err(|_| BusError::Timeout)
    }

    /// Post, waiting for space until `deadline` resolves.
    ///
    /// Samples never wait; they follow [`EventBus::try_post`].
    pub async fn post_within<F: Future>(&self, event: Event, deadline: F) -> Result<(), BusError> {
        if matches!(event.kind, EventKind::Azimuth { .. }) {
            return self.try_post(event);
        }
        let control = event.is_control();
        match select(self.channel.send(event), deadline).await {
            Either::First(()) => Ok(()),
            Either::Second(_) => {
                if control {
                    error!("event bus full, control event dropped");
                } else {
                    debug!("event bus full, sample dropped");
                }
                Err(BusError::Timeout)
            }
        }
    }

    /// Wait for the next event in FIFO order.
    pub async fn receive(&self) -> Event {
        self.channel.receive().await
    }

    /// Take the next event if one is queued.
    pub fn try_receive(&self) -> Option<Event> {
        self.channel.try_receive().ok()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

impl<M: RawMutex, const N: usize> Default for EventBus<M, N> {
    fn default() -> Self {
        Self::new()
    }
}
