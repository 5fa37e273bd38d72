//! LED task: draws whatever the dispatcher last asked for.

use embassy_futures::select::{select, Either};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio_programs::ws2812::PioWs2812;
use embassy_time::Timer;
use portable_atomic::Ordering;
use smart_leds::{brightness, gamma, RGB8};

use crate::display::{needle_frame, text_frame, text_width, Frame, COLS, LED_COUNT};
use crate::shared::{RenderCommand, BRIGHTNESS, RENDER};

/// Time per scrolled column.
pub const SCROLL_STEP_MS: u64 = 90;

pub type Leds = PioWs2812<'static, PIO0, 0, LED_COUNT>;

fn scaled(frame: &Frame) -> Frame {
    let level = BRIGHTNESS.load(Ordering::Relaxed);
    let mut out = [RGB8::default(); LED_COUNT];
    for (dst, px) in out.iter_mut().zip(brightness(gamma(frame.iter().copied()), level)) {
        *dst = px;
    }
    out
}

pub async fn run(mut leds: Leds) -> ! {
    let mut command = RENDER.wait().await;

    loop {
        command = match command {
            RenderCommand::Needle { angle, color } => {
                leds.write(&scaled(&needle_frame(angle, color))).await;
                RENDER.wait().await
            }
            RenderCommand::Text { text, color } => {
                // scroll in from the right, repeat until replaced
                let end = text_width(&text);
                let mut offset = -(COLS as i32);
                loop {
                    leds.write(&scaled(&text_frame(&text, offset, color))).await;
                    match select(Timer::after_millis(SCROLL_STEP_MS), RENDER.wait()).await {
                        Either::First(()) => {
                            offset = if offset >= end { -(COLS as i32) } else { offset + 1 };
                        }
                        Either::Second(next) => break next,
                    }
                }
            }
        };
    }
}
