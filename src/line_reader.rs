use embassy_rp::uart::{Async, Error as UartError, UartRx};
use heapless::Vec;

/// Longest line accepted from either serial port.
pub const MAX_LINE_LENGTH: usize = 96;

/// Error type for line reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum LineError {
    /// UART/communication I/O error.
    Io,
    /// Line longer than [`MAX_LINE_LENGTH`]; the rest of it was discarded.
    BufferOverflow,
    /// UART framing error.
    Framing,
}

/// Newline-delimited reader over an async UART receiver.
///
/// Used for NMEA sentences from the GPS receiver and for console commands.
pub struct LineReader<'d> {
    rx: UartRx<'d, Async>,
    buffer: Vec<u8, MAX_LINE_LENGTH>,
}

impl<'d> LineReader<'d> {
    pub fn new(rx: UartRx<'d, Async>) -> Self {
        Self {
            rx,
            buffer: Vec::new(),
        }
    }

    /// The line read by the last successful [`read_line`](Self::read_line),
    /// without the `\n`.
    #[inline]
    #[must_use]
    pub fn line(&self) -> &[u8] {
        &self.buffer
    }

    /// Read bytes until a newline is found or buffer is full.
    ///
    /// If a line exceeds the buffer capacity, the rest of the line is
    /// discarded to prevent cascading parse errors on subsequent reads.
    pub async fn read_line(&mut self) -> Result<(), LineError> {
        self.buffer.clear();

        loop {
            let mut byte = [0u8; 1];
            self.rx.read(&mut byte).await?;

            if byte[0] == b'\n' {
                return Ok(());
            }

            if self.buffer.push(byte[0]).is_err() {
                loop {
                    self.rx.read(&mut byte).await?;
                    if byte[0] == b'\n' {
                        break;
                    }
                }
                return Err(LineError::BufferOverflow);
            }
        }
    }
}

impl From<UartError> for LineError {
    fn from(e: UartError) -> Self {
        match e {
            UartError::Framing => LineError::Framing,
            UartError::Overrun => LineError::BufferOverflow,
            _ => LineError::Io,
        }
    }
}
