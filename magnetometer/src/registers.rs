//! Register access shared by the chip drivers.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use compass_core::SensorError;

/// Status polls before a measurement is declared lost.
pub const READY_POLLS: u8 = 10;
/// Delay between status polls.
pub const READY_POLL_INTERVAL_MS: u32 = 1;

/// Any I2C failure is reported as a bus error; the caller skips the cycle.
#[inline]
pub(crate) fn bus_error<E>(_err: E) -> SensorError {
    SensorError::Bus
}

/// One device on the bus.
pub(crate) struct Registers<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Registers<I2C> {
    pub(crate) const fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub(crate) fn read_u8(&mut self, reg: u8) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(bus_error)?;
        Ok(buf[0])
    }

    pub(crate) fn write_u8(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(bus_error)
    }

    /// Burst read of `N` consecutive registers starting at `reg`.
    pub(crate) fn read_block<const N: usize>(&mut self, reg: u8) -> Result<[u8; N], SensorError> {
        let mut buf = [0u8; N];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(bus_error)?;
        Ok(buf)
    }

    /// Poll `status` until any bit of `mask` is set.
    pub(crate) fn wait_ready<D: DelayNs>(
        &mut self,
        delay: &mut D,
        status: u8,
        mask: u8,
    ) -> Result<(), SensorError> {
        for _ in 0..READY_POLLS {
            if self.read_u8(status)? & mask != 0 {
                return Ok(());
            }
            delay.delay_ms(READY_POLL_INTERVAL_MS);
        }
        Err(SensorError::Timeout)
    }

    pub(crate) fn release(self) -> I2C {
        self.i2c
    }
}

/// Three signed little-endian 16-bit words (X, Y, Z).
pub(crate) fn signed_le_xyz(bytes: &[u8; 6]) -> [i32; 3] {
    [
        i32::from(i16::from_le_bytes([bytes[0], bytes[1]])),
        i32::from(i16::from_le_bytes([bytes[2], bytes[3]])),
        i32::from(i16::from_le_bytes([bytes[4], bytes[5]])),
    ]
}

/// Three unsigned little-endian 16-bit words re-centred on `null`.
pub(crate) fn unsigned_le_xyz(bytes: &[u8; 6], null: i32) -> [i32; 3] {
    [
        i32::from(u16::from_le_bytes([bytes[0], bytes[1]])) - null,
        i32::from(u16::from_le_bytes([bytes[2], bytes[3]])) - null,
        i32::from(u16::from_le_bytes([bytes[4], bytes[5]])) - null,
    ]
}
