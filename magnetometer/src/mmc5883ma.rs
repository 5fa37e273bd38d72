//! MEMSIC MMC5883MA driver.
//!
//! The bridge offset flips sign with the sensor magnetisation while the
//! ambient field does not. Each read therefore takes two triggered
//! measurements, one after a SET pulse and one after a RESET pulse, and
//! returns half their difference:
//!
//! ```text
//! A = H + offset      (after SET)
//! B = -H + offset     (after RESET)
//! H = (A - B) / 2
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use compass_core::{Magnetometer, RawSample, SensorError, SensorModel};

use crate::registers::{unsigned_le_xyz, Registers};
use crate::remap::AxisRemap;

pub const ADDRESS: u8 = 0x30;

pub const REG_DATA: u8 = 0x00;
pub const REG_STATUS: u8 = 0x07;
pub const REG_CONTROL0: u8 = 0x08;
pub const REG_CONTROL1: u8 = 0x09;
pub const REG_PRODUCT_ID: u8 = 0x2F;

pub const PRODUCT_ID: u8 = 0x0C;
pub const STATUS_MEAS_DONE: u8 = 0x01;
pub const CONTROL0_TM_M: u8 = 0x01;
pub const CONTROL0_SET: u8 = 0x08;
pub const CONTROL0_RESET: u8 = 0x10;
pub const CONTROL1_SW_RESET: u8 = 0x80;
/// 2.5 ms measurement time.
pub const CONTROL1_BANDWIDTH: u8 = 0x02;

/// Output code for zero field.
pub const NULL_FIELD: i32 = 32_768;
/// Settle time after a SET or RESET pulse.
const PULSE_SETTLE_MS: u32 = 1;

pub struct Mmc5883ma<I2C, D> {
    regs: Registers<I2C>,
    delay: D,
    remap: AxisRemap,
}

impl<I2C: I2c, D: DelayNs> Mmc5883ma<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            regs: Registers::new(i2c, ADDRESS),
            delay,
            remap: AxisRemap::for_model(SensorModel::Mmc5883ma),
        }
    }

    #[must_use]
    pub fn with_remap(mut self, remap: AxisRemap) -> Self {
        self.remap = remap;
        self
    }

    pub fn init(&mut self) -> Result<(), SensorError> {
        self.regs.write_u8(REG_CONTROL1, CONTROL1_SW_RESET)?;
        self.delay.delay_ms(5);
        self.regs.write_u8(REG_CONTROL1, CONTROL1_BANDWIDTH)
    }

    pub fn release(self) -> (I2C, D) {
        (self.regs.release(), self.delay)
    }

    fn pulse(&mut self, bit: u8) -> Result<(), SensorError> {
        self.regs.write_u8(REG_CONTROL0, bit)?;
        self.delay.delay_ms(PULSE_SETTLE_MS);
        Ok(())
    }

    /// One triggered measurement in chip axes, centred on zero field.
    fn measure(&mut self) -> Result<[i32; 3], SensorError> {
        self.regs.write_u8(REG_CONTROL0, CONTROL0_TM_M)?;
        self.regs
            .wait_ready(&mut self.delay, REG_STATUS, STATUS_MEAS_DONE)?;
        let bytes = self.regs.read_block::<6>(REG_DATA)?;
        Ok(unsigned_le_xyz(&bytes, NULL_FIELD))
    }
}

impl<I2C: I2c, D: DelayNs> Magnetometer for Mmc5883ma<I2C, D> {
    fn read(&mut self) -> Result<RawSample, SensorError> {
        self.pulse(CONTROL0_SET)?;
        let a = self.measure()?;
        self.pulse(CONTROL0_RESET)?;
        let b = self.measure()?;

        let mut field = [0; 3];
        for (i, f) in field.iter_mut().enumerate() {
            *f = (a[i] - b[i]) / 2;
        }
        Ok(RawSample::from_axes(self.remap.apply(field)))
    }

    fn model(&self) -> SensorModel {
        SensorModel::Mmc5883ma
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::mock::{Behaviour, FakeBus, FakeDevice, NoDelay};
    use std::vec;

    fn chip(field: [i32; 3], offset: [i32; 3]) -> Mmc5883ma<FakeBus, NoDelay> {
        let device = FakeDevice::new(ADDRESS)
            .with_reg(REG_PRODUCT_ID, PRODUCT_ID)
            .with_behaviour(Behaviour::Mmc { field, offset });
        Mmc5883ma::new(FakeBus::new(vec![device]), NoDelay)
    }

    #[test]
    fn test_set_reset_cancels_bridge_offset() {
        let mut chip = chip([120, -340, 55], [900, -700, 25]);
        assert_eq!(chip.read(), Ok(RawSample::new(120, -340, 55)));
    }

    #[test]
    fn test_pulse_order() {
        let mut chip = chip([1, 2, 3], [0, 0, 0]);
        chip.read().unwrap();
        let (bus, _) = chip.release();
        let control0: std::vec::Vec<u8> = bus
            .device(ADDRESS)
            .unwrap()
            .writes
            .iter()
            .filter(|(reg, _)| *reg == REG_CONTROL0)
            .map(|(_, v)| *v)
            .collect();
        assert_eq!(
            control0,
            [CONTROL0_SET, CONTROL0_TM_M, CONTROL0_RESET, CONTROL0_TM_M]
        );
    }

    #[test]
    fn test_measurement_never_done_times_out() {
        // plain register file: TM_M never sets the done bit
        let device = FakeDevice::new(ADDRESS);
        let mut chip = Mmc5883ma::new(FakeBus::new(vec![device]), NoDelay);
        assert_eq!(chip.read(), Err(SensorError::Timeout));
    }

    #[test]
    fn test_init_sets_bandwidth() {
        let mut chip = chip([0; 3], [0; 3]);
        chip.init().unwrap();
        let (bus, _) = chip.release();
        assert_eq!(
            bus.device(ADDRESS).unwrap().writes,
            [
                (REG_CONTROL1, CONTROL1_SW_RESET),
                (REG_CONTROL1, CONTROL1_BANDWIDTH)
            ]
        );
    }
}
