//! Chip discovery.
//!
//! The known addresses are probed first and the identity register checked.
//! A chip with a non-standard ID (clones are common) is still found by the
//! fallback scan, which only asks whether anything acknowledges at a known
//! address.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use compass_core::{SensorError, SensorModel};

use crate::{mmc5883ma, qmc5883l, qmc5883p};

/// Passes over the known addresses before falling back to a scan.
pub const PROBE_ROUNDS: usize = 3;
/// Pause between probe passes, to let a slow chip finish power-on.
pub const PROBE_RETRY_MS: u32 = 10;

/// Lowest and highest 7-bit addresses visited by the scan.
pub const SCAN_FIRST: u8 = 0x01;
pub const SCAN_LAST: u8 = 0x7E;

/// `(register, expected value)` identifying each chip.
#[must_use]
pub const fn id_register(model: SensorModel) -> (u8, u8) {
    match model {
        SensorModel::Qmc5883l => (qmc5883l::REG_CHIP_ID, qmc5883l::CHIP_ID),
        SensorModel::Qmc5883p => (qmc5883p::REG_CHIP_ID, qmc5883p::CHIP_ID),
        SensorModel::Mmc5883ma => (mmc5883ma::REG_PRODUCT_ID, mmc5883ma::PRODUCT_ID),
    }
}

/// Find the fitted magnetometer.
pub fn discover<I2C: I2c, D: DelayNs>(
    i2c: &mut I2C,
    delay: &mut D,
) -> Result<SensorModel, SensorError> {
    for round in 0..PROBE_ROUNDS {
        if round > 0 {
            delay.delay_ms(PROBE_RETRY_MS);
        }
        if let Some(model) = SensorModel::ALL.into_iter().find(|m| identify(i2c, *m)) {
            return Ok(model);
        }
    }
    scan(i2c)
}

fn identify<I2C: I2c>(i2c: &mut I2C, model: SensorModel) -> bool {
    let (reg, expected) = id_register(model);
    let mut buf = [0u8; 1];
    i2c.write_read(model.address(), &[reg], &mut buf).is_ok() && buf[0] == expected
}

/// Walk the whole address space and match responders by address.
pub fn scan<I2C: I2c>(i2c: &mut I2C) -> Result<SensorModel, SensorError> {
    let mut buf = [0u8; 1];
    (SCAN_FIRST..=SCAN_LAST)
        .filter(|address| i2c.read(*address, &mut buf).is_ok())
        .find_map(SensorModel::from_address)
        .ok_or(SensorError::Unavailable)
}
