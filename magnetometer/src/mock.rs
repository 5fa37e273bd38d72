//! In-memory I2C bus with register-file devices.

extern crate std;

use std::vec::Vec;

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

/// How a fake device reacts to register writes.
#[derive(Debug, Clone, Copy)]
pub enum Behaviour {
    /// Plain register file.
    Plain,
    /// MMC5883MA: a triggered measurement reports `field + offset` after SET
    /// and `-field + offset` after RESET, stored unsigned around 32768.
    Mmc { field: [i32; 3], offset: [i32; 3] },
}

pub struct FakeDevice {
    pub address: u8,
    pub regs: [u8; 256],
    pub writes: Vec<(u8, u8)>,
    behaviour: Behaviour,
    set_polarity: i32,
}

impl FakeDevice {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            regs: [0; 256],
            writes: Vec::new(),
            behaviour: Behaviour::Plain,
            set_polarity: 1,
        }
    }

    pub fn with_reg(mut self, reg: u8, value: u8) -> Self {
        self.regs[reg as usize] = value;
        self
    }

    pub fn with_regs(mut self, start: u8, values: &[u8]) -> Self {
        for (i, v) in values.iter().enumerate() {
            self.regs[start as usize + i] = *v;
        }
        self
    }

    pub fn with_behaviour(mut self, behaviour: Behaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    fn write(&mut self, reg: u8, value: u8) {
        self.writes.push((reg, value));
        self.regs[reg as usize] = value;
        if let Behaviour::Mmc { field, offset } = self.behaviour {
            if reg == 0x08 {
                if value & 0x08 != 0 {
                    self.set_polarity = 1;
                }
                if value & 0x10 != 0 {
                    self.set_polarity = -1;
                }
                if value & 0x01 != 0 {
                    for axis in 0..3 {
                        let v = (32768 + self.set_polarity * field[axis] + offset[axis]) as u16;
                        let [lo, hi] = v.to_le_bytes();
                        self.regs[axis * 2] = lo;
                        self.regs[axis * 2 + 1] = hi;
                    }
                    self.regs[0x07] |= 0x01;
                }
            }
        }
    }
}

#[derive(Default)]
pub struct FakeBus {
    pub devices: Vec<FakeDevice>,
    pointer: u8,
}

impl FakeBus {
    pub fn new(devices: Vec<FakeDevice>) -> Self {
        Self {
            devices,
            pointer: 0,
        }
    }

    pub fn device(&self, address: u8) -> Option<&FakeDevice> {
        self.devices.iter().find(|d| d.address == address)
    }
}

impl ErrorType for FakeBus {
    type Error = ErrorKind;
}

impl I2c for FakeBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let pointer = &mut self.pointer;
        let device = self
            .devices
            .iter_mut()
            .find(|d| d.address == address)
            .ok_or(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))?;

        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    if let Some((reg, data)) = bytes.split_first() {
                        *pointer = *reg;
                        for value in data {
                            device.write(*pointer, *value);
                            *pointer = pointer.wrapping_add(1);
                        }
                    }
                }
                Operation::Read(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = device.regs[*pointer as usize];
                        *pointer = pointer.wrapping_add(1);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Blocking delay that returns immediately.
pub struct NoDelay;

impl embedded_hal::delay::DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
