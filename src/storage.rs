//! Settings record in the last flash sector.

use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;

use compass_core::settings::RECORD_LEN;
use compass_core::{Settings, Storage, StorageError};

/// Pico flash size.
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;
/// Offset of the sector holding the record.
pub const SETTINGS_OFFSET: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;
/// Flash program granularity.
const PAGE_SIZE: usize = 256;

pub struct FlashStorage {
    flash: Flash<'static, FLASH, Blocking, FLASH_SIZE>,
}

impl FlashStorage {
    pub fn new(flash: Flash<'static, FLASH, Blocking, FLASH_SIZE>) -> Self {
        Self { flash }
    }

    fn erase_sector(&mut self) -> Result<(), StorageError> {
        self.flash
            .blocking_erase(SETTINGS_OFFSET, SETTINGS_OFFSET + ERASE_SIZE as u32)
            .map_err(|e| {
                defmt::error!("flash erase failed: {:?}", e);
                StorageError::Io
            })
    }
}

impl Storage for FlashStorage {
    fn load(&mut self) -> Result<Settings, StorageError> {
        let mut buf = [0u8; RECORD_LEN];
        self.flash
            .blocking_read(SETTINGS_OFFSET, &mut buf)
            .map_err(|e| {
                defmt::error!("flash read failed: {:?}", e);
                StorageError::Mount
            })?;
        Ok(Settings::decode(&buf)?)
    }

    fn save(&mut self, settings: &Settings) -> Result<(), StorageError> {
        let mut page = [0xFFu8; PAGE_SIZE];
        page[..RECORD_LEN].copy_from_slice(&settings.encode());

        self.erase_sector()?;
        self.flash
            .blocking_write(SETTINGS_OFFSET, &page)
            .map_err(|e| {
                defmt::error!("flash write failed: {:?}", e);
                StorageError::Io
            })
    }

    fn erase(&mut self) -> Result<(), StorageError> {
        self.erase_sector()
    }
}
