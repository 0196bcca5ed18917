use embedded_storage::{
    nor_flash::{self, NorFlash},
    ReadStorage, Storage,
};

use crate::{debug, settings::Eeprom};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EepromError {
    OutOfBounds,
    NotAligned,
    Flash,
}

fn map_flash_error(err: impl nor_flash::NorFlashError) -> EepromError {
    match err.kind() {
        nor_flash::NorFlashErrorKind::NotAligned => EepromError::NotAligned,
        nor_flash::NorFlashErrorKind::OutOfBounds => EepromError::OutOfBounds,
        _ => EepromError::Flash,
    }
}

/// EEPROM emulation on a NOR flash region starting at `base`.
///
/// Reads and writes go to a RAM copy of the region. [Eeprom::commit] erases and reprograms the
/// region, and only when the copy differs from what was last committed.
pub struct FlashEeprom<F: NorFlash, const SIZE: usize> {
    flash: F,
    base: u32,
    cache: [u8; SIZE],
    dirty: bool,
}

impl<F: NorFlash, const SIZE: usize> FlashEeprom<F, SIZE> {
    const ERASE_LEN: u32 = SIZE.div_ceil(F::ERASE_SIZE) as u32 * F::ERASE_SIZE as u32;

    pub fn new(mut flash: F, base: u32) -> Result<Self, EepromError> {
        if SIZE % F::READ_SIZE != 0
            || SIZE % F::WRITE_SIZE != 0
            || base as usize % F::ERASE_SIZE != 0
        {
            return Err(EepromError::NotAligned);
        }
        if base as usize + Self::ERASE_LEN as usize > flash.capacity() {
            return Err(EepromError::OutOfBounds);
        }
        let mut cache = [0; SIZE];
        flash.read(base, &mut cache).map_err(map_flash_error)?;
        Ok(Self {
            flash,
            base,
            cache,
            dirty: false,
        })
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn into_inner(self) -> F {
        self.flash
    }

    fn range(&self, offset: u32, len: usize) -> Result<core::ops::Range<usize>, EepromError> {
        let start = offset as usize;
        let end = start + len;
        if end > SIZE {
            Err(EepromError::OutOfBounds)
        } else {
            Ok(start..end)
        }
    }
}

impl<F: NorFlash, const SIZE: usize> ReadStorage for FlashEeprom<F, SIZE> {
    type Error = EepromError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, bytes.len())?;
        bytes.copy_from_slice(&self.cache[range]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        SIZE
    }
}

impl<F: NorFlash, const SIZE: usize> Storage for FlashEeprom<F, SIZE> {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, bytes.len())?;
        let dst = &mut self.cache[range];
        if dst != bytes {
            dst.copy_from_slice(bytes);
            self.dirty = true;
        }
        Ok(())
    }
}

impl<F: NorFlash, const SIZE: usize> Eeprom for FlashEeprom<F, SIZE> {
    fn commit(&mut self) -> Result<(), Self::Error> {
        if !self.dirty {
            return Ok(());
        }
        debug!("eeprom commit at {}", self.base);
        self.flash
            .erase(self.base, self.base + Self::ERASE_LEN)
            .map_err(map_flash_error)?;
        self.flash
            .write(self.base, &self.cache)
            .map_err(map_flash_error)?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
#[path = "eeprom_test.rs"]
mod test;
