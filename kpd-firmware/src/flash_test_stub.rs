use embedded_storage::nor_flash::{
    ErrorType, NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash,
};

#[derive(Debug)]
pub enum FlashStubError {
    Unknown,
    NotAligned,
}

/// RAM backed NOR flash: erase sets bytes to 0xff and programming can only clear bits.
pub struct NorFlashStub<const FLASH_SIZE: usize> {
    pub buf: [u8; FLASH_SIZE],
    pub erases: usize,
    pub writes: usize,
    pub fail: bool,
}
impl NorFlashError for FlashStubError {
    fn kind(&self) -> NorFlashErrorKind {
        match self {
            FlashStubError::Unknown => NorFlashErrorKind::Other,
            FlashStubError::NotAligned => NorFlashErrorKind::NotAligned,
        }
    }
}
impl<const FLASH_SIZE: usize> ErrorType for NorFlashStub<FLASH_SIZE> {
    type Error = FlashStubError;
}
impl<const FLASH_SIZE: usize> ReadNorFlash for NorFlashStub<FLASH_SIZE> {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let offset = offset as usize;
        bytes.copy_from_slice(&self.buf[offset..offset + bytes.len()]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.buf.len()
    }
}
impl<const FLASH_SIZE: usize> NorFlash for NorFlashStub<FLASH_SIZE> {
    const WRITE_SIZE: usize = 4;

    const ERASE_SIZE: usize = 64;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        if self.fail {
            return Err(FlashStubError::Unknown);
        }
        if from as usize % Self::ERASE_SIZE != 0 || to as usize % Self::ERASE_SIZE != 0 {
            return Err(FlashStubError::NotAligned);
        }
        self.erases += 1;
        self.buf[from as usize..to as usize].fill(0xff);
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.fail {
            return Err(FlashStubError::Unknown);
        }
        if offset as usize % Self::WRITE_SIZE != 0 || bytes.len() % Self::WRITE_SIZE != 0 {
            return Err(FlashStubError::NotAligned);
        }
        self.writes += 1;
        let offset = offset as usize;

        for (t, f) in self.buf[offset..offset + bytes.len()]
            .iter_mut()
            .zip(bytes.iter())
        {
            *t &= *f;
        }

        Ok(())
    }
}
impl<const FLASH_SIZE: usize> Default for NorFlashStub<FLASH_SIZE> {
    fn default() -> Self {
        Self {
            buf: [0xff; FLASH_SIZE],
            erases: 0,
            writes: 0,
            fail: false,
        }
    }
}
