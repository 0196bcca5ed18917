use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use embedded_storage::{ReadStorage, Storage};
use kpd_common::layout::RECORD_LEN;
use kpd_firmware::{
    board::BoardProfile,
    settings::{ConfigRecord, ConfigStore, Eeprom},
};

#[derive(Debug)]
pub enum FileEepromError {
    OutOfBounds,
    Io(io::ErrorKind),
}

/// A settings image file used as EEPROM. Writes stay in memory until [Eeprom::commit].
pub struct FileEeprom {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl FileEeprom {
    /// A blank (erased) image that will be written to `path` on the first commit.
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            bytes: vec![0xff; RECORD_LEN],
        }
    }

    /// Read an existing image. Short files are padded as if erased.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let mut bytes = fs::read(&path)?;
        if bytes.len() < RECORD_LEN {
            bytes.resize(RECORD_LEN, 0xff);
        }
        Ok(Self { path, bytes })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl ReadStorage for FileEeprom {
    type Error = FileEepromError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let offset = offset as usize;
        let src = self
            .bytes
            .get(offset..offset + bytes.len())
            .ok_or(FileEepromError::OutOfBounds)?;
        bytes.copy_from_slice(src);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.bytes.len()
    }
}

impl Storage for FileEeprom {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let offset = offset as usize;
        let dst = self
            .bytes
            .get_mut(offset..offset + bytes.len())
            .ok_or(FileEepromError::OutOfBounds)?;
        dst.copy_from_slice(bytes);
        Ok(())
    }
}

impl Eeprom for FileEeprom {
    fn commit(&mut self) -> Result<(), Self::Error> {
        log::debug!("writing {}", self.path.display());
        fs::write(&self.path, &self.bytes).map_err(|e| FileEepromError::Io(e.kind()))
    }
}

/// Write a new image holding the board defaults. Refuses to replace an existing file.
pub fn init_image(path: &Path, board: &BoardProfile) -> Result<ConfigRecord> {
    if path.exists() {
        return Err(anyhow!("Already exists {}", path.display()));
    }
    let mut store = ConfigStore::new(FileEeprom::create(path));
    store
        .reset(board)
        .map_err(|e| anyhow!("Failed to write {}: {:?}", path.display(), e))
}

/// Load the settings in an image, rewriting it with defaults when its version is stale.
pub fn load_image(path: &Path, board: &BoardProfile) -> Result<ConfigRecord> {
    let storage =
        FileEeprom::open(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut store = ConfigStore::new(storage);
    store
        .load(board)
        .map_err(|e| anyhow!("Failed to load {}: {:?}", path.display(), e))
}
