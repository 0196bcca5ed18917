use embedded_storage::{ReadStorage, Storage};
use kpd_common::{
    layout::{self, MAX_INPUTS, MAX_KEYS, MAX_LAYERS, RECORD_LEN},
    CONFIG_VERSION,
};

use crate::{board::BoardProfile, debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedMode {
    Cycle = 0,
    ReactiveFade = 1,
    Custom = 2,
    Bps = 3,
}
impl LedMode {
    pub const COUNT: u8 = 4;

    pub fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            0 => Self::Cycle,
            1 => Self::ReactiveFade,
            2 => Self::Custom,
            3 => Self::Bps,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Cycle => "Cycle",
            Self::ReactiveFade => "Reactive fade",
            Self::Custom => "Custom colors",
            Self::Bps => "BPS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SideButtonMode {
    Disabled = 0,
    /// Momentary second layer while held.
    LayerShift = 1,
    /// Hold the side button and tap a face key to latch that layer.
    Profile = 2,
    /// Side button types Escape.
    LegacyEscape = 3,
}
impl SideButtonMode {
    pub const COUNT: u8 = 4;

    pub fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            0 => Self::Disabled,
            1 => Self::LayerShift,
            2 => Self::Profile,
            3 => Self::LegacyEscape,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Disabled => "Disabled",
            Self::LayerShift => "Layer shift",
            Self::Profile => "Profile select",
            Self::LegacyEscape => "Escape",
        }
    }
}

/// The persisted settings. Scalars are kept as the raw stored bytes; unknown enum values are
/// interpreted by the typed accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRecord {
    pub brightness: u8,
    pub led_mode: u8,
    pub idle_minutes: u8,
    pub side_mode: u8,
    pub active_profile: u8,
    pub debounce_ms: u8,
    pub hues: [u8; MAX_KEYS],
    pub thresholds: [u8; MAX_INPUTS],
    pub mapping: [[u8; MAX_KEYS]; MAX_LAYERS],
}

impl ConfigRecord {
    pub const DEFAULT_BRIGHTNESS: u8 = 120;
    pub const DEFAULT_IDLE_MINUTES: u8 = 5;
    pub const DEFAULT_DEBOUNCE_MS: u8 = 5;

    pub fn defaults(board: &BoardProfile) -> Self {
        Self {
            brightness: Self::DEFAULT_BRIGHTNESS,
            led_mode: LedMode::Cycle as u8,
            idle_minutes: Self::DEFAULT_IDLE_MINUTES,
            side_mode: board.default_side_mode as u8,
            active_profile: 0,
            debounce_ms: Self::DEFAULT_DEBOUNCE_MS,
            hues: core::array::from_fn(|i| (i * 256 / MAX_KEYS) as u8),
            thresholds: [board.default_threshold; MAX_INPUTS],
            mapping: board.default_mapping,
        }
    }

    pub fn led_mode(&self) -> LedMode {
        LedMode::from_byte(self.led_mode).unwrap_or(LedMode::Cycle)
    }

    pub fn side_mode(&self) -> SideButtonMode {
        SideButtonMode::from_byte(self.side_mode).unwrap_or(SideButtonMode::Disabled)
    }

    /// Touch threshold for input `i` in raw counts.
    pub fn threshold(&self, i: usize) -> u16 {
        self.thresholds[i] as u16 * layout::THRESHOLD_SCALE
    }

    pub fn set_threshold(&mut self, i: usize, raw: u16) {
        self.thresholds[i] = (raw / layout::THRESHOLD_SCALE).min(u8::MAX as u16) as u8;
    }

    pub fn encode(&self, buf: &mut [u8; RECORD_LEN]) {
        buf[layout::VERSION] = CONFIG_VERSION;
        buf[layout::BRIGHTNESS] = self.brightness;
        buf[layout::LED_MODE] = self.led_mode;
        buf[layout::IDLE_MINUTES] = self.idle_minutes;
        buf[layout::SIDE_MODE] = self.side_mode;
        buf[layout::ACTIVE_PROFILE] = self.active_profile;
        buf[layout::DEBOUNCE_MS] = self.debounce_ms;
        buf[layout::HUES..layout::THRESHOLDS].copy_from_slice(&self.hues);
        buf[layout::THRESHOLDS..layout::MAPPING].copy_from_slice(&self.thresholds);
        for (layer, keys) in self.mapping.iter().enumerate() {
            let i = layout::mapping_offset(layer, 0);
            buf[i..i + MAX_KEYS].copy_from_slice(keys);
        }
    }

    pub fn decode(buf: &[u8; RECORD_LEN]) -> Self {
        Self {
            brightness: buf[layout::BRIGHTNESS],
            led_mode: buf[layout::LED_MODE],
            idle_minutes: buf[layout::IDLE_MINUTES],
            side_mode: buf[layout::SIDE_MODE],
            active_profile: buf[layout::ACTIVE_PROFILE],
            debounce_ms: buf[layout::DEBOUNCE_MS],
            hues: core::array::from_fn(|i| buf[layout::HUES + i]),
            thresholds: core::array::from_fn(|i| buf[layout::THRESHOLDS + i]),
            mapping: core::array::from_fn(|layer| {
                core::array::from_fn(|key| buf[layout::mapping_offset(layer, key)])
            }),
        }
    }
}

/// Byte-addressed persistent storage with an explicit commit, like an emulated EEPROM.
pub trait Eeprom: Storage {
    fn commit(&mut self) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    Read,
    Write,
    Commit,
    Capacity,
}

pub struct ConfigStore<S: Eeprom> {
    storage: S,
}

impl<S: Eeprom> ConfigStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    fn check_capacity(&self) -> Result<(), StoreError> {
        if self.storage.capacity() < RECORD_LEN {
            Err(StoreError::Capacity)
        } else {
            Ok(())
        }
    }

    /// Load the stored record. A version tag other than [CONFIG_VERSION] resets storage to the
    /// board defaults before anything else is read.
    pub fn load(&mut self, board: &BoardProfile) -> Result<ConfigRecord, StoreError> {
        self.check_capacity()?;
        let mut version = [0];
        self.storage
            .read(layout::VERSION as u32, &mut version)
            .map_err(|_| StoreError::Read)?;
        if version[0] != CONFIG_VERSION {
            info!("config version {} != {}; resetting", version[0], CONFIG_VERSION);
            return self.reset(board);
        }

        let mut buf = [0; RECORD_LEN];
        self.storage
            .read(0, &mut buf)
            .map_err(|_| StoreError::Read)?;
        Ok(ConfigRecord::decode(&buf))
    }

    /// Write every field of the board defaults and commit.
    pub fn reset(&mut self, board: &BoardProfile) -> Result<ConfigRecord, StoreError> {
        self.check_capacity()?;
        let record = ConfigRecord::defaults(board);
        let mut buf = [0; RECORD_LEN];
        record.encode(&mut buf);
        self.storage
            .write(0, &buf)
            .map_err(|_| StoreError::Write)?;
        self.storage.commit().map_err(|_| StoreError::Commit)?;
        Ok(record)
    }

    /// Update-if-changed write of the whole record. Commits once, and only when a byte differed.
    /// Returns whether anything was written.
    pub fn save(&mut self, record: &ConfigRecord) -> Result<bool, StoreError> {
        self.check_capacity()?;
        let mut buf = [0; RECORD_LEN];
        record.encode(&mut buf);
        let mut changed = false;
        for (i, b) in buf.iter().enumerate() {
            changed |= self.update(i, *b)?;
        }
        if changed {
            self.storage.commit().map_err(|_| StoreError::Commit)?;
        }
        debug!("config saved; changed {}", changed);
        Ok(changed)
    }

    /// Update-if-changed write of a single byte followed by a commit when it changed.
    pub fn save_byte(&mut self, offset: usize, value: u8) -> Result<bool, StoreError> {
        self.check_capacity()?;
        if offset >= RECORD_LEN {
            return Err(StoreError::Capacity);
        }
        let changed = self.update(offset, value)?;
        if changed {
            self.storage.commit().map_err(|_| StoreError::Commit)?;
        }
        Ok(changed)
    }

    fn update(&mut self, offset: usize, value: u8) -> Result<bool, StoreError> {
        let mut current = [0];
        self.storage
            .read(offset as u32, &mut current)
            .map_err(|_| StoreError::Read)?;
        if current[0] == value {
            return Ok(false);
        }
        self.storage
            .write(offset as u32, &[value])
            .map_err(|_| StoreError::Write)?;
        Ok(true)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod test;
