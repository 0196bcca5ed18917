#![no_std]
pub mod keycodes;
pub mod layout;

/// Version tag stored at offset 0 of the settings record. A stored tag that differs from this
/// forces a full reset to board defaults.
pub const CONFIG_VERSION: u8 = 4;
