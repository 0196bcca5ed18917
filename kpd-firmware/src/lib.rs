#![no_std]
pub mod board;
pub mod config;
pub mod eeprom;
pub mod effects;
pub mod exec;
pub mod hid;
pub mod idle;
pub mod key_reporter;
pub mod key_sampler;
pub mod mapper;
pub mod settings;
pub mod text_input;

#[cfg(any(test, feature = "test-utils"))]
pub mod flash_test_stub;
#[cfg(any(test, feature = "test-utils"))]
pub mod io_test_stub;
#[cfg(any(test, feature = "test-utils"))]
pub mod usb_test_stub;

#[macro_use]
mod macros;

pub(crate) const KEY_BITS_SIZE: usize = 32;

fn add_bit<const SIZE: usize>(keys_down: &mut [u8], kc: u8) -> bool {
    let i = (kc >> 3) as usize;
    if i >= SIZE || i >= keys_down.len() {
        crate::warn!("invalid key! {}", kc);
        return false;
    }
    let bp = 1 << (kc & 7);
    let old = keys_down[i];
    keys_down[i] |= bp;
    old & bp == 0
}

fn del_bit<const SIZE: usize>(keys_down: &mut [u8], kc: u8) -> bool {
    let i = (kc >> 3) as usize;
    if i >= SIZE || i >= keys_down.len() {
        crate::warn!("invalid key! {}", kc);
        return false;
    }
    let bp = 1 << (kc & 7);
    let old = keys_down[i];
    keys_down[i] &= !bp;
    old & bp != 0
}

fn add_key_bit(keys_down: &mut [u8], kc: u8) -> bool {
    add_bit::<KEY_BITS_SIZE>(keys_down, kc)
}

fn del_key_bit(keys_down: &mut [u8], kc: u8) -> bool {
    del_bit::<KEY_BITS_SIZE>(keys_down, kc)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod test;
