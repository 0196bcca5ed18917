//! Line editors for the configuration session.
//!
//! An entry finishes on CR or LF, or once no byte has arrived for [QUIET_GAP_MS] after at least
//! one byte was received.

use heapless::Vec;
use kpd_common::keycodes;

/// How long the input must be quiet before a partial entry is taken as complete.
pub const QUIET_GAP_MS: u64 = 250;
/// Prefix for a special-key catalog index.
pub const CATALOG_PREFIX: u8 = b':';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Entry<T> {
    Pending,
    Done(T),
    Invalid,
}

fn is_newline(b: u8) -> bool {
    b == b'\r' || b == b'\n'
}

/// Decimal number entry accepting at most three digits and values up to 255.
#[derive(Debug, Default)]
pub struct NumberInput {
    digits: Vec<u8, 3>,
    bad: bool,
    last_ms: Option<u64>,
}

impl NumberInput {
    pub fn reset(&mut self) {
        self.digits.clear();
        self.bad = false;
        self.last_ms = None;
    }

    /// Nothing typed since the last reset.
    pub fn is_empty(&self) -> bool {
        self.last_ms.is_none()
    }

    pub fn push(&mut self, byte: u8, now_ms: u64) -> Entry<u8> {
        if is_newline(byte) {
            return if self.last_ms.is_some() {
                self.finish()
            } else {
                Entry::Pending
            };
        }
        self.last_ms = Some(now_ms);
        if !byte.is_ascii_digit() || self.digits.push(byte - b'0').is_err() {
            self.bad = true;
        }
        Entry::Pending
    }

    /// Finish a partial entry once the input has gone quiet.
    pub fn poll(&mut self, now_ms: u64) -> Entry<u8> {
        match self.last_ms {
            Some(t) if now_ms.wrapping_sub(t) >= QUIET_GAP_MS => self.finish(),
            _ => Entry::Pending,
        }
    }

    fn finish(&mut self) -> Entry<u8> {
        let value = self
            .digits
            .iter()
            .fold(0u16, |acc, d| acc * 10 + *d as u16);
        let ans = if self.bad || value > u8::MAX as u16 {
            Entry::Invalid
        } else {
            Entry::Done(value as u8)
        };
        self.reset();
        ans
    }
}

/// Output code entry: a printable character stands for itself and `:N` names special key `N`.
#[derive(Debug, Default)]
pub struct KeyNameInput {
    digits: Vec<u8, 3>,
    bad: bool,
    last_ms: Option<u64>,
}

impl KeyNameInput {
    pub fn reset(&mut self) {
        self.digits.clear();
        self.bad = false;
        self.last_ms = None;
    }

    pub fn push(&mut self, byte: u8, now_ms: u64) -> Entry<u8> {
        if self.last_ms.is_none() {
            return match byte {
                b'\r' | b'\n' => Entry::Pending,
                CATALOG_PREFIX => {
                    self.last_ms = Some(now_ms);
                    Entry::Pending
                }
                0x20..=0x7e => Entry::Done(byte),
                _ => Entry::Invalid,
            };
        }
        if is_newline(byte) {
            return self.finish();
        }
        self.last_ms = Some(now_ms);
        if !byte.is_ascii_digit() || self.digits.push(byte - b'0').is_err() {
            self.bad = true;
        }
        Entry::Pending
    }

    pub fn poll(&mut self, now_ms: u64) -> Entry<u8> {
        match self.last_ms {
            Some(t) if now_ms.wrapping_sub(t) >= QUIET_GAP_MS => self.finish(),
            _ => Entry::Pending,
        }
    }

    fn finish(&mut self) -> Entry<u8> {
        let ans = if self.bad {
            Entry::Invalid
        } else if self.digits.is_empty() {
            Entry::Done(CATALOG_PREFIX)
        } else {
            let index = self
                .digits
                .iter()
                .fold(0usize, |acc, d| acc * 10 + *d as usize);
            match keycodes::special_code(index) {
                Some(code) => Entry::Done(code),
                None => Entry::Invalid,
            }
        };
        self.reset();
        ans
    }
}

#[cfg(test)]
#[path = "text_input_test.rs"]
mod test;
