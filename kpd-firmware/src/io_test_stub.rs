extern crate std;
use core::convert::Infallible;
use std::{collections::VecDeque, string::String, vec::Vec};

use embedded_io::{ErrorType, Read, ReadReady, Write};
use embedded_storage::{ReadStorage, Storage};
use kpd_common::layout::MAX_INPUTS;
use smart_leds::{SmartLedsWrite, RGB8};

use crate::{key_sampler::KeyInputs, settings::Eeprom};

/// Scripted input levels and touch readings.
#[derive(Default)]
pub struct TestInputs {
    pub pressed: [bool; MAX_INPUTS],
    pub readings: [Option<u16>; MAX_INPUTS],
    pub debounce_ms: Option<u8>,
}
impl KeyInputs for TestInputs {
    fn is_pressed(&mut self, i: usize) -> bool {
        self.pressed[i]
    }

    fn touch_reading(&mut self, i: usize) -> Option<u16> {
        self.readings[i]
    }

    fn set_debounce_ms(&mut self, ms: u8) {
        self.debounce_ms = Some(ms);
    }
}

/// Records every frame written.
#[derive(Default)]
pub struct TestLeds {
    pub frames: Vec<Vec<RGB8>>,
}
impl TestLeds {
    pub fn last(&self) -> &[RGB8] {
        self.frames.last().map(|f| f.as_slice()).unwrap_or(&[])
    }
}
impl SmartLedsWrite for TestLeds {
    type Error = Infallible;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        self.frames.push(iterator.into_iter().map(Into::into).collect());
        Ok(())
    }
}

/// Byte serial port: tests queue input and inspect everything written.
#[derive(Default)]
pub struct TestSerial {
    pub input: VecDeque<u8>,
    pub output: Vec<u8>,
}
impl TestSerial {
    pub fn push_str(&mut self, s: &str) {
        self.input.extend(s.bytes());
    }

    pub fn take_output(&mut self) -> String {
        let out = String::from_utf8_lossy(&self.output).into_owned();
        self.output.clear();
        out
    }
}
impl ErrorType for TestSerial {
    type Error = Infallible;
}
impl Read for TestSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut n = 0;
        while n < buf.len() {
            match self.input.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}
impl ReadReady for TestSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.input.is_empty())
    }
}
impl Write for TestSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RamEepromError {
    OutOfBounds,
    Failed,
}

/// EEPROM in RAM that counts commits and can be told to fail.
pub struct RamEeprom {
    pub bytes: Vec<u8>,
    pub committed: Vec<u8>,
    pub commits: usize,
    pub writes: usize,
    pub fail_writes: bool,
}
impl RamEeprom {
    pub fn new(size: usize) -> Self {
        Self {
            bytes: std::vec![0xff; size],
            committed: std::vec![0xff; size],
            commits: 0,
            writes: 0,
            fail_writes: false,
        }
    }

    /// Simulated power cycle: uncommitted writes are lost.
    pub fn power_cycle(&mut self) {
        self.bytes = self.committed.clone();
    }
}
impl ReadStorage for RamEeprom {
    type Error = RamEepromError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let offset = offset as usize;
        let src = self
            .bytes
            .get(offset..offset + bytes.len())
            .ok_or(RamEepromError::OutOfBounds)?;
        bytes.copy_from_slice(src);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.bytes.len()
    }
}
impl Storage for RamEeprom {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(RamEepromError::Failed);
        }
        let offset = offset as usize;
        let dst = self
            .bytes
            .get_mut(offset..offset + bytes.len())
            .ok_or(RamEepromError::OutOfBounds)?;
        dst.copy_from_slice(bytes);
        self.writes += 1;
        Ok(())
    }
}
impl Eeprom for RamEeprom {
    fn commit(&mut self) -> Result<(), Self::Error> {
        self.committed = self.bytes.clone();
        self.commits += 1;
        Ok(())
    }
}
