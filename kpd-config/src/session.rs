//! Runs the firmware's configuration menu on the host, with an image file as storage.

use std::{
    io::{self, Read as _, Write as _},
    sync::mpsc::{self, Receiver, TryRecvError},
    thread,
    time::{Duration, Instant},
};

use embedded_io::{ErrorKind, ErrorType, Read, ReadReady, Write};
use kpd_firmware::{
    board::BoardProfile,
    exec::{Keypad, KeypadChannel},
    key_sampler::KeyInputs,
};
use smart_leds::{SmartLedsWrite, RGB8};

use crate::image::FileEeprom;

/// A keypad with nothing pressed.
pub struct NoInputs;
impl KeyInputs for NoInputs {
    fn is_pressed(&mut self, _i: usize) -> bool {
        false
    }
}

pub struct NullLeds;
impl SmartLedsWrite for NullLeds {
    type Error = ();
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        iterator.into_iter().for_each(drop);
        Ok(())
    }
}

/// Serial port over a blocking reader and a writer. A thread feeds the reader's bytes through a
/// channel so reads never block.
pub struct ThreadSerial<W: io::Write> {
    rx: Receiver<u8>,
    pending: Option<u8>,
    closed: bool,
    writer: W,
}

impl<W: io::Write> ThreadSerial<W> {
    pub fn spawn<R: io::Read + Send + 'static>(reader: R, writer: W) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for b in reader.bytes() {
                let Ok(b) = b else {
                    break;
                };
                if tx.send(b).is_err() {
                    break;
                }
            }
        });
        Self {
            rx,
            pending: None,
            closed: false,
            writer,
        }
    }

    /// The reader has ended and every byte has been taken.
    pub fn is_closed(&self) -> bool {
        self.closed && self.pending.is_none()
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.writer
    }

    fn fill(&mut self) {
        if self.pending.is_some() {
            return;
        }
        match self.rx.try_recv() {
            Ok(b) => self.pending = Some(b),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => self.closed = true,
        }
    }
}

impl<W: io::Write> ErrorType for ThreadSerial<W> {
    type Error = ErrorKind;
}

impl<W: io::Write> ReadReady for ThreadSerial<W> {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        self.fill();
        Ok(self.pending.is_some())
    }
}

impl<W: io::Write> Read for ThreadSerial<W> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.fill();
        match (buf.first_mut(), self.pending.take()) {
            (Some(dst), Some(b)) => {
                *dst = b;
                Ok(1)
            }
            (None, b) => {
                self.pending = b;
                Ok(0)
            }
            (Some(_), None) => Ok(0),
        }
    }
}

impl<W: io::Write> Write for ThreadSerial<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.writer
            .write_all(buf)
            .and_then(|_| self.writer.flush())
            .map_err(|_| ErrorKind::Other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.writer.flush().map_err(|_| ErrorKind::Other)
    }
}

/// How the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The menu was closed with save and exit.
    Exited,
    /// Input ended while no menu was open.
    InputClosed,
    /// Input ended in the middle of a menu; nothing was saved.
    Abandoned,
}

/// Step a keypad on `storage` until the menu is closed or `reader` ends. HID events have no
/// host and are dropped.
pub fn run_session<R, W>(
    board: &'static BoardProfile,
    storage: FileEeprom,
    reader: R,
    writer: W,
) -> SessionEnd
where
    R: io::Read + Send + 'static,
    W: io::Write,
{
    let channel = KeypadChannel::default();
    let serial = ThreadSerial::spawn(reader, writer);
    let mut keypad = Keypad::new(board, storage, NoInputs, NullLeds, serial, &channel, 0);
    let start = Instant::now();
    let mut opened = false;
    loop {
        keypad.step(start.elapsed().as_millis() as u64);
        while channel.try_receive().is_some() {}

        if keypad.in_menu() {
            opened = true;
        } else if opened {
            return SessionEnd::Exited;
        }
        if keypad.serial().is_closed() {
            return if keypad.in_menu() {
                SessionEnd::Abandoned
            } else {
                SessionEnd::InputClosed
            };
        }
        thread::sleep(Duration::from_millis(1));
    }
}
