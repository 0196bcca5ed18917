//! Interactive configuration over a byte serial port.
//!
//! The session is a state machine polled once per main loop iteration. It never blocks, so the
//! sampler and LED effects keep running while a menu is open.

use embedded_io::{Read, ReadReady, Write};
use kpd_common::keycodes::CodeName;

use crate::{
    board::{BoardProfile, InputKind},
    debug,
    effects::{EffectEngine, Overlay},
    idle::IdleMonitor,
    info,
    key_sampler::{KeyInputs, Sampler},
    settings::{ConfigRecord, ConfigStore, Eeprom, LedMode, SideButtonMode},
    text_input::{Entry, KeyNameInput, NumberInput},
    warn,
};

pub const GREETING_INTERVAL_MS: u64 = 5000;
/// Byte that opens the main menu from idle.
pub const ENTRY_MARKER: u8 = b'0';
/// Typed at a threshold prompt to measure the input instead.
pub const CALIBRATE: u8 = b'c';

const GREETING: &str = "Press 0 to enter the main menu.\r\n";
const INVALID: &str = "Invalid value\r\n";

macro_rules! say {
    ($out:expr, $($arg:tt)*) => {
        if $out.write_fmt(format_args!($($arg)*)).is_err() {
            warn!("serial write failed");
        }
    };
}

/// Everything a session reads or changes, borrowed from the keypad for one poll.
pub struct Session<'a, S: Eeprom, I: KeyInputs> {
    pub board: &'a BoardProfile,
    pub config: &'a mut ConfigRecord,
    pub store: &'a mut ConfigStore<S>,
    pub effects: &'a mut EffectEngine,
    pub idle: &'a mut IdleMonitor,
    pub sampler: &'a mut Sampler,
    pub inputs: &'a mut I,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Field {
    LedMode,
    Brightness,
    IdleTimeout,
    SideMode,
    Debounce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Menu {
    Idle,
    Main,
    Layer,
    Remap { layer: usize, key: usize },
    Hue { key: usize },
    Threshold { input: usize },
    Value(Field),
}

pub struct ConfigProtocol {
    menu: Menu,
    number: NumberInput,
    key_name: KeyNameInput,
    last_greeting: Option<u64>,
}

impl Default for ConfigProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigProtocol {
    pub fn new() -> Self {
        Self {
            menu: Menu::Idle,
            number: NumberInput::default(),
            key_name: KeyNameInput::default(),
            last_greeting: None,
        }
    }

    /// True while any menu is open.
    pub fn is_active(&self) -> bool {
        self.menu != Menu::Idle
    }

    /// Handle every byte waiting on `serial`, then any entry finished by the input going quiet.
    /// Returns true if any byte was read.
    pub fn poll<T, S, I>(&mut self, now_ms: u64, serial: &mut T, s: &mut Session<'_, S, I>) -> bool
    where
        T: Read + ReadReady + Write,
        S: Eeprom,
        I: KeyInputs,
    {
        if self.menu == Menu::Idle
            && self
                .last_greeting
                .map_or(true, |t| now_ms.wrapping_sub(t) >= GREETING_INTERVAL_MS)
        {
            self.last_greeting = Some(now_ms);
            say!(serial, "{}", GREETING);
        }

        let mut byte = [0];
        let mut received = false;
        loop {
            match serial.read_ready() {
                Ok(true) => {}
                Ok(false) => break,
                Err(_) => {
                    warn!("serial read failed");
                    break;
                }
            }
            match serial.read(&mut byte) {
                Ok(1) => {
                    received = true;
                    self.byte(byte[0], now_ms, serial, s);
                }
                Ok(_) => break,
                Err(_) => {
                    warn!("serial read failed");
                    break;
                }
            }
        }

        match self.menu {
            Menu::Idle | Menu::Main => {}
            Menu::Remap { .. } => {
                let entry = self.key_name.poll(now_ms);
                self.key_entry(entry, serial, s);
            }
            _ => {
                let entry = self.number.poll(now_ms);
                self.number_entry(entry, serial, s);
            }
        }
        received
    }

    fn byte<T: Write, S: Eeprom, I: KeyInputs>(
        &mut self,
        b: u8,
        now_ms: u64,
        out: &mut T,
        s: &mut Session<'_, S, I>,
    ) {
        match self.menu {
            Menu::Idle => {
                if b == ENTRY_MARKER {
                    info!("config menu opened");
                    self.go(Menu::Main, out, s);
                }
            }
            Menu::Main => self.dispatch(b, now_ms, out, s),
            Menu::Remap { .. } => {
                let entry = self.key_name.push(b, now_ms);
                self.key_entry(entry, out, s);
            }
            Menu::Threshold { input } if b == CALIBRATE && self.number.is_empty() => {
                match s.sampler.calibrate(&mut *s.inputs, input) {
                    Some(raw) => {
                        s.config.set_threshold(input, raw);
                        say!(out, "Calibrated: {}\r\n", s.config.thresholds[input]);
                    }
                    None => say!(out, "No reading\r\n"),
                }
                self.next_threshold(input + 1, out, s);
            }
            _ => {
                let entry = self.number.push(b, now_ms);
                self.number_entry(entry, out, s);
            }
        }
    }

    fn dispatch<T: Write, S: Eeprom, I: KeyInputs>(
        &mut self,
        b: u8,
        now_ms: u64,
        out: &mut T,
        s: &mut Session<'_, S, I>,
    ) {
        match b {
            b'1' => {
                let layered = matches!(
                    s.config.side_mode(),
                    SideButtonMode::LayerShift | SideButtonMode::Profile
                );
                if layered && s.board.layer_count > 1 {
                    self.go(Menu::Layer, out, s);
                } else {
                    self.go(Menu::Remap { layer: 0, key: 0 }, out, s);
                }
            }
            b'2' => self.go(Menu::Value(Field::LedMode), out, s),
            b'3' => self.go(Menu::Value(Field::Brightness), out, s),
            b'4' => self.go(Menu::Hue { key: 0 }, out, s),
            b'5' => self.go(Menu::Value(Field::IdleTimeout), out, s),
            b'6' => self.go(Menu::Value(Field::SideMode), out, s),
            b'7' => {
                if s.board.has_touch() {
                    self.next_threshold(0, out, s);
                } else {
                    self.go(Menu::Value(Field::Debounce), out, s);
                }
            }
            b'0' => self.exit(now_ms, out, s),
            b'\r' | b'\n' => {}
            _ => self.show(out, s),
        }
    }

    fn exit<T: Write, S: Eeprom, I: KeyInputs>(
        &mut self,
        now_ms: u64,
        out: &mut T,
        s: &mut Session<'_, S, I>,
    ) {
        match s.store.save(&*s.config) {
            Ok(changed) => {
                debug!("config exit; changed {}", changed);
                say!(out, "Saved\r\n");
            }
            Err(err) => {
                warn!("config save failed: {:?}", err);
                say!(out, "Save failed\r\n");
            }
        }
        s.idle.touch(now_ms);
        s.effects.set_overlay(Overlay::None);
        self.menu = Menu::Idle;
        self.last_greeting = Some(now_ms);
    }

    fn key_entry<T: Write, S: Eeprom, I: KeyInputs>(
        &mut self,
        entry: Entry<u8>,
        out: &mut T,
        s: &mut Session<'_, S, I>,
    ) {
        let Menu::Remap { layer, key } = self.menu else {
            return;
        };
        match entry {
            Entry::Pending => {}
            Entry::Invalid => self.invalid(out, s),
            Entry::Done(code) => {
                s.config.mapping[layer][key] = code;
                say!(out, "{}\r\n", CodeName(code));
                if key + 1 < s.board.key_count {
                    self.go(Menu::Remap { layer, key: key + 1 }, out, s);
                } else {
                    self.go(Menu::Main, out, s);
                }
            }
        }
    }

    fn number_entry<T: Write, S: Eeprom, I: KeyInputs>(
        &mut self,
        entry: Entry<u8>,
        out: &mut T,
        s: &mut Session<'_, S, I>,
    ) {
        let value = match entry {
            Entry::Pending => return,
            Entry::Invalid => return self.invalid(out, s),
            Entry::Done(value) => value,
        };
        match self.menu {
            Menu::Layer => {
                if (value as usize) < s.board.layer_count {
                    self.go(
                        Menu::Remap {
                            layer: value as usize,
                            key: 0,
                        },
                        out,
                        s,
                    );
                } else {
                    self.invalid(out, s);
                }
            }
            Menu::Hue { key } => {
                s.config.hues[key] = value;
                if key + 1 < s.board.key_count {
                    self.go(Menu::Hue { key: key + 1 }, out, s);
                } else {
                    self.go(Menu::Main, out, s);
                }
            }
            Menu::Threshold { input } => {
                s.config.thresholds[input] = value;
                self.next_threshold(input + 1, out, s);
            }
            Menu::Value(field) => {
                if apply(field, value, s) {
                    self.go(Menu::Main, out, s);
                } else {
                    self.invalid(out, s);
                }
            }
            Menu::Idle | Menu::Main | Menu::Remap { .. } => {}
        }
    }

    fn next_threshold<T: Write, S: Eeprom, I: KeyInputs>(
        &mut self,
        from: usize,
        out: &mut T,
        s: &mut Session<'_, S, I>,
    ) {
        let next = (from..s.board.input_count())
            .find(|i| s.board.input_kind(*i) == Some(InputKind::Touch));
        match next {
            Some(input) => self.go(Menu::Threshold { input }, out, s),
            None => self.go(Menu::Main, out, s),
        }
    }

    fn invalid<T: Write, S: Eeprom, I: KeyInputs>(
        &mut self,
        out: &mut T,
        s: &mut Session<'_, S, I>,
    ) {
        say!(out, "{}", INVALID);
        self.go(self.menu, out, s);
    }

    fn go<T: Write, S: Eeprom, I: KeyInputs>(
        &mut self,
        menu: Menu,
        out: &mut T,
        s: &mut Session<'_, S, I>,
    ) {
        self.menu = menu;
        self.number.reset();
        self.key_name.reset();
        self.show(out, s);
    }

    /// Prompt for the current state and set the matching LED overlay.
    fn show<T: Write, S: Eeprom, I: KeyInputs>(&self, out: &mut T, s: &mut Session<'_, S, I>) {
        let config = &*s.config;
        let overlay = match self.menu {
            Menu::Idle => Overlay::None,
            Menu::Main => {
                say!(out, "\r\nMain menu\r\n");
                say!(out, " 1 Remap keys\r\n");
                say!(out, " 2 LED mode ({})\r\n", config.led_mode().name());
                say!(out, " 3 Brightness ({})\r\n", config.brightness);
                say!(out, " 4 Custom colors\r\n");
                say!(out, " 5 Idle timeout ({} min)\r\n", config.idle_minutes);
                say!(out, " 6 Side button ({})\r\n", config.side_mode().name());
                if s.board.has_touch() {
                    say!(out, " 7 Touch thresholds\r\n");
                } else {
                    say!(out, " 7 Debounce ({} ms)\r\n", config.debounce_ms);
                }
                say!(out, " 0 Save and exit\r\n");
                Overlay::None
            }
            Menu::Layer => {
                say!(out, "Layer to remap (0-{}): ", s.board.layer_count - 1);
                Overlay::None
            }
            Menu::Remap { layer, key } => {
                say!(
                    out,
                    "Layer {} key {} [{}]: ",
                    layer,
                    key + 1,
                    CodeName(config.mapping[layer][key])
                );
                Overlay::Highlight(key)
            }
            Menu::Hue { key } => {
                say!(out, "Hue for key {} (0-255) [{}]: ", key + 1, config.hues[key]);
                Overlay::Highlight(key)
            }
            Menu::Threshold { input } => {
                say!(
                    out,
                    "Threshold for input {} in steps of 4, or c to calibrate [{}]: ",
                    input + 1,
                    config.thresholds[input]
                );
                if input < s.board.key_count {
                    Overlay::Highlight(input)
                } else {
                    Overlay::None
                }
            }
            Menu::Value(field) => {
                match field {
                    Field::LedMode => {
                        for m in (0..LedMode::COUNT).filter_map(LedMode::from_byte) {
                            say!(out, " {} {}\r\n", m as u8, m.name());
                        }
                        say!(out, "LED mode [{}]: ", config.led_mode);
                    }
                    Field::Brightness => {
                        say!(out, "Brightness (0-255) [{}]: ", config.brightness)
                    }
                    Field::IdleTimeout => say!(
                        out,
                        "Idle timeout in minutes, 0 for never [{}]: ",
                        config.idle_minutes
                    ),
                    Field::SideMode => {
                        for m in (0..SideButtonMode::COUNT).filter_map(SideButtonMode::from_byte) {
                            say!(out, " {} {}\r\n", m as u8, m.name());
                        }
                        say!(out, "Side button mode [{}]: ", config.side_mode);
                    }
                    Field::Debounce => say!(out, "Debounce ms [{}]: ", config.debounce_ms),
                }
                Overlay::None
            }
        };
        s.effects.set_overlay(overlay);
    }
}

/// Store `value` in `field` when it is in range.
fn apply<S: Eeprom, I: KeyInputs>(field: Field, value: u8, s: &mut Session<'_, S, I>) -> bool {
    let config = &mut *s.config;
    match field {
        Field::LedMode => {
            if LedMode::from_byte(value).is_none() {
                return false;
            }
            config.led_mode = value;
        }
        Field::Brightness => config.brightness = value,
        Field::IdleTimeout => config.idle_minutes = value,
        Field::SideMode => {
            if SideButtonMode::from_byte(value).is_none() {
                return false;
            }
            config.side_mode = value;
        }
        Field::Debounce => {
            config.debounce_ms = value;
            s.inputs.set_debounce_ms(value);
        }
    }
    true
}

#[cfg(test)]
#[path = "config_test.rs"]
mod test;
