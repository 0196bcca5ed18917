use embedded_hal::digital::InputPin;
use kpd_common::layout::MAX_INPUTS;

use crate::{board::BoardProfile, board::InputKind, debug, settings::ConfigRecord};

/// Minimum time between samples.
pub const SAMPLE_INTERVAL_MS: u64 = 1;
/// A touched input stays pressed until its reading drops this far below the threshold.
pub const TOUCH_HYSTERESIS: u16 = 50;
pub const CALIBRATION_SAMPLES: u32 = 16;
pub const CALIBRATION_MARGIN: u16 = 100;

/// Current and previous pressed state of every input. Face keys come first and the side button,
/// when the board has one, follows them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KeyState {
    pub pressed: [bool; MAX_INPUTS],
    pub last_pressed: [bool; MAX_INPUTS],
}

impl KeyState {
    pub fn changed(&self, i: usize) -> bool {
        self.pressed[i] != self.last_pressed[i]
    }

    pub fn went_down(&self, i: usize) -> bool {
        self.pressed[i] && !self.last_pressed[i]
    }

    pub fn any_pressed(&self) -> bool {
        self.pressed.iter().any(|p| *p)
    }

    pub fn any_key_pressed(&self, key_count: usize) -> bool {
        self.pressed[..key_count].iter().any(|p| *p)
    }

    /// Accept the current state as seen.
    pub fn commit(&mut self) {
        self.last_pressed = self.pressed;
    }
}

/// The physical input collaborator.
pub trait KeyInputs {
    /// Debounced state of switch input `i`.
    fn is_pressed(&mut self, i: usize) -> bool;

    /// Raw capacitive reading of touch input `i`; larger means touched.
    fn touch_reading(&mut self, _i: usize) -> Option<u16> {
        None
    }

    fn set_debounce_ms(&mut self, _ms: u8) {}
}

/// Active-low switch pins, debounced by requiring a new level to hold for `debounce_ms`
/// consecutive samples.
pub struct PinInputs<P: InputPin, const N: usize> {
    pins: [P; N],
    stable: [bool; N],
    counts: [u8; N],
    debounce: u8,
}

impl<P: InputPin, const N: usize> PinInputs<P, N> {
    pub fn new(pins: [P; N]) -> Self {
        Self {
            pins,
            stable: [false; N],
            counts: [0; N],
            debounce: 0,
        }
    }
}

impl<P: InputPin, const N: usize> KeyInputs for PinInputs<P, N> {
    fn is_pressed(&mut self, i: usize) -> bool {
        let Some(pin) = self.pins.get_mut(i) else {
            return false;
        };
        let level = pin.is_low().unwrap_or(false);
        if level == self.stable[i] {
            self.counts[i] = 0;
        } else {
            self.counts[i] = self.counts[i].saturating_add(1);
            if self.counts[i] > self.debounce {
                self.stable[i] = level;
                self.counts[i] = 0;
            }
        }
        self.stable[i]
    }

    fn set_debounce_ms(&mut self, ms: u8) {
        // one sample per ms
        self.debounce = ms;
    }
}

/// Polls the inputs at a fixed cadence and fills [KeyState::pressed].
#[derive(Default)]
pub struct Sampler {
    last_sample: Option<u64>,
}

impl Sampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample every input if [SAMPLE_INTERVAL_MS] has elapsed. Returns true when a sample was
    /// taken.
    pub fn sample(
        &mut self,
        now_ms: u64,
        board: &BoardProfile,
        config: &ConfigRecord,
        inputs: &mut impl KeyInputs,
        keys: &mut KeyState,
    ) -> bool {
        if self
            .last_sample
            .is_some_and(|t| now_ms.wrapping_sub(t) < SAMPLE_INTERVAL_MS)
        {
            return false;
        }
        self.last_sample = Some(now_ms);

        for i in 0..board.input_count() {
            keys.pressed[i] = match board.input_kind(i) {
                Some(InputKind::Switch) => inputs.is_pressed(i),
                Some(InputKind::Touch) => match inputs.touch_reading(i) {
                    Some(reading) => {
                        touch_pressed(reading, config.threshold(i), keys.pressed[i])
                    }
                    None => false,
                },
                None => false,
            };
        }
        true
    }

    /// Threshold for touch input `i`: the mean of [CALIBRATION_SAMPLES] untouched readings plus
    /// [CALIBRATION_MARGIN]. `None` when the input gives no readings.
    pub fn calibrate(&mut self, inputs: &mut impl KeyInputs, i: usize) -> Option<u16> {
        let mut total: u32 = 0;
        for _ in 0..CALIBRATION_SAMPLES {
            total += inputs.touch_reading(i)? as u32;
        }
        let mean = (total / CALIBRATION_SAMPLES) as u16;
        let threshold = mean.saturating_add(CALIBRATION_MARGIN);
        debug!("calibrated input {}: mean {} threshold {}", i, mean, threshold);
        Some(threshold)
    }
}

fn touch_pressed(reading: u16, threshold: u16, was_pressed: bool) -> bool {
    if was_pressed {
        reading >= threshold.saturating_sub(TOUCH_HYSTERESIS)
    } else {
        reading > threshold
    }
}

#[cfg(test)]
#[path = "key_sampler_test.rs"]
mod test;
