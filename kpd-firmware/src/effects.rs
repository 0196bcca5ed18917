use kpd_common::layout::MAX_KEYS;
use smart_leds::{
    brightness,
    hsv::{hsv2rgb, Hsv},
    SmartLedsWrite, RGB8,
};

use crate::{
    board::BoardProfile,
    key_sampler::KeyState,
    settings::{ConfigRecord, LedMode},
    warn,
};

/// Face keys plus one indicator.
pub const MAX_LEDS: usize = MAX_KEYS + 1;

/// Minimum time between frames while running normally.
pub const TICK_MS: u64 = 10;
/// Minimum time between frames while a menu is open.
pub const MENU_TICK_MS: u64 = 5;

pub const BPS_WINDOW_MS: u64 = 1000;
pub const BPS_HUE_PER_PRESS: u16 = 10;
pub const BPS_MAX_HUE: u8 = 200;
pub const BPS_HUE_STEP: u8 = 2;

pub const FADE_STEP: u8 = 15;
pub const REST_VALUE: u8 = 90;
pub const REST_SATURATION: u8 = 120;

const WHITE: RGB8 = RGB8 {
    r: 255,
    g: 255,
    b: 255,
};
const DIM_WHITE: RGB8 = RGB8 { r: 40, g: 40, b: 40 };
const DARK: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

/// Temporary displays that replace the LED mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Overlay {
    None,
    /// The key being configured is white and the rest dark.
    Highlight(usize),
    /// The active profile's key shows the cycling hue and the rest dim white.
    Profile,
}

pub struct EffectEngine {
    last_tick: Option<u64>,
    hue_offset: u8,
    saturation: [u8; MAX_KEYS],
    value: [u8; MAX_KEYS],
    current: u8,
    ceiling: u8,
    bps_count: u16,
    bps_window_start: u64,
    bps_hue: u8,
    bps_target: u8,
    overlay: Overlay,
    pixels: [RGB8; MAX_LEDS],
}

impl Default for EffectEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectEngine {
    pub fn new() -> Self {
        Self {
            last_tick: None,
            hue_offset: 0,
            saturation: [REST_SATURATION; MAX_KEYS],
            value: [REST_VALUE; MAX_KEYS],
            current: 0,
            ceiling: 0,
            bps_count: 0,
            bps_window_start: 0,
            bps_hue: 0,
            bps_target: 0,
            overlay: Overlay::None,
            pixels: [DARK; MAX_LEDS],
        }
    }

    /// The brightness the fade is heading for.
    pub fn set_ceiling(&mut self, ceiling: u8) {
        self.ceiling = ceiling;
    }

    pub fn ceiling(&self) -> u8 {
        self.ceiling
    }

    /// Brightness applied to the last frame.
    pub fn brightness(&self) -> u8 {
        self.current
    }

    pub fn set_overlay(&mut self, overlay: Overlay) {
        self.overlay = overlay;
    }

    pub fn overlay(&self) -> Overlay {
        self.overlay
    }

    pub fn note_presses(&mut self, presses: u8) {
        self.bps_count = self.bps_count.saturating_add(presses as u16);
    }

    pub fn bps_target(&self) -> u8 {
        self.bps_target
    }

    pub fn bps_hue(&self) -> u8 {
        self.bps_hue
    }

    pub fn pixels(&self) -> &[RGB8] {
        &self.pixels
    }

    /// Render and write a frame if at least `interval_ms` has passed since the last one. Returns
    /// true when a frame was written.
    pub fn tick<L: SmartLedsWrite<Color = RGB8>>(
        &mut self,
        now_ms: u64,
        interval_ms: u64,
        board: &BoardProfile,
        keys: &KeyState,
        config: &ConfigRecord,
        leds: &mut L,
    ) -> bool {
        if self
            .last_tick
            .is_some_and(|t| now_ms.wrapping_sub(t) < interval_ms)
        {
            return false;
        }
        self.last_tick = Some(now_ms);

        self.step(now_ms, board, keys);
        self.render(board, keys, config);

        let count = board.led_count.min(MAX_LEDS);
        if leds
            .write(brightness(self.pixels[..count].iter().copied(), self.current))
            .is_err()
        {
            warn!("LED write failed");
        }
        true
    }

    fn step(&mut self, now_ms: u64, board: &BoardProfile, keys: &KeyState) {
        if self.current < self.ceiling {
            self.current += 1;
        } else if self.current > self.ceiling {
            self.current -= 1;
        }

        self.hue_offset = self.hue_offset.wrapping_add(1);

        if now_ms.wrapping_sub(self.bps_window_start) >= BPS_WINDOW_MS {
            self.bps_target = self
                .bps_count
                .saturating_mul(BPS_HUE_PER_PRESS)
                .min(BPS_MAX_HUE as u16) as u8;
            self.bps_count = 0;
            self.bps_window_start = now_ms;
        }
        self.bps_hue = step_toward(self.bps_hue, self.bps_target, BPS_HUE_STEP);

        for k in 0..board.key_count {
            if keys.pressed[k] {
                self.saturation[k] = self.saturation[k].saturating_sub(FADE_STEP);
                self.value[k] = self.value[k].saturating_add(FADE_STEP);
            } else {
                self.saturation[k] = step_toward(self.saturation[k], REST_SATURATION, FADE_STEP);
                self.value[k] = step_toward(self.value[k], REST_VALUE, FADE_STEP);
            }
        }
    }

    fn key_color(
        &self,
        k: usize,
        board: &BoardProfile,
        keys: &KeyState,
        config: &ConfigRecord,
    ) -> RGB8 {
        let pressed = keys.pressed[k];
        let spread = (k * 256 / board.key_count.max(1)) as u8;
        let cycle = hsv(self.hue_offset.wrapping_add(spread), u8::MAX, u8::MAX);
        match self.overlay {
            Overlay::Highlight(target) => return if k == target { WHITE } else { DARK },
            Overlay::Profile => {
                return if k == config.active_profile as usize {
                    hsv(self.hue_offset, u8::MAX, u8::MAX)
                } else {
                    DIM_WHITE
                }
            }
            Overlay::None => {}
        }
        match config.led_mode() {
            LedMode::Cycle => {
                if pressed {
                    WHITE
                } else {
                    cycle
                }
            }
            LedMode::ReactiveFade => hsv(
                self.hue_offset.wrapping_add(spread),
                self.saturation[k],
                self.value[k],
            ),
            LedMode::Custom => {
                if pressed {
                    hsv(config.hues[k], u8::MAX, u8::MAX)
                } else {
                    DIM_WHITE
                }
            }
            LedMode::Bps => hsv(self.bps_hue, u8::MAX, u8::MAX),
        }
    }

    fn render(&mut self, board: &BoardProfile, keys: &KeyState, config: &ConfigRecord) {
        let count = board.led_count.min(MAX_LEDS);
        let indicator = if keys.any_key_pressed(board.key_count) {
            WHITE
        } else {
            hsv(self.hue_offset, u8::MAX, u8::MAX)
        };
        for p in self.pixels[..count].iter_mut() {
            *p = indicator;
        }
        for k in 0..board.key_count {
            let color = self.key_color(k, board, keys, config);
            if let Some(p) = self.pixels[..count].get_mut(board.pixel(k)) {
                *p = color;
            }
        }
    }
}

fn hsv(hue: u8, sat: u8, val: u8) -> RGB8 {
    hsv2rgb(Hsv { hue, sat, val })
}

fn step_toward(value: u8, target: u8, step: u8) -> u8 {
    if value < target {
        value.saturating_add(step).min(target)
    } else {
        value.saturating_sub(step).max(target)
    }
}

#[cfg(test)]
#[path = "effects_test.rs"]
mod test;
