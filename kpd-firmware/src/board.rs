use kpd_common::{
    keycodes::code,
    layout::{MAX_KEYS, MAX_LAYERS},
};

use crate::settings::SideButtonMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputKind {
    Switch,
    Touch,
}

/// Static description of a keypad variant. Selected at startup.
pub struct BoardProfile {
    pub name: &'static str,
    pub key_count: usize,
    pub layer_count: usize,
    pub keys: InputKind,
    /// The side button is input `key_count` when present.
    pub side_button: Option<InputKind>,
    /// Pixel index of each face key; pixels past `key_count` are indicators.
    pub led_order: [u8; MAX_KEYS],
    pub led_count: usize,
    pub default_mapping: [[u8; MAX_KEYS]; MAX_LAYERS],
    /// Stored (scaled) touch threshold for every input.
    pub default_threshold: u8,
    pub default_side_mode: SideButtonMode,
}

impl BoardProfile {
    pub fn input_count(&self) -> usize {
        self.key_count + self.side_button.is_some() as usize
    }

    pub fn side_input(&self) -> Option<usize> {
        self.side_button.map(|_| self.key_count)
    }

    pub fn input_kind(&self, i: usize) -> Option<InputKind> {
        if i < self.key_count {
            Some(self.keys)
        } else if i == self.key_count {
            self.side_button
        } else {
            None
        }
    }

    pub fn has_touch(&self) -> bool {
        self.keys == InputKind::Touch || self.side_button == Some(InputKind::Touch)
    }

    pub fn pixel(&self, key: usize) -> usize {
        self.led_order[key] as usize
    }

    pub fn by_name(name: &str) -> Option<&'static BoardProfile> {
        BOARDS
            .iter()
            .copied()
            .find(|b| b.name.eq_ignore_ascii_case(name))
    }
}

const NO_LAYER: [u8; MAX_KEYS] = [0; MAX_KEYS];
const IDENTITY_ORDER: [u8; MAX_KEYS] = [0, 1, 2, 3, 4, 5, 6, 7];

const fn layer(keys: &[u8]) -> [u8; MAX_KEYS] {
    let mut ans = [0; MAX_KEYS];
    let mut i = 0;
    while i < keys.len() && i < MAX_KEYS {
        ans[i] = keys[i];
        i += 1;
    }
    ans
}

pub const TWO_KEY: BoardProfile = BoardProfile {
    name: "two-key",
    key_count: 2,
    layer_count: 2,
    keys: InputKind::Switch,
    side_button: Some(InputKind::Switch),
    led_order: IDENTITY_ORDER,
    led_count: 2,
    default_mapping: [
        layer(b"zx"),
        layer(&[code::LEFT, code::RIGHT]),
        NO_LAYER,
        NO_LAYER,
    ],
    default_threshold: 0,
    default_side_mode: SideButtonMode::LegacyEscape,
};

pub const TWO_KEY_TOUCH: BoardProfile = BoardProfile {
    name: "two-key-touch",
    key_count: 2,
    layer_count: 2,
    keys: InputKind::Touch,
    side_button: Some(InputKind::Touch),
    led_order: IDENTITY_ORDER,
    led_count: 2,
    default_mapping: [
        layer(b"zx"),
        layer(&[code::LEFT, code::RIGHT]),
        NO_LAYER,
        NO_LAYER,
    ],
    // 1000 raw counts
    default_threshold: 250,
    default_side_mode: SideButtonMode::LegacyEscape,
};

pub const FOUR_KEY: BoardProfile = BoardProfile {
    name: "four-key",
    key_count: 4,
    layer_count: 4,
    keys: InputKind::Switch,
    side_button: Some(InputKind::Switch),
    led_order: [0, 1, 3, 2, 4, 5, 6, 7],
    led_count: 5,
    default_mapping: [
        layer(&[code::ESCAPE, b'`', b'z', b'x']),
        layer(&[code::LEFT, code::UP, code::DOWN, code::RIGHT]),
        layer(&[
            code::PREV_TRACK,
            code::PLAY_PAUSE,
            code::MUTE,
            code::NEXT_TRACK,
        ]),
        layer(&[
            code::MOUSE_LEFT,
            code::MOUSE_RIGHT,
            code::VOLUME_DOWN,
            code::VOLUME_UP,
        ]),
    ],
    default_threshold: 0,
    default_side_mode: SideButtonMode::Profile,
};

pub const SEVEN_KEY: BoardProfile = BoardProfile {
    name: "seven-key",
    key_count: 7,
    layer_count: 2,
    keys: InputKind::Switch,
    side_button: Some(InputKind::Switch),
    led_order: IDENTITY_ORDER,
    led_count: 8,
    default_mapping: [
        layer(b"sdf jkl"),
        layer(&[
            code::F1,
            code::F1 + 1,
            code::F1 + 2,
            code::ENTER,
            code::F1 + 3,
            code::F1 + 4,
            code::F1 + 5,
        ]),
        NO_LAYER,
        NO_LAYER,
    ],
    default_threshold: 0,
    default_side_mode: SideButtonMode::LayerShift,
};

pub const BOARDS: [&BoardProfile; 4] = [&TWO_KEY, &TWO_KEY_TOUCH, &FOUR_KEY, &SEVEN_KEY];

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn profiles_are_consistent() {
        for board in BOARDS {
            assert!(board.key_count <= MAX_KEYS, "{}", board.name);
            assert!(board.layer_count <= MAX_LAYERS, "{}", board.name);
            assert!(board.led_count >= board.key_count, "{}", board.name);
            for key in 0..board.key_count {
                assert!(board.pixel(key) < board.led_count, "{}", board.name);
            }
            for layer in board.layer_count..MAX_LAYERS {
                assert_eq!(board.default_mapping[layer], NO_LAYER, "{}", board.name);
            }
        }
    }

    #[test]
    fn inputs() {
        assert_eq!(FOUR_KEY.input_count(), 5);
        assert_eq!(FOUR_KEY.side_input(), Some(4));
        assert_eq!(FOUR_KEY.input_kind(4), Some(InputKind::Switch));
        assert_eq!(FOUR_KEY.input_kind(5), None);
        assert!(!FOUR_KEY.has_touch());
        assert!(TWO_KEY_TOUCH.has_touch());
    }

    #[test]
    fn lookup() {
        assert_eq!(BoardProfile::by_name("FOUR-KEY").map(|b| b.key_count), Some(4));
        assert!(BoardProfile::by_name("nine-key").is_none());
    }
}
