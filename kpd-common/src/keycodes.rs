use core::fmt;

pub mod key_range {
    pub const NONE: u8 = 0;
    pub const LITERAL_MIN: u8 = 1;
    pub const LITERAL_MAX: u8 = 127;
    pub const SPECIAL_MIN: u8 = 128;
    pub const SPECIAL_MAX: u8 = 199;
    pub const RAW_MIN: u8 = 200;
}

/// HID keyboard page usages referenced outside the catalog.
pub mod usage {
    pub const ENTER: u8 = 0x28;
    pub const ESCAPE: u8 = 0x29;
    pub const BACKSPACE: u8 = 0x2a;
    pub const TAB: u8 = 0x2b;
    pub const SPACE: u8 = 0x2c;
    pub const DELETE: u8 = 0x4c;
    pub const MODIFIER_MIN: u8 = 0xe0;
    pub const MODIFIER_MAX: u8 = 0xe7;
    pub const LEFT_SHIFT: u8 = 0xe1;
}

/// Output codes for catalog entries used by the board defaults.
pub mod code {
    pub const LEFT_CTRL: u8 = 128;
    pub const LEFT_SHIFT: u8 = 129;
    pub const UP: u8 = 136;
    pub const DOWN: u8 = 137;
    pub const LEFT: u8 = 138;
    pub const RIGHT: u8 = 139;
    pub const ENTER: u8 = 142;
    pub const ESCAPE: u8 = 143;
    pub const F1: u8 = 152;
    pub const KP_1: u8 = 178;
    pub const PLAY_PAUSE: u8 = 189;
    pub const NEXT_TRACK: u8 = 190;
    pub const PREV_TRACK: u8 = 191;
    pub const MUTE: u8 = 193;
    pub const VOLUME_UP: u8 = 194;
    pub const VOLUME_DOWN: u8 = 195;
    pub const MOUSE_LEFT: u8 = 196;
    pub const MOUSE_RIGHT: u8 = 197;
    pub const MOUSE_MIDDLE: u8 = 198;
}

/// What an output code does when its key goes down or up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputAction {
    None,
    /// An ASCII character typed on a US layout; shifted characters imply Shift.
    Literal(u8),
    /// A keyboard page usage, modifiers included.
    Keyboard(u8),
    /// A consumer page usage.
    Media(u16),
    /// A mouse button bit.
    Mouse(u8),
}

pub struct SpecialKey {
    pub name: &'static str,
    pub action: OutputAction,
}

const fn kb(name: &'static str, usage: u8) -> SpecialKey {
    SpecialKey {
        name,
        action: OutputAction::Keyboard(usage),
    }
}

const fn media(name: &'static str, usage: u16) -> SpecialKey {
    SpecialKey {
        name,
        action: OutputAction::Media(usage),
    }
}

const fn mouse(name: &'static str, bit: u8) -> SpecialKey {
    SpecialKey {
        name,
        action: OutputAction::Mouse(bit),
    }
}

/// Special keys addressed by output codes `128 + index`.
#[rustfmt::skip]
pub const SPECIAL_KEYS: [SpecialKey; 72] = [
    kb("LeftCtrl", 0xe0), kb("LeftShift", 0xe1), kb("LeftAlt", 0xe2), kb("LeftGui", 0xe3),
    kb("RightCtrl", 0xe4), kb("RightShift", 0xe5), kb("RightAlt", 0xe6), kb("RightGui", 0xe7),
    kb("Up", 0x52), kb("Down", 0x51), kb("Left", 0x50), kb("Right", 0x4f),
    kb("Backspace", usage::BACKSPACE), kb("Tab", usage::TAB), kb("Enter", usage::ENTER),
    kb("Escape", usage::ESCAPE),
    kb("Insert", 0x49), kb("Delete", usage::DELETE), kb("PageUp", 0x4b), kb("PageDown", 0x4e),
    kb("Home", 0x4a), kb("End", 0x4d), kb("CapsLock", 0x39), kb("PrintScreen", 0x46),
    kb("F1", 0x3a), kb("F2", 0x3b), kb("F3", 0x3c), kb("F4", 0x3d), kb("F5", 0x3e),
    kb("F6", 0x3f), kb("F7", 0x40), kb("F8", 0x41), kb("F9", 0x42), kb("F10", 0x43),
    kb("F11", 0x44), kb("F12", 0x45),
    kb("F13", 0x68), kb("F14", 0x69), kb("F15", 0x6a), kb("F16", 0x6b), kb("F17", 0x6c),
    kb("F18", 0x6d), kb("F19", 0x6e), kb("F20", 0x6f),
    kb("NumLock", 0x53), kb("KpSlash", 0x54), kb("KpStar", 0x55), kb("KpMinus", 0x56),
    kb("KpPlus", 0x57), kb("KpEnter", 0x58),
    kb("Kp1", 0x59), kb("Kp2", 0x5a), kb("Kp3", 0x5b), kb("Kp4", 0x5c), kb("Kp5", 0x5d),
    kb("Kp6", 0x5e), kb("Kp7", 0x5f), kb("Kp8", 0x60), kb("Kp9", 0x61), kb("Kp0", 0x62),
    kb("KpDot", 0x63),
    media("PlayPause", 0xcd), media("NextTrack", 0xb5), media("PrevTrack", 0xb6),
    media("Stop", 0xb7), media("Mute", 0xe2), media("VolumeUp", 0xe9),
    media("VolumeDown", 0xea),
    mouse("MouseLeft", 1), mouse("MouseRight", 2), mouse("MouseMiddle", 4),
    kb("Application", 0x65),
];

/// Catalog index for `code`, if it addresses the special-key catalog.
pub fn special_index(code: u8) -> Option<usize> {
    match code {
        key_range::SPECIAL_MIN..=key_range::SPECIAL_MAX => {
            let i = (code - key_range::SPECIAL_MIN) as usize;
            (i < SPECIAL_KEYS.len()).then_some(i)
        }
        _ => None,
    }
}

/// Output code for catalog entry `index`.
pub fn special_code(index: usize) -> Option<u8> {
    (index < SPECIAL_KEYS.len()).then(|| key_range::SPECIAL_MIN + index as u8)
}

pub fn resolve(code: u8) -> OutputAction {
    match code {
        key_range::NONE => OutputAction::None,
        key_range::LITERAL_MIN..=key_range::LITERAL_MAX => OutputAction::Literal(code),
        key_range::SPECIAL_MIN..=key_range::SPECIAL_MAX => match special_index(code) {
            Some(i) => SPECIAL_KEYS[i].action,
            None => OutputAction::None,
        },
        _ => OutputAction::Keyboard(code),
    }
}

/// Keyboard usage and shift state that types ASCII character `c` on a US layout.
///
/// ```
/// use kpd_common::keycodes::ascii_usage;
///
/// assert_eq!(ascii_usage(b'a'), Some((0x04, false)));
/// assert_eq!(ascii_usage(b'?'), Some((0x38, true)));
/// ```
pub const fn ascii_usage(c: u8) -> Option<(u8, bool)> {
    let ans = match c {
        b'a'..=b'z' => (0x04 + (c - b'a'), false),
        b'A'..=b'Z' => (0x04 + (c - b'A'), true),
        b'1'..=b'9' => (0x1e + (c - b'1'), false),
        b'0' => (0x27, false),
        b'!' => (0x1e, true),
        b'@' => (0x1f, true),
        b'#' => (0x20, true),
        b'$' => (0x21, true),
        b'%' => (0x22, true),
        b'^' => (0x23, true),
        b'&' => (0x24, true),
        b'*' => (0x25, true),
        b'(' => (0x26, true),
        b')' => (0x27, true),
        b'\n' | b'\r' => (usage::ENTER, false),
        0x1b => (usage::ESCAPE, false),
        0x08 => (usage::BACKSPACE, false),
        b'\t' => (usage::TAB, false),
        b' ' => (usage::SPACE, false),
        b'-' => (0x2d, false),
        b'_' => (0x2d, true),
        b'=' => (0x2e, false),
        b'+' => (0x2e, true),
        b'[' => (0x2f, false),
        b'{' => (0x2f, true),
        b']' => (0x30, false),
        b'}' => (0x30, true),
        b'\\' => (0x31, false),
        b'|' => (0x31, true),
        b';' => (0x33, false),
        b':' => (0x33, true),
        b'\'' => (0x34, false),
        b'"' => (0x34, true),
        b'`' => (0x35, false),
        b'~' => (0x35, true),
        b',' => (0x36, false),
        b'<' => (0x36, true),
        b'.' => (0x37, false),
        b'>' => (0x37, true),
        b'/' => (0x38, false),
        b'?' => (0x38, true),
        0x7f => (usage::DELETE, false),
        _ => return None,
    };
    Some(ans)
}

/// Human readable name of an output code.
pub struct CodeName(pub u8);

impl fmt::Display for CodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.0;
        match code {
            key_range::NONE => f.write_str("none"),
            0x21..=0x7e => write!(f, "'{}'", code as char),
            b' ' => f.write_str("Space"),
            key_range::LITERAL_MIN..=key_range::LITERAL_MAX => write!(f, "ascii 0x{:02x}", code),
            _ => match special_index(code) {
                Some(i) => write!(f, "{} (:{})", SPECIAL_KEYS[i].name, i),
                None if code >= key_range::RAW_MIN => write!(f, "usage 0x{:02x}", code),
                None => write!(f, "unused 0x{:02x}", code),
            },
        }
    }
}

#[cfg(test)]
#[path = "keycodes_test.rs"]
mod test;
