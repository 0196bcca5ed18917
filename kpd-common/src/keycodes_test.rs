extern crate std;
use std::format;

use super::*;

#[test]
fn resolve_ranges() {
    assert_eq!(resolve(0), OutputAction::None);
    assert_eq!(resolve(b'a'), OutputAction::Literal(b'a'));
    assert_eq!(resolve(127), OutputAction::Literal(127));
    assert_eq!(resolve(128), OutputAction::Keyboard(0xe0));
    assert_eq!(resolve(code::UP), OutputAction::Keyboard(0x52));
    assert_eq!(resolve(code::F1), OutputAction::Keyboard(0x3a));
    assert_eq!(resolve(code::PLAY_PAUSE), OutputAction::Media(0xcd));
    assert_eq!(resolve(code::VOLUME_DOWN), OutputAction::Media(0xea));
    assert_eq!(resolve(code::MOUSE_MIDDLE), OutputAction::Mouse(4));
    assert_eq!(resolve(199), OutputAction::Keyboard(0x65));
    assert_eq!(resolve(200), OutputAction::Keyboard(200));
    assert_eq!(resolve(255), OutputAction::Keyboard(255));
}

#[test]
fn named_codes_match_catalog() {
    let check = |code: u8, name: &str| {
        let i = special_index(code).unwrap();
        assert_eq!(SPECIAL_KEYS[i].name, name);
    };
    check(code::LEFT_CTRL, "LeftCtrl");
    check(code::LEFT_SHIFT, "LeftShift");
    check(code::DOWN, "Down");
    check(code::LEFT, "Left");
    check(code::RIGHT, "Right");
    check(code::ENTER, "Enter");
    check(code::ESCAPE, "Escape");
    check(code::KP_1, "Kp1");
    check(code::NEXT_TRACK, "NextTrack");
    check(code::PREV_TRACK, "PrevTrack");
    check(code::MUTE, "Mute");
    check(code::VOLUME_UP, "VolumeUp");
    check(code::MOUSE_LEFT, "MouseLeft");
    check(code::MOUSE_RIGHT, "MouseRight");
}

#[test]
fn special_code_bounds() {
    assert_eq!(special_code(8), Some(136));
    assert_eq!(special_code(71), Some(199));
    assert_eq!(special_code(72), None);
    assert_eq!(special_index(127), None);
    assert_eq!(special_index(200), None);
}

#[test]
fn ascii_usages() {
    assert_eq!(ascii_usage(b'z'), Some((0x1d, false)));
    assert_eq!(ascii_usage(b'Z'), Some((0x1d, true)));
    assert_eq!(ascii_usage(b'1'), Some((0x1e, false)));
    assert_eq!(ascii_usage(b'0'), Some((0x27, false)));
    assert_eq!(ascii_usage(b')'), Some((0x27, true)));
    assert_eq!(ascii_usage(b'`'), Some((0x35, false)));
    assert_eq!(ascii_usage(b'\r'), Some((usage::ENTER, false)));
    assert_eq!(ascii_usage(b':'), Some((0x33, true)));
    assert_eq!(ascii_usage(1), None);
}

#[test]
fn every_printable_is_typeable() {
    for c in 0x20..0x7f_u8 {
        assert!(ascii_usage(c).is_some(), "missing {}", c as char);
    }
}

#[test]
fn code_names() {
    assert_eq!(format!("{}", CodeName(0)), "none");
    assert_eq!(format!("{}", CodeName(b'a')), "'a'");
    assert_eq!(format!("{}", CodeName(b' ')), "Space");
    assert_eq!(format!("{}", CodeName(9)), "ascii 0x09");
    assert_eq!(format!("{}", CodeName(136)), "Up (:8)");
    assert_eq!(format!("{}", CodeName(0xe9)), "usage 0xe9");
}
