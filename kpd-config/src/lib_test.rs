use std::{fs, io};

use kpd_common::layout::{self, RECORD_LEN};
use kpd_firmware::board::{FOUR_KEY, TWO_KEY, TWO_KEY_TOUCH};
use tempfile::tempdir;

use crate::{
    image::{init_image, load_image, FileEeprom},
    session::{run_session, SessionEnd},
};

use super::*;

#[test]
fn keycodes_by_name_and_index() {
    assert_eq!(list_keycodes(Some("volume"), false), [":66  VolumeUp", ":67  VolumeDown"]);
    assert_eq!(list_keycodes(Some(":8"), false), [":8   Up"]);
    assert_eq!(list_keycodes(Some(":8"), true), [":8   136 Keyboard(82)"]);
    assert_eq!(list_keycodes(None, false).len(), SPECIAL_KEYS.len());
    assert!(list_keycodes(Some("nothing-here"), false).is_empty());
}

#[test]
fn init_then_show() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("four.kpd");
    let config = init_image(&path, &FOUR_KEY).unwrap();
    assert_eq!(config, ConfigRecord::defaults(&FOUR_KEY));

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), RECORD_LEN);
    assert_eq!(bytes[layout::VERSION], CONFIG_VERSION);

    assert!(init_image(&path, &FOUR_KEY).is_err());
    assert_eq!(load_image(&path, &FOUR_KEY).unwrap(), config);

    let text = describe(&FOUR_KEY, &config);
    assert!(text.contains("side button:    Profile select (2)"));
    assert!(text.contains("layer 0:        Escape (:15) | '`' | 'z' | 'x'"));
    assert!(text.contains("layer 3:        MouseLeft (:68)"));
    assert!(text.contains("debounce:       5 ms"));
}

#[test]
fn stale_image_is_reset() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("old.kpd");
    let mut bytes = vec![0; RECORD_LEN];
    bytes[layout::VERSION] = CONFIG_VERSION - 1;
    bytes[layout::BRIGHTNESS] = 7;
    fs::write(&path, &bytes).unwrap();

    let config = load_image(&path, &TWO_KEY).unwrap();
    assert_eq!(config, ConfigRecord::defaults(&TWO_KEY));
    assert_eq!(fs::read(&path).unwrap()[layout::VERSION], CONFIG_VERSION);
}

#[test]
fn short_image_reads_as_erased() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.kpd");
    fs::write(&path, [CONFIG_VERSION]).unwrap();
    let storage = FileEeprom::open(&path).unwrap();
    assert_eq!(storage.bytes().len(), RECORD_LEN);
    assert_eq!(storage.bytes()[1], 0xff);
}

#[test]
fn missing_image_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_image(&dir.path().join("nope.kpd"), &TWO_KEY).unwrap_err();
    assert!(err.to_string().starts_with("Failed to read"));
}

#[test]
fn touch_board_shows_thresholds() {
    let config = ConfigRecord::defaults(&TWO_KEY_TOUCH);
    let text = describe(&TWO_KEY_TOUCH, &config);
    assert!(text.contains("thresholds:     1000 1000 1000"));
    assert!(!text.contains("debounce"));
}

#[test]
fn session_saves_to_image() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("s.kpd");
    init_image(&path, &TWO_KEY).unwrap();

    let input = io::Cursor::new(b"03\n42\n1q:8\n0".to_vec());
    let end = run_session(&TWO_KEY, FileEeprom::open(&path).unwrap(), input, io::sink());
    assert_eq!(end, SessionEnd::Exited);

    let config = load_image(&path, &TWO_KEY).unwrap();
    assert_eq!(config.brightness, 42);
    assert_eq!(config.mapping[0][..2], [b'q', kpd_common::keycodes::code::UP]);
}

#[test]
fn session_without_menu_ends_with_input() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("s.kpd");
    init_image(&path, &TWO_KEY).unwrap();
    let end = run_session(&TWO_KEY, FileEeprom::open(&path).unwrap(), io::empty(), io::sink());
    assert_eq!(end, SessionEnd::InputClosed);

    let end = run_session(
        &TWO_KEY,
        FileEeprom::open(&path).unwrap(),
        io::Cursor::new(b"03".to_vec()),
        io::sink(),
    );
    assert_eq!(end, SessionEnd::Abandoned);
    assert_eq!(
        load_image(&path, &TWO_KEY).unwrap().brightness,
        ConfigRecord::DEFAULT_BRIGHTNESS
    );
}

#[test]
fn describe_one_line_per_setting() {
    let config = ConfigRecord::defaults(&TWO_KEY);
    let text = describe(&TWO_KEY, &config);
    let lines = text.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 9 + TWO_KEY.layer_count);
    assert_eq!(lines[0], "board:          two-key");
    assert!(lines[7].starts_with("debounce:"));
    assert!(lines[10].starts_with("layer 1:"));
    assert!(text.ends_with('\n') && !text.ends_with("\n\n"));
}
