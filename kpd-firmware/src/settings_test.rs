use kpd_common::keycodes::code;

use crate::{
    board::{FOUR_KEY, TWO_KEY_TOUCH},
    io_test_stub::RamEeprom,
};

use super::*;

macro_rules! setup {
    ($store:ident) => {
        let mut $store = ConfigStore::new(RamEeprom::new(64));
    };
}

#[test]
fn blank_storage_resets_to_defaults() {
    setup!(store);

    let config = store.load(&FOUR_KEY).unwrap();
    assert_eq!(config, ConfigRecord::defaults(&FOUR_KEY));

    let eeprom = store.storage();
    assert_eq!(eeprom.commits, 1);
    assert_eq!(eeprom.committed[layout::VERSION], CONFIG_VERSION);
    assert_eq!(eeprom.committed[layout::mapping_offset(0, 0)], code::ESCAPE);
    assert_eq!(eeprom.committed[layout::SIDE_MODE], SideButtonMode::Profile as u8);
}

#[test]
fn previous_version_boots_to_defaults() {
    setup!(store);
    let mut config = store.load(&FOUR_KEY).unwrap();
    config.brightness = 7;
    store.save(&config).unwrap();

    store.storage().bytes[layout::VERSION] = CONFIG_VERSION - 1;
    store.storage().commit().unwrap();

    let config = store.load(&FOUR_KEY).unwrap();
    assert_eq!(config.brightness, ConfigRecord::DEFAULT_BRIGHTNESS);
    assert_eq!(store.storage().committed[layout::VERSION], CONFIG_VERSION);
}

#[test]
fn round_trip_through_power_cycle() {
    setup!(store);
    let mut config = store.load(&TWO_KEY_TOUCH).unwrap();
    config.brightness = 33;
    config.led_mode = LedMode::Bps as u8;
    config.idle_minutes = 12;
    config.side_mode = SideButtonMode::LayerShift as u8;
    config.active_profile = 1;
    config.debounce_ms = 9;
    config.hues[3] = 200;
    config.set_threshold(2, 1203);
    config.mapping[1][1] = b'q';
    config.mapping[3][7] = 250;
    assert!(store.save(&config).unwrap());

    let mut eeprom = store.into_inner();
    eeprom.power_cycle();
    let mut store = ConfigStore::new(eeprom);
    let loaded = store.load(&TWO_KEY_TOUCH).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.threshold(2), 1200);
    assert_eq!(loaded.led_mode(), LedMode::Bps);
}

#[test]
fn save_without_changes_does_not_commit() {
    setup!(store);
    let config = store.load(&FOUR_KEY).unwrap();
    let writes = store.storage().writes;

    assert!(!store.save(&config).unwrap());
    assert_eq!(store.storage().commits, 1);
    assert_eq!(store.storage().writes, writes);
}

#[test]
fn save_writes_only_changed_bytes() {
    setup!(store);
    let mut config = store.load(&FOUR_KEY).unwrap();
    let writes = store.storage().writes;

    config.brightness = 1;
    config.hues[0] = 99;
    assert!(store.save(&config).unwrap());
    assert_eq!(store.storage().writes, writes + 2);
    assert_eq!(store.storage().commits, 2);
}

#[test]
fn save_byte() {
    setup!(store);
    store.load(&FOUR_KEY).unwrap();

    assert!(store.save_byte(layout::ACTIVE_PROFILE, 2).unwrap());
    assert!(!store.save_byte(layout::ACTIVE_PROFILE, 2).unwrap());
    assert_eq!(store.storage().commits, 2);
    assert_eq!(store.storage().committed[layout::ACTIVE_PROFILE], 2);
    assert_eq!(
        store.save_byte(layout::RECORD_LEN, 0),
        Err(StoreError::Capacity)
    );
}

#[test]
fn storage_errors() {
    let mut small = ConfigStore::new(RamEeprom::new(10));
    assert_eq!(small.load(&FOUR_KEY), Err(StoreError::Capacity));

    setup!(store);
    let mut config = store.load(&FOUR_KEY).unwrap();
    store.storage().fail_writes = true;
    config.brightness = 3;
    assert_eq!(store.save(&config), Err(StoreError::Write));
    assert_eq!(store.storage().commits, 1);
}

#[test]
fn typed_accessors_tolerate_unknown_values() {
    let mut config = ConfigRecord::defaults(&FOUR_KEY);
    config.led_mode = 9;
    config.side_mode = 200;
    assert_eq!(config.led_mode(), LedMode::Cycle);
    assert_eq!(config.side_mode(), SideButtonMode::Disabled);

    config.set_threshold(0, 5000);
    assert_eq!(config.thresholds[0], 255);
}
