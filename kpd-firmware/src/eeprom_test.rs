use embedded_storage::nor_flash::ReadNorFlash;
use kpd_common::layout::RECORD_LEN;

use crate::{
    board::FOUR_KEY,
    flash_test_stub::NorFlashStub,
    settings::{ConfigRecord, ConfigStore},
};

use super::*;

type Stub = NorFlashStub<256>;
type TestEeprom = FlashEeprom<Stub, RECORD_LEN>;

#[test]
fn writes_stay_in_ram_until_commit() {
    let mut eeprom = TestEeprom::new(Stub::default(), 64).unwrap();
    eeprom.write(3, &[1, 2, 3]).unwrap();
    assert!(eeprom.is_dirty());

    let mut buf = [0; 4];
    eeprom.read(2, &mut buf).unwrap();
    assert_eq!(buf, [0xff, 1, 2, 3]);

    let mut flash = eeprom.into_inner();
    let mut raw = [0; 3];
    flash.read(67, &mut raw).unwrap();
    assert_eq!(raw, [0xff; 3]);
}

#[test]
fn commit_programs_flash() {
    let mut eeprom = TestEeprom::new(Stub::default(), 64).unwrap();
    eeprom.write(0, &[9, 8]).unwrap();
    eeprom.commit().unwrap();
    assert!(!eeprom.is_dirty());

    let mut flash = eeprom.into_inner();
    assert_eq!(flash.erases, 1);
    assert_eq!(flash.writes, 1);
    assert_eq!(&flash.buf[64..66], &[9, 8]);
    assert_eq!(flash.buf[63], 0xff);

    flash.buf[65] = 0;
    let mut eeprom = TestEeprom::new(flash, 64).unwrap();
    let mut buf = [0; 2];
    eeprom.read(0, &mut buf).unwrap();
    assert_eq!(buf, [9, 0]);
}

#[test]
fn unchanged_writes_skip_commit() {
    let mut eeprom = TestEeprom::new(Stub::default(), 0).unwrap();
    eeprom.write(5, &[0xff]).unwrap();
    assert!(!eeprom.is_dirty());
    eeprom.commit().unwrap();
    assert_eq!(eeprom.into_inner().erases, 0);
}

#[test]
fn bounds_and_alignment() {
    assert_eq!(
        TestEeprom::new(Stub::default(), 3).err(),
        Some(EepromError::NotAligned)
    );
    assert_eq!(
        TestEeprom::new(Stub::default(), 256).err(),
        Some(EepromError::OutOfBounds)
    );
    assert_eq!(
        FlashEeprom::<Stub, 57>::new(Stub::default(), 0).err(),
        Some(EepromError::NotAligned)
    );

    let mut eeprom = TestEeprom::new(Stub::default(), 0).unwrap();
    assert_eq!(
        eeprom.write(RECORD_LEN as u32 - 1, &[1, 2]),
        Err(EepromError::OutOfBounds)
    );
    let mut buf = [0; 1];
    assert_eq!(
        eeprom.read(RECORD_LEN as u32, &mut buf),
        Err(EepromError::OutOfBounds)
    );
}

#[test]
fn flash_failure_keeps_data_dirty() {
    let mut eeprom = TestEeprom::new(Stub::default(), 0).unwrap();
    eeprom.write(0, &[1]).unwrap();
    eeprom.flash.fail = true;
    assert_eq!(eeprom.commit(), Err(EepromError::Flash));
    assert!(eeprom.is_dirty());
}

#[test]
fn config_store_on_flash() {
    let eeprom = TestEeprom::new(Stub::default(), 128).unwrap();
    let mut store = ConfigStore::new(eeprom);
    let mut config = store.load(&FOUR_KEY).unwrap();
    assert_eq!(config, ConfigRecord::defaults(&FOUR_KEY));
    config.brightness = 10;
    store.save(&config).unwrap();

    let flash = store.into_inner().into_inner();
    assert_eq!(flash.erases, 2);

    let mut store = ConfigStore::new(TestEeprom::new(flash, 128).unwrap());
    assert_eq!(store.load(&FOUR_KEY).unwrap(), config);
}
