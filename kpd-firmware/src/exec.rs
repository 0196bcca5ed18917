use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::{NoopRawMutex, RawMutex};
use embassy_time::{Instant, Timer};
use embedded_io::{Read, ReadReady, Write};
use kpd_common::layout;
use smart_leds::{SmartLedsWrite, RGB8};

use crate::{
    board::BoardProfile,
    config::{ConfigProtocol, Session},
    effects::{EffectEngine, Overlay, MENU_TICK_MS, TICK_MS},
    hid::ReportWriter,
    idle::IdleMonitor,
    info,
    key_reporter::Reporter,
    key_sampler::{KeyInputs, KeyState, Sampler},
    mapper::{Mapper, ReportChannel},
    settings::{ConfigRecord, ConfigStore, Eeprom},
    warn,
};

/// How many key events can be queued for the reporter before they are replaced by a clear.
pub const REPORT_BUFFER_SIZE: usize = 32;
/// Pause between loop iterations.
pub const LOOP_INTERVAL_MS: u64 = 1;

pub type KeypadChannel = ReportChannel<NoopRawMutex, REPORT_BUFFER_SIZE>;

/// The whole keypad: settings, input state and every engine, stepped by one loop.
pub struct Keypad<'c, S, I, L, T, M, const N: usize>
where
    S: Eeprom,
    I: KeyInputs,
    L: SmartLedsWrite<Color = RGB8>,
    T: Read + ReadReady + Write,
    M: RawMutex,
{
    board: &'static BoardProfile,
    config: ConfigRecord,
    store: ConfigStore<S>,
    inputs: I,
    leds: L,
    serial: T,
    keys: KeyState,
    sampler: Sampler,
    mapper: Mapper<'c, M, N>,
    effects: EffectEngine,
    idle: IdleMonitor,
    protocol: ConfigProtocol,
}

impl<'c, S, I, L, T, M, const N: usize> Keypad<'c, S, I, L, T, M, N>
where
    S: Eeprom,
    I: KeyInputs,
    L: SmartLedsWrite<Color = RGB8>,
    T: Read + ReadReady + Write,
    M: RawMutex,
{
    /// Load the settings from `storage`, falling back to the board defaults when it can't be
    /// read.
    pub fn new(
        board: &'static BoardProfile,
        storage: S,
        mut inputs: I,
        leds: L,
        serial: T,
        channel: &'c ReportChannel<M, N>,
        now_ms: u64,
    ) -> Self {
        let mut store = ConfigStore::new(storage);
        let config = match store.load(board) {
            Ok(config) => config,
            Err(err) => {
                warn!("config load failed: {:?}; using defaults", err);
                ConfigRecord::defaults(board)
            }
        };
        info!("keypad {} ready", board.name);
        inputs.set_debounce_ms(config.debounce_ms);
        let mut effects = EffectEngine::new();
        effects.set_ceiling(config.brightness);
        Self {
            board,
            config,
            store,
            inputs,
            leds,
            serial,
            keys: KeyState::default(),
            sampler: Sampler::new(),
            mapper: Mapper::new(channel),
            effects,
            idle: IdleMonitor::new(now_ms),
            protocol: ConfigProtocol::new(),
        }
    }

    pub fn config(&self) -> &ConfigRecord {
        &self.config
    }

    pub fn effects(&self) -> &EffectEngine {
        &self.effects
    }

    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    pub fn inputs(&mut self) -> &mut I {
        &mut self.inputs
    }

    pub fn leds(&mut self) -> &mut L {
        &mut self.leds
    }

    pub fn serial(&mut self) -> &mut T {
        &mut self.serial
    }

    pub fn storage(&mut self) -> &mut S {
        self.store.storage()
    }

    pub fn in_menu(&self) -> bool {
        self.protocol.is_active()
    }

    /// One pass of the main loop.
    pub fn step(&mut self, now_ms: u64) {
        self.sampler.sample(
            now_ms,
            self.board,
            &self.config,
            &mut self.inputs,
            &mut self.keys,
        );

        let interval = if self.protocol.is_active() {
            MENU_TICK_MS
        } else {
            TICK_MS
        };
        self.effects.tick(
            now_ms,
            interval,
            self.board,
            &self.keys,
            &self.config,
            &mut self.leds,
        );

        if self.protocol.is_active() {
            if self.mapper.sync(self.board, &mut self.keys) {
                self.idle.touch(now_ms);
            }
        } else {
            let report = self.mapper.process(self.board, &mut self.keys, &self.config);
            if report.activity {
                self.idle.touch(now_ms);
            }
            self.effects.note_presses(report.presses);
            if let Some(profile) = report.profile {
                self.select_profile(profile);
            }
            if self.mapper.is_selecting() {
                self.effects.set_overlay(Overlay::Profile);
            } else if self.effects.overlay() == Overlay::Profile {
                self.effects.set_overlay(Overlay::None);
            }
        }

        let was_active = self.protocol.is_active();
        let mut session = Session {
            board: self.board,
            config: &mut self.config,
            store: &mut self.store,
            effects: &mut self.effects,
            idle: &mut self.idle,
            sampler: &mut self.sampler,
            inputs: &mut self.inputs,
        };
        if self.protocol.poll(now_ms, &mut self.serial, &mut session) {
            self.idle.touch(now_ms);
        }
        if !was_active && self.protocol.is_active() {
            self.mapper.release_all();
        }

        let ceiling = self.idle.update(now_ms, &self.config);
        self.effects.set_ceiling(ceiling);
    }

    fn select_profile(&mut self, profile: u8) {
        info!("profile {}", profile);
        self.config.active_profile = profile;
        if let Err(err) = self.store.save_byte(layout::ACTIVE_PROFILE, profile) {
            warn!("profile save failed: {:?}", err);
        }
    }

    async fn scan_loop(&mut self) -> ! {
        loop {
            self.step(Instant::now().as_millis());
            Timer::after_millis(LOOP_INTERVAL_MS).await;
        }
    }

    /// Step the keypad every [LOOP_INTERVAL_MS] while `reporter` drains `channel` to the host.
    pub async fn run<W: ReportWriter>(
        &mut self,
        channel: &ReportChannel<M, N>,
        reporter: &mut Reporter<W>,
    ) -> ! {
        match select(self.scan_loop(), reporter.run(channel)).await {
            Either::First(never) => never,
            Either::Second(never) => never,
        }
    }
}

#[cfg(test)]
#[path = "exec_test.rs"]
mod test;
