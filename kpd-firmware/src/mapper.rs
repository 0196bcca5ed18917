use embassy_sync::{blocking_mutex::raw::RawMutex, channel::Channel};
use heapless::Vec;
use kpd_common::{
    keycodes::{self, usage, OutputAction},
    layout::MAX_KEYS,
};

use crate::{
    board::BoardProfile,
    debug,
    key_reporter::KeyEvent,
    key_sampler::KeyState,
    settings::{ConfigRecord, SideButtonMode},
};

/// Bounded queue of key events from the [Mapper] to the reporter.
pub struct ReportChannel<M: RawMutex, const N: usize>(Channel<M, KeyEvent, N>);
impl<M: RawMutex, const N: usize> Default for ReportChannel<M, N> {
    fn default() -> Self {
        Self(Channel::new())
    }
}
impl<M: RawMutex, const N: usize> ReportChannel<M, N> {
    pub async fn receive(&self) -> KeyEvent {
        self.0.receive().await
    }

    pub fn try_receive(&self) -> Option<KeyEvent> {
        self.0.try_receive().ok()
    }

    /// Queue `message`. When the queue is full everything pending is replaced by a
    /// [KeyEvent::Clear] so no key can be left down.
    pub fn report(&self, message: KeyEvent) {
        if self.0.try_send(message).is_err() {
            self.clear_reports();
            let _ = self.0.try_send(KeyEvent::Clear);
        }
    }

    fn clear_reports(&self) {
        self.0.clear();
    }
}

/// What one [Mapper::process] call saw.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Face key presses this tick.
    pub presses: u8,
    /// Any input changed.
    pub activity: bool,
    /// A profile was picked in profile-select.
    pub profile: Option<u8>,
}

/// Turns key transitions into [KeyEvent]s through the mapping table.
pub struct Mapper<'c, M: RawMutex, const N: usize> {
    report_channel: &'c ReportChannel<M, N>,
    /// The output code each held key was pressed with.
    active: [Option<u8>; MAX_KEYS],
    layer: usize,
    mouse_buttons: u8,
    /// Consumer usages held, oldest first.
    media: Vec<u16, MAX_KEYS>,
    side_held: bool,
    escape_down: bool,
    selecting: bool,
    /// Keys pressed while selecting a profile.
    armed: [bool; MAX_KEYS],
}

impl<'c, M: RawMutex, const N: usize> Mapper<'c, M, N> {
    pub fn new(report_channel: &'c ReportChannel<M, N>) -> Self {
        Self {
            report_channel,
            active: [None; MAX_KEYS],
            layer: 0,
            mouse_buttons: 0,
            media: Vec::new(),
            side_held: false,
            escape_down: false,
            selecting: false,
            armed: [false; MAX_KEYS],
        }
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    fn report(&self, message: KeyEvent) {
        self.report_channel.report(message);
    }

    /// Release every HID key, mouse button and consumer usage and forget what each key slot was
    /// pressed with. Keys still held stay silent until pressed again.
    pub fn release_all(&mut self) {
        self.active = [None; MAX_KEYS];
        self.mouse_buttons = 0;
        self.media.clear();
        self.escape_down = false;
        self.report_channel.clear_reports();
        self.report(KeyEvent::Clear);
    }

    /// Accept the current key state without emitting anything. Returns true if any input
    /// changed.
    pub fn sync(&mut self, board: &BoardProfile, keys: &mut KeyState) -> bool {
        let changed = (0..board.input_count()).any(|i| keys.changed(i));
        self.side_held = board.side_input().is_some_and(|side| keys.pressed[side]);
        self.selecting = false;
        self.armed = [false; MAX_KEYS];
        keys.commit();
        changed
    }

    fn resolve_layer(&self, board: &BoardProfile, config: &ConfigRecord) -> usize {
        match config.side_mode() {
            SideButtonMode::Disabled | SideButtonMode::LegacyEscape => 0,
            SideButtonMode::LayerShift => {
                if self.side_held && board.layer_count > 1 {
                    1
                } else {
                    0
                }
            }
            SideButtonMode::Profile => {
                let profile = config.active_profile as usize;
                if profile < board.layer_count {
                    profile
                } else {
                    0
                }
            }
        }
    }

    fn side_switch(&mut self, is_down: bool, config: &ConfigRecord) {
        self.side_held = is_down;
        match config.side_mode() {
            SideButtonMode::Disabled | SideButtonMode::LayerShift => {}
            SideButtonMode::Profile => {
                self.selecting = is_down;
                self.armed = [false; MAX_KEYS];
                if is_down {
                    self.release_all();
                }
            }
            SideButtonMode::LegacyEscape => {
                if is_down != self.escape_down {
                    self.escape_down = is_down;
                    self.report(KeyEvent::Basic(usage::ESCAPE, is_down));
                }
            }
        }
    }

    /// Emit events for every input that changed since the last call, then mark the state seen.
    pub fn process(
        &mut self,
        board: &BoardProfile,
        keys: &mut KeyState,
        config: &ConfigRecord,
    ) -> TickReport {
        let mut ans = TickReport::default();

        if let Some(side) = board.side_input() {
            if keys.changed(side) {
                ans.activity = true;
                self.side_switch(keys.pressed[side], config);
            }
        }

        let layer = self.resolve_layer(board, config);
        if layer != self.layer {
            debug!("layer {} -> {}", self.layer, layer);
            self.layer = layer;
            self.release_all();
        }

        for x in 0..board.key_count {
            if !keys.changed(x) {
                continue;
            }
            ans.activity = true;
            if keys.pressed[x] {
                ans.presses = ans.presses.saturating_add(1);
                if self.selecting {
                    self.armed[x] = true;
                } else if self.active[x].is_none() {
                    let code = config.mapping[layer][x];
                    self.active[x] = Some(code);
                    self.emit(code, true);
                }
            } else if self.armed[x] {
                self.armed[x] = false;
                if x < board.layer_count && x != config.active_profile as usize {
                    ans.profile = Some(x as u8);
                }
            } else if let Some(code) = self.active[x].take() {
                self.emit(code, false);
            }
        }

        keys.commit();
        ans
    }

    fn emit(&mut self, code: u8, is_down: bool) {
        match keycodes::resolve(code) {
            OutputAction::None => {}
            OutputAction::Literal(c) => match keycodes::ascii_usage(c) {
                Some((key, true)) => self.report(KeyEvent::Shifted(key, is_down)),
                Some((key, false)) => self.report(KeyEvent::Basic(key, is_down)),
                None => {}
            },
            OutputAction::Keyboard(key) => self.report(KeyEvent::Basic(key, is_down)),
            OutputAction::Media(media) => {
                if is_down {
                    if self.media.is_full() {
                        self.media.remove(0);
                    }
                    let _ = self.media.push(media);
                } else if let Some(i) = self.media.iter().rposition(|m| *m == media) {
                    self.media.remove(i);
                }
                let usage = self.media.last().copied().unwrap_or(0);
                self.report(KeyEvent::Consumer(usage));
            }
            OutputAction::Mouse(bit) => {
                if is_down {
                    self.mouse_buttons |= bit;
                } else {
                    self.mouse_buttons &= !bit;
                }
                self.report(KeyEvent::MouseButton(self.mouse_buttons));
            }
        }
    }
}

#[cfg(test)]
#[path = "mapper_test.rs"]
mod test;
