use embassy_sync::blocking_mutex::raw::RawMutex;
use kpd_common::keycodes::usage::{LEFT_SHIFT, MODIFIER_MAX, MODIFIER_MIN};

use crate::{
    add_key_bit, del_key_bit,
    hid::{ReportWriter, CONSUMER_REPORT_ID, KEYBOARD_REPORT_ID, MAX_REPORT_LEN, MOUSE_REPORT_ID},
    mapper::ReportChannel,
    warn,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyEvent {
    /// Keyboard usage down or up.
    Basic(u8, bool),
    /// Keyboard usage that needs Shift held with it.
    Shifted(u8, bool),
    /// Consumer usage; 0 releases.
    Consumer(u16),
    /// The full mouse button mask.
    MouseButton(u8),
    /// Release everything.
    Clear,
}

pub struct Reporter<W: ReportWriter> {
    writer: W,
    keyboard_report: [u8; MAX_REPORT_LEN],
    modifiers: u8,
    shift_count: u8,
}

impl<W: ReportWriter> Reporter<W> {
    pub fn new(writer: W) -> Self {
        let mut keyboard_report = [0; MAX_REPORT_LEN];
        keyboard_report[0] = KEYBOARD_REPORT_ID;
        Self {
            writer,
            keyboard_report,
            modifiers: 0,
            shift_count: 0,
        }
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Forward events from `channel` for ever.
    pub async fn run<M: RawMutex, const N: usize>(&mut self, channel: &ReportChannel<M, N>) -> ! {
        loop {
            self.report(channel.receive().await).await;
        }
    }

    async fn write_report(&mut self, report: &[u8]) {
        if let Err(e) = self.writer.write_report(report).await {
            warn!("Failed to send report: {:?}", e);
        }
    }

    async fn write_keyboard_report(&mut self) {
        let shift = if self.shift_count > 0 {
            1 << (LEFT_SHIFT - MODIFIER_MIN)
        } else {
            0
        };
        self.keyboard_report[1] = self.modifiers | shift;
        let report = self.keyboard_report;
        self.write_report(&report).await;
    }

    async fn basic(&mut self, key: u8, is_down: bool) {
        if is_down {
            if !self.add_key(key) {
                // already down; release first so the host sees a new press
                self.remove_key(key);
                self.write_keyboard_report().await;
                self.add_key(key);
            }
        } else {
            self.remove_key(key)
        };

        self.write_keyboard_report().await;
    }

    pub async fn report(&mut self, msg: KeyEvent) {
        match msg {
            KeyEvent::Basic(key, is_down) => self.basic(key, is_down).await,
            KeyEvent::Shifted(key, is_down) => {
                if is_down {
                    self.shift_count = self.shift_count.saturating_add(1);
                } else {
                    self.shift_count = self.shift_count.saturating_sub(1);
                }
                self.basic(key, is_down).await;
            }
            KeyEvent::Consumer(usage) => {
                let [lo, hi] = usage.to_le_bytes();
                self.write_report(&[CONSUMER_REPORT_ID, lo, hi]).await;
            }
            KeyEvent::MouseButton(buttons) => {
                self.write_report(&[MOUSE_REPORT_ID, buttons, 0, 0, 0, 0]).await;
            }
            KeyEvent::Clear => {
                self.keyboard_report.iter_mut().skip(1).for_each(|b| *b = 0);
                self.modifiers = 0;
                self.shift_count = 0;
                self.write_report(&[MOUSE_REPORT_ID, 0, 0, 0, 0, 0]).await;
                self.write_report(&[CONSUMER_REPORT_ID, 0, 0]).await;
                self.write_keyboard_report().await;
            }
        }
    }

    fn add_key(&mut self, key: u8) -> bool {
        if (MODIFIER_MIN..=MODIFIER_MAX).contains(&key) {
            let bit = 1 << (key - MODIFIER_MIN);
            let old = self.modifiers;
            self.modifiers |= bit;
            return old & bit == 0;
        }
        if key > 3 {
            add_key_bit(&mut self.keyboard_report[2..], key)
        } else {
            true
        }
    }

    fn remove_key(&mut self, key: u8) {
        if (MODIFIER_MIN..=MODIFIER_MAX).contains(&key) {
            self.modifiers &= !(1 << (key - MODIFIER_MIN));
            return;
        }
        if key > 3 {
            del_key_bit(&mut self.keyboard_report[2..], key);
        }
    }
}

#[cfg(test)]
#[path = "key_reporter_test.rs"]
mod test;
