use crate::{debug, settings::ConfigRecord};

pub const MS_PER_MINUTE: u64 = 60_000;

/// Dims the LEDs once no input has changed for the configured number of minutes. A timeout of
/// zero never dims.
#[derive(Debug, Default)]
pub struct IdleMonitor {
    last_activity: u64,
    idle: bool,
}

impl IdleMonitor {
    pub fn new(now_ms: u64) -> Self {
        Self {
            last_activity: now_ms,
            idle: false,
        }
    }

    /// Record activity at `now_ms`.
    pub fn touch(&mut self, now_ms: u64) {
        self.last_activity = now_ms;
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    /// The brightness ceiling for `now_ms`: 0 while idle, otherwise the configured brightness.
    pub fn update(&mut self, now_ms: u64, config: &ConfigRecord) -> u8 {
        let timeout = config.idle_minutes as u64 * MS_PER_MINUTE;
        let idle = timeout != 0 && now_ms.wrapping_sub(self.last_activity) >= timeout;
        if idle != self.idle {
            debug!("idle {}", idle);
            self.idle = idle;
        }
        if idle {
            0
        } else {
            config.brightness
        }
    }
}
