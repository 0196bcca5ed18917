//! Byte offsets of the persisted settings record.
//!
//! Every scalar is a single byte. The per-key runs are sized for the largest supported board so
//! the layout does not change between boards.

pub const MAX_KEYS: usize = 8;
/// Face keys plus the side button.
pub const MAX_INPUTS: usize = MAX_KEYS + 1;
pub const MAX_LAYERS: usize = 4;

pub const VERSION: usize = 0;
pub const BRIGHTNESS: usize = 1;
pub const LED_MODE: usize = 2;
pub const IDLE_MINUTES: usize = 3;
pub const SIDE_MODE: usize = 4;
pub const ACTIVE_PROFILE: usize = 5;
pub const DEBOUNCE_MS: usize = 6;

pub const HUES: usize = 7;
pub const THRESHOLDS: usize = HUES + MAX_KEYS;
pub const MAPPING: usize = THRESHOLDS + MAX_INPUTS;
pub const RECORD_LEN: usize = MAPPING + MAX_LAYERS * MAX_KEYS;

/// Stored thresholds are raw touch counts divided by this.
pub const THRESHOLD_SCALE: u16 = 4;

pub const fn mapping_offset(layer: usize, key: usize) -> usize {
    MAPPING + layer * MAX_KEYS + key
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn offsets() {
        assert_eq!(HUES, 7);
        assert_eq!(THRESHOLDS, 15);
        assert_eq!(MAPPING, 24);
        assert_eq!(RECORD_LEN, 56);
        assert_eq!(mapping_offset(1, 2), 34);
        assert_eq!(mapping_offset(MAX_LAYERS - 1, MAX_KEYS - 1), RECORD_LEN - 1);
    }
}
