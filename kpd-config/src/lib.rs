use kpd_common::{
    keycodes::{self, CodeName, SPECIAL_KEYS},
    CONFIG_VERSION,
};
use kpd_firmware::{
    board::BoardProfile,
    settings::{ConfigRecord, LedMode, SideButtonMode},
};

pub mod image;
pub mod session;

/// One line per catalog entry whose name contains `pattern` (case insensitive). A pattern
/// starting with `:` selects by catalog index instead.
pub fn list_keycodes(pattern: Option<&str>, verbose: bool) -> Vec<String> {
    let index = pattern
        .and_then(|p| p.strip_prefix(':'))
        .and_then(|i| i.parse::<usize>().ok());
    let pattern = pattern.map(str::to_lowercase);
    SPECIAL_KEYS
        .iter()
        .enumerate()
        .filter(|(i, key)| match (index, &pattern) {
            (Some(index), _) => *i == index,
            (None, Some(pattern)) => key.name.to_lowercase().contains(pattern.as_str()),
            (None, None) => true,
        })
        .map(|(i, key)| {
            if verbose {
                let code = keycodes::special_code(i).unwrap_or_default();
                format!(":{:<3} {:3} {:?}", i, code, key.action)
            } else {
                format!(":{:<3} {}", i, key.name)
            }
        })
        .collect()
}

/// Human readable dump of a settings record.
pub fn describe(board: &BoardProfile, config: &ConfigRecord) -> String {
    let led_mode = LedMode::from_byte(config.led_mode).map_or("unknown", LedMode::name);
    let side_mode =
        SideButtonMode::from_byte(config.side_mode).map_or("unknown", SideButtonMode::name);
    let mut lines = vec![
        format!("board:          {}", board.name),
        format!("version:        {}", CONFIG_VERSION),
        format!("brightness:     {}", config.brightness),
        format!("led mode:       {} ({})", led_mode, config.led_mode),
        format!("idle timeout:   {} min", config.idle_minutes),
        format!("side button:    {} ({})", side_mode, config.side_mode),
        format!("active profile: {}", config.active_profile),
    ];
    if board.has_touch() {
        let thresholds = (0..board.input_count())
            .map(|i| config.threshold(i).to_string())
            .collect::<Vec<_>>();
        lines.push(format!("thresholds:     {}", thresholds.join(" ")));
    } else {
        lines.push(format!("debounce:       {} ms", config.debounce_ms));
    }
    let hues = config.hues[..board.key_count]
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>();
    lines.push(format!("hues:           {}", hues.join(" ")));
    for (layer, codes) in config.mapping[..board.layer_count].iter().enumerate() {
        let names = codes[..board.key_count]
            .iter()
            .map(|c| CodeName(*c).to_string())
            .collect::<Vec<_>>();
        lines.push(format!("layer {}:        {}", layer, names.join(" | ")));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod test;
