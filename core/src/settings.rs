//! Tunables that are not part of the board math.
//!
//! Every section deserializes with defaults for missing keys, so a partial
//! settings file is always accepted.

use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Starting point of a new or empty save slot.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionDefaults {
    pub balance: Coins,
    pub bet_amount: Coins,
    pub mine_count: TileCount,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            balance: 1000.0,
            bet_amount: 10.0,
            mine_count: 3,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutosaveConfig {
    /// Seconds between background saves. Zero turns autosave off.
    pub interval_secs: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self { interval_secs: 60 }
    }
}

impl AutosaveConfig {
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_secs > 0).then(|| Duration::from_secs(self.interval_secs))
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub game: GameConfig,
    pub defaults: SessionDefaults,
    pub autosave: AutosaveConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"game":{"totalTiles":36},"autosave":{"intervalSecs":0}}"#)
                .unwrap();

        assert_eq!(settings.game.total_tiles, 36);
        assert_eq!(settings.game.house_edge, DEFAULT_HOUSE_EDGE);
        assert_eq!(settings.defaults, SessionDefaults::default());
        assert_eq!(settings.autosave.interval(), None);
    }

    #[test]
    fn default_autosave_is_one_minute() {
        assert_eq!(
            AutosaveConfig::default().interval(),
            Some(Duration::from_secs(60))
        );
    }
}
