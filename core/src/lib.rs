use core::ops::RangeInclusive;
use serde::{Deserialize, Serialize};

pub use autosave::*;
pub use controller::*;
pub use error::*;
pub use generator::*;
pub use payout::*;
pub use round::*;
pub use session::*;
pub use settings::*;
pub use snapshot::*;
pub use store::*;
pub use tile::*;
pub use types::*;

mod autosave;
mod controller;
mod error;
mod generator;
mod payout;
mod round;
mod session;
mod settings;
mod snapshot;
mod store;
mod tile;
mod types;

/// A 5x5 board.
pub const DEFAULT_TOTAL_TILES: TileCount = 25;

/// Largest board whose binomials stay finite in `f64` for every mine count.
pub const MAX_TOTAL_TILES: TileCount = 400;

/// Fraction of the fair-odds multiplier paid back to the player.
pub const DEFAULT_HOUSE_EDGE: f64 = 0.99;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub total_tiles: TileCount,
    pub house_edge: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked(DEFAULT_TOTAL_TILES, DEFAULT_HOUSE_EDGE)
    }
}

impl GameConfig {
    pub const fn new_unchecked(total_tiles: TileCount, house_edge: f64) -> Self {
        Self {
            total_tiles,
            house_edge,
        }
    }

    /// Builds a config that can always hold at least one mine and one gem, on at
    /// most [`MAX_TOTAL_TILES`] tiles.
    ///
    /// A house edge outside `(0, 1]` is replaced with [`DEFAULT_HOUSE_EDGE`].
    pub fn new(total_tiles: TileCount, house_edge: f64) -> Self {
        let total_tiles = if total_tiles > MAX_TOTAL_TILES {
            log::warn!(
                "Board of {} tiles too large, using {}",
                total_tiles,
                MAX_TOTAL_TILES
            );
            MAX_TOTAL_TILES
        } else {
            total_tiles.max(2)
        };
        let house_edge = if house_edge.is_finite() && house_edge > 0.0 && house_edge <= 1.0 {
            house_edge
        } else {
            log::warn!(
                "House edge {} out of range, using {}",
                house_edge,
                DEFAULT_HOUSE_EDGE
            );
            DEFAULT_HOUSE_EDGE
        };
        Self::new_unchecked(total_tiles, house_edge)
    }

    /// Re-applies the clamping rules of [`GameConfig::new`], useful after deserializing.
    pub fn sanitized(self) -> Self {
        Self::new(self.total_tiles, self.house_edge)
    }

    pub fn min_mines(&self) -> TileCount {
        1
    }

    pub fn max_mines(&self) -> TileCount {
        self.total_tiles.saturating_sub(1)
    }

    /// Mine counts a round may be started with.
    pub fn mine_range(&self) -> RangeInclusive<TileCount> {
        self.min_mines()..=self.max_mines()
    }

    pub fn validate_mines(&self, mines: TileCount) -> Result<TileCount> {
        if self.mine_range().contains(&mines) {
            Ok(mines)
        } else {
            Err(GameError::InvalidMineCount {
                mines,
                total_tiles: self.total_tiles,
            })
        }
    }

    pub const fn safe_tiles(&self, mines: TileCount) -> TileCount {
        self.total_tiles.saturating_sub(mines)
    }

    /// Payout multiplier after `revealed` gems with `mines` mines on this board.
    pub fn multiplier(&self, mines: TileCount, revealed: TileCount) -> f64 {
        multiplier_with_edge(self.house_edge, self.total_tiles, mines, revealed)
    }
}
