use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GamePhase {
    Betting,
    Playing,
    Ended,
}

impl GamePhase {
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    pub const fn is_ended(self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl Default for GamePhase {
    fn default() -> Self {
        Self::Betting
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    /// Wrong phase, unknown index or a tile that was already open.
    NoChange,
    Gem { multiplier: f64 },
    HitMine,
    /// Last gem found, the round settled itself at `multiplier`.
    Cleared { multiplier: f64 },
}

/// Reveal/settle state machine for a single round.
#[derive(Clone, Debug, PartialEq)]
pub struct Round {
    config: GameConfig,
    grid: Grid,
    mine_count: TileCount,
    revealed_safe_tiles: TileCount,
    is_lost: bool,
    phase: GamePhase,
    multiplier: f64,
}

impl Round {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            grid: Grid::empty(),
            mine_count: 0,
            revealed_safe_tiles: 0,
            is_lost: false,
            phase: GamePhase::Betting,
            multiplier: 1.0,
        }
    }

    /// Rebuilds a round from stored parts, checking that they agree with each other.
    pub fn restore(
        config: GameConfig,
        phase: GamePhase,
        mine_count: TileCount,
        grid: Grid,
        revealed_safe_tiles: TileCount,
        is_lost: bool,
    ) -> Result<Self> {
        if phase == GamePhase::Betting {
            // playing again drops the grid, a stale count or loss flag is harmless
            return Ok(Self::new(config));
        }

        config
            .validate_mines(mine_count)
            .map_err(|_| GameError::CorruptSnapshot("mine count out of range"))?;
        if grid.len() != usize::from(config.total_tiles) {
            return Err(GameError::CorruptSnapshot("grid size does not match the board"));
        }
        if grid.mine_count() != mine_count {
            return Err(GameError::CorruptSnapshot("grid mine count does not match"));
        }
        if grid.revealed_gem_count() != revealed_safe_tiles {
            return Err(GameError::CorruptSnapshot("revealed gem count does not match"));
        }
        let mine_revealed = grid.iter().any(|tile| tile.is_mine() && tile.revealed);
        if phase == GamePhase::Playing
            && (is_lost || mine_revealed || revealed_safe_tiles >= config.safe_tiles(mine_count))
        {
            return Err(GameError::CorruptSnapshot("round in play is already decided"));
        }

        Ok(Self {
            config,
            grid,
            mine_count,
            revealed_safe_tiles,
            is_lost,
            phase,
            multiplier: config.multiplier(mine_count, revealed_safe_tiles),
        })
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn mine_count(&self) -> TileCount {
        self.mine_count
    }

    pub fn revealed_safe_tiles(&self) -> TileCount {
        self.revealed_safe_tiles
    }

    pub fn is_lost(&self) -> bool {
        self.is_lost
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn safe_tiles(&self) -> TileCount {
        self.config.safe_tiles(self.mine_count)
    }

    /// Multiplier the next gem would pay, `0.0` once the board is cleared.
    pub fn next_multiplier(&self) -> f64 {
        self.config
            .multiplier(self.mine_count, self.revealed_safe_tiles.saturating_add(1))
    }

    /// Puts a freshly generated grid into play.
    pub(crate) fn begin(&mut self, grid: Grid, mine_count: TileCount) {
        debug_assert_eq!(grid.mine_count(), mine_count);
        self.grid = grid;
        self.mine_count = mine_count;
        self.revealed_safe_tiles = 0;
        self.is_lost = false;
        self.multiplier = 1.0;
        self.phase = GamePhase::Playing;
    }

    pub fn reveal(&mut self, index: usize) -> RevealOutcome {
        if !self.phase.is_playing() || !self.grid.reveal(index) {
            return RevealOutcome::NoChange;
        }

        if self.grid[index].is_mine() {
            log::trace!("Tile {} is a mine", index);
            self.is_lost = true;
            self.end_round();
            return RevealOutcome::HitMine;
        }

        self.revealed_safe_tiles += 1;
        self.multiplier = self
            .config
            .multiplier(self.mine_count, self.revealed_safe_tiles);
        log::trace!(
            "Tile {} is a gem, {} found, multiplier {}",
            index,
            self.revealed_safe_tiles,
            self.multiplier
        );

        if self.revealed_safe_tiles == self.safe_tiles() {
            let multiplier = self.multiplier;
            self.end_round();
            RevealOutcome::Cleared { multiplier }
        } else {
            RevealOutcome::Gem {
                multiplier: self.multiplier,
            }
        }
    }

    /// Ends a round in play and returns the multiplier to pay out.
    pub fn settle(&mut self) -> Option<f64> {
        if !self.phase.is_playing() {
            return None;
        }
        self.end_round();
        Some(self.multiplier)
    }

    /// Back to betting after a finished round.
    pub fn reset(&mut self) -> bool {
        if !self.phase.is_ended() {
            return false;
        }
        *self = Self::new(self.config);
        true
    }

    fn end_round(&mut self) {
        self.phase = GamePhase::Ended;
        self.grid.reveal_all_mines();
    }
}
