use core::ops::Index;
use serde::{Deserialize, Serialize};

use crate::TileCount;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TileValue {
    Gem,
    Mine,
}

impl TileValue {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }
}

/// A single board tile. `revealed` only ever goes from `false` to `true`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub value: TileValue,
    pub revealed: bool,
}

impl Tile {
    pub const fn hidden(value: TileValue) -> Self {
        Self {
            value,
            revealed: false,
        }
    }

    pub const fn is_mine(&self) -> bool {
        self.value.is_mine()
    }
}

/// Ordered tiles of one round, created fresh when the round starts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    tiles: Vec<Tile>,
}

impl Grid {
    pub fn from_tiles(tiles: Vec<Tile>) -> Self {
        Self { tiles }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn mine_count(&self) -> TileCount {
        self.count_where(|tile| tile.is_mine())
    }

    pub fn gem_count(&self) -> TileCount {
        self.count_where(|tile| !tile.is_mine())
    }

    pub fn revealed_gem_count(&self) -> TileCount {
        self.count_where(|tile| tile.revealed && !tile.is_mine())
    }

    /// Flips the tile at `index` to revealed. Returns `false` when it was already
    /// revealed or does not exist.
    pub fn reveal(&mut self, index: usize) -> bool {
        match self.tiles.get_mut(index) {
            Some(tile) if !tile.revealed => {
                tile.revealed = true;
                true
            }
            _ => false,
        }
    }

    /// Reveals every mine, leaving hidden gems hidden.
    pub fn reveal_all_mines(&mut self) {
        for tile in self.tiles.iter_mut().filter(|tile| tile.is_mine()) {
            tile.revealed = true;
        }
    }

    fn count_where(&self, predicate: impl Fn(&Tile) -> bool) -> TileCount {
        self.tiles
            .iter()
            .filter(|&tile| predicate(tile))
            .count()
            .try_into()
            .unwrap_or(TileCount::MAX)
    }
}

impl Index<usize> for Grid {
    type Output = Tile;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tiles[index]
    }
}
