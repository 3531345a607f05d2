use thiserror::Error;

use crate::{Coins, TileCount};

#[derive(Error, Debug, Copy, Clone, PartialEq)]
pub enum GameError {
    #[error("Bet of {bet} is not playable with a balance of {balance}")]
    InvalidBet { bet: Coins, balance: Coins },
    #[error("{mines} mines do not fit a board of {total_tiles} tiles")]
    InvalidMineCount {
        mines: TileCount,
        total_tiles: TileCount,
    },
    #[error("A round is in progress, bet and mines are locked")]
    RoundInProgress,
    #[error("No save slot is loaded")]
    NoActiveSlot,
    #[error("Slot {0} does not exist")]
    OutOfRangeSlot(usize),
    #[error("Stored session is inconsistent: {0}")]
    CorruptSnapshot(&'static str),
}

pub type Result<T> = core::result::Result<T, GameError>;
