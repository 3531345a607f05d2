use clap::{Parser, Subcommand};
use virtual_mines_core::{Coins, TileCount};

/// One line typed at the prompt. Slots and tiles are numbered from 1.
#[derive(Parser, Debug, PartialEq)]
#[command(no_binary_name = true, disable_help_flag = true, disable_help_subcommand = true)]
pub struct Line {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// List the save slots
    Slots,
    /// Open a save slot
    Load { slot: usize },
    /// Empty a save slot
    Delete { slot: usize },
    /// Change the bet for the next round
    Bet { amount: Coins },
    /// Change the mine count for the next round
    Mines { count: TileCount },
    /// Stake the bet and deal a board, optionally overriding bet and mines
    Start {
        bet: Option<Coins>,
        mines: Option<TileCount>,
    },
    /// Open a tile
    #[command(alias = "r")]
    Reveal { tile: usize },
    /// Collect the current payout
    #[command(alias = "cash")]
    Cashout,
    /// Back to betting after a round
    Again,
    /// Show the board and balance
    #[command(alias = "s")]
    Status,
    /// Save the session and go back to the slot list
    Exit,
    /// Save and leave the program
    #[command(alias = "q")]
    Quit,
    /// List commands
    Help,
}

impl Line {
    pub fn parse_line(input: &str) -> Result<Self, clap::Error> {
        Self::try_parse_from(input.split_whitespace())
    }
}

/// Converts a 1-based number typed by the player into an index.
pub fn to_index(number: usize) -> Option<usize> {
    number.checked_sub(1)
}
