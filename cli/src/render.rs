use std::fmt::Write;

use virtual_mines_core::{GamePhase, Grid, RoundResult, SessionStatus, SlotTable, TileValue};

/// Smallest square side that fits `len` tiles.
fn columns(len: usize) -> usize {
    let mut side = 1;
    while side * side < len {
        side += 1;
    }
    side
}

pub fn board(grid: &Grid) -> String {
    if grid.is_empty() {
        return String::from("(no board, place a bet with `start`)\n");
    }
    let width = grid.len().to_string().len().max(2);
    let columns = columns(grid.len());

    let mut out = String::new();
    for (i, tile) in grid.iter().enumerate() {
        let cell = match (tile.revealed, tile.value) {
            (false, _) => (i + 1).to_string(),
            (true, TileValue::Gem) => String::from("G"),
            (true, TileValue::Mine) => String::from("*"),
        };
        let _ = write!(out, "[{cell:>width$}]");
        if (i + 1) % columns == 0 {
            out.push('\n');
        }
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

pub fn status(status: &SessionStatus) -> String {
    let snapshot = &status.snapshot;
    let mut out = format!(
        "Balance {:.2} | bet {:.2} | {} mines | {:?}\n",
        snapshot.balance, snapshot.bet_amount, snapshot.mine_count, snapshot.game_state
    );
    match snapshot.game_state {
        GamePhase::Playing => {
            let _ = writeln!(
                out,
                "Multiplier x{} | payout {:.2} | next gem pays {:.2}{}",
                status.multiplier,
                status.current_payout,
                status.next_payout,
                if status.can_cash_out {
                    ""
                } else {
                    " | find a gem before cashing out"
                }
            );
        }
        GamePhase::Ended => {
            if let Some(result) = status.result {
                out.push_str(&round_result(result));
                out.push('\n');
            }
        }
        GamePhase::Betting => {}
    }
    out
}

pub fn round_result(result: RoundResult) -> String {
    match result {
        RoundResult::Lost { bet } => format!("Boom! You hit a mine and lost {bet:.2} coins."),
        RoundResult::Won { payout, multiplier } => {
            format!("Cashed out! You won {payout:.2} coins at x{multiplier}.")
        }
    }
}

pub fn slots(table: &SlotTable) -> String {
    let mut out = String::new();
    for (i, slot) in table.iter().enumerate() {
        let _ = match slot {
            Some(slot) => writeln!(
                out,
                "Slot {:>2}: balance {:.2}, {:?}, saved {}",
                i + 1,
                slot.state.balance,
                slot.state.game_state,
                slot.last_saved
            ),
            None => writeln!(out, "Slot {:>2}: empty", i + 1),
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use virtual_mines_core::Tile;

    #[test]
    fn board_wraps_into_a_square() {
        let grid = Grid::from_tiles(vec![
            Tile::hidden(TileValue::Gem),
            Tile {
                value: TileValue::Gem,
                revealed: true,
            },
            Tile {
                value: TileValue::Mine,
                revealed: true,
            },
            Tile::hidden(TileValue::Gem),
        ]);

        assert_eq!(board(&grid), "[ 1][ G]\n[ *][ 4]\n");
    }

    #[test]
    fn empty_table_lists_every_slot() {
        let text = slots(&SlotTable::default());
        assert_eq!(text.lines().count(), 10);
        assert!(text.starts_with("Slot  1: empty"));
    }

    #[test]
    fn result_messages() {
        assert_eq!(
            round_result(RoundResult::Lost { bet: 10.0 }),
            "Boom! You hit a mine and lost 10.00 coins."
        );
        assert_eq!(
            round_result(RoundResult::Won {
                payout: 11.25,
                multiplier: 1.125
            }),
            "Cashed out! You won 11.25 coins at x1.125."
        );
    }
}
