use crate::*;
pub use random::*;

mod random;

/// Supplier of uniformly distributed values in `[0, 1)`.
pub trait UniformSource {
    fn next_unit(&mut self) -> f64;
}

/// Lays out `mines` mines among `total_tiles` tiles, every arrangement equally likely.
///
/// Mines are placed at the front and then shuffled with Fisher-Yates, walking
/// from the last index down to 1.
pub fn create_grid(
    total_tiles: TileCount,
    mines: TileCount,
    source: &mut (impl UniformSource + ?Sized),
) -> Result<Grid> {
    if mines == 0 || mines >= total_tiles {
        return Err(GameError::InvalidMineCount { mines, total_tiles });
    }

    let mut tiles: Vec<Tile> = (0..total_tiles)
        .map(|i| {
            Tile::hidden(if i < mines {
                TileValue::Mine
            } else {
                TileValue::Gem
            })
        })
        .collect();

    for i in (1..tiles.len()).rev() {
        let j = pick_index(source.next_unit(), i);
        tiles.swap(i, j);
    }

    log::trace!("Generated grid with {} mines in {} tiles", mines, total_tiles);
    Ok(Grid::from_tiles(tiles))
}

/// Maps a unit value onto `0..=max`, clamping sources that misbehave at the edges.
fn pick_index(unit: f64, max: usize) -> usize {
    let scaled = (unit * (max + 1) as f64).floor();
    if scaled.is_nan() || scaled < 0.0 {
        0
    } else {
        (scaled as usize).min(max)
    }
}
