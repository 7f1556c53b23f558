//! Plaintext `.cells` decoder. See <https://conwaylife.com/wiki/Plaintext>.

use crate::grid::Position;

const COMMENT: char = '!';
const ALIVE: char = 'O';

/// Offsets of every `O`, with rows counted from the first non-comment line.
pub fn decode(text: &str) -> impl Iterator<Item = Position> + '_ {
    text.lines()
        .filter(|line| !line.starts_with(COMMENT))
        .enumerate()
        .flat_map(|(j, line)| {
            line.chars()
                .enumerate()
                .filter(|&(_, ch)| ch == ALIVE)
                .map(move |(i, _)| (i as i32, j as i32))
        })
}
