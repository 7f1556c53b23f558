use crate::grid::{Grid, Position};
use crate::rules::GameRules;
use std::iter;

/// The gameplay side of the board: a grid, its rules and the generation count.
#[derive(Debug, Clone)]
pub struct Conway {
    grid: Grid,
    rules: GameRules,
    generation: u64,
    // One flag per cell. All false between updates.
    visited: Vec<bool>,
}

impl Conway {
    pub fn new(shape: (u32, u32)) -> Self {
        Self::with_rules(shape, GameRules::conway())
    }

    pub fn with_rules(shape: (u32, u32), rules: GameRules) -> Self {
        let grid = Grid::new(shape);
        let visited = vec![false; grid.area()];
        Self {
            grid,
            rules,
            generation: 0,
            visited,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rules(&self) -> GameRules {
        self.rules
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// User edit: flips every in-bounds position.
    pub fn toggle<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = Position>,
    {
        self.grid.toggle(positions);
    }

    pub fn resize(&mut self, shape: (u32, u32)) {
        self.grid.resize(shape);
        self.visited = vec![false; self.grid.area()];
    }

    /// Throws the board away and starts over at generation 0 with the same shape.
    pub fn reset(&mut self) {
        *self = Self::with_rules(self.grid.shape(), self.rules);
    }

    /// Advances the board by one generation.
    ///
    /// Only alive cells and their neighbours are evaluated: any other cell is
    /// dead with no alive neighbour and stays dead.
    pub fn update(&mut self) {
        self.generation += 1;

        let candidates = self.collect_candidates();
        let grid = &self.grid;
        let rules = self.rules;
        let (alive, dead): (Vec<Position>, Vec<Position>) =
            candidates.iter().partition(|&&position| {
                rules.next_state(grid.is_alive(position), grid.count_alive_neighbours(position))
            });

        for &position in &alive {
            self.grid.set(position, true);
        }
        for &position in &dead {
            self.grid.set(position, false);
        }
        for &position in &candidates {
            if let Some(index) = self.grid.index(position) {
                self.visited[index] = false;
            }
        }

        debug_assert_eq!(self.grid.alive_count(), alive.len());
    }

    /// Alive cells and their neighbours, each listed once.
    fn collect_candidates(&mut self) -> Vec<Position> {
        let grid = &self.grid;
        let visited = &mut self.visited;
        let mut candidates = Vec::with_capacity(grid.alive_count() * 9);

        for &position in grid.alive_positions() {
            for candidate in iter::once(position).chain(grid.neighbours(position)) {
                let Some(index) = grid.index(candidate) else {
                    continue;
                };
                if !visited[index] {
                    visited[index] = true;
                    candidates.push(candidate);
                }
            }
        }

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::assert_index_consistent;
    use crate::patterns::presets::Preset;
    use std::collections::HashSet;

    fn alive(conway: &Conway) -> HashSet<Position> {
        conway.grid().alive_positions().clone()
    }

    fn set_of(positions: &[Position]) -> HashSet<Position> {
        positions.iter().copied().collect()
    }

    #[test]
    fn empty_board_stays_empty() {
        let mut conway = Conway::new((8, 8));
        conway.update();
        assert_eq!(conway.generation(), 1);
        assert_eq!(conway.grid().alive_count(), 0);
        assert!(conway.grid().iter().all(|(_, cell)| !cell.is_alive()));
    }

    #[test]
    fn lone_cell_dies() {
        let mut conway = Conway::new((5, 5));
        conway.toggle([(2, 2)]);
        conway.update();
        assert!(alive(&conway).is_empty());
        assert_index_consistent(conway.grid());
    }

    #[test]
    fn block_is_still_life() {
        let mut conway = Conway::new((6, 6));
        let block = set_of(&[(2, 2), (3, 2), (2, 3), (3, 3)]);
        conway.toggle(block.iter().copied());
        for _ in 0..10 {
            conway.update();
            assert_eq!(alive(&conway), block);
        }
        assert_eq!(conway.generation(), 10);
    }

    #[test]
    fn blinker_oscillates() {
        let mut conway = Conway::new((3, 3));
        let vertical = set_of(&[(1, 0), (1, 1), (1, 2)]);
        let horizontal = set_of(&[(0, 1), (1, 1), (2, 1)]);
        conway.toggle(vertical.iter().copied());

        conway.update();
        assert_eq!(alive(&conway), horizontal);
        conway.update();
        assert_eq!(alive(&conway), vertical);
        assert_index_consistent(conway.grid());
    }

    #[test]
    fn glider_moves_diagonally() {
        let mut conway = Conway::new((12, 12));
        let glider: Vec<Position> = Preset::Glider.offsets().to_vec();
        conway.toggle(glider.iter().map(|&(i, j)| (i + 2, j + 2)));
        for _ in 0..4 {
            conway.update();
        }
        let expected: HashSet<Position> = glider.iter().map(|&(i, j)| (i + 3, j + 3)).collect();
        assert_eq!(alive(&conway), expected);
    }

    #[test]
    fn board_edges_do_not_wrap() {
        // A blinker on the top edge loses the half that would leave the board.
        let mut conway = Conway::new((3, 3));
        conway.toggle([(0, 0), (1, 0), (2, 0)]);
        conway.update();
        assert_eq!(alive(&conway), set_of(&[(1, 0), (1, 1)]));
    }

    #[test]
    fn reset_clears_board_and_generation() {
        let mut conway = Conway::new((4, 3));
        conway.toggle([(1, 1), (2, 1), (1, 2), (2, 2)]);
        conway.update();
        conway.reset();
        assert_eq!(conway.generation(), 0);
        assert_eq!(conway.grid().alive_count(), 0);
        assert_eq!(conway.grid().shape(), (4, 3));
    }

    #[test]
    fn zero_sized_board_updates() {
        let mut conway = Conway::new((0, 0));
        conway.toggle([(0, 0)]);
        conway.update();
        assert_eq!(conway.generation(), 1);
        assert_eq!(conway.grid().alive_count(), 0);
    }

    #[test]
    fn index_consistent_across_mixed_operations() {
        let mut conway = Conway::new((16, 16));
        conway.toggle(Preset::GosperGliderGun.offsets().iter().copied());
        conway.toggle(Preset::LightweightSpaceship.offsets().iter().map(|&(i, j)| (i + 2, j + 11)));
        for step in 0..30 {
            conway.update();
            assert_index_consistent(conway.grid());
            if step == 10 {
                conway.resize((10, 14));
                assert_index_consistent(conway.grid());
            }
            if step == 20 {
                conway.resize((24, 24));
                conway.toggle([(20, 20), (21, 20), (22, 20)]);
                assert_index_consistent(conway.grid());
            }
        }
        assert_eq!(conway.generation(), 30);
    }

    #[test]
    fn resize_keeps_engine_usable() {
        let mut conway = Conway::new((3, 3));
        conway.toggle([(1, 0), (1, 1), (1, 2)]);
        conway.resize((6, 6));
        conway.update();
        assert_eq!(alive(&conway), set_of(&[(0, 1), (1, 1), (2, 1)]));
    }
}
