use std::collections::HashSet;

/// A cell coordinate `(i, j)`: `i` is the column, `j` the row, growing downward.
///
/// Signed so that pattern offsets and cursor positions left of or above the
/// board can be expressed and then filtered by [`Grid::validate`].
pub type Position = (i32, i32);

/// Moore neighbourhood in N, NE, E, SE, S, SW, W, NW order. The centre is not part of it.
const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cell {
    #[default]
    Dead,
    Alive,
}

impl Cell {
    pub fn is_alive(self) -> bool {
        self == Cell::Alive
    }

    fn from_alive(alive: bool) -> Self {
        if alive {
            Cell::Alive
        } else {
            Cell::Dead
        }
    }
}

/// A bounded board of cells plus an index of the alive positions.
///
/// Cell storage is private: `toggle`, `set` and `resize` are the only
/// mutators, and each of them keeps the index equal to the set of alive cells.
#[derive(Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    alive: HashSet<Position>,
}

impl Grid {
    /// An all-dead grid of `(width, height)` cells. Either dimension may be zero.
    pub fn new((width, height): (u32, u32)) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Dead; width as usize * height as usize],
            alive: HashSet::new(),
        }
    }

    /// A grid covering a window of `window` pixels with square cells of `cell_size` pixels.
    pub fn for_window(window: (u32, u32), cell_size: u32) -> Self {
        Self::new(Self::shape_for_window(window, cell_size))
    }

    /// Number of whole cells that fit along each axis. A zero cell size yields an empty shape.
    pub fn shape_for_window((width, height): (u32, u32), cell_size: u32) -> (u32, u32) {
        (
            width.checked_div(cell_size).unwrap_or(0),
            height.checked_div(cell_size).unwrap_or(0),
        )
    }

    pub fn shape(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn area(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, (i, j): Position) -> bool {
        i >= 0 && j >= 0 && (i as i64) < self.width as i64 && (j as i64) < self.height as i64
    }

    /// Flat arena index of an in-bounds position.
    pub fn index(&self, position: Position) -> Option<usize> {
        if self.contains(position) {
            let (i, j) = position;
            Some(j as usize * self.width as usize + i as usize)
        } else {
            None
        }
    }

    /// Lazily drops every out-of-bounds position from `positions`.
    pub fn validate<'a, I>(&'a self, positions: I) -> impl Iterator<Item = Position> + 'a
    where
        I: IntoIterator<Item = Position>,
        I::IntoIter: 'a,
    {
        positions.into_iter().filter(move |&p| self.contains(p))
    }

    /// Flips every in-bounds position. A position listed twice is flipped twice.
    pub fn toggle<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = Position>,
    {
        for position in positions {
            let Some(index) = self.index(position) else {
                continue;
            };
            let alive = !self.cells[index].is_alive();
            self.cells[index] = Cell::from_alive(alive);
            if alive {
                self.alive.insert(position);
            } else {
                let tracked = self.alive.remove(&position);
                debug_assert!(tracked, "alive cell {position:?} missing from the index");
            }
        }
    }

    pub fn get(&self, position: Position) -> Option<Cell> {
        self.index(position).map(|index| self.cells[index])
    }

    pub fn is_alive(&self, position: Position) -> bool {
        self.get(position).is_some_and(Cell::is_alive)
    }

    /// Writes one cell. Out-of-bounds positions are ignored.
    pub fn set(&mut self, position: Position, alive: bool) {
        let Some(index) = self.index(position) else {
            return;
        };
        self.cells[index] = Cell::from_alive(alive);
        if alive {
            self.alive.insert(position);
        } else {
            self.alive.remove(&position);
        }
    }

    /// In-bounds Moore neighbours of `position`, N first and then clockwise.
    pub fn neighbours(&self, (i, j): Position) -> impl Iterator<Item = Position> + '_ {
        self.validate(
            NEIGHBOUR_OFFSETS
                .iter()
                .map(move |&(di, dj)| (i.saturating_add(di), j.saturating_add(dj))),
        )
    }

    /// Alive cells among the neighbours of `position`; the cell itself never counts.
    pub fn count_alive_neighbours(&self, position: Position) -> u8 {
        self.neighbours(position)
            .filter(|&p| self.is_alive(p))
            .count() as u8
    }

    /// Reallocates to `shape`, keeping the alive cells that still fit.
    pub fn resize(&mut self, shape: (u32, u32)) {
        let previous = std::mem::take(&mut self.alive);
        *self = Self::new(shape);
        self.toggle(previous);
    }

    pub fn alive_positions(&self) -> &HashSet<Position> {
        &self.alive
    }

    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }

    /// Every cell with its position, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        let width = self.width.max(1) as usize;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, &cell)| (((index % width) as i32, (index / width) as i32), cell))
    }
}
