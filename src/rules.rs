/// Rules module for Conway's Game of Life simulation
///
/// Game of Life standard rules:
/// 1. Any live cell with fewer than two live neighbors dies (underpopulation)
/// 2. Any live cell with two or three live neighbors lives (survival)
/// 3. Any live cell with more than three live neighbors dies (overpopulation)
/// 4. Any dead cell with exactly three live neighbors becomes alive (reproduction)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    /// Minimum neighbors for a live cell to survive
    pub survival_min: u8,
    /// Maximum neighbors for a live cell to survive
    pub survival_max: u8,
    /// Number of neighbors for a dead cell to become alive
    pub birth_count: u8,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            survival_min: 2,
            survival_max: 3,
            birth_count: 3,
        }
    }
}

impl GameRules {
    /// Conway's classic Game of Life (B3/S23)
    pub fn conway() -> Self {
        Self::default()
    }

    /// State of a cell in the next generation.
    pub fn next_state(&self, alive: bool, neighbours: u8) -> bool {
        if alive {
            (self.survival_min..=self.survival_max).contains(&neighbours)
        } else {
            neighbours == self.birth_count
        }
    }

    /// The rule in B/S notation, e.g. `B3/S23`.
    pub fn notation(&self) -> String {
        let survival: String = (self.survival_min..=self.survival_max)
            .map(|n| char::from(b'0' + n))
            .collect();
        format!("B{}/S{}", self.birth_count, survival)
    }

    /// Case-insensitive comparison against a rule string from a pattern file.
    pub fn matches_notation(&self, rule: &str) -> bool {
        self.notation().eq_ignore_ascii_case(rule.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conway_notation() {
        assert_eq!(GameRules::conway().notation(), "B3/S23");
        assert!(GameRules::conway().matches_notation("b3/s23"));
        assert!(GameRules::conway().matches_notation(" B3/S23 "));
        assert!(!GameRules::conway().matches_notation("B36/S23"));
    }

    #[test]
    fn conway_transitions() {
        let rules = GameRules::conway();
        assert!(!rules.next_state(true, 1));
        assert!(rules.next_state(true, 2));
        assert!(rules.next_state(true, 3));
        assert!(!rules.next_state(true, 4));
        assert!(!rules.next_state(false, 2));
        assert!(rules.next_state(false, 3));
        assert!(!rules.next_state(false, 8));
    }
}
