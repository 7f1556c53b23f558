use crate::grid::Position;

/// Well-known patterns written into a freshly created pattern folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// A small oscillator
    Blinker,
    /// A small oscillator
    Toad,
    /// A small stationary pattern
    Block,
    /// A diagonal spaceship
    Glider,
    /// A horizontal spaceship
    LightweightSpaceship,
    /// A pattern that grows indefinitely
    GosperGliderGun,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::Blinker,
        Preset::Toad,
        Preset::Block,
        Preset::Glider,
        Preset::LightweightSpaceship,
        Preset::GosperGliderGun,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Blinker => "blinker",
            Preset::Toad => "toad",
            Preset::Block => "block",
            Preset::Glider => "glider",
            Preset::LightweightSpaceship => "lwss",
            Preset::GosperGliderGun => "gosper_glider_gun",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.cells", self.name())
    }

    /// Alive cells relative to the pattern's top-left corner.
    #[rustfmt::skip]
    pub fn offsets(self) -> &'static [Position] {
        match self {
            Preset::Blinker => &[(0, 0), (0, 1), (0, 2)],
            Preset::Toad => &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
            Preset::Block => &[(0, 0), (1, 0), (0, 1), (1, 1)],
            Preset::Glider => &[(2, 0), (0, 1), (2, 1), (1, 2), (2, 2)],
            Preset::LightweightSpaceship => &[
                (0, 1), (0, 3),
                (1, 0),
                (2, 0),
                (3, 0), (3, 3),
                (4, 0), (4, 1), (4, 2),
            ],
            Preset::GosperGliderGun => &[
                // Left block
                (0, 4), (0, 5), (1, 4), (1, 5),

                // Left ship
                (10, 4), (10, 5), (10, 6),
                (11, 3), (11, 7),
                (12, 2), (12, 8),
                (13, 2), (13, 8),
                (14, 5),
                (15, 3), (15, 7),
                (16, 4), (16, 5), (16, 6),
                (17, 5),

                // Right ship
                (20, 2), (20, 3), (20, 4),
                (21, 2), (21, 3), (21, 4),
                (22, 1), (22, 5),
                (24, 0), (24, 1), (24, 5), (24, 6),

                // Right block
                (34, 2), (34, 3), (35, 2), (35, 3),
            ],
        }
    }

    /// The pattern as a plaintext `.cells` file.
    pub fn to_plaintext(self) -> String {
        let offsets = self.offsets();
        let width = offsets.iter().map(|&(i, _)| i + 1).max().unwrap_or(0);
        let height = offsets.iter().map(|&(_, j)| j + 1).max().unwrap_or(0);

        let mut text = format!("! {}\n", self.file_name());
        for j in 0..height {
            let row: String = (0..width)
                .map(|i| if offsets.contains(&(i, j)) { 'O' } else { '.' })
                .collect();
            text.push_str(row.trim_end_matches('.'));
            text.push('\n');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::plaintext;

    #[test]
    fn glider_plaintext() {
        assert_eq!(Preset::Glider.to_plaintext(), "! glider.cells\n..O\nO.O\n.OO\n");
    }

    #[test]
    fn plaintext_decodes_back_to_offsets() {
        for preset in Preset::ALL {
            let mut decoded: Vec<Position> = plaintext::decode(&preset.to_plaintext()).collect();
            let mut expected = preset.offsets().to_vec();
            decoded.sort_unstable();
            expected.sort_unstable();
            assert_eq!(decoded, expected, "{}", preset.name());
        }
    }
}
