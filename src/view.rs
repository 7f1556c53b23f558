use crate::config;
use crate::grid::Position;

/// Maps screen pixels to board cells under the current zoom and pan.
///
/// `world = (screen + offset) / zoom`, and a world pixel belongs to cell
/// `floor(world / cell_size)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: f32,
    offset: [f32; 2],
    cell_size: u32,
    window: (u32, u32),
    board: (u32, u32),
    min_zoom: f32,
    max_zoom: f32,
    zoom_step: f32,
}

impl Viewport {
    pub fn new(
        config: &config::Zoom,
        cell_size: u32,
        window: (u32, u32),
        board: (u32, u32),
    ) -> Self {
        Self {
            zoom: round_zoom(1.0_f32.clamp(config.min, config.max)),
            offset: [0.0, 0.0],
            cell_size,
            window,
            board,
            min_zoom: config.min,
            max_zoom: config.max,
            zoom_step: config.step,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn offset(&self) -> [f32; 2] {
        self.offset
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Follows a window resize; the board has usually been resized too.
    pub fn set_window(&mut self, window: (u32, u32), board: (u32, u32)) {
        self.window = window;
        self.board = board;
        self.clamp_offset();
    }

    pub fn screen_to_world(&self, (x, y): (f64, f64)) -> (f32, f32) {
        (
            (x as f32 + self.offset[0]) / self.zoom,
            (y as f32 + self.offset[1]) / self.zoom,
        )
    }

    /// The cell under a screen pixel. May be outside the board.
    pub fn screen_to_cell(&self, screen: (f64, f64)) -> Position {
        let (x, y) = self.screen_to_world(screen);
        let size = self.cell_size as f32;
        ((x / size).floor() as i32, (y / size).floor() as i32)
    }

    /// Zooms one step in (`direction > 0`) or out, keeping the world point
    /// under `anchor` in place. Returns whether the zoom changed.
    pub fn zoom_step(&mut self, direction: f32, anchor: Option<(f64, f64)>) -> bool {
        let old_zoom = self.zoom;
        let delta = if direction > 0.0 { self.zoom_step } else { -self.zoom_step };
        let new_zoom = round_zoom((old_zoom + delta).clamp(self.min_zoom, self.max_zoom));

        if (new_zoom - old_zoom).abs() < f32::EPSILON {
            return false;
        }

        if let Some(anchor) = anchor {
            let (world_x, world_y) = self.screen_to_world(anchor);
            self.offset = [
                world_x * new_zoom - anchor.0 as f32,
                world_y * new_zoom - anchor.1 as f32,
            ];
        }
        self.zoom = new_zoom;
        self.clamp_offset();
        true
    }

    /// Drags the view by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset[0] -= dx as f32;
        self.offset[1] -= dy as f32;
        self.clamp_offset();
    }

    // Keeps the board on screen: a board larger than the window may not
    // leave a gap, a smaller one may not leave the window.
    fn clamp_offset(&mut self) {
        let size = self.cell_size as f32 * self.zoom;
        for axis in 0..2 {
            let (board, window) = if axis == 0 {
                (self.board.0, self.window.0)
            } else {
                (self.board.1, self.window.1)
            };
            let max = board as f32 * size - window as f32;
            self.offset[axis] = self.offset[axis].clamp(max.min(0.0), max.max(0.0));
        }
    }
}

fn round_zoom(zoom: f32) -> f32 {
    (zoom * 100.0).round() / 100.0
}
