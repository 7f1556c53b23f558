use crate::state::State;
use conway_life::config::{EventTiming, Keybinds};
use conway_life::Position;
use std::time::{Duration, Instant};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton},
    keyboard::KeyCode,
};

/// What the game should do in response to input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    TogglePause,
    Step,
    Reset,
    PlaceAt(Position),
    SelectNext,
    SelectPrevious,
    ToggleDebug,
}

/// Fires once when created, then again after `grace` and every `step` while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repeater {
    next: Instant,
    step: Duration,
}

impl Repeater {
    pub fn start(now: Instant, timing: &EventTiming) -> Self {
        Self {
            next: now + timing.grace(),
            step: timing.step(),
        }
    }

    /// Whether the held action fires again at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next = now + self.step;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pointer {
    Idle,
    /// Left button held: the pattern is placed on every newly entered cell.
    Drawing { last: Position },
    /// Right button held: the view follows the cursor.
    Panning { last: PhysicalPosition<f64> },
}

/// Where the pattern preview is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    FollowMouse,
    /// Moved by keyboard and left in place until the mouse moves.
    Keyboard { cell: Position },
    Moving {
        cell: Position,
        key: KeyCode,
        direction: Position,
        repeat: Repeater,
    },
}

impl Highlight {
    pub fn cell(&self) -> Option<Position> {
        match *self {
            Highlight::FollowMouse => None,
            Highlight::Keyboard { cell } | Highlight::Moving { cell, .. } => Some(cell),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputState {
    pub keybinds: Keybinds,
    pub timing: EventTiming,
    pub pointer: Pointer,
    pub highlight: Highlight,
    pub cursor: Option<PhysicalPosition<f64>>,
    held_step: Option<Repeater>,
}

impl InputState {
    pub fn new(keybinds: Keybinds, timing: EventTiming) -> Self {
        Self {
            keybinds,
            timing,
            pointer: Pointer::Idle,
            highlight: Highlight::FollowMouse,
            cursor: None,
            held_step: None,
        }
    }

    fn direction(&self, key: KeyCode) -> Option<Position> {
        let binds = &self.keybinds;
        if key == binds.highlight_up {
            Some((0, -1))
        } else if key == binds.highlight_down {
            Some((0, 1))
        } else if key == binds.highlight_left {
            Some((-1, 0))
        } else if key == binds.highlight_right {
            Some((1, 0))
        } else {
            None
        }
    }

    /// A key went down. `mouse_cell` is the cell under the cursor, if any.
    pub fn key_pressed(
        &mut self,
        key: KeyCode,
        mouse_cell: Option<Position>,
        now: Instant,
    ) -> Option<Action> {
        if let Some((di, dj)) = self.direction(key) {
            let (i, j) = self.highlight.cell().or(mouse_cell).unwrap_or((0, 0));
            self.highlight = Highlight::Moving {
                cell: (i + di, j + dj),
                key,
                direction: (di, dj),
                repeat: Repeater::start(now, &self.timing),
            };
            return None;
        }

        let binds = &self.keybinds;
        if key == binds.debug {
            Some(Action::ToggleDebug)
        } else if key == binds.pause {
            Some(Action::TogglePause)
        } else if key == binds.reset {
            Some(Action::Reset)
        } else if key == binds.step {
            self.held_step = Some(Repeater::start(now, &self.timing));
            Some(Action::Step)
        } else if key == binds.toggle {
            self.highlight.cell().or(mouse_cell).map(Action::PlaceAt)
        } else if key == binds.cycle_next {
            Some(Action::SelectNext)
        } else if key == binds.cycle_prev {
            Some(Action::SelectPrevious)
        } else {
            None
        }
    }

    pub fn key_released(&mut self, key: KeyCode) {
        if key == self.keybinds.step {
            self.held_step = None;
        }
        if let Highlight::Moving { cell, key: held, .. } = self.highlight {
            if held == key {
                self.highlight = Highlight::Keyboard { cell };
            }
        }
    }

    /// Auto-repeat of held keys.
    pub fn tick(&mut self, now: Instant) -> Option<Action> {
        if let Highlight::Moving { cell, direction, repeat, .. } = &mut self.highlight {
            if repeat.poll(now) {
                cell.0 += direction.0;
                cell.1 += direction.1;
            }
        }
        match &mut self.held_step {
            Some(repeat) => repeat.poll(now).then_some(Action::Step),
            _ => None,
        }
    }

    /// The cursor moved onto `cell`.
    pub fn cursor_moved(
        &mut self,
        position: PhysicalPosition<f64>,
        cell: Position,
    ) -> Option<Action> {
        self.cursor = Some(position);
        if !matches!(self.highlight, Highlight::Moving { .. }) {
            self.highlight = Highlight::FollowMouse;
        }
        match &mut self.pointer {
            Pointer::Drawing { last } if *last != cell => {
                *last = cell;
                Some(Action::PlaceAt(cell))
            }
            _ => None,
        }
    }

    pub fn left_pressed(&mut self, cell: Position) -> Option<Action> {
        if self.pointer != Pointer::Idle {
            return None;
        }
        self.highlight = Highlight::FollowMouse;
        self.pointer = Pointer::Drawing { last: cell };
        Some(Action::PlaceAt(cell))
    }

    pub fn right_pressed(&mut self) {
        if let (Pointer::Idle, Some(last)) = (self.pointer, self.cursor) {
            self.pointer = Pointer::Panning { last };
        }
    }

    /// Releasing either button ends whatever that button started.
    pub fn released(&mut self, button: MouseButton) {
        match (button, self.pointer) {
            (MouseButton::Left, Pointer::Drawing { .. })
            | (MouseButton::Right, Pointer::Panning { .. }) => {
                self.pointer = Pointer::Idle;
            }
            _ => {}
        }
    }
}

pub fn handle_zoom(state: &mut State, delta: f32) {
    let anchor = state.input.cursor.map(|pos| (pos.x, pos.y));
    if state.viewport.zoom_step(delta, anchor) {
        log::info!(
            "Zoom: {:.2}, Offset: [{:.1}, {:.1}]",
            state.viewport.zoom(),
            state.viewport.offset()[0],
            state.viewport.offset()[1]
        );
    }
}

pub fn handle_mouse_input(state: &mut State, button: MouseButton, element_state: ElementState) {
    match (button, element_state) {
        (MouseButton::Left, ElementState::Pressed) => {
            if let Some(cell) = state.cursor_cell() {
                if let Some(action) = state.input.left_pressed(cell) {
                    state.apply(action);
                }
            }
        }
        (MouseButton::Right, ElementState::Pressed) => state.input.right_pressed(),
        (button, ElementState::Released) => state.input.released(button),
        _ => {}
    }
}

pub fn handle_cursor_move(state: &mut State, position: PhysicalPosition<f64>) {
    if let Pointer::Panning { last } = state.input.pointer {
        state.viewport.pan(position.x - last.x, position.y - last.y);
        state.input.pointer = Pointer::Panning { last: position };
    }

    let cell = state.viewport.screen_to_cell((position.x, position.y));
    if let Some(action) = state.input.cursor_moved(position, cell) {
        state.apply(action);
    }
}

pub fn handle_cursor_left(state: &mut State) {
    state.input.cursor = None;
}

pub fn handle_key(state: &mut State, key: KeyCode, element_state: ElementState, repeat: bool) {
    match element_state {
        // Held keys repeat on their own schedule, see `InputState::tick`.
        ElementState::Pressed if !repeat => {
            let mouse_cell = state.cursor_cell();
            if let Some(action) = state.input.key_pressed(key, mouse_cell, Instant::now()) {
                state.apply(action);
            }
        }
        ElementState::Released => state.input.key_released(key),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> InputState {
        InputState::new(Keybinds::default(), EventTiming::default())
    }

    #[test]
    fn repeater_waits_grace_then_steps() {
        let start = Instant::now();
        let mut repeat = Repeater::start(start, &EventTiming::default());
        assert!(!repeat.poll(start));
        assert!(!repeat.poll(start + Duration::from_millis(200)));
        assert!(repeat.poll(start + Duration::from_millis(250)));
        assert!(!repeat.poll(start + Duration::from_millis(300)));
        assert!(repeat.poll(start + Duration::from_millis(360)));
    }

    #[test]
    fn held_step_repeats_until_released() {
        let start = Instant::now();
        let mut input = input();
        assert_eq!(input.key_pressed(KeyCode::KeyE, None, start), Some(Action::Step));
        assert_eq!(input.tick(start + Duration::from_millis(100)), None);
        assert_eq!(input.tick(start + Duration::from_millis(260)), Some(Action::Step));
        input.key_released(KeyCode::KeyE);
        assert_eq!(input.tick(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn keyboard_moves_highlight() {
        let start = Instant::now();
        let mut input = input();
        assert_eq!(input.key_pressed(KeyCode::KeyD, Some((4, 4)), start), None);
        assert_eq!(input.highlight.cell(), Some((5, 4)));

        input.tick(start + Duration::from_millis(300));
        assert_eq!(input.highlight.cell(), Some((6, 4)));

        input.key_released(KeyCode::KeyD);
        assert_eq!(input.highlight, Highlight::Keyboard { cell: (6, 4) });
        assert_eq!(
            input.key_pressed(KeyCode::Enter, Some((0, 0)), start),
            Some(Action::PlaceAt((6, 4)))
        );

        input.cursor_moved(PhysicalPosition::new(1.0, 1.0), (0, 0));
        assert_eq!(input.highlight, Highlight::FollowMouse);
        assert_eq!(
            input.key_pressed(KeyCode::Enter, Some((0, 0)), start),
            Some(Action::PlaceAt((0, 0)))
        );
        assert_eq!(input.key_pressed(KeyCode::Enter, None, start), None);
    }

    #[test]
    fn drawing_places_on_new_cells_only() {
        let mut input = input();
        let at = PhysicalPosition::new(0.0, 0.0);
        assert_eq!(input.left_pressed((1, 1)), Some(Action::PlaceAt((1, 1))));
        assert_eq!(input.cursor_moved(at, (1, 1)), None);
        assert_eq!(input.cursor_moved(at, (2, 1)), Some(Action::PlaceAt((2, 1))));
        input.released(MouseButton::Left);
        assert_eq!(input.pointer, Pointer::Idle);
        assert_eq!(input.cursor_moved(at, (3, 1)), None);
    }

    #[test]
    fn panning_excludes_drawing() {
        let mut input = input();
        input.cursor_moved(PhysicalPosition::new(10.0, 10.0), (2, 2));
        input.right_pressed();
        assert!(matches!(input.pointer, Pointer::Panning { .. }));
        assert_eq!(input.left_pressed((2, 2)), None);
        input.released(MouseButton::Left);
        assert!(matches!(input.pointer, Pointer::Panning { .. }));
        input.released(MouseButton::Right);
        assert_eq!(input.pointer, Pointer::Idle);
    }

    #[test]
    fn command_keys() {
        let now = Instant::now();
        let mut input = input();
        assert_eq!(input.key_pressed(KeyCode::KeyR, None, now), Some(Action::TogglePause));
        assert_eq!(input.key_pressed(KeyCode::KeyQ, None, now), Some(Action::Reset));
        assert_eq!(input.key_pressed(KeyCode::ArrowRight, None, now), Some(Action::SelectNext));
        assert_eq!(input.key_pressed(KeyCode::ArrowLeft, None, now), Some(Action::SelectPrevious));
        assert_eq!(input.key_pressed(KeyCode::F3, None, now), Some(Action::ToggleDebug));
        assert_eq!(input.key_pressed(KeyCode::KeyZ, None, now), None);
    }
}
