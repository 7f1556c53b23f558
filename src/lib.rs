//! Conway's Game of Life on a bounded, resizable board.
//!
//! The simulation core ([`grid`], [`conway`], [`rules`]) and the pattern
//! decoders ([`patterns`]) have no window or GPU dependencies; the binary
//! puts a winit/wgpu/egui front end on top of them.

pub mod config;
pub mod conway;
pub mod error;
pub mod grid;
pub mod patterns;
pub mod rules;
pub mod view;

pub use conway::Conway;
pub use grid::{Cell, Grid, Position};
pub use patterns::PatternLibrary;
