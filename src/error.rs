//! Error types for pattern decoding, configuration and startup.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a pattern file into cell offsets.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("unable to read pattern {name:?}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("{0:?} is neither a .cells nor a .rle file")]
    UnknownFormat(String),
    #[error("RLE pattern has no header line")]
    MissingHeader,
    #[error("invalid RLE header field {field}: {value:?}")]
    InvalidHeader { field: &'static str, value: String },
    #[error("run count overflows on row {row}")]
    RunCountOverflow { row: i32 },
    #[error("cell on row {row} lies outside the declared {width}x{height} pattern")]
    OutOfBounds { row: i32, width: u32, height: u32 },
    #[error("unexpected character {ch:?} on row {row}")]
    UnexpectedChar { ch: char, row: i32 },
}

/// Invalid or unreadable configuration. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid colour {0:?}, expected #RGB, #RGBA, #RRGGBB or #RRGGBBAA")]
    Colour(String),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Anything that stops the program before the main loop starts.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("unable to prepare pattern folder {folder:?}: {source}")]
    Patterns {
        folder: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("unable to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("unable to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("failed to find an appropriate adapter")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}
