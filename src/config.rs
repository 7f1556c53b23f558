//! Startup configuration.
//!
//! Every field has a default; a TOML file may override any subset of them.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use std::{env, fs};
use winit::keyboard::KeyCode;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "LIFE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "life.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: Display,
    pub zoom: Zoom,
    pub palette: Palette,
    pub font: Font,
    pub icon: Icon,
    pub keybinds: Keybinds,
    pub event: EventTiming,
    pub patterns: Patterns,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Display {
    /// Window size on launch, in pixels.
    pub window_size: (u32, u32),
    /// Side of one cell, in pixels.
    pub cell_size: u32,
    /// Frame rate cap. `None` runs as fast as possible.
    pub framerate: Option<u32>,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            window_size: (1282, 722),
            cell_size: 5,
            framerate: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Zoom {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 2.0,
            step: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: Colour,
    pub line: Colour,
    /// Everything outside the board.
    pub void: Colour,
    pub cell: Colour,
    pub highlighted: Colour,
    pub debug: Colour,
    pub debug_neighbour: Colour,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Colour([0x5B, 0x6F, 0xA4, 0xFF]),
            line: Colour([0x5B, 0x94, 0xA4, 0xFF]),
            void: Colour([0x00, 0x00, 0x00, 0xFF]),
            cell: Colour([0x5B, 0xA4, 0x90, 0xFF]),
            highlighted: Colour([0x5B, 0xA4, 0x90, 0xAA]),
            debug: Colour([0x00, 0xFF, 0x00, 0xFF]),
            debug_neighbour: Colour([0xFF, 0x00, 0x00, 0xFF]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Font {
    pub colour: Colour,
    pub size: f32,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            colour: Colour([0xFF, 0xFF, 0xFF, 0xFF]),
            size: 18.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Icon {
    pub colours: Vec<Colour>,
    /// Squares per side.
    pub squares: u32,
}

impl Default for Icon {
    fn default() -> Self {
        Self {
            colours: vec![
                Colour([0xFF, 0x00, 0x00, 0xFF]),
                Colour([0x00, 0xFF, 0x00, 0xFF]),
                Colour([0x00, 0x00, 0xFF, 0xFF]),
            ],
            squares: 4,
        }
    }
}

/// Key bindings, by physical key code name (`KeyW`, `Enter`, `F3`...).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Keybinds {
    pub highlight_up: KeyCode,
    pub highlight_down: KeyCode,
    pub highlight_left: KeyCode,
    pub highlight_right: KeyCode,
    pub toggle: KeyCode,
    pub pause: KeyCode,
    pub step: KeyCode,
    pub reset: KeyCode,
    pub cycle_next: KeyCode,
    pub cycle_prev: KeyCode,
    pub debug: KeyCode,
}

impl Default for Keybinds {
    fn default() -> Self {
        Self {
            highlight_up: KeyCode::KeyW,
            highlight_down: KeyCode::KeyS,
            highlight_left: KeyCode::KeyA,
            highlight_right: KeyCode::KeyD,
            toggle: KeyCode::Enter,
            pause: KeyCode::KeyR,
            step: KeyCode::KeyE,
            reset: KeyCode::KeyQ,
            cycle_next: KeyCode::ArrowRight,
            cycle_prev: KeyCode::ArrowLeft,
            debug: KeyCode::F3,
        }
    }
}

/// Auto-repeat of held keys: fire once, wait `grace_seconds`, then fire every `step_seconds`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventTiming {
    pub grace_seconds: f32,
    pub step_seconds: f32,
}

impl Default for EventTiming {
    fn default() -> Self {
        Self {
            grace_seconds: 0.25,
            step_seconds: 0.1,
        }
    }
}

impl EventTiming {
    pub fn grace(&self) -> Duration {
        Duration::from_secs_f32(self.grace_seconds)
    }

    pub fn step(&self) -> Duration {
        Duration::from_secs_f32(self.step_seconds)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Patterns {
    pub folder: PathBuf,
}

impl Default for Patterns {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("./patterns"),
        }
    }
}

impl Config {
    /// Loads the file named by `LIFE_CONFIG`, or `life.toml` when it exists,
    /// or the defaults. The result is validated.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid(message));

        if self.display.cell_size == 0 {
            return invalid("display.cell_size must be positive".into());
        }
        if self.display.window_size.0 == 0 || self.display.window_size.1 == 0 {
            return invalid(format!(
                "display.window_size must be positive, got {:?}",
                self.display.window_size
            ));
        }
        if self.display.framerate == Some(0) {
            return invalid("display.framerate must be positive when set".into());
        }

        let zoom = &self.zoom;
        if !(zoom.min.is_finite() && zoom.max.is_finite() && zoom.min > 0.0) {
            return invalid(format!("zoom.min must be positive, got {}", zoom.min));
        }
        if zoom.min > zoom.max {
            return invalid(format!("zoom.min {} exceeds zoom.max {}", zoom.min, zoom.max));
        }
        if !(zoom.step.is_finite() && zoom.step > 0.0) {
            return invalid(format!("zoom.step must be positive, got {}", zoom.step));
        }

        for (name, seconds) in [
            ("event.grace_seconds", self.event.grace_seconds),
            ("event.step_seconds", self.event.step_seconds),
        ] {
            if Duration::try_from_secs_f32(seconds).is_err() {
                return invalid(format!("{name} must be a non-negative duration, got {seconds}"));
            }
        }

        if self.font.size <= 0.0 {
            return invalid(format!("font.size must be positive, got {}", self.font.size));
        }
        if self.icon.squares == 0 || self.icon.colours.is_empty() {
            return invalid("icon needs at least one square and one colour".into());
        }
        Ok(())
    }
}

/// An sRGB colour with alpha, written `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Colour(pub [u8; 4]);

impl Colour {
    /// Linear RGB with straight alpha, for shaders writing to an sRGB target.
    pub fn linear(self) -> [f32; 4] {
        let [r, g, b, a] = self.0;
        let channel = |c: u8| {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        [channel(r), channel(g), channel(b), a as f32 / 255.0]
    }

    pub fn to_egui(self) -> egui::Color32 {
        let [r, g, b, a] = self.0;
        egui::Color32::from_rgba_unmultiplied(r, g, b, a)
    }
}

impl FromStr for Colour {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ConfigError::Colour(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(error)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(error());
        }
        let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).map(|n| n * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);

        let rgba = match hex.len() {
            3 | 4 => {
                let alpha = if hex.len() == 4 { nibble(3) } else { Ok(0xFF) };
                [nibble(0), nibble(1), nibble(2), alpha]
            }
            6 | 8 => {
                let alpha = if hex.len() == 8 { byte(6) } else { Ok(0xFF) };
                [byte(0), byte(2), byte(4), alpha]
            }
            _ => return Err(error()),
        };

        let mut out = [0; 4];
        for (slot, channel) in out.iter_mut().zip(rgba) {
            *slot = channel.map_err(|_| error())?;
        }
        Ok(Colour(out))
    }
}

impl TryFrom<String> for Colour {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.display.window_size, (1282, 722));
        assert_eq!(config.display.cell_size, 5);
        assert_eq!(config.keybinds.pause, KeyCode::KeyR);
        assert_eq!(config.event.grace(), Duration::from_millis(250));
    }

    #[test]
    fn partial_override() {
        let config: Config = toml::from_str(
            r##"
            [display]
            cell_size = 8
            framerate = 60

            [palette]
            cell = "#fff"

            [keybinds]
            pause = "Space"
            "##,
        )
        .unwrap();
        config.validate().unwrap();
        assert_eq!(config.display.cell_size, 8);
        assert_eq!(config.display.window_size, (1282, 722));
        assert_eq!(config.display.framerate, Some(60));
        assert_eq!(config.palette.cell, Colour([255, 255, 255, 255]));
        assert_eq!(config.palette.void, Colour([0, 0, 0, 255]));
        assert_eq!(config.keybinds.pause, KeyCode::Space);
        assert_eq!(config.keybinds.step, KeyCode::KeyE);
    }

    #[test]
    fn colour_forms() {
        assert_eq!("#5BA490AA".parse::<Colour>().unwrap(), Colour([0x5B, 0xA4, 0x90, 0xAA]));
        assert_eq!("#000000".parse::<Colour>().unwrap(), Colour([0, 0, 0, 255]));
        assert_eq!("#f08".parse::<Colour>().unwrap(), Colour([255, 0, 136, 255]));
        assert_eq!("#f088".parse::<Colour>().unwrap(), Colour([255, 0, 136, 136]));
        for bad in ["", "5BA490", "#12", "#12345", "#GGGGGG", "#ééé"] {
            assert!(bad.parse::<Colour>().is_err(), "{bad}");
        }
    }

    #[test]
    fn bad_colour_in_file_fails_to_parse() {
        let parsed: Result<Config, _> = toml::from_str("[palette]\ncell = \"green\"\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn linear_endpoints() {
        assert_eq!(Colour([0, 0, 0, 0]).linear(), [0.0, 0.0, 0.0, 0.0]);
        let [r, g, b, a] = Colour([255, 255, 255, 255]).linear();
        for c in [r, g, b, a] {
            assert!((c - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn invalid_values_rejected() {
        let mut config = Config::default();
        config.display.cell_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.zoom.min = 3.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.zoom.step = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.event.step_seconds = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.display.framerate = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn huge_timings_rejected() {
        let config: Config = toml::from_str("[event]\ngrace_seconds = 1e30\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config: Config = toml::from_str("[event]\nstep_seconds = 1e30\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config: Config = toml::from_str("[event]\ngrace_seconds = 3600.0\n").unwrap();
        config.validate().unwrap();
        assert_eq!(config.event.grace(), Duration::from_secs(3600));
    }
}
