//! Startup settings: command-line flags layered over an optional TOML file.
//!
//! Resolution order is flag, then file, then the built-in default. The
//! settings file accepts three tables:
//!
//! ```toml
//! [grid]
//! columns = 50
//! rows = 50
//!
//! [playback]
//! steps_per_second = 5.0
//! state = "paused"
//!
//! [window]
//! width = 1800
//! height = 900
//! title = "Game Of Life"
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use clap::Parser;
use serde::Deserialize;
use torus_life_core::{
    GridSize, PlaybackState, DEFAULT_GRID_SIZE, DEFAULT_STEPS_PER_SECOND, WINDOW_TITLE,
};
use torus_life_rendering::toolbar::{MAX_GRID_SIDE, MIN_GRID_SIDE};

/// Window width used when neither a flag nor the settings file provides one.
const DEFAULT_WINDOW_WIDTH: u32 = 1800;

/// Window height used when neither a flag nor the settings file provides one.
const DEFAULT_WINDOW_HEIGHT: u32 = 900;

/// Command-line arguments.
#[derive(Debug, Default, Parser)]
#[command(name = "torus-life", version)]
#[command(about = "Conway's Game of Life on a torus, drawn flat and in 3D")]
pub(crate) struct Args {
    /// Number of grid columns (10 to 100).
    #[arg(long)]
    pub(crate) columns: Option<u32>,

    /// Number of grid rows (10 to 100).
    #[arg(long)]
    pub(crate) rows: Option<u32>,

    /// Simulation frequency in generations per second.
    #[arg(long, value_name = "RATE")]
    pub(crate) steps_per_second: Option<f32>,

    /// TOML settings file.
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,

    /// Initial window width in pixels.
    #[arg(long, value_name = "PIXELS")]
    pub(crate) window_width: Option<u32>,

    /// Initial window height in pixels.
    #[arg(long, value_name = "PIXELS")]
    pub(crate) window_height: Option<u32>,

    /// Synchronise presentation with the display refresh.
    #[arg(long, overrides_with = "no_vsync")]
    pub(crate) vsync: bool,

    /// Present frames as fast as possible.
    #[arg(long, overrides_with = "vsync")]
    pub(crate) no_vsync: bool,

    /// Log frame timings once per second.
    #[arg(long)]
    pub(crate) show_fps: bool,

    /// Log filter directives, e.g. `info` or `torus_life_world=debug`.
    /// Defaults to `RUST_LOG`, then `info`.
    #[arg(long, value_name = "FILTER")]
    pub(crate) log_filter: Option<String>,
}

impl Args {
    fn vsync(&self) -> Option<bool> {
        match (self.vsync, self.no_vsync) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        }
    }
}

/// Errors raised while assembling the startup settings.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read settings file {}", path.display())]
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The settings file is not valid TOML or has unknown keys.
    #[error("failed to parse settings file {}", path.display())]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: toml::de::Error,
    },
    /// A grid side lies outside the accepted range.
    #[error("{axis} must be between 10 and 100, got {value}")]
    GridSide {
        /// Name of the offending axis.
        axis: &'static str,
        /// Rejected value.
        value: u32,
    },
    /// The simulation frequency is not a finite number.
    #[error("steps per second must be a finite number, got {value}")]
    StepsPerSecond {
        /// Rejected value.
        value: f32,
    },
    /// The window would have no area.
    #[error("window size must be non-zero, got {width}x{height}")]
    WindowSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    #[serde(default)]
    grid: GridSection,
    #[serde(default)]
    playback: PlaybackSection,
    #[serde(default)]
    window: WindowSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GridSection {
    columns: Option<u32>,
    rows: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlaybackSection {
    steps_per_second: Option<f32>,
    state: Option<PlaybackState>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct WindowSection {
    width: Option<u32>,
    height: Option<u32>,
    title: Option<String>,
}

impl SettingsFile {
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved startup settings.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    /// Initial grid dimensions.
    pub(crate) grid: GridSize,
    /// Initial simulation frequency.
    pub(crate) steps_per_second: f32,
    /// Whether the simulation starts running.
    pub(crate) playback: PlaybackState,
    /// Initial window width in pixels.
    pub(crate) window_width: u32,
    /// Initial window height in pixels.
    pub(crate) window_height: u32,
    /// Window title.
    pub(crate) window_title: String,
    /// Requested vertical sync, or `None` for the platform default.
    pub(crate) vsync: Option<bool>,
    /// Whether frame timings are logged.
    pub(crate) show_fps: bool,
}

impl Settings {
    /// Reads the settings file named by `args`, if any, and merges it with
    /// the flags.
    pub(crate) fn load(args: &Args) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => SettingsFile::read(path)?,
            None => SettingsFile::default(),
        };
        Self::resolve(args, file)
    }

    fn resolve(args: &Args, file: SettingsFile) -> Result<Self, ConfigError> {
        let columns = grid_side(
            "columns",
            args.columns
                .or(file.grid.columns)
                .unwrap_or(DEFAULT_GRID_SIZE.columns()),
        )?;
        let rows = grid_side(
            "rows",
            args.rows
                .or(file.grid.rows)
                .unwrap_or(DEFAULT_GRID_SIZE.rows()),
        )?;
        let grid = GridSize::new(columns, rows).ok_or(ConfigError::GridSide {
            axis: "columns",
            value: columns,
        })?;

        let steps_per_second = args
            .steps_per_second
            .or(file.playback.steps_per_second)
            .unwrap_or(DEFAULT_STEPS_PER_SECOND);
        if !steps_per_second.is_finite() {
            return Err(ConfigError::StepsPerSecond {
                value: steps_per_second,
            });
        }

        let window_width = args
            .window_width
            .or(file.window.width)
            .unwrap_or(DEFAULT_WINDOW_WIDTH);
        let window_height = args
            .window_height
            .or(file.window.height)
            .unwrap_or(DEFAULT_WINDOW_HEIGHT);
        if window_width == 0 || window_height == 0 {
            return Err(ConfigError::WindowSize {
                width: window_width,
                height: window_height,
            });
        }

        Ok(Self {
            grid,
            steps_per_second,
            playback: file.playback.state.unwrap_or_default(),
            window_width,
            window_height,
            window_title: file.window.title.unwrap_or_else(|| WINDOW_TITLE.to_owned()),
            vsync: args.vsync(),
            show_fps: args.show_fps,
        })
    }
}

fn grid_side(axis: &'static str, value: u32) -> Result<u32, ConfigError> {
    if (MIN_GRID_SIDE..=MAX_GRID_SIDE).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::GridSide { axis, value })
    }
}
