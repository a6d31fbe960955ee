#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Torus Life visualiser.

mod config;
mod session;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use torus_life_rendering::{palette, Presentation, RenderingBackend};
use torus_life_rendering_macroquad::{MacroquadBackend, TextureMirror};
use tracing_subscriber::EnvFilter;

use self::{
    config::{Args, Settings},
    session::LifeSession,
};

/// Log filter applied when neither `--log-filter` nor `RUST_LOG` is set.
const DEFAULT_LOG_FILTER: &str = "info";

/// Entry point for the Torus Life command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_filter.as_deref())?;

    let settings = Settings::load(&args).context("failed to load startup settings")?;
    tracing::debug!(?settings, "resolved startup settings");

    let mut backend = MacroquadBackend::new().with_show_fps(settings.show_fps);
    if let Some(enabled) = settings.vsync {
        backend = backend.with_vsync(enabled);
    }

    let presentation = Presentation::new(
        settings.window_title,
        settings.window_width,
        settings.window_height,
        palette::BACKGROUND,
    );
    let session = LifeSession::<TextureMirror>::new(
        settings.grid,
        settings.steps_per_second,
        settings.playback,
    );

    backend.run(presentation, session)
}

fn init_logging(directives: Option<&str>) -> Result<()> {
    let filter = match directives {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter `{directives}`"))?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow!("failed to install the log subscriber: {error}"))
}
