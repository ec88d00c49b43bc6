#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Memory Spheres experience.

mod simulation;

use anyhow::{Context, Result};
use clap::Parser;
use memory_spheres_rendering::{CameraRig, Color, Presentation, RenderingBackend, Scene};
use memory_spheres_rendering_macroquad::MacroquadBackend;
use memory_spheres_system_spawning::Config as SpawningConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use self::simulation::Simulation;

/// Command-line arguments for launching a session.
#[derive(Debug, Parser)]
#[command(
    name = "memory-spheres",
    version,
    about = "Match pairs of coloured spheres as they fill the grid"
)]
struct CliArgs {
    /// Seed for sphere colours and placement jitter; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Synchronise presentation with the display refresh rate (default).
    #[arg(long, overrides_with = "no_vsync")]
    vsync: bool,

    /// Render frames as fast as possible.
    #[arg(long, overrides_with = "vsync")]
    no_vsync: bool,

    /// Log frame timing once per second.
    #[arg(long)]
    show_fps: bool,

    /// Initial window width in pixels.
    #[arg(long, default_value_t = 1_280, value_parser = clap::value_parser!(u16).range(1..))]
    width: u16,

    /// Initial window height in pixels.
    #[arg(long, default_value_t = 720, value_parser = clap::value_parser!(u16).range(1..))]
    height: u16,
}

impl CliArgs {
    fn vsync_enabled(&self) -> bool {
        self.vsync || !self.no_vsync
    }
}

/// Entry point for the Memory Spheres command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut simulation = Simulation::new(SpawningConfig::new(seed));
    info!(seed, "{}", simulation.welcome_banner());

    let camera = CameraRig::standard().context("failed to configure the camera")?;
    let presentation = Presentation::new(
        "Memory Spheres",
        Color::from_rgb_u8(0, 0, 0),
        Scene::new(camera),
    );

    MacroquadBackend::new()
        .with_vsync(args.vsync_enabled())
        .with_show_fps(args.show_fps)
        .with_window_size(i32::from(args.width), i32::from(args.height))
        .run(presentation, move |dt, input, scene| {
            simulation.advance(dt, input, scene);
        })
        .context("rendering backend failed")
}
