use std::path::PathBuf;

use clap::Parser;

mod app;
mod config;
mod event;

#[derive(Parser, Debug)]
#[command(name = "voxlith", about = "Headless voxel terrain engine driver")]
struct Cli {
    /// Engine config (world, lighting, mesh, liquid, runtime sections)
    #[arg(long, default_value = "assets/engine.toml")]
    config: PathBuf,
    /// Voxel catalog
    #[arg(long, default_value = "assets/voxels.toml")]
    voxels: PathBuf,
    /// Liquid simulation ticks to run
    #[arg(long, default_value_t = 200)]
    ticks: u32,
    /// Default log filter; RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .parse_filters(&cli.log_level)
        .parse_env("RUST_LOG")
        .init();

    let opts = app::RunOptions {
        config: cli.config,
        voxels: cli.voxels,
        ticks: cli.ticks,
    };
    match app::run(&opts) {
        Ok(stats) => {
            println!(
                "chunks: {} ({} ready), solid faces: {}, liquid faces: {}, liquid volume: {}",
                stats.chunks, stats.ready, stats.solid.faces, stats.liquid.faces, stats.liquid_volume
            );
        }
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}
