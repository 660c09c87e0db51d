// pngroll - A minimal PNG roll viewer
// Steps through a set of PNG images with the arrow keys; drop a file or
// directory onto the window to load a new set

mod cli;
mod image_loader;
mod roll;
mod viewer;
mod wgpu_renderer;

use anyhow::Result;
use log::info;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args = cli::parse_args();

    info!(
        "Starting pngroll with {} image(s), window {}x{}",
        args.images.len(),
        args.width,
        args.height
    );

    viewer::run(args)
}
