// Command line interface module
// Handles parsing of command line arguments

use clap::Parser;
use std::path::PathBuf;

/// pngroll - A minimal PNG roll viewer
#[derive(Parser, Debug)]
#[command(name = "pngroll")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Paths of the images to view, in display order
    #[arg(value_name = "IMAGE")]
    pub images: Vec<PathBuf>,

    /// Initial window width in pixels
    #[arg(long, default_value = "1200", value_parser = parse_dimension)]
    pub width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value = "900", value_parser = parse_dimension)]
    pub height: u32,
}

/// Parse a window dimension and ensure it's a usable size
fn parse_dimension(s: &str) -> Result<u32, String> {
    let dim: u32 = s.parse().map_err(|_| "Invalid dimension value")?;
    if !(100..=8192).contains(&dim) {
        return Err("Window dimensions must be between 100 and 8192".to_string());
    }
    Ok(dim)
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_image_paths_in_order() {
        let args = Args::try_parse_from(["pngroll", "a.png", "b.png"]).unwrap();
        assert_eq!(
            args.images,
            vec![PathBuf::from("a.png"), PathBuf::from("b.png")]
        );
        assert_eq!(args.width, 1200);
        assert_eq!(args.height, 900);
    }

    #[test]
    fn accepts_no_images() {
        let args = Args::try_parse_from(["pngroll"]).unwrap();
        assert!(args.images.is_empty());
    }

    #[test]
    fn rejects_out_of_range_dimensions() {
        assert!(Args::try_parse_from(["pngroll", "--width", "10"]).is_err());
        assert!(Args::try_parse_from(["pngroll", "--height", "100000"]).is_err());
    }
}
