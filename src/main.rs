// Command-line front end for the feature extractor.
// The HTTP service lives in server/; run it with:
//   cargo run --bin server
use std::path::PathBuf;

use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing::Level;

use feature_viz::extract_file;

/// Prints the colour statistics and 3D position of each image as JSON.
#[derive(Parser)]
#[command(name = "feature-viz", version)]
struct Args {
    /// Images to analyse (PNG, JPEG, GIF or BMP).
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Seed for the random coordinates used when an image cannot be read.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), serde_json::Error> {
    tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for path in &args.images {
        let result = extract_file(path, &mut rng);
        println!("{}: {}", path.display(), serde_json::to_string_pretty(&result)?);
    }
    Ok(())
}
