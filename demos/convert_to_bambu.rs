//! Convert a 3MF file into a Bambu Studio project
//!
//! Usage: `cargo run --example convert_to_bambu -- <input.3mf> [output.3mf] [thumbnail.png ...]`
//!
//! The output defaults to `<input>_bambu.3mf`. Extra paths are stored as
//! thumbnails under their file names; one named `plate_1.png` also becomes the
//! package thumbnail. Set `RUST_LOG=bambu3mf=debug` for detailed logs.

use bambu3mf::{ConvertConfig, Thumbnail, convert_file};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(input) = args.first().map(PathBuf::from) else {
        eprintln!("Usage: convert_to_bambu <input.3mf> [output.3mf] [thumbnail.png ...]");
        std::process::exit(2);
    };
    let output = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output(&input));

    let mut thumbnails = Vec::new();
    for path in args.iter().skip(2).map(Path::new) {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| format!("not a file path: {}", path.display()))?;
        thumbnails.push(Thumbnail::new(name, std::fs::read(path)?));
    }

    let report = convert_file(&input, &output, &thumbnails, &ConvertConfig::default())?;

    println!("Wrote {}", output.display());
    println!("  Objects: {}", report.objects);
    for (color, slot) in report.extruders.iter() {
        println!("  Extruder {}: {}", slot, color);
    }
    if let Some(slot) = report.default_slot {
        println!("  Default extruder: {}", slot);
    }
    println!("  Painted triangles: {}", report.painted_triangles);
    println!("  Thumbnails: {}", report.thumbnails);
    for warning in &report.warnings {
        println!("  Warning: {}", warning);
    }

    Ok(())
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model");
    input.with_file_name(format!("{}_bambu.3mf", stem))
}
