//! Provides the `objzip-view` tool for rendering a zipped OBJ model to PNG.
//!
//! Usage: `objzip-view <archive|url|?file=URL> [size]`
//!
//! Loads the archive, prints the status and stats lines, and writes a PNG
//! named after the archive into the current directory. Set `OBJZIP_CONFIG`
//! to a JSON file to override viewer settings.
//!
//! # Examples
//! ```text
//! objzip-view chair.zip 512
//! objzip-view "?file=https%3A%2F%2Fexample.com%2Fchair.zip"
//! ```

use std::path::{Path, PathBuf};
use std::process;

use objzip::config::ViewerConfig;
use objzip::formats::shared::path::{bare_filename, file_stem};
use objzip::query::model_url_from_query;
use objzip::viewer::Viewer;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <archive|url|?file=URL> [size]", args[0]);
        eprintln!("  Renders a PNG of the model into the current directory.");
        eprintln!("  OBJZIP_CONFIG=<file.json> overrides viewer settings.");
        process::exit(1);
    }

    let config = match std::env::var_os("OBJZIP_CONFIG") {
        Some(path) => match ViewerConfig::from_path(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => ViewerConfig::default(),
    };

    let input = &args[1];
    let size: u32 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(config.render_size);

    let mut viewer = Viewer::new(config);
    let result = if input.starts_with('?') {
        viewer.start(input)
    } else {
        Some(viewer.load(input))
    };

    eprintln!("{}", viewer.status().status);
    match result {
        None => process::exit(1),
        Some(Err(_)) => process::exit(1),
        Some(Ok(_)) => eprintln!("{}", viewer.status().stats),
    }

    let location = match model_url_from_query(input) {
        Some(url) => url,
        None => input.clone(),
    };
    let output = output_path(&location);

    let pixels = viewer.render(size, size);
    let img = match image::RgbaImage::from_raw(size, size, pixels) {
        Some(img) => img,
        None => {
            eprintln!("Error: pixel buffer size mismatch");
            process::exit(1);
        }
    };

    if let Err(e) = img.save(&output) {
        eprintln!("Error: failed to write {}: {}", output.display(), e);
        process::exit(1);
    }

    eprintln!("Saved {}", output.display());
}

/// `https://host/dir/chair.zip?x=1` becomes `chair.png`.
fn output_path(location: &str) -> PathBuf {
    let trimmed = location.split(['?', '#']).next().unwrap_or(location);
    let stem = file_stem(bare_filename(trimmed));
    if stem.is_empty() {
        PathBuf::from("model.png")
    } else {
        PathBuf::from(format!("{}.png", stem))
    }
}
