/// MVK Terminal Demo - Glass torus and extruded label
///
/// Controls:
///   - Mouse: Rotate the scene
///   - Tab / Up / Down: Select a material control
///   - Left / Right: Adjust the selected control
///   - P: Show or hide the panel
///   - Q/ESC: Quit

use anyhow::{Context, Result};
use clap::Parser;
use mvk_core::{PendingFont, SceneConfig};
use mvk_terminal::{CellSize, TerminalApp};
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(version, about = "Glass torus demo in the terminal")]
struct Args {
    /// Typeface JSON font for the label
    #[arg(long)]
    font: Option<PathBuf>,

    /// Scene configuration JSON; unspecified fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Target frame rate
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Logical width of one terminal cell in pixels
    #[arg(long, default_value_t = 8.0)]
    cell_width: f32,

    /// Logical height of one terminal cell in pixels
    #[arg(long, default_value_t = 16.0)]
    cell_height: f32,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Default `RUST_LOG` filter. Stderr shares the screen with the renderer, so
/// only errors go there unless logs are redirected to a file.
fn default_log_filter(log_file: Option<&Path>) -> &'static str {
    match log_file {
        Some(_) => "info",
        None => "error",
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_log_filter(log_file)));
    if let Some(path) = log_file {
        let file = File::create(path).with_context(|| format!("failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let config = match &args.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SceneConfig::default(),
    };

    let font_path = args
        .font
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.label.font_path));
    log::info!("loading label font from {}", font_path.display());
    let font = PendingFont::spawn(font_path).context("failed to start font loader")?;

    let cell = CellSize {
        width: args.cell_width,
        height: args.cell_height,
    };
    let mut app = TerminalApp::new(config, font, args.fps, cell)
        .context("failed to query terminal size")?;
    app.run().context("terminal renderer failed")?;

    println!("MVK terminal demo exited after {} frames", app.frames());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stderr_only_carries_errors_by_default() {
        assert_eq!(default_log_filter(None), "error");
        assert_eq!(default_log_filter(Some(Path::new("mvk.log"))), "info");
    }

    #[test]
    fn log_file_flag_is_optional() {
        let args = Args::parse_from(["mvk-terminal"]);
        assert!(args.log_file.is_none());
        let args = Args::parse_from(["mvk-terminal", "--log-file", "mvk.log"]);
        assert_eq!(args.log_file, Some(PathBuf::from("mvk.log")));
    }
}
