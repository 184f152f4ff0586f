use crate::assets::AssetCatalog;
use crate::config::load_config;
use crate::layout_dump::write_placement_dump;
use crate::render::write_output_svg;
use crate::selection::SelectionOutcome;
use crate::session::Session;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "seatr", version, about = "Place roster photos onto a seating layout")]
pub struct Args {
    /// Roster text file: one group per line, names separated by commas
    #[arg(short = 'r', long = "roster")]
    pub roster: Option<PathBuf>,

    /// Directory holding <name>.jpg / .jpeg / .png pictures
    #[arg(short = 'p', long = "pics")]
    pub pics: Option<PathBuf>,

    /// Layout JSON document. The default grid is used when omitted.
    #[arg(short = 'l', long = "layout")]
    pub layout: Option<PathBuf>,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Swap two seats by the numbers shown on their chips, e.g. `--swap 3,7`
    #[arg(short = 's', long = "swap", value_parser = parse_swap)]
    pub swaps: Vec<(usize, usize)>,

    /// Write the roster after swaps. Defaults to <roster>-updated.txt.
    #[arg(long = "exportRoster")]
    pub export_roster: Option<Option<PathBuf>>,

    /// Write the layout, including the default grid when none was loaded
    #[arg(long = "exportLayout")]
    pub export_layout: Option<PathBuf>,

    /// Write the computed placement as JSON
    #[arg(long = "dumpPlacement")]
    pub dump_placement: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = load_config(args.config.as_deref())?;
    let mut session = Session::new(config);

    let roster_path = args
        .roster
        .clone()
        .unwrap_or_else(|| PathBuf::from(&session.config().roster.default_source));
    match std::fs::read_to_string(&roster_path) {
        Ok(text) => session.load_roster_text(&text, roster_path.to_string_lossy()),
        Err(err) => session.note_load_failure(&roster_path.display().to_string(), &err),
    }

    if let Some(path) = &args.layout {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                // Rejected documents leave the default grid in place.
                let _ = session.load_layout_str(&text);
            }
            Err(err) => session.note_load_failure(&path.display().to_string(), &err),
        }
    }

    let pics = args
        .pics
        .clone()
        .unwrap_or_else(|| PathBuf::from(&session.config().roster.pictures_dir));
    let catalog = AssetCatalog::probe_directory(&pics, session.roster());

    session.render();
    for (a, b) in &args.swaps {
        apply_swap(&mut session, *a, *b);
    }

    let svg = session.render_svg(&catalog);
    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &session)?;
        }
    }

    if let Some(target) = &args.export_roster {
        let path = target
            .clone()
            .unwrap_or_else(|| default_roster_export(&roster_path, &session.export_roster_file_name()));
        std::fs::write(&path, session.export_roster_text())?;
        session.mark_exported(&path.display().to_string());
    }

    if let Some(path) = &args.export_layout {
        std::fs::write(path, session.export_layout_json()?)?;
        session.mark_exported(&path.display().to_string());
    }

    if let Some(path) = &args.dump_placement {
        if let Some(scene) = session.scene() {
            write_placement_dump(path, scene)?;
        }
    }

    tracing::info!(status = session.status(), "done");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn apply_swap(session: &mut Session, a: usize, b: usize) {
    let first = session.click_seat(a - 1);
    if first == SelectionOutcome::Ignored {
        tracing::warn!(seat = a, "no such seat, swap skipped");
        return;
    }
    if session.click_seat(b - 1) == SelectionOutcome::Ignored {
        tracing::warn!(seat = b, "no such seat, swap skipped");
        // Drop the dangling first selection with a self-swap.
        session.click_seat(a - 1);
    }
}

fn parse_swap(value: &str) -> std::result::Result<(usize, usize), String> {
    let (a, b) = value
        .split_once([',', ':'])
        .ok_or_else(|| format!("expected two seat numbers like 3,7, got {value:?}"))?;
    let seat = |token: &str| -> std::result::Result<usize, String> {
        let n: usize = token
            .trim()
            .parse()
            .map_err(|_| format!("invalid seat number {token:?}"))?;
        if n == 0 {
            return Err("seat numbers start at 1".to_string());
        }
        Ok(n)
    };
    Ok((seat(a)?, seat(b)?))
}

fn default_roster_export(roster_path: &Path, file_name: &str) -> PathBuf {
    roster_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(file_name)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, session: &Session) -> Result<()> {
    let config = session.config();
    crate::render::write_output_png(svg, output, &config.render, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _session: &Session) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}
