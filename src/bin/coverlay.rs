use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "coverlay", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a cover document to per-layer PNGs plus a final composite.
    Render(RenderArgs),
    /// Parse and validate a cover document without rendering.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input cover document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory (default: the input path minus its extension).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Also write each laid-out text raster for inspection.
    #[arg(long)]
    dump_text_rasters: bool,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input cover document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn read_document(path: &Path) -> anyhow::Result<coverlay::Document> {
    let f = File::open(path).with_context(|| format!("open document '{}'", path.display()))?;
    let r = BufReader::new(f);
    let mut doc: coverlay::Document =
        serde_json::from_reader(r).with_context(|| "parse document JSON")?;

    // resources are looked up relative to the document unless absolute
    if doc.resources_dir.is_relative() {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        doc.resources_dir = base.join(&doc.resources_dir);
    }
    Ok(doc)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.in_path)?;

    let out_dir = args
        .out
        .unwrap_or_else(|| args.in_path.with_extension(""));

    let opts = coverlay::RenderOptions {
        dump_text_rasters: args.dump_text_rasters,
    };
    let final_path = coverlay::render_document(&doc, &out_dir, &opts)?;

    eprintln!("wrote {}", final_path.display());
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.in_path)?;
    doc.validate()?;
    eprintln!(
        "{}: ok ({} layers, {}x{})",
        args.in_path.display(),
        doc.layers.len(),
        doc.width,
        doc.height
    );
    Ok(())
}
