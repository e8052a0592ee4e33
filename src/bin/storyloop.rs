use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use storyloop::encode::ffmpeg::ensure_parent_dir;
use storyloop::playback::schedule::DEFAULT_REFRESH;
use tracing_subscriber::EnvFilter;

use storyloop::{
    Downloads, ExportPipeline, FfmpegCapture, FrameRenderer, FrameScheduler, LogNotifier,
    Progress, RealtimeScheduler, RendererOpts, SourceImage, StoryDocument, StoryViewer,
    VirtualScheduler,
};

#[derive(Parser, Debug)]
#[command(name = "storyloop", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Export one loop as MP4/WebM (requires `ffmpeg` on PATH).
    Export(ExportArgs),
    /// Save the source image unchanged into the downloads directory.
    Image(ImageArgs),
    /// List the animation presets.
    Presets,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input story JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Loop progress in `[0, 1)`.
    #[arg(long, default_value_t = 0.0)]
    progress: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Print the loaded font faces.
    #[arg(long)]
    dump_fonts: bool,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input story JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Downloads directory; overrides `export.out_dir`.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Pace frames on the wall clock instead of rendering as fast as possible.
    #[arg(long)]
    realtime: bool,
}

#[derive(Parser, Debug)]
struct ImageArgs {
    /// Input story JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Downloads directory; overrides `export.out_dir`.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Export(args) => cmd_export(args),
        Command::Image(args) => cmd_image(args),
        Command::Presets => cmd_presets(),
    }
}

fn read_story(path: &std::path::Path) -> anyhow::Result<StoryDocument> {
    let doc = StoryDocument::from_path(path)?;
    doc.validate()?;
    Ok(doc)
}

fn build_viewer<S: FrameScheduler>(
    doc: &StoryDocument,
    scheduler: S,
) -> anyhow::Result<StoryViewer<S>> {
    let renderer = FrameRenderer::new(RendererOpts::default(), doc.font_book()?)?;
    let mut viewer = StoryViewer::new(scheduler, renderer);
    viewer.set_selection(doc.selection()?);
    viewer.set_overlay(doc.overlay.clone());
    let image_path = doc.image_path();
    let image = SourceImage::open(&image_path)
        .with_context(|| format!("load image '{}'", image_path.display()))?;
    viewer.set_image(image);
    Ok(viewer)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let doc = read_story(&args.in_path)?;
    let mut viewer = build_viewer(&doc, VirtualScheduler::new(DEFAULT_REFRESH))?;

    if args.dump_fonts {
        eprintln!("fonts:");
        for name in doc.font_book()?.names() {
            eprintln!("  {name}");
        }
    }

    let frame = viewer
        .render_at(Progress::new(args.progress))?
        .context("no image to render")?;
    ensure_parent_dir(&args.out)?;
    frame
        .save_png(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let doc = read_story(&args.in_path)?;
    let settings = doc.export_settings()?;
    let out_dir = args.out_dir.unwrap_or_else(|| doc.out_dir());
    let mut pipeline = ExportPipeline::new(
        FfmpegCapture::probe(),
        LogNotifier,
        Downloads::new(out_dir),
        settings.clone(),
    );

    let report = if args.realtime {
        let mut viewer = build_viewer(&doc, RealtimeScheduler::default())?;
        pipeline.export(&mut viewer)?
    } else {
        let scheduler = VirtualScheduler::new(settings.fps.frame_interval());
        let mut viewer = build_viewer(&doc, scheduler)?;
        pipeline.export(&mut viewer)?
    };

    eprintln!(
        "wrote {} ({}, {} frames{})",
        report.path.display(),
        report.mime,
        report.frames,
        if report.with_audio { ", with audio" } else { "" }
    );
    Ok(())
}

fn cmd_image(args: ImageArgs) -> anyhow::Result<()> {
    let doc = read_story(&args.in_path)?;
    let image_path = doc.image_path();
    let image = SourceImage::open(&image_path)
        .with_context(|| format!("load image '{}'", image_path.display()))?;
    let out_dir = args.out_dir.unwrap_or_else(|| doc.out_dir());
    let path = Downloads::new(out_dir).save_image(&image)?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_presets() -> anyhow::Result<()> {
    for p in &storyloop::PRESETS {
        println!(
            "{:<10} {:<12} {:<15} {:>6} ms  {}",
            p.id,
            p.label,
            p.kind.name(),
            p.duration_ms,
            p.description
        );
    }
    Ok(())
}
