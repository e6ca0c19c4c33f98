use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pipeviz", version)]
struct Cli {
    /// Log at DEBUG instead of INFO.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render a numbered PNG sequence.
    Render(RenderArgs),
    /// Print the built-in CI/CD preset as JSON.
    Preset,
}

#[derive(Args, Debug)]
struct DiagramArgs {
    /// Diagram JSON. The built-in CI/CD preset is used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root for icon and font paths. Defaults to the config file's directory.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Device pixel ratio.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Override the particle seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    diagram: DiagramArgs,

    /// Frame index (0-based).
    #[arg(long, default_value_t = 0)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    diagram: DiagramArgs,

    /// Number of frames to write.
    #[arg(long, default_value_t = 120)]
    frames: u64,

    /// Output directory for `frame_00000.png`, ...
    #[arg(long)]
    out_dir: PathBuf,

    /// Pace frames at the diagram's fps instead of rendering back-to-back.
    #[arg(long, default_value_t = false)]
    realtime: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Preset => cmd_preset(),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn start_session(
    args: &DiagramArgs,
) -> anyhow::Result<pipeviz::AnimationSession<pipeviz::CpuSurface>> {
    let (cfg, default_root) = match &args.config {
        Some(path) => {
            let cfg = pipeviz::DiagramConfig::from_path(path)
                .with_context(|| format!("load diagram '{}'", path.display()))?;
            let root = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
            (cfg, root)
        }
        None => (pipeviz::DiagramConfig::ci_cd_preset(), PathBuf::from(".")),
    };
    let assets_root = args.assets.clone().unwrap_or(default_root);

    let diagram = pipeviz::Diagram::from_config(cfg)?;
    let surface = pipeviz::CpuSurface::new(diagram.layout().canvas(), args.scale)?;
    let provider = pipeviz::FsIconProvider::new(assets_root);
    let opts = pipeviz::SessionOpts { seed: args.seed };

    pipeviz::AnimationSession::start(
        diagram,
        &provider,
        surface,
        opts,
        pipeviz::CancelToken::new(),
    )?
    .context("session was cancelled during startup")
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut sess = start_session(&args.diagram)?;
    sess.advance(args.frame);
    let frame = sess
        .render_frame()?
        .context("session was cancelled before the frame rendered")?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    pipeviz::write_png(&args.out, &frame)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut sess = start_session(&args.diagram)?;
    let pacing = if args.realtime {
        pipeviz::Pacing::Realtime(sess.diagram().fps())
    } else {
        pipeviz::Pacing::Unpaced
    };

    let mut sink = pipeviz::PngSequenceSink::new(&args.out_dir);
    let stats = sess.run(
        &mut sink,
        pipeviz::LoopOpts {
            frames: Some(args.frames),
            pacing,
        },
    )?;

    eprintln!(
        "wrote {} frames to {} ({} late)",
        stats.frames,
        args.out_dir.display(),
        stats.late_frames
    );
    Ok(())
}

fn cmd_preset() -> anyhow::Result<()> {
    let json = pipeviz::DiagramConfig::ci_cd_preset().to_json_pretty()?;
    println!("{json}");
    Ok(())
}
