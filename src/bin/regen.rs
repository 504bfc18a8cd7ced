use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "regen", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Regenerate one PNG per metadata record.
    Run(RunArgs),
    /// Show which layer file a trait resolves to.
    Resolve(ResolveArgs),
    /// List the metadata records a run would process.
    Scan(ScanArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// JSON run config. Flags given on the command line override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of per-item metadata JSON files.
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Root of the layer image library.
    #[arg(long)]
    layers: Option<PathBuf>,

    /// Output directory for `<id>.png` files.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Canvas width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Resampling filter used to fit layers to the canvas.
    #[arg(long, value_enum)]
    filter: Option<FilterChoice>,

    /// Keep existing output files instead of replacing them.
    #[arg(long)]
    no_overwrite: bool,
}

#[derive(Parser, Debug)]
struct ResolveArgs {
    /// Root of the layer image library.
    #[arg(long)]
    layers: PathBuf,

    /// Trait type, e.g. `Background`.
    #[arg(long)]
    trait_type: String,

    /// Trait value, e.g. `Blue#3`.
    #[arg(long)]
    value: String,
}

#[derive(Parser, Debug)]
struct ScanArgs {
    /// Directory of per-item metadata JSON files.
    #[arg(long)]
    metadata: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FilterChoice {
    Nearest,
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl From<FilterChoice> for regen::ResizeFilter {
    fn from(choice: FilterChoice) -> Self {
        match choice {
            FilterChoice::Nearest => Self::Nearest,
            FilterChoice::Triangle => Self::Triangle,
            FilterChoice::CatmullRom => Self::CatmullRom,
            FilterChoice::Lanczos3 => Self::Lanczos3,
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Resolve(args) => cmd_resolve(args),
        Command::Scan(args) => cmd_scan(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,regen::events=off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(args: RunArgs) -> anyhow::Result<regen::RunConfig> {
    let mut cfg = match &args.config {
        Some(path) => regen::RunConfig::from_path(path)?,
        None => {
            let (Some(metadata), Some(layers), Some(out)) =
                (&args.metadata, &args.layers, &args.out)
            else {
                anyhow::bail!("--metadata, --layers and --out are required without --config");
            };
            regen::RunConfig::new(metadata, layers, out)
        }
    };

    if let Some(dir) = args.metadata {
        cfg.metadata_dir = dir;
    }
    if let Some(dir) = args.layers {
        cfg.layer_dir = dir;
    }
    if let Some(dir) = args.out {
        cfg.out_dir = dir;
    }
    if let Some(width) = args.width {
        cfg.canvas.width = width;
    }
    if let Some(height) = args.height {
        cfg.canvas.height = height;
    }
    if let Some(filter) = args.filter {
        cfg.filter = filter.into();
    }
    if args.no_overwrite {
        cfg.overwrite = false;
    }
    Ok(cfg)
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let cfg = build_config(args)?;

    let mut worker = regen::RegenWorker::new();
    let events = worker.start(cfg).context("start regeneration")?;

    let mut summary = None;
    for event in events {
        match event {
            regen::RunEvent::Log(line) => println!("{line}"),
            regen::RunEvent::Progress(p) => eprintln!("progress {p:>3}%"),
            regen::RunEvent::Finished(s) => {
                summary = Some(s);
                break;
            }
        }
    }
    worker.join();

    let Some(summary) = summary else {
        anyhow::bail!("regeneration ended without a summary");
    };
    eprintln!(
        "saved {} / {} (skipped {}, failed {}, misses {})",
        summary.saved, summary.total, summary.skipped, summary.failed, summary.misses
    );
    if let regen::RunOutcome::Fatal(cause) = summary.outcome {
        anyhow::bail!("regeneration failed: {cause}");
    }
    Ok(())
}

fn cmd_resolve(args: ResolveArgs) -> anyhow::Result<()> {
    let library = regen::LayerLibrary::open(&args.layers)?;
    match library.locate(&args.trait_type, &args.value) {
        Some(hit) => println!(
            "{} ({:?}, {:?})",
            hit.entry.path.display(),
            hit.scope,
            hit.kind
        ),
        None => println!("[MISS] {}/{}", args.trait_type, args.value),
    }
    Ok(())
}

fn cmd_scan(args: ScanArgs) -> anyhow::Result<()> {
    let store = regen::MetadataStore::discover(&args.metadata)?;
    for record in store.records() {
        println!("{}\t{} attributes", record.id, record.attributes.len());
    }
    for path in store.ignored() {
        eprintln!("ignored {}", path.display());
    }
    eprintln!("{} records", store.len());
    Ok(())
}
