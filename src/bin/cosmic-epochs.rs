use std::{
    fs::File,
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use cosmic_epochs::{
    Canvas, Catalog, EpochController, EpochId, Fps, FrameIndex, PresentationState,
    PreviewSettings, Scene, SceneConfig, SceneEvent, Stage, TimelineDriver, render_preview,
};
use rand::{SeedableRng, rngs::StdRng};

#[derive(Parser, Debug)]
#[command(name = "cosmic-epochs", version)]
struct Cli {
    /// Log lifecycle events to stderr (repeat for more detail).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dump the built-in epoch catalog as JSON.
    Catalog(CatalogArgs),
    /// Run a headless scene from the start epoch with auto-chaining and log what happens.
    Run(RunArgs),
    /// Render one epoch, alone, at a point on its local clock as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct CatalogArgs {
    /// Output path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Scene config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Custom catalog JSON; the built-in catalog when omitted.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Simulated frame rate.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Simulated duration in seconds.
    #[arg(long, default_value_t = 90.0)]
    seconds: f64,

    /// Output path for the JSON run log; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Epoch to render (e.g. `planck`, `dark-ages`).
    #[arg(long)]
    epoch: EpochId,

    /// Seconds on the epoch's local clock.
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 360)]
    height: u32,

    /// Population seed.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Multiplier on population counts.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,
}

#[derive(serde::Serialize)]
struct LoggedEvent {
    frame: FrameIndex,
    time: f64,
    #[serde(flatten)]
    event: SceneEvent,
}

#[derive(serde::Serialize)]
struct Snapshot {
    frame: FrameIndex,
    time: f64,
    particles: usize,
    visible: usize,
    presentation: PresentationState,
}

#[derive(serde::Serialize)]
struct RunLog {
    fps: u32,
    frames: u64,
    events: Vec<LoggedEvent>,
    snapshots: Vec<Snapshot>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Catalog(args) => cmd_catalog(args),
        Command::Run(args) => cmd_run(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

fn write_output(out: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            create_parent(path)?;
            let mut f = BufWriter::new(
                File::create(path).with_context(|| format!("create '{}'", path.display()))?,
            );
            f.write_all(text.as_bytes())
                .and_then(|()| f.flush())
                .with_context(|| format!("write '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_catalog(args: CatalogArgs) -> anyhow::Result<()> {
    let json = Catalog::builtin().to_json_pretty()?;
    write_output(args.out.as_deref(), &json)
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => SceneConfig::from_path(path)?,
        None => SceneConfig::default(),
    };
    config.auto_chain = true;
    let catalog = match &args.catalog {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::builtin(),
    };
    anyhow::ensure!(
        args.seconds.is_finite() && args.seconds >= 0.0,
        "--seconds must be finite and >= 0"
    );
    let fps = Fps::new(args.fps, 1)?;
    let dt = fps.frame_duration_secs();
    let frames = fps.secs_to_frames_floor(args.seconds);

    let start = config.start_epoch;
    let mut scene = Scene::new(config, catalog).context("build scene")?;
    let outcome = scene.begin_transition(start)?;
    tracing::info!(?outcome, %start, "opening transition");

    let mut log = RunLog {
        fps: args.fps,
        frames,
        events: Vec::new(),
        snapshots: Vec::new(),
    };
    let per_snapshot = u64::from(args.fps.max(1));
    for frame in 0..frames {
        scene
            .tick(dt)
            .with_context(|| format!("tick frame {frame}"))?;
        let time = scene.now();
        log.events
            .extend(scene.drain_events().into_iter().map(|event| LoggedEvent {
                frame: FrameIndex(frame),
                time,
                event,
            }));
        if frame % per_snapshot == 0 || frame + 1 == frames {
            log.snapshots.push(Snapshot {
                frame: FrameIndex(frame),
                time,
                particles: scene.mounted().map(EpochController::particle_count).sum(),
                visible: scene.mounted().map(EpochController::visible_count).sum(),
                presentation: scene.presentation(),
            });
        }
    }

    let json = serde_json::to_string_pretty(&log).context("serialize run log")?;
    write_output(args.out.as_deref(), &json)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.at.is_finite() && args.at >= 0.0,
        "--at must be finite and >= 0"
    );
    let catalog = Catalog::builtin();
    let def = catalog
        .get(args.epoch)
        .with_context(|| format!("epoch '{}' missing from catalog", args.epoch))?
        .clone();

    let mut stage = Stage::default();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut epoch = EpochController::new(def);
    epoch
        .mount(&mut rng, args.scale, &mut stage)
        .with_context(|| format!("mount {}", args.epoch))?;
    epoch.tick(0.0, &mut stage);
    epoch.definition().post.apply(&mut stage.post);

    // Scripts that reach into the previous epoch's materials cannot run standalone.
    let mut driver = match TimelineDriver::schedule(&epoch.definition().transition, 0.0, &stage) {
        Ok(driver) => Some(driver),
        Err(err) => {
            tracing::warn!(%err, epoch = %args.epoch, "rendering without transition timeline");
            None
        }
    };

    let step: f64 = 1.0 / 30.0;
    let mut t = 0.0;
    while t < args.at {
        let dt = step.min(args.at - t);
        t += dt;
        epoch.tick(dt, &mut stage);
        if let Some(driver) = driver.as_mut() {
            driver.evaluate(t, &mut stage);
        }
    }

    let settings = PreviewSettings {
        canvas: Canvas {
            width: args.width,
            height: args.height,
        },
        ..PreviewSettings::default()
    };
    let frame = render_preview(&stage, epoch.frames().map(|(_, states)| states), &settings)?;

    create_parent(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
