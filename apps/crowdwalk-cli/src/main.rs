use anyhow::Context as _;
use clap::{Parser, Subcommand};
use crowdwalk_assets::ResourceCache;
use crowdwalk_input::{InputState, Key};
use crowdwalk_render::{DebugTextRenderer, FrameRenderer, Renderer, ShaderParam};
use crowdwalk_sample::{load_resources, FrameContext, SampleConfig, SkeletalSample, UiEvent};
use crowdwalk_tools::{ButtonId, SceneInspector};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crowdwalk-cli", about = "Headless runner for the crowd-walk sample")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Sample configuration (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Resource manifest (JSON) merged over the built-in resources
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    /// Seed for actor placement
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info and the spawned scene summary
    Info,
    /// Run the sample for a number of frames without a window
    Run {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "60")]
        frames: u32,
        /// Fixed time step in seconds
        #[arg(long, default_value = "0.016")]
        dt: f32,
        /// Toggle debug geometry on the first frame
        #[arg(long)]
        debug: bool,
        /// Number of actors to list individually
        #[arg(long, default_value = "5")]
        list: usize,
    },
    /// Press a shader parameter button repeatedly and print each label
    Tune {
        /// SampleRadius, Beta, Eps or Sigma
        param: ShaderParam,
        /// Number of presses; negative values press the decrease button
        #[arg(allow_hyphen_values = true)]
        steps: i32,
    },
    /// Write the built-in resource manifest
    Assets {
        /// Output path
        #[arg(short, long, default_value = "resources.json")]
        out: PathBuf,
    },
}

fn start(cli: &Cli, frame_state: &mut FrameRenderer) -> anyhow::Result<SkeletalSample> {
    let mut config = SampleConfig::load_optional(cli.config.as_deref())?;
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    let cache = load_resources(cli.assets.as_deref())?;
    SkeletalSample::start(&config, &cache, frame_state).context("failed to start sample")
}

fn run(
    sample: &mut SkeletalSample,
    frame_state: &mut FrameRenderer,
    frames: u32,
    dt: f32,
    debug: bool,
) -> usize {
    let mut input = InputState::new();
    let mut moved = 0;
    for frame in 0..frames {
        input.set_key(Key::Space, debug && frame == 0);
        {
            let mut ctx = FrameContext::new(&input, frame_state);
            moved = sample.run_frame(dt, std::iter::empty::<UiEvent>(), &mut ctx);
        }
        input.end_frame();
        // The last frame's request stays pending so the dump can report it.
        if frame + 1 < frames {
            frame_state.take_debug_request();
        }
    }
    moved
}

fn tune(
    sample: &mut SkeletalSample,
    frame_state: &mut FrameRenderer,
    param: ShaderParam,
    steps: i32,
) -> Vec<String> {
    let button = if steps >= 0 {
        ButtonId::increase(param)
    } else {
        ButtonId::decrease(param)
    };
    let input = InputState::new();
    let mut ctx = FrameContext::new(&input, frame_state);
    (0..steps.unsigned_abs())
        .map(|_| {
            sample.handle_pressed(button, &mut ctx);
            sample.panel().label(param).to_string()
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut frame_state = FrameRenderer::new();

    match &cli.command {
        Commands::Info => {
            println!("crowdwalk-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("sample: {}", crowdwalk_sample::crate_info());
            println!("render: {}", crowdwalk_render::crate_info());
            println!("tools: {}", crowdwalk_tools::crate_info());

            let sample = start(&cli, &mut frame_state)?;
            println!("seed: {}", sample.seed());
            println!(
                "{}",
                SceneInspector::summary(sample.scene(), sample.components())
            );
            for row in sample.panel().rows() {
                println!("  {}", row.label());
            }
        }
        Commands::Run {
            frames,
            dt,
            debug,
            list,
        } => {
            let mut sample = start(&cli, &mut frame_state)?;
            let moved = run(&mut sample, &mut frame_state, *frames, *dt, *debug);
            tracing::info!(frames = *frames, moved, "run finished");

            let dump = DebugTextRenderer { max_actors: *list }
                .render(&sample.render_view(), &frame_state);
            print!("{dump}");
            println!(
                "{}",
                SceneInspector::summary(sample.scene(), sample.components())
            );
            for spawn in sample.actors().iter().take(*list) {
                if let Some(info) =
                    SceneInspector::inspect_entity(sample.scene(), sample.components(), spawn.id)
                {
                    println!("  {info}");
                }
            }
        }
        Commands::Tune { param, steps } => {
            let mut sample = start(&cli, &mut frame_state)?;
            println!("{}", sample.panel().label(*param));
            for label in tune(&mut sample, &mut frame_state, *param, *steps) {
                println!("{label}");
            }
        }
        Commands::Assets { out } => {
            ResourceCache::builtin()
                .save(out)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Wrote {}", out.display());
        }
    }

    Ok(())
}
