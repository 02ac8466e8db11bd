#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the BioCrowds simulation headlessly.

mod headless;
mod report;

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use biocrowds_core::{CrowdConfig, Substrate};
use biocrowds_rendering::{
    render_field, Color, ControlToggles, DebugView, FrameInput, Presentation, RenderingBackend,
};
use biocrowds_world::{self as world, query, World};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::{
    headless::HeadlessBackend,
    report::{RunReport, RunStats},
};

#[derive(Parser, Debug)]
#[command(
    name = "biocrowds",
    version,
    about = "Run the BioCrowds marker-based crowd simulation without a window"
)]
struct Cli {
    /// TOML file providing the crowd configuration; omitted fields keep their defaults.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Mode,
}

/// Flags overriding single configuration fields after the file is loaded.
#[derive(Args, Debug, Default)]
struct ConfigOverrides {
    /// Number of agents.
    #[arg(long, global = true)]
    agents: Option<u32>,
    /// Floor width in pixels.
    #[arg(long, global = true)]
    floor_width: Option<u32>,
    /// Floor height in pixels.
    #[arg(long, global = true)]
    floor_height: Option<u32>,
    /// Half-width in pixels of each agent's aggregation window.
    #[arg(long, global = true)]
    vis_radius: Option<f32>,
    /// Normalized distance travelled per tick.
    #[arg(long, global = true)]
    step_size: Option<f32>,
    /// Seed for the initial scene.
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Execution strategy for every stage.
    #[arg(long, global = true, value_enum)]
    substrate: Option<SubstrateArg>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Advance the simulation and report on the final frame.
    Run {
        /// Number of ticks to request.
        #[arg(long, default_value_t = 100)]
        ticks: u64,
        /// Frame numbers at which the pause toggle is pressed.
        #[arg(long, value_delimiter = ',')]
        toggle_pause_at: Vec<u64>,
        /// Frame numbers at which a reset is requested.
        #[arg(long, value_delimiter = ',')]
        reset_at: Vec<u64>,
        /// Frame numbers at which the hold-positions toggle is pressed.
        #[arg(long, value_delimiter = ',')]
        toggle_hold_at: Vec<u64>,
        /// Report format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
        output: OutputFormat,
    },
    /// Render a debug view of the floor after a number of ticks.
    Field {
        /// Number of ticks to request before writing the image.
        #[arg(long, default_value_t = 1)]
        ticks: u64,
        /// Debug view: 1 agent ids, 2 marker weights, 3 directional weights,
        /// 4 positions, 5 movement vectors, 6 combined.
        #[arg(long, default_value_t = 1)]
        view: u8,
        /// Destination PPM file.
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SubstrateArg {
    Sequential,
    Parallel,
}

impl From<SubstrateArg> for Substrate {
    fn from(value: SubstrateArg) -> Self {
        match value {
            SubstrateArg::Sequential => Self::Sequential,
            SubstrateArg::Parallel => Self::Parallel,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human readable counters.
    Summary,
    /// Counters and every agent of the final frame as JSON.
    Json,
}

/// Entry point for the BioCrowds command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), &cli.overrides)?;

    match cli.command {
        Mode::Run {
            ticks,
            toggle_pause_at,
            reset_at,
            toggle_hold_at,
            output,
        } => {
            let script = build_script(&toggle_pause_at, &reset_at, &toggle_hold_at);
            let backend = HeadlessBackend::new(ticks, script);
            let (world, stats) = drive(config, backend, None)?;
            let report = RunReport::capture(&world, stats, output == OutputFormat::Json);
            match output {
                OutputFormat::Summary => report.print_summary(),
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&report)
                        .context("failed to serialize run report")?;
                    println!("{json}");
                }
            }
        }
        Mode::Field {
            ticks,
            view,
            output,
        } => {
            if ticks == 0 {
                bail!("at least one tick is required to render a field");
            }
            let view = DebugView::from_mode(view)?;
            let backend = HeadlessBackend::new(ticks, BTreeMap::new()).with_snapshot(output);
            let _ = drive(config, backend, Some(view))?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<CrowdConfig> {
    let mut config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read configuration {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("failed to parse configuration {}", path.display()))?
        }
        None => CrowdConfig::default(),
    };
    overrides.apply(&mut config);
    Ok(config)
}

impl ConfigOverrides {
    fn apply(&self, config: &mut CrowdConfig) {
        if let Some(agents) = self.agents {
            config.agent_count = agents;
        }
        if let Some(width) = self.floor_width {
            config.floor_width = width;
        }
        if let Some(height) = self.floor_height {
            config.floor_height = height;
        }
        if let Some(radius) = self.vis_radius {
            config.agent_vis_radius = radius;
        }
        if let Some(step_size) = self.step_size {
            config.step_size = step_size;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(substrate) = self.substrate {
            config.substrate = substrate.into();
        }
    }
}

fn build_script(
    toggle_pause_at: &[u64],
    reset_at: &[u64],
    toggle_hold_at: &[u64],
) -> BTreeMap<u64, FrameInput> {
    let mut script: BTreeMap<u64, FrameInput> = BTreeMap::new();
    for frame in toggle_pause_at {
        let input = script.entry(*frame).or_default();
        input.pause_toggle = !input.pause_toggle;
    }
    for frame in reset_at {
        script.entry(*frame).or_default().reset_pressed = true;
    }
    for frame in toggle_hold_at {
        let input = script.entry(*frame).or_default();
        input.hold_toggle = !input.hold_toggle;
    }
    script
}

/// Runs the world under `backend`, forwarding control toggles as commands.
fn drive(
    config: CrowdConfig,
    backend: HeadlessBackend,
    debug_view: Option<DebugView>,
) -> Result<(World, RunStats)> {
    let floor = config.floor();
    let mut world = World::new(config).context("invalid crowd configuration")?;
    let mut toggles = ControlToggles::default();
    let mut stats = RunStats::default();
    let mut commands = Vec::new();
    let mut events = Vec::new();

    let presentation = Presentation::new("BioCrowds", Color::BLACK, floor, debug_view);
    backend.run(presentation, |input, frame| {
        toggles.absorb(input);
        commands.clear();
        toggles.commands_for_tick(&mut commands);

        events.clear();
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
        stats.record(&events);

        let agents = query::agents(&world);
        frame.update_from(query::frame(&world), agents.radii, agents.channels);
        if let (Some(view), Some(buffers)) = (debug_view, query::fields(&world)) {
            frame.field = Some(render_field(
                view,
                buffers,
                query::previous_positions(&world),
            ));
        }
        Ok(())
    })?;

    info!(
        tick = query::tick_index(&world),
        frames = stats.frames_advanced,
        skipped = stats.ticks_skipped,
        "run finished"
    );
    Ok((world, stats))
}
