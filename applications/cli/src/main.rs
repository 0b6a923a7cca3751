/// Segue - headless gapless playback harness
use clap::{Parser, Subcommand, ValueEnum};
use segue_cli::commands::{self, RunOptions};
use segue_cli::CliConfig;
use segue_core::RepeatMode;
use segue_metadata::LoftyTrackResolver;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "segue")]
#[command(about = "Gapless playlist playback on a simulated decoder", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./segue.toml if present)
    #[arg(short, long, global = true, env = "SEGUE_CONFIG")]
    config: Option<PathBuf>,

    /// State directory (overrides the configuration)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tracks found in files, directories or URLs
    Resolve {
        /// Files, directories or URLs
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Play tracks on the simulated decoder; resumes the saved playlist when
    /// no inputs are given
    Run {
        /// Files, directories or URLs
        inputs: Vec<String>,

        /// Playback speed multiplier
        #[arg(short, long)]
        speed: Option<f64>,

        /// Random next-track selection
        #[arg(long)]
        random: bool,

        /// Repeat mode
        #[arg(long, value_enum)]
        repeat: Option<RepeatArg>,

        /// Playlist index to start at
        #[arg(long, default_value_t = 0)]
        start: usize,

        /// Stop after this many seconds
        #[arg(long)]
        limit: Option<f64>,
    },
    /// Show the saved playlist and resume point
    State {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RepeatArg {
    Off,
    All,
    Track,
}

impl From<RepeatArg> for RepeatMode {
    fn from(arg: RepeatArg) -> Self {
        match arg {
            RepeatArg::Off => RepeatMode::Off,
            RepeatArg::All => RepeatMode::All,
            RepeatArg::Track => RepeatMode::Track,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "segue=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(state_dir) = cli.state_dir {
        config.storage.state_dir = state_dir;
    }

    match cli.command {
        Commands::Resolve { inputs, json } => resolve(&inputs, json)?,
        Commands::Run {
            inputs,
            speed,
            random,
            repeat,
            start,
            limit,
        } => {
            if let Some(speed) = speed {
                config.clock.speed = speed;
            }
            config.validate()?;

            let options = RunOptions {
                random: random.then_some(true),
                repeat: repeat.map(RepeatMode::from),
                start_index: start,
                limit: limit.map(Duration::from_secs_f64),
                ..RunOptions::default()
            };
            run(&config, &inputs, &options)?;
        }
        Commands::State { json } => state(&config, json)?,
    }

    Ok(())
}

fn resolve(inputs: &[String], json: bool) -> anyhow::Result<()> {
    let tracks = commands::resolve_inputs(&LoftyTrackResolver::new(), inputs);

    if json {
        println!("{}", serde_json::to_string_pretty(&tracks)?);
        return Ok(());
    }
    for (index, track) in tracks.iter().enumerate() {
        println!(
            "{:>3}  {}  {} - {}  [{}]",
            index,
            commands::format_duration(track),
            display_or(&track.artist, "Unknown Artist"),
            track.title,
            track.locator
        );
    }
    println!("{} track(s)", tracks.len());
    Ok(())
}

fn run(config: &CliConfig, inputs: &[String], options: &RunOptions) -> anyhow::Result<()> {
    let tracks = commands::resolve_inputs(&LoftyTrackResolver::new(), inputs);
    if !inputs.is_empty() && tracks.is_empty() {
        anyhow::bail!("none of the inputs could be resolved");
    }

    tracing::info!("Starting playback");
    tracing::info!("Speed: {}x", config.clock.speed);
    tracing::info!("State directory: {}", config.storage.state_dir.display());

    let summary = commands::run_playlist(config, tracks, options)?;

    println!("Played {} track(s):", summary.played.len());
    for title in &summary.played {
        println!("  {title}");
    }
    if summary.failures > 0 {
        println!("{} track(s) could not be played", summary.failures);
    }
    println!("Final state: {:?}", summary.final_state);
    Ok(())
}

fn state(config: &CliConfig, json: bool) -> anyhow::Result<()> {
    let (playlist, last) = commands::load_state(&config.storage.state_dir)?;

    if json {
        let value = serde_json::json!({ "playlist": playlist, "state": last });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "Mode: random={} repeat={}",
        last.mode.random, last.mode.repeat
    );
    match last.index {
        Some(index) => println!("Resume: track {} at {} ms", index, last.position_ms),
        None => println!("Resume: start of playlist"),
    }
    for (index, track) in playlist.iter().enumerate() {
        let marker = if last.index == Some(index) { ">" } else { " " };
        println!(
            "{marker}{:>3}  {}  {}",
            index,
            commands::format_duration(track),
            track.title
        );
    }
    println!("{} track(s)", playlist.len());
    Ok(())
}

fn display_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}
