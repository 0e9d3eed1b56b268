use clap::Parser;
use maze_common::db::parser::netlist::{self, NetlistError};
use maze_common::util::config::Config;
use maze_common::util::observer::NoopObserver;
use maze_common::util::{logger, visualization};
use maze_router::RouteCtx;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_MALFORMED: u8 = 2;
const EXIT_NOT_FOUND: u8 = 3;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Netlist file to route; falls back to the configured input
    netlist: Option<PathBuf>,

    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    /// Seed for the neighbour-ordering RNG (reproducible runs)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write a PNG of the routed layout
    #[arg(long, value_name = "FILE")]
    image: Option<String>,

    /// Dump the routed grid as text
    #[arg(long)]
    print_grid: bool,
}

fn main() -> ExitCode {
    logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<ExitCode> {
    let config = if args.config.exists() {
        log::info!("Loading configuration from {:?}", args.config);
        let config_str = std::fs::read_to_string(&args.config)
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;
        toml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?
    } else {
        log::warn!(
            "Configuration file {:?} not found. Using internal defaults.",
            args.config
        );
        Config::default()
    };

    let netlist_path = args
        .netlist
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.input.netlist_file));

    log::info!("Parsing netlist: {}", netlist_path.display());
    let mut layout = match netlist::parse(&netlist_path) {
        Ok(layout) => layout,
        Err(NetlistError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            log::error!("Netlist file not found: {}", netlist_path.display());
            return Ok(ExitCode::from(EXIT_NOT_FOUND));
        }
        Err(e @ NetlistError::Malformed { .. }) => {
            log::error!("{e}");
            return Ok(ExitCode::from(EXIT_MALFORMED));
        }
        Err(e) => return Err(e.into()),
    };

    let rng = match args.seed.or(config.router.seed) {
        Some(seed) => {
            log::info!("Seeding RNG with {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let summary = {
        let mut observer = NoopObserver;
        let mut ctx = RouteCtx::new(&mut layout, rng, &mut observer);
        maze_router::route(&mut ctx)
    };

    if args.print_grid || config.output.print_grid {
        let mut out = String::new();
        if layout.print_grid(&mut out).is_ok() {
            println!("{out}");
        }
    }

    if let Some(path) = args.image.as_ref().or(config.output.image.as_ref()) {
        visualization::draw_layout(&layout, path, 800, 800);
        log::info!("Wrote routed layout to {}", path);
    }

    println!("Routed {}/{} nets", summary.routed, summary.total);
    Ok(ExitCode::SUCCESS)
}
