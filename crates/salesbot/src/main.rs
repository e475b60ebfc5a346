//! salesbot: plan a waypoint route and write it into the robot program.
//!
//! Reads numbered waypoints from a JSON file, picks the shorter of a
//! nearest-neighbour tour and an oracle tour from the origin, and rewrites
//! the coordinate table of an assembly program in place.
//!
//! # Usage
//!
//! ```text
//! cargo run --bin salesbot -- [OPTIONS] <POINTS_JSON> <ASM_FILE>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use env_logger::{Builder, Target};
use log::LevelFilter;
use salesbot_asm::PatchFileError;
use salesbot_route::{RouteConfig, RouteError, RoutePlan, TourOracleKind, Units};

/// Route the salesbot through its waypoints.
///
/// Plans a visiting order starting at the origin and replaces the
/// coordinate table between `;COORDINATE_TABLE_BEGIN` and
/// `;COORDINATE_TABLE_END` in the target program.
#[derive(Parser)]
#[command(name = "salesbot", version)]
struct Cli {
    /// JSON object mapping "1".."N" to `[x, y]`.
    points_json: PathBuf,

    /// Assembly program to patch.
    asm_file: PathBuf,

    /// Origin horizontal position (robot units).
    #[arg(long, default_value_t = RouteConfig::DEFAULT_ORIGIN_X, allow_negative_numbers = true)]
    origin_x: i32,

    /// Origin vertical position (robot units).
    #[arg(long, default_value_t = RouteConfig::DEFAULT_ORIGIN_Y, allow_negative_numbers = true)]
    origin_y: i32,

    /// Units of the coordinates in the points file.
    #[arg(long, value_enum, default_value_t = CLI_DEFAULT_UNITS)]
    units: UnitsArg,

    /// Approximate-cycle oracle competing with nearest-neighbour.
    #[arg(long, value_enum, default_value_t = CLI_DEFAULT_ORACLE)]
    oracle: Oracle,

    /// Full route config as a JSON string.
    ///
    /// When provided, the origin, units and oracle flags are ignored.
    /// Missing fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Print the patched program to stdout instead of writing it.
    #[arg(long)]
    dry_run: bool,

    /// Print the route plan as JSON on stdout.
    #[arg(long, conflicts_with = "dry_run")]
    json: bool,

    /// More log output (repeatable).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Less log output (repeatable).
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "verbose")]
    quiet: u8,
}

/// Point source units selection.
#[derive(Clone, Copy, ValueEnum)]
enum UnitsArg {
    /// Robot-native integer units.
    Robot,
    /// Feet, converted to robot units.
    Feet,
}

/// Tour oracle selection.
#[derive(Clone, Copy, ValueEnum)]
enum Oracle {
    /// Minimum spanning tree preorder walk.
    DoubleTree,
    /// Double-tree walk refined by 2-opt.
    TwoOpt,
}

const fn units_from_route(units: Units) -> UnitsArg {
    match units {
        Units::Robot => UnitsArg::Robot,
        Units::Feet => UnitsArg::Feet,
    }
}

const fn oracle_from_route(kind: TourOracleKind) -> Oracle {
    match kind {
        TourOracleKind::DoubleTree => Oracle::DoubleTree,
        TourOracleKind::TwoOpt => Oracle::TwoOpt,
    }
}

/// CLI defaults derived from [`RouteConfig`] so the two cannot diverge.
const CLI_DEFAULT_UNITS: UnitsArg = units_from_route(RouteConfig::DEFAULT_UNITS);
const CLI_DEFAULT_ORACLE: Oracle = oracle_from_route(RouteConfig::DEFAULT_ORACLE);

/// A failed run, tagged with the stage it failed in.
#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error("invalid --config-json: {0}")]
    Config(#[source] serde_json::Error),

    #[error("{}: {source}", .path.display())]
    ReadPoints {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Load(#[source] RouteError),

    #[error("{0}")]
    Plan(#[source] RouteError),

    #[error("{0}")]
    Patch(#[source] PatchFileError),

    #[error("writing output: {0}")]
    Output(#[source] io::Error),
}

impl RunError {
    const fn stage(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::ReadPoints { .. } | Self::Load(_) => "load",
            Self::Plan(_) => "plan",
            Self::Patch(_) => "patch",
            Self::Output(_) => "output",
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "InvalidInput",
            Self::ReadPoints { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                "FileNotFound"
            }
            Self::ReadPoints { .. } | Self::Output(_) => "Io",
            Self::Load(e) | Self::Plan(e) => e.kind(),
            Self::Patch(e) => e.kind(),
        }
    }
}

/// Build a [`RouteConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<RouteConfig, RunError> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(RunError::Config);
    }

    Ok(RouteConfig {
        origin_x: cli.origin_x,
        origin_y: cli.origin_y,
        units: match cli.units {
            UnitsArg::Robot => Units::Robot,
            UnitsArg::Feet => Units::Feet,
        },
        oracle: match cli.oracle {
            Oracle::DoubleTree => TourOracleKind::DoubleTree,
            Oracle::TwoOpt => TourOracleKind::TwoOpt,
        },
    })
}

/// Map `-v`/`-q` counts onto a level, starting from `info`.
fn log_level(verbose: u8, quiet: u8) -> LevelFilter {
    match i16::from(verbose) - i16::from(quiet) {
        i16::MIN..=-3 => LevelFilter::Off,
        -2 => LevelFilter::Error,
        -1 => LevelFilter::Warn,
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the stderr logger. `RUST_LOG` overrides the flag-derived level.
fn init_logger(level: LevelFilter) {
    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .parse_default_env()
        .target(Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "{:<5} [{}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        });
    // A logger already installed is not worth failing the run over.
    let _ = builder.try_init();
}

fn run(cli: &Cli) -> Result<(), RunError> {
    let config = config_from_cli(cli)?;
    log::debug!("config: {config:?}");

    let json = std::fs::read_to_string(&cli.points_json).map_err(|source| RunError::ReadPoints {
        path: cli.points_json.clone(),
        source,
    })?;
    let store =
        salesbot_route::load_store(&json, config.units, config.origin()).map_err(RunError::Load)?;
    log::info!(
        "loaded {} waypoints from {}",
        store.len(),
        cli.points_json.display()
    );

    let plan = salesbot_route::plan_route(&store, &config).map_err(RunError::Plan)?;

    if cli.dry_run {
        let patched = dry_run(&cli.asm_file, &plan)?;
        io::stdout()
            .write_all(&patched)
            .map_err(RunError::Output)?;
        return Ok(());
    }

    let summary = salesbot_asm::patch_file(&cli.asm_file, plan.tour.waypoints())
        .map_err(RunError::Patch)?;

    if cli.json {
        let json = serde_json::to_string_pretty(&plan)
            .map_err(|e| RunError::Output(io::Error::other(e)))?;
        println!("{json}");
    } else {
        println!("{}", report(&plan));
        println!(
            "wrote {} entries to {} ({} bytes)",
            summary.entries,
            cli.asm_file.display(),
            summary.bytes
        );
    }
    Ok(())
}

/// Patch in memory only and return the new program.
fn dry_run(path: &Path, plan: &RoutePlan) -> Result<Vec<u8>, RunError> {
    let source = salesbot_asm::read_program(path).map_err(RunError::Patch)?;
    let patched = salesbot_asm::patch_table(&source, plan.tour.waypoints()).map_err(|source| {
        RunError::Patch(PatchFileError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    })?;
    log::info!(
        "dry run: {} old table lines would be replaced by {} entries",
        patched.replaced_lines,
        patched.entries
    );
    Ok(patched.content)
}

/// Human-readable summary of a plan.
fn report(plan: &RoutePlan) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    let _ = writeln!(out, "{:<24} {:>12}", "Candidate", "Length");
    let _ = writeln!(out, "{}", "-".repeat(37));
    for candidate in &plan.candidates {
        let _ = writeln!(
            out,
            "{:<24} {:>12.3}",
            candidate.heuristic.to_string(),
            candidate.length
        );
    }
    let _ = writeln!(out);
    let _ = write!(
        out,
        "chosen: {} ({:.3})\ntour:   {}",
        plan.heuristic, plan.length, plan.tour
    );
    out
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(log_level(cli.verbose, cli.quiet));

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error[{}] {}: {e}", e.stage(), e.kind());
            ExitCode::FAILURE
        }
    }
}
