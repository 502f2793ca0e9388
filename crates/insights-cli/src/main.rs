#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use insights_core::timing;
use output::{OutputMode, resolve_output_mode};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "insights: dependency-graph analysis for append-only issue trackers",
    long_about = None,
    after_help = "QUICK REFERENCE:\n    insights analyze              # full two-phase graph analysis\n    insights triage               # ranked actionable set + quick-ref\n    insights plan                 # parallel execution tracks\n    insights recommend            # priority-change recommendations\n    insights baseline save        # snapshot the current graph\n    insights drift                # compare current graph to baseline\n    insights diff <from> <to>     # compare two issue snapshots directly"
)]
struct Cli {
    /// Output format: pretty, text, or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Hidden alias for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Force full (untiered) analysis regardless of graph size.
    #[arg(long, global = true)]
    force_full: bool,

    /// Cap entries emitted per per-issue map (pagerank, betweenness, ...).
    #[arg(long, global = true)]
    map_limit: Option<usize>,

    /// Emit a command timing report to stderr.
    #[arg(long, global = true)]
    timing: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Full two-phase dependency-graph analysis.
    Analyze(cmd::analyze::AnalyzeArgs),
    /// Ranked actionable set, tracks, and quick-ref views.
    Triage(cmd::triage::TriageArgs),
    /// Parallel execution tracks, optionally focused on one issue.
    Plan(cmd::plan::PlanArgs),
    /// Priority-change recommendations with confidence and what-if data.
    Recommend(cmd::recommend::RecommendArgs),
    /// Save or show the baseline snapshot `drift` compares against.
    Baseline(cmd::baseline::BaselineArgs),
    /// Compare the current graph against the saved baseline.
    Drift(cmd::drift::DriftArgs),
    /// Compare two issue snapshots directly.
    Diff(cmd::diff::DiffArgs),
    /// Generate shell completion scripts.
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "insights=debug" } else { "insights=info" };
    let filter = EnvFilter::try_from_env("INSIGHTS_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(std::io::stderr)).init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(false);

    if cli.timing {
        timing::set_timing_enabled(true);
    } else if timing::timing_enabled_from_env() {
        timing::set_timing_enabled(true);
    }

    let mode = cli.output_mode();
    let result = dispatch(&cli, mode);

    if timing::is_timing_enabled() {
        let report = timing::collect_report();
        if !report.is_empty() {
            eprintln!("{}", report.display_table());
        }
    }

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let exit_code = if let Some(insights_err) = err.downcast_ref::<insights_core::error::InsightsError>() {
                let _ = output::render_insights_error(mode, insights_err);
                match insights_err {
                    insights_core::error::InsightsError::Loader(
                        insights_core::error::LoaderError::NotFound { .. }
                        | insights_core::error::LoaderError::NoUsableFile { .. },
                    ) => 4,
                    _ => 3,
                }
            } else {
                eprintln!("error: {err:#}");
                1
            };
            std::process::exit(exit_code);
        }
    }
}

fn dispatch(cli: &Cli, mode: OutputMode) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Analyze(args) => cmd::analyze::run(args, mode, cli.force_full, cli.map_limit),
        Commands::Triage(args) => cmd::triage::run(args, mode, cli.force_full, cli.map_limit),
        Commands::Plan(args) => cmd::plan::run(args, mode, cli.force_full, cli.map_limit),
        Commands::Recommend(args) => cmd::recommend::run(args, mode, cli.force_full, cli.map_limit),
        Commands::Baseline(args) => cmd::baseline::run(args, mode, cli.force_full),
        Commands::Drift(args) => cmd::drift::run(args, mode, cli.force_full),
        Commands::Diff(args) => cmd::diff::run(args, mode),
        Commands::Completions(args) => {
            cmd::completions::run_completions(args.shell, &mut Cli::command())?;
            Ok(0)
        }
    }
}
