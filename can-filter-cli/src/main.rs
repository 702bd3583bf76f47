//! CAN ID Filter CLI Application
//!
//! Command-line front end for the can-filter-core library. It adds:
//! - Argument parsing for filter/preview/preset operations
//! - Progress logging during long filter runs
//! - Summary rendering after a completed run

use anyhow::{bail, Context, Result};
use can_filter_core::{
    IdentifierSpec, MatchConfig, Pipeline, PresetStore, RunControl, DEFAULT_PREVIEW_LIMIT,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod report;

/// CAN ID Filter - filter ASCII CAN trace logs by identifier
#[derive(Parser, Debug)]
#[command(name = "can-filter-cli")]
#[command(about = "Filter .asc CAN trace logs by CAN identifier", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the preset file (default: can_id_presets.json)
    #[arg(long, value_name = "FILE", global = true)]
    presets_file: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter an input trace into an output file
    Filter {
        /// Input trace file (.asc)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output file for selected lines (truncate-created)
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        #[command(flatten)]
        ids: IdSource,

        #[command(flatten)]
        match_opts: MatchOpts,
    },

    /// Print the first matching lines without writing a file
    Preview {
        /// Input trace file (.asc)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        ids: IdSource,

        #[command(flatten)]
        match_opts: MatchOpts,

        /// Maximum number of matching lines to show
        #[arg(short, long, value_name = "COUNT", default_value_t = DEFAULT_PREVIEW_LIMIT)]
        limit: usize,
    },

    /// Manage saved identifier-list presets
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
struct IdSource {
    /// Comma-separated CAN IDs (decimal, 0x-prefixed hex, or free text)
    #[arg(long, value_name = "LIST")]
    ids: Option<String>,

    /// Take the identifier list from a saved preset
    #[arg(long, value_name = "NAME")]
    preset: Option<String>,
}

#[derive(clap::Args, Debug)]
struct MatchOpts {
    /// Match identifiers case-sensitively
    #[arg(long)]
    case_sensitive: bool,

    /// Match identifiers only on word boundaries
    #[arg(long)]
    exact: bool,

    /// Invert selection: keep lines that match no identifier
    #[arg(long)]
    exclude: bool,
}

impl MatchOpts {
    fn to_config(&self) -> MatchConfig {
        MatchConfig::new()
            .with_case_sensitive(self.case_sensitive)
            .with_exact_match(self.exact)
            .with_exclude(self.exclude)
    }
}

#[derive(Subcommand, Debug)]
enum PresetAction {
    /// Save (or overwrite) a named preset
    Save {
        /// Preset name
        name: String,

        /// Comma-separated CAN IDs to store under the name
        #[arg(long, value_name = "LIST")]
        ids: String,
    },

    /// List saved preset names
    List,

    /// Print the identifier list stored under a preset name
    Show {
        /// Preset name
        name: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    log::info!("CAN ID Filter CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using filter library v{}", can_filter_core::VERSION);

    let store = match &args.presets_file {
        Some(path) => PresetStore::new(path),
        None => PresetStore::default(),
    };

    match args.command {
        Command::Filter {
            input,
            output,
            ids,
            match_opts,
        } => run_filter(&input, &output, &ids, &match_opts, &store),
        Command::Preview {
            input,
            ids,
            match_opts,
            limit,
        } => run_preview(&input, &ids, &match_opts, limit, &store),
        Command::Preset { action } => run_preset(&action, &store),
    }
}

/// Resolve the identifier list from --ids or a saved preset
fn resolve_spec(ids: &IdSource, store: &PresetStore) -> Result<IdentifierSpec> {
    let text = match (&ids.ids, &ids.preset) {
        (Some(text), _) => text.clone(),
        (None, Some(name)) => store
            .get(name)
            .with_context(|| format!("loading preset '{name}'"))?,
        (None, None) => bail!("either --ids or --preset is required"),
    };
    Ok(IdentifierSpec::parse(&text)?)
}

fn run_filter(
    input: &PathBuf,
    output: &PathBuf,
    ids: &IdSource,
    match_opts: &MatchOpts,
    store: &PresetStore,
) -> Result<()> {
    let spec = resolve_spec(ids, store)?;
    let config = match_opts.to_config();
    let pipeline = Pipeline::new(&spec, &config)?;

    // Relay pipeline progress to the log at 10% steps
    let mut last_reported = 0u64;
    let control = RunControl::new().on_progress(|progress| {
        let step = (progress.percent() / 10.0) as u64;
        if step > last_reported {
            last_reported = step;
            log::info!("filtering... {}%", step * 10);
        }
    });

    let stats = pipeline
        .run_with(input, output, control)
        .with_context(|| format!("filtering {:?}", input))?;

    println!("{}", report::run_summary(&stats, output));
    Ok(())
}

fn run_preview(
    input: &PathBuf,
    ids: &IdSource,
    match_opts: &MatchOpts,
    limit: usize,
    store: &PresetStore,
) -> Result<()> {
    let spec = resolve_spec(ids, store)?;
    let pipeline = Pipeline::new(&spec, &match_opts.to_config())?;

    let lines = pipeline
        .preview(input, limit)
        .with_context(|| format!("previewing {:?}", input))?;

    if lines.is_empty() {
        println!("No matches found in the file.");
    } else {
        for line in &lines {
            println!("{line}");
        }
        log::info!("showing {} matching lines (limit {})", lines.len(), limit);
    }
    Ok(())
}

fn run_preset(action: &PresetAction, store: &PresetStore) -> Result<()> {
    match action {
        PresetAction::Save { name, ids } => {
            // Parse up front so a malformed list is rejected before saving
            let spec = IdentifierSpec::parse(ids)?;
            store.save(name, ids)?;
            println!(
                "Preset '{}' saved ({} identifiers) to {:?}",
                name,
                spec.len(),
                store.path()
            );
        }
        PresetAction::List => {
            let names = store.list()?;
            if names.is_empty() {
                println!("No presets saved.");
            } else {
                for name in names {
                    println!("{name}");
                }
            }
        }
        PresetAction::Show { name } => {
            println!("{}", store.get(name)?);
        }
    }
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
