use clap::{ArgAction, Parser, Subcommand};
use commands::{clear, list, resolve};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "genrecall")]
#[command(about = "genrecall - Attach catalog ids and genres to a ranked movie list")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Directory holding cache/info.json, cache/titles.json and cache/cookie
    #[arg(long, global = true, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Write logs to a daily rotated file instead of stderr (default: <config dir>/logs/genrecall.log)
    #[arg(long, global = true, value_name = "FILE", num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve catalog ids and genres for the ranked titles
    #[command(long_about = "Resolve the first COUNT titles of the ranked list (all of them by default) against the catalog. Already resolved titles are skipped, so an interrupted run can simply be restarted.")]
    Resolve {
        /// Number of titles to process, from the top of the list
        #[arg(value_name = "COUNT")]
        count: Option<usize>,

        /// Clear the cache before resolving
        #[arg(long, action = ArgAction::SetTrue)]
        reset: bool,
    },
    /// Show resolved titles from the cache
    #[command(long_about = "List cached titles by rank with their genres. No requests are made.")]
    List {
        /// Only titles tagged with this genre (exact, case-sensitive)
        #[arg(long, value_name = "GENRE")]
        genre: Option<String>,
    },
    /// Clear cached data
    Clear {
        /// Delete the cache file
        #[arg(long, action = ArgAction::SetTrue)]
        cache: bool,

        /// Forget empty genre lists so the next run asks again
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "cache")]
        retry_empty_genres: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let paths = commands::path_manager(cli.cache_dir);
    let log_file = cli.log_file.map(|file| file.unwrap_or_else(|| paths.log_file()));
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Resolve { count, reset } => resolve::run_resolve(&paths, count, reset, &output).await,
        Commands::List { genre } => list::run_list(&paths, genre.as_deref(), &output),
        Commands::Clear { cache, retry_empty_genres } => clear::run_clear(&paths, cache, retry_empty_genres, &output),
    }
}
