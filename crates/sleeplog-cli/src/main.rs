use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "sleeplog", version, about = "CBT-I sleep diary")]
struct Cli {
    /// Log debug output to stderr (overridden by SLEEPLOG_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diary entries
    Entry {
        #[command(subcommand)]
        action: commands::entry::EntryAction,
    },
    /// Derived metrics of one or every night
    Metrics(commands::metrics::MetricsArgs),
    /// Averages over a period
    Stats(commands::stats::StatsArgs),
    /// Sleep Restriction Therapy prescription
    Srt(commands::srt::SrtArgs),
    /// 24-hour grid layout of the diary
    Timeline(commands::timeline::TimelineArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Export, import, reset or seed the diary
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env("SLEEPLOG_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Entry { action } => commands::entry::run(action),
        Commands::Metrics(args) => commands::metrics::run(args),
        Commands::Stats(args) => commands::stats::run(args),
        Commands::Srt(args) => commands::srt::run(args),
        Commands::Timeline(args) => commands::timeline::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Data { action } => commands::data::run(action),
        Commands::Completions { shell } => commands::completions::run(shell, &mut Cli::command()),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
