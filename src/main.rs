use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use musorg::config::DEFAULT_KEEP_TAGS;
use musorg::error::VALIDATION_EXIT_CODE;
use musorg::{OrganizeConfig, OrganizeError, TagFixConfig};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_appender::non_blocking::WorkerGuard;

mod commands;
mod tui;
mod utils;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Append log output to this file instead of the terminal
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::Subcommand)]
enum Commands {
    /// Move songs to <artist>[/<album>]/[<NN>.]<title>.<ext> based on their tags
    Organize {
        /// Music directory (defaults to $XDG_MUSIC_DIR or ~/Music)
        music_dir: Option<String>,
        /// Only organize this artist directory, relative to the music directory
        #[arg(long, value_name = "DIR")]
        artist: Option<String>,
        /// Delete a song when its destination is already taken
        #[arg(short = 'd', long)]
        delete_conflicts: bool,
        /// Delete files that are not supported audio files
        #[arg(short = 'e', long = "delete-unrecognized-extensions")]
        delete_unrecognized: bool,
        /// Add an album directory level
        #[arg(short = 'A', long)]
        album: bool,
        /// Prefix titles with the two-digit track number
        #[arg(short = 'n', long)]
        numbering: bool,
        /// Capitalize words in names instead of lowercasing them
        #[arg(short = 'C', long)]
        capital: bool,
        /// Don't ask before organizing a directory with many artists
        #[arg(short = 'y', long)]
        yes: bool,
        /// Comma-separated top-level directories to leave alone (default: iTunes,playlists)
        #[arg(long, value_delimiter = ',')]
        reserved: Option<Vec<String>>,
    },
    /// Remove unwanted tags and clean up track numbers
    FixTags {
        /// Directory with the songs to fix
        dir: String,
        /// Tags to keep (default: title artist album genre)
        #[arg(long, num_args = 1.., value_name = "TAG")]
        keep: Option<Vec<String>>,
        /// Shorten "3/12" style track numbers or take them from the file name
        #[arg(long)]
        fix_number: bool,
        /// Also fix songs in subdirectories
        #[arg(short, long)]
        recursive: bool,
    },
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            builder.with_writer(writer).with_ansi(false).init();
            Ok(Some(guard))
        }
        None => {
            builder.with_writer(std::io::stderr).init();
            Ok(None)
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Organize {
            music_dir,
            artist,
            delete_conflicts,
            delete_unrecognized,
            album,
            numbering,
            capital,
            yes,
            reserved,
        } => {
            let music_dir = music_dir.unwrap_or_else(utils::get_default_music_dir);
            let defaults = OrganizeConfig::default();
            let config = OrganizeConfig {
                delete_conflicts,
                delete_unrecognized,
                album,
                numbering,
                capitalize: capital,
                assume_yes: yes,
                reserved_dirs: reserved.unwrap_or(defaults.reserved_dirs),
            };
            commands::organize::organize_music_library(&music_dir, artist.as_deref(), &config)
        }
        Commands::FixTags {
            dir,
            keep,
            fix_number,
            recursive,
        } => {
            let mut config = match keep {
                Some(keep) => TagFixConfig::new(keep),
                None => TagFixConfig::new(DEFAULT_KEEP_TAGS),
            };
            config.fix_number = fix_number;
            config.recursive = recursive;
            commands::fix_tags::fix_tags(&dir, &config)
        }
    }
}

/// Validation failures exit with 42, a declined prompt is not a failure.
fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<OrganizeError>() {
        Some(OrganizeError::Declined { path }) => {
            info!("Leaving '{}' untouched", path.display());
            0
        }
        Some(e) if e.is_validation_failure() => {
            error!("{:#}", err);
            VALIDATION_EXIT_CODE
        }
        _ => {
            error!("{:#}", err);
            1
        }
    }
}

fn main() -> ExitCode {
    // Load environment variables from a .env file if present
    dotenv().ok();
    let cli = Cli::parse();

    let _guard = match init_logging(cli.verbose, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(exit_status(&e)),
    }
}
