//! Command-line client for the song and weapon collections.
//!
//! # Responsibility
//! - Drive the core stores against a live backend from a terminal.
//! - Resolve settings from flags first, then `LISTSYNC_*` variables.
//!
//! # Invariants
//! - Every failure prints one line to stderr and exits with status 1.

use clap::{Parser, Subcommand};
use listsync_core::config::{ENV_API_KEY, ENV_API_KEY_PLACEMENT, ENV_PROJECT_URL};
use listsync_core::{
    default_log_level, init_logging, BackendConfig, ConfigError, LoggingError, NewSong,
    NewWeapon, SongId, SongStore, StoreError, WeaponId, WeaponStore,
};
use log::info;
use std::fmt::{Display, Formatter};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "listsync", about = "Song and weapon list client")]
struct Cli {
    #[command(flatten)]
    settings: Settings,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Default, clap::Args)]
struct Settings {
    /// Project base URL; falls back to LISTSYNC_PROJECT_URL.
    #[arg(long, global = true)]
    project_url: Option<String>,
    /// Anonymous API key; falls back to LISTSYNC_API_KEY.
    #[arg(long, global = true)]
    api_key: Option<String>,
    /// `query` or `header`; falls back to LISTSYNC_API_KEY_PLACEMENT.
    #[arg(long, global = true)]
    api_key_placement: Option<String>,
    /// Directory for rolling log files. Logging stays off without it.
    #[arg(long, global = true)]
    log_dir: Option<String>,
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage the song collection.
    Songs {
        #[command(subcommand)]
        action: SongAction,
    },
    /// Manage the weapon collection.
    Weapons {
        #[command(subcommand)]
        action: WeaponAction,
    },
    /// Print the core version.
    Version,
}

#[derive(Debug, Subcommand)]
enum SongAction {
    List,
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        singer: String,
        /// 1..=5.
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        lyrics: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
enum WeaponAction {
    List,
    Add {
        #[arg(long)]
        name: String,
        /// Non-numeric text is treated as no year.
        #[arg(long, default_value = "")]
        year: String,
        #[arg(long, default_value = "")]
        country: String,
        #[arg(long, default_value = "")]
        caliber: String,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Logging(LoggingError),
    Store(StoreError),
    InvalidSongId(String),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::Logging(err) => write!(f, "logging error: {err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::InvalidSongId(value) => write!(f, "invalid song id `{value}`"),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("listsync: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    if let Some(log_dir) = cli.settings.log_dir.as_deref() {
        let level = cli
            .settings
            .log_level
            .as_deref()
            .unwrap_or_else(|| default_log_level());
        init_logging(level, log_dir)?;
    }

    match cli.command {
        Command::Version => {
            println!("listsync_core version={}", listsync_core::core_version());
            Ok(())
        }
        Command::Songs { action } => {
            let config = resolve_config(&cli.settings, |name| std::env::var(name).ok())?;
            run_songs(&SongStore::connect(&config), action)
        }
        Command::Weapons { action } => {
            let config = resolve_config(&cli.settings, |name| std::env::var(name).ok())?;
            run_weapons(&WeaponStore::connect(&config), action)
        }
    }
}

fn run_songs(store: &SongStore, action: SongAction) -> Result<(), CliError> {
    match action {
        SongAction::List => {
            store.load()?;
            for song in store.records() {
                println!(
                    "{}\t{}\t{}\t{}",
                    song.id, song.title, song.singer, song.rating
                );
            }
        }
        SongAction::Add {
            title,
            singer,
            rating,
            lyrics,
        } => {
            let song = store.add_new(NewSong {
                title,
                singer,
                rating,
                lyrics,
            })?;
            info!("event=cli_add module=cli status=ok kind=song id={}", song.id);
            println!("{}", song.id);
        }
        SongAction::Delete { id } => {
            let parsed =
                SongId::parse_str(id.trim()).map_err(|_| CliError::InvalidSongId(id.clone()))?;
            store.delete_by_id(&parsed)?;
            println!("deleted {parsed}");
        }
    }
    Ok(())
}

fn run_weapons(store: &WeaponStore, action: WeaponAction) -> Result<(), CliError> {
    match action {
        WeaponAction::List => {
            store.load()?;
            for weapon in store.records() {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    weapon.id,
                    weapon.name,
                    display_optional(weapon.year),
                    display_optional(weapon.country),
                    display_optional(weapon.caliber),
                    display_optional(weapon.created_at),
                );
            }
        }
        WeaponAction::Add {
            name,
            year,
            country,
            caliber,
        } => {
            let weapon = store.add_new(NewWeapon::from_form(&name, &year, &country, &caliber))?;
            info!(
                "event=cli_add module=cli status=ok kind=weapon id={}",
                weapon.id
            );
            println!("{}", weapon.id);
        }
        WeaponAction::Delete { id } => {
            let id = WeaponId::new(id);
            store.delete_by_id(&id)?;
            println!("deleted {id}");
        }
    }
    Ok(())
}

/// Builds backend settings, preferring flags over the environment.
fn resolve_config(
    settings: &Settings,
    env: impl Fn(&str) -> Option<String>,
) -> Result<BackendConfig, ConfigError> {
    BackendConfig::from_lookup(|name| {
        let flag = match name {
            ENV_PROJECT_URL => settings.project_url.clone(),
            ENV_API_KEY => settings.api_key.clone(),
            ENV_API_KEY_PLACEMENT => settings.api_key_placement.clone(),
            _ => None,
        };
        flag.or_else(|| env(name))
    })
}

fn display_optional<T: Display>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}
