use std::io;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use timeguru::cli::{Cli, Commands};
use timeguru::logging::{CLI_PREFIX, TUI_PREFIX, enable_logging};
use timeguru::{Config, Profile, SqliteBackend, SystemClock, utils};
use tracing::info;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let profile = Profile::from_dev_flag(cli.dev);

    let mut config = match &cli.config {
        Some(path) => {
            let default_database = utils::get_data_dir(profile)
                .map(|dir| dir.join("app.db").to_string_lossy().to_string())
                .unwrap_or_else(|| "app.db".to_string());
            Config::load_from(&utils::expand_path(path), &default_database)?
        }
        None => Config::load_with_profile(profile)?,
    };
    if let Some(database) = &cli.database {
        config.database_path = database.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    let db_path = config.get_database_path();
    let log_dir = utils::get_data_dir(profile)
        .or_else(|| db_path.parent().map(PathBuf::from))
        .ok_or_else(|| eyre!("Could not determine a directory for log files"))?;
    let is_tui = matches!(cli.command, None | Some(Commands::Tui));
    let prefix = if is_tui { TUI_PREFIX } else { CLI_PREFIX };
    enable_logging(prefix, &log_dir, &config.log_level)?;
    info!(database = %db_path.display(), "starting timeguru");

    let backend = SqliteBackend::new(
        db_path
            .to_str()
            .ok_or_else(|| eyre!("Database path contains invalid UTF-8"))?,
    )?;

    match cli.command {
        None | Some(Commands::Tui) => {
            let app = timeguru::tui::App::new(config, Box::new(backend), Box::new(SystemClock));
            timeguru::tui::run_event_loop(app)?;
        }
        Some(Commands::SignUp { email, password }) => {
            timeguru::cli::handle_sign_up(email, password, &backend, &mut io::stdout())?;
        }
        Some(Commands::List { email, password, json }) => {
            timeguru::cli::handle_list(email, password, json, &backend, &mut io::stdout())?;
        }
    }

    Ok(())
}
