//! pokedex CLI
//!
//! Browse the creature catalog by type and region, and keep a per-user list
//! of favorites on the hosted backend.

mod cli_types;
mod commands;
mod error;
mod logging;
mod render;
mod settings;

use clap::Parser;

use cli_types::{Cli, Commands, ConfigAction};
pub(crate) use error::CliError;
pub(crate) use logging::log_blank;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.quiet, cli.verbose);

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let data_dir = cli.data_dir.as_deref();
    let quiet = cli.quiet;

    match cli.command {
        Commands::Browse { args } => {
            let catalog = settings::load_catalog(data_dir)?;
            commands::browse::run_browse(&catalog, &args, quiet)
        }
        Commands::Types => {
            let catalog = settings::load_catalog(data_dir)?;
            commands::browse::run_types(&catalog);
            Ok(())
        }
        Commands::Regions => {
            let catalog = settings::load_catalog(data_dir)?;
            commands::browse::run_regions(&catalog);
            Ok(())
        }
        Commands::Show { number } => {
            let catalog = settings::load_catalog(data_dir)?;
            commands::browse::run_show(&catalog, number)
        }
        Commands::Login { credentials } => commands::account::run_login(&credentials, quiet),
        Commands::Signup { credentials } => commands::account::run_signup(&credentials, quiet),
        Commands::Logout => commands::account::run_logout(quiet),
        Commands::Whoami => commands::account::run_whoami(),
        Commands::Favorites { action } => {
            let catalog = settings::load_catalog(data_dir)?;
            commands::favorites::run_favorites(catalog, &action, quiet)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(data_dir),
            ConfigAction::Path => commands::config::run_config_path(),
            ConfigAction::Setup => commands::config::run_config_setup(),
            ConfigAction::DataDir { path } => {
                commands::config::run_config_data_dir(path.as_deref())
            }
        },
    }
}
