//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pokedex")]
#[command(about = "Browse the Pokédex and keep a list of favorites", long_about = None)]
pub(crate) struct Cli {
    /// Directory containing pokemon.json, types.json and regions.json
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Filter and page selection for `browse`.
#[derive(Args, Clone)]
pub(crate) struct BrowseArgs {
    /// Only show this type (e.g., fire, water); "all" disables the filter
    #[arg(short = 't', long = "type")]
    pub type_filter: Option<String>,

    /// Only show this region (e.g., kanto, johto); "all" disables the filter
    #[arg(short, long)]
    pub region: Option<String>,

    /// Page to show, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// Records per page: 10, 20, 50, 100 or 200
    #[arg(long, default_value = "20")]
    pub per_page: pokedex_catalog::PageSize,
}

/// Email and optional password for account commands.
#[derive(Args, Clone)]
pub(crate) struct CredentialArgs {
    /// Account email address
    #[arg(short, long)]
    pub email: String,

    /// Password (prompted for when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List Pokémon, one page at a time
    Browse {
        #[command(flatten)]
        args: BrowseArgs,
    },

    /// List the type filter options
    Types,

    /// List the region filter options
    Regions,

    /// Show a single Pokémon by number
    Show {
        /// National Pokédex number
        number: u32,
    },

    /// Sign in with email and password
    Login {
        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Create an account
    Signup {
        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Sign out and forget the saved session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Manage your favorite Pokémon
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Manage backend configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum FavoritesAction {
    /// List your favorites
    List,

    /// Add a Pokémon to your favorites
    Add {
        /// National Pokédex number
        number: u32,
    },

    /// Remove a Pokémon from your favorites
    Remove {
        /// National Pokédex number
        number: u32,
    },

    /// Add the Pokémon if it is not a favorite, remove it otherwise
    Toggle {
        /// National Pokédex number
        number: u32,
    },

    /// Follow changes to your favorites until Ctrl-C
    Watch,
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show current configuration and where each value comes from
    Show,

    /// Print the config file path
    Path,

    /// Interactively set up the backend connection
    Setup,

    /// Set the dataset directory used when --data-dir is not given
    DataDir {
        /// Directory to use; omit to go back to the bundled dataset
        path: Option<PathBuf>,
    },
}
