//! Per-user favorites backed by a hosted auth + relation store.
//!
//! [`FavoritesSync`] mirrors the remote `(user_id, pokemon_number)` relation
//! into a local list of catalog records. The remote side is reached through
//! the [`AuthProvider`] and [`RelationStore`] traits, implemented by
//! [`SupabaseClient`] for a hosted deployment and by [`MemoryBackend`] for
//! tests.

pub mod backend;
pub mod client;
pub mod config;
pub mod driver;
pub mod error;
pub mod memory;
pub mod sync;
pub mod types;

pub use backend::{AuthProvider, ChangeFeed, RelationStore, Subscription};
pub use client::SupabaseClient;
pub use config::{
    BackendConfig, ConfigSource, ConfigSources, ConfigValues, clear_saved_session, config_path,
    config_sources, config_values, load_saved_session, save_session, save_to_file, session_path,
};
pub use driver::drive_sessions;
pub use error::FavoritesError;
pub use memory::MemoryBackend;
pub use sync::{FavoritesSync, FetchOutcome, MAX_FAVORITES, SessionHandle, SyncEvent, Toggled};
pub use types::{
    ChangeEvent, ChangeKind, EmailCredentials, FAVORITES_TABLE, FavoriteRow, Session,
    SignUpOutcome, User,
};
