/// Errors from favorites, authentication and backend operations.
#[derive(Debug, thiserror::Error)]
pub enum FavoritesError {
    #[error("User not logged in")]
    NotAuthenticated,

    #[error("Maximum number of favorites reached ({max})")]
    CapacityReached { max: usize },

    #[error("#{number} is already a favorite")]
    AlreadyFavorite { number: u32 },

    #[error("Favorites have not been loaded yet")]
    NotLoaded,

    #[error("{0}")]
    Auth(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FavoritesError {
    /// True for errors raised locally before any network call.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated | Self::CapacityReached { .. } | Self::AlreadyFavorite { .. }
        )
    }
}
