use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use tokio::sync::{mpsc, watch};
use tokio::time::Duration;

use crate::backend::{AuthProvider, ChangeFeed, RelationStore, Subscription};
use crate::config::BackendConfig;
use crate::error::FavoritesError;
use crate::types::{
    ChangeEvent, ChangeKind, EmailCredentials, FAVORITES_TABLE, FavoriteRow, Session,
    SignUpOutcome, User,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for a Supabase-compatible deployment (GoTrue auth + PostgREST).
///
/// Clones share the HTTP connection pool and the current session.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    config: BackendConfig,
    session: Arc<watch::Sender<Option<Session>>>,
}

// ── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserResponse,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Sign-up returns a full session when email confirmation is disabled and
/// a bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(UserResponse),
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NumberRow {
    pokemon_number: u32,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| self.expires_in.map(|secs| now + ChronoDuration::seconds(secs)));
        Session {
            user: User {
                id: self.user.id,
                email: self.user.email,
            },
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        }
    }
}

/// Human-readable message from an error response body.
fn error_message(text: &str) -> String {
    let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();
    body.error_description
        .or(body.msg)
        .or(body.message)
        .or(body.error)
        .unwrap_or_else(|| {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                "empty response".to_string()
            } else {
                trimmed.chars().take(200).collect()
            }
        })
}

impl SupabaseClient {
    pub fn new(config: BackendConfig) -> Result<Self, FavoritesError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let (tx, _rx) = watch::channel(None);
        Ok(Self {
            http,
            config,
            session: Arc::new(tx),
        })
    }

    /// Restore a previously saved session.
    pub fn with_session(self, session: Option<Session>) -> Self {
        self.session.send_replace(session);
        self
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.url, path)
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.config.url, FAVORITES_TABLE)
    }

    /// Session access token when signed in, anon key otherwise.
    fn bearer(&self) -> String {
        self.session
            .borrow()
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.config.anon_key.clone())
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer())
    }

    async fn auth_call(
        &self,
        path: &str,
        credentials: &EmailCredentials,
    ) -> Result<String, FavoritesError> {
        let resp = self
            .http
            .post(self.auth_url(path))
            .header("apikey", &self.config.anon_key)
            .json(&serde_json::json!({
                "email": credentials.email,
                "password": credentials.password,
            }))
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(FavoritesError::Auth(error_message(&text)));
        }
        Ok(text)
    }

    /// Send a PostgREST request and return the body, mapping non-2xx to
    /// [`FavoritesError::Server`].
    async fn rest_call(&self, req: reqwest::RequestBuilder) -> Result<String, FavoritesError> {
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(FavoritesError::Server {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        Ok(text)
    }

    /// Every row of the table visible to the current credentials.
    async fn select_table(&self) -> Result<BTreeSet<FavoriteRow>, FavoritesError> {
        let req = self
            .request(reqwest::Method::GET, self.table_url())
            .query(&[("select", "user_id,pokemon_number")]);
        let text = self.rest_call(req).await?;
        let rows: Vec<FavoriteRow> = serde_json::from_str(&text)?;
        Ok(rows.into_iter().collect())
    }

    /// Poll the table and report inserts and deletes until the receiver goes away.
    async fn poll_changes(self, tx: mpsc::UnboundedSender<ChangeEvent>) {
        let interval = self.config.poll_interval();
        let mut known = match self.select_table().await {
            Ok(rows) => rows,
            Err(e) => {
                log::warn!("Change poller: initial snapshot failed: {}", e);
                BTreeSet::new()
            }
        };

        loop {
            tokio::time::sleep(interval).await;
            let current = match self.select_table().await {
                Ok(rows) => rows,
                Err(e) => {
                    log::warn!("Change poller: {}", e);
                    continue;
                }
            };

            let inserts = current.difference(&known).count();
            let deletes = known.difference(&current).count();
            let events = std::iter::repeat_n(ChangeKind::Insert, inserts)
                .chain(std::iter::repeat_n(ChangeKind::Delete, deletes));
            for kind in events {
                if tx.send(ChangeEvent::new(kind)).is_err() {
                    return;
                }
            }
            if tx.is_closed() {
                return;
            }
            known = current;
        }
    }
}

impl AuthProvider for SupabaseClient {
    async fn sign_in(&self, credentials: &EmailCredentials) -> Result<Session, FavoritesError> {
        let text = self
            .auth_call("token?grant_type=password", credentials)
            .await?;
        let token: TokenResponse = serde_json::from_str(&text)?;
        let session = token.into_session(Utc::now());
        log::debug!("Signed in as {}", session.user.id);
        self.session.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, credentials: &EmailCredentials) -> Result<SignUpOutcome, FavoritesError> {
        let text = self.auth_call("signup", credentials).await?;
        match serde_json::from_str::<SignUpResponse>(&text)? {
            SignUpResponse::Session(token) => {
                let session = token.into_session(Utc::now());
                self.session.send_replace(Some(session.clone()));
                Ok(SignUpOutcome::SignedIn(session))
            }
            SignUpResponse::User(user) => Ok(SignUpOutcome::ConfirmationRequired {
                email: user.email.unwrap_or_else(|| credentials.email.clone()),
            }),
        }
    }

    async fn sign_out(&self) -> Result<(), FavoritesError> {
        let has_session = self.session.borrow().is_some();
        if has_session {
            let req = self.request(reqwest::Method::POST, self.auth_url("logout"));
            if let Err(e) = self.rest_call(req).await {
                log::warn!("Remote sign-out failed, clearing local session anyway: {}", e);
            }
        }
        self.session.send_replace(None);
        Ok(())
    }

    fn current_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    fn session_changes(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}

impl RelationStore for SupabaseClient {
    async fn select_favorites(&self, user_id: &str) -> Result<Vec<u32>, FavoritesError> {
        let req = self
            .request(reqwest::Method::GET, self.table_url())
            .query(&[
                ("select", "pokemon_number".to_string()),
                ("user_id", format!("eq.{}", user_id)),
            ]);
        let text = self.rest_call(req).await?;
        let rows: Vec<NumberRow> = serde_json::from_str(&text)?;
        Ok(rows.into_iter().map(|r| r.pokemon_number).collect())
    }

    async fn insert_favorite(&self, row: &FavoriteRow) -> Result<(), FavoritesError> {
        let req = self
            .request(reqwest::Method::POST, self.table_url())
            .header("Prefer", "return=minimal")
            .json(row);
        self.rest_call(req).await?;
        Ok(())
    }

    async fn delete_favorite(&self, user_id: &str, number: u32) -> Result<(), FavoritesError> {
        let req = self
            .request(reqwest::Method::DELETE, self.table_url())
            .query(&[
                ("user_id", format!("eq.{}", user_id)),
                ("pokemon_number", format!("eq.{}", number)),
            ]);
        self.rest_call(req).await?;
        Ok(())
    }

    async fn subscribe_changes(&self) -> Result<ChangeFeed, FavoritesError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let poller = tokio::spawn(self.clone().poll_changes(tx));
        let abort = poller.abort_handle();
        log::debug!(
            "Polling {} for changes every {}s",
            FAVORITES_TABLE,
            self.config.poll_interval_secs
        );
        Ok(ChangeFeed {
            events: rx,
            subscription: Subscription::new(move || {
                log::debug!("Stopping change poller");
                abort.abort();
            }),
        })
    }
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
