//! In-process auth provider and relation store.
//!
//! Behaves like the hosted backend from the client's point of view: accounts
//! with passwords, a shared favorites table, and table-level change
//! notifications fanned out to every subscriber regardless of user. Failure
//! injection and write/subscriber counters make it suitable for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Duration, Utc};
use tokio::sync::{mpsc, watch};

use crate::backend::{AuthProvider, ChangeFeed, RelationStore, Subscription};
use crate::error::FavoritesError;
use crate::types::{
    ChangeEvent, ChangeKind, EmailCredentials, FavoriteRow, Session, SignUpOutcome, User,
};

const SESSION_LIFETIME_HOURS: i64 = 1;

#[derive(Debug)]
struct Account {
    user: User,
    password: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    accounts: HashMap<String, Account>,
    rows: Vec<FavoriteRow>,
    subscribers: HashMap<u64, mpsc::UnboundedSender<ChangeEvent>>,
    next_subscriber: u64,
    next_user: u64,
    writes: usize,
    fail_reads: bool,
    fail_writes: bool,
    fail_subscribe: bool,
    require_confirmation: bool,
}

impl MemoryState {
    fn broadcast(&mut self, kind: ChangeKind) {
        self.subscribers
            .retain(|_, tx| tx.send(ChangeEvent::new(kind)).is_ok());
    }
}

/// Shared in-memory backend. Clones share state.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
    session: Arc<watch::Sender<Option<Session>>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            session: Arc::new(tx),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create an account directly, bypassing sign-up.
    pub fn register(&self, email: &str, password: &str) -> User {
        let mut state = self.state();
        create_account(&mut state, email, password)
    }

    /// Make sign-up return [`SignUpOutcome::ConfirmationRequired`].
    pub fn set_require_confirmation(&self, on: bool) {
        self.state().require_confirmation = on;
    }

    pub fn set_fail_reads(&self, on: bool) {
        self.state().fail_reads = on;
    }

    pub fn set_fail_writes(&self, on: bool) {
        self.state().fail_writes = on;
    }

    pub fn set_fail_subscribe(&self, on: bool) {
        self.state().fail_subscribe = on;
    }

    /// Number of successful inserts and deletes.
    pub fn write_count(&self) -> usize {
        self.state().writes
    }

    /// Number of live change subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.state().subscribers.len()
    }

    /// Snapshot of every row in the table.
    pub fn rows(&self) -> Vec<FavoriteRow> {
        self.state().rows.clone()
    }

    fn issue_session(&self, user: User) -> Session {
        let session = Session {
            access_token: format!("memory-token-{}", user.id),
            refresh_token: None,
            expires_at: Some(Utc::now() + Duration::hours(SESSION_LIFETIME_HOURS)),
            user,
        };
        self.session.send_replace(Some(session.clone()));
        session
    }
}

fn create_account(state: &mut MemoryState, email: &str, password: &str) -> User {
    state.next_user += 1;
    let user = User {
        id: format!("user-{}", state.next_user),
        email: Some(email.to_string()),
    };
    state.accounts.insert(
        email.to_lowercase(),
        Account {
            user: user.clone(),
            password: password.to_string(),
        },
    );
    user
}

impl AuthProvider for MemoryBackend {
    async fn sign_in(&self, credentials: &EmailCredentials) -> Result<Session, FavoritesError> {
        let user = {
            let state = self.state();
            match state.accounts.get(&credentials.email.to_lowercase()) {
                Some(account) if account.password == credentials.password => account.user.clone(),
                _ => return Err(FavoritesError::Auth("Invalid login credentials".to_string())),
            }
        };
        Ok(self.issue_session(user))
    }

    async fn sign_up(&self, credentials: &EmailCredentials) -> Result<SignUpOutcome, FavoritesError> {
        let (user, confirm) = {
            let mut state = self.state();
            if state
                .accounts
                .contains_key(&credentials.email.to_lowercase())
            {
                return Err(FavoritesError::Auth("User already registered".to_string()));
            }
            let user = create_account(&mut state, &credentials.email, &credentials.password);
            (user, state.require_confirmation)
        };
        if confirm {
            return Ok(SignUpOutcome::ConfirmationRequired {
                email: credentials.email.clone(),
            });
        }
        Ok(SignUpOutcome::SignedIn(self.issue_session(user)))
    }

    async fn sign_out(&self) -> Result<(), FavoritesError> {
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

impl RelationStore for MemoryBackend {
    async fn select_favorites(&self, user_id: &str) -> Result<Vec<u32>, FavoritesError> {
        let state = self.state();
        if state.fail_reads {
            return Err(FavoritesError::Unavailable("read failed".to_string()));
        }
        Ok(state
            .rows
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.pokemon_number)
            .collect())
    }

    async fn insert_favorite(&self, row: &FavoriteRow) -> Result<(), FavoritesError> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(FavoritesError::Unavailable("write failed".to_string()));
        }
        if state.rows.contains(row) {
            return Err(FavoritesError::Server {
                status: 409,
                message: "duplicate key value violates unique constraint".to_string(),
            });
        }
        state.rows.push(row.clone());
        state.writes += 1;
        state.broadcast(ChangeKind::Insert);
        Ok(())
    }

    async fn delete_favorite(&self, user_id: &str, number: u32) -> Result<(), FavoritesError> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(FavoritesError::Unavailable("write failed".to_string()));
        }
        let before = state.rows.len();
        state
            .rows
            .retain(|r| !(r.user_id == user_id && r.pokemon_number == number));
        state.writes += 1;
        if state.rows.len() != before {
            state.broadcast(ChangeKind::Delete);
        }
        Ok(())
    }

    async fn subscribe_changes(&self) -> Result<ChangeFeed, FavoritesError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = {
            let mut state = self.state();
            if state.fail_subscribe {
                return Err(FavoritesError::Unavailable("subscribe failed".to_string()));
            }
            state.next_subscriber += 1;
            let id = state.next_subscriber;
            state.subscribers.insert(id, tx);
            id
        };
        log::debug!("memory backend: subscriber {} registered", id);

        let shared = Arc::downgrade(&self.state);
        let subscription = Subscription::new(move || {
            if let Some(state) = shared.upgrade() {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                state.subscribers.remove(&id);
                log::debug!("memory backend: subscriber {} released", id);
            }
        });

        Ok(ChangeFeed {
            events: rx,
            subscription,
        })
    }
}
