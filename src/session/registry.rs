//! Concurrent store of search sessions
//!
//! The registry owns the session map and hands each session to its own tokio
//! task. Workers are the only writers of a session's state and result; abort
//! only ever fires a session's cancellation token.

use super::request::{RawSearchRequest, SearchRequest};
use super::state::SessionState;
use crate::config::{Config, SearchConfig};
use crate::events::EventLog;
use crate::fetcher::{LinkSource, PageFetcher, TextSource};
use crate::heuristic::{ContentHeuristic, ZeroHeuristic};
use crate::page::ArticlePattern;
use crate::search::{SearchControl, SearchEngine, SearchResult, Strategy};
use crate::SearchError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Answer to a non-blocking poll
#[derive(Debug, Clone, PartialEq)]
pub enum PollResult {
    /// The session is terminal; its result has now been consumed
    Ready {
        state: SessionState,
        result: SearchResult,
    },

    /// The session is still created or running
    Pending(SessionState),

    /// Unknown identifier, already consumed, or evicted
    NotFound,
}

struct Session {
    state: SessionState,
    token: CancellationToken,
    result: Option<SearchResult>,
    finished_at: Option<Instant>,
}

type SessionMap = Arc<Mutex<HashMap<Uuid, Session>>>;

/// Registry of search sessions
///
/// Every session gets a child of the registry's broadcast token, so a global
/// abort reaches all running sessions while a per-session abort reaches only
/// one. The broadcast token is replaced after each global abort so later
/// sessions start clean. When built over a `PageFetcher`, `sweep` also drops
/// its stale cache entries.
pub struct SessionRegistry {
    links: Arc<dyn LinkSource>,
    text: Arc<dyn TextSource>,
    fetcher: Option<Arc<PageFetcher>>,
    pattern: ArticlePattern,
    events: EventLog,
    sessions: SessionMap,
    abort_all: Mutex<CancellationToken>,
    max_duration: Duration,
    retention: Duration,
}

impl SessionRegistry {
    /// Creates a registry over one shared page source
    pub fn new<S>(source: Arc<S>, pattern: ArticlePattern, events: EventLog, settings: &SearchConfig) -> Self
    where
        S: LinkSource + TextSource + 'static,
    {
        let links: Arc<dyn LinkSource> = source.clone();
        let text: Arc<dyn TextSource> = source;

        Self {
            links,
            text,
            fetcher: None,
            pattern,
            events,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            abort_all: Mutex::new(CancellationToken::new()),
            max_duration: Duration::from_secs(settings.max_duration_secs),
            retention: Duration::from_secs(settings.retention_secs),
        }
    }

    /// Creates a registry over a network fetcher whose caches it maintains
    pub fn with_fetcher(
        fetcher: Arc<PageFetcher>,
        events: EventLog,
        settings: &SearchConfig,
    ) -> Self {
        let pattern = fetcher.pattern().clone();
        let mut registry = Self::new(Arc::clone(&fetcher), pattern, events, settings);
        registry.fetcher = Some(fetcher);
        registry
    }

    /// Creates a registry backed by a network `PageFetcher`
    pub fn from_config(config: &Config, events: EventLog) -> crate::Result<Self> {
        let fetcher = PageFetcher::from_config(config, events.clone())?;
        Ok(Self::with_fetcher(Arc::new(fetcher), events, &config.search))
    }

    /// The diagnostic log shared by all sessions
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// The article namespace requests are validated against
    pub fn pattern(&self) -> &ArticlePattern {
        &self.pattern
    }

    /// Validates raw request fields and starts a session
    pub fn submit(&self, raw: &RawSearchRequest) -> Result<Uuid, SearchError> {
        let request = SearchRequest::validate(raw, &self.pattern)?;
        Ok(self.start(request))
    }

    /// Registers a session and launches its worker; returns immediately
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, request: SearchRequest) -> Uuid {
        let id = Uuid::new_v4();
        let token = self.lock_abort_all().child_token();
        let control = SearchControl::new(token.clone()).with_timeout(self.max_duration);

        self.lock_sessions().insert(
            id,
            Session {
                state: SessionState::Created,
                token,
                result: None,
                finished_at: None,
            },
        );

        tracing::info!(
            search_id = %id,
            strategy = %request.strategy(),
            start = %request.start(),
            finish = %request.finish(),
            "Search started"
        );
        self.events.emit(format!(
            "Search {} started: {} -> {} ({})",
            id,
            request.start(),
            request.finish(),
            request.strategy()
        ));

        let worker = Worker {
            id,
            request,
            control,
            links: Arc::clone(&self.links),
            text: Arc::clone(&self.text),
            events: self.events.clone(),
            sessions: Arc::clone(&self.sessions),
        };
        tokio::spawn(worker.run());

        id
    }

    /// Returns the result of a terminal session, consuming it
    pub fn poll(&self, id: &Uuid) -> PollResult {
        let mut sessions = self.lock_sessions();
        let Some(session) = sessions.get(id) else {
            return PollResult::NotFound;
        };
        if session.state.is_active() {
            return PollResult::Pending(session.state);
        }

        match sessions.remove(id) {
            Some(Session {
                state,
                result: Some(result),
                ..
            }) => PollResult::Ready { state, result },
            _ => PollResult::NotFound,
        }
    }

    /// Current state of a session without consuming it
    pub fn state(&self, id: &Uuid) -> Option<SessionState> {
        self.lock_sessions().get(id).map(|session| session.state)
    }

    /// Requests cooperative cancellation
    ///
    /// With an identifier only that session is signalled. Without one, every
    /// active session is signalled and the diagnostic backlog is cleared.
    /// Returns the number of active sessions signalled.
    pub fn abort(&self, id: Option<&Uuid>) -> usize {
        match id {
            Some(id) => {
                let sessions = self.lock_sessions();
                match sessions.get(id) {
                    Some(session) if session.state.is_active() => {
                        session.token.cancel();
                        tracing::info!(search_id = %id, "Abort requested");
                        1
                    }
                    _ => 0,
                }
            }
            None => {
                let active = self.active();
                let previous =
                    std::mem::replace(&mut *self.lock_abort_all(), CancellationToken::new());
                previous.cancel();

                tracing::info!(active, "Abort requested for all searches");
                self.events.clear();
                active
            }
        }
    }

    /// Evicts terminal sessions whose results went unread past retention
    ///
    /// Returns the number of evicted sessions. Stale fetcher cache entries
    /// are purged in the same pass.
    pub fn sweep(&self) -> usize {
        let retention = self.retention;
        let evicted = {
            let mut sessions = self.lock_sessions();
            let before = sessions.len();
            sessions.retain(|_, session| {
                session
                    .finished_at
                    .map_or(true, |finished| finished.elapsed() < retention)
            });
            before - sessions.len()
        };

        if let Some(fetcher) = &self.fetcher {
            let purged = fetcher.purge_stale();
            if purged > 0 {
                tracing::debug!(purged, "Purged stale cache entries");
            }
        }

        evicted
    }

    /// Runs `sweep` every `period` until the registry is dropped
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let registry = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(registry) = registry.upgrade() else {
                    break;
                };
                let evicted = registry.sweep();
                if evicted > 0 {
                    tracing::info!(evicted, "Evicted unread search results");
                }
            }
        })
    }

    /// Number of sessions held, terminal or not
    pub fn len(&self) -> usize {
        self.lock_sessions().len()
    }

    /// Returns true if no sessions are held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of created or running sessions
    pub fn active(&self) -> usize {
        self.lock_sessions()
            .values()
            .filter(|session| session.state.is_active())
            .count()
    }

    fn lock_sessions(&self) -> MutexGuard<'_, HashMap<Uuid, Session>> {
        lock(&self.sessions)
    }

    fn lock_abort_all(&self) -> MutexGuard<'_, CancellationToken> {
        lock(&self.abort_all)
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.len())
            .field("max_duration", &self.max_duration)
            .field("retention", &self.retention)
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Everything one session's task owns
struct Worker {
    id: Uuid,
    request: SearchRequest,
    control: SearchControl,
    links: Arc<dyn LinkSource>,
    text: Arc<dyn TextSource>,
    events: EventLog,
    sessions: SessionMap,
}

impl Worker {
    async fn run(self) {
        if !self.transition(SessionState::Running) {
            return;
        }

        let strategy = self.request.strategy();
        let started = Instant::now();

        // The search runs in its own task so a panic surfaces as a JoinError
        // here instead of leaving the session running forever
        let search = tokio::spawn(execute(
            self.id.to_string(),
            self.request.clone(),
            self.control.clone(),
            Arc::clone(&self.links),
            Arc::clone(&self.text),
            self.events.clone(),
        ));

        let result = match search.await {
            Ok(result) => result,
            Err(e) => {
                let reason = join_failure(e);
                tracing::error!(search_id = %self.id, "Search worker failed: {}", reason);
                self.events
                    .emit(format!("Search {} failed: {}", self.id, reason));
                SearchResult::failed(
                    strategy,
                    started.elapsed(),
                    SearchError::Panicked(reason).to_string(),
                )
            }
        };

        self.finish(result);
    }

    fn transition(&self, next: SessionState) -> bool {
        let mut sessions = lock(&self.sessions);
        match sessions.get_mut(&self.id) {
            Some(session) if session.state.can_transition_to(next) => {
                session.state = next;
                true
            }
            _ => false,
        }
    }

    fn finish(&self, result: SearchResult) {
        let state = SessionState::from(result.outcome);
        let mut sessions = lock(&self.sessions);
        if let Some(session) = sessions.get_mut(&self.id) {
            if session.state.can_transition_to(state) {
                session.state = state;
                session.result = Some(result);
                session.finished_at = Some(Instant::now());
            }
        }
    }
}

/// Runs one search to a result, converting strategy errors into one
async fn execute(
    label: String,
    request: SearchRequest,
    control: SearchControl,
    links: Arc<dyn LinkSource>,
    text: Arc<dyn TextSource>,
    events: EventLog,
) -> SearchResult {
    let strategy = request.strategy();
    let started = Instant::now();
    let (start, finish) = (request.start(), request.finish());
    let engine = SearchEngine::new(links.as_ref(), &control, &events).with_label(label.clone());

    let outcome = match strategy {
        Strategy::BestFirst => {
            let mut heuristic = ContentHeuristic::new(text);
            if start != finish {
                events.emit(format!(
                    "Search {} building keyword profile of: {}",
                    label, finish
                ));
                let terms = heuristic.precompute(finish).await;
                tracing::debug!(search_id = %label, terms, "Target profile ready");
            }
            engine.run(strategy, start, finish, &heuristic).await
        }
        Strategy::BreadthFirst | Strategy::Bidirectional => {
            engine.run(strategy, start, finish, &ZeroHeuristic).await
        }
    };

    outcome.unwrap_or_else(|e| {
        tracing::warn!(search_id = %label, "Search failed: {}", e);
        events.emit(format!("Search {} failed: {}", label, e));
        SearchResult::failed(strategy, started.elapsed(), e.to_string())
    })
}

fn join_failure(error: JoinError) -> String {
    if error.is_cancelled() {
        return "search task was cancelled".to_string();
    }
    match error.try_into_panic() {
        Ok(payload) => payload
            .downcast_ref::<&str>()
            .map(|message| message.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "search task panicked".to_string()),
        Err(error) => error.to_string(),
    }
}
