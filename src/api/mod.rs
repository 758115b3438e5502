//! REST + SSE transport over a single simulation engine.
//!
//! Control endpoints mutate the engine; `/api/stream` pushes a snapshot to
//! every subscriber each time the background tick loop advances it.

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::Method;
use axum::routing::{get, post};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{ConfigError, ScenarioConfig};
use crate::sim::{GridState, SimulationEngine};

/// Snapshots buffered per subscriber before it starts lagging.
const STREAM_CAPACITY: usize = 16;

/// Engine plus the most recent snapshot it produced.
pub struct Session {
    pub engine: SimulationEngine,
    pub latest: Option<GridState>,
}

impl Session {
    fn new(engine: SimulationEngine) -> Self {
        Self {
            engine,
            latest: None,
        }
    }

    /// Advances one tick and remembers the snapshot.
    pub fn tick(&mut self) -> GridState {
        let state = self.engine.tick();
        self.latest = Some(state.clone());
        state
    }
}

/// Application state shared across handlers and the tick loop.
///
/// The session mutex is the single-writer gate: handlers and the tick loop
/// hold it only for the duration of one engine call.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<Session>>,
    pub config: Arc<ScenarioConfig>,
    pub updates: broadcast::Sender<GridState>,
}

impl AppState {
    /// Builds the shared state with a fresh engine.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] if `config` is invalid.
    pub fn new(config: ScenarioConfig) -> Result<Self, ConfigError> {
        let engine = SimulationEngine::from_config(&config)?;
        let (updates, _) = broadcast::channel(STREAM_CAPACITY);
        Ok(Self {
            session: Arc::new(Mutex::new(Session::new(engine))),
            config: Arc::new(config),
            updates,
        })
    }

    /// Ticks once and publishes the snapshot to stream subscribers.
    ///
    /// The send happens under the session lock, so subscribers see snapshots
    /// in tick order.
    pub fn advance(&self) -> GridState {
        let mut session = self.session.lock();
        self.publish(&mut session)
    }

    /// Latest snapshot, ticking once under the same lock if none exists yet.
    pub fn latest_or_advance(&self) -> GridState {
        let mut session = self.session.lock();
        match session.latest.clone() {
            Some(snapshot) => snapshot,
            None => self.publish(&mut session),
        }
    }

    /// Subscribes to updates, returning the latest snapshot alongside the
    /// receiver. No snapshot is missed or repeated between the two.
    pub fn subscribe(&self) -> (Option<GridState>, broadcast::Receiver<GridState>) {
        let session = self.session.lock();
        (session.latest.clone(), self.updates.subscribe())
    }

    fn publish(&self, session: &mut Session) -> GridState {
        let state = session.tick();
        // No subscribers is not an error.
        let _ = self.updates.send(state.clone());
        state
    }

    /// Replaces the engine with one rebuilt from the stored configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the engine cannot be rebuilt.
    pub fn reset(&self) -> Result<(), ConfigError> {
        let engine = SimulationEngine::from_config(&self.config)?;
        *self.session.lock() = Session::new(engine);
        info!("engine rebuilt from stored config");
        Ok(())
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::health))
        .route("/api/status", get(handlers::status))
        .route("/api/state", get(handlers::get_state))
        .route("/api/tick", post(handlers::tick))
        .route("/api/reset", post(handlers::reset))
        .route("/api/control/wind", post(handlers::control_wind))
        .route("/api/control/clouds", post(handlers::control_clouds))
        .route("/api/control/temperature", post(handlers::control_temperature))
        .route("/api/control/industrial", post(handlers::control_industrial))
        .route("/api/scenario/storm", post(handlers::scenario_storm))
        .route("/api/scenario/calm", post(handlers::scenario_calm))
        .route("/api/info", get(handlers::info))
        .route("/api/stream", get(handlers::stream))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Advances the engine once per `period` until the process exits.
pub async fn run_tick_loop(state: AppState, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // The first tick of a tokio interval fires immediately.
    interval.tick().await;
    loop {
        interval.tick().await;
        state.advance();
    }
}

/// Binds to `addr`, spawns the tick loop and serves the API.
///
/// # Errors
///
/// Returns an I/O error if the listener cannot bind or the server fails.
pub async fn serve(state: AppState, addr: SocketAddr, tick_period: Duration) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, period_ms = tick_period.as_millis() as u64, "API server listening");

    tokio::spawn(run_tick_loop(state.clone(), tick_period));
    axum::serve(listener, router(state)).await
}
