use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::routing::{get, post, put};
use axum::Router;

mod admin;
mod assignments;
pub mod config;
pub mod error;
pub mod export;
pub mod logger;
mod participants;
pub mod store;

use config::Config;
use store::Store;

#[derive(Clone)]
pub struct AppState {
    store: Store,
    config: Arc<Config>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default(), Store::default())
    }
}

impl AppState {
    pub fn new(config: Config, store: Store) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub async fn from_config(config: Config) -> Self {
        let store = match &config.persist_path {
            Some(path) => Store::open(path.clone()).await,
            None => Store::default(),
        };
        Self::new(config, store)
    }

    pub async fn with_persistence(path: impl Into<PathBuf>) -> Self {
        let config = Config {
            persist_path: Some(path.into()),
            ..Config::default()
        };
        Self::from_config(config).await
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/event", get(admin::event_info))
        .route("/settings", post(admin::update_settings))
        .route("/reset", post(admin::reset_event))
        .route(
            "/participants",
            post(participants::register).get(participants::list),
        )
        .route("/participants/export", get(participants::export))
        .route(
            "/participants/:id",
            put(participants::update).delete(participants::remove),
        )
        .route("/participants/:id/pairing", get(assignments::lookup))
        .route("/participants/:id/reveal", post(assignments::reveal))
        .route("/assignments", get(assignments::list))
        .route("/assignments/generate", post(assignments::generate))
        .route("/assignments/export", get(assignments::export))
        .route(
            "/assignments/:id/override",
            post(assignments::override_assignment),
        )
        .with_state(state)
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
