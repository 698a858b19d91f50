use crate::config::Config;
use crate::repositories::Repositories;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub config: Config,
}

impl AppState {
    /// State backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self {
            repos: Repositories::in_memory(),
            config: Config::for_memory(),
        }
    }
}

impl FromRef<AppState> for Repositories {
    fn from_ref(state: &AppState) -> Self {
        state.repos.clone()
    }
}
