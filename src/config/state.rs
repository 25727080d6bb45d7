// Application state module
// Immutable per-process state shared across connection tasks

use super::types::Config;
use crate::handler::router::RouteTable;

/// Application state
///
/// Nothing here mutates after startup, so the state is shared behind a plain
/// `Arc` with no locking discipline.
pub struct AppState {
    pub config: Config,
    pub routes: RouteTable,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            routes: RouteTable::new(),
        }
    }
}
