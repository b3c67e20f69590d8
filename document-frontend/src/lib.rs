pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod state;
pub mod validation;

use config::Settings;
use services::backend::Backend;
use services::workspace::Workspace;
use std::sync::Arc;

/// Shared application state: the session's workspace and its stores.
#[derive(Clone)]
pub struct AppState {
    pub workspace: Workspace,
}

impl AppState {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    pub fn from_settings(settings: &Settings, backend: Arc<dyn Backend>) -> Self {
        Self::new(Workspace::new(backend, settings.workspace_options()))
    }
}
