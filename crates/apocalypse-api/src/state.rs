use std::sync::Arc;

use apocalypse_db::Database;

use crate::error::ApiError;
use crate::report::ReportTemplate;
use crate::roster::RosterClient;

pub type AppState = Arc<AppStateInner>;

/// Process-wide state, built once at startup.
pub struct AppStateInner {
    pub db: Arc<Database>,
    pub roster: RosterClient,
    pub report: ReportTemplate,
}

impl AppStateInner {
    /// Run a store call off the async runtime.
    pub async fn with_db<F, T>(&self, f: F) -> Result<apocalypse_db::Result<T>, ApiError>
    where
        F: FnOnce(&Database) -> apocalypse_db::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        Ok(tokio::task::spawn_blocking(move || f(&db)).await?)
    }
}
