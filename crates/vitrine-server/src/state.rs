use std::sync::Arc;

use vitrine_core::storage::StorageSettings;
use vitrine_db::Database;

use crate::auth::AuthGuard;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub db: Database,
    /// Session check for admin routes.
    pub auth: Arc<dyn AuthGuard>,
    /// Blob-storage settings captured at startup.
    pub storage: StorageSettings,
}
