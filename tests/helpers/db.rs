use prospector_bridge::settings::Database as DbCfg;
use prospector_bridge::storage::{self, SeaOrmStore};
use sea_orm::DatabaseConnection;
use tempfile::NamedTempFile;

/// Test database with automatic cleanup
pub struct TestDb {
    store: SeaOrmStore,
    _temp_file: NamedTempFile,
}

impl TestDb {
    /// Create a new test database with migrations applied
    pub async fn new() -> Self {
        // Create temporary SQLite database file
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_str().expect("Invalid temp file path");
        let cfg = DbCfg {
            url: format!("sqlite://{}?mode=rwc", db_path),
        };

        let connection = storage::init(&cfg)
            .await
            .expect("Failed to initialise test database");

        Self {
            store: SeaOrmStore::new(connection),
            _temp_file: temp_file,
        }
    }

    pub fn store(&self) -> SeaOrmStore {
        self.store.clone()
    }

    /// Get database connection
    pub fn connection(&self) -> &DatabaseConnection {
        self.store.connection()
    }
}
