use std::path::PathBuf;

use crate::DBService;

/// A migrated SQLite database in a throwaway temp directory, removed on drop.
pub struct EphemeralDb {
    pub db: DBService,
    root: PathBuf,
}

impl EphemeralDb {
    pub async fn new() -> Self {
        let root = std::env::temp_dir().join(format!("tackboard-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&root).unwrap();
        let url = format!(
            "sqlite://{}?mode=rwc",
            root.join("db.sqlite").to_string_lossy()
        );
        let db = DBService::connect(&url).await.unwrap();
        EphemeralDb { db, root }
    }
}

impl Drop for EphemeralDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}
