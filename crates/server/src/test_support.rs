use std::{
    path::Path,
    sync::{Mutex, MutexGuard, OnceLock},
};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Serializes tests that touch process-wide environment variables and
/// restores the previous values when dropped.
pub struct TestEnvGuard {
    _lock: MutexGuard<'static, ()>,
    saved_database_url: Option<String>,
    saved_asset_dir: Option<String>,
}

impl TestEnvGuard {
    pub fn new(asset_dir: &Path, database_url: String) -> Self {
        let lock = env_lock();
        let saved_database_url = std::env::var("DATABASE_URL").ok();
        let saved_asset_dir = std::env::var("TACKBOARD_ASSET_DIR").ok();

        // SAFETY: the lock above serializes every test that mutates the
        // process environment.
        unsafe {
            std::env::set_var("DATABASE_URL", &database_url);
            std::env::set_var("TACKBOARD_ASSET_DIR", asset_dir);
        }

        Self {
            _lock: lock,
            saved_database_url,
            saved_asset_dir,
        }
    }
}

impl Drop for TestEnvGuard {
    fn drop(&mut self) {
        // SAFETY: still holding the lock that serializes env mutation.
        unsafe {
            match &self.saved_database_url {
                Some(value) => std::env::set_var("DATABASE_URL", value),
                None => std::env::remove_var("DATABASE_URL"),
            }
            match &self.saved_asset_dir {
                Some(value) => std::env::set_var("TACKBOARD_ASSET_DIR", value),
                None => std::env::remove_var("TACKBOARD_ASSET_DIR"),
            }
        }
    }
}
