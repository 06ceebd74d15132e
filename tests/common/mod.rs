use std::sync::Once;

pub const TEST_SECRET: &str = "integration-test-secret";

static INIT: Once = Once::new();

/// Point the config singleton at test values before its first access.
///
/// The database URL is syntactically valid but never connected to: the pool
/// is lazy and every request under test is rejected before it would touch
/// the store.
pub fn setup_env() {
    INIT.call_once(|| {
        std::env::set_var("SECRET_KEY", TEST_SECRET);
        std::env::set_var("DATABASE_URL", "postgres://localhost:5432/orbis_test");
        std::env::set_var("UPLOAD_DIR", upload_dir());
    });
}

/// Per-process upload directory, so a leftover from an earlier aborted run
/// never leaks into this run's assertions.
pub fn upload_dir() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("orbis-api-test-uploads-{}", std::process::id()))
}
