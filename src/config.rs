use std::{env, path::PathBuf, time::Duration};

const DEFAULT_UPLOAD_DIR: &str = "uploads";
const MAX_STORAGE_BYTES: u64 = 2 * 1024 * 1024 * 1024; // 2 GiB across all shares
const MAX_FILE_BYTES: u64 = 200 * 1024 * 1024; // 200 MB per file
const MAX_FILES_PER_UPLOAD: usize = 15;
const SHARE_TTL: Duration = Duration::from_secs(5 * 60);
const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Per-batch request body ceiling: every file at its individual maximum.
pub const MAX_UPLOAD_BODY_BYTES: usize = MAX_FILES_PER_UPLOAD * MAX_FILE_BYTES as usize;

#[derive(Clone, Debug)]
pub struct ShareConfig {
    pub upload_dir: PathBuf,
    pub capacity_bytes: u64,
    pub max_file_bytes: u64,
    pub max_files_per_upload: usize,
    pub share_ttl: Duration,
    pub sweep_interval: Duration,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            capacity_bytes: MAX_STORAGE_BYTES,
            max_file_bytes: MAX_FILE_BYTES,
            max_files_per_upload: MAX_FILES_PER_UPLOAD,
            share_ttl: SHARE_TTL,
            sweep_interval: SWEEP_INTERVAL,
        }
    }
}

impl ShareConfig {
    /// Defaults with environment overrides (UPLOAD_DIR).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = env::var("UPLOAD_DIR") {
            if !dir.is_empty() {
                config.upload_dir = PathBuf::from(dir);
            }
        }
        config
    }

    /// Small limits and an isolated directory for tests.
    pub fn for_testing(upload_dir: PathBuf) -> Self {
        Self {
            upload_dir,
            capacity_bytes: 10 * 1024 * 1024,
            max_file_bytes: 2 * 1024 * 1024,
            max_files_per_upload: 15,
            share_ttl: Duration::from_secs(5 * 60),
            sweep_interval: Duration::from_millis(50),
        }
    }
}
