use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// One uploaded file inside a share. The content path is owned exclusively
/// by this entry and released exactly once, by the sweep.
#[derive(Clone, Debug)]
pub struct FileEntry {
    pub original_name: String,
    pub content_path: PathBuf,
    pub size: u64,
    pub mime_type: String,
}

/// A registered share: the files behind one code. `expires_at` is set once
/// at creation and never changes; `total_bytes` is cached so quota release
/// does not have to re-walk the file list.
#[derive(Clone, Debug)]
pub struct ShareRecord {
    pub code: String,
    pub files: Vec<FileEntry>,
    pub expires_at: DateTime<Utc>,
    pub total_bytes: u64,
}
