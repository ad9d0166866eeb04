use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use chrono::Utc;
use log::{info, warn};

use crate::codes;
use crate::config::ShareConfig;
use crate::error::ApiError;
use crate::quota::QuotaTracker;
use crate::records::{FileEntry, ShareRecord};
use crate::storage;

/// Snapshot for GET /storage.
#[derive(Clone, Copy, Debug)]
pub struct StorageStatus {
    pub used_bytes: u64,
    pub capacity_bytes: u64,
    pub active_codes: usize,
}

/// Owns the code -> share mapping, the byte quota, and every mutating
/// operation on them. Request handlers and the sweep task all go through
/// here; nothing else touches the registry.
pub struct ShareStore {
    config: ShareConfig,
    shares: Mutex<HashMap<String, ShareRecord>>,
    quota: QuotaTracker,
}

impl ShareStore {
    pub fn new(config: ShareConfig) -> Self {
        let quota = QuotaTracker::new(config.capacity_bytes);
        Self {
            config,
            shares: Mutex::new(HashMap::new()),
            quota,
        }
    }

    pub fn config(&self) -> &ShareConfig {
        &self.config
    }

    fn lock_shares(&self) -> MutexGuard<'_, HashMap<String, ShareRecord>> {
        match self.shares.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Register a new share over already-persisted files. Quota is reserved
    /// before the registry is touched; code selection and insertion happen
    /// under one lock so two concurrent creates can never claim the same
    /// code. On any failure the reservation is rolled back and nothing is
    /// inserted; deleting the staged content stays with the caller.
    pub fn create(&self, files: Vec<FileEntry>) -> Result<ShareRecord, ApiError> {
        if files.is_empty() {
            return Err(ApiError::NoFiles);
        }
        let total_bytes: u64 = files.iter().map(|file| file.size).sum();
        if !self.quota.try_reserve(total_bytes) {
            return Err(ApiError::StorageExceeded);
        }

        let record = {
            let mut shares = self.lock_shares();
            let code = match codes::pick_unused(|candidate| shares.contains_key(candidate)) {
                Some(code) => code,
                None => {
                    drop(shares);
                    self.quota.release(total_bytes);
                    return Err(ApiError::CodeSpaceExhausted);
                }
            };
            let record = ShareRecord {
                code: code.clone(),
                files,
                expires_at: Utc::now() + self.config.share_ttl,
                total_bytes,
            };
            shares.insert(code, record.clone());
            record
        };

        info!(
            "Share {} created: {} file(s), {}",
            record.code,
            record.files.len(),
            storage::format_bytes(record.total_bytes)
        );
        Ok(record)
    }

    /// Snapshot lookup. Expired-but-unswept records read as not found; the
    /// read path never removes entries, that is the sweep's job.
    pub fn get(&self, code: &str) -> Result<ShareRecord, ApiError> {
        let shares = self.lock_shares();
        let record = shares.get(code).ok_or(ApiError::NotFound)?;
        if Utc::now() > record.expires_at {
            return Err(ApiError::NotFound);
        }
        Ok(record.clone())
    }

    /// Idempotent registry removal; sweep-only.
    fn remove(&self, code: &str) -> Option<ShareRecord> {
        self.lock_shares().remove(code)
    }

    /// One sweep pass. Per expired code: registry removal commits first (no
    /// new reader can pick the record up), then content deletion, then one
    /// quota release whether or not every file deleted cleanly, so a bad
    /// disk never leaks quota. Re-running on an already-removed code is a
    /// no-op.
    pub async fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let expired: Vec<String> = {
            let shares = self.lock_shares();
            shares
                .iter()
                .filter(|(_, record)| record.expires_at <= now)
                .map(|(code, _)| code.clone())
                .collect()
        };

        let mut removed = 0;
        for code in expired {
            let Some(record) = self.remove(&code) else {
                continue;
            };
            for file in &record.files {
                if let Err(err) = storage::delete_content(&file.content_path).await {
                    warn!(
                        "Failed to delete {}: {}",
                        file.content_path.display(),
                        err
                    );
                }
            }
            self.quota.release(record.total_bytes);
            info!(
                "Removed expired share {}, freed {}",
                record.code,
                storage::format_bytes(record.total_bytes)
            );
            removed += 1;
        }
        removed
    }

    pub fn status(&self) -> StorageStatus {
        StorageStatus {
            used_bytes: self.quota.used(),
            capacity_bytes: self.quota.capacity(),
            active_codes: self.lock_shares().len(),
        }
    }
}
