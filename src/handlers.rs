use axum::{
    body::Body,
    extract::{multipart::Field, Multipart, Path, State},
    http::header,
    response::Response,
    Json,
};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

use crate::{
    archive,
    error::ApiError,
    records::FileEntry,
    state::AppState,
    storage,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub original_name: String,
    pub size: u64,
}

impl From<&FileEntry> for FileInfo {
    fn from(entry: &FileEntry) -> Self {
        Self {
            original_name: entry.original_name.clone(),
            size: entry.size,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub code: String,
    pub files: Vec<FileInfo>,
    pub expires_at: DateTime<Utc>,
    pub expires_in: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareInfoResponse {
    pub files: Vec<FileInfo>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageResponse {
    pub used_bytes: u64,
    pub capacity_bytes: u64,
    pub remaining: u64,
    pub usage_percentage: u32,
    pub active_code_count: usize,
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut staged: Vec<FileEntry> = Vec::new();

    if let Err(err) = stage_upload(&state, &mut multipart, &mut staged).await {
        discard_staged(&staged).await;
        return Err(err);
    }

    if staged.is_empty() {
        return Err(ApiError::NoFiles);
    }

    let staged_paths: Vec<PathBuf> = staged.iter().map(|file| file.content_path.clone()).collect();
    let record = match state.store.create(staged) {
        Ok(record) => record,
        Err(err) => {
            // No registry entry or reservation survived; drop the bytes too.
            for path in &staged_paths {
                if let Err(cleanup_err) = storage::delete_content(path).await {
                    warn!("Failed to discard {}: {}", path.display(), cleanup_err);
                }
            }
            return Err(err);
        }
    };

    info!("Upload complete: code {}", record.code);

    let ttl_minutes = state.store.config().share_ttl.as_secs() / 60;
    Ok(Json(UploadResponse {
        files: record.files.iter().map(FileInfo::from).collect(),
        code: record.code,
        expires_at: record.expires_at,
        expires_in: format!("{} minutes", ttl_minutes),
    }))
}

/// Stream every `files` field to disk, enforcing the per-file byte cap and
/// the batch count cap as bytes arrive. Entries land in `staged` only once
/// fully written; a partial file from a failed field is deleted here, the
/// rest of the batch by the caller.
async fn stage_upload(
    state: &AppState,
    multipart: &mut Multipart,
    staged: &mut Vec<FileEntry>,
) -> Result<(), ApiError> {
    let config = state.store.config();

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some("files") {
            continue;
        }
        let Some(raw_name) = field.file_name() else {
            continue;
        };
        let original_name = storage::sanitize_filename(raw_name);

        if staged.len() >= config.max_files_per_upload {
            return Err(ApiError::TooManyFiles(config.max_files_per_upload));
        }

        let mime_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| {
                mime_guess::from_path(&original_name)
                    .first_or_octet_stream()
                    .to_string()
            });

        let path = storage::content_path(&config.upload_dir, &original_name);
        let size = match write_field_content(&mut field, &path, config.max_file_bytes).await {
            Ok(size) => size,
            Err(err) => {
                if let Err(cleanup_err) = storage::delete_content(&path).await {
                    warn!("Failed to discard {}: {}", path.display(), cleanup_err);
                }
                return Err(err);
            }
        };

        staged.push(FileEntry {
            original_name,
            content_path: path,
            size,
            mime_type,
        });
    }
    Ok(())
}

async fn write_field_content(
    field: &mut Field<'_>,
    path: &std::path::Path,
    max_bytes: u64,
) -> Result<u64, ApiError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut size: u64 = 0;
    while let Some(chunk) = field.chunk().await? {
        size += chunk.len() as u64;
        if size > max_bytes {
            return Err(ApiError::FileTooLarge(max_bytes));
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    Ok(size)
}

async fn discard_staged(staged: &[FileEntry]) {
    for file in staged {
        if let Err(err) = storage::delete_content(&file.content_path).await {
            warn!(
                "Failed to discard {}: {}",
                file.content_path.display(),
                err
            );
        }
    }
}

pub async fn share_info(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ShareInfoResponse>, ApiError> {
    let record = state.store.get(&code)?;
    Ok(Json(ShareInfoResponse {
        files: record.files.iter().map(FileInfo::from).collect(),
        expires_at: record.expires_at,
    }))
}

pub async fn download_archive(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response, ApiError> {
    let record = state.store.get(&code)?;
    let archive_file = archive::build_share_archive(record.files).await?;
    let stream = ReaderStream::new(archive_file);
    let response = Response::builder()
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"sharebox-files.zip\"",
        )
        .body(Body::from_stream(stream))
        .map_err(anyhow::Error::from)?;
    Ok(response)
}

pub async fn download_by_name(
    State(state): State<AppState>,
    Path((code, filename)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let record = state.store.get(&code)?;
    // First match wins; duplicate names within a share shadow each other.
    let entry = record
        .files
        .iter()
        .find(|file| file.original_name == filename)
        .ok_or(ApiError::NotFound)?;
    stream_entry(entry).await
}

pub async fn download_by_index(
    State(state): State<AppState>,
    Path((code, index)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let record = state.store.get(&code)?;
    let index: usize = index.parse().map_err(|_| ApiError::NotFound)?;
    let entry = record.files.get(index).ok_or(ApiError::NotFound)?;
    stream_entry(entry).await
}

async fn stream_entry(entry: &FileEntry) -> Result<Response, ApiError> {
    // A missing file behind a live record reads the same as a dead code.
    let file = match storage::open_content(&entry.content_path).await {
        Ok(file) => file,
        Err(_) => return Err(ApiError::NotFound),
    };
    let stream = ReaderStream::new(file);
    let response = Response::builder()
        .header(header::CONTENT_TYPE, entry.mime_type.as_str())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", entry.original_name),
        )
        .header(header::CONTENT_LENGTH, entry.size)
        .body(Body::from_stream(stream))
        .map_err(anyhow::Error::from)?;
    Ok(response)
}

pub async fn storage_status(State(state): State<AppState>) -> Json<StorageResponse> {
    let status = state.store.status();
    let usage_percentage = if status.capacity_bytes == 0 {
        0
    } else {
        ((status.used_bytes as f64 / status.capacity_bytes as f64) * 100.0).round() as u32
    };
    Json(StorageResponse {
        used_bytes: status.used_bytes,
        capacity_bytes: status.capacity_bytes,
        remaining: status.capacity_bytes.saturating_sub(status.used_bytes),
        usage_percentage,
        active_code_count: status.active_codes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responses_use_camel_case_keys() {
        let upload = UploadResponse {
            code: "1234".to_string(),
            files: vec![FileInfo {
                original_name: "a.txt".to_string(),
                size: 3,
            }],
            expires_at: Utc::now(),
            expires_in: "5 minutes".to_string(),
        };
        let json = serde_json::to_value(&upload).expect("serialize");
        assert!(json.get("expiresAt").is_some());
        assert!(json.get("expiresIn").is_some());
        assert!(json["files"][0].get("originalName").is_some());

        let status = StorageResponse {
            used_bytes: 1,
            capacity_bytes: 2,
            remaining: 1,
            usage_percentage: 50,
            active_code_count: 1,
        };
        let json = serde_json::to_value(&status).expect("serialize");
        assert!(json.get("usedBytes").is_some());
        assert!(json.get("capacityBytes").is_some());
        assert!(json.get("usagePercentage").is_some());
        assert!(json.get("activeCodeCount").is_some());
    }
}
