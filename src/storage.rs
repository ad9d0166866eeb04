use log::info;
use rand::Rng;
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

/// Create the content directory, clearing anything left behind by a
/// previous process. The registry and quota start empty on boot, so stale
/// bytes must not survive into this run.
pub fn init_upload_dir(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        info!("Clearing upload directory...");
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                fs::remove_dir_all(path)?;
            } else {
                fs::remove_file(path)?;
            }
        }
    } else {
        fs::create_dir_all(dir)?;
    }
    info!("Upload directory ready: {}", dir.display());
    Ok(())
}

/// Unique on-disk location for one uploaded file.
pub fn content_path(dir: &Path, original_name: &str) -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let mut rng = rand::rng();
    let suffix: u32 = rng.random_range(100000..999999);
    dir.join(format!("{}_{}_{}", now, suffix, sanitize_filename(original_name)))
}

pub fn sanitize_filename(filename: &str) -> String {
    let trimmed = filename.trim();
    if trimmed.is_empty() {
        return "file.bin".to_string();
    }
    trimmed.replace('/', "_").replace('\\', "_")
}

/// Idempotent: deleting a ref that is already gone is not an error.
pub async fn delete_content(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

pub async fn open_content(path: &Path) -> io::Result<tokio::fs::File> {
    tokio::fs::File::open(path).await
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exp = ((bytes as f64).log(1024.0).floor() as usize).min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exp as i32);
    format!("{:.2} {}", value, UNITS[exp])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_missing_dir() {
        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path().join("uploads");
        init_upload_dir(&dir).expect("init");
        assert!(dir.is_dir());
    }

    #[test]
    fn init_clears_existing_content() {
        let temp = TempDir::new().expect("temp dir");
        let stale = temp.path().join("stale.bin");
        fs::write(&stale, b"left over").expect("write stale file");
        let nested = temp.path().join("nested");
        fs::create_dir(&nested).expect("create nested dir");
        init_upload_dir(temp.path()).expect("init");
        assert!(!stale.exists());
        assert!(!nested.exists());
    }

    #[tokio::test]
    async fn delete_content_is_idempotent() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("content.bin");
        fs::write(&path, b"bytes").expect("write content");
        delete_content(&path).await.expect("first delete");
        delete_content(&path).await.expect("second delete");
        assert!(!path.exists());
    }

    #[test]
    fn content_paths_are_unique_per_call() {
        let temp = TempDir::new().expect("temp dir");
        let first = content_path(temp.path(), "same.txt");
        let second = content_path(temp.path(), "same.txt");
        assert_ne!(first, second);
    }

    #[test]
    fn sanitize_strips_path_separators() {
        assert_eq!(sanitize_filename("  report.pdf "), "report.pdf");
        assert_eq!(sanitize_filename("a/b\\c.txt"), "a_b_c.txt");
        assert_eq!(sanitize_filename("   "), "file.bin");
    }

    #[test]
    fn format_bytes_picks_unit() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(512), "512.00 Bytes");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_bytes(2 * 1024 * 1024 * 1024), "2.00 GB");
    }
}
