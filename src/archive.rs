use anyhow::Context;
use std::io::{self, Seek};

use crate::error::ApiError;
use crate::records::FileEntry;

/// Bundle a share's files into an anonymous temp file and hand it back
/// positioned at the start, ready for streaming. The temp file has no
/// directory entry, so it disappears as soon as the handle drops.
pub async fn build_share_archive(files: Vec<FileEntry>) -> Result<tokio::fs::File, ApiError> {
    let archive = tokio::task::spawn_blocking(move || -> anyhow::Result<std::fs::File> {
        let mut tmp = tempfile::tempfile().context("Failed to create temp archive")?;
        {
            let mut writer = zip::ZipWriter::new(&tmp);
            let options = zip::write::FileOptions::<()>::default()
                .compression_method(zip::CompressionMethod::Deflated)
                .unix_permissions(0o644);

            for entry in &files {
                writer
                    .start_file(&entry.original_name, options)
                    .context("Failed to add file to archive")?;
                let mut src = std::fs::File::open(&entry.content_path).with_context(|| {
                    format!("Failed to open file: {}", entry.content_path.display())
                })?;
                io::copy(&mut src, &mut writer).context("Failed to write file to archive")?;
            }

            writer.finish().context("Failed to finalize archive")?;
        }
        tmp.rewind().context("Failed to rewind archive")?;
        Ok(tmp)
    })
    .await
    .map_err(anyhow::Error::from)??;

    Ok(tokio::fs::File::from_std(archive))
}
