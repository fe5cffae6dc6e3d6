//! Saving exported playlists to disk.

use crate::error::Result;
use crate::types::ExportedPlaylist;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::info;

impl ExportedPlaylist {
    /// Name the download after the playlist title (`<title>.<ext>`).
    pub fn with_title(mut self, title: &str) -> Self {
        self.filename = format!("{}.{}", file_stem(title), self.format.extension());
        self
    }

    /// Write the export into `dir`, returning the full path.
    pub async fn save_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.filename);

        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(&self.bytes).await?;
        file.flush().await?;

        info!(
            path = %path.display(),
            size = self.bytes.len(),
            "Playlist export saved"
        );
        Ok(path)
    }
}

/// Title made safe for use as a file name
fn file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        "playlist".to_string()
    } else {
        stem
    }
}
