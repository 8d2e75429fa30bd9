use crate::domain::ports::TransferChannel;
use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// A [`TransferChannel`] backed by a local directory, standing in for the
/// funding authority's SFTP drop. Used by fixture runs and tests.
///
/// Uploads land under a temporary name and are renamed into place only once
/// fully written, so a consumer polling the directory never observes a
/// partial file.
#[derive(Clone)]
pub struct LocalDirTransfer {
    root: PathBuf,
}

impl LocalDirTransfer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl TransferChannel for LocalDirTransfer {
    async fn upload(&self, name: &str, contents: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let tmp = self.root.join(format!(".tmp-{name}"));
        let target = self.root.join(name);
        tokio::fs::write(&tmp, contents).await?;
        // Promote atomically; rename within one directory cannot tear.
        tokio::fs::rename(&tmp, &target).await?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(prefix) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn download(&self, name: &str) -> Result<String> {
        Ok(tokio::fs::read_to_string(self.root.join(name)).await?)
    }

    async fn archive(&self, name: &str) -> Result<()> {
        let archive_dir = self.root.join("archive");
        tokio::fs::create_dir_all(&archive_dir).await?;
        tokio::fs::rename(self.root.join(name), archive_dir.join(name)).await?;
        Ok(())
    }
}
