use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::{fs::File, io::AsyncWriteExt};
use uuid::Uuid;

/// Filesystem blob store. Each accepted upload lives as a single file named
/// by its blob id; exam records reference blobs by that id only.
#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into().join("exames"),
        }
    }

    /// Ensure the storage directory exists.
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("failed to ensure storage root at {}", self.root.display()))
    }

    pub fn path_for(&self, blob_id: Uuid) -> PathBuf {
        self.root.join(blob_id.to_string())
    }

    /// Writes the blob to disk. Must complete before the exam record that
    /// references `blob_id` is created.
    pub async fn save(&self, blob_id: Uuid, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = File::create(self.path_for(blob_id)).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(())
    }

    pub async fn read(&self, blob_id: Uuid) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(self.path_for(blob_id)).await
    }

    #[cfg(test)]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn grava_e_le_um_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.ensure_root().await.unwrap();

        let blob_id = Uuid::new_v4();
        store.save(blob_id, b"%PDF-1.7 conteudo").await.unwrap();

        let lido = store.read(blob_id).await.unwrap();
        assert_eq!(lido, b"%PDF-1.7 conteudo");
        assert!(store.root().join(blob_id.to_string()).exists());
    }

    #[tokio::test]
    async fn blob_inexistente_e_erro_de_io() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.ensure_root().await.unwrap();

        assert!(store.read(Uuid::new_v4()).await.is_err());
    }
}
