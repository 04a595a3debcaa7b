use sprintboard_core::SprintboardResult;
use std::path::Path;
use tokio::fs;

/// Writes whole files through a temp file and a rename, so readers see
/// either the old contents or the new ones.
pub struct AtomicWriter;

impl AtomicWriter {
    pub async fn write_atomic(path: &Path, data: &[u8]) -> SprintboardResult<()> {
        // Temp file must live on the same filesystem for the rename
        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).await?;

        let temp_file = tempfile::NamedTempFile::new_in(parent)?;
        let temp_path = temp_file.path().to_path_buf();

        fs::write(&temp_path, data).await?;
        fs::rename(&temp_path, path).await?;

        tracing::debug!(
            "Atomically wrote {} bytes to {}",
            data.len(),
            path.display()
        );
        Ok(())
    }

    /// Read a file, `None` when it does not exist yet.
    pub async fn read_if_exists(path: &Path) -> SprintboardResult<Option<Vec<u8>>> {
        match fs::read(path).await {
            Ok(data) => {
                tracing::debug!("Read {} bytes from {}", data.len(), path.display());
                Ok(Some(data))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_atomic_write_overwrites() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("store.json");

        AtomicWriter::write_atomic(&file_path, b"First").await.unwrap();
        AtomicWriter::write_atomic(&file_path, b"Second").await.unwrap();

        let read_data = AtomicWriter::read_if_exists(&file_path).await.unwrap();
        assert_eq!(read_data.as_deref(), Some(&b"Second"[..]));
    }

    #[tokio::test]
    async fn test_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("nested").join("store.json");

        AtomicWriter::write_atomic(&file_path, b"{}").await.unwrap();
        assert!(file_path.exists());
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_none() {
        let dir = tempdir().unwrap();
        let read = AtomicWriter::read_if_exists(&dir.path().join("absent.json"))
            .await
            .unwrap();
        assert!(read.is_none());
    }
}
