//! Local staged copies of uploaded payloads.
//!
//! A payload is written to the staging directory while the request body is
//! read, then handed to the workflow, which removes it once the object store
//! has the bytes. A staged file that is dropped without being removed
//! deletes itself.

use bytes::Bytes;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const OCTET_STREAM: &str = "application/octet-stream";

pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, io::Error> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Open a new staged file for writing.
    pub async fn create(
        &self,
        original_name: Option<String>,
        content_type: Option<String>,
    ) -> Result<StagingWriter, io::Error> {
        let path = self.dir.join(format!("{}.upload", uuid::Uuid::new_v4()));
        let file = tokio::fs::File::create(&path).await?;

        Ok(StagingWriter {
            file,
            staged: StagedFile {
                path,
                original_name,
                content_type,
                byte_size: 0,
            },
        })
    }

    /// Stage an in-memory payload in one call.
    pub async fn stage_bytes(
        &self,
        data: &[u8],
        original_name: Option<String>,
        content_type: Option<String>,
    ) -> Result<StagedFile, io::Error> {
        let mut writer = self.create(original_name, content_type).await?;
        writer.write_chunk(data).await?;
        writer.finish().await
    }
}

pub struct StagingWriter {
    file: tokio::fs::File,
    staged: StagedFile,
}

impl StagingWriter {
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), io::Error> {
        self.file.write_all(chunk).await?;
        self.staged.byte_size += chunk.len() as u64;
        Ok(())
    }

    /// Bytes written so far
    pub fn len(&self) -> u64 {
        self.staged.byte_size
    }

    pub fn is_empty(&self) -> bool {
        self.staged.byte_size == 0
    }

    pub async fn finish(mut self) -> Result<StagedFile, io::Error> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        Ok(self.staged)
    }
}

#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    original_name: Option<String>,
    content_type: Option<String>,
    byte_size: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    pub async fn read(&self) -> Result<Bytes, io::Error> {
        Ok(Bytes::from(tokio::fs::read(&self.path).await?))
    }

    /// MIME type from the multipart Content-Type, else guessed from the
    /// client's file name, else from `display_name`.
    pub fn mime_type(&self, display_name: &str) -> String {
        self.content_type
            .clone()
            .filter(|ct| !ct.is_empty() && ct != OCTET_STREAM)
            .or_else(|| {
                self.original_name
                    .as_deref()
                    .and_then(|n| mime_guess::from_path(n).first())
                    .map(|m| m.to_string())
            })
            .or_else(|| mime_guess::from_path(display_name).first().map(|m| m.to_string()))
            .unwrap_or_else(|| OCTET_STREAM.to_string())
    }

    /// Delete the staged copy.
    pub async fn remove(mut self) -> Result<(), io::Error> {
        let path = std::mem::take(&mut self.path);
        tokio::fs::remove_file(&path).await
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.path.as_os_str().is_empty() {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove staged upload");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stage_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path()).unwrap();

        let staged = area.stage_bytes(b"hello", None, None).await.unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(staged.byte_size(), 5);
        assert_eq!(staged.read().await.unwrap(), Bytes::from_static(b"hello"));

        staged.remove().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_dropped_staged_file_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path()).unwrap();

        let staged = area.stage_bytes(b"abandoned", None, None).await.unwrap();
        let path = staged.path().to_path_buf();
        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_chunked_write_counts_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path()).unwrap();

        let mut writer = area.create(None, None).await.unwrap();
        assert!(writer.is_empty());
        writer.write_chunk(b"abc").await.unwrap();
        writer.write_chunk(b"defg").await.unwrap();
        assert_eq!(writer.len(), 7);

        let staged = writer.finish().await.unwrap();
        assert_eq!(staged.read().await.unwrap(), Bytes::from_static(b"abcdefg"));
    }

    #[tokio::test]
    async fn test_mime_type_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path()).unwrap();

        let explicit = area
            .stage_bytes(b"x", Some("a.bin".into()), Some("image/png".into()))
            .await
            .unwrap();
        assert_eq!(explicit.mime_type("report.pdf"), "image/png");

        let from_upload_name = area
            .stage_bytes(b"x", Some("scan.pdf".into()), Some(OCTET_STREAM.into()))
            .await
            .unwrap();
        assert_eq!(from_upload_name.mime_type("whatever"), "application/pdf");

        let from_display_name = area.stage_bytes(b"x", None, None).await.unwrap();
        assert_eq!(from_display_name.mime_type("photo.jpg"), "image/jpeg");
        assert_eq!(from_display_name.mime_type("no-extension"), OCTET_STREAM);
    }
}
