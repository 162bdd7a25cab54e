use crate::domain::image::validate_image;
use crate::error::Result;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Product images stored as flat files under one directory.
///
/// Products only ever hold the returned file name.
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Validates and writes an upload, returning the stored file name.
    ///
    /// Existing files are never overwritten: a taken name gets a numeric
    /// suffix (`kiwi.png`, `kiwi-1.png`, ...), so the returned name always
    /// refers to a file created by this call.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        let name = validate_image(original_name, bytes.len() as u64)?;
        fs::create_dir_all(&self.root).await?;
        let (mut file, name) = self.create_unique(&name).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        debug!(file = %name, bytes = bytes.len(), "stored product image");
        Ok(name)
    }

    async fn create_unique(&self, name: &str) -> Result<(File, String)> {
        let mut attempt = 0u32;
        loop {
            let candidate = match (attempt, name.rsplit_once('.')) {
                (0, _) => name.to_string(),
                (n, Some((stem, ext))) => format!("{stem}-{n}.{ext}"),
                (n, None) => format!("{name}-{n}"),
            };
            let opened = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.path_of(&candidate))
                .await;
            match opened {
                Ok(file) => return Ok((file, candidate)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Copies an image from the local filesystem into the upload directory.
    pub async fn import(&self, source: &Path) -> Result<String> {
        let original_name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let size = fs::metadata(source).await?.len();
        validate_image(&original_name, size)?;
        let bytes = fs::read(source).await?;
        self.save(&original_name, &bytes).await
    }

    /// Deletes a stored image. A file that is already gone is not an error.
    pub async fn remove(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.path_of(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
