use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::domain::project_config::LocalFileProviderConfig;
use crate::error::{AppError, AppResult};

use super::FileProvider;

pub struct LocalFileProvider {
    config: LocalFileProviderConfig,
}

impl LocalFileProvider {
    pub fn new(config: LocalFileProviderConfig) -> Self {
        Self { config }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        Path::new(self.config.path.trim_matches('/')).join(path.trim_matches('/'))
    }

    /// `None` means "path does not exist"; a permission error is raised
    /// immediately rather than folded into that case.
    async fn stat(&self, path: &str) -> AppResult<Option<Metadata>> {
        match fs::metadata(self.resolve(path)).await {
            Ok(metadata) => Ok(Some(metadata)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) if err.kind() == ErrorKind::PermissionDenied => {
                Err(AppError::permission_denied(format!(
                    "permission denied accessing '{}': {err}",
                    self.resolve(path).display()
                )))
            }
            Err(err) => Err(AppError::from(err)),
        }
    }
}

#[async_trait]
impl FileProvider for LocalFileProvider {
    async fn is_file(&self, path: &str) -> AppResult<bool> {
        Ok(self.stat(path).await?.map(|m| m.is_file()).unwrap_or(false))
    }

    async fn is_folder(&self, path: &str) -> AppResult<bool> {
        Ok(self.stat(path).await?.map(|m| m.is_dir()).unwrap_or(false))
    }

    async fn read(&self, path: &str) -> AppResult<Vec<u8>> {
        let full_path = self.resolve(path);
        match self.stat(path).await? {
            None => return Err(AppError::not_found()),
            Some(metadata) if !metadata.is_file() => {
                return Err(AppError::storage(format!(
                    "object '{}' is not a file",
                    full_path.display()
                )));
            }
            Some(_) => {}
        }
        let bytes = fs::read(&full_path).await?;
        Ok(bytes)
    }

    async fn list(&self, path: &str) -> AppResult<Vec<String>> {
        let full_path = self.resolve(path);
        match self.stat(path).await? {
            None => return Err(AppError::not_found()),
            Some(metadata) if !metadata.is_dir() => {
                return Err(AppError::storage(format!(
                    "object '{}' is not a folder",
                    full_path.display()
                )));
            }
            Some(_) => {}
        }

        let mut entries = fs::read_dir(&full_path).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn pdf_dpi(&self) -> u32 {
        self.config.pdf_dpi
    }

    fn image_format(&self) -> &str {
        &self.config.image_format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(path: &str) -> LocalFileProvider {
        LocalFileProvider::new(LocalFileProviderConfig {
            path: path.to_string(),
            pdf_dpi: 200,
            image_format: "JPEG".to_string(),
        })
    }

    #[tokio::test]
    async fn lists_files_in_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"world").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let provider = provider(dir.path().to_str().unwrap());
        let mut files = provider.list("").await.unwrap();
        files.sort();
        assert_eq!(files, vec!["a.txt".to_string(), "b.txt".to_string()]);
    }

    #[tokio::test]
    async fn reads_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();

        let provider = provider(dir.path().to_str().unwrap());
        let bytes = provider.read("a.txt").await.unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[tokio::test]
    async fn reading_a_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let provider = provider(dir.path().to_str().unwrap());
        assert!(provider.read("sub").await.is_err());
    }

    #[tokio::test]
    async fn reading_a_missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider(dir.path().to_str().unwrap());

        let err = provider.read("does-not-exist.png").await.unwrap_err();
        assert_eq!(err.kind, crate::error::Kind::NotFound);
    }
}
