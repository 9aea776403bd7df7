use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::project_config::{FileProviderConfig, OcrProviderConfig, ProjectConfig};
use crate::error::AppResult;

use super::file::local::LocalFileProvider;
use super::file::object_store::ObjectStoreFileProvider;
use super::file::FileProvider;
use super::ocr::layout_ocr::LayoutOcrProvider;
use super::ocr::local_ocr::LocalOcrProvider;
use super::ocr::OcrProvider;

/// Builds the concrete file provider named in a project's configuration.
/// Each variant of `FileProviderConfig` maps to exactly one implementation;
/// there is no fallback case to keep silently accepting unknown providers.
pub async fn build_file_provider(config: &ProjectConfig) -> AppResult<Arc<dyn FileProvider>> {
    match &config.file_provider {
        FileProviderConfig::Local(local) => {
            Ok(Arc::new(LocalFileProvider::new(local.clone())) as Arc<dyn FileProvider>)
        }
        FileProviderConfig::ObjectStore(object_store) => {
            let resolved = object_store.resolved()?;
            Ok(Arc::new(ObjectStoreFileProvider::new(resolved).await?) as Arc<dyn FileProvider>)
        }
    }
}

pub async fn build_ocr_provider(
    config: &ProjectConfig,
    app_config: &AppConfig,
) -> AppResult<Arc<dyn OcrProvider>> {
    match &config.ocr_provider {
        OcrProviderConfig::LocalOcr(local) => Ok(Arc::new(LocalOcrProvider::new(
            local.clone(),
            app_config.tesseract_binary.clone(),
        )) as Arc<dyn OcrProvider>),
        OcrProviderConfig::LayoutOcr(layout) => {
            let resolved = layout.resolved()?;
            Ok(Arc::new(LayoutOcrProvider::new(resolved).await?) as Arc<dyn OcrProvider>)
        }
    }
}
