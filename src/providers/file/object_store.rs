use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::error::ProvideErrorMetadata;

use crate::domain::project_config::ObjectStoreFileProviderConfig;
use crate::error::{AppError, AppResult};
use crate::providers::cloud_session::{CloudSession, ResolvedAwsConfig};

use super::FileProvider;

/// `AccessDenied`/`Forbidden` S3 error codes map to `PermissionDenied`
/// rather than the generic `Storage` bucket; everything else stays
/// `Storage` since it covers outages, throttling and malformed requests
/// alike.
fn classify_sdk_error<E: ProvideErrorMetadata>(context: &str, err: &E) -> AppError {
    match err.code() {
        Some("AccessDenied") | Some("Forbidden") => {
            AppError::permission_denied(format!("{context}: access denied"))
        }
        _ => AppError::storage(format!("{context}: {}", err.message().unwrap_or_default())),
    }
}

pub struct ObjectStoreFileProvider {
    config: ObjectStoreFileProviderConfig,
    session: Arc<CloudSession>,
    bucket_name: String,
}

impl ObjectStoreFileProvider {
    pub async fn new(config: ObjectStoreFileProviderConfig) -> AppResult<Self> {
        let aws_config = ResolvedAwsConfig::new(
            &config.aws_access_key_id,
            &config.aws_secret_access_key,
            &config.aws_region_name,
            &config.aws_account_id,
            &config.aws_role_name,
        )?;
        let bucket_name =
            crate::domain::project_config::resolve_env_placeholders(&config.aws_bucket_name)?;
        let session = Arc::new(CloudSession::new(aws_config).await);
        Ok(Self {
            config,
            session,
            bucket_name,
        })
    }

    fn key(&self, path: &str) -> String {
        Path::new(self.config.path.trim_matches('/'))
            .join(path.trim_matches('/'))
            .to_string_lossy()
            .into_owned()
    }

    async fn head(&self, key: &str) -> AppResult<Option<String>> {
        let client = self.session.s3_client().await?;
        match client
            .head_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
        {
            Ok(output) => Ok(output.content_type().map(|s| s.to_string())),
            Err(err) => {
                if let Some(service_err) = err.as_service_error() {
                    if service_err.is_not_found() {
                        return Ok(None);
                    }
                }
                Err(classify_sdk_error(
                    &format!("failed to fetch object metadata for '{key}'"),
                    &err,
                ))
            }
        }
    }
}

#[async_trait]
impl FileProvider for ObjectStoreFileProvider {
    async fn is_file(&self, path: &str) -> AppResult<bool> {
        let content_type = self.head(&self.key(path)).await?;
        Ok(match content_type {
            Some(ct) => !ct.to_lowercase().starts_with("application/x-directory"),
            None => false,
        })
    }

    async fn is_folder(&self, path: &str) -> AppResult<bool> {
        let key = format!("{}/", self.key(path).trim_end_matches('/'));
        let content_type = self.head(&key).await?;
        Ok(match content_type {
            Some(ct) => ct.to_lowercase().starts_with("application/x-directory"),
            None => false,
        })
    }

    async fn read(&self, path: &str) -> AppResult<Vec<u8>> {
        let key = self.key(path);
        match self.head(&key).await? {
            None => return Err(AppError::not_found()),
            Some(ct) if ct.to_lowercase().starts_with("application/x-directory") => {
                return Err(AppError::storage(format!("object '{key}' is not a file")));
            }
            Some(_) => {}
        }

        let client = self.session.s3_client().await?;
        let output = client
            .get_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .send()
            .await
            .map_err(|err| classify_sdk_error(&format!("failed to download '{key}'"), &err))?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|err| AppError::storage(format!("failed to stream '{key}': {err}")))?;

        Ok(bytes.into_bytes().to_vec())
    }

    async fn list(&self, path: &str) -> AppResult<Vec<String>> {
        let prefix = format!("{}/", self.key(path).trim_end_matches('/'));
        match self.head(&prefix).await? {
            None => return Err(AppError::not_found()),
            Some(ct) if !ct.to_lowercase().starts_with("application/x-directory") => {
                return Err(AppError::storage(format!(
                    "object '{prefix}' is not a folder"
                )));
            }
            Some(_) => {}
        }

        let client = self.session.s3_client().await?;
        let mut names = Vec::new();
        let mut stream = client
            .list_objects_v2()
            .bucket(&self.bucket_name)
            .prefix(&prefix)
            .into_paginator()
            .send();

        use futures_util::StreamExt;
        while let Some(page) = stream.next().await {
            let page = page
                .map_err(|err| classify_sdk_error(&format!("failed to list '{prefix}'"), &err))?;
            for object in page.contents() {
                if let Some(object_key) = object.key() {
                    if object_key.ends_with('/') {
                        continue;
                    }
                    names.push(object_key[prefix.len()..].to_string());
                }
            }
        }

        Ok(names)
    }

    fn pdf_dpi(&self) -> u32 {
        self.config.pdf_dpi
    }

    fn image_format(&self) -> &str {
        &self.config.image_format
    }
}
