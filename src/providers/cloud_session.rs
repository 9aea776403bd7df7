use std::sync::Arc;

use aws_credential_types::Credentials;
use aws_sdk_sts::types::Credentials as StsCredentials;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::project_config::resolve_env_placeholders;
use crate::error::{AppError, AppResult};

const ROLE_SESSION_NAME: &str = "MrkrSession";
const REDACTED: &str = "*****";

#[derive(Clone)]
pub struct ResolvedAwsConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region_name: String,
    pub account_id: String,
    pub role_name: String,
}

/// Project configs resolve `{{ENV_VAR}}` placeholders into real credentials
/// before a `ResolvedAwsConfig` exists, so its `Debug` output (which ends up
/// in `tracing::error!` fields whenever a provider fails to build) must
/// never echo the secret back.
impl std::fmt::Debug for ResolvedAwsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedAwsConfig")
            .field("access_key_id", &REDACTED)
            .field("secret_access_key", &REDACTED)
            .field("region_name", &self.region_name)
            .field("account_id", &self.account_id)
            .field("role_name", &self.role_name)
            .finish()
    }
}

impl ResolvedAwsConfig {
    pub fn new(
        access_key_id: &str,
        secret_access_key: &str,
        region_name: &str,
        account_id: &str,
        role_name: &str,
    ) -> AppResult<Self> {
        Ok(Self {
            access_key_id: resolve_env_placeholders(access_key_id)?,
            secret_access_key: resolve_env_placeholders(secret_access_key)?,
            region_name: resolve_env_placeholders(region_name)?,
            account_id: resolve_env_placeholders(account_id)?,
            role_name: resolve_env_placeholders(role_name)?,
        })
    }

    fn role_arn(&self) -> String {
        format!("arn:aws:iam::{}:role/{}", self.account_id, self.role_name)
    }
}

struct TemporaryCredentials {
    credentials: Credentials,
    expiration: DateTime<Utc>,
}

/// Mirrors a Python session object that wraps its long-lived access key
/// pair and transparently assumes a role to mint short-lived credentials.
/// A single mutex around the cached credentials means concurrent callers
/// (the worker pool scanning several documents at once) share one
/// refresh instead of racing the STS API.
pub struct CloudSession {
    config: ResolvedAwsConfig,
    sdk_config: aws_config::SdkConfig,
    temp_credentials: Mutex<Option<TemporaryCredentials>>,
}

impl CloudSession {
    pub async fn new(config: ResolvedAwsConfig) -> Self {
        let base_credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "mrkr-static",
        );
        let sdk_config = aws_config::from_env()
            .region(aws_config::Region::new(config.region_name.clone()))
            .credentials_provider(base_credentials)
            .load()
            .await;
        Self {
            config,
            sdk_config,
            temp_credentials: Mutex::new(None),
        }
    }

    /// Fetches fresh temporary credentials from STS if the cached set is
    /// missing or expired, otherwise reuses it.
    async fn refresh_temp_credentials(&self) -> AppResult<Credentials> {
        let mut guard = self.temp_credentials.lock().await;

        if let Some(existing) = guard.as_ref() {
            if existing.expiration > Utc::now() {
                return Ok(existing.credentials.clone());
            }
        }

        let sts_client = aws_sdk_sts::Client::new(&self.sdk_config);
        let response = sts_client
            .assume_role()
            .role_session_name(ROLE_SESSION_NAME)
            .role_arn(self.config.role_arn())
            .send()
            .await
            .map_err(|err| AppError::auth(format!("failed to assume role: {err}")))?;

        let StsCredentials {
            access_key_id,
            secret_access_key,
            session_token,
            expiration,
            ..
        } = response
            .credentials
            .ok_or_else(|| AppError::auth("assume_role response missing credentials"))?;

        let expiration_utc: DateTime<Utc> = DateTime::from_timestamp(
            expiration.secs(),
            expiration.subsec_nanos(),
        )
        .ok_or_else(|| AppError::auth("assume_role returned an invalid expiration"))?;

        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            Some(session_token),
            None,
            "mrkr-assumed-role",
        );

        *guard = Some(TemporaryCredentials {
            credentials: credentials.clone(),
            expiration: expiration_utc,
        });

        Ok(credentials)
    }

    pub fn region(&self) -> &str {
        &self.config.region_name
    }

    pub async fn s3_client(&self) -> AppResult<aws_sdk_s3::Client> {
        let credentials = self.refresh_temp_credentials().await?;
        let config = aws_sdk_s3::Config::builder()
            .region(aws_config::Region::new(self.config.region_name.clone()))
            .credentials_provider(credentials)
            .behavior_version(aws_config::BehaviorVersion::latest())
            .build();
        Ok(aws_sdk_s3::Client::from_conf(config))
    }

    pub async fn textract_client(&self) -> AppResult<aws_sdk_textract::Client> {
        let credentials = self.refresh_temp_credentials().await?;
        let config = aws_sdk_textract::Config::builder()
            .region(aws_config::Region::new(self.config.region_name.clone()))
            .credentials_provider(credentials)
            .behavior_version(aws_config::BehaviorVersion::latest())
            .build();
        Ok(aws_sdk_textract::Client::from_conf(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_credentials() {
        let config = ResolvedAwsConfig {
            access_key_id: "AKIAEXAMPLE".to_string(),
            secret_access_key: "super-secret-value".to_string(),
            region_name: "us-east-1".to_string(),
            account_id: "123456789012".to_string(),
            role_name: "mrkr-role".to_string(),
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("AKIAEXAMPLE"));
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("us-east-1"));
    }
}

pub type SharedCloudSession = Arc<CloudSession>;
