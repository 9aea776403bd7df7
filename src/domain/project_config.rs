use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

static ENV_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("static regex"));

/// Replace `{{ENV_VAR}}` placeholders in a string with process environment
/// values. Fails closed: an unresolved placeholder is a `ConfigResolutionError`.
pub fn resolve_env_placeholders(template: &str) -> AppResult<String> {
    let mut err: Option<AppError> = None;
    let resolved = ENV_PLACEHOLDER.replace_all(template, |caps: &regex::Captures| {
        let name = &caps[1];
        match std::env::var(name) {
            Ok(value) => value,
            Err(_) => {
                if err.is_none() {
                    err = Some(AppError::config_resolution(format!(
                        "environment variable '{name}' not set"
                    )));
                }
                String::new()
            }
        }
    });
    match err {
        Some(e) => Err(e),
        None => Ok(resolved.into_owned()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalFileProviderConfig {
    pub path: String,
    #[serde(default = "default_pdf_dpi")]
    pub pdf_dpi: u32,
    #[serde(default = "default_image_format")]
    pub image_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStoreFileProviderConfig {
    pub path: String,
    #[serde(default = "default_pdf_dpi")]
    pub pdf_dpi: u32,
    #[serde(default = "default_image_format")]
    pub image_format: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub aws_region_name: String,
    pub aws_account_id: String,
    pub aws_role_name: String,
    pub aws_bucket_name: String,
}

impl ObjectStoreFileProviderConfig {
    pub fn resolved(&self) -> AppResult<Self> {
        Ok(Self {
            path: self.path.clone(),
            pdf_dpi: self.pdf_dpi,
            image_format: self.image_format.clone(),
            aws_access_key_id: resolve_env_placeholders(&self.aws_access_key_id)?,
            aws_secret_access_key: resolve_env_placeholders(&self.aws_secret_access_key)?,
            aws_region_name: resolve_env_placeholders(&self.aws_region_name)?,
            aws_account_id: resolve_env_placeholders(&self.aws_account_id)?,
            aws_role_name: resolve_env_placeholders(&self.aws_role_name)?,
            aws_bucket_name: resolve_env_placeholders(&self.aws_bucket_name)?,
        })
    }
}

fn default_pdf_dpi() -> u32 {
    200
}

fn default_image_format() -> String {
    "JPEG".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum FileProviderConfig {
    Local(LocalFileProviderConfig),
    ObjectStore(ObjectStoreFileProviderConfig),
}

impl FileProviderConfig {
    pub fn path(&self) -> &str {
        match self {
            FileProviderConfig::Local(c) => &c.path,
            FileProviderConfig::ObjectStore(c) => &c.path,
        }
    }

    pub fn pdf_dpi(&self) -> u32 {
        match self {
            FileProviderConfig::Local(c) => c.pdf_dpi,
            FileProviderConfig::ObjectStore(c) => c.pdf_dpi,
        }
    }

    pub fn image_format(&self) -> &str {
        match self {
            FileProviderConfig::Local(c) => &c.image_format,
            FileProviderConfig::ObjectStore(c) => &c.image_format,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalOcrConfig {
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "eng".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutOcrConfig {
    #[serde(default = "default_image_format")]
    pub image_format: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub aws_region_name: String,
    pub aws_account_id: String,
    pub aws_role_name: String,
}

impl LayoutOcrConfig {
    pub fn resolved(&self) -> AppResult<Self> {
        Ok(Self {
            image_format: self.image_format.clone(),
            aws_access_key_id: resolve_env_placeholders(&self.aws_access_key_id)?,
            aws_secret_access_key: resolve_env_placeholders(&self.aws_secret_access_key)?,
            aws_region_name: resolve_env_placeholders(&self.aws_region_name)?,
            aws_account_id: resolve_env_placeholders(&self.aws_account_id)?,
            aws_role_name: resolve_env_placeholders(&self.aws_role_name)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum OcrProviderConfig {
    LocalOcr(LocalOcrConfig),
    LayoutOcr(LayoutOcrConfig),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelType {
    ClassificationSingle,
    ClassificationMultiple,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelTarget {
    Document,
    Page,
    Block,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelDefinition {
    #[serde(rename = "type")]
    pub kind: LabelType,
    pub target: LabelTarget,
    pub name: String,
    pub color: String,
}

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("static regex"));

impl LabelDefinition {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.is_empty() || self.name.chars().count() > 50 {
            return Err(AppError::bad_request(
                "label name must be between 1 and 50 characters",
            ));
        }
        if !HEX_COLOR.is_match(&self.color) {
            return Err(AppError::bad_request(
                "label color must be #RGB or #RRGGBB",
            ));
        }
        if self.kind == LabelType::Text && self.target != LabelTarget::Block {
            return Err(AppError::bad_request("text labels must target block"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub label_definitions: Vec<LabelDefinition>,
    pub file_provider: FileProviderConfig,
    pub ocr_provider: OcrProviderConfig,
}

impl ProjectConfig {
    pub fn validate(&self) -> AppResult<()> {
        for definition in &self.label_definitions {
            definition.validate()?;
        }
        Ok(())
    }

    pub fn from_json(value: &serde_json::Value) -> AppResult<Self> {
        let config: ProjectConfig = serde_json::from_value(value.clone())
            .map_err(|err| AppError::bad_request(format!("invalid project config: {err}")))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_env_var() {
        std::env::set_var("MRKR_TEST_VAR", "secret-value");
        let resolved = resolve_env_placeholders("prefix-{{MRKR_TEST_VAR}}-suffix").unwrap();
        assert_eq!(resolved, "prefix-secret-value-suffix");
    }

    #[test]
    fn fails_on_missing_env_var() {
        std::env::remove_var("MRKR_TEST_MISSING");
        let result = resolve_env_placeholders("{{MRKR_TEST_MISSING}}");
        assert!(result.is_err());
    }

    #[test]
    fn text_label_must_target_block() {
        let definition = LabelDefinition {
            kind: LabelType::Text,
            target: LabelTarget::Page,
            name: "Name".to_string(),
            color: "#4CAF50".to_string(),
        };
        assert!(definition.validate().is_err());
    }

    #[test]
    fn parses_local_file_provider_tagged_config() {
        let json = serde_json::json!({
            "label_definitions": [],
            "file_provider": {
                "type": "local",
                "config": {"path": "demo"}
            },
            "ocr_provider": {
                "type": "local_ocr",
                "config": {}
            }
        });
        let config = ProjectConfig::from_json(&json).unwrap();
        assert_eq!(config.file_provider.path(), "demo");
        assert_eq!(config.file_provider.pdf_dpi(), 200);
    }
}
