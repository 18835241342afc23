//! Interceptor configuration
//!
//! Loaded from TOML; every key is optional and falls back to the defaults
//! below.
//!
//! ```toml
//! tracked_methods = ["POST", "PUT", "DELETE"]
//! success_statuses = [200, 201, 204]
//! schemas_path = "schemas.json"
//!
//! [diff]
//! max_depth = 32
//! ```

use papertrail_core::classifier::{
    HttpMethod, PathMatchers, RequestClassifier, DEFAULT_ADMIN_PATH_PATTERN,
    DEFAULT_API_PATH_PATTERN, DEFAULT_TRACKED_METHODS,
};
use papertrail_core::diff::DiffOptions;
use papertrail_core::errors::{ExError, ExErrorKind};
use papertrail_core::InMemorySchemaRegistry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Statuses after which a mutation is considered to have taken effect
pub const DEFAULT_SUCCESS_STATUSES: [u16; 3] = [200, 201, 204];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaperTrailConfig {
    pub tracked_methods: Vec<HttpMethod>,
    pub success_statuses: Vec<u16>,
    /// Must capture `uid`, may capture `id`
    pub admin_path_pattern: String,
    /// Must capture `name`, may capture `id`
    pub api_path_pattern: String,
    /// JSON registry document seeding the schema registry
    pub schemas_path: Option<PathBuf>,
    pub diff: DiffOptions,
}

impl Default for PaperTrailConfig {
    fn default() -> Self {
        Self {
            tracked_methods: DEFAULT_TRACKED_METHODS.to_vec(),
            success_statuses: DEFAULT_SUCCESS_STATUSES.to_vec(),
            admin_path_pattern: DEFAULT_ADMIN_PATH_PATTERN.to_string(),
            api_path_pattern: DEFAULT_API_PATH_PATTERN.to_string(),
            schemas_path: None,
            diff: DiffOptions::default(),
        }
    }
}

impl PaperTrailConfig {
    /// # Errors
    ///
    /// `InvalidConfig` on malformed TOML, unknown keys, or values that fail
    /// [`Self::validate`].
    pub fn from_toml_str(text: &str) -> Result<Self, ExError> {
        let config: Self = toml::from_str(text).map_err(|e| {
            ExError::new(ExErrorKind::InvalidConfig)
                .with_op("config_load")
                .with_message(format!("Invalid configuration: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ExError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("config_load")
                .with_message(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// # Errors
    ///
    /// `InvalidConfig` when a list that must not be empty is empty or the
    /// depth limit is zero.
    pub fn validate(&self) -> Result<(), ExError> {
        let invalid = |message: &str| {
            Err(ExError::new(ExErrorKind::InvalidConfig)
                .with_op("config_validate")
                .with_message(message.to_string()))
        };
        if self.tracked_methods.is_empty() {
            return invalid("tracked_methods must not be empty");
        }
        if self.success_statuses.is_empty() {
            return invalid("success_statuses must not be empty");
        }
        if self.diff.max_depth == 0 {
            return invalid("diff.max_depth must be at least 1");
        }
        Ok(())
    }

    /// Compile the path patterns into a classifier
    ///
    /// # Errors
    ///
    /// `InvalidPattern` if either pattern fails to compile or lacks its
    /// content-type group.
    pub fn classifier(&self) -> Result<RequestClassifier, ExError> {
        let matchers = PathMatchers::new(&self.admin_path_pattern, &self.api_path_pattern)
            .map_err(|e| ExError::from(e).with_op("config_classifier"))?;
        Ok(RequestClassifier::new(self.tracked_methods.clone(), matchers))
    }

    /// Registry seeded from `schemas_path`, empty when unset
    ///
    /// A relative `schemas_path` is resolved against `base_dir`.
    ///
    /// # Errors
    ///
    /// As [`InMemorySchemaRegistry::from_file`].
    pub fn load_registry(&self, base_dir: &Path) -> Result<InMemorySchemaRegistry, ExError> {
        match &self.schemas_path {
            Some(path) => InMemorySchemaRegistry::from_file(base_dir.join(path)),
            None => Ok(InMemorySchemaRegistry::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = PaperTrailConfig::from_toml_str("").unwrap();
        assert_eq!(config, PaperTrailConfig::default());
        assert_eq!(config.success_statuses, vec![200, 201, 204]);
        assert_eq!(config.diff.max_depth, 32);
    }

    #[test]
    fn test_partial_override() {
        let config = PaperTrailConfig::from_toml_str(
            r#"
            tracked_methods = ["POST", "PUT", "PATCH", "DELETE"]

            [diff]
            max_depth = 8
            "#,
        )
        .unwrap();

        assert!(config.tracked_methods.contains(&HttpMethod::Patch));
        assert_eq!(config.diff.max_depth, 8);
        assert!(config.diff.excluded_keys.contains("updatedAt"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = PaperTrailConfig::from_toml_str("trackd_methods = []").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidConfig);
    }

    #[test]
    fn test_zero_depth_rejected() {
        let err = PaperTrailConfig::from_toml_str("[diff]\nmax_depth = 0").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidConfig);
    }

    #[test]
    fn test_bad_pattern_surfaces_from_classifier() {
        let config = PaperTrailConfig {
            api_path_pattern: "^/api/(?P<id>\\d+)$".to_string(),
            ..PaperTrailConfig::default()
        };
        let err = config.classifier().unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidPattern);
    }
}
