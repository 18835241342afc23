//! Schema lookup consumed by the classifier and the diff engine.
//!
//! The host owns its schemas; this crate only reads them. Lookups hand out
//! `Arc`s so a classified request can hold its schema across await points
//! without borrowing the registry.

use crate::classifier::PathParams;
use crate::errors::{ExError, ExErrorKind};
use crate::model::ContentSchema;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Read-only access to content-type and component schemas
pub trait SchemaRegistry: Send + Sync {
    /// Content type by uid (e.g. `api::article.article`)
    fn resolve(&self, uid: &str) -> Option<Arc<ContentSchema>>;

    /// Component by uid (e.g. `shared.seo`)
    fn component(&self, uid: &str) -> Option<Arc<ContentSchema>>;

    /// Content type by its public API name (plural or singular)
    fn resolve_api_name(&self, name: &str) -> Option<Arc<ContentSchema>>;

    /// Resolve the schema owning a matched path
    ///
    /// Administrative paths carry the uid itself; public API paths carry the
    /// collection's plural (or a single type's singular) name.
    fn resolve_from_path(
        &self,
        params: &PathParams,
        is_admin: bool,
    ) -> Option<Arc<ContentSchema>> {
        if is_admin {
            self.resolve(&params.content_type)
        } else {
            self.resolve_api_name(&params.content_type)
        }
    }
}

/// Registry file layout: `{"contentTypes": [...], "components": [...]}`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryDocument {
    #[serde(default)]
    content_types: Vec<ContentSchema>,
    #[serde(default)]
    components: Vec<ContentSchema>,
}

/// Registry held entirely in memory, seeded at startup
#[derive(Debug, Clone, Default)]
pub struct InMemorySchemaRegistry {
    content_types: BTreeMap<String, Arc<ContentSchema>>,
    components: BTreeMap<String, Arc<ContentSchema>>,
}

impl InMemorySchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_content_type(&mut self, schema: ContentSchema) {
        self.content_types
            .insert(schema.uid.clone(), Arc::new(schema));
    }

    pub fn register_component(&mut self, schema: ContentSchema) {
        self.components.insert(schema.uid.clone(), Arc::new(schema));
    }

    pub fn with_content_type(mut self, schema: ContentSchema) -> Self {
        self.register_content_type(schema);
        self
    }

    pub fn with_component(mut self, schema: ContentSchema) -> Self {
        self.register_component(schema);
        self
    }

    /// Parse a registry document
    ///
    /// # Errors
    ///
    /// `InvalidSchema` if the document is not valid JSON or an attribute
    /// declaration cannot be interpreted.
    pub fn from_json(json: &str) -> Result<Self, ExError> {
        let doc: RegistryDocument = serde_json::from_str(json).map_err(|e| {
            ExError::new(ExErrorKind::InvalidSchema)
                .with_op("registry_from_json")
                .with_message(format!("invalid schema registry document: {}", e))
        })?;

        let mut registry = Self::new();
        for schema in doc.content_types {
            registry.register_content_type(schema);
        }
        for schema in doc.components {
            registry.register_component(schema);
        }
        Ok(registry)
    }

    /// Load a registry document from disk
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise as [`Self::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ExError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("registry_from_file")
                .with_message(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn content_type_count(&self) -> usize {
        self.content_types.len()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

impl SchemaRegistry for InMemorySchemaRegistry {
    fn resolve(&self, uid: &str) -> Option<Arc<ContentSchema>> {
        self.content_types.get(uid).cloned()
    }

    fn component(&self, uid: &str) -> Option<Arc<ContentSchema>> {
        self.components.get(uid).cloned()
    }

    fn resolve_api_name(&self, name: &str) -> Option<Arc<ContentSchema>> {
        self.content_types
            .values()
            .find(|schema| schema.answers_to_api_name(name))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, SchemaKind};

    const DOC: &str = r#"{
        "contentTypes": [{
            "uid": "api::article.article",
            "kind": "collectionType",
            "info": {"singularName": "article", "pluralName": "articles"},
            "pluginOptions": {"paperTrail": {"enabled": true}, "i18n": {"localized": false}},
            "attributes": {
                "title": {"type": "string", "required": true},
                "seo": {"type": "component", "component": "shared.seo", "repeatable": false}
            }
        }],
        "components": [{
            "uid": "shared.seo",
            "attributes": {"metaTitle": {"type": "string"}}
        }]
    }"#;

    #[test]
    fn test_from_json() {
        let registry = InMemorySchemaRegistry::from_json(DOC).unwrap();
        assert_eq!(registry.content_type_count(), 1);
        assert_eq!(registry.component_count(), 1);

        let article = registry.resolve("api::article.article").unwrap();
        assert_eq!(article.kind, Some(SchemaKind::CollectionType));
        assert!(article.audit_enabled());
        assert!(article.plugin_options.other.contains_key("i18n"));
        assert_eq!(
            article.attribute("seo"),
            Some(&Attribute::component("shared.seo", false))
        );
    }

    #[test]
    fn test_resolve_from_path_by_family() {
        let registry = InMemorySchemaRegistry::from_json(DOC).unwrap();

        let admin = PathParams {
            content_type: "api::article.article".to_string(),
            record_id: None,
        };
        let api = PathParams {
            content_type: "articles".to_string(),
            record_id: None,
        };

        assert!(registry.resolve_from_path(&admin, true).is_some());
        assert!(registry.resolve_from_path(&admin, false).is_none());
        assert!(registry.resolve_from_path(&api, false).is_some());
        assert!(registry.resolve_from_path(&api, true).is_none());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = InMemorySchemaRegistry::from_json("{not json").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidSchema);
    }
}
