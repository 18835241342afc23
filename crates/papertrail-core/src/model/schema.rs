use crate::errors::PaperTrailError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a content type holds many records or exactly one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemaKind {
    CollectionType,
    SingleType,
}

impl SchemaKind {
    /// Path segment the content manager uses for this kind
    pub fn admin_segment(&self) -> &'static str {
        match self {
            SchemaKind::CollectionType => "collection-types",
            SchemaKind::SingleType => "single-types",
        }
    }
}

/// Naming metadata used to resolve public API paths
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singular_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Audit settings scoped under `pluginOptions.paperTrail`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperTrailOptions {
    #[serde(default)]
    pub enabled: bool,
}

/// Per-schema plugin configuration; options for other plugins are kept opaque
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginOptions {
    #[serde(
        rename = "paperTrail",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub paper_trail: Option<PaperTrailOptions>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// A content-type or component schema
///
/// Components carry no `kind`; they are only reachable through a component
/// or dynamic-zone attribute of another schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSchema {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SchemaKind>,
    #[serde(default)]
    pub info: SchemaInfo,
    #[serde(default)]
    pub attributes: BTreeMap<String, Attribute>,
    #[serde(default)]
    pub plugin_options: PluginOptions,
}

impl ContentSchema {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            kind: None,
            info: SchemaInfo::default(),
            attributes: BTreeMap::new(),
            plugin_options: PluginOptions::default(),
        }
    }

    pub fn with_kind(mut self, kind: SchemaKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set singular and plural API names
    pub fn with_api_names(mut self, singular: &str, plural: &str) -> Self {
        self.info.singular_name = Some(singular.to_string());
        self.info.plural_name = Some(plural.to_string());
        self
    }

    pub fn with_attribute(mut self, name: &str, attribute: Attribute) -> Self {
        self.attributes.insert(name.to_string(), attribute);
        self
    }

    pub fn with_audit(mut self, enabled: bool) -> Self {
        self.plugin_options.paper_trail = Some(PaperTrailOptions { enabled });
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// `pluginOptions.paperTrail.enabled`, false when unset
    pub fn audit_enabled(&self) -> bool {
        self.plugin_options
            .paper_trail
            .map(|opts| opts.enabled)
            .unwrap_or(false)
    }

    pub fn is_single_type(&self) -> bool {
        self.kind == Some(SchemaKind::SingleType)
    }

    /// True when `name` is this schema's singular or plural API name
    pub fn answers_to_api_name(&self, name: &str) -> bool {
        self.info.plural_name.as_deref() == Some(name)
            || self.info.singular_name.as_deref() == Some(name)
    }
}

/// Attribute declaration, dispatched by its `type` tag
///
/// Every type the diff engine does not treat specially is a scalar and is
/// compared by deep equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAttribute", into = "RawAttribute")]
pub enum Attribute {
    Scalar {
        type_name: String,
    },
    Media {
        multiple: bool,
    },
    Relation {
        relation: Option<String>,
        target: Option<String>,
    },
    Component {
        component: String,
        repeatable: bool,
    },
    DynamicZone {
        components: Vec<String>,
    },
}

impl Attribute {
    pub fn scalar(type_name: &str) -> Self {
        Attribute::Scalar {
            type_name: type_name.to_string(),
        }
    }

    pub fn media(multiple: bool) -> Self {
        Attribute::Media { multiple }
    }

    pub fn relation(relation: &str, target: &str) -> Self {
        Attribute::Relation {
            relation: Some(relation.to_string()),
            target: Some(target.to_string()),
        }
    }

    pub fn component(component: &str, repeatable: bool) -> Self {
        Attribute::Component {
            component: component.to_string(),
            repeatable,
        }
    }

    pub fn dynamic_zone(components: &[&str]) -> Self {
        Attribute::DynamicZone {
            components: components.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// The host's type tag
    pub fn type_name(&self) -> &str {
        match self {
            Attribute::Scalar { type_name } => type_name,
            Attribute::Media { .. } => "media",
            Attribute::Relation { .. } => "relation",
            Attribute::Component { .. } => "component",
            Attribute::DynamicZone { .. } => "dynamiczone",
        }
    }
}

/// Wire shape of an attribute as the host serializes it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAttribute {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    multiple: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    relation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    repeatable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    components: Option<Vec<String>>,
}

impl TryFrom<RawAttribute> for Attribute {
    type Error = PaperTrailError;

    fn try_from(raw: RawAttribute) -> Result<Self, Self::Error> {
        match raw.type_name.as_str() {
            "media" => Ok(Attribute::Media {
                multiple: raw.multiple.unwrap_or(false),
            }),
            "relation" => Ok(Attribute::Relation {
                relation: raw.relation,
                target: raw.target,
            }),
            "component" => {
                let component = raw.component.ok_or_else(|| PaperTrailError::InvalidAttribute {
                    attribute: raw.type_name.clone(),
                    reason: "component attribute without a `component` uid".to_string(),
                })?;
                Ok(Attribute::Component {
                    component,
                    repeatable: raw.repeatable.unwrap_or(false),
                })
            }
            "dynamiczone" => Ok(Attribute::DynamicZone {
                components: raw.components.unwrap_or_default(),
            }),
            "" => Err(PaperTrailError::InvalidAttribute {
                attribute: String::new(),
                reason: "empty type tag".to_string(),
            }),
            _ => Ok(Attribute::Scalar {
                type_name: raw.type_name,
            }),
        }
    }
}

impl From<Attribute> for RawAttribute {
    fn from(attr: Attribute) -> Self {
        match attr {
            Attribute::Scalar { type_name } => RawAttribute {
                type_name,
                ..Default::default()
            },
            Attribute::Media { multiple } => RawAttribute {
                type_name: "media".to_string(),
                multiple: Some(multiple),
                ..Default::default()
            },
            Attribute::Relation { relation, target } => RawAttribute {
                type_name: "relation".to_string(),
                relation,
                target,
                ..Default::default()
            },
            Attribute::Component {
                component,
                repeatable,
            } => RawAttribute {
                type_name: "component".to_string(),
                component: Some(component),
                repeatable: Some(repeatable),
                ..Default::default()
            },
            Attribute::DynamicZone { components } => RawAttribute {
                type_name: "dynamiczone".to_string(),
                components: Some(components),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_type_is_scalar() {
        let attr: Attribute = serde_json::from_value(json!({"type": "customField"})).unwrap();
        assert_eq!(attr, Attribute::scalar("customField"));
    }

    #[test]
    fn test_component_requires_uid() {
        let result: Result<Attribute, _> =
            serde_json::from_value(json!({"type": "component", "repeatable": true}));
        assert!(result.is_err());
    }

    #[test]
    fn test_audit_disabled_by_default() {
        let schema = ContentSchema::new("api::tag.tag");
        assert!(!schema.audit_enabled());
        assert!(schema.with_audit(true).audit_enabled());
    }
}
