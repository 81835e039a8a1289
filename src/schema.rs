//! Schema descriptor types and parsing
//!
//! Host descriptors arrive as JSON in the CMS's own shape. Parsing is strict at
//! the descriptor level (a missing `uid`, `info` or `attributes` rejects the
//! whole descriptor) and lenient at the attribute level (anything that cannot
//! be understood becomes [`AttributeKind::Unknown`]).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, TypegenError};

/// Where a schema came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaSource {
    /// Content types defined by the application
    Application,
    /// Reusable components embedded in other schemas
    Component,
    /// Built-in shared types (media)
    Common,
}

/// A schema definition as handed over by the host
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    /// Host-assigned unique identifier (e.g. `api::article.article`, `shared.seo`)
    pub uid: Option<String>,
    /// Singular name (content types only)
    pub singular_name: Option<String>,
    /// Human-readable name
    pub display_name: String,
    pub body: SchemaBody,
}

/// What a declaration is built from
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaBody {
    /// Attributes in declaration order
    Attributes {
        attributes: Vec<(String, AttributeDescriptor)>,
        localized: bool,
    },
    /// Fixed declaration text (built-in schemas)
    Preset {
        text: &'static str,
        dependencies: &'static [&'static str],
    },
}

impl SchemaDescriptor {
    /// Parse a host descriptor
    pub fn from_json(value: &Value) -> Result<Self> {
        let raw: RawDescriptor =
            serde_json::from_value(value.clone()).map_err(|e| TypegenError::InvalidDescriptor {
                uid: value
                    .get("uid")
                    .and_then(Value::as_str)
                    .unwrap_or("<unknown>")
                    .to_string(),
                reason: e.to_string(),
            })?;

        let display_name = raw
            .info
            .display_name
            .or_else(|| raw.info.singular_name.clone())
            .ok_or_else(|| TypegenError::InvalidDescriptor {
                uid: raw.uid.clone(),
                reason: "info has neither displayName nor singularName".to_string(),
            })?;

        let attributes = raw
            .attributes
            .iter()
            .map(|(name, attr)| (name.clone(), AttributeDescriptor::from_json(attr)))
            .collect();

        let localized = raw
            .plugin_options
            .as_ref()
            .and_then(|opts| opts.pointer("/i18n/localized"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(Self {
            uid: Some(raw.uid),
            singular_name: raw.info.singular_name,
            display_name,
            body: SchemaBody::Attributes {
                attributes,
                localized,
            },
        })
    }

    /// Name the canonical type name is derived from
    pub fn name(&self) -> &str {
        self.singular_name.as_deref().unwrap_or(&self.display_name)
    }

    pub fn attributes(&self) -> &[(String, AttributeDescriptor)] {
        match &self.body {
            SchemaBody::Attributes { attributes, .. } => attributes,
            SchemaBody::Preset { .. } => &[],
        }
    }

    pub fn is_localized(&self) -> bool {
        matches!(self.body, SchemaBody::Attributes { localized: true, .. })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDescriptor {
    uid: String,
    info: RawInfo,
    attributes: Map<String, Value>,
    #[serde(default)]
    plugin_options: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInfo {
    #[serde(default)]
    singular_name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

/// One attribute of a schema
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDescriptor {
    pub kind: AttributeKind,
    pub required: bool,
    pub has_default: bool,
}

/// Attribute kinds understood by the mapper
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeKind {
    Relation { target: String, cardinality: Cardinality },
    Component { target: String, repeatable: bool },
    DynamicZone { components: Vec<String> },
    Media { multiple: bool },
    Enumeration { values: Vec<String> },
    TextLike,
    Json,
    Password,
    Numeric,
    Temporal,
    Boolean,
    /// Anything else, kept by its host type name
    Unknown { type_name: String },
}

/// Relation cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
    MorphToOne,
    MorphToMany,
    MorphOne,
    MorphMany,
}

impl Cardinality {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "oneToOne" => Self::OneToOne,
            "oneToMany" => Self::OneToMany,
            "manyToOne" => Self::ManyToOne,
            "manyToMany" => Self::ManyToMany,
            "morphToOne" => Self::MorphToOne,
            "morphToMany" => Self::MorphToMany,
            "morphOne" => Self::MorphOne,
            "morphMany" => Self::MorphMany,
            _ => return None,
        })
    }

    /// Relations whose host name ends in `Many`
    pub fn is_to_many(self) -> bool {
        matches!(
            self,
            Self::OneToMany | Self::ManyToMany | Self::MorphToMany | Self::MorphMany
        )
    }
}

impl AttributeDescriptor {
    pub fn new(kind: AttributeKind) -> Self {
        Self {
            kind,
            required: false,
            has_default: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// Parse an attribute. Never fails: unusable attributes become `Unknown`.
    pub fn from_json(value: &Value) -> Self {
        let type_name = value.get("type").and_then(Value::as_str).unwrap_or_default();
        let str_field = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        let bool_field = |key: &str| value.get(key).and_then(Value::as_bool).unwrap_or(false);

        let kind = match type_name {
            "relation" => match (
                str_field("target"),
                value.get("relation").and_then(Value::as_str).and_then(Cardinality::parse),
            ) {
                (Some(target), Some(cardinality)) => AttributeKind::Relation { target, cardinality },
                _ => AttributeKind::Unknown {
                    type_name: type_name.to_string(),
                },
            },
            "component" => match str_field("component") {
                Some(target) => AttributeKind::Component {
                    target,
                    repeatable: bool_field("repeatable"),
                },
                None => AttributeKind::Unknown {
                    type_name: type_name.to_string(),
                },
            },
            "dynamiczone" => AttributeKind::DynamicZone {
                components: value
                    .get("components")
                    .and_then(Value::as_array)
                    .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
                    .unwrap_or_default(),
            },
            "media" => AttributeKind::Media {
                multiple: bool_field("multiple"),
            },
            "enumeration" => AttributeKind::Enumeration {
                values: value
                    .get("enum")
                    .and_then(Value::as_array)
                    .map(|items| items.iter().filter_map(enum_value).collect())
                    .unwrap_or_default(),
            },
            "string" | "text" | "richtext" | "blocks" | "email" | "uid" => AttributeKind::TextLike,
            "json" => AttributeKind::Json,
            "password" => AttributeKind::Password,
            "integer" | "biginteger" | "decimal" | "float" => AttributeKind::Numeric,
            "date" | "datetime" | "time" | "timestamp" => AttributeKind::Temporal,
            "boolean" => AttributeKind::Boolean,
            other => AttributeKind::Unknown {
                type_name: other.to_string(),
            },
        };

        Self {
            kind,
            required: value.get("required").and_then(Value::as_bool).unwrap_or(false),
            has_default: value.get("default").is_some(),
        }
    }
}

fn enum_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
