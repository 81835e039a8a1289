//! Schema Registry
//!
//! Collects descriptors from the three origins, applies the ignore filter and
//! injects the built-in schemas. The output order is fixed: application
//! schemas, then components, then built-ins, each group sorted by uid.

use std::collections::HashSet;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{GeneratorConfig, IgnorePattern};
use crate::schema::{SchemaBody, SchemaDescriptor, SchemaSource};

/// Identifiers in this namespace belong to the host's admin panel
const ADMIN_NAMESPACE: &str = "admin::";

// =============================================================================
// Inputs
// =============================================================================

/// Raw descriptors per origin, as handed over by the host
#[derive(Debug, Clone, Default)]
pub struct SchemaSources {
    pub application: Vec<Value>,
    pub components: Vec<Value>,
}

impl SchemaSources {
    pub fn new(application: Vec<Value>, components: Vec<Value>) -> Self {
        Self {
            application,
            components,
        }
    }
}

// =============================================================================
// Built-in Schemas
// =============================================================================

/// A shared type that is always part of the document
#[derive(Debug)]
pub struct BuiltinSchema {
    /// Host uid this built-in stands in for
    pub uid: Option<&'static str>,
    pub name: &'static str,
    pub text: &'static str,
    pub dependencies: &'static [&'static str],
}

pub const BUILTIN_SCHEMAS: &[BuiltinSchema] = &[
    BuiltinSchema {
        uid: Some("plugin::upload.file"),
        name: "Media",
        text: MEDIA_INTERFACE,
        dependencies: &["MediaFormat"],
    },
    BuiltinSchema {
        uid: None,
        name: "MediaFormat",
        text: MEDIA_FORMAT_INTERFACE,
        dependencies: &[],
    },
];

const MEDIA_INTERFACE: &str = "export interface Media {
  id: number;
  name: string;
  alternativeText: string;
  caption: string;
  width: number;
  height: number;
  formats: { thumbnail: MediaFormat; small: MediaFormat; medium: MediaFormat; large: MediaFormat; };
  hash: string;
  ext: string;
  mime: string;
  size: number;
  url: string;
  previewUrl: string;
  provider: string;
  createdAt: Date;
  updatedAt: Date;
}
";

const MEDIA_FORMAT_INTERFACE: &str = "export interface MediaFormat {
  name: string;
  hash: string;
  ext: string;
  mime: string;
  width: number;
  height: number;
  size: number;
  path: string;
  url: string;
}
";

impl BuiltinSchema {
    fn descriptor(&self) -> SchemaDescriptor {
        SchemaDescriptor {
            uid: self.uid.map(str::to_string),
            singular_name: None,
            display_name: self.name.to_string(),
            body: SchemaBody::Preset {
                text: self.text,
                dependencies: self.dependencies,
            },
        }
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Compiled ignore list
#[derive(Debug, Default)]
pub struct SchemaFilter {
    literals: HashSet<String>,
    regexes: Vec<Regex>,
}

impl SchemaFilter {
    /// Compile ignore patterns. Malformed regular expressions never match.
    pub fn new(patterns: &[IgnorePattern]) -> Self {
        let mut filter = Self::default();
        for pattern in patterns {
            match pattern {
                IgnorePattern::Literal(literal) => {
                    filter.literals.insert(literal.clone());
                }
                IgnorePattern::Regex { regex } => match Regex::new(regex) {
                    Ok(compiled) => filter.regexes.push(compiled),
                    Err(e) => warn!(pattern = %regex, error = %e, "Ignoring malformed ignore pattern"),
                },
            }
        }
        filter
    }

    /// Whether a schema identifier is excluded from compilation
    pub fn is_ignored(&self, uid: &str) -> bool {
        uid.starts_with(ADMIN_NAMESPACE)
            || self.literals.contains(uid)
            || self.regexes.iter().any(|re| re.is_match(uid))
    }
}

// =============================================================================
// Registry
// =============================================================================

/// A schema that survived filtering, before naming
#[derive(Debug, Clone)]
pub struct SchemaDraft {
    pub source: SchemaSource,
    pub descriptor: SchemaDescriptor,
}

/// Counters for what happened to host descriptors
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    pub accepted: usize,
    pub ignored: usize,
    pub invalid: usize,
    pub superseded: usize,
}

/// The ordered set of schemas to compile
#[derive(Debug)]
pub struct SchemaRegistry {
    drafts: Vec<SchemaDraft>,
    stats: RegistryStats,
}

impl SchemaRegistry {
    /// Parse, filter and order all descriptors, then append the built-ins
    pub fn collect(sources: &SchemaSources, config: &GeneratorConfig) -> Self {
        let filter = SchemaFilter::new(&config.ignore);
        let mut stats = RegistryStats::default();
        let mut drafts = Vec::new();

        for (source, values) in [
            (SchemaSource::Application, &sources.application),
            (SchemaSource::Component, &sources.components),
        ] {
            let mut group = Vec::with_capacity(values.len());
            for value in values {
                let descriptor = match SchemaDescriptor::from_json(value) {
                    Ok(d) => d,
                    Err(e) => {
                        warn!(error = %e, "Skipping schema descriptor");
                        stats.invalid += 1;
                        continue;
                    }
                };
                let uid = descriptor.uid.as_deref().unwrap_or_default();

                if filter.is_ignored(uid) {
                    debug!(uid, "Skipping ignored schema");
                    stats.ignored += 1;
                    continue;
                }
                if BUILTIN_SCHEMAS.iter().any(|b| b.uid == Some(uid)) {
                    debug!(uid, "Schema superseded by built-in type");
                    stats.superseded += 1;
                    continue;
                }

                stats.accepted += 1;
                group.push(SchemaDraft { source, descriptor });
            }
            group.sort_by(|a, b| a.descriptor.uid.cmp(&b.descriptor.uid));
            drafts.extend(group);
        }

        drafts.extend(BUILTIN_SCHEMAS.iter().map(|builtin| SchemaDraft {
            source: SchemaSource::Common,
            descriptor: builtin.descriptor(),
        }));

        info!(
            accepted = stats.accepted,
            ignored = stats.ignored,
            invalid = stats.invalid,
            superseded = stats.superseded,
            "Collected schemas"
        );

        Self { drafts, stats }
    }

    pub fn drafts(&self) -> &[SchemaDraft] {
        &self.drafts
    }

    pub fn into_drafts(self) -> Vec<SchemaDraft> {
        self.drafts
    }

    pub fn stats(&self) -> &RegistryStats {
        &self.stats
    }

    /// Number of schemas that came from the host (not built-in)
    pub fn host_schema_count(&self) -> usize {
        self.drafts
            .iter()
            .filter(|d| d.source != SchemaSource::Common)
            .count()
    }
}
