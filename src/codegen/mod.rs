//! Code Generation
//!
//! Compiles schema descriptors into a single TypeScript declaration document.
//!
//! Architecture:
//! - SchemaRegistry: filters descriptors and injects built-ins (ordered drafts)
//! - NameResolver: freezes every record's canonical name
//! - AttributeTypeMapper: maps attributes against the frozen record set
//! - InterfaceAssembler: renders one declaration per record
//! - DocumentAssembler: concatenates everything in a fixed section order
//!
//! The key constraint: data flows strictly forward. The mapper only runs once
//! every name is final, and nothing after it renames or reorders a record.

/// Log a per-record decision: `info!` when verbose, `debug!` otherwise.
macro_rules! decision {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

pub(crate) use decision;

pub mod document;
pub mod enums;
pub mod interface;
pub mod mapper;
pub mod names;
pub mod strategy;

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::info;

use crate::checksum::Checksum;
use crate::config::GeneratorConfig;
use crate::error::{Result, TypegenError};
use crate::registry::{SchemaRegistry, SchemaSources};
use crate::schema::SchemaSource;

use document::{DocumentAssembler, RenderedSchema};
use interface::InterfaceAssembler;
use mapper::AttributeTypeMapper;
use names::resolve_names;
use strategy::strategy_for;

// =============================================================================
// Output
// =============================================================================

/// Per-record metadata handed to the file-writing collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaSummary {
    pub uid: Option<String>,
    pub canonical_name: String,
    pub needs_suffix: bool,
    pub source: SchemaSource,
    pub dependencies: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub document: String,
    /// In document order
    pub schemas: Vec<SchemaSummary>,
    /// Uids left out because their type name could not be made unique
    pub dropped: Vec<String>,
    pub fingerprint: Checksum,
}

impl CompileOutput {
    pub fn schema(&self, canonical_name: &str) -> Option<&SchemaSummary> {
        self.schemas.iter().find(|s| s.canonical_name == canonical_name)
    }
}

// =============================================================================
// Compile
// =============================================================================

/// Compile host descriptors into one declaration document.
///
/// Fails only when no application or component schema survives filtering,
/// or when the document cannot be written out. Bad descriptors and
/// unresolved references are logged and skipped.
pub fn compile(sources: &SchemaSources, config: &GeneratorConfig) -> Result<CompileOutput> {
    if config.verbose_logs {
        info!(config = ?config, "Effective generator configuration");
    }

    let registry = SchemaRegistry::collect(sources, config);
    if registry.host_schema_count() == 0 {
        return Err(TypegenError::NoSchemas);
    }

    let registry_stats = registry.stats().clone();
    let frozen = resolve_names(registry.into_drafts(), config);
    let records = frozen.records;
    let strategy = strategy_for(config.strategy);
    let mapper =
        AttributeTypeMapper::new(&records, strategy.as_ref(), config).excluding(&frozen.dropped_uids);
    let assembler = InterfaceAssembler::new(strategy.as_ref(), config);

    let mut rendered = Vec::with_capacity(records.len());
    for record in &records {
        let mapped = mapper.map_schema(record)?;
        let body = assembler.render(record, &mapped)?;
        decision!(
            config.verbose_logs,
            name = %record.canonical_name,
            fields = mapped.fields.len(),
            dependencies = mapped.dependencies.len(),
            enums = mapped.enums.len(),
            "Rendered schema"
        );
        rendered.push(RenderedSchema {
            record: record.clone(),
            mapped,
            body,
        });
    }

    let document = DocumentAssembler::new(strategy.as_ref()).assemble(&rendered)?;
    let fingerprint = Checksum::of_text(&document);

    let schemas: Vec<SchemaSummary> = rendered
        .into_iter()
        .map(|r| SchemaSummary {
            uid: r.record.descriptor.uid,
            canonical_name: r.record.canonical_name,
            needs_suffix: r.record.needs_suffix,
            source: r.record.source,
            dependencies: r.mapped.dependencies,
        })
        .collect();

    info!(
        schemas = schemas.len(),
        superseded = registry_stats.superseded,
        suffixed = frozen.stats.suffixed,
        propagated = frozen.stats.propagated,
        dropped = frozen.stats.dropped,
        bytes = document.len(),
        fingerprint = %fingerprint,
        "Generated declaration document"
    );

    Ok(CompileOutput {
        document,
        schemas,
        dropped: frozen.dropped_uids.into_iter().collect(),
        fingerprint,
    })
}
