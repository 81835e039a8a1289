//! Name Resolution Pass
//!
//! Assigns every schema its canonical PascalCase type name:
//! - Application and built-in schemas keep their base name
//! - Components are suffixed with `Component` when forced by config or when
//!   their base name collides with an application schema, a built-in, or an
//!   earlier component
//! - Suffixing then propagates: a suffixed component whose final name equals
//!   an unsuffixed component's name forces that component to be suffixed too,
//!   repeated until nothing changes
//!
//! Resolution is two-phase. `NameResolver::build` computes an overlay from the
//! immutable drafts; `NameResolver::freeze` applies it once and yields frozen
//! `SchemaRecord`s. Nothing downstream may rename a record.

use std::collections::{BTreeSet, HashSet};

use heck::ToUpperCamelCase;
use tracing::warn;

use crate::config::GeneratorConfig;
use crate::registry::SchemaDraft;
use crate::schema::{SchemaDescriptor, SchemaSource};

/// Appended to component names that need disambiguation
pub const COMPONENT_SUFFIX: &str = "Component";

// =============================================================================
// Schema Record
// =============================================================================

/// A schema with its final, frozen name
#[derive(Debug, Clone)]
pub struct SchemaRecord {
    pub source: SchemaSource,
    pub descriptor: SchemaDescriptor,
    /// Name before any suffix
    pub base_name: String,
    /// Unique type name in the generated document
    pub canonical_name: String,
    pub needs_suffix: bool,
}

impl SchemaRecord {
    pub fn uid(&self) -> Option<&str> {
        self.descriptor.uid.as_deref()
    }
}

/// Unicode-aware PascalCase
pub fn pascal_case(s: &str) -> String {
    s.to_upper_camel_case()
}

// =============================================================================
// Name Overlay
// =============================================================================

/// Naming decision for one draft, by position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameOverlay {
    pub base_name: String,
    pub needs_suffix: bool,
    /// A duplicate suffixing could not resolve
    pub dropped: bool,
}

impl NameOverlay {
    pub fn final_name(&self) -> String {
        if self.needs_suffix {
            format!("{}{}", self.base_name, COMPONENT_SUFFIX)
        } else {
            self.base_name.clone()
        }
    }
}

/// Statistics from name resolution
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NameResolverStats {
    pub suffixed: usize,
    pub propagated: usize,
    pub dropped: usize,
}

// =============================================================================
// Name Resolver
// =============================================================================

pub struct NameResolver {
    overlay: Vec<NameOverlay>,
    stats: NameResolverStats,
}

impl NameResolver {
    /// Compute the name overlay for the full, ordered draft set
    pub fn build(drafts: &[SchemaDraft], config: &GeneratorConfig) -> Self {
        let sources: Vec<SchemaSource> = drafts.iter().map(|d| d.source).collect();
        let mut overlay: Vec<NameOverlay> = drafts
            .iter()
            .map(|d| NameOverlay {
                base_name: pascal_case(d.descriptor.name()),
                needs_suffix: false,
                dropped: false,
            })
            .collect();
        let mut stats = NameResolverStats::default();

        // First pass: initial assignment
        let reserved: HashSet<String> = overlay
            .iter()
            .zip(&sources)
            .filter(|(_, source)| **source != SchemaSource::Component)
            .map(|(entry, _)| entry.base_name.clone())
            .collect();
        let mut component_names: HashSet<String> = HashSet::new();

        for (i, source) in sources.iter().enumerate() {
            if *source != SchemaSource::Component {
                continue;
            }
            let base = &overlay[i].base_name;
            let needs_suffix = config.always_add_component_suffix
                || reserved.contains(base)
                || component_names.contains(base);
            overlay[i].needs_suffix = needs_suffix;
            if needs_suffix {
                stats.suffixed += 1;
            }
            component_names.insert(overlay[i].final_name());
        }

        // Second pass: propagate suffixes until a fixed point
        loop {
            let suffixed_names: HashSet<String> = overlay
                .iter()
                .zip(&sources)
                .filter(|(entry, source)| **source == SchemaSource::Component && entry.needs_suffix)
                .map(|(entry, _)| entry.final_name())
                .collect();

            let mut changed = false;
            for (entry, source) in overlay.iter_mut().zip(&sources) {
                if *source == SchemaSource::Component
                    && !entry.needs_suffix
                    && suffixed_names.contains(&entry.base_name)
                {
                    entry.needs_suffix = true;
                    stats.propagated += 1;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        // Anything still duplicated cannot be fixed by suffixing
        let mut seen: HashSet<String> = HashSet::new();
        for (entry, draft) in overlay.iter_mut().zip(drafts) {
            let name = entry.final_name();
            if !seen.insert(name.clone()) {
                warn!(
                    name = %name,
                    uid = draft.descriptor.uid.as_deref().unwrap_or_default(),
                    "Type name collision; dropping schema"
                );
                entry.dropped = true;
                stats.dropped += 1;
            }
        }

        Self {
            overlay,
            stats,
        }
    }

    /// Apply the overlay, producing frozen records
    pub fn freeze(self, drafts: Vec<SchemaDraft>, verbose: bool) -> FrozenNames {
        let mut records = Vec::with_capacity(drafts.len());
        let mut dropped_uids = BTreeSet::new();

        for (draft, entry) in drafts.into_iter().zip(self.overlay) {
            if entry.dropped {
                dropped_uids.extend(draft.descriptor.uid);
                continue;
            }
            let canonical_name = entry.final_name();
            crate::codegen::decision!(
                verbose,
                uid = draft.descriptor.uid.as_deref().unwrap_or_default(),
                name = %canonical_name,
                suffixed = entry.needs_suffix,
                "Resolved schema name"
            );
            records.push(SchemaRecord {
                source: draft.source,
                descriptor: draft.descriptor,
                base_name: entry.base_name,
                canonical_name,
                needs_suffix: entry.needs_suffix,
            });
        }

        FrozenNames {
            records,
            dropped_uids,
            stats: self.stats,
        }
    }

    pub fn stats(&self) -> &NameResolverStats {
        &self.stats
    }
}

/// Outcome of name resolution
#[derive(Debug, Clone)]
pub struct FrozenNames {
    /// Surviving records, in registry order
    pub records: Vec<SchemaRecord>,
    /// Uids of records dropped as unresolvable duplicates
    pub dropped_uids: BTreeSet<String>,
    pub stats: NameResolverStats,
}

/// Build and freeze in one step
pub fn resolve_names(drafts: Vec<SchemaDraft>, config: &GeneratorConfig) -> FrozenNames {
    NameResolver::build(&drafts, config).freeze(drafts, config.verbose_logs)
}
