//! Attribute Type Mapping
//!
//! Maps each attribute of a frozen `SchemaRecord` to a field of the generated
//! declaration, recording the records it depends on and the enums it needs.
//!
//! Key constraints:
//! - Runs only after name resolution; targets are looked up among frozen records
//! - Never fails on a single attribute: unresolved targets and unknown kinds
//!   fall back to the untyped escape hatch
//! - Attribute order is preserved

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::schema::{AttributeDescriptor, AttributeKind, SchemaBody, SchemaSource};

use super::enums::{disambiguated_enum_name, enum_name, render_enum, EnumDeclaration};
use super::names::{pascal_case, SchemaRecord, COMPONENT_SUFFIX};
use super::strategy::{MappingStrategy, DATE_TYPE};

/// Untyped escape hatch
pub const ESCAPE_HATCH: &str = "any";

const ID_TYPE: &str = "number";
const STRING_TYPE: &str = "string";
const NUMBER_TYPE: &str = "number";
const BOOLEAN_TYPE: &str = "boolean";

/// Host uid of the shared media type
const MEDIA_UID: &str = "plugin::upload.file";
const MEDIA_NAME: &str = "Media";

// =============================================================================
// Mapped Field
// =============================================================================

/// One field line of a declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedField {
    pub name: String,
    pub type_expr: String,
    /// Rendered with `?`
    pub optional: bool,
    /// Left out of restricted views
    pub restricted: bool,
}

impl MappedField {
    pub fn new(name: impl Into<String>, type_expr: impl Into<String>, optional: bool) -> Self {
        Self {
            name: name.into(),
            type_expr: type_expr.into(),
            optional,
            restricted: false,
        }
    }

    fn restricted(mut self) -> Self {
        self.restricted = true;
        self
    }

    /// Render as an indented property signature
    pub fn render(&self) -> String {
        format!(
            "  {}{}: {};",
            property_name(&self.name),
            if self.optional { "?" } else { "" },
            self.type_expr
        )
    }
}

/// Quote property names that are not identifiers
fn property_name(name: &str) -> String {
    let mut chars = name.chars();
    let is_identifier = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_' || first == '$')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        None => false,
    };
    if is_identifier {
        name.to_string()
    } else {
        format!("'{}'", super::enums::escape_string(name))
    }
}

/// Result of mapping one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedSchema {
    pub fields: Vec<MappedField>,
    /// Canonical names of referenced records
    pub dependencies: BTreeSet<String>,
    /// Enum declarations, deduplicated by text, first occurrence kept
    pub enums: Vec<EnumDeclaration>,
}

impl MappedSchema {
    /// Attach an enum and return the name fields should reference.
    ///
    /// A name already taken by a different declaration is disambiguated, so
    /// one record never carries two enums with the same name.
    fn add_enum(&mut self, name: &str, values: &[String]) -> std::result::Result<String, std::fmt::Error> {
        let mut declaration = render_enum(name, values)?;
        let mut attempt = 0;
        loop {
            let same_text = self
                .enums
                .iter()
                .find(|e| e.name == declaration.name)
                .map(|e| e.text == declaration.text);
            match same_text {
                None => {
                    let resolved = declaration.name.clone();
                    self.enums.push(declaration);
                    return Ok(resolved);
                }
                Some(true) => return Ok(declaration.name),
                Some(false) => {
                    attempt += 1;
                    debug!(
                        enum_name = name,
                        attempt,
                        "Enum name taken by a different declaration"
                    );
                    declaration = render_enum(&disambiguated_enum_name(name, attempt), values)?;
                }
            }
        }
    }
}

// =============================================================================
// Target Index
// =============================================================================

/// Read-only lookup over the frozen record set
pub struct TargetIndex<'a> {
    records: &'a [SchemaRecord],
    by_uid: HashMap<&'a str, usize>,
    by_name: HashMap<&'a str, usize>,
    /// Uids whose records were dropped during name resolution
    excluded: BTreeSet<String>,
}

impl<'a> TargetIndex<'a> {
    pub fn new(records: &'a [SchemaRecord]) -> Self {
        let mut by_uid = HashMap::with_capacity(records.len());
        let mut by_name = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if let Some(uid) = record.uid() {
                by_uid.insert(uid, i);
            }
            by_name.insert(record.canonical_name.as_str(), i);
        }
        Self {
            records,
            by_uid,
            by_name,
            excluded: BTreeSet::new(),
        }
    }

    /// Treat references to these uids as unresolvable
    pub fn excluding(mut self, uids: &BTreeSet<String>) -> Self {
        self.excluded.extend(uids.iter().cloned());
        self
    }

    /// Find the record a relation or component attribute points at.
    ///
    /// Tries the exact uid first, then the name derived from the uid's last
    /// segment, both unsuffixed and suffixed. A uid whose record was dropped
    /// never falls back to a namesake.
    pub fn resolve(&self, target: &str, accept: impl Fn(SchemaSource) -> bool) -> Option<&'a SchemaRecord> {
        if self.excluded.contains(target) {
            return None;
        }
        let records = self.records;
        if let Some(record) = self.by_uid.get(target).map(|&i| &records[i]) {
            if accept(record.source) {
                return Some(record);
            }
        }

        let segment = target.rsplit(['.', ':']).next().unwrap_or(target);
        let name = pascal_case(segment);

        let unsuffixed = self
            .by_name
            .get(name.as_str())
            .map(|&i| &records[i])
            .filter(|r| !r.needs_suffix);
        let suffixed = self
            .by_name
            .get(format!("{}{}", name, COMPONENT_SUFFIX).as_str())
            .map(|&i| &records[i])
            .filter(|r| r.needs_suffix);

        unsuffixed
            .into_iter()
            .chain(suffixed)
            .find(|r| accept(r.source))
    }

    /// The shared media type
    pub fn media(&self) -> Option<&'a SchemaRecord> {
        let records = self.records;
        self.by_uid
            .get(MEDIA_UID)
            .or_else(|| self.by_name.get(MEDIA_NAME))
            .map(|&i| &records[i])
    }
}

// =============================================================================
// Attribute Type Mapper
// =============================================================================

pub struct AttributeTypeMapper<'a> {
    index: TargetIndex<'a>,
    strategy: &'a dyn MappingStrategy,
    config: &'a GeneratorConfig,
}

impl<'a> AttributeTypeMapper<'a> {
    pub fn new(records: &'a [SchemaRecord], strategy: &'a dyn MappingStrategy, config: &'a GeneratorConfig) -> Self {
        Self {
            index: TargetIndex::new(records),
            strategy,
            config,
        }
    }

    /// Leave references to dropped records unresolved
    pub fn excluding(mut self, uids: &BTreeSet<String>) -> Self {
        self.index = self.index.excluding(uids);
        self
    }

    /// Map every attribute of a record, in declaration order
    pub fn map_schema(&self, record: &SchemaRecord) -> Result<MappedSchema> {
        let mut mapped = MappedSchema::default();

        if let SchemaBody::Preset { dependencies, .. } = &record.descriptor.body {
            mapped.dependencies = dependencies.iter().map(|d| d.to_string()).collect();
            return Ok(mapped);
        }

        for (name, attribute) in record.descriptor.attributes() {
            let field = self.map_attribute(record, name, attribute, &mut mapped)?;
            mapped.fields.push(field);
        }

        Ok(mapped)
    }

    /// Map one attribute, recording dependencies and enums on `mapped`
    pub fn map_attribute(
        &self,
        record: &SchemaRecord,
        name: &str,
        attribute: &AttributeDescriptor,
        mapped: &mut MappedSchema,
    ) -> Result<MappedField> {
        let optional = !attribute.required;

        let field = match &attribute.kind {
            AttributeKind::Relation { target, cardinality } => {
                let resolved = self.index.resolve(target, |s| s != SchemaSource::Component);
                match resolved {
                    Some(target_record) => {
                        self.depend_on(record, target_record, mapped);
                        let type_name = self.strategy.type_reference(target_record);
                        if cardinality.is_to_many() {
                            MappedField::new(name, format!("{}[] | {}[]", type_name, ID_TYPE), false)
                        } else {
                            MappedField::new(name, format!("{} | {} | null", type_name, ID_TYPE), optional)
                        }
                    }
                    None => self.unresolved(record, name, target, optional),
                }
            }

            AttributeKind::Component { target, repeatable } => {
                match self.index.resolve(target, |s| s == SchemaSource::Component) {
                    Some(target_record) => {
                        self.depend_on(record, target_record, mapped);
                        let type_name = self.strategy.type_reference(target_record);
                        if *repeatable {
                            MappedField::new(name, format!("{}[]", type_name), false)
                        } else {
                            MappedField::new(name, type_name, optional)
                        }
                    }
                    None => self.unresolved(record, name, target, optional),
                }
            }

            AttributeKind::DynamicZone { components } => {
                debug!(
                    schema = %record.canonical_name,
                    attribute = name,
                    variants = components.len(),
                    "Dynamic zone mapped to escape hatch"
                );
                MappedField::new(name, ESCAPE_HATCH, optional)
            }

            AttributeKind::Media { multiple } => match self.index.media() {
                Some(media) => {
                    self.depend_on(record, media, mapped);
                    let type_name = self.strategy.type_reference(media);
                    if *multiple {
                        MappedField::new(name, format!("{}[] | {}[]", type_name, ID_TYPE), false)
                    } else {
                        MappedField::new(name, format!("{} | {} | null", type_name, ID_TYPE), optional)
                    }
                }
                None => self.unresolved(record, name, MEDIA_UID, optional),
            },

            AttributeKind::Enumeration { values } => {
                let type_name = enum_name(name, &record.canonical_name, self.config.always_add_enum_suffix);
                let type_name = mapped.add_enum(&type_name, values)?;
                MappedField::new(name, type_name, optional)
            }

            AttributeKind::TextLike => MappedField::new(name, STRING_TYPE, optional),

            AttributeKind::Json => MappedField::new(name, ESCAPE_HATCH, optional),

            AttributeKind::Password => MappedField::new(name, STRING_TYPE, optional).restricted(),

            AttributeKind::Numeric => MappedField::new(name, nullable_scalar(NUMBER_TYPE, attribute), optional),

            AttributeKind::Temporal => MappedField::new(name, nullable_scalar(DATE_TYPE, attribute), optional),

            AttributeKind::Boolean => MappedField::new(name, BOOLEAN_TYPE, optional),

            AttributeKind::Unknown { type_name } => {
                debug!(
                    schema = %record.canonical_name,
                    attribute = name,
                    kind = %type_name,
                    "Unknown attribute kind mapped to escape hatch"
                );
                MappedField::new(name, ESCAPE_HATCH, optional)
            }
        };

        Ok(field)
    }

    fn depend_on(&self, record: &SchemaRecord, target: &SchemaRecord, mapped: &mut MappedSchema) {
        if target.canonical_name != record.canonical_name {
            mapped.dependencies.insert(target.canonical_name.clone());
        }
    }

    fn unresolved(&self, record: &SchemaRecord, name: &str, target: &str, optional: bool) -> MappedField {
        warn!(
            schema = %record.canonical_name,
            attribute = name,
            reference = target,
            "Unresolved reference; using escape hatch"
        );
        MappedField::new(name, ESCAPE_HATCH, optional)
    }
}

/// Numbers and dates are nullable unless they have a default or are required
fn nullable_scalar(type_name: &str, attribute: &AttributeDescriptor) -> String {
    if attribute.has_default || attribute.required {
        type_name.to_string()
    } else {
        format!("{} | null", type_name)
    }
}
