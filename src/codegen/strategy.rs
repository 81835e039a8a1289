//! Mapping Strategies
//!
//! The parts of the rendering that differ between host API generations:
//! how a declaration is opened, how one schema refers to another, and which
//! audit fields every content type carries. Attribute mapping itself is
//! shared and lives in the mapper.

use crate::config::MappingStrategyKind;
use crate::schema::SchemaSource;

use super::mapper::MappedField;
use super::names::SchemaRecord;

/// Type used for temporal values in generated declarations
pub const DATE_TYPE: &str = "Date";

pub trait MappingStrategy {
    /// Opening line of a record's declaration
    fn declaration_header(&self, record: &SchemaRecord) -> String;

    /// How a field refers to another record's type
    fn type_reference(&self, target: &SchemaRecord) -> String;

    /// Creation, update and publication timestamps
    fn audit_fields(&self) -> Vec<MappedField>;

    /// Generic parameter list a record's declaration and aliases carry
    fn type_parameters(&self, _record: &SchemaRecord) -> Option<String> {
        None
    }

    /// Extra declarations appended to the helper section
    fn helper_declarations(&self) -> Option<&'static str> {
        None
    }
}

pub fn strategy_for(kind: MappingStrategyKind) -> Box<dyn MappingStrategy> {
    match kind {
        MappingStrategyKind::Plain => Box::new(PlainStrategy),
        MappingStrategyKind::PublicationState => Box::new(PublicationStateStrategy),
    }
}

fn nullable_date(name: &str) -> MappedField {
    MappedField::new(name, format!("{} | null", DATE_TYPE), true)
}

// =============================================================================
// Plain
// =============================================================================

/// Bare references, one declaration per schema
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainStrategy;

impl MappingStrategy for PlainStrategy {
    fn declaration_header(&self, record: &SchemaRecord) -> String {
        format!("export interface {} {{", record.canonical_name)
    }

    fn type_reference(&self, target: &SchemaRecord) -> String {
        target.canonical_name.clone()
    }

    fn audit_fields(&self) -> Vec<MappedField> {
        vec![
            nullable_date("createdAt"),
            nullable_date("updatedAt"),
            nullable_date("publishedAt"),
        ]
    }
}

// =============================================================================
// Publication State
// =============================================================================

/// Declarations generic over whether the draft or the published version is read
#[derive(Debug, Default, Clone, Copy)]
pub struct PublicationStateStrategy;

const PUBLICATION_PARAM: &str = "P";

const PUBLICATION_STATE_TYPE: &str = "export type PublicationState = 'draft' | 'published';\n";

impl PublicationStateStrategy {
    fn is_generic(record: &SchemaRecord) -> bool {
        record.source != SchemaSource::Common
    }
}

impl MappingStrategy for PublicationStateStrategy {
    fn declaration_header(&self, record: &SchemaRecord) -> String {
        format!(
            "export interface {}{} {{",
            record.canonical_name,
            self.type_parameters(record).unwrap_or_default()
        )
    }

    fn type_parameters(&self, record: &SchemaRecord) -> Option<String> {
        Self::is_generic(record)
            .then(|| format!("<{} extends PublicationState = 'published'>", PUBLICATION_PARAM))
    }

    fn type_reference(&self, target: &SchemaRecord) -> String {
        if Self::is_generic(target) {
            format!("{}<{}>", target.canonical_name, PUBLICATION_PARAM)
        } else {
            target.canonical_name.clone()
        }
    }

    fn audit_fields(&self) -> Vec<MappedField> {
        vec![
            nullable_date("createdAt"),
            nullable_date("updatedAt"),
            MappedField::new(
                "publishedAt",
                format!("{} extends 'published' ? {} : null", PUBLICATION_PARAM, DATE_TYPE),
                true,
            ),
        ]
    }

    fn helper_declarations(&self) -> Option<&'static str> {
        Some(PUBLICATION_STATE_TYPE)
    }
}
