//! Interface Assembly
//!
//! Renders one declaration per record: synthetic fields first (identifier,
//! audit timestamps), then the mapped attributes in declaration order, then
//! the localization fields.

use std::fmt::Write;

use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::schema::{SchemaBody, SchemaSource};

use super::mapper::{MappedField, MappedSchema};
use super::names::SchemaRecord;
use super::strategy::MappingStrategy;

/// Suffix of the password-free view type
pub const RESTRICTED_SUFFIX: &str = "Restricted";

pub struct InterfaceAssembler<'a> {
    strategy: &'a dyn MappingStrategy,
    config: &'a GeneratorConfig,
}

impl<'a> InterfaceAssembler<'a> {
    pub fn new(strategy: &'a dyn MappingStrategy, config: &'a GeneratorConfig) -> Self {
        Self { strategy, config }
    }

    /// Render the full declaration text of a record
    pub fn render(&self, record: &SchemaRecord, mapped: &MappedSchema) -> Result<String> {
        if let SchemaBody::Preset { text, .. } = &record.descriptor.body {
            return Ok(text.to_string());
        }

        let mut text = String::new();
        writeln!(text, "{}", self.strategy.declaration_header(record))?;

        for field in self.synthetic_fields(record) {
            writeln!(text, "{}", field.render())?;
        }
        for field in &mapped.fields {
            writeln!(text, "{}", field.render())?;
        }
        if record.descriptor.is_localized() {
            writeln!(text, "{}", MappedField::new("locale", "string", false).render())?;
            writeln!(
                text,
                "{}",
                MappedField::new(
                    "localizations",
                    format!("{}[]", self.strategy.type_reference(record)),
                    true
                )
                .render()
            )?;
        }
        writeln!(text, "}}")?;

        if self.config.restricted_variants {
            let restricted: Vec<String> = mapped
                .fields
                .iter()
                .filter(|f| f.restricted)
                .map(|f| format!("'{}'", super::enums::escape_string(&f.name)))
                .collect();
            if !restricted.is_empty() {
                writeln!(
                    text,
                    "export type {}{}{} = Omit<{}, {}>;",
                    record.canonical_name,
                    RESTRICTED_SUFFIX,
                    self.strategy.type_parameters(record).unwrap_or_default(),
                    self.strategy.type_reference(record),
                    restricted.join(" | ")
                )?;
            }
        }

        Ok(text)
    }

    fn synthetic_fields(&self, record: &SchemaRecord) -> Vec<MappedField> {
        let mut fields = Vec::new();
        if record.source == SchemaSource::Application {
            fields.push(MappedField::new("id", "number", true));
        }
        if record.source != SchemaSource::Component {
            fields.extend(self.strategy.audit_fields());
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::strategy::{PlainStrategy, PublicationStateStrategy};
    use crate::schema::SchemaDescriptor;

    fn record(source: SchemaSource, name: &str, localized: bool) -> SchemaRecord {
        SchemaRecord {
            source,
            descriptor: SchemaDescriptor {
                uid: None,
                singular_name: None,
                display_name: name.to_string(),
                body: SchemaBody::Attributes {
                    attributes: Vec::new(),
                    localized,
                },
            },
            base_name: name.to_string(),
            canonical_name: name.to_string(),
            needs_suffix: false,
        }
    }

    fn mapped(fields: Vec<MappedField>) -> MappedSchema {
        MappedSchema {
            fields,
            ..MappedSchema::default()
        }
    }

    #[test]
    fn test_application_declaration() {
        let config = GeneratorConfig::default();
        let assembler = InterfaceAssembler::new(&PlainStrategy, &config);
        let text = assembler
            .render(
                &record(SchemaSource::Application, "Article", true),
                &mapped(vec![MappedField::new("title", "string", false)]),
            )
            .unwrap();

        assert_eq!(
            text,
            "export interface Article {
  id?: number;
  createdAt?: Date | null;
  updatedAt?: Date | null;
  publishedAt?: Date | null;
  title: string;
  locale: string;
  localizations?: Article[];
}
"
        );
    }

    #[test]
    fn test_component_declaration_has_no_synthetic_fields() {
        let config = GeneratorConfig::default();
        let assembler = InterfaceAssembler::new(&PlainStrategy, &config);
        let text = assembler
            .render(
                &record(SchemaSource::Component, "Seo", false),
                &mapped(vec![MappedField::new("metaTitle", "string", true)]),
            )
            .unwrap();

        assert_eq!(text, "export interface Seo {\n  metaTitle?: string;\n}\n");
    }

    #[test]
    fn test_restricted_variant() {
        let config = GeneratorConfig {
            restricted_variants: true,
            ..GeneratorConfig::default()
        };
        let assembler = InterfaceAssembler::new(&PlainStrategy, &config);
        let text = assembler
            .render(
                &record(SchemaSource::Component, "Account", false),
                &mapped(vec![
                    MappedField::new("email", "string", false),
                    MappedField {
                        restricted: true,
                        ..MappedField::new("password", "string", true)
                    },
                ]),
            )
            .unwrap();

        assert!(text.contains("  password?: string;\n"));
        assert!(text.ends_with("export type AccountRestricted = Omit<Account, 'password'>;\n"));
    }

    #[test]
    fn test_restricted_variant_keeps_type_parameter() {
        let config = GeneratorConfig {
            restricted_variants: true,
            ..GeneratorConfig::default()
        };
        let assembler = InterfaceAssembler::new(&PublicationStateStrategy, &config);
        let text = assembler
            .render(
                &record(SchemaSource::Application, "Author", false),
                &mapped(vec![MappedField {
                    restricted: true,
                    ..MappedField::new("password", "string", true)
                }]),
            )
            .unwrap();

        assert!(text.ends_with(
            "export type AuthorRestricted<P extends PublicationState = 'published'> = Omit<Author<P>, 'password'>;\n"
        ));
    }

    #[test]
    fn test_publication_state_localizations() {
        let config = GeneratorConfig::default();
        let assembler = InterfaceAssembler::new(&PublicationStateStrategy, &config);
        let text = assembler
            .render(&record(SchemaSource::Application, "Page", true), &MappedSchema::default())
            .unwrap();

        assert!(text.starts_with("export interface Page<P extends PublicationState = 'published'> {\n"));
        assert!(text.contains("  localizations?: Page<P>[];\n"));
    }
}
