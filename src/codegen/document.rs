//! Document Assembly
//!
//! Concatenates the rendered records into one declaration file. Section order
//! is fixed: header, enums, record bodies, the name registry, the uid enum,
//! strategy helpers, then the request/response envelopes. Records appear in
//! registry order within every section.

use std::collections::HashMap;
use std::fmt::Write;

use tracing::warn;

use crate::error::Result;

use super::enums::escape_string;
use super::mapper::MappedSchema;
use super::names::SchemaRecord;
use super::strategy::MappingStrategy;

/// First lines of every generated document
pub const DOCUMENT_HEADER: &str = "/*
 * Generated by schema-typegen. Do not edit by hand.
 */
";

const CONTENT_TYPE_UIDS: &str = "ContentTypeUids";

const ENVELOPE_TYPES: &str = "export interface APIResponseMany<T extends keyof ContentTypes> {
  data: ContentType<T>[];
  meta: {
    pagination: {
      page: number;
      pageSize: number;
      pageCount: number;
      total: number;
    };
  };
}

export interface APIResponseSingle<T extends keyof ContentTypes> {
  data: ContentType<T>;
}

export interface APIRequestParams<T extends keyof ContentTypes> {
  populate?: any;
  fields?: (keyof ContentType<T>)[];
  locale?: string | string[];
  filters?: any;
  sort?: `${string & keyof ContentType<T>}:asc` | `${string & keyof ContentType<T>}:desc` | (`${string & keyof ContentType<T>}:asc` | `${string & keyof ContentType<T>}:desc`)[];
  pagination?: {
    page?: number;
    pageSize?: number;
  };
}
";

/// A record after mapping and interface assembly
#[derive(Debug, Clone)]
pub struct RenderedSchema {
    pub record: SchemaRecord,
    pub mapped: MappedSchema,
    pub body: String,
}

pub struct DocumentAssembler<'a> {
    strategy: &'a dyn MappingStrategy,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(strategy: &'a dyn MappingStrategy) -> Self {
        Self { strategy }
    }

    /// Build the complete document
    pub fn assemble(&self, schemas: &[RenderedSchema]) -> Result<String> {
        let mut out = String::new();
        out.push_str(DOCUMENT_HEADER);
        out.push('\n');

        self.write_enums(&mut out, schemas)?;

        for schema in schemas {
            out.push_str(&schema.body);
            out.push('\n');
        }

        self.write_registry(&mut out, schemas)?;
        self.write_uids(&mut out, schemas)?;

        if let Some(helpers) = self.strategy.helper_declarations() {
            out.push_str(helpers);
            out.push('\n');
        }
        out.push_str(ENVELOPE_TYPES);

        Ok(out)
    }

    fn write_enums(&self, out: &mut String, schemas: &[RenderedSchema]) -> Result<()> {
        let mut emitted: HashMap<&str, &str> = HashMap::new();

        for schema in schemas {
            for declaration in &schema.mapped.enums {
                match emitted.get(declaration.name.as_str()) {
                    Some(text) if *text == declaration.text => continue,
                    Some(_) => warn!(
                        enum_name = %declaration.name,
                        schema = %schema.record.canonical_name,
                        "Conflicting enum declarations share a name"
                    ),
                    None => {
                        emitted.insert(&declaration.name, &declaration.text);
                    }
                }
                write!(out, "{}\n\n", declaration.text)?;
            }
        }
        Ok(())
    }

    fn write_registry(&self, out: &mut String, schemas: &[RenderedSchema]) -> Result<()> {
        writeln!(out, "export interface ContentTypes {{")?;
        for schema in schemas {
            let name = &schema.record.canonical_name;
            writeln!(out, "  {}: {};", name, name)?;
        }
        writeln!(out, "}}")?;
        writeln!(
            out,
            "export type ContentType<T extends keyof ContentTypes> = ContentTypes[T];\n"
        )?;
        Ok(())
    }

    fn write_uids(&self, out: &mut String, schemas: &[RenderedSchema]) -> Result<()> {
        let with_uid: Vec<(&str, &str)> = schemas
            .iter()
            .filter_map(|s| s.record.uid().map(|uid| (s.record.canonical_name.as_str(), uid)))
            .collect();
        if with_uid.is_empty() {
            return Ok(());
        }

        writeln!(out, "export enum {} {{", CONTENT_TYPE_UIDS)?;
        for (name, uid) in with_uid {
            writeln!(out, "  {} = '{}',", name, escape_string(uid))?;
        }
        writeln!(out, "}}\n")?;
        Ok(())
    }
}
