//! Schema Typegen
//!
//! Compiles the content-type and component schemas of a headless CMS into a
//! single TypeScript declaration file.
//!
//! ## Features
//!
//! - **Collision-free naming**: components that clash with content types are
//!   suffixed, and the suffix propagates until every type name is unique
//! - **Attribute mapping**: relations, components, media, enums and scalars map
//!   to precise TypeScript types with the right optionality
//! - **Deterministic output**: the same schemas always produce the same text,
//!   whatever order the host lists them in
//! - **Envelope helpers**: a name registry, a uid enum and typed API
//!   request/response shapes
//!
//! ## Pipeline
//!
//! ```text
//! SchemaSources ─▶ SchemaRegistry ─▶ NameResolver ─▶ AttributeTypeMapper
//!                                                          │
//!              CompileOutput ◀─ DocumentAssembler ◀─ InterfaceAssembler
//! ```
//!
//! The compiler performs no I/O. [`loader`] reads descriptors from a project
//! tree and the `schema-typegen` binary writes the result.

pub mod checksum;
pub mod codegen;
pub mod config;
pub mod error;
pub mod loader;
pub mod registry;
pub mod schema;

pub use checksum::Checksum;
pub use codegen::{compile, CompileOutput, SchemaSummary};
pub use config::{GeneratorConfig, IgnorePattern, MappingStrategyKind, TypegenConfig};
pub use error::{Result, TypegenError};
pub use registry::{SchemaRegistry, SchemaSources};
pub use schema::{SchemaDescriptor, SchemaSource};
