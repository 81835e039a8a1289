//! End-to-end compilation tests
//!
//! Drives `compile` with host-shaped descriptor dumps and checks the emitted
//! declaration document.

use serde_json::{json, Value};

use schema_typegen::config::IgnorePattern;
use schema_typegen::{compile, GeneratorConfig, MappingStrategyKind, SchemaSources, TypegenError};

fn load_fixture(text: &str) -> SchemaSources {
    let dump: Value = serde_json::from_str(text).unwrap();
    let section = |key: &str| -> Vec<Value> {
        dump[key]
            .as_object()
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default()
    };
    SchemaSources::new(section("contentTypes"), section("components"))
}

fn blog() -> SchemaSources {
    load_fixture(include_str!("fixtures/blog.json"))
}

fn generate(sources: &SchemaSources, config: &GeneratorConfig) -> String {
    compile(sources, config).unwrap().document
}

/// Byte offsets of every declaration starting with `prefix`
fn positions(document: &str, prefix: &str) -> Vec<usize> {
    document.match_indices(prefix).map(|(i, _)| i).collect()
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_compile_is_idempotent() {
    let sources = blog();
    let config = GeneratorConfig::default();

    let first = compile(&sources, &config).unwrap();
    let second = compile(&sources, &config).unwrap();

    assert_eq!(first.document, second.document);
    assert_eq!(first.fingerprint, second.fingerprint);
    assert_eq!(first.schemas, second.schemas);
}

#[test]
fn test_input_order_does_not_change_output() {
    let sources = blog();
    let config = GeneratorConfig::default();
    let expected = generate(&sources, &config);

    let mut application = sources.application.clone();
    let mut components = sources.components.clone();
    for rotation in 0..application.len() {
        application.rotate_left(1);
        components.reverse();
        let permuted = SchemaSources::new(application.clone(), components.clone());
        assert_eq!(generate(&permuted, &config), expected, "rotation {}", rotation);
    }
}

#[test]
fn test_enums_precede_interfaces_for_every_permutation() {
    let sources = blog();
    let config = GeneratorConfig::default();
    let application = sources.application.clone();

    let orders: [[usize; 3]; 6] = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
    for order in orders {
        let permuted = SchemaSources::new(
            order.iter().map(|&i| application[i].clone()).collect(),
            sources.components.clone(),
        );
        let document = generate(&permuted, &config);

        let first_interface = positions(&document, "export interface ")[0];
        let uid_enum = document.find("export enum ContentTypeUids").unwrap();
        for position in positions(&document, "export enum ") {
            assert!(
                position < first_interface || position == uid_enum,
                "enum at {} after interface at {} for order {:?}",
                position,
                first_interface,
                order
            );
        }
    }
}

// =============================================================================
// Naming
// =============================================================================

#[test]
fn test_component_collision_is_suffixed() {
    let output = compile(&blog(), &GeneratorConfig::default()).unwrap();
    let document = &output.document;

    assert_eq!(document.matches("export interface Article {").count(), 1);
    assert_eq!(document.matches("export interface ArticleComponent {").count(), 1);
    assert_eq!(document.matches("export interface Seo {").count(), 1);

    let component = output.schema("ArticleComponent").unwrap();
    assert!(component.needs_suffix);
    assert_eq!(component.uid.as_deref(), Some("blocks.article"));
    assert!(!output.schema("Article").unwrap().needs_suffix);
}

#[test]
fn test_always_suffix_flags() {
    let config = GeneratorConfig {
        always_add_component_suffix: true,
        always_add_enum_suffix: true,
        ..GeneratorConfig::default()
    };
    let document = generate(&blog(), &config);

    assert!(document.contains("export interface SeoComponent {"));
    assert!(document.contains("  seo: SeoComponent[];"));
    assert!(document.contains("export enum StatusEnum {"));
    assert!(document.contains("  status: StatusEnum;"));
    assert!(document.contains("export interface Media {"));
}

#[test]
fn test_names_are_unique() {
    let output = compile(&blog(), &GeneratorConfig::default()).unwrap();
    let mut names: Vec<_> = output.schemas.iter().map(|s| s.canonical_name.as_str()).collect();
    let total = names.len();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), total);
}

#[test]
fn test_reference_to_dropped_namesake_is_untyped() {
    let sources = SchemaSources::new(
        vec![
            json!({
                "uid": "plugin::shop.category",
                "info": { "singularName": "category", "displayName": "Category" },
                "attributes": { "sku": { "type": "string" } }
            }),
            json!({
                "uid": "api::product.product",
                "info": { "singularName": "product", "displayName": "Product" },
                "attributes": {
                    "category": { "type": "relation", "relation": "manyToOne", "target": "api::category.category" },
                    "shopCategory": { "type": "relation", "relation": "manyToOne", "target": "plugin::shop.category" }
                }
            }),
            json!({
                "uid": "api::category.category",
                "info": { "singularName": "category", "displayName": "Category" },
                "attributes": { "name": { "type": "string" } }
            }),
        ],
        vec![],
    );
    let output = compile(&sources, &GeneratorConfig::default()).unwrap();

    assert_eq!(output.dropped, vec!["plugin::shop.category".to_string()]);
    assert_eq!(
        output.schema("Category").unwrap().uid.as_deref(),
        Some("api::category.category")
    );
    assert!(output.document.contains("  category?: Category | number | null;"));
    assert!(output.document.contains("  shopCategory?: any;"));
    assert!(!output.document.contains("sku"));

    let product: Vec<_> = output
        .schema("Product")
        .unwrap()
        .dependencies
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(product, vec!["Category"]);
}

// =============================================================================
// Mapping
// =============================================================================

#[test]
fn test_article_declaration() {
    let document = generate(&blog(), &GeneratorConfig::default());

    let expected = "export interface Article {
  id?: number;
  createdAt?: Date | null;
  updatedAt?: Date | null;
  publishedAt?: Date | null;
  title: string;
  slug?: string;
  body?: string;
  status: Status;
  author?: Author | number | null;
  tags: Tag[] | number[];
  cover?: Media | number | null;
  gallery: Media[] | number[];
  hero?: ArticleComponent;
  seo: Seo[];
  blocks?: any;
  views?: number | null;
  rating?: number;
  publishOn?: Date | null;
  featured?: boolean;
  metadata?: any;
  locale: string;
  localizations?: Article[];
}
";
    assert!(document.contains(expected), "{}", document);
}

#[test]
fn test_relation_cardinality() {
    let document = generate(&blog(), &GeneratorConfig::default());

    assert!(document.contains("  author?: Author | number | null;"));
    assert!(document.contains("  tags: Tag[] | number[];"));
    assert!(document.contains("  articles: Article[] | number[];"));
}

#[test]
fn test_component_fields() {
    let document = generate(&blog(), &GeneratorConfig::default());

    assert!(document.contains("export interface Seo {\n  metaTitle: string;\n  metaDescription?: string;\n"));
    assert!(document.contains("  'og:image'?: Media | number | null;"));
    // Components carry no identifier or audit fields
    let seo = &document[document.find("export interface Seo {").unwrap()..];
    let seo = &seo[..seo.find("}\n").unwrap()];
    assert!(!seo.contains("id?: number"));
    assert!(!seo.contains("createdAt"));
}

#[test]
fn test_enum_synthesis() {
    let document = generate(&blog(), &GeneratorConfig::default());

    assert!(document.contains(
        "export enum Status {\n  Draft = 'draft',\n  InReview = 'in review',\n  _2ndPlace = '2nd-Place!',\n}"
    ));
    assert!(document.contains("export enum Style {\n  Wide = 'wide',\n  Narrow = 'narrow',\n}"));
    // Article and Tag declare the same enum; it is emitted once
    assert_eq!(document.matches("export enum Status {").count(), 1);
}

#[test]
fn test_dependencies() {
    let output = compile(&blog(), &GeneratorConfig::default()).unwrap();

    let article: Vec<_> = output
        .schema("Article")
        .unwrap()
        .dependencies
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(article, vec!["ArticleComponent", "Author", "Media", "Seo", "Tag"]);

    let author = &output.schema("Author").unwrap().dependencies;
    assert!(author.contains("Article"));
    assert!(!author.contains("Author"));
}

// =============================================================================
// Filtering and built-ins
// =============================================================================

#[test]
fn test_default_ignore_list_and_admin_namespace() {
    let output = compile(&blog(), &GeneratorConfig::default()).unwrap();
    let document = &output.document;

    for name in ["Locale", "Folder", "Release", "User", "File"] {
        assert!(output.schema(name).is_none(), "{} should be filtered", name);
        assert!(!document.contains(&format!("export interface {} ", name)));
    }
    assert!(!document.contains("plugin::i18n.locale"));
    assert!(!document.contains("admin::user"));
}

#[test]
fn test_builtins_are_always_present() {
    let output = compile(&blog(), &GeneratorConfig::default()).unwrap();

    let names: Vec<_> = output.schemas.iter().map(|s| s.canonical_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Article", "Author", "Tag", "ArticleComponent", "Seo", "Media", "MediaFormat"]
    );
    assert!(output.document.contains("  Media = 'plugin::upload.file',"));
    assert!(output.document.contains("export interface MediaFormat {"));
}

#[test]
fn test_custom_ignore_patterns() {
    let config = GeneratorConfig {
        ignore: vec![
            IgnorePattern::literal("api::tag.tag"),
            IgnorePattern::regex(r"^shared\."),
            IgnorePattern::regex("(unclosed"),
        ],
        ..GeneratorConfig::default()
    };
    let output = compile(&blog(), &config).unwrap();

    assert!(output.schema("Tag").is_none());
    assert!(output.schema("Seo").is_none());
    // Without the defaults, the i18n locale is kept
    assert!(output.schema("Locale").is_some());
    // References to filtered schemas fall back to the escape hatch
    assert!(output.document.contains("  tags: any;") || output.document.contains("  tags?: any;"));
}

#[test]
fn test_nothing_left_to_compile() {
    let sources = load_fixture(include_str!("fixtures/internal_only.json"));
    let result = compile(&sources, &GeneratorConfig::default());
    assert!(matches!(result, Err(TypegenError::NoSchemas)));
}

// =============================================================================
// Strategies and variants
// =============================================================================

#[test]
fn test_publication_state_strategy() {
    let config = GeneratorConfig {
        strategy: MappingStrategyKind::PublicationState,
        ..GeneratorConfig::default()
    };
    let document = generate(&blog(), &config);

    assert!(document.contains("export interface Article<P extends PublicationState = 'published'> {"));
    assert!(document.contains("  publishedAt?: P extends 'published' ? Date : null;"));
    assert!(document.contains("  author?: Author<P> | number | null;"));
    assert!(document.contains("  seo: Seo<P>[];"));
    assert!(document.contains("  cover?: Media | number | null;"));
    assert!(document.contains("  localizations?: Article<P>[];"));
    assert!(document.contains("export type PublicationState = 'draft' | 'published';"));
}

#[test]
fn test_restricted_variants() {
    let plain = generate(&blog(), &GeneratorConfig::default());
    assert!(!plain.contains("Restricted"));

    let config = GeneratorConfig {
        restricted_variants: true,
        ..GeneratorConfig::default()
    };
    let document = generate(&blog(), &config);

    assert!(document.contains("  password?: string;"));
    assert!(document.contains("}\nexport type AuthorRestricted = Omit<Author, 'password'>;\n"));
    assert_eq!(document.matches("Restricted = Omit<").count(), 1);
}

#[test]
fn test_restricted_variants_keep_publication_state() {
    let config = GeneratorConfig {
        restricted_variants: true,
        strategy: MappingStrategyKind::PublicationState,
        ..GeneratorConfig::default()
    };
    let document = generate(&blog(), &config);

    assert!(document.contains(
        "export type AuthorRestricted<P extends PublicationState = 'published'> = Omit<Author<P>, 'password'>;\n"
    ));
}

// =============================================================================
// Helper types
// =============================================================================

#[test]
fn test_helper_types() {
    let document = generate(&blog(), &GeneratorConfig::default());

    assert!(document.contains("export interface ContentTypes {\n  Article: Article;\n"));
    assert!(document.contains("export type ContentType<T extends keyof ContentTypes> = ContentTypes[T];"));
    assert!(document.contains("  ArticleComponent = 'blocks.article',"));
    assert!(document.contains("export interface APIResponseMany<T extends keyof ContentTypes> {"));
    assert!(document.contains("export interface APIResponseSingle<T extends keyof ContentTypes> {"));
    assert!(document.contains("export interface APIRequestParams<T extends keyof ContentTypes> {"));
    assert!(document.ends_with("}\n"));
}
