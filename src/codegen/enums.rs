//! Enum Synthesis
//!
//! Enumeration attributes become string enums. Member keys are derived from
//! the literal values and always form valid identifiers
//! (`^[A-Za-z_][A-Za-z0-9_]*$`).

use std::collections::HashSet;
use std::fmt::Write;

use tracing::warn;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::names::pascal_case;

/// Appended to enum names that need disambiguation
pub const ENUM_SUFFIX: &str = "Enum";

/// Name of the enum synthesized for an attribute.
///
/// The `Enum` suffix is added when forced by config or when the name would
/// equal the owning schema's name (case-insensitive).
pub fn enum_name(attribute: &str, schema_name: &str, always_suffix: bool) -> String {
    let mut name = capitalize(&pascal_case(attribute));
    if always_suffix || name.to_lowercase() == schema_name.to_lowercase() {
        name.push_str(ENUM_SUFFIX);
    }
    name
}

/// Alternative name for an enum whose name is already taken by a different
/// declaration: `Enum` first, then a counter (`StatusEnum`, `StatusEnum2`, ...).
pub fn disambiguated_enum_name(name: &str, attempt: usize) -> String {
    let (suffixed, already_suffixed) = match name.strip_suffix(ENUM_SUFFIX) {
        Some(_) => (name.to_string(), true),
        None => (format!("{}{}", name, ENUM_SUFFIX), false),
    };
    let counter = if already_suffixed { attempt + 1 } else { attempt };
    if counter <= 1 {
        suffixed
    } else {
        format!("{}{}", suffixed, counter)
    }
}

/// Member key for an enum value.
///
/// Decomposes and strips diacritics, PascalCases, drops everything that is not
/// an ASCII letter or digit, and prefixes `_` when the key starts with a digit.
/// A value with nothing left becomes `_<index>`.
pub fn enum_member_key(value: &str, index: usize) -> String {
    let stripped: String = value.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let mut key: String = pascal_case(&stripped)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();

    if key.is_empty() {
        return format!("_{}", index);
    }
    if key.starts_with(|c: char| c.is_ascii_digit()) {
        key.insert(0, '_');
    }
    key
}

/// A rendered enum; equality is by full text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDeclaration {
    pub name: String,
    pub text: String,
}

/// Render a string enum declaration
pub fn render_enum(name: &str, values: &[String]) -> Result<EnumDeclaration, std::fmt::Error> {
    let mut text = String::new();
    let mut keys = HashSet::new();

    writeln!(text, "export enum {} {{", name)?;
    for (index, value) in values.iter().enumerate() {
        let key = enum_member_key(value, index);
        if !keys.insert(key.clone()) {
            warn!(enum_name = name, key = %key, "Enum values collapse to the same member key");
        }
        writeln!(text, "  {} = '{}',", key, escape_string(value))?;
    }
    text.push('}');

    Ok(EnumDeclaration {
        name: name.to_string(),
        text,
    })
}

/// Escape a value for a single-quoted string literal
pub fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}
