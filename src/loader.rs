//! Descriptor Loading
//!
//! Reads host schema descriptors from a project tree or a single JSON dump.
//! This is a collaborator of the compiler: `compile` itself never touches the
//! filesystem.
//!
//! Layouts:
//! - `<application_dir>/<api>/content-types/<name>/schema.json`
//! - `<components_dir>/<category>/<name>.json`
//! - dump: `{ "contentTypes": { uid: descriptor }, "components": { uid: descriptor } }`

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::SourcesConfig;
use crate::registry::SchemaSources;

/// Load descriptors from the configured sources
pub fn load_from_project(config: &SourcesConfig) -> anyhow::Result<SchemaSources> {
    let sources = match &config.dump {
        Some(dump) => load_dump(dump)?,
        None => SchemaSources::new(
            load_application_dir(&config.application_dir)?,
            load_components_dir(&config.components_dir)?,
        ),
    };

    info!(
        application = sources.application.len(),
        components = sources.components.len(),
        "Loaded schema descriptors"
    );
    Ok(sources)
}

/// Load a dump exported from the running host
pub fn load_dump(path: &Path) -> anyhow::Result<SchemaSources> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema dump {}", path.display()))?;
    let json: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))?;

    Ok(SchemaSources::new(
        dump_section(&json, "contentTypes"),
        dump_section(&json, "components"),
    ))
}

fn dump_section(json: &Value, key: &str) -> Vec<Value> {
    let Some(entries) = json.get(key).and_then(Value::as_object) else {
        warn!(section = key, "Schema dump has no such section");
        return Vec::new();
    };
    entries
        .iter()
        .map(|(uid, descriptor)| with_uid(descriptor.clone(), uid))
        .collect()
}

/// Walk `<api>/content-types/<name>/schema.json`
pub fn load_application_dir(root: &Path) -> anyhow::Result<Vec<Value>> {
    if !root.exists() {
        warn!(path = %root.display(), "Application directory does not exist");
        return Ok(Vec::new());
    }

    let mut descriptors = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() || path.file_name().map(|n| n != "schema.json").unwrap_or(true) {
            continue;
        }

        let relative = path.strip_prefix(root)?;
        let segments: Vec<&str> = relative
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect();
        let [api, "content-types", name, "schema.json"] = segments.as_slice() else {
            debug!(path = %path.display(), "Skipping schema file outside content-types");
            continue;
        };

        if let Some(descriptor) = read_descriptor(path) {
            descriptors.push(with_uid(descriptor, &format!("api::{}.{}", api, name)));
        }
    }
    Ok(descriptors)
}

/// Walk `<category>/<name>.json`
pub fn load_components_dir(root: &Path) -> anyhow::Result<Vec<Value>> {
    if !root.exists() {
        warn!(path = %root.display(), "Components directory does not exist");
        return Ok(Vec::new());
    }

    let mut descriptors = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || path.extension().map(|e| e != "json").unwrap_or(true) {
            continue;
        }

        let category = path
            .parent()
            .and_then(Path::file_name)
            .and_then(|s| s.to_str());
        let name = path.file_stem().and_then(|s| s.to_str());
        let (Some(category), Some(name)) = (category, name) else {
            continue;
        };

        if let Some(descriptor) = read_descriptor(path) {
            descriptors.push(with_uid(descriptor, &format!("{}.{}", category, name)));
        }
    }
    Ok(descriptors)
}

/// Read and parse one file; failures are logged and skipped
fn read_descriptor(path: &Path) -> Option<Value> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Failed to read schema file");
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(json) => Some(json),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Failed to parse schema file");
            None
        }
    }
}

/// Fill in the uid the host would assign when the file does not carry one
fn with_uid(mut descriptor: Value, uid: &str) -> Value {
    if let Value::Object(map) = &mut descriptor {
        map.entry("uid").or_insert_with(|| Value::String(uid.to_string()));
    }
    descriptor
}
