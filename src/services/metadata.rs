//! Reading descriptors embedded in mod archives and deriving display values.
//!
//! Mod jars carry one of several loader descriptors:
//! - Fabric: `fabric.mod.json`
//! - Quilt: `quilt.mod.json`
//! - Forge 1.13+: `META-INF/mods.toml`
//! - NeoForge: `META-INF/neoforge.mods.toml`
//! - Legacy Forge: `mcmod.info` (a JSON array, or an object with `modList`)
//!
//! When no descriptor yields a value, names and versions fall back to the
//! record's stored values and finally to heuristics over the file name.

use camino::Utf8Path;
use regex::Regex;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use thiserror::Error;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::models::{DISABLED_SUFFIX, InternalModMetadata, ModLoader, ModRecord};

/// Placeholder Forge build tooling leaves in `mods.toml` for the jar version
const JAR_VERSION_PLACEHOLDER: &str = "${file.jarVersion}";

/// Errors that can occur while reading a mod archive
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a readable archive: {source}")]
    Archive {
        path: String,
        #[source]
        source: ZipError,
    },

    #[error("Malformed {descriptor} in {path}: {message}")]
    Descriptor {
        path: String,
        descriptor: &'static str,
        message: String,
    },
}

/// Reads archive descriptors and derives display names and versions.
///
/// Holds the pre-compiled file name patterns; cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct MetadataReader {
    /// Splits `name-1.2.3` style stems into a name and a version
    versioned_stem_pattern: Regex,

    disabled_suffix: String,
}

impl MetadataReader {
    pub fn new(disabled_suffix: impl Into<String>) -> Self {
        Self {
            versioned_stem_pattern: Regex::new(
                r"^(?P<name>.+?)[-_ +]v?(?P<version>\d+(?:\.\d+)*(?:[-+.][0-9A-Za-z.+-]*)?)$",
            )
            .expect("Invalid versioned stem regex"),
            disabled_suffix: disabled_suffix.into(),
        }
    }

    /// Open `path` as an archive and read every descriptor it carries.
    ///
    /// An archive without any known descriptor yields an empty list.
    pub fn scan_internal_metadata(&self, path: &Utf8Path) -> Result<Vec<InternalModMetadata>, MetadataError> {
        let file = File::open(path).map_err(|source| MetadataError::Io {
            path: path.to_string(),
            source,
        })?;

        read_descriptors(BufReader::new(file), path.as_str())
    }

    /// Display name for a row: descriptor name, then stored name, then file name.
    pub fn name_from_file(&self, record: &ModRecord, metadata: &[InternalModMetadata], path: &Utf8Path) -> String {
        if let Some(name) = metadata.iter().find_map(|m| non_empty(m.name.as_deref())) {
            return name.to_string();
        }

        if !record.name.is_empty() {
            return record.name.clone();
        }

        let stem = self.file_stem(path);
        let base = match self.versioned_stem_pattern.captures(&stem) {
            Some(caps) => caps["name"].to_string(),
            None => stem,
        };

        humanize(&base)
    }

    /// Version for a row: descriptor version, then stored version, then a
    /// version-looking suffix of the file name, else empty.
    pub fn version_from_file(&self, record: &ModRecord, metadata: &[InternalModMetadata], path: &Utf8Path) -> String {
        if let Some(version) = metadata.iter().find_map(|m| non_empty(m.version.as_deref())) {
            return version.to_string();
        }

        if !record.version.is_empty() {
            return record.version.clone();
        }

        let stem = self.file_stem(path);
        self.versioned_stem_pattern
            .captures(&stem)
            .map(|caps| caps["version"].to_string())
            .unwrap_or_default()
    }

    /// File name without the disabled suffix and without its extension
    fn file_stem(&self, path: &Utf8Path) -> String {
        let file_name = path.file_name().unwrap_or_default();
        let active_name = if self.disabled_suffix.is_empty() {
            file_name
        } else {
            file_name.strip_suffix(self.disabled_suffix.as_str()).unwrap_or(file_name)
        };

        Utf8Path::new(active_name)
            .file_stem()
            .unwrap_or(active_name)
            .to_string()
    }
}

impl Default for MetadataReader {
    fn default() -> Self {
        Self::new(DISABLED_SUFFIX)
    }
}

/// Read all known descriptors from an archive stream.
///
/// `label` identifies the source in error messages. A malformed descriptor is
/// logged and skipped; only archive-level failures are returned as errors.
pub fn read_descriptors<R: Read + Seek>(reader: R, label: &str) -> Result<Vec<InternalModMetadata>, MetadataError> {
    let mut archive = ZipArchive::new(reader).map_err(|source| MetadataError::Archive {
        path: label.to_string(),
        source,
    })?;

    let mut found = Vec::new();

    if let Some(content) = read_entry(&mut archive, "fabric.mod.json", label)? {
        match parse_json(&content, "fabric.mod.json", label) {
            Ok(json) => found.push(parse_fabric(&json)),
            Err(e) => skip_descriptor(&e),
        }
    }

    if let Some(content) = read_entry(&mut archive, "quilt.mod.json", label)? {
        match parse_json(&content, "quilt.mod.json", label) {
            Ok(json) => found.push(parse_quilt(&json)),
            Err(e) => skip_descriptor(&e),
        }
    }

    for (entry_name, loader) in [
        ("META-INF/mods.toml", ModLoader::Forge),
        ("META-INF/neoforge.mods.toml", ModLoader::NeoForge),
    ] {
        let Some(content) = read_entry(&mut archive, entry_name, label)? else {
            continue;
        };

        let mut parsed = match parse_mods_toml(&content, loader, entry_name, label) {
            Ok(parsed) => parsed,
            Err(e) => {
                skip_descriptor(&e);
                continue;
            }
        };

        if parsed
            .iter()
            .any(|m| m.version.as_deref() == Some(JAR_VERSION_PLACEHOLDER))
        {
            let jar_version = read_entry(&mut archive, "META-INF/MANIFEST.MF", label)?
                .and_then(|manifest| implementation_version(&manifest));
            for metadata in &mut parsed {
                if metadata.version.as_deref() == Some(JAR_VERSION_PLACEHOLDER) {
                    metadata.version = jar_version.clone();
                }
            }
        }
        found.extend(parsed);
    }

    if let Some(content) = read_entry(&mut archive, "mcmod.info", label)? {
        match parse_json(&content, "mcmod.info", label) {
            Ok(json) => found.extend(parse_mcmod_info(&json)),
            Err(e) => skip_descriptor(&e),
        }
    }

    tracing::trace!("Read {} descriptors from {}", found.len(), label);
    Ok(found)
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
    label: &str,
) -> Result<Option<String>, MetadataError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(source) => {
            return Err(MetadataError::Archive {
                path: label.to_string(),
                source,
            });
        }
    };

    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|source| MetadataError::Io {
            path: format!("{}!/{}", label, name),
            source,
        })?;

    Ok(Some(content))
}

fn skip_descriptor(error: &MetadataError) {
    tracing::warn!("Skipping descriptor: {}", error);
}

fn parse_json(content: &str, descriptor: &'static str, label: &str) -> Result<Value, MetadataError> {
    serde_json::from_str(content.trim_start_matches('\u{feff}')).map_err(|e| MetadataError::Descriptor {
        path: label.to_string(),
        descriptor,
        message: e.to_string(),
    })
}

fn parse_fabric(json: &Value) -> InternalModMetadata {
    let mut metadata = InternalModMetadata::new(ModLoader::Fabric);
    metadata.id = string_field(json, "id");
    metadata.name = string_field(json, "name");
    metadata.version = string_field(json, "version");
    metadata.description = string_field(json, "description");
    metadata.authors = people(json.get("authors"));
    metadata
}

fn parse_quilt(json: &Value) -> InternalModMetadata {
    let mut metadata = InternalModMetadata::new(ModLoader::Quilt);
    let Some(loader) = json.get("quilt_loader") else {
        return metadata;
    };

    metadata.id = string_field(loader, "id");
    metadata.version = string_field(loader, "version");

    if let Some(info) = loader.get("metadata") {
        metadata.name = string_field(info, "name");
        metadata.description = string_field(info, "description");
        if let Some(contributors) = info.get("contributors").and_then(Value::as_object) {
            metadata.authors = contributors.keys().cloned().collect();
        }
    }

    metadata
}

fn parse_mods_toml(
    content: &str,
    loader: ModLoader,
    descriptor: &'static str,
    label: &str,
) -> Result<Vec<InternalModMetadata>, MetadataError> {
    let value: toml::Value = content.parse().map_err(|e: toml::de::Error| MetadataError::Descriptor {
        path: label.to_string(),
        descriptor,
        message: e.to_string(),
    })?;

    let Some(mods) = value.get("mods").and_then(toml::Value::as_array) else {
        return Ok(Vec::new());
    };

    Ok(mods
        .iter()
        .map(|entry| {
            let field = |key: &str| entry.get(key).and_then(toml::Value::as_str).map(str::to_string);
            let mut metadata = InternalModMetadata::new(loader);
            metadata.id = field("modId");
            metadata.name = field("displayName");
            metadata.version = field("version");
            metadata.description = field("description").map(|d| d.trim().to_string());
            metadata.authors = field("authors")
                .map(|authors| split_authors(&authors))
                .unwrap_or_default();
            metadata
        })
        .collect())
}

fn parse_mcmod_info(json: &Value) -> Vec<InternalModMetadata> {
    let entries = json
        .as_array()
        .or_else(|| json.get("modList").and_then(Value::as_array));

    entries
        .map(|entries| {
            entries
                .iter()
                .map(|entry| {
                    let mut metadata = InternalModMetadata::new(ModLoader::LegacyForge);
                    metadata.id = string_field(entry, "modid");
                    metadata.name = string_field(entry, "name");
                    metadata.version = string_field(entry, "version");
                    metadata.description = string_field(entry, "description");
                    metadata.authors = people(entry.get("authorList").or_else(|| entry.get("authors")));
                    metadata
                })
                .collect()
        })
        .unwrap_or_default()
}

/// `Implementation-Version` from a jar manifest
fn implementation_version(manifest: &str) -> Option<String> {
    manifest.lines().find_map(|line| {
        line.strip_prefix("Implementation-Version:")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

fn string_field(json: &Value, key: &str) -> Option<String> {
    json.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Author lists are either plain strings or `{ "name": ... }` objects
fn people(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|people| {
            people
                .iter()
                .filter_map(|person| match person {
                    Value::String(name) => Some(name.clone()),
                    Value::Object(_) => string_field(person, "name"),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn split_authors(authors: &str) -> Vec<String> {
    authors
        .split([',', '&'])
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn humanize(base: &str) -> String {
    base.replace(['-', '_'], " ").split_whitespace().collect::<Vec<_>>().join(" ")
}
