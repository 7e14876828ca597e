//! `skill.json` packaging manifest.
//!
//! Skill stores read package metadata from `skill.json`. It is generated
//! from the crate's `Cargo.toml`, following `version.workspace = true`
//! style inheritance into the enclosing workspace.

use crate::error::{Result, SkillError};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::Path;
use toml::value::Table;
use toml::Value as TomlValue;
use tracing::{debug, info, warn};

pub const MANIFEST_FILE: &str = "skill.json";

const UNKNOWN: &str = "Unknown";
const DEFAULT_TAGS: &[&str] = &["ovos", "neon", "mycroft"];

/// Hand-maintained keys kept from an existing `skill.json`.
const PRESERVED_KEYS: &[&str] = &["extra_plugins", "icon", "images", "examples"];

/// Contents of `skill.json`. Field order is the key order on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillManifest {
    pub skill_id: String,
    pub source: String,
    pub package_name: String,
    pub pip_spec: String,
    pub license: String,
    pub author: String,
    pub extra_plugins: JsonValue,
    pub icon: String,
    pub images: Vec<String>,
    pub name: String,
    pub description: String,
    pub examples: Vec<String>,
    pub tags: Vec<String>,
    pub version: String,
}

impl SkillManifest {
    /// Build a manifest from `<dir>/Cargo.toml`.
    pub fn from_cargo_toml(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(SkillError::Manifest(format!(
                "Not a directory: {}",
                dir.display()
            )));
        }
        let cargo_toml = dir.join("Cargo.toml");
        if !cargo_toml.is_file() {
            return Err(SkillError::Manifest(format!(
                "Missing {}",
                cargo_toml.display()
            )));
        }

        let document = read_toml(&cargo_toml)?;
        let package = document
            .get("package")
            .and_then(TomlValue::as_table)
            .ok_or_else(|| {
                SkillError::Manifest(format!("No [package] table in {}", cargo_toml.display()))
            })?;
        let workspace = find_workspace_package(dir)?;
        let field = |key: &str| inherited(package, workspace.as_ref(), key);

        let name = field("name")
            .and_then(TomlValue::as_str)
            .unwrap_or(UNKNOWN)
            .to_string();
        let description = field("description")
            .and_then(TomlValue::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| name.clone());
        let author = field("authors")
            .and_then(TomlValue::as_array)
            .map(|authors| {
                authors
                    .iter()
                    .filter_map(TomlValue::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        let tags = field("keywords")
            .and_then(TomlValue::as_array)
            .map(|keywords| {
                keywords
                    .iter()
                    .filter_map(TomlValue::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_else(|| DEFAULT_TAGS.iter().map(|t| (*t).to_string()).collect());

        Ok(Self {
            skill_id: name.clone(),
            source: string_field(field("repository"), ""),
            package_name: name.clone(),
            pip_spec: name.clone(),
            license: string_field(field("license"), UNKNOWN),
            author,
            extra_plugins: JsonValue::Object(Default::default()),
            icon: String::new(),
            images: Vec::new(),
            name,
            description,
            examples: Vec::new(),
            tags,
            version: string_field(field("version"), ""),
        })
    }

    /// Pretty JSON with 4-space indentation and a trailing newline.
    pub fn to_json(&self) -> Result<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)
            .map_err(|e| SkillError::Manifest(e.to_string()))?;
        out.push(b'\n');
        String::from_utf8(out).map_err(|e| SkillError::Manifest(e.to_string()))
    }

    /// Keep hand-maintained keys from a previous manifest.
    fn preserve_from(&mut self, existing: &JsonValue) {
        let Ok(JsonValue::Object(mut ours)) = serde_json::to_value(&*self) else {
            return;
        };
        for key in PRESERVED_KEYS {
            if let Some(value) = existing.get(*key) {
                ours.insert((*key).to_string(), value.clone());
            }
        }
        match serde_json::from_value::<SkillManifest>(JsonValue::Object(ours)) {
            Ok(merged) => *self = merged,
            Err(e) => warn!(error = %e, "Ignoring malformed fields in existing skill.json"),
        }
    }
}

/// Regenerate `<dir>/skill.json`. Returns `true` when the file changed.
pub fn update_skill_json(dir: &Path) -> Result<bool> {
    let mut manifest = SkillManifest::from_cargo_toml(dir)?;
    let path = dir.join(MANIFEST_FILE);

    let current = match std::fs::read_to_string(&path) {
        Ok(text) => match serde_json::from_str::<JsonValue>(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Existing skill.json is not valid JSON");
                None
            }
        },
        Err(_) => None,
    };

    if let Some(current) = &current {
        manifest.preserve_from(current);
        let generated =
            serde_json::to_value(&manifest).map_err(|e| SkillError::Manifest(e.to_string()))?;
        if &generated == current {
            info!(path = %path.display(), "No changes to skill.json");
            return Ok(false);
        }
    }

    std::fs::write(&path, manifest.to_json()?)?;
    info!(path = %path.display(), version = %manifest.version, "Wrote skill.json");
    Ok(true)
}

fn read_toml(path: &Path) -> Result<TomlValue> {
    let text = std::fs::read_to_string(path)?;
    toml::from_str(&text)
        .map_err(|e| SkillError::Manifest(format!("Invalid {}: {}", path.display(), e)))
}

/// `[workspace.package]` of the nearest enclosing workspace, if any.
fn find_workspace_package(dir: &Path) -> Result<Option<Table>> {
    for ancestor in dir.ancestors() {
        let candidate = ancestor.join("Cargo.toml");
        if !candidate.is_file() {
            continue;
        }
        let document = read_toml(&candidate)?;
        if let Some(workspace) = document.get("workspace") {
            debug!(path = %candidate.display(), "Found workspace manifest");
            return Ok(workspace
                .get("package")
                .and_then(TomlValue::as_table)
                .cloned());
        }
    }
    Ok(None)
}

/// Package field, resolving `{ workspace = true }` against the workspace.
fn inherited<'a>(package: &'a Table, workspace: Option<&'a Table>, key: &str) -> Option<&'a TomlValue> {
    let value = package.get(key)?;
    let from_workspace = value
        .get("workspace")
        .and_then(TomlValue::as_bool)
        .unwrap_or(false);
    if from_workspace {
        workspace?.get(key)
    } else {
        Some(value)
    }
}

fn string_field(value: Option<&TomlValue>, default: &str) -> String {
    value
        .and_then(TomlValue::as_str)
        .unwrap_or(default)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const WORKSPACE_TOML: &str = r#"
[workspace]
members = ["skill"]

[workspace.package]
version = "0.3.0"
license = "Apache-2.0"
authors = ["Mike Gray/Oscillate Labs"]
repository = "https://github.com/oscillatelabsllc/skill-musicassistant"
"#;

    const SKILL_TOML: &str = r#"
[package]
name = "skill-musicassistant"
version.workspace = true
license.workspace = true
authors.workspace = true
repository.workspace = true
description = "Control Music Assistant by voice"
keywords = ["ovos", "music-assistant"]
"#;

    fn workspace() -> (TempDir, PathBuf) {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("Cargo.toml"), WORKSPACE_TOML).unwrap();
        let skill = root.path().join("skill");
        fs::create_dir_all(&skill).unwrap();
        fs::write(skill.join("Cargo.toml"), SKILL_TOML).unwrap();
        (root, skill)
    }

    #[test]
    fn test_from_cargo_toml_inherits_workspace_fields() {
        let (_root, skill) = workspace();
        let manifest = SkillManifest::from_cargo_toml(&skill).unwrap();

        assert_eq!(manifest.skill_id, "skill-musicassistant");
        assert_eq!(manifest.package_name, "skill-musicassistant");
        assert_eq!(manifest.pip_spec, "skill-musicassistant");
        assert_eq!(manifest.version, "0.3.0");
        assert_eq!(manifest.license, "Apache-2.0");
        assert_eq!(manifest.author, "Mike Gray/Oscillate Labs");
        assert_eq!(
            manifest.source,
            "https://github.com/oscillatelabsllc/skill-musicassistant"
        );
        assert_eq!(manifest.description, "Control Music Assistant by voice");
        assert_eq!(manifest.tags, vec!["ovos", "music-assistant"]);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"bare\"\nversion = \"1.0.0\"\n",
        )
        .unwrap();

        let manifest = SkillManifest::from_cargo_toml(dir.path()).unwrap();
        assert_eq!(manifest.license, "Unknown");
        assert_eq!(manifest.tags, vec!["ovos", "neon", "mycroft"]);
        assert_eq!(manifest.description, "bare");
        assert_eq!(manifest.author, "");
    }

    #[test]
    fn test_missing_directory_and_cargo_toml() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SkillManifest::from_cargo_toml(&dir.path().join("nope")),
            Err(SkillError::Manifest(_))
        ));
        assert!(matches!(
            SkillManifest::from_cargo_toml(dir.path()),
            Err(SkillError::Manifest(_))
        ));
    }

    #[test]
    fn test_json_layout() {
        let (_root, skill) = workspace();
        let json = SkillManifest::from_cargo_toml(&skill)
            .unwrap()
            .to_json()
            .unwrap();

        assert!(json.starts_with("{\n    \"skill_id\": \"skill-musicassistant\",\n"));
        assert!(json.ends_with("}\n"));
        let skill_id = json.find("\"skill_id\"").unwrap();
        let version = json.find("\"version\"").unwrap();
        assert!(skill_id < version);
    }

    #[test]
    fn test_update_writes_only_on_change() {
        let (_root, skill) = workspace();

        assert!(update_skill_json(&skill).unwrap());
        assert!(!update_skill_json(&skill).unwrap());

        fs::write(
            skill.join("Cargo.toml"),
            SKILL_TOML.replace("version.workspace = true", "version = \"0.4.0\""),
        )
        .unwrap();
        assert!(update_skill_json(&skill).unwrap());

        let written: SkillManifest =
            serde_json::from_str(&fs::read_to_string(skill.join(MANIFEST_FILE)).unwrap()).unwrap();
        assert_eq!(written.version, "0.4.0");
    }

    #[test]
    fn test_update_preserves_hand_maintained_keys() {
        let (_root, skill) = workspace();
        update_skill_json(&skill).unwrap();

        let path = skill.join(MANIFEST_FILE);
        let mut current: JsonValue = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        current["examples"] = serde_json::json!(["Play Carbon Leaf in the office"]);
        current["icon"] = serde_json::json!("music.svg");
        fs::write(&path, serde_json::to_string(&current).unwrap()).unwrap();

        // Only hand-maintained keys differ, so nothing is rewritten
        assert!(!update_skill_json(&skill).unwrap());

        let written: SkillManifest = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.examples, vec!["Play Carbon Leaf in the office"]);
        assert_eq!(written.icon, "music.svg");
    }

    #[test]
    fn test_own_manifest() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        let manifest = SkillManifest::from_cargo_toml(dir).unwrap();
        assert_eq!(manifest.name, "mass-skill");
        assert_eq!(manifest.license, "Apache-2.0");
        assert!(manifest.tags.iter().any(|t| t == "ovos"));
    }
}
