//! Layered configuration resolution
//!
//! Drydock reads a mandatory base file (`config.yml`) and an optional
//! user-override file (`config.user.yml`) from the working directory. The
//! override is deep-merged over the base: nested mappings merge recursively,
//! while scalars and sequences from the override replace the base value of
//! the same key wholesale.
//!
//! The merge operates on untyped `serde_json::Value` documents so unknown
//! keys survive layering; the typed [`EffectiveConfig`] is extracted at the
//! end and is immutable from then on.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

/// Default base configuration file, relative to the working directory
pub const BASE_CONFIG_FILE: &str = "config.yml";

/// Default user-override file, relative to the working directory
pub const USER_CONFIG_FILE: &str = "config.user.yml";

/// Merged configuration record, created once per command invocation.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
    /// Default cluster image, overridable per-invocation with `--image`
    pub base_image: Option<String>,
    /// Path to the license file handed to the backend
    pub license_file: Option<PathBuf>,
    /// Path to the cluster topology definition
    pub cluster_config: Option<PathBuf>,
}

/// Resolve the effective configuration from a base file and an optional
/// user-override file.
///
/// The base file is mandatory ([`Error::ConfigNotFound`] if missing). The
/// override file may not exist, in which case the base alone is used.
pub fn resolve(base_path: &Path, override_path: &Path) -> Result<EffectiveConfig> {
    let mut doc = load_document(base_path, true)?
        .ok_or_else(|| Error::config_not_found(base_path))?;

    if let Some(overlay) = load_document(override_path, false)? {
        deep_merge(&mut doc, overlay);
    }

    serde_json::from_value(doc).map_err(|e| Error::config_parse(base_path, e.to_string()))
}

/// Load a YAML file as a `serde_json::Value` mapping.
///
/// Returns `Ok(None)` for a missing file when `required` is false. An empty
/// file resolves to an empty mapping.
fn load_document(path: &Path, required: bool) -> Result<Option<Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                return Err(Error::config_not_found(path));
            }
            return Ok(None);
        }
        Err(e) => return Err(Error::config_parse(path, e.to_string())),
    };

    let doc: Value =
        serde_yaml::from_str(&content).map_err(|e| Error::config_parse(path, e.to_string()))?;

    match doc {
        // Empty file parses as null; treat it as an empty mapping
        Value::Null => Ok(Some(Value::Object(Default::default()))),
        Value::Object(_) => Ok(Some(doc)),
        other => Err(Error::config_parse(
            path,
            format!("expected a mapping at the top level, got {}", value_kind(&other)),
        )),
    }
}

/// Recursively merge `overlay` into `base`.
///
/// Mappings merge key-by-key; any other overlay value (scalar, sequence,
/// null) replaces the base value of the same key. Keys absent from the
/// overlay are preserved from the base unchanged.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).expect("write config fixture");
        path
    }

    #[test]
    fn resolve_base_only() {
        let dir = TempDir::new().unwrap();
        let base = write_config(
            &dir,
            "config.yml",
            "baseImage: registry.local/deck:1.2\nlicenseFile: /etc/deck/license\nclusterConfig: ./cluster.yml\n",
        );

        let config = resolve(&base, &dir.path().join("config.user.yml")).unwrap();
        assert_eq!(config.base_image.as_deref(), Some("registry.local/deck:1.2"));
        assert_eq!(
            config.license_file.as_deref(),
            Some(Path::new("/etc/deck/license"))
        );
        assert_eq!(
            config.cluster_config.as_deref(),
            Some(Path::new("./cluster.yml"))
        );
    }

    #[test]
    fn resolve_override_wins_over_base() {
        let dir = TempDir::new().unwrap();
        let base = write_config(
            &dir,
            "config.yml",
            "baseImage: base-image\nlicenseFile: /base/license\n",
        );
        let user = write_config(&dir, "config.user.yml", "baseImage: user-image\n");

        let config = resolve(&base, &user).unwrap();
        // Overridden key takes the user value, untouched key falls back to base
        assert_eq!(config.base_image.as_deref(), Some("user-image"));
        assert_eq!(
            config.license_file.as_deref(),
            Some(Path::new("/base/license"))
        );
    }

    #[test]
    fn resolve_missing_base_fails_regardless_of_override() {
        let dir = TempDir::new().unwrap();
        let user = write_config(&dir, "config.user.yml", "baseImage: user-image\n");

        let err = resolve(&dir.path().join("config.yml"), &user).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }), "got: {}", err);
    }

    #[test]
    fn resolve_malformed_base_fails_with_parse_error() {
        let dir = TempDir::new().unwrap();
        let base = write_config(&dir, "config.yml", "baseImage: [unclosed\n");

        let err = resolve(&base, &dir.path().join("config.user.yml")).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }), "got: {}", err);
    }

    #[test]
    fn resolve_non_mapping_base_fails() {
        let dir = TempDir::new().unwrap();
        let base = write_config(&dir, "config.yml", "- just\n- a\n- list\n");

        let err = resolve(&base, &dir.path().join("config.user.yml")).unwrap_err();
        assert!(err.to_string().contains("expected a mapping"));
    }

    #[test]
    fn resolve_empty_base_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let base = write_config(&dir, "config.yml", "");

        let config = resolve(&base, &dir.path().join("config.user.yml")).unwrap();
        assert_eq!(config, EffectiveConfig::default());
    }

    #[test]
    fn resolve_tolerates_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let base = write_config(
            &dir,
            "config.yml",
            "baseImage: x\nregistry:\n  mirror: registry.internal\n",
        );

        let config = resolve(&base, &dir.path().join("config.user.yml")).unwrap();
        assert_eq!(config.base_image.as_deref(), Some("x"));
    }

    #[test]
    fn deep_merge_recurses_into_mappings() {
        let mut base = json!({
            "cluster": { "nodes": 3, "provider": "docker" },
            "baseImage": "x",
        });
        deep_merge(
            &mut base,
            json!({ "cluster": { "nodes": 5 } }),
        );

        assert_eq!(base["cluster"]["nodes"], 5);
        // Sibling keys inside the merged mapping are preserved
        assert_eq!(base["cluster"]["provider"], "docker");
        assert_eq!(base["baseImage"], "x");
    }

    #[test]
    fn deep_merge_replaces_sequences_wholesale() {
        let mut base = json!({ "mirrors": ["a", "b", "c"] });
        deep_merge(&mut base, json!({ "mirrors": ["d"] }));

        // No element-wise merge: the override sequence replaces the base one
        assert_eq!(base["mirrors"], json!(["d"]));
    }

    #[test]
    fn deep_merge_replaces_scalar_with_mapping_and_back() {
        let mut base = json!({ "license": "/flat/path" });
        deep_merge(&mut base, json!({ "license": { "path": "/nested" } }));
        assert_eq!(base["license"]["path"], "/nested");

        deep_merge(&mut base, json!({ "license": "/flat/again" }));
        assert_eq!(base["license"], "/flat/again");
    }

    #[test]
    fn deep_merge_with_empty_overlay_is_identity() {
        let merged = json!({
            "baseImage": "x",
            "cluster": { "nodes": 3, "labels": ["ci"] },
        });
        let mut roundtrip = merged.clone();
        deep_merge(&mut roundtrip, json!({}));

        assert_eq!(roundtrip, merged);
    }
}
