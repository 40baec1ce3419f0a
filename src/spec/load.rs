use crate::error::SpecError;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Whether a file name selects the YAML parser
fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

/// Parse document text; YAML when `yaml` is set, JSON otherwise.
pub fn parse_document(content: &str, yaml: bool) -> Result<Value, SpecError> {
    let value = if yaml {
        serde_yaml::from_str(content)?
    } else {
        serde_json::from_str(content)?
    };
    Ok(value)
}

/// Load a Swagger document from disk.
///
/// Files ending in `.yaml` or `.yml` are parsed as YAML; everything else as JSON.
pub fn load_document(path: impl AsRef<Path>) -> Result<Value, SpecError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| SpecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let yaml = is_yaml(path);
    debug!(path = %path.display(), yaml, bytes = content.len(), "Parsing API document");
    let value = parse_document(&content, yaml)?;
    let paths_count = value
        .get("paths")
        .and_then(serde_json::Value::as_object)
        .map_or(0, serde_json::Map::len);
    info!(
        path = %path.display(),
        paths_count,
        "API document loaded"
    );
    Ok(value)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::io::Write;

    #[test]
    fn test_yaml_extension_detection() {
        assert!(is_yaml(Path::new("api.yaml")));
        assert!(is_yaml(Path::new("api.YML")));
        assert!(!is_yaml(Path::new("api.json")));
        assert!(!is_yaml(Path::new("api")));
    }

    #[test]
    fn test_load_yaml_and_json_files() {
        let mut yaml = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(yaml, "swagger: '2.0'\npaths: {{}}").unwrap();
        let value = load_document(yaml.path()).unwrap();
        assert_eq!(value["swagger"], "2.0");

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(json, r#"{{"swagger": "2.0", "paths": {{}}}}"#).unwrap();
        let value = load_document(json.path()).unwrap();
        assert_eq!(value["swagger"], "2.0");
    }

    #[test]
    fn test_unknown_extension_is_parsed_as_json() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "swagger: '2.0'").unwrap();
        assert!(matches!(load_document(file.path()), Err(SpecError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_document("/definitely/not/here.yaml"),
            Err(SpecError::Io { .. })
        ));
    }
}
