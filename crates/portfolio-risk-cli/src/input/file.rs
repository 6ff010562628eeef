use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON or YAML request file (chosen by extension) into a typed
/// struct.
pub fn read_request<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let parsed = if is_yaml(&canonical) {
        serde_yaml::from_str(&contents).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(&contents).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e).into())
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Resolve and validate the path, preventing directory traversal.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct WeightsRequest {
        weights: Vec<f64>,
    }

    #[test]
    fn test_yaml_by_extension() {
        assert!(is_yaml(Path::new("request.yaml")));
        assert!(is_yaml(Path::new("request.yml")));
        assert!(!is_yaml(Path::new("request.json")));
    }

    #[test]
    fn test_reads_yaml_request() {
        let path = std::env::temp_dir().join("prisk_weights_request.yaml");
        fs::write(&path, "weights: [0.6, 0.4]\n").unwrap();
        let request: WeightsRequest = read_request(path.to_str().unwrap()).unwrap();
        assert_eq!(request.weights, vec![0.6, 0.4]);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file() {
        assert!(read_request::<WeightsRequest>("/definitely/not/here.json").is_err());
    }
}
