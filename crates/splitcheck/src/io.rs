//! Loading rows and configuration from disk, writing reports

use std::fs;
use std::path::{Path, PathBuf};

use splitcheck_core::{AnalysisConfig, Dataset};

/// Failures reading input files or writing output
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse rows in {}: {source}", path.display())]
    Rows {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to parse config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Load decoded rows: a JSON array of objects mapping column names to scalars
pub fn load_dataset(path: &Path) -> Result<Dataset, LoadError> {
    let content = read(path)?;
    serde_json::from_str(&content).map_err(|source| LoadError::Rows {
        path: path.to_path_buf(),
        source,
    })
}

/// Load an analysis config. `.json` files are read as JSON, anything else as YAML.
pub fn load_config(path: &Path) -> Result<AnalysisConfig, LoadError> {
    let content = read(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let parsed = if is_json {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_saphyr::from_str(&content).map_err(|e| e.to_string())
    };
    parsed.map_err(|message| LoadError::Config {
        path: path.to_path_buf(),
        message,
    })
}

/// Write `content` to `path` via a temporary file and rename, so readers never
/// see a partially written report.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), LoadError> {
    let temp_path = path.with_extension("tmp");
    let to_error = |source| LoadError::Write {
        path: path.to_path_buf(),
        source,
    };
    fs::write(&temp_path, content).map_err(to_error)?;
    fs::rename(&temp_path, path).map_err(to_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitcheck_core::DirectionRule;
    use tempfile::tempdir;

    #[test]
    fn test_load_dataset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.json");
        fs::write(
            &path,
            r#"[{"variant": "Control", "orders": 1}, {"variant": "B", "orders": "2"}]"#,
        )
        .unwrap();

        let dataset = load_dataset(&path).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.numeric_columns(), vec!["orders".to_string()]);
    }

    #[test]
    fn test_load_dataset_errors_name_the_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = load_dataset(&missing).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
        assert!(err.to_string().contains("missing.json"));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{not json").unwrap();
        assert!(matches!(
            load_dataset(&broken).unwrap_err(),
            LoadError::Rows { .. }
        ));
    }

    #[test]
    fn test_load_yaml_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("analysis.yaml");
        fs::write(
            &path,
            "control_label: Baseline\nsignificance_level: 0.1\ndirection: median\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.control_label, "Baseline");
        assert_eq!(config.significance_level, 0.1);
        assert_eq!(config.direction, DirectionRule::Median);
        assert_eq!(config.expected_control_ratio, 0.5);
    }

    #[test]
    fn test_load_json_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("analysis.json");
        fs::write(&path, r#"{"expected_control_ratio": 0.6}"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.expected_control_ratio, 0.6);
        assert_eq!(config.control_label, "Control");
    }

    #[test]
    fn test_write_atomic_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");

        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!path.with_extension("tmp").exists());
    }
}
