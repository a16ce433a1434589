//! Service configuration.

use flowdex_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where cache contents live.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Process memory, evaluated by the in-memory runner.
    #[default]
    Memory,
    /// A document store, queried through translated native queries.
    Document,
}

/// Configuration of a [`CacheService`](crate::CacheService).
///
/// ```toml
/// backend = "document"
/// data_dir = "/var/lib/flowdex"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub backend: Backend,
    /// Journal directory of the embedded document store. Without it the
    /// document backend keeps its collections in memory only.
    pub data_dir: Option<PathBuf>,
}

impl ServiceConfig {
    /// Configuration for in-memory caches.
    pub fn memory() -> Self {
        Self::default()
    }

    /// Configuration for document caches, journaled when `data_dir` is set.
    pub fn document(data_dir: Option<PathBuf>) -> Self {
        Self {
            backend: Backend::Document,
            data_dir,
        }
    }

    /// Parses a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| Error::config_from("cannot parse service configuration", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .map_err(|e| Error::config_from(format!("cannot read {}", path.display()), e))?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend == Backend::Memory && self.data_dir.is_some() {
            return Err(Error::config("`data_dir` requires the document backend"));
        }
        if self.data_dir.as_ref().is_some_and(|d| d.as_os_str().is_empty()) {
            return Err(Error::config("`data_dir` must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_memory() {
        let config = ServiceConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServiceConfig::memory());
    }

    #[test]
    fn test_parse_document_backend() {
        let config = ServiceConfig::from_toml_str(
            r#"
            backend = "document"
            data_dir = "/tmp/flowdex"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend, Backend::Document);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/flowdex")));
    }

    #[test]
    fn test_rejects_bad_config() {
        for source in [
            r#"backend = "redis""#,
            r#"cache_size = 3"#,
            r#"data_dir = "/tmp/flowdex""#,
            r#"backend = "document"
               data_dir = """#,
        ] {
            let err = ServiceConfig::from_toml_str(source).unwrap_err();
            assert!(matches!(err, Error::Config { .. }), "{source}");
        }
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flowdex.toml");
        fs::write(&path, "backend = \"memory\"\n").unwrap();
        assert_eq!(ServiceConfig::from_file(&path).unwrap(), ServiceConfig::memory());
        assert!(ServiceConfig::from_file(dir.path().join("missing.toml")).is_err());
    }
}
