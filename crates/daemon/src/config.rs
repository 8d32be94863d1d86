use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use distribution_core::ids::IdStrategy;
use distribution_core::ValidationPolicy;
use serde::{Deserialize, Serialize};

/// Daemon settings, loadable from TOML.
///
/// ```toml
/// listen = "127.0.0.1:3000"
/// log = "info,tower_http=debug"
/// cors = true
/// id_strategy = "ulid"
///
/// [validation]
/// mode = "strict"
/// unknown_scope = "reject"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DaemonConfig {
    pub listen: SocketAddr,
    /// Log filter (env-filter syntax).
    pub log: String,
    /// Permissive CORS for browser dashboards.
    pub cors: bool,
    pub id_strategy: IdStrategy,
    pub validation: ValidationPolicy,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 3000)),
            log: "info".to_string(),
            cors: true,
            id_strategy: IdStrategy::Ulid,
            validation: ValidationPolicy::default(),
        }
    }
}

impl DaemonConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_toml(&s).with_context(|| format!("parse {}", path.display()))
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        let cfg: DaemonConfig = toml::from_str(s)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use distribution_core::{UnknownScopePolicy, ValidationMode};

    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(DaemonConfig::from_toml("").unwrap(), DaemonConfig::default());
    }

    #[test]
    fn parses_validation_table() {
        let cfg = DaemonConfig::from_toml(
            r#"
            listen = "0.0.0.0:8080"
            cors = false
            id_strategy = "uuid"

            [validation]
            mode = "strict"
            unknown_scope = "reject"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.listen, "0.0.0.0:8080".parse().unwrap());
        assert!(!cfg.cors);
        assert_eq!(cfg.id_strategy, IdStrategy::Uuid);
        assert_eq!(cfg.validation.mode, ValidationMode::Strict);
        assert_eq!(cfg.validation.unknown_scope, UnknownScopePolicy::Reject);
        assert_eq!(cfg.log, "info");
    }

    #[test]
    fn partial_validation_table_keeps_defaults() {
        let cfg = DaemonConfig::from_toml("[validation]\nmode = \"strict\"\n").unwrap();
        assert_eq!(cfg.validation.mode, ValidationMode::Strict);
        assert_eq!(cfg.validation.unknown_scope, UnknownScopePolicy::Default);
    }

    #[test]
    fn load_from_reports_bad_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[validation]\nmode = \"paranoid\"").unwrap();

        let err = DaemonConfig::load_from(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parse"));
    }

    #[test]
    fn load_from_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DaemonConfig::load_from(&dir.path().join("absent.toml")).is_err());
    }
}
