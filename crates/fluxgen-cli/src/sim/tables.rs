use fluxgen::core::physics::tables::{EnergyBin, FractionTable, FractionTableSet, TableError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum TableLoadError {
    #[error("Failed to read fraction table file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse fraction table file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error(transparent)]
    Invalid(#[from] TableError),
}

/// On-disk layout of one fraction table.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableFile {
    bins: Vec<EnergyBin>,
}

pub fn load_table(name: &str, path: &Path) -> Result<FractionTable, TableLoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| TableLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: TableFile = toml::from_str(&content).map_err(|source| TableLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let table = FractionTable::new(name, file.bins)?;
    debug!(name, bins = table.bins().len(), "Loaded fraction table");
    Ok(table)
}

/// Loads every `name = path` entry of the `[tables]` section.
pub fn load_tables(paths: &BTreeMap<String, PathBuf>) -> Result<FractionTableSet, TableLoadError> {
    let mut set = FractionTableSet::new();
    for (name, path) in paths {
        set.insert(load_table(name, path)?);
    }
    if !set.is_empty() {
        info!(tables = ?set.names(), "Fraction tables ready");
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxgen::core::models::ids::ParticleCode;
    use std::fs;
    use tempfile::tempdir;

    const CHARM_TABLE: &str = r#"
[[bins]]
emin = 0.0
emax = 20.0
fractions = [{ pdg = 421, fraction = 0.6 }, { pdg = 411, fraction = 0.4 }]

[[bins]]
emin = 20.0
emax = 1000.0
fractions = [{ pdg = 421, fraction = 0.5 }, { pdg = 431, fraction = 0.5 }]
"#;

    #[test]
    fn loads_tables_by_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("charm.toml");
        fs::write(&path, CHARM_TABLE).unwrap();

        let mut paths = BTreeMap::new();
        paths.insert("charm".to_string(), path);
        let set = load_tables(&paths).unwrap();

        let table = set.get("charm").unwrap();
        assert_eq!(table.bins().len(), 2);
        assert!((table.fraction(5.0, ParticleCode(421)) - 0.6).abs() < 1e-12);
        assert!((table.fraction(50.0, ParticleCode(431)) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let result = load_table("charm", &dir.path().join("absent.toml"));
        assert!(matches!(result, Err(TableLoadError::Io { .. })));
    }

    #[test]
    fn unknown_keys_and_invalid_bins_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");

        fs::write(&path, "title = \"charm\"\nbins = []\n").unwrap();
        assert!(matches!(
            load_table("bad", &path),
            Err(TableLoadError::Parse { .. })
        ));

        fs::write(&path, "bins = []\n").unwrap();
        assert!(matches!(
            load_table("bad", &path),
            Err(TableLoadError::Invalid(TableError::NoBins(_)))
        ));
    }
}
