//! Configuration Module
//! Read-only JSON config for source file paths and the default city
//! selection. Missing or malformed files fall back to built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "rentdash.json";

/// Display label for the rent-of-primary-residence CPI overlay.
pub const CPI_RENT_LABEL: &str = "Average US City Rent";
/// Display label for the all-items-less-shelter CPI overlay.
pub const CPI_EXRENT_LABEL: &str = "CPI Excluding Shelter";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub rent_csv: PathBuf,
    pub cpi_rent_csv: PathBuf,
    pub cpi_exrent_csv: PathBuf,
    pub default_cities: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rent_csv: PathBuf::from("City_zori_uc_sfrcondomfr_sm_month.csv"),
            cpi_rent_csv: PathBuf::from("CUUR0000SEHA.csv"),
            cpi_exrent_csv: PathBuf::from("CUUR0000SA0L2.csv"),
            default_cities: vec![
                "New York".to_string(),
                "Los Angeles".to_string(),
                "Chicago".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load from `path`; absent files are normal, malformed ones are
    /// logged and ignored.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("ignoring malformed config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load(Path::new("does-not-exist.json"));
        assert_eq!(
            config.rent_csv,
            PathBuf::from("City_zori_uc_sfrcondomfr_sm_month.csv")
        );
        assert_eq!(config.default_cities.len(), 3);
    }

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rentdash.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{"rent_csv": "custom.csv"}"#).unwrap();
        drop(file);

        let config = AppConfig::load(&path);
        assert_eq!(config.rent_csv, PathBuf::from("custom.csv"));
        assert_eq!(config.cpi_rent_csv, PathBuf::from("CUUR0000SEHA.csv"));
    }

    #[test]
    fn malformed_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rentdash.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"{not json").unwrap();
        drop(file);

        let config = AppConfig::load(&path);
        assert_eq!(config.default_cities[0], "New York");
    }
}
