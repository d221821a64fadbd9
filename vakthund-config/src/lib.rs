//! # Vakthund Scanner Configuration
//!
//! Loads the [`ScannerConfig`] tunables (Wu–Manber block size override,
//! Bloom toggle, false-positive rate) the same way the wider Vakthund
//! configuration system does: defaults, an optional YAML file, then
//! `VAKTHUND_`-prefixed environment variables, each layer merged by
//! `figment` and checked by `validator` before being handed to the engine.

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use validator::Validate;

mod error;
mod scanner;
mod validation;

pub use error::ConfigError;
pub use scanner::ScannerConfig;

impl ScannerConfig {
    /// Loads configuration from defaults, an optional `config/scanner.yaml`,
    /// and `VAKTHUND_*` environment variable overrides, in that order.
    pub fn load() -> Result<Self, ConfigError> {
        let figment = Figment::from(Serialized::defaults(ScannerConfig::default()));

        let figment = if Path::new("config/scanner.yaml").exists() {
            figment.merge(Yaml::file("config/scanner.yaml"))
        } else {
            figment
        };

        figment
            .merge(Env::prefixed("VAKTHUND_"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Loads configuration from a specific YAML file, for tests and
    /// explicit `--config` invocations.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(
                path.to_string_lossy().to_string(),
            )));
        }

        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("VAKTHUND_"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_without_file_falls_back_to_defaults() {
        let config = ScannerConfig::load().expect("default config should load and validate");
        assert_eq!(config.wm_block_size_override, None);
        assert!(!config.wm_bloom_enabled);
    }

    #[test]
    fn load_from_path_rejects_missing_file() {
        let err = ScannerConfig::load_from_path("/nonexistent/scanner.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn load_from_path_reads_overrides() {
        let mut file = tempfile_in_cwd();
        writeln!(file.1, "wm_bloom_enabled: true\nwm_block_size_override: 4").unwrap();
        let config = ScannerConfig::load_from_path(&file.0).expect("file should load");
        assert!(config.wm_bloom_enabled);
        assert_eq!(config.wm_block_size_override, Some(4));
        std::fs::remove_file(&file.0).ok();
    }

    fn tempfile_in_cwd() -> (PathBuf, std::fs::File) {
        let path = std::env::temp_dir().join(format!(
            "vakthund-scanner-config-test-{}.yaml",
            std::process::id()
        ));
        let file = std::fs::File::create(&path).unwrap();
        (path, file)
    }
}
